mod cli;

use std::io;
use std::sync::Arc;

use clap::Parser;
use cli::{GlobalOpts, Opts, OptsCmd, make_web_opts};
use hecate_core::{CommunityName, InputError};
use hecate_db::{Database, DbError};
use hecate_ingest::{BulkIngestor, COMMUNITY_PAGE_SIZE, CommunityIngestor, IngestError, fetch_all};
use hecate_source::{RedditSource, SourceError};
use hecate_util_error::{FmtCompact as _, WhateverResult};
use hecate_web::{AppState, CommunityView, PostView, Server, WebServerError};
use snafu::{FromString, OptionExt as _, ResultExt, Snafu, Whatever};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub const LOG_TARGET: &str = "hecate::cli";

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Web server error: {source}"))]
    WebServer { source: WebServerError },
    #[snafu(display("Content source error: {source}"))]
    Source { source: SourceError },
    #[snafu(display("Ingestion error: {source}"))]
    Ingest { source: IngestError },
    #[snafu(display("Invalid input: {source}"))]
    Input { source: InputError },
    #[snafu(display("Miscellaneous error: {source}"))]
    Whatever { source: Whatever },
    #[snafu(display("Unable to determine data dir, pass --data-dir"))]
    NoDataDir,
    #[snafu(display("Data dir error: {source:?}"))]
    DataDir { source: io::Error },
    #[snafu(display("Database error: {source}"))]
    Database { source: DbError },
    #[snafu(display("Output error: {source}"))]
    Output { source: serde_json::Error },
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[snafu::report]
#[tokio::main]
async fn main() -> CliResult<()> {
    init_logging().context(WhateverSnafu)?;

    let opts = Opts::parse();
    let v = handle_cmd(opts).await?;
    if !v.is_null() {
        println!(
            "{}",
            serde_json::to_string_pretty(&v).context(OutputSnafu)?
        );
    }
    Ok(())
}

async fn open_db(global: &GlobalOpts) -> CliResult<Arc<Database>> {
    let data_dir = global.data_dir().context(NoDataDirSnafu)?;
    let db_path = Database::mk_db_path(data_dir)
        .await
        .context(DataDirSnafu)?;

    Ok(Arc::new(
        Database::open(db_path).await.context(DatabaseSnafu)?,
    ))
}

fn make_ingestor(global: &GlobalOpts, db: Arc<Database>) -> CliResult<CommunityIngestor> {
    let source = RedditSource::builder()
        .maybe_base_url(global.source.source_base_url.clone())
        .maybe_user_agent(global.source.user_agent.clone())
        .maybe_timeout(global.source.request_timeout())
        .build()
        .context(SourceSnafu)?;

    Ok(CommunityIngestor::new(Arc::new(source), db))
}

async fn handle_cmd(opts: Opts) -> CliResult<serde_json::Value> {
    let db = open_db(&opts.global).await?;

    Ok(match opts.cmd {
        OptsCmd::Serve(ref serve_opts) => {
            let ingestor = make_ingestor(&opts.global, db.clone())?;
            let server = Server::init(make_web_opts(serve_opts), AppState::new(db, ingestor))
                .await
                .context(WebServerSnafu)?;

            server.run().await.context(WebServerSnafu)?;

            serde_json::Value::Null
        }
        OptsCmd::Ingest { community, sort } => {
            let ingestor = make_ingestor(&opts.global, db)?;

            let outcome = ingestor
                .ingest_community(&community, &sort, &cancel_on_ctrl_c())
                .await
                .context(IngestSnafu)?;

            to_json(&outcome)?
        }
        OptsCmd::IngestAll { sort } => {
            let bulk = BulkIngestor::new(make_ingestor(&opts.global, db)?);

            let report = bulk
                .ingest_all(&sort, &cancel_on_ctrl_c())
                .await
                .context(IngestSnafu)?;

            to_json(&report)?
        }
        OptsCmd::Communities => {
            let db = &*db;
            let communities = fetch_all(
                move |page, page_size| db.communities_page(page, page_size),
                0,
                COMMUNITY_PAGE_SIZE,
            )
            .await
            .context(DatabaseSnafu)?;

            to_json(
                &communities
                    .into_iter()
                    .map(CommunityView::from)
                    .collect::<Vec<_>>(),
            )?
        }
        OptsCmd::Posts { community } => {
            let community = CommunityName::new(community).context(InputSnafu)?;
            let posts = db
                .community_posts(&community)
                .await
                .context(DatabaseSnafu)?;

            to_json(&posts.into_iter().map(PostView::from).collect::<Vec<_>>())?
        }
        OptsCmd::Search { query, limit } => {
            let posts = db
                .search_posts(&query, limit)
                .await
                .context(DatabaseSnafu)?;

            to_json(&posts.into_iter().map(PostView::from).collect::<Vec<_>>())?
        }
    })
}

fn to_json(v: &impl serde::Serialize) -> CliResult<serde_json::Value> {
    serde_json::to_value(v).context(OutputSnafu)
}

/// Token cancelled on the first Ctrl+C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(target: LOG_TARGET, "Interrupted, finishing current work");
                    token.cancel();
                }
                Err(err) => {
                    warn!(target: LOG_TARGET, err = %err.fmt_compact(), "Failed to install Ctrl+C handler");
                }
            }
        }
    });
    token
}

pub fn init_logging() -> WhateverResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| Whatever::without_source("Failed to initialize logging".to_string()))?;

    Ok(())
}
