use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

/// Ingest communities and their posts into a local store
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub cmd: OptsCmd,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding the database
    #[arg(env = "HECATE_DATA_DIR", long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceOpts,
}

static PROJECTS_DIR: LazyLock<Option<directories::ProjectDirs>> =
    LazyLock::new(|| directories::ProjectDirs::from("org", "Hecate", "hecate"));

impl GlobalOpts {
    /// Explicit `--data-dir`, otherwise the platform state (or data-local)
    /// dir
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref().or_else(|| {
            PROJECTS_DIR.as_ref().map(|dirs| {
                dirs.state_dir()
                    .unwrap_or_else(|| dirs.data_local_dir())
            })
        })
    }
}

#[derive(Debug, Args)]
pub struct SourceOpts {
    /// Base url of the content source
    #[arg(long, env = "HECATE_SOURCE_BASE_URL", global = true)]
    pub source_base_url: Option<Url>,

    /// User-Agent sent to the content source
    #[arg(long, env = "HECATE_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Whole-request timeout for the content source
    #[arg(long, env = "HECATE_REQUEST_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,
}

impl SourceOpts {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Subcommand)]
pub enum OptsCmd {
    /// Run the HTTP server
    Serve(ServeOpts),

    /// Fetch one community and store it with its posts
    Ingest {
        #[arg(long)]
        community: String,

        /// Sort criterion passed to the source (`top`, `hot`, `week`, ...)
        #[arg(long, default_value = "top")]
        sort: String,
    },

    /// Re-ingest every stored community
    IngestAll {
        #[arg(long, default_value = "top")]
        sort: String,
    },

    /// List stored communities
    Communities,

    /// List stored posts of a community
    Posts { community: String },

    /// Search stored posts by title or body
    Search {
        query: String,

        #[arg(long, default_value = "100")]
        limit: usize,
    },
}

#[derive(Debug, Args)]
pub struct ServeOpts {
    /// Listen address
    #[arg(long, short, default_value = hecate_web::DEFAULT_LISTEN, env = "HECATE_LISTEN")]
    pub listen: String,

    /// Set SO_REUSEPORT
    #[arg(long, env = "HECATE_REUSEPORT")]
    pub reuseport: bool,

    /// Allowed CORS origin, `*` for any
    #[arg(long, env = "HECATE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

pub fn make_web_opts(opts: &ServeOpts) -> hecate_web::Opts {
    hecate_web::Opts::new(
        opts.listen.clone(),
        opts.cors_origin.clone(),
        opts.reuseport,
    )
}
