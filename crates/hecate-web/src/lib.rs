mod error;
mod routes;

use std::future::Future;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::str::FromStr as _;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use hecate_db::Database;
use hecate_ingest::{BulkIngestor, CommunityIngestor};
use hecate_util_error::WhateverResult;
use snafu::{ResultExt as _, Snafu, Whatever};
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

pub use self::routes::{CommunityView, PostView};

const LOG_TARGET: &str = "hecate::web";

pub const DEFAULT_LISTEN: &str = "[::1]:8080";

#[derive(Clone, Debug)]
pub struct Opts {
    pub listen: String,
    /// `None` allows any origin
    pub cors_origin: Option<String>,
    pub reuseport: bool,
}

impl Opts {
    pub fn new(listen: String, cors_origin: Option<String>, reuseport: bool) -> Self {
        Self {
            listen,
            cors_origin,
            reuseport,
        }
    }

    pub fn cors_origin(&self) -> WhateverResult<AllowOrigin> {
        let Some(origin) = self.cors_origin.as_deref().filter(|o| *o != "*") else {
            return Ok(AllowOrigin::any());
        };
        origin
            .parse::<HeaderValue>()
            .map(AllowOrigin::exact)
            .whatever_context("cors_origin does not parse as an http value")
    }
}

pub struct AppState {
    pub db: Arc<Database>,
    pub ingestor: CommunityIngestor,
    pub bulk: BulkIngestor,
    /// Cancelled on shutdown; every ingestion started by a request watches it
    pub cancel: CancellationToken,
}

impl AppState {
    pub fn new(db: Arc<Database>, ingestor: CommunityIngestor) -> Self {
        Self {
            db,
            bulk: BulkIngestor::new(ingestor.clone()),
            ingestor,
            cancel: CancellationToken::new(),
        }
    }
}

pub type SharedState = Arc<AppState>;

pub struct Server {
    listener: TcpListener,

    state: SharedState,
    opts: Opts,
}

#[derive(Debug, Snafu)]
pub enum WebServerError {
    #[snafu(transparent)]
    IO { source: io::Error },

    ListenAddr { source: AddrParseError },

    Cors { source: Whatever },
}

pub type ServerResult<T> = std::result::Result<T, WebServerError>;

impl Server {
    pub async fn init(opts: Opts, state: AppState) -> ServerResult<Server> {
        let listener = Self::get_listener(&opts).await?;

        info!(target: LOG_TARGET, addr = %listener.local_addr()?, "Listening");
        Ok(Self {
            listener,
            state: Arc::new(state),
            opts,
        })
    }

    pub async fn get_listener(opts: &Opts) -> ServerResult<TcpListener> {
        let socket = {
            let addr = SocketAddr::from_str(&opts.listen).context(ListenAddrSnafu)?;

            let socket = if addr.is_ipv4() {
                TcpSocket::new_v4()?
            } else {
                TcpSocket::new_v6()?
            };
            if opts.reuseport {
                #[cfg(unix)]
                socket.set_reuseport(true)?;
            }
            socket.set_nodelay(true)?;

            socket.bind(addr)?;

            socket
        };

        Ok(socket.listen(1024)?)
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn run(self) -> ServerResult<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then cancel running ingestions and
    /// drain connections
    pub async fn run_until(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        let router = routes::route_handler(self.state.clone()).layer(cors_layer(&self.opts)?);
        let cancel = self.state.cancel.clone();

        info!(target: LOG_TARGET, addr = %self.addr()?, "Starting server");
        axum::serve(self.listener, router)
            .with_graceful_shutdown(async move {
                signal.await;
                info!(target: LOG_TARGET, "Shutting down");
                cancel.cancel();
            })
            .await?;

        Ok(())
    }

    pub fn addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

fn cors_layer(opts: &Opts) -> ServerResult<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
        .allow_origin(opts.cors_origin().context(CorsSnafu)?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
