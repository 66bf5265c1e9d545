use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hecate_core::InputError;
use hecate_db::DbError;
use hecate_ingest::{IngestError, IngestErrorKind};
use hecate_util_error::FmtCompact as _;
use serde::Serialize;
use snafu::Snafu;
use tracing::{debug, warn};

use crate::LOG_TARGET;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RequestError {
    #[snafu(display("{message}"))]
    BadRequest { message: String },
    #[snafu(transparent)]
    Json { source: JsonRejection },
    #[snafu(transparent)]
    Query { source: QueryRejection },
    #[snafu(transparent)]
    Input { source: InputError },
    #[snafu(transparent)]
    Ingest { source: IngestError },
    #[snafu(transparent)]
    Db { source: DbError },
}
pub type RequestResult<T> = std::result::Result<T, RequestError>;

impl RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BadRequest { .. }
            | RequestError::Json { .. }
            | RequestError::Query { .. }
            | RequestError::Input { .. } => StatusCode::BAD_REQUEST,
            RequestError::Ingest { source } if source.kind() == IngestErrorKind::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            RequestError::Ingest { .. } | RequestError::Db { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error = self.fmt_compact().to_string();

        if status_code.is_server_error() {
            warn!(target: LOG_TARGET, err = %error, "Request failed");
        } else {
            debug!(target: LOG_TARGET, err = %error, "Bad request");
        }

        (status_code, axum::Json(ErrorResponse { error })).into_response()
    }
}
