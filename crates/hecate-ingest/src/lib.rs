//! Ingestion pipeline: pull community listings from a [`ContentSource`] and
//! upsert them into a [`CommunityStore`]
//!
//! Two failure policies live side by side here and are not meant to be
//! unified: [`fetch_all`] is fail-fast, while the per-post loop of
//! [`CommunityIngestor`] and the per-community loop of [`BulkIngestor`]
//! report the failure to the [`IngestObserver`] and move on.
//!
//! [`ContentSource`]: hecate_source::ContentSource
pub mod accumulate;
mod bulk;
mod community;
mod observer;
mod store;

use hecate_core::{CommunityName, InputError};
use hecate_source::SourceError;
use hecate_util_error::BoxedError;
use serde::Serialize;
use snafu::Snafu;

pub use self::accumulate::fetch_all;
pub use self::bulk::{BulkIngestor, BulkReport, COMMUNITY_PAGE_SIZE};
pub use self::community::{CommunityIngestOutcome, CommunityIngestor};
pub use self::observer::{IngestObserver, TracingObserver};
pub use self::store::CommunityStore;

const LOG_TARGET: &str = "hecate::ingest";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IngestError {
    #[snafu(display("Invalid ingest request"))]
    InvalidRequest { source: InputError },
    #[snafu(display("No content found for community {community}"))]
    NoContent { community: CommunityName },
    #[snafu(display("Content source unavailable"))]
    Transport { source: SourceError },
    #[snafu(display("Malformed content source response"))]
    Decoding { source: SourceError },
    #[snafu(display("Store operation failed"))]
    Persistence { source: BoxedError },
    #[snafu(display("Ingestion cancelled"))]
    Cancelled,
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// [`IngestError`] without its payload, for reports and matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IngestErrorKind {
    InvalidRequest,
    NoContent,
    Transport,
    Decoding,
    Persistence,
    Cancelled,
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::InvalidRequest { .. } => IngestErrorKind::InvalidRequest,
            IngestError::NoContent { .. } => IngestErrorKind::NoContent,
            IngestError::Transport { .. } => IngestErrorKind::Transport,
            IngestError::Decoding { .. } => IngestErrorKind::Decoding,
            IngestError::Persistence { .. } => IngestErrorKind::Persistence,
            IngestError::Cancelled => IngestErrorKind::Cancelled,
        }
    }
}

impl From<SourceError> for IngestError {
    fn from(source: SourceError) -> Self {
        match source {
            SourceError::NoContent { community } => IngestError::NoContent { community },
            SourceError::Decode { .. } => IngestError::Decoding { source },
            source => IngestError::Transport { source },
        }
    }
}
