//! Content sources that produce a community's post listing
mod reddit;
mod text;

use std::sync::Arc;

use hecate_core::{CommunityName, IngestRequest, Listing};
use snafu::Snafu;
use url::Url;

pub use self::reddit::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, RedditSource};
pub use self::text::{truncate_chars, unescape_html};

const LOG_TARGET: &str = "hecate::source";

/// Longest error-response body kept in [`SourceError::Status`]
pub const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SourceError {
    #[snafu(display("Failed to build HTTP client"))]
    Client { source: reqwest::Error },
    #[snafu(display("Invalid source url"))]
    Url { source: url::ParseError },
    #[snafu(display("Source url cannot be a base: {url}"))]
    InvalidBaseUrl { url: Url },
    #[snafu(display("Request to {url} failed"))]
    Request { url: Url, source: reqwest::Error },
    #[snafu(display("Failed to read response body from {url}"))]
    Body { url: Url, source: reqwest::Error },
    #[snafu(display("Unexpected status {status} from {url}: {body}"))]
    Status { status: u16, url: Url, body: String },
    #[snafu(display("Failed to decode listing from {url}"))]
    Decode {
        url: Url,
        source: serde_json::Error,
    },
    #[snafu(display("No posts found for community {community}"))]
    NoContent { community: CommunityName },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Something that can produce the current listing of a community
///
/// Implementations do the remote call and the normalization, so callers only
/// ever see [`Listing`]s. A listing with no posts is reported as
/// [`SourceError::NoContent`], never as an empty `Ok`.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_listing(&self, request: &IngestRequest) -> SourceResult<Listing>;
}

#[async_trait::async_trait]
impl<T> ContentSource for Arc<T>
where
    T: ContentSource + ?Sized,
{
    async fn fetch_listing(&self, request: &IngestRequest) -> SourceResult<Listing> {
        (**self).fetch_listing(request).await
    }
}
