use std::sync::Arc;

use hecate_core::{IngestRequest, Listing};
use hecate_source::ContentSource;
use serde::Serialize;
use snafu::{ResultExt as _, ensure};
use tokio_util::sync::CancellationToken;

use crate::{
    CancelledSnafu, CommunityStore, IngestObserver, IngestResult, InvalidRequestSnafu,
    NoContentSnafu, PersistenceSnafu, TracingObserver,
};

/// What a single-community ingestion fetched and how much of it was stored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityIngestOutcome {
    /// Everything fetched, including posts that failed to persist
    pub listing: Listing,
    pub posts_persisted: usize,
    pub posts_skipped: usize,
}

/// Fetches one community's current listing and upserts it
#[derive(Clone)]
pub struct CommunityIngestor {
    pub(crate) source: Arc<dyn ContentSource>,
    pub(crate) store: Arc<dyn CommunityStore>,
    pub(crate) observer: Arc<dyn IngestObserver>,
}

impl CommunityIngestor {
    pub fn new(source: Arc<dyn ContentSource>, store: Arc<dyn CommunityStore>) -> Self {
        Self {
            source,
            store,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn IngestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Validate `name` and `sort_by`, then [`Self::ingest`]
    ///
    /// Nothing is fetched or written if either is empty.
    pub async fn ingest_community(
        &self,
        name: &str,
        sort_by: &str,
        cancel: &CancellationToken,
    ) -> IngestResult<CommunityIngestOutcome> {
        let request = IngestRequest::new(name, sort_by).context(InvalidRequestSnafu)?;
        self.ingest(&request, cancel).await
    }

    /// Fetch the listing, upsert the community, then upsert each post
    ///
    /// Failing to fetch or to upsert the community fails the whole call. A
    /// post that fails to upsert is reported to the observer and skipped.
    /// Cancellation is checked before every post write; posts written before
    /// it stay written.
    pub async fn ingest(
        &self,
        request: &IngestRequest,
        cancel: &CancellationToken,
    ) -> IngestResult<CommunityIngestOutcome> {
        let listing = self.source.fetch_listing(request).await?;
        ensure!(
            !listing.posts.is_empty(),
            NoContentSnafu {
                community: request.name.clone(),
            }
        );
        self.observer.listing_fetched(&listing);

        self.store
            .upsert_community(&listing.name, listing.number_of_subscribers)
            .await
            .context(PersistenceSnafu)?;

        let mut posts_persisted = 0;
        let mut posts_skipped = 0;

        for post in &listing.posts {
            if cancel.is_cancelled() {
                self.observer
                    .community_cancelled(&listing.name, posts_persisted);
                return CancelledSnafu.fail();
            }

            match self.store.upsert_post(&listing.name, post).await {
                Ok(_) => posts_persisted += 1,
                Err(err) => {
                    posts_skipped += 1;
                    self.observer
                        .post_skipped(&listing.name, &post.post_id, err.as_ref());
                }
            }
        }

        let outcome = CommunityIngestOutcome {
            listing,
            posts_persisted,
            posts_skipped,
        };
        self.observer.community_ingested(&outcome);
        Ok(outcome)
    }
}
