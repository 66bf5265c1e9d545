use std::error::Error;

use hecate_core::{CommunityName, Listing, SortBy};
use hecate_util_error::FmtCompact as _;
use tracing::{debug, info, warn};

use crate::{BulkReport, CommunityIngestOutcome, IngestError, LOG_TARGET};

/// Receives the notable events of an ingestion run
///
/// Skips and cancellations are reported here instead of being logged by the
/// ingestors, so callers decide where they go. Every method defaults to doing
/// nothing.
#[allow(unused_variables)]
pub trait IngestObserver: Send + Sync {
    fn listing_fetched(&self, listing: &Listing) {}

    /// A single post failed to persist; the rest of the listing continues
    fn post_skipped(
        &self,
        community: &CommunityName,
        post_id: &str,
        err: &(dyn Error + Send + Sync + 'static),
    ) {
    }

    fn community_ingested(&self, outcome: &CommunityIngestOutcome) {}

    /// Cancellation observed before a post write, `persisted` posts in
    fn community_cancelled(&self, community: &CommunityName, persisted: usize) {}

    fn bulk_started(&self, sort_by: &SortBy, communities: usize) {}

    /// A community failed as a whole; the bulk run continues
    fn community_skipped(&self, community: &CommunityName, err: &IngestError) {}

    fn bulk_cancelled(&self, report: &BulkReport) {}

    fn bulk_finished(&self, report: &BulkReport) {}
}

/// Turns ingestion events into `tracing` records
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl IngestObserver for TracingObserver {
    fn listing_fetched(&self, listing: &Listing) {
        debug!(
            target: LOG_TARGET,
            community = %listing.name,
            posts = listing.posts.len(),
            subscribers = listing.number_of_subscribers,
            "Listing fetched"
        );
    }

    fn post_skipped(
        &self,
        community: &CommunityName,
        post_id: &str,
        err: &(dyn Error + Send + Sync + 'static),
    ) {
        warn!(
            target: LOG_TARGET,
            community = %community,
            post_id = %post_id,
            err = %err.fmt_compact(),
            "Failed to persist post, skipping"
        );
    }

    fn community_ingested(&self, outcome: &CommunityIngestOutcome) {
        info!(
            target: LOG_TARGET,
            community = %outcome.listing.name,
            persisted = outcome.posts_persisted,
            skipped = outcome.posts_skipped,
            "Community ingested"
        );
    }

    fn community_cancelled(&self, community: &CommunityName, persisted: usize) {
        info!(target: LOG_TARGET, community = %community, persisted, "Community ingestion cancelled");
    }

    fn bulk_started(&self, sort_by: &SortBy, communities: usize) {
        info!(target: LOG_TARGET, sort_by = %sort_by, communities, "Starting bulk ingestion");
    }

    fn community_skipped(&self, community: &CommunityName, err: &IngestError) {
        warn!(
            target: LOG_TARGET,
            community = %community,
            err = %err.fmt_compact(),
            "Failed to ingest community, skipping"
        );
    }

    fn bulk_cancelled(&self, report: &BulkReport) {
        info!(
            target: LOG_TARGET,
            attempted = report.attempted,
            ingested = report.ingested,
            "Bulk ingestion cancelled"
        );
    }

    fn bulk_finished(&self, report: &BulkReport) {
        info!(
            target: LOG_TARGET,
            attempted = report.attempted,
            ingested = report.ingested,
            skipped = report.skipped.len(),
            "Bulk ingestion finished"
        );
    }
}
