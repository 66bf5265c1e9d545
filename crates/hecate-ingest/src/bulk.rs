use hecate_core::{CommunityName, IngestRequest, SortBy};
use serde::Serialize;
use snafu::ResultExt as _;
use tokio_util::sync::CancellationToken;

use crate::{
    CancelledSnafu, CommunityIngestor, IngestErrorKind, IngestResult, InvalidRequestSnafu,
    PersistenceSnafu, fetch_all,
};

/// Page size used to enumerate known communities
pub const COMMUNITY_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    /// Communities an ingestion was started for
    pub attempted: usize,
    pub ingested: usize,
    pub skipped: Vec<(CommunityName, IngestErrorKind)>,
}

/// Re-ingests every community already in the store
#[derive(Clone)]
pub struct BulkIngestor {
    ingestor: CommunityIngestor,
}

impl BulkIngestor {
    pub fn new(ingestor: CommunityIngestor) -> Self {
        Self { ingestor }
    }

    /// Run [`CommunityIngestor::ingest`] for each stored community, in name
    /// order
    ///
    /// Failing to enumerate the communities fails the whole run. A community
    /// that fails to ingest is reported to the observer, recorded in the
    /// report and skipped. Cancellation, checked before each community or
    /// observed inside one, ends the run with [`IngestError::Cancelled`].
    ///
    /// [`IngestError::Cancelled`]: crate::IngestError::Cancelled
    pub async fn ingest_all(
        &self,
        sort_by: &str,
        cancel: &CancellationToken,
    ) -> IngestResult<BulkReport> {
        let sort_by = SortBy::new(sort_by).context(InvalidRequestSnafu)?;
        let observer = &self.ingestor.observer;

        let store = &*self.ingestor.store;
        let communities = fetch_all(
            move |page, page_size| store.communities_page(page, page_size),
            0,
            COMMUNITY_PAGE_SIZE,
        )
        .await
        .context(PersistenceSnafu)?;

        observer.bulk_started(&sort_by, communities.len());

        let mut report = BulkReport::default();
        for name in communities {
            if cancel.is_cancelled() {
                observer.bulk_cancelled(&report);
                return CancelledSnafu.fail();
            }

            report.attempted += 1;
            let request = IngestRequest {
                name,
                sort_by: sort_by.clone(),
            };

            match self.ingestor.ingest(&request, cancel).await {
                Ok(_) => report.ingested += 1,
                Err(err) if err.kind() == IngestErrorKind::Cancelled => {
                    observer.bulk_cancelled(&report);
                    return Err(err);
                }
                Err(err) => {
                    observer.community_skipped(&request.name, &err);
                    report.skipped.push((request.name, err.kind()));
                }
            }
        }

        observer.bulk_finished(&report);
        Ok(report)
    }
}
