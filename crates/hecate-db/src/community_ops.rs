use hecate_core::{CommunityName, Page, PageNumber, Timestamp};
use redb_bincode::ReadableTable as _;
use snafu::ensure;
use tracing::debug;

use crate::{
    CommunityRecord, Database, DbResult, InvalidRecordSnafu, LOG_TARGET, communities, ids_seq,
};

impl Database {
    /// Insert or refresh a community, returning its stable store id
    ///
    /// On conflict only the subscriber count changes.
    pub async fn upsert_community(&self, name: &CommunityName, subscribers: u64) -> DbResult<u64> {
        self.write_with(|tx| {
            let mut communities_t = tx.open_table(&communities::TABLE)?;
            let mut ids_seq_t = tx.open_table(&ids_seq::TABLE)?;

            Self::upsert_community_tx(name, subscribers, &mut communities_t, &mut ids_seq_t)
        })
        .await
    }

    pub(crate) fn upsert_community_tx(
        name: &CommunityName,
        subscribers: u64,
        communities_t: &mut communities::Table,
        ids_seq_t: &mut ids_seq::Table,
    ) -> DbResult<u64> {
        let key = name.as_str().to_owned();
        let existing = communities_t.get(&key)?.map(|g| g.value());

        let record = match existing {
            Some(existing) => CommunityRecord {
                subscribers,
                ..existing
            },
            None => CommunityRecord {
                id: Self::next_id_tx(ids_seq_t)?,
                name: key.clone(),
                subscribers,
                created_at: Timestamp::now(),
            },
        };

        debug!(target: LOG_TARGET, community = %name, id = record.id, subscribers, "Upsert community");
        communities_t.insert(&key, &record)?;
        Ok(record.id)
    }

    pub async fn get_community(&self, name: &CommunityName) -> DbResult<Option<CommunityRecord>> {
        self.read_with(|tx| {
            let communities_t = tx.open_table(&communities::TABLE)?;
            Ok(communities_t
                .get(&name.as_str().to_owned())?
                .map(|g| g.value()))
        })
        .await
    }

    /// One page of known communities, ordered by name
    ///
    /// `next_page` is `page + 1` while more rows remain after this page and
    /// `page` itself once the table is exhausted.
    pub async fn communities_page(
        &self,
        page: PageNumber,
        page_size: u64,
    ) -> DbResult<Page<CommunityRecord>> {
        ensure!(
            0 < page_size,
            InvalidRecordSnafu {
                reason: "page size must be positive",
            }
        );
        self.read_with(|tx| {
            let communities_t = tx.open_table(&communities::TABLE)?;
            Self::paginate_table_by_page(&communities_t, page, page_size)
        })
        .await
    }

    pub async fn community_count(&self) -> DbResult<u64> {
        self.read_with(|tx| {
            let communities_t = tx.open_table(&communities::TABLE)?;
            let mut count = 0;
            for record in communities_t.range::<String>(..)? {
                record?;
                count += 1;
            }
            Ok(count)
        })
        .await
    }
}
