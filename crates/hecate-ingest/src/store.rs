use std::sync::Arc;

use hecate_core::{CommunityName, ListingPost, Page, PageNumber};
use hecate_db::Database;
use hecate_util_error::BoxedErrorResult;
use snafu::ResultExt as _;

/// Persistence seam used by the ingestors
///
/// Both writes are idempotent upserts on a natural key.
#[async_trait::async_trait]
pub trait CommunityStore: Send + Sync {
    /// Returns the store-assigned id of the community
    async fn upsert_community(&self, name: &CommunityName, subscribers: u64)
    -> BoxedErrorResult<u64>;

    /// Returns the store-assigned id of the post
    async fn upsert_post(
        &self,
        community: &CommunityName,
        post: &ListingPost,
    ) -> BoxedErrorResult<u64>;

    async fn communities_page(
        &self,
        page: PageNumber,
        page_size: u64,
    ) -> BoxedErrorResult<Page<CommunityName>>;
}

#[async_trait::async_trait]
impl CommunityStore for Database {
    async fn upsert_community(
        &self,
        name: &CommunityName,
        subscribers: u64,
    ) -> BoxedErrorResult<u64> {
        Database::upsert_community(self, name, subscribers)
            .await
            .boxed()
    }

    async fn upsert_post(
        &self,
        community: &CommunityName,
        post: &ListingPost,
    ) -> BoxedErrorResult<u64> {
        Database::upsert_post(self, community, post).await.boxed()
    }

    async fn communities_page(
        &self,
        page: PageNumber,
        page_size: u64,
    ) -> BoxedErrorResult<Page<CommunityName>> {
        let records = Database::communities_page(self, page, page_size)
            .await
            .boxed()?;
        let items = records
            .items
            .into_iter()
            .map(|record| CommunityName::new(record.name))
            .collect::<Result<Vec<_>, _>>()
            .boxed()?;
        Ok(Page::new(items, records.next_page))
    }
}

#[async_trait::async_trait]
impl<T> CommunityStore for Arc<T>
where
    T: CommunityStore + ?Sized,
{
    async fn upsert_community(
        &self,
        name: &CommunityName,
        subscribers: u64,
    ) -> BoxedErrorResult<u64> {
        (**self).upsert_community(name, subscribers).await
    }

    async fn upsert_post(
        &self,
        community: &CommunityName,
        post: &ListingPost,
    ) -> BoxedErrorResult<u64> {
        (**self).upsert_post(community, post).await
    }

    async fn communities_page(
        &self,
        page: PageNumber,
        page_size: u64,
    ) -> BoxedErrorResult<Page<CommunityName>> {
        (**self).communities_page(page, page_size).await
    }
}
