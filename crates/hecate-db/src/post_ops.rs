use std::cmp;

use hecate_core::{CommunityName, ListingPost, Timestamp};
use redb_bincode::ReadableTable as _;
use snafu::{OptionExt as _, ensure};
use tracing::{debug, trace};

use crate::{
    Database, DbResult, InvalidRecordSnafu, LOG_TARGET, PostRecord, UnknownCommunitySnafu,
    communities, ids_seq, posts, posts_by_community,
};

fn by_score_desc(a: &PostRecord, b: &PostRecord) -> cmp::Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.post_id.cmp(&b.post_id))
}

impl Database {
    /// Insert or refresh a post, returning its stable store id
    ///
    /// The community must already exist. On conflict every attribute is
    /// overwritten and `updated_at` is bumped; `id` and `created_at` stay.
    pub async fn upsert_post(&self, community: &CommunityName, post: &ListingPost) -> DbResult<u64> {
        ensure!(
            !post.post_id.is_empty(),
            InvalidRecordSnafu {
                reason: "post id cannot be empty",
            }
        );

        self.write_with(|tx| {
            let communities_t = tx.open_table(&communities::TABLE)?;
            let mut posts_t = tx.open_table(&posts::TABLE)?;
            let mut posts_by_community_t = tx.open_table(&posts_by_community::TABLE)?;
            let mut ids_seq_t = tx.open_table(&ids_seq::TABLE)?;

            let community = community.as_str().to_owned();
            communities_t.get(&community)?.context(UnknownCommunitySnafu {
                community: community.clone(),
            })?;

            Self::upsert_post_tx(
                community,
                post,
                &mut posts_t,
                &mut posts_by_community_t,
                &mut ids_seq_t,
            )
        })
        .await
    }

    pub(crate) fn upsert_post_tx(
        community: String,
        post: &ListingPost,
        posts_t: &mut posts::Table,
        posts_by_community_t: &mut posts_by_community::Table,
        ids_seq_t: &mut ids_seq::Table,
    ) -> DbResult<u64> {
        let now = Timestamp::now();
        let existing = posts_t.get(&post.post_id)?.map(|g| g.value());

        let (id, created_at) = match existing {
            Some(existing) => {
                if existing.community != community {
                    trace!(
                        target: LOG_TARGET,
                        post_id = %post.post_id,
                        from = %existing.community,
                        to = %community,
                        "Post moved between communities"
                    );
                    posts_by_community_t.remove(&(existing.community, post.post_id.clone()))?;
                }
                (existing.id, existing.created_at)
            }
            None => (Self::next_id_tx(ids_seq_t)?, now),
        };

        let record = PostRecord {
            id,
            post_id: post.post_id.clone(),
            community: community.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            discussion_url: post.discussion_url.clone(),
            comment_count: post.comment_count,
            score: post.upvotes,
            posted_at: post.posted_at,
            created_at,
            updated_at: now,
        };

        debug!(target: LOG_TARGET, post_id = %record.post_id, id, community = %community, "Upsert post");
        posts_t.insert(&record.post_id, &record)?;
        posts_by_community_t.insert(&(community, record.post_id.clone()), &())?;

        Ok(id)
    }

    pub async fn get_post(&self, post_id: &str) -> DbResult<Option<PostRecord>> {
        self.read_with(|tx| {
            let posts_t = tx.open_table(&posts::TABLE)?;
            Ok(posts_t.get(&post_id.to_owned())?.map(|g| g.value()))
        })
        .await
    }

    /// All posts of a community, highest score first
    pub async fn community_posts(&self, community: &CommunityName) -> DbResult<Vec<PostRecord>> {
        self.read_with(|tx| {
            let posts_t = tx.open_table(&posts::TABLE)?;
            let posts_by_community_t = tx.open_table(&posts_by_community::TABLE)?;

            let community = community.as_str().to_owned();
            let mut ret = vec![];

            for record in posts_by_community_t.range(&(community.clone(), String::new())..)? {
                let (k, _) = record?;
                let (k_community, post_id) = k.value();
                if k_community != community {
                    break;
                }

                if let Some(post) = posts_t.get(&post_id)? {
                    ret.push(post.value());
                }
            }

            ret.sort_by(by_score_desc);
            Ok(ret)
        })
        .await
    }

    /// Posts whose title or body contains `query`, case-insensitively
    ///
    /// Highest score first, at most `limit` results.
    pub async fn search_posts(&self, query: &str, limit: usize) -> DbResult<Vec<PostRecord>> {
        let needle = query.trim().to_lowercase();
        ensure!(
            !needle.is_empty(),
            InvalidRecordSnafu {
                reason: "search query cannot be empty",
            }
        );

        self.read_with(|tx| {
            let posts_t = tx.open_table(&posts::TABLE)?;
            let mut ret = vec![];

            for record in posts_t.range::<String>(..)? {
                let (_, v) = record?;
                let post = v.value();

                let matches = post.title.to_lowercase().contains(&needle)
                    || post
                        .content
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle));
                if matches {
                    ret.push(post);
                }
            }

            ret.sort_by(by_score_desc);
            ret.truncate(limit);
            Ok(ret)
        })
        .await
    }
}
