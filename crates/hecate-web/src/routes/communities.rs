use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use hecate_core::{CommunityName, Listing, Timestamp};
use hecate_db::{CommunityRecord, Database, PostRecord};
use hecate_ingest::fetch_all;
use serde::{Deserialize, Serialize};

use super::AppJson;
use crate::SharedState;
use crate::error::{BadRequestSnafu, RequestResult};

const LIST_PAGE_SIZE: u64 = 100;
const DEFAULT_SEARCH_LIMIT: usize = 100;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_communities))
        .route("/search", get(search_posts))
        .route("/ingest", post(ingest_community))
        .route("/ingest-all", post(ingest_all))
        .route("/{name}", get(community_posts))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityView {
    pub name: String,
    pub number_of_subscribers: u64,
}

impl From<CommunityRecord> for CommunityView {
    fn from(record: CommunityRecord) -> Self {
        Self {
            name: record.name,
            number_of_subscribers: record.subscribers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub post_id: String,
    pub title: String,
    pub content: Option<String>,
    pub discussion_url: Option<String>,
    pub comment_count: u64,
    pub upvotes: i64,
    pub subreddit_name: String,
    pub posted_at: Timestamp,
}

impl From<PostRecord> for PostView {
    fn from(record: PostRecord) -> Self {
        Self {
            post_id: record.post_id,
            title: record.title,
            content: record.content,
            discussion_url: record.discussion_url,
            comment_count: record.comment_count,
            upvotes: record.score,
            subreddit_name: record.community,
            posted_at: record.posted_at,
        }
    }
}

async fn list_communities(
    State(state): State<SharedState>,
) -> RequestResult<AppJson<Vec<CommunityView>>> {
    let db: &Database = &state.db;
    let communities = fetch_all(
        move |page, page_size| db.communities_page(page, page_size),
        0,
        LIST_PAGE_SIZE,
    )
    .await?;

    Ok(AppJson(communities.into_iter().map(Into::into).collect()))
}

async fn community_posts(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> RequestResult<AppJson<Vec<PostView>>> {
    let name = CommunityName::new(name)?;
    let posts = state.db.community_posts(&name).await?;

    Ok(AppJson(posts.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    posts: Vec<PostView>,
}

async fn search_posts(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> RequestResult<AppJson<SearchResponse>> {
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return BadRequestSnafu {
            message: "search query is required",
        }
        .fail();
    };
    let posts = state
        .db
        .search_posts(&q, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await?;

    Ok(AppJson(SearchResponse {
        posts: posts.into_iter().map(Into::into).collect(),
    }))
}

/// Raw strings so that blank values reach the ingestor and fail there as
/// validation errors
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestCommunityInput {
    name: String,
    sort_by: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequestBody {
    community: IngestCommunityInput,
}

async fn ingest_community(
    State(state): State<SharedState>,
    AppJson(body): AppJson<IngestRequestBody>,
) -> RequestResult<(StatusCode, AppJson<Listing>)> {
    let outcome = state
        .ingestor
        .ingest_community(&body.community.name, &body.community.sort_by, &state.cancel)
        .await?;

    Ok((StatusCode::CREATED, AppJson(outcome.listing)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAllRequestBody {
    sort_by: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: &'static str,
}

async fn ingest_all(
    State(state): State<SharedState>,
    AppJson(body): AppJson<IngestAllRequestBody>,
) -> RequestResult<AppJson<StatusResponse>> {
    state.bulk.ingest_all(&body.sort_by, &state.cancel).await?;

    Ok(AppJson(StatusResponse { status: "success" }))
}

