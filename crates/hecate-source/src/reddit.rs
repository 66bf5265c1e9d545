use std::time::Duration;

use hecate_core::{CommunityName, IngestRequest, Listing, ListingPost, Timestamp};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use snafu::{ResultExt as _, ensure};
use tracing::{debug, info};
use url::Url;

use crate::{
    BodySnafu, ClientSnafu, ContentSource, DecodeSnafu, InvalidBaseUrlSnafu,
    MAX_ERROR_BODY_CHARS, NoContentSnafu, RequestSnafu, SourceResult, StatusSnafu, UrlSnafu,
    LOG_TARGET, truncate_chars, unescape_html,
};

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) hecate/0.1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Discussion links always point at the public site, whatever `base_url` is
const DISCUSSION_BASE_URL: &str = "https://reddit.com";

#[derive(Debug, Deserialize)]
struct ListingResponse {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    ups: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    created: f64,
    #[serde(default)]
    subreddit_subscribers: i64,
}

impl From<PostData> for ListingPost {
    fn from(post: PostData) -> Self {
        Self {
            post_id: post.id,
            title: unescape_html(&post.title),
            content: (!post.selftext.is_empty()).then(|| unescape_html(&post.selftext)),
            discussion_url: (!post.permalink.is_empty())
                .then(|| format!("{DISCUSSION_BASE_URL}{}", post.permalink)),
            comment_count: post.num_comments,
            upvotes: post.ups,
            // Saturating: negative and NaN become zero
            posted_at: Timestamp::from(post.created as u64),
        }
    }
}

/// Turn a decoded response into a [`Listing`]
///
/// The subscriber count comes from the first post, the only place the
/// source reports it.
fn normalize_listing(name: &CommunityName, response: ListingResponse) -> SourceResult<Listing> {
    let children = response.data.children;
    ensure!(
        !children.is_empty(),
        NoContentSnafu {
            community: name.clone(),
        }
    );

    let number_of_subscribers = children
        .first()
        .map(|c| u64::try_from(c.data.subreddit_subscribers).unwrap_or_default())
        .unwrap_or_default();

    Ok(Listing {
        name: name.clone(),
        number_of_subscribers,
        posts: children.into_iter().map(|c| ListingPost::from(c.data)).collect(),
    })
}

/// [`ContentSource`] backed by Reddit's public JSON listings
#[derive(Debug, Clone)]
pub struct RedditSource {
    client: Client,
    base_url: Url,
}

#[bon::bon]
impl RedditSource {
    #[builder]
    pub fn new(
        base_url: Option<Url>,
        #[builder(into)] user_agent: Option<String>,
        timeout: Option<Duration>,
    ) -> SourceResult<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).context(UrlSnafu)?,
        };
        ensure!(
            !base_url.cannot_be_a_base(),
            InvalidBaseUrlSnafu { url: base_url }
        );

        let client = Client::builder()
            .user_agent(user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()))
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context(ClientSnafu)?;

        Ok(Self { client, base_url })
    }

    /// `{base}/r/{community}/top.json?t={sort}`, with the sort lowercased
    pub fn listing_url(&self, request: &IngestRequest) -> SourceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                InvalidBaseUrlSnafu {
                    url: self.base_url.clone(),
                }
                .build()
            })?
            .pop_if_empty()
            .extend(["r", request.name.as_str(), "top.json"]);
        url.query_pairs_mut()
            .clear()
            .append_pair("t", &request.sort_by.as_query_value());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ContentSource for RedditSource {
    async fn fetch_listing(&self, request: &IngestRequest) -> SourceResult<Listing> {
        let url = self.listing_url(request)?;
        debug!(target: LOG_TARGET, %url, "Fetching listing");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context(RequestSnafu { url: url.clone() })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context(BodySnafu { url: url.clone() })?;

        ensure!(
            status == StatusCode::OK,
            StatusSnafu {
                status: status.as_u16(),
                url,
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            }
        );

        let response: ListingResponse =
            serde_json::from_str(&body).context(DecodeSnafu { url })?;
        let listing = normalize_listing(&request.name, response)?;

        info!(
            target: LOG_TARGET,
            community = %listing.name,
            posts = listing.posts.len(),
            subscribers = listing.number_of_subscribers,
            "Fetched listing"
        );
        Ok(listing)
    }
}
