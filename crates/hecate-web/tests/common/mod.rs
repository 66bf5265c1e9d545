#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hecate_core::{CommunityName, IngestRequest, Listing, ListingPost, Timestamp};
use hecate_db::Database;
use hecate_ingest::CommunityIngestor;
use hecate_source::{ContentSource, SourceError, SourceResult};
use hecate_web::{AppState, Opts, Server};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Serves whatever listing was last registered for a community
#[derive(Default)]
pub struct StaticSource {
    listings: Mutex<HashMap<String, Listing>>,
}

impl StaticSource {
    pub fn set(&self, listing: Listing) {
        self.listings
            .lock()
            .unwrap()
            .insert(listing.name.to_string(), listing);
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch_listing(&self, request: &IngestRequest) -> SourceResult<Listing> {
        self.listings
            .lock()
            .unwrap()
            .get(request.name.as_str())
            .cloned()
            .ok_or_else(|| SourceError::NoContent {
                community: request.name.clone(),
            })
    }
}

pub fn listing(name: &str, subscribers: u64, posts: &[(&str, &str, i64)]) -> Listing {
    Listing {
        name: CommunityName::new(name).expect("valid name"),
        number_of_subscribers: subscribers,
        posts: posts
            .iter()
            .map(|(id, title, upvotes)| ListingPost {
                post_id: id.to_string(),
                title: title.to_string(),
                content: Some(format!("body of {id}")),
                discussion_url: Some(format!("https://reddit.com/r/{name}/comments/{id}/")),
                comment_count: 2,
                upvotes: *upvotes,
                posted_at: Timestamp::from(1_700_000_000u64),
            })
            .collect(),
    }
}

/// A server on a random local port backed by a throwaway database
pub struct TestServer {
    pub source: Arc<StaticSource>,
    pub base_url: String,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = Arc::new(
            Database::open(temp_dir.path().join("db.redb"))
                .await
                .expect("Failed to open database"),
        );
        let source = Arc::new(StaticSource::default());
        let ingestor = CommunityIngestor::new(source.clone(), db.clone());

        let server = Server::init(
            Opts::new("127.0.0.1:0".to_owned(), None, false),
            AppState::new(db, ingestor),
        )
        .await
        .expect("Failed to start test server");
        let base_url = format!("http://{}", server.addr().expect("bound"));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                server
                    .run_until(shutdown.cancelled_owned())
                    .await
                    .expect("Server failed");
            }
        });

        Self {
            source,
            base_url,
            shutdown,
            handle,
            _temp_dir: temp_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(self.url(path)).await.expect("GET request failed")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.handle.await.expect("Server task panicked");
    }
}
