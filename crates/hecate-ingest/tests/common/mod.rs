#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hecate_core::{
    CommunityName, IngestRequest, Listing, ListingPost, Page, PageNumber, SortBy, Timestamp,
};
use hecate_ingest::{
    BulkReport, CommunityIngestOutcome, CommunityIngestor, CommunityStore, IngestError,
    IngestErrorKind, IngestObserver,
};
use hecate_source::{ContentSource, SourceError, SourceResult};
use hecate_util_error::BoxedErrorResult;
use tokio_util::sync::CancellationToken;
use url::Url;

pub fn make_post(post_id: &str, title: &str, upvotes: i64) -> ListingPost {
    ListingPost {
        post_id: post_id.to_string(),
        title: title.to_string(),
        content: None,
        discussion_url: Some(format!("https://reddit.com/comments/{post_id}/")),
        comment_count: 1,
        upvotes,
        posted_at: Timestamp::from(1_700_000_000u64),
    }
}

pub fn make_listing(name: &str, subscribers: u64, post_ids: &[&str]) -> Listing {
    Listing {
        name: CommunityName::new(name).expect("valid name"),
        number_of_subscribers: subscribers,
        posts: post_ids
            .iter()
            .map(|id| make_post(id, &format!("title {id}"), 10))
            .collect(),
    }
}

#[derive(Clone)]
pub enum MockResponse {
    Listing(Listing),
    /// The source reports zero posts
    NoContent,
    /// `Ok` with zero posts, which the source contract rules out
    EmptyOk,
    Status(u16),
    Garbage,
}

/// A content source serving canned responses by community name
#[derive(Default)]
pub struct MockSource {
    responses: Mutex<HashMap<String, MockResponse>>,
    pub calls: Mutex<Vec<IngestRequest>>,
}

impl MockSource {
    pub fn respond(&self, community: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(community.to_string(), response);
    }

    pub fn called_communities(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.to_string())
            .collect()
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn fetch_listing(&self, request: &IngestRequest) -> SourceResult<Listing> {
        self.calls.lock().unwrap().push(request.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(request.name.as_str())
            .cloned()
            .unwrap_or(MockResponse::Status(404));

        match response {
            MockResponse::Listing(listing) => Ok(listing),
            MockResponse::NoContent => Err(SourceError::NoContent {
                community: request.name.clone(),
            }),
            MockResponse::EmptyOk => Ok(Listing {
                name: request.name.clone(),
                number_of_subscribers: 0,
                posts: vec![],
            }),
            MockResponse::Status(status) => Err(SourceError::Status {
                status,
                url: Url::parse("https://www.reddit.com/r/x/top.json").unwrap(),
                body: String::new(),
            }),
            MockResponse::Garbage => Err(SourceError::Decode {
                url: Url::parse("https://www.reddit.com/r/x/top.json").unwrap(),
                source: serde_json::from_str::<u32>("<html>").unwrap_err(),
            }),
        }
    }
}

#[derive(Default)]
pub struct MockStoreState {
    pub communities: BTreeMap<String, u64>,
    /// post id => (community, post)
    pub posts: BTreeMap<String, (String, ListingPost)>,
}

/// An in-memory store that can be told to reject specific writes
#[derive(Default)]
pub struct MockStore {
    pub state: Mutex<MockStoreState>,
    pub reject_posts: Mutex<HashSet<String>>,
    pub reject_communities: Mutex<HashSet<String>>,
    pub fail_enumeration: Mutex<bool>,
    /// Cancelled once this many posts have been written
    cancel_after_posts: Mutex<Option<(usize, CancellationToken)>>,
    posts_written: Mutex<usize>,
}

impl MockStore {
    pub fn with_communities(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for name in names {
                state.communities.insert(name.to_string(), 0);
            }
        }
        store
    }

    pub fn cancel_after_posts(&self, n: usize, token: CancellationToken) {
        *self.cancel_after_posts.lock().unwrap() = Some((n, token));
    }

    pub fn reject_post(&self, post_id: &str) {
        self.reject_posts.lock().unwrap().insert(post_id.to_string());
    }

    pub fn reject_community(&self, name: &str) {
        self.reject_communities
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    pub fn post_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().posts.keys().cloned().collect()
    }

    pub fn posts_of(&self, community: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|(_, (c, _))| c == community)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn subscribers(&self, community: &str) -> Option<u64> {
        self.state
            .lock()
            .unwrap()
            .communities
            .get(community)
            .copied()
    }
}

#[async_trait]
impl CommunityStore for MockStore {
    async fn upsert_community(
        &self,
        name: &CommunityName,
        subscribers: u64,
    ) -> BoxedErrorResult<u64> {
        if self.reject_communities.lock().unwrap().contains(name.as_str()) {
            return Err(format!("community {name} rejected").into());
        }
        let mut state = self.state.lock().unwrap();
        state
            .communities
            .insert(name.as_str().to_string(), subscribers);
        Ok(state.communities.len() as u64)
    }

    async fn upsert_post(
        &self,
        community: &CommunityName,
        post: &ListingPost,
    ) -> BoxedErrorResult<u64> {
        if self.reject_posts.lock().unwrap().contains(&post.post_id) {
            return Err(format!("post {} rejected", post.post_id).into());
        }
        let mut state = self.state.lock().unwrap();
        if !state.communities.contains_key(community.as_str()) {
            return Err(format!("unknown community {community}").into());
        }
        state.posts.insert(
            post.post_id.clone(),
            (community.as_str().to_string(), post.clone()),
        );

        let mut written = self.posts_written.lock().unwrap();
        *written += 1;
        if let Some((n, token)) = &*self.cancel_after_posts.lock().unwrap() {
            if *n <= *written {
                token.cancel();
            }
        }
        Ok(state.posts.len() as u64)
    }

    async fn communities_page(
        &self,
        page: PageNumber,
        page_size: u64,
    ) -> BoxedErrorResult<Page<CommunityName>> {
        if *self.fail_enumeration.lock().unwrap() {
            return Err("enumeration failed".into());
        }
        let state = self.state.lock().unwrap();
        let skip = (page * page_size) as usize;
        let names: Vec<_> = state
            .communities
            .keys()
            .skip(skip)
            .take(page_size as usize)
            .map(|n| CommunityName::new(n.as_str()))
            .collect::<Result<_, _>>()?;
        let more = skip + names.len() < state.communities.len();
        Ok(Page::new(names, if more { page + 1 } else { page }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PostSkipped(String, String),
    CommunityIngested(String),
    CommunityCancelled(String, usize),
    BulkStarted(String, usize),
    CommunitySkipped(String, IngestErrorKind),
    BulkCancelled(usize),
    BulkFinished(usize, usize),
}

/// Records every event; optionally cancels after `n` communities ingested
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<Event>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingObserver {
    pub fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        Self {
            events: Mutex::default(),
            cancel_after: Some((n, token)),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl IngestObserver for RecordingObserver {
    fn post_skipped(
        &self,
        community: &CommunityName,
        post_id: &str,
        _err: &(dyn Error + Send + Sync + 'static),
    ) {
        self.push(Event::PostSkipped(community.to_string(), post_id.to_string()));
    }

    fn community_ingested(&self, outcome: &CommunityIngestOutcome) {
        self.push(Event::CommunityIngested(outcome.listing.name.to_string()));

        if let Some((n, token)) = &self.cancel_after {
            let ingested = self
                .events()
                .iter()
                .filter(|e| matches!(e, Event::CommunityIngested(_)))
                .count();
            if *n <= ingested {
                token.cancel();
            }
        }
    }

    fn community_cancelled(&self, community: &CommunityName, persisted: usize) {
        self.push(Event::CommunityCancelled(community.to_string(), persisted));
    }

    fn bulk_started(&self, sort_by: &SortBy, communities: usize) {
        self.push(Event::BulkStarted(sort_by.to_string(), communities));
    }

    fn community_skipped(&self, community: &CommunityName, err: &IngestError) {
        self.push(Event::CommunitySkipped(community.to_string(), err.kind()));
    }

    fn bulk_cancelled(&self, report: &BulkReport) {
        self.push(Event::BulkCancelled(report.attempted));
    }

    fn bulk_finished(&self, report: &BulkReport) {
        self.push(Event::BulkFinished(report.attempted, report.ingested));
    }
}

pub struct Harness {
    pub source: Arc<MockSource>,
    pub store: Arc<MockStore>,
    pub observer: Arc<RecordingObserver>,
    pub ingestor: CommunityIngestor,
}

impl Harness {
    pub fn new(store: MockStore, observer: RecordingObserver) -> Self {
        let source = Arc::new(MockSource::default());
        let store = Arc::new(store);
        let observer = Arc::new(observer);
        let ingestor = CommunityIngestor::new(source.clone(), store.clone())
            .with_observer(observer.clone());
        Self {
            source,
            store,
            observer,
            ingestor,
        }
    }
}
