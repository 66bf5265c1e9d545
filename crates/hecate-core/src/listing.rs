use crate::{CommunityName, Timestamp};

/// A community's current post listing, as normalized from the content source
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: CommunityName,
    pub number_of_subscribers: u64,
    /// In the order the source ranked them
    pub posts: Vec<ListingPost>,
}

#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPost {
    /// Opaque, source-assigned; the natural key of a post row
    pub post_id: String,
    pub title: String,
    pub content: Option<String>,
    pub discussion_url: Option<String>,
    pub comment_count: u64,
    /// Can be negative
    pub upvotes: i64,
    pub posted_at: Timestamp,
}
