use bincode::{Decode, Encode};
use hecate_core::Timestamp;
use serde::Serialize;

#[macro_export]
macro_rules! def_table {
    ($(#[$outer:meta])*
        $name:ident : $k:ty => $v:ty) => {
        #[allow(unused)]
        $(#[$outer])*
        pub mod $name {
            use super::*;
            pub type Key = $k;
            pub type Value = $v;
            pub type Definition<'a> = redb_bincode::TableDefinition<'a, Key, Value>;
            pub trait ReadableTable: redb_bincode::ReadableTable<Key, Value> {}
            impl<RT> ReadableTable for RT where RT: redb_bincode::ReadableTable<Key, Value> {}
            pub type Table<'a> = redb_bincode::Table<'a, Key, Value>;
            pub const TABLE: Definition = redb_bincode::TableDefinition::new(stringify!($name));
        }
    };
}

def_table! {
    /// Tracks database/schema version
    db_version: () => u64
}

def_table! {
    /// Next store-assigned id, shared by communities and posts
    ids_seq: () => u64
}

def_table! {
    /// Communities by their (case-sensitive) name
    communities: String => CommunityRecord
}

def_table! {
    /// Posts by their source-assigned id
    posts: String => PostRecord
}

def_table! {
    /// Index of posts belonging to a community: `(community name, post id)`
    posts_by_community: (String, String) => ()
}

#[derive(Debug, Encode, Decode, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRecord {
    /// Store-assigned, stable across upserts
    pub id: u64,
    pub name: String,
    pub subscribers: u64,
    pub created_at: Timestamp,
}

#[derive(Debug, Encode, Decode, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: u64,
    pub post_id: String,
    pub community: String,
    pub title: String,
    pub content: Option<String>,
    pub discussion_url: Option<String>,
    pub comment_count: u64,
    pub score: i64,
    pub posted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
