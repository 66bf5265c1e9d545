use std::fmt;
use std::str::FromStr;

use snafu::{OptionExt as _, Snafu};

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum InputError {
    #[snafu(display("community name cannot be empty"))]
    EmptyCommunityName,
    #[snafu(display("sort criterion cannot be empty"))]
    EmptySortBy,
}
pub type InputResult<T> = std::result::Result<T, InputError>;

fn non_blank(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

/// Name of a community, the natural key of a community row
///
/// Case-sensitive. Never empty or all-whitespace.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommunityName(String);

impl CommunityName {
    pub fn new(name: impl Into<String>) -> InputResult<Self> {
        let name = name.into();
        non_blank(&name).context(EmptyCommunityNameSnafu)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CommunityName {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CommunityName {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommunityName> for String {
    fn from(value: CommunityName) -> Self {
        value.0
    }
}

impl AsRef<str> for CommunityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ranking requested from the content source (`top`, `hot`, `week`, ...)
///
/// Kept as given; [`SortBy::as_query_value`] is what goes on the wire.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortBy(String);

impl SortBy {
    pub fn new(sort_by: impl Into<String>) -> InputResult<Self> {
        let sort_by = sort_by.into();
        non_blank(&sort_by).context(EmptySortBySnafu)?;
        Ok(Self(sort_by))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_query_value(&self) -> String {
        self.0.to_lowercase()
    }
}

impl FromStr for SortBy {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SortBy {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SortBy> for String {
    fn from(value: SortBy) -> Self {
        value.0
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to ingest: one community, ranked by one sort criterion
///
/// Ephemeral, never persisted.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub name: CommunityName,
    pub sort_by: SortBy,
}

impl IngestRequest {
    /// Validates both parts; the community name is checked first
    pub fn new(name: &str, sort_by: &str) -> InputResult<Self> {
        Ok(Self {
            name: CommunityName::new(name)?,
            sort_by: SortBy::new(sort_by)?,
        })
    }
}
