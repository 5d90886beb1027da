// GitHub API response types.
// Defines the user record schema and pagination metadata for listing endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::username::Username;

/// Which side of the follow graph to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Followers,
    Following,
}

impl RelationKind {
    /// Path segment under `/users/{login}/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            RelationKind::Followers => "followers",
            RelationKind::Following => "following",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// GitHub user as returned by the followers/following endpoints.
///
/// Only `login` is required; the rest of the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: Username,
    #[serde(default)]
    pub id: Option<u64>,
}

/// Pagination signal for the page after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextPage {
    /// `Link` header names a next page.
    Next(u32),
    /// `Link` header present without `rel="next"`.
    Last,
    /// No `Link` header; fall back to page fill.
    #[default]
    Unknown,
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<UserRecord>,
    pub next: NextPage,
}

impl Page {
    pub fn new(items: Vec<UserRecord>, next: NextPage) -> Self {
        Self { items, next }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
