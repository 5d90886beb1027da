// GitHub API module.
// Provides the HTTP client, response types, retry policy and pagination.

pub mod client;
pub mod endpoints;
pub mod pagination;
pub mod retry;
pub mod types;

pub use client::GitHubClient;
pub use pagination::{Fetcher, PageSource};
pub use retry::RetryPolicy;
pub use types::*;
