// Session configuration.
// API endpoint, page size, timeout and retry policy shared by the client and fetcher.

use std::time::Duration;

use crate::github::client::GITHUB_API_BASE;
use crate::github::retry::RetryPolicy;

/// Largest page size the GitHub listing endpoints accept.
pub const MAX_PER_PAGE: u32 = 100;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one analysis session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    pub api_url: String,
    /// Items requested per page (1..=100).
    pub per_page: u32,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_BASE.to_string(),
            per_page: MAX_PER_PAGE,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Set the page size, clamped to what the API accepts.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
