// In-memory GitHub stand-in for tests.
// Serves follower/following pages from fixed lists and counts every request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{MutualsError, Result};
use crate::github::pagination::PageSource;
use crate::github::retry::RetryPolicy;
use crate::github::types::{NextPage, Page, RelationKind, UserRecord};
use crate::username::Username;

/// Retry policy without sleeps.
pub fn instant_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

/// `count` logins of the form `{prefix}-{n}`.
pub fn numbered(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|n| format!("{prefix}-{n}")).collect()
}

pub fn logins(users: &[Username]) -> Vec<String> {
    users.iter().map(|u| u.to_string()).collect()
}

#[derive(Default)]
struct Account {
    followers: Vec<String>,
    following: Vec<String>,
}

/// Fake listing endpoint with call counting.
#[derive(Default)]
pub struct FakeGitHub {
    accounts: HashMap<String, Account>,
    link_headers: bool,
    latency: Option<Duration>,
    /// Page number that never answers.
    stall_page: Option<u32>,
    /// (page, remaining failures) for injected transient errors.
    failures: Mutex<Option<(u32, u32)>>,
    rate_limited: bool,
    followers_calls: AtomicU32,
    following_calls: AtomicU32,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_followers(mut self, user: &str, followers: &[String]) -> Self {
        self.account(user).followers = followers.to_vec();
        self
    }

    pub fn with_following(mut self, user: &str, following: &[String]) -> Self {
        self.account(user).following = following.to_vec();
        self
    }

    /// Answer with `Link`-style pagination instead of relying on page fill.
    pub fn with_link_headers(mut self) -> Self {
        self.link_headers = true;
        self
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make requests for `page` hang forever.
    pub fn with_stall_on_page(mut self, page: u32) -> Self {
        self.stall_page = Some(page);
        self
    }

    /// Fail the next `times` requests for `page` with a transient error.
    pub fn with_transient_failures(self, page: u32, times: u32) -> Self {
        *self.failures.lock().unwrap() = Some((page, times));
        self
    }

    pub fn with_rate_limit_exhausted(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    pub fn calls(&self, kind: RelationKind) -> u32 {
        self.counter(kind).load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls(RelationKind::Followers) + self.calls(RelationKind::Following)
    }

    fn account(&mut self, user: &str) -> &mut Account {
        self.accounts.entry(user.to_ascii_lowercase()).or_default()
    }

    fn counter(&self, kind: RelationKind) -> &AtomicU32 {
        match kind {
            RelationKind::Followers => &self.followers_calls,
            RelationKind::Following => &self.following_calls,
        }
    }

    fn take_failure(&self, page: u32) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.as_mut() {
            Some((p, remaining)) if *p == page && *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl PageSource for FakeGitHub {
    async fn fetch_page(
        &self,
        username: &Username,
        kind: RelationKind,
        page: u32,
        per_page: u32,
    ) -> Result<Page> {
        self.counter(kind).fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.stall_page == Some(page) {
            std::future::pending::<()>().await;
        }
        if self.rate_limited {
            return Err(MutualsError::RateLimited {
                reset_at: "12:00:00 UTC".to_string(),
            });
        }
        if self.take_failure(page) {
            return Err(MutualsError::Transient("connection reset".to_string()));
        }

        let account = self
            .accounts
            .get(&username.folded())
            .ok_or_else(|| MutualsError::NotFound(format!("/users/{username}/{kind}")))?;
        let all = match kind {
            RelationKind::Followers => &account.followers,
            RelationKind::Following => &account.following,
        };

        let start = ((page - 1) * per_page) as usize;
        let end = (start + per_page as usize).min(all.len());
        let items = all
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|login| UserRecord {
                login: Username::parse(login).unwrap(),
                id: None,
            })
            .collect();

        let next = if !self.link_headers {
            NextPage::Unknown
        } else if end < all.len() {
            NextPage::Next(page + 1)
        } else {
            NextPage::Last
        };

        Ok(Page::new(items, next))
    }
}
