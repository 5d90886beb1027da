// Paginated retrieval of follower and following lists.
// Walks a listing endpoint page by page until the API signals the end.

use std::future::Future;

use crate::config::Config;
use crate::error::{MutualsError, Result};
use crate::username::Username;

use super::retry::RetryPolicy;
use super::types::{NextPage, Page, RelationKind};

/// Something that can serve one page of a relation listing.
///
/// [`GitHubClient`](super::GitHubClient) is the production implementation.
pub trait PageSource {
    fn fetch_page(
        &self,
        username: &Username,
        kind: RelationKind,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Page>> + Send;
}

/// Fetches complete relation lists from a [`PageSource`].
pub struct Fetcher<S> {
    source: S,
    per_page: u32,
    retry: RetryPolicy,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            per_page: config.per_page,
            retry: config.retry.clone(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every page of `kind` for `username`, in retrieval order.
    pub async fn fetch_all(&self, username: &Username, kind: RelationKind) -> Result<Vec<Username>> {
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let current = self
                .retry
                .run(|| self.source.fetch_page(username, kind, page, self.per_page))
                .await?;

            let count = current.items.len();
            tracing::debug!(%username, %kind, page, count, "fetched page");
            users.extend(current.items.into_iter().map(|record| record.login));

            match next_page(page, count, self.per_page, current.next)? {
                Some(next) => page = next,
                None => break,
            }
        }

        tracing::info!(%username, %kind, total = users.len(), pages = page, "fetched relation");
        Ok(users)
    }
}

/// Decide which page to request after `page`, or `None` when done.
fn next_page(page: u32, count: usize, per_page: u32, signal: NextPage) -> Result<Option<u32>> {
    match signal {
        NextPage::Next(next) if next > page => Ok(Some(next)),
        NextPage::Next(next) => Err(MutualsError::Parse(format!(
            "pagination went backwards: page {} links to page {}",
            page, next
        ))),
        NextPage::Last => Ok(None),
        NextPage::Unknown if count >= per_page as usize && count > 0 => Ok(Some(page + 1)),
        NextPage::Unknown => Ok(None),
    }
}
