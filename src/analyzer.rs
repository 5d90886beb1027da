// Follow relationship analysis.
// Diffs a user's followers against their followees using the session cache.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cache::{RelationshipCache, UserSet};
use crate::error::{MutualsError, Result};
use crate::github::{PageSource, RelationKind};
use crate::username::Username;

/// Outcome of analysing one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub username: Username,
    pub followers_count: usize,
    pub following_count: usize,
    /// Followed by the user but not following back, sorted.
    pub non_followers: Vec<Username>,
    /// Following the user but not followed back, sorted.
    pub fans: Vec<Username>,
}

impl AnalysisResult {
    /// Build a result from the two relation sets.
    pub fn from_sets(username: Username, followers: &UserSet, following: &UserSet) -> Self {
        Self {
            username,
            followers_count: followers.len(),
            following_count: following.len(),
            non_followers: following.difference(followers).cloned().collect(),
            fans: followers.difference(following).cloned().collect(),
        }
    }

    /// Accounts present in both sets.
    pub fn mutual_count(&self) -> usize {
        self.following_count - self.non_followers.len()
    }
}

/// Entry point for relationship queries.
pub struct Analyzer<S> {
    cache: RelationshipCache<S>,
}

impl<S: PageSource> Analyzer<S> {
    pub fn new(cache: RelationshipCache<S>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &RelationshipCache<S> {
        &self.cache
    }

    /// Compute non-followers and fans for `username`.
    ///
    /// The input is validated before any request. Followers and following are
    /// fetched concurrently; if either fails the whole analysis fails.
    pub async fn analyze(&self, username: &str) -> Result<AnalysisResult> {
        let username = Username::parse(username)?;

        let (followers, following) = tokio::try_join!(
            self.cache.get(&username, RelationKind::Followers),
            self.cache.get(&username, RelationKind::Following),
        )?;

        let result = AnalysisResult::from_sets(username, &followers, &following);
        tracing::info!(
            username = %result.username,
            non_followers = result.non_followers.len(),
            fans = result.fans.len(),
            "analysis complete"
        );
        Ok(result)
    }

    /// Like [`analyze`](Self::analyze), but gives up when `cancel` fires.
    ///
    /// In-flight page requests are dropped; any relation not yet fully
    /// fetched stays absent from the cache.
    pub async fn analyze_cancellable(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MutualsError::Cancelled),
            result = self.analyze(username) => result,
        }
    }

    /// Accounts `username` follows that don't follow back.
    pub async fn non_followers(&self, username: &str) -> Result<Vec<Username>> {
        Ok(self.analyze(username).await?.non_followers)
    }

    /// Accounts following `username` that aren't followed back.
    pub async fn fans(&self, username: &str) -> Result<Vec<Username>> {
        Ok(self.analyze(username).await?.fans)
    }
}
