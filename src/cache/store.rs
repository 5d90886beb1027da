// Session cache of fetched relations.
// Each (user, relation) key is fetched at most once and never expires.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;

use crate::error::{MutualsError, Result};
use crate::github::{Fetcher, PageSource, RelationKind};
use crate::username::Username;

/// Deduplicated, sorted set of logins.
pub type UserSet = BTreeSet<Username>;

/// Cache key: case-folded login plus relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub login: String,
    pub kind: RelationKind,
}

impl CacheKey {
    pub fn new(username: &Username, kind: RelationKind) -> Self {
        Self {
            login: username.folded(),
            kind,
        }
    }
}

type Slot = Arc<OnceCell<Arc<UserSet>>>;

/// Relationship cache for one session.
///
/// Concurrent first requests for the same key share a single slot; whichever
/// caller gets there first runs the fetch while the others wait for it. A
/// failed or cancelled fetch leaves the slot empty, so the key stays absent
/// and a later call may try again.
pub struct RelationshipCache<S> {
    fetcher: Fetcher<S>,
    entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl<S: PageSource> RelationshipCache<S> {
    pub fn new(fetcher: Fetcher<S>) -> Self {
        Self {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<S> {
        &self.fetcher
    }

    /// Get the set for `kind` of `username`, fetching it on first use.
    pub async fn get(&self, username: &Username, kind: RelationKind) -> Result<Arc<UserSet>> {
        let key = CacheKey::new(username, kind);
        let slot = self.slot(key.clone());

        if let Some(set) = slot.get() {
            tracing::debug!(%username, %kind, "cache hit");
            return Ok(Arc::clone(set));
        }

        // Drops the slot again if the fetch fails or is cancelled.
        let vacate = Vacate {
            entries: &self.entries,
            key,
            slot,
        };
        let set = vacate
            .slot
            .get_or_try_init(|| async {
                let list = self.fetcher.fetch_all(username, kind).await?;
                let fetched = list.len();
                let set: UserSet = list.into_iter().collect();
                if set.len() != fetched {
                    tracing::debug!(
                        %username,
                        %kind,
                        duplicates = fetched - set.len(),
                        "collapsed duplicate entries"
                    );
                }
                Ok::<_, MutualsError>(Arc::new(set))
            })
            .await?;

        Ok(Arc::clone(set))
    }

    /// Cached set for a key, without fetching.
    pub fn cached(&self, username: &Username, kind: RelationKind) -> Option<Arc<UserSet>> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(&CacheKey::new(username, kind))
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of populated keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|slot| slot.initialized()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: CacheKey) -> Slot {
        let mut entries = lock(&self.entries);
        Arc::clone(entries.entry(key).or_default())
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        lock(&self.entries).len()
    }
}

fn lock(entries: &Mutex<HashMap<CacheKey, Slot>>) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
    match entries.lock() {
        Ok(entries) => entries,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Removes an empty slot from the map when the fetch that owned it ends
/// without a value.
///
/// The slot stays if another caller still holds it, since that caller may
/// retry the fetch through the same cell.
struct Vacate<'a> {
    entries: &'a Mutex<HashMap<CacheKey, Slot>>,
    key: CacheKey,
    slot: Slot,
}

impl Drop for Vacate<'_> {
    fn drop(&mut self) {
        if self.slot.initialized() {
            return;
        }
        let mut entries = lock(self.entries);
        let unshared = entries
            .get(&self.key)
            .is_some_and(|held| Arc::ptr_eq(held, &self.slot) && Arc::strong_count(held) == 2);
        if unshared {
            entries.remove(&self.key);
        }
    }
}
