// Cache module for in-memory relation caching.
// Holds fetched follower/following sets for the lifetime of a session.

pub mod store;

pub use store::{CacheKey, RelationshipCache, UserSet};
