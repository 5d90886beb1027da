// mutuals: GitHub follow relationship analysis.
// Fetches a user's followers and followees and reports who doesn't follow back.

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod ui;
pub mod username;

#[cfg(test)]
mod testkit;

pub use analyzer::{AnalysisResult, Analyzer};
pub use config::Config;
pub use error::{MutualsError, Result};
pub use username::Username;
