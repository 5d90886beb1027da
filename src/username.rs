// GitHub login validation.
// Usernames are checked locally before they are ever placed in a request URL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MutualsError, Result};

/// Maximum length of a GitHub login.
pub const MAX_LEN: usize = 39;

/// A syntactically valid GitHub login.
///
/// Alphanumeric characters and single interior hyphens, 1 to 39 characters,
/// never starting or ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate and wrap a login.
    pub fn parse(input: &str) -> Result<Self> {
        if is_valid(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(MutualsError::InvalidUsername(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form. GitHub treats logins case-insensitively.
    pub fn folded(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

/// Check a login against GitHub's username rules.
pub fn is_valid(input: &str) -> bool {
    if input.is_empty() || input.len() > MAX_LEN {
        return false;
    }
    if input.starts_with('-') || input.ends_with('-') || input.contains("--") {
        return false;
    }
    input.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl FromStr for Username {
    type Err = MutualsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Username::parse(&raw).map_err(serde::de::Error::custom)
    }
}
