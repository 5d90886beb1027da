// Export of username lists.
// Writes plain text, CSV or JSON files; the analysis itself never touches disk.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{MutualsError, Result};
use crate::username::Username;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Txt,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Render a list in this format.
    pub fn render(&self, users: &[Username]) -> Result<String> {
        let rendered = match self {
            ExportFormat::Txt => users.iter().map(|u| format!("{u}\n")).collect(),
            ExportFormat::Csv => {
                let mut out = String::from("username\n");
                for user in users {
                    out.push_str(user.as_str());
                    out.push('\n');
                }
                out
            }
            ExportFormat::Json => serde_json::to_string_pretty(users)?,
        };
        Ok(rendered)
    }
}

impl FromStr for ExportFormat {
    type Err = MutualsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(MutualsError::Other(format!(
                "Unsupported file format: {other}"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which list is being saved, used to name the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    NonFollowers,
    Fans,
}

impl ListKind {
    /// Default file stem, e.g. `octocat_non_followers`.
    pub fn file_stem(&self, username: &Username) -> String {
        let suffix = match self {
            ListKind::NonFollowers => "non_followers",
            ListKind::Fans => "fans",
        };
        format!("{}_{}", username, suffix)
    }
}

/// Write `users` to `{dir}/{stem}.{ext}` and return the path.
pub fn export(users: &[Username], dir: &Path, stem: &str, format: ExportFormat) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    let contents = format.render(users)?;

    fs::create_dir_all(dir)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, &path)?;

    tracing::info!(path = %path.display(), count = users.len(), "exported list");
    Ok(path)
}
