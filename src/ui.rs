// Terminal presentation.
// Colored messages, list rendering and the interactive menu prompts.

use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;

use crate::analyzer::AnalysisResult;
use crate::error::{MutualsError, Result};
use crate::username::Username;

/// Menu entries of the interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NonFollowers,
    Fans,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::NonFollowers),
            "2" => Some(MenuChoice::Fans),
            "3" | "q" | "quit" | "exit" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

pub fn banner() {
    println!("{}", "Welcome to the GitHub Relationship Analyzer!".magenta().bold());
}

pub fn menu() {
    println!();
    println!("What would you like to do?");
    println!("  1. Find users you follow who DON'T follow you back");
    println!("  2. Find users who follow you that you DON'T follow back (Fans)");
    println!("  3. Exit");
}

pub fn info(message: &str) {
    println!("{}", message.cyan());
}

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

/// Render a titled list block.
pub fn render_list(users: &[Username], title: &str) -> String {
    if users.is_empty() {
        return format!("{}\n", "All good! No users found in this category.".green());
    }

    let mut out = format!(
        "\n{}\n",
        format!("--- {} ({}) ---", title, users.len()).yellow().bold()
    );
    for user in users {
        out.push_str(&format!("  - {}\n", user));
    }
    out.push_str(&format!("{}\n", "------------------------".yellow().bold()));
    out
}

pub fn print_list(users: &[Username], title: &str) {
    print!("{}", render_list(users, title));
}

/// One-line summary of an analysis.
pub fn summary(result: &AnalysisResult) -> String {
    format!(
        "{}: {} followers, {} following, {} mutual",
        result.username,
        result.followers_count,
        result.following_count,
        result.mutual_count()
    )
}

/// Print `label` and read one trimmed line. `None` on end of input.
pub fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}", label.bold());
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// [`prompt`] on the blocking pool, so the wait for input can race other futures.
pub async fn prompt_async(label: &str) -> Result<Option<String>> {
    let label = label.to_string();
    tokio::task::spawn_blocking(move || prompt(&label))
        .await
        .map_err(|e| MutualsError::Other(e.to_string()))?
        .map_err(MutualsError::from)
}

/// Run `work` unless `interrupt` resolves first, in which case `work` is
/// dropped and the result is [`MutualsError::Cancelled`].
pub async fn interruptible<T>(
    work: impl Future<Output = Result<T>>,
    interrupt: impl Future<Output = ()>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = interrupt => Err(MutualsError::Cancelled),
        result = work => result,
    }
}
