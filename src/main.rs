// mutuals command line entry point.
// Parses arguments, sets up logging and runs either one-shot or interactive mode.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use mutuals::cache::RelationshipCache;
use mutuals::export::{self, ExportFormat, ListKind};
use mutuals::github::{Fetcher, GitHubClient, RetryPolicy, client::GITHUB_API_BASE};
use mutuals::ui::{self, MenuChoice};
use mutuals::{AnalysisResult, Analyzer, Config, MutualsError, Result, Username};

#[derive(Parser, Debug)]
#[command(
    name = "mutuals",
    version,
    about = "Find GitHub accounts that don't follow you back, and fans you don't follow back"
)]
struct Cli {
    /// GitHub username to analyze. Starts an interactive session when omitted.
    username: Option<String>,

    /// Only list accounts you follow that don't follow back.
    #[arg(long, conflicts_with = "fans")]
    non_followers: bool,

    /// Only list accounts following you that you don't follow back.
    #[arg(long)]
    fans: bool,

    /// Save the listed accounts as txt, csv or json.
    #[arg(long, value_name = "FORMAT")]
    export: Option<ExportFormat>,

    /// Directory for exported files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Log filter, e.g. `debug` or `mutuals=trace`.
    #[arg(short = 'l', long = "log", env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    /// GitHub REST API base URL.
    #[arg(long, env = "MUTUALS_API_URL", default_value = GITHUB_API_BASE)]
    api_url: String,

    /// Items requested per page (max 100).
    #[arg(long, env = "MUTUALS_PER_PAGE", default_value_t = 100)]
    per_page: u32,

    /// Per-request timeout in seconds.
    #[arg(long, env = "MUTUALS_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Retries for transient network failures.
    #[arg(long, env = "MUTUALS_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Initial retry backoff in milliseconds; doubles per retry.
    #[arg(long, env = "MUTUALS_BACKOFF_MS", default_value_t = 1000)]
    backoff_ms: u64,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_api_url(&self.api_url)
            .with_per_page(self.per_page)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(RetryPolicy {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.backoff_ms),
                ..RetryPolicy::default()
            })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(MutualsError::Cancelled) => {
            println!();
            ui::info("Interrupted.");
            // A prompt may still be parked in a blocking stdin read, which
            // would hold up runtime shutdown.
            std::process::exit(130);
        }
        Err(e) => {
            ui::error(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    tracing::debug!(?config, "starting session");

    let client = GitHubClient::new(&config)?;
    let analyzer = Analyzer::new(RelationshipCache::new(Fetcher::new(client, &config)));

    match &cli.username {
        Some(username) => one_shot(&cli, &analyzer, username).await,
        None => interactive(&cli, &analyzer).await,
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Prompt for a line; Ctrl-C while waiting yields `Cancelled`.
async fn prompt(label: &str) -> Result<Option<String>> {
    ui::interruptible(ui::prompt_async(label), ctrl_c()).await
}

/// Run an analysis that Ctrl-C cancels.
async fn analyze(analyzer: &Analyzer<GitHubClient>, username: &str) -> Result<AnalysisResult> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        ctrl_c().await;
        trigger.cancel();
    });

    let result = analyzer.analyze_cancellable(username, &cancel).await;
    watcher.abort();
    result
}

async fn one_shot(
    cli: &Cli,
    analyzer: &Analyzer<GitHubClient>,
    username: &str,
) -> Result<()> {
    let result = analyze(analyzer, username).await?;
    ui::info(&ui::summary(&result));

    let lists = [
        (ListKind::NonFollowers, &result.non_followers, !cli.fans),
        (ListKind::Fans, &result.fans, !cli.non_followers),
    ];
    for (kind, users, wanted) in lists {
        if !wanted {
            continue;
        }
        ui::print_list(users, title(kind));
        if let Some(format) = cli.export {
            save(users, &cli.out, &kind.file_stem(&result.username), format)?;
        }
    }

    let rate = analyzer.cache().fetcher().source().rate_limit();
    tracing::debug!(remaining = rate.remaining, limit = rate.limit, "rate limit after analysis");
    Ok(())
}

async fn interactive(cli: &Cli, analyzer: &Analyzer<GitHubClient>) -> Result<()> {
    ui::banner();

    let username = loop {
        let Some(input) = prompt("Enter your GitHub username: ").await? else {
            return Ok(());
        };
        match Username::parse(&input) {
            Ok(username) => break username,
            Err(_) => ui::error("Invalid GitHub username. Please try again."),
        }
    };

    loop {
        ui::menu();
        let Some(input) = prompt("Enter your choice (1-3): ").await? else {
            return Ok(());
        };

        let kind = match MenuChoice::parse(&input) {
            Some(MenuChoice::NonFollowers) => ListKind::NonFollowers,
            Some(MenuChoice::Fans) => ListKind::Fans,
            Some(MenuChoice::Exit) => {
                ui::info("Goodbye!");
                return Ok(());
            }
            None => {
                ui::error("Invalid choice. Please enter a number between 1 and 3.");
                continue;
            }
        };

        if analyzer.cache().is_empty() {
            ui::info(&format!("Fetching followers and following for {username}..."));
        }
        let result = match analyze(analyzer, username.as_str()).await {
            Ok(result) => result,
            Err(MutualsError::Cancelled) => {
                ui::error("\nCancelled.");
                continue;
            }
            Err(e) => {
                ui::error(&format!("Error: {e}"));
                continue;
            }
        };

        let users = match kind {
            ListKind::NonFollowers => &result.non_followers,
            ListKind::Fans => &result.fans,
        };
        ui::print_list(users, title(kind));
        if users.is_empty() {
            continue;
        }

        let answer = prompt("Save this list to a file? (y/n): ").await?.unwrap_or_default();
        if !answer.eq_ignore_ascii_case("y") {
            continue;
        }
        let format = prompt("Enter format (txt, csv, json): ").await?.unwrap_or_default();
        match format.parse::<ExportFormat>() {
            Ok(format) => {
                if let Err(e) = save(users, &cli.out, &kind.file_stem(&username), format) {
                    ui::error(&format!("Error saving file: {e}"));
                }
            }
            Err(e) => ui::error(&e.to_string()),
        }
    }
}

fn save(users: &[Username], dir: &std::path::Path, stem: &str, format: ExportFormat) -> Result<()> {
    let path = export::export(users, dir, stem, format)?;
    ui::success(&format!("Successfully saved list to {}", path.display()));
    Ok(())
}

fn title(kind: ListKind) -> &'static str {
    match kind {
        ListKind::NonFollowers => "Users Who Don't Follow You Back",
        ListKind::Fans => "Your 'Fans' (You Don't Follow Them Back)",
    }
}
