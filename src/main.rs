use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sleeplog::clients::{GarminClient, GitHubClient};
use sleeplog::config::{self, GarminConfig, GitHubConfig};
use sleeplog::pipeline::{self, NoteRequest, Outcome, SyncRequest};
use sleeplog::repo;
use sleeplog_core::{describe_age, local_today};

#[derive(Parser)]
#[command(name = "sleeplog")]
#[command(about = "Post Garmin sleep records and quick notes to GitHub issues")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a day's sleep record from Garmin Connect and post it
    Sync {
        /// Day to fetch (YYYY-MM-DD); defaults to today in UTC+8
        #[arg(long)]
        date: Option<String>,

        /// Issue number to comment on
        #[arg(long, default_value_t = 1)]
        issue: u64,

        /// Repository as owner/name; defaults to GITHUB_REPOSITORY or the git remote
        #[arg(long)]
        repo: Option<String>,

        /// Print the comment instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Post a quick note as an issue comment
    Note {
        /// Note content to post
        note: String,

        /// Issue number to comment on
        #[arg(long)]
        issue: u64,

        /// Repository as owner/name; defaults to GITHUB_REPOSITORY or the git remote
        #[arg(long)]
        repo: Option<String>,

        /// Print the comment instead of posting it
        #[arg(long)]
        dry_run: bool,

        /// Append the child's age (from CHILD_BIRTHDAY) to the note
        #[arg(long)]
        child: bool,
    },
}

/// Initialize tracing on stderr so stdout only carries the result line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "sleeplog=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli.command).await {
        Ok(outcome) => {
            println!("{}", outcome.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            println!("✗ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<Outcome> {
    let now = Utc::now();
    let today = local_today(now);

    match command {
        Commands::Sync {
            date,
            issue,
            repo: repo_flag,
            dry_run,
        } => {
            let request = SyncRequest::new(issue, date.as_deref(), today, dry_run)?;
            let github_config = GitHubConfig::from_env()?;
            let garmin_config = GarminConfig::from_env()?;
            let repository =
                repo::resolve(repo_flag.as_deref(), config::env_var("GITHUB_REPOSITORY"))?;
            tracing::info!("Using repository: {}", repository);

            let github = GitHubClient::new(&github_config, repository)
                .context("failed to build GitHub client")?;
            let garmin =
                GarminClient::new(&garmin_config).context("failed to build Garmin client")?;

            Ok(pipeline::run_sync(&github, &garmin, &request, now).await?)
        }
        Commands::Note {
            note,
            issue,
            repo: repo_flag,
            dry_run,
            child,
        } => {
            let age = child.then(|| describe_age(config::child_birthday(config::env_var), today));
            let request = NoteRequest::new(issue, &note, age.as_deref(), dry_run)?;
            let github_config = GitHubConfig::from_env()?;
            let repository =
                repo::resolve(repo_flag.as_deref(), config::env_var("GITHUB_REPOSITORY"))?;
            tracing::info!("Using repository: {}", repository);

            let github = GitHubClient::new(&github_config, repository)
                .context("failed to build GitHub client")?;

            Ok(pipeline::run_note(&github, &request, now).await?)
        }
    }
}
