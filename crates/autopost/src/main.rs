//! Autopost CLI - discover, draft and publish one post per run.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autopost::ai::provider_for_model;
use autopost::auth::AuthRecorder;
use autopost::browser::ChromeDriver;
use autopost::history::{History, HistoryStore};
use autopost::publish::SITE_URL;
use autopost::search::TavilyClient;
use autopost::{
    Config, ContentGenerator, Persona, Pipeline, Publisher, RunOutcome, RunReport, TopicDiscovery,
};

/// Autopost CLI - persona-driven posting pipeline.
#[derive(Parser)]
#[command(name = "autopost")]
#[command(about = "Discover a fresh topic, draft a post in a persona's voice, and publish it")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline once (for CronJob use)
    Run {
        #[command(flatten)]
        config: Config,
    },

    /// Interactive login recording (run locally, not in container)
    Auth {
        /// Where to write the auth state
        #[arg(long, env = "AUTOPOST_AUTH_STATE", default_value = "auth_state.json")]
        output: PathBuf,

        /// Login page to open
        #[arg(long, default_value = "https://x.com/i/flow/login")]
        login_url: String,
    },

    /// List recent history entries
    History {
        /// History CSV file
        #[arg(long, env = "AUTOPOST_HISTORY", default_value = "post_history.csv")]
        history: PathBuf,

        /// Limit results
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("autopost=debug,info")
    } else {
        EnvFilter::new("autopost=info,warn")
    };

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    match cli.command {
        Commands::Run { config } => {
            tracing::info!(
                model = %config.model,
                history = %config.history.display(),
                headed = config.headed,
                "Starting autopost run"
            );
            run_once(config).await
        }
        Commands::Auth { output, login_url } => {
            tracing::info!(output = %output.display(), "Starting authentication");
            run_auth(output, login_url).await
        }
        Commands::History { history, limit } => run_history(history, limit),
    }
}

async fn run_once(config: Config) -> Result<()> {
    config.validate()?;
    let persona = Persona::load(&config.persona)?;

    let api_key = config
        .search_api_key()
        .context("TAVILY_API_KEY is required")?;
    let search = Arc::new(TavilyClient::new(api_key)?);
    let provider = provider_for_model(&config.model)?;

    let discovery = TopicDiscovery::new(search, config.discovery_config());
    let generator = ContentGenerator::new(provider, config.generation_config())?;
    let driver = Arc::new(ChromeDriver::new(!config.headed, SITE_URL));
    let publisher = Publisher::new(driver, config.publish_config());

    let pipeline = Pipeline::new(
        HistoryStore::new(&config.history),
        discovery,
        generator,
        publisher,
    );
    let report = pipeline.run(&persona).await?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let status = match &report.outcome {
        RunOutcome::PublishedWithReference(_) => report.outcome.to_string().green(),
        RunOutcome::PublishedWithoutReference { .. } => report.outcome.to_string().yellow(),
        RunOutcome::GenerationFailed | RunOutcome::TopicDiscoveryFailed => {
            report.outcome.to_string().red()
        }
    };

    println!("\n📊 Run Summary");
    println!("   Outcome: {}", status.bold());
    if let Some(topic) = &report.topic {
        println!("   Topic: {topic}");
    }
    match &report.outcome {
        RunOutcome::PublishedWithReference(url) => println!("   URL: {}", url.cyan()),
        RunOutcome::PublishedWithoutReference { reached } => {
            println!("   Stage reached: {reached}");
            if let Some(note) = report.outcome.unsubmitted_note() {
                println!("   {}", note.red());
            }
        }
        RunOutcome::GenerationFailed | RunOutcome::TopicDiscoveryFailed => {}
    }
    if report.generation_attempts > 0 {
        println!("   Drafting attempts: {}", report.generation_attempts);
    }
    if !report.recorded {
        eprintln!("   {}", "History entry could not be written".red());
    }
}

async fn run_auth(output: PathBuf, login_url: String) -> Result<()> {
    println!("🔐 Autopost - Login Recording\n");

    let recorder = AuthRecorder::new(login_url);
    let state = recorder.record(&output).await?;

    println!(
        "{} Auth state with {} cookies saved to: {}",
        "✅".green(),
        state.cookies.len(),
        output.display()
    );
    Ok(())
}

fn run_history(path: PathBuf, limit: usize) -> Result<()> {
    let store = HistoryStore::new(&path);
    let history = History::new(store.load()?);

    println!("📋 History in {}\n", path.display());

    if history.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    let entries = history.entries();
    let shown = &entries[entries.len().saturating_sub(limit)..];
    for entry in shown.iter().rev() {
        let topic = entry.topic.as_deref().unwrap_or("-");
        if let Some(failure) = entry.failure() {
            println!("❌ {} {} ({})", entry.timestamp, topic.bold(), failure.to_string().red());
        } else {
            println!("📝 {} {}", entry.timestamp, topic.bold());
            println!("   {}", preview(&entry.posted_text));
            match &entry.published_url {
                Some(url) => println!("   {}", url.cyan()),
                None => println!("   {}", "reference unknown".yellow()),
            }
        }
        println!();
    }

    println!("Total: {} of {} entries", shown.len(), history.len());
    Ok(())
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 100 {
        format!("{}...", flat.chars().take(97).collect::<String>())
    } else {
        flat
    }
}
