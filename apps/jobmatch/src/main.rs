use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobmatch::sources::configured_sources;
use jobmatch::{AggregationEngine, CandidateProfile, Config, SearchRequest};

#[derive(Parser)]
#[command(name = "jobmatch", version, about = "Aggregate and rank job listings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search every configured source and print ranked listings as JSON
    Search {
        /// Search keywords. Blank falls back to the profile's first preferred role
        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(short, long)]
        location: Option<String>,

        /// Candidate skill, repeatable
        #[arg(short, long = "skill")]
        skills: Vec<String>,

        /// JSON file holding a candidate profile
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Search {
            query,
            location,
            skills,
            profile,
        } => {
            let mut request = SearchRequest::new(query);
            if let Some(location) = location {
                request = request.with_location(location);
            }
            if !skills.is_empty() {
                request = request.with_skills(skills);
            }
            if let Some(path) = profile {
                request = request.with_profile(load_profile(&path).await?);
            }

            let mut engine = AggregationEngine::new(config.weights.clone());
            for source in configured_sources(&config)? {
                engine = engine.with_source(source);
            }
            info!(
                "jobmatch v{} searching sources: {:?}",
                env!("CARGO_PKG_VERSION"),
                engine.source_names()
            );

            let results = engine.search(&request).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

async fn load_profile(path: &Path) -> Result<CandidateProfile> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading profile {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
}
