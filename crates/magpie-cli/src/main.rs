//! Magpie CLI - one-shot defect collection for a single repository.

use anyhow::Context;
use clap::Parser;
use magpie_domain::Platform;
use magpie_extract::DefectExtractor;
use magpie_llm::{LlmConfig, OpenRouterProvider};
use magpie_pipeline::{Pipeline, RunRequest};
use magpie_store::DefectStore;
use tracing_subscriber::EnvFilter;

/// Collect issues from a tracker, extract defect fields, persist them once
#[derive(Parser)]
#[command(name = "magpie", version, about)]
struct Cli {
    /// Repository owner or organization (e.g. Tencent)
    owner: String,

    /// Repository name (e.g. WeUI)
    repo: String,

    /// Tracker platform: github, gitee or gitlab
    #[arg(long)]
    platform: String,

    /// Repository identifier records are keyed by
    #[arg(long)]
    repo_id: String,

    /// Issue state filter
    #[arg(long, default_value = "open")]
    state: String,

    /// Lower creation-time bound (YYYY-MM-DD or ISO-8601)
    #[arg(long)]
    since: Option<String>,

    /// Upper creation-time bound (YYYY-MM-DD or ISO-8601)
    #[arg(long)]
    until: Option<String>,

    /// SQLite database path
    #[arg(long, default_value = "magpie.db")]
    db: String,

    /// Optional TOML file with the [model] settings
    #[arg(long)]
    config: Option<String>,

    /// Model API key; flag and env both work
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier override
    #[arg(long)]
    model: Option<String>,

    /// Store this tracker token for the platform before collecting
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let platform: Platform = cli.platform.parse()?;

    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config file {path}"))?;
            LlmConfig::from_toml(&raw).map_err(anyhow::Error::msg)?
        }
        None => LlmConfig::with_api_key(cli.api_key.clone().unwrap_or_default()),
    };
    if let Some(api_key) = cli.api_key {
        config.api_key = api_key;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    let store = DefectStore::open(&cli.db)
        .with_context(|| format!("could not open database {}", cli.db))?;
    let provider = OpenRouterProvider::new(config);
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));

    if let Some(token) = &cli.token {
        pipeline.store_mut().put_token(platform, token)?;
    }

    let request = RunRequest {
        owner: cli.owner,
        repo: cli.repo,
        platform,
        state: cli.state,
        since: cli.since,
        until: cli.until,
        repo_id: cli.repo_id,
    };

    let inserted = pipeline.run(&request).await?;
    println!(
        "{} new defect records for {}/{} ({})",
        inserted, request.owner, request.repo, request.platform
    );
    Ok(())
}
