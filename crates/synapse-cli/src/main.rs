mod config;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use synapse_core::{SampleKey, catalog, label_index};
use synapse_llm::OpenRouterClient;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::server::{ExplainRequest, SimulateRequest, explain_scenario, simulate_scenario};

#[derive(Parser)]
#[command(
    name = "synapse",
    about = "Dense vs. sparse activation simulator and dashboard API"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides config and SYNAPSE_ADDR)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// List the built-in samples
    Samples,

    /// Print the activation payload for a built-in sample
    Sample {
        /// Sample key (sample1..sample4); unknown keys fall back to sample1
        key: Option<String>,
    },

    /// Show the sparse index each concept label hashes to
    Index {
        /// Concept labels
        #[arg(required = true)]
        labels: Vec<String>,

        /// Sparse network size (defaults to the configured hatchling size)
        #[arg(long)]
        size: Option<usize>,
    },

    /// Generate a new scenario through the LLM
    Simulate {
        /// Free-text scenario prompt
        #[arg(long)]
        prompt: Option<String>,

        /// Sampling temperature in [0, 1]
        #[arg(long)]
        creativity: Option<f64>,

        /// Preferred language for the scenario
        #[arg(long)]
        language: Option<String>,
    },

    /// Ask the LLM to explain a built-in sample's activations
    Explain {
        /// Sample key (sample1..sample4)
        #[arg(long)]
        sample: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match &cli.command {
        Commands::Serve { addr } => cmd_serve(config, *addr).await,
        Commands::Samples => cmd_samples(),
        Commands::Sample { key } => cmd_sample(key.as_deref()),
        Commands::Index { labels, size } => cmd_index(&config, labels, *size),
        Commands::Simulate {
            prompt,
            creativity,
            language,
        } => cmd_simulate(&config, prompt.clone(), *creativity, language.clone()).await,
        Commands::Explain { sample } => cmd_explain(&config, sample.as_deref()).await,
    }
}

/// Cancel `token` on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
    token.cancel();
}

async fn cmd_serve(mut config: Config, addr: Option<SocketAddr>) -> Result<()> {
    if let Some(addr) = addr {
        config.server.addr = addr;
    }
    let token = CancellationToken::new();
    tokio::spawn(shutdown_signal(token.clone()));
    server::run(&config, token).await
}

fn cmd_samples() -> Result<()> {
    for sample in catalog() {
        println!("{:<8} {}", sample.id, sample.title);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn resolve_sample(key: Option<&str>) -> SampleKey {
    let resolved = SampleKey::resolve(key);
    if let Some(key) = key
        && key.trim() != resolved.as_str()
    {
        tracing::warn!("unknown sample '{key}', using {resolved}");
    }
    resolved
}

fn cmd_sample(key: Option<&str>) -> Result<()> {
    let payload = resolve_sample(key).definition().simulate();
    print_json(&payload)
}

fn cmd_index(config: &Config, labels: &[String], size: Option<usize>) -> Result<()> {
    let size = size.unwrap_or(config.server.hatchling_size);
    for label in labels {
        let index = label_index(label, size)
            .with_context(|| format!("failed to index '{label}'"))?;
        println!("{index}\t{label}");
    }
    Ok(())
}

fn llm_client(config: &Config) -> Result<OpenRouterClient> {
    OpenRouterClient::new(config.llm.clone()).context("failed to build LLM client")
}

async fn cmd_simulate(
    config: &Config,
    prompt: Option<String>,
    creativity: Option<f64>,
    language: Option<String>,
) -> Result<()> {
    let client = llm_client(config)?;
    let request = SimulateRequest {
        prompt,
        creativity,
        language_hint: language,
    };
    let payload = simulate_scenario(&client, config.server.sizes(), request)
        .await
        .context("scenario generation failed (is OPENROUTER_API_KEY set?)")?;
    print_json(&payload)
}

async fn cmd_explain(config: &Config, sample: Option<&str>) -> Result<()> {
    let client = llm_client(config)?;
    let def = resolve_sample(sample).definition();
    let request = ExplainRequest {
        sample_id: Some(def.key.to_string()),
        text: Some(def.text.to_string()),
        context: Some(def.context.to_string()),
        concepts: def.concepts().iter().map(Into::into).collect(),
    };
    let explanation = explain_scenario(&client, request)
        .await
        .context("explanation failed")?;
    println!("{explanation}");
    Ok(())
}
