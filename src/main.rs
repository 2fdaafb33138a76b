use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warlog::api::{build_router, state::AppState};
use warlog::config::AppConfig;
use warlog::models::Invocation;
use warlog::pipeline::WarlogOrchestrator;

#[derive(Parser)]
#[command(name = "warlog")]
#[command(about = "Post clan war battle reports with deck training statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults and environment are used without one)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report recent war battles of a clan once and exit
    Run {
        /// Clan tag
        #[arg(long)]
        clan_id: String,

        /// Discord webhook key (`{id}/{token}`)
        #[arg(long, env = "DISCORD_KEY")]
        discord_key: String,

        /// Look-back window in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Serve the invocation endpoint
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port number
        #[arg(long, default_value = "8080")]
        port: u16,
    },

    /// Validate configuration and print the effective settings
    CheckConfig,
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    tracing::info!("Starting warlog v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.config.as_deref()).context("Invalid configuration")?;

    match cli.command {
        Commands::Run {
            clan_id,
            discord_key,
            minutes,
        } => {
            let orchestrator = WarlogOrchestrator::from_config(&config)?;
            let invocation = Invocation {
                clan_id,
                discord_key,
                minutes,
            };

            let outcomes = orchestrator.run(&invocation).await?;
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        Commands::Serve { host, port } => {
            let state = AppState {
                orchestrator: Arc::new(WarlogOrchestrator::from_config(&config)?),
            };
            let app = build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::CheckConfig => {
            let settings = config.pipeline_settings()?;
            println!("{}", toml::to_string_pretty(&config.redacted())?);
            println!(
                "# report time zone: {}, default window: {} minutes",
                settings.report_format.time_zone, settings.default_window_minutes
            );
        }
    }

    Ok(())
}
