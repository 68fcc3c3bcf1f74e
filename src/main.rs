use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tourguard::config::{LoggingConfig, TourguardConfig};
use tourguard::console::{self, Console};
use tourguard::ratelimit::{fingerprint, ClientSignals, LimiterRegistry};

#[derive(Parser, Debug)]
#[command(name = "tourguard", version, about = "Fixed-window rate limiting for the TourCompanion portal")]
struct Cli {
    /// YAML configuration file; `TOURGUARD__*` environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and print the effective settings
    CheckConfig,
    /// Derive a client fingerprint usable as a limiter key
    Fingerprint {
        #[arg(long, default_value = "")]
        user_agent: String,
        #[arg(long, default_value = "")]
        language: String,
        #[arg(long, default_value = "")]
        timezone: String,
    },
    /// Replay a YAML request trace against simulated time
    Replay {
        /// Path to the trace file
        trace: PathBuf,
    },
    /// Read commands from stdin and answer with JSON lines
    Console,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = TourguardConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting tourguard");

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::CheckConfig => {
            write!(stdout, "{}", config.to_yaml()?)?;
        }
        Commands::Fingerprint {
            user_agent,
            language,
            timezone,
        } => {
            let signals = ClientSignals::new(user_agent, language, timezone);
            writeln!(stdout, "{}", fingerprint(&signals))?;
        }
        Commands::Replay { trace } => {
            let steps = console::load_trace(&trace)
                .with_context(|| format!("failed to read trace {}", trace.display()))?;
            for record in console::replay(&config, &steps)? {
                writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
            }
        }
        Commands::Console => {
            drop(stdout);
            let registry = Arc::new(LimiterRegistry::from_config(&config)?);
            let stats = Console::new(registry)
                .run(
                    BufReader::new(tokio::io::stdin()),
                    tokio::io::stdout(),
                    shutdown_signal(),
                )
                .await?;
            info!(commands = stats.commands, errors = stats.errors, "tourguard stopped");
        }
    }

    Ok(())
}

/// Install the global subscriber. Logs go to stderr so stdout stays machine-readable.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
