use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use namescout::config::{self, Config};
use namescout::engine::{self, EngineConfig};
use namescout::generate::Pattern;
use namescout::oracle::DEFAULT_ORACLE_URL;
use namescout::source::CandidateSource;

/// Concurrent username availability scanner.
#[derive(Debug, Parser)]
#[command(name = "namescout", version)]
struct Cli {
    /// Generation pattern for candidate usernames.
    #[arg(long, value_enum, conflicts_with = "input")]
    pattern: Option<Pattern>,

    /// File of candidate usernames, one per line.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Number of probing workers.
    #[arg(long, default_value_t = engine::DEFAULT_WORKERS)]
    workers: usize,

    /// Webhook routing config (JSON).
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Newline-delimited proxy list.
    #[arg(long, default_value = "proxies.txt")]
    proxies: PathBuf,

    /// Output file for available usernames.
    #[arg(long, default_value = "valid.txt")]
    out: PathBuf,

    /// Webhook target, overriding the config file.
    #[arg(long)]
    webhook: Option<String>,

    /// Oracle endpoint to probe.
    #[arg(long, default_value = DEFAULT_ORACLE_URL)]
    oracle_url: String,
}

#[tokio::main]
async fn main() -> Result<(), engine::EngineError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "namescout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config);
    let proxies = config::load_proxies_or_default(&cli.proxies);

    let (source, configured_webhook) = if let Some(path) = &cli.input {
        (
            CandidateSource::List(config::load_candidates_or_default(path)),
            config.webhook_for_file_mode().map(str::to_string),
        )
    } else {
        let pattern = match cli.pattern {
            Some(pattern) => pattern,
            None => {
                warn!("no pattern or input file given, defaulting to five-digits");
                Pattern::FiveDigits
            }
        };
        (
            CandidateSource::Generated(pattern),
            config.webhook_for_pattern(pattern).map(str::to_string),
        )
    };

    let webhook = cli.webhook.clone().or(configured_webhook);
    if webhook.is_none() {
        info!("no webhook configured, notifications disabled");
    }

    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            interrupt.cancel();
        }
    });

    let engine_config = EngineConfig {
        workers: cli.workers,
        webhook,
        proxies,
        valid_log: cli.out.clone(),
        oracle_url: cli.oracle_url.clone(),
    };

    engine::run(engine_config, source, shutdown).await
}
