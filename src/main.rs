use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodify_server::background_jobs::jobs::KeepAliveJob;
use moodify_server::background_jobs::JobScheduler;
use moodify_server::catalog::load_catalog;
use moodify_server::config;
use moodify_server::emotion::make_face_analyzer;
use moodify_server::server::{run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the CSV song catalog. Can also be set in the config file.
    #[clap(value_parser = parse_path)]
    pub catalog_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = config::DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    /// The port for the metrics server (Prometheus scraping). Disabled when not set.
    #[clap(long)]
    pub metrics_port: Option<u16>,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the facial emotion analysis service.
    #[clap(long)]
    pub face_analyzer_url: Option<String>,

    /// Timeout in seconds for facial analysis requests.
    #[clap(long, default_value_t = config::DEFAULT_FACE_ANALYZER_TIMEOUT_SEC)]
    pub face_analyzer_timeout_sec: u64,

    /// Maximum accepted request body size in bytes.
    #[clap(long, default_value_t = config::DEFAULT_MAX_IMAGE_BYTES)]
    pub max_image_bytes: usize,

    /// URL to ping periodically so the service is not idled. Disabled when not set.
    #[clap(long)]
    pub keep_alive_url: Option<String>,

    /// Interval in seconds between keep-alive pings.
    #[clap(long, default_value_t = config::DEFAULT_KEEP_ALIVE_INTERVAL_SECS)]
    pub keep_alive_interval_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            catalog_path: args.catalog_path.clone(),
            port: args.port,
            bind_address: args.bind_address.clone(),
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            face_analyzer_url: args.face_analyzer_url.clone(),
            face_analyzer_timeout_sec: args.face_analyzer_timeout_sec,
            max_image_bytes: args.max_image_bytes,
            keep_alive_url: args.keep_alive_url.clone(),
            keep_alive_interval_sec: args.keep_alive_interval_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  catalog_path: {:?}", app_config.catalog_path);
    info!("  bind: {}:{}", app_config.bind_address, app_config.port);
    info!("  logging_level: {}", app_config.logging_level);

    let catalog = load_catalog(&app_config.catalog_path)?;

    let face_analyzer = make_face_analyzer(
        app_config.face_analyzer_url.as_deref(),
        app_config.face_analyzer_timeout_sec,
    )?;

    let shutdown_token = CancellationToken::new();

    let mut scheduler = JobScheduler::new(shutdown_token.child_token());
    if let Some(keep_alive) = &app_config.keep_alive {
        info!(
            "Keep-alive enabled: pinging {} every {:?}",
            keep_alive.url, keep_alive.interval
        );
        scheduler.register_job(Arc::new(KeepAliveJob::new(keep_alive)?));
    }
    let scheduler_handle = scheduler.spawn();

    let server_shutdown = shutdown_token.clone();
    let server = run_server(
        app_config.server_config(),
        catalog,
        face_analyzer,
        server_shutdown,
    );
    tokio::pin!(server);

    let result = tokio::select! {
        result = &mut server => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            server.await
        }
    };

    shutdown_token.cancel();
    scheduler_handle.shutdown().await;
    result
}
