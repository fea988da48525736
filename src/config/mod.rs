mod file_config;

pub use file_config::{FileConfig, KeepAliveConfig};

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_FACE_ANALYZER_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_KEEP_ALIVE_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_KEEP_ALIVE_TIMEOUT_SECS: u64 = 10;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_path: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
    pub metrics_port: Option<u16>,
    pub logging_level: RequestsLoggingLevel,
    pub face_analyzer_url: Option<String>,
    pub face_analyzer_timeout_sec: u64,
    pub max_image_bytes: usize,
    pub keep_alive_url: Option<String>,
    pub keep_alive_interval_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            catalog_path: None,
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            metrics_port: None,
            logging_level: RequestsLoggingLevel::default(),
            face_analyzer_url: None,
            face_analyzer_timeout_sec: DEFAULT_FACE_ANALYZER_TIMEOUT_SEC,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            keep_alive_url: None,
            keep_alive_interval_sec: DEFAULT_KEEP_ALIVE_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub metrics_port: Option<u16>,
    pub logging_level: RequestsLoggingLevel,
    pub face_analyzer_url: Option<String>,
    pub face_analyzer_timeout_sec: u64,
    pub max_image_bytes: usize,

    /// `None` when no keep-alive URL is configured.
    pub keep_alive: Option<KeepAliveSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveSettings {
    pub url: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_path = file
            .catalog_path
            .map(PathBuf::from)
            .or_else(|| cli.catalog_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "catalog_path must be specified on the command line or in config file"
                )
            })?;

        if !catalog_path.exists() {
            bail!("Catalog file does not exist: {:?}", catalog_path);
        }
        if !catalog_path.is_file() {
            bail!("catalog_path is not a file: {:?}", catalog_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());
        let metrics_port = file.metrics_port.or(cli.metrics_port);

        let logging_level = match file.logging_level {
            Some(level) => match parse_logging_level(&level) {
                Some(level) => level,
                None => bail!("Unknown logging_level in config file: {}", level),
            },
            None => cli.logging_level.clone(),
        };

        let face_analyzer_url = file
            .face_analyzer_url
            .or_else(|| cli.face_analyzer_url.clone());
        if let Some(url) = &face_analyzer_url {
            validate_http_url("face_analyzer_url", url)?;
        }
        let face_analyzer_timeout_sec = file
            .face_analyzer_timeout_sec
            .unwrap_or(cli.face_analyzer_timeout_sec);
        let max_image_bytes = file.max_image_bytes.unwrap_or(cli.max_image_bytes);
        if max_image_bytes == 0 {
            bail!("max_image_bytes must be greater than zero");
        }

        // [keep_alive] section takes precedence over CLI args
        let ka_file = file.keep_alive.unwrap_or_default();
        let keep_alive = match ka_file.url.or_else(|| cli.keep_alive_url.clone()) {
            Some(url) => {
                validate_http_url("keep_alive.url", &url)?;
                let interval_secs = ka_file
                    .interval_secs
                    .unwrap_or(cli.keep_alive_interval_sec);
                if interval_secs == 0 {
                    bail!("keep_alive interval must be greater than zero");
                }
                Some(KeepAliveSettings {
                    url,
                    interval: Duration::from_secs(interval_secs),
                    timeout: Duration::from_secs(
                        ka_file
                            .timeout_secs
                            .unwrap_or(DEFAULT_KEEP_ALIVE_TIMEOUT_SECS),
                    ),
                })
            }
            None => None,
        };

        Ok(Self {
            catalog_path,
            port,
            bind_address,
            metrics_port,
            logging_level,
            face_analyzer_url,
            face_analyzer_timeout_sec,
            max_image_bytes,
            keep_alive,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            bind_address: self.bind_address.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            max_image_bytes: self.max_image_bytes,
        }
    }
}

fn validate_http_url(name: &str, url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("{} must start with http:// or https://, got {:?}", name, url);
    }
    Ok(())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
