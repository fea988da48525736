use super::RequestsLoggingLevel;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub bind_address: String,
    pub port: u16,
    /// Port of the Prometheus endpoint, not served when `None`.
    pub metrics_port: Option<u16>,
    /// Body size limit for image uploads.
    pub max_image_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            metrics_port: None,
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}
