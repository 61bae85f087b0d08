use std::env;

use thiserror::Error;

/// Startup configuration failures. Fatal: the server refuses to start
/// without its gateway credentials rather than failing per-request.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Credentials and endpoint for the PayOS gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub client_id: String,
    pub api_key: String,
    /// Shared secret for signing payment requests and verifying webhooks
    pub checksum_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub gateway: GatewayConfig,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("CAMPUSPAY_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = match env::var("PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| ConfigError::InvalidVar("PORT", p.clone()))?,
            Err(_) => 3000,
        };

        let gateway = GatewayConfig {
            client_id: require("GATEWAY_CLIENT_ID")?,
            api_key: require("GATEWAY_API_KEY")?,
            checksum_key: require("GATEWAY_CHECKSUM_KEY")?,
            base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api-merchant.payos.vn".to_string()),
        };

        Ok(Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "campuspay.db".to_string()),
            gateway,
            dev_mode,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
