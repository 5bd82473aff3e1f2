use url::Url;

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:8080";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub app_url: String,

    /// Base URL of the external payment gateway, if one is configured.
    /// When absent, payment confirmations are accepted without an outbound
    /// verification call.
    pub payment_gateway_url: Option<Url>,
    pub payment_gateway_secret: Option<String>,

    /// When set, read-only ticket verification also appends a scan record.
    /// Off by default so that verification stays side-effect free.
    pub record_verify_scans: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let payment_gateway_url = match std::env::var("PAYMENT_GATEWAY_URL") {
            Ok(raw) => Some(
                Url::parse(&raw)
                    .map_err(|_| ConfigError::InvalidEnvVar("PAYMENT_GATEWAY_URL".to_string()))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string()),
            payment_gateway_url,
            payment_gateway_secret: std::env::var("PAYMENT_GATEWAY_SECRET").ok(),
            record_verify_scans: std::env::var("TICKET_RECORD_VERIFY_SCANS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}
