use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::catalog::CatalogSource;

pub const DEFAULT_WHATSAPP_NUMBER: &str = "573332571225";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub catalog_source: CatalogSource,
    pub whatsapp_number: String,
    pub script_url: Option<String>,
    pub nats_url: Option<String>,
    pub http_timeout: Duration,
    /// Sessions idle longer than this are dropped.
    pub session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8083,
            catalog_source: CatalogSource::parse("productos.json"),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            script_url: None,
            nats_url: None,
            http_timeout: Duration::from_secs(15),
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    /// Reads the environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            port: try_load("PORT", defaults.port),
            catalog_source: CatalogSource::parse(&try_load("CATALOG_SOURCE", defaults.catalog_source.to_string())),
            whatsapp_number: try_load("WHATSAPP_NUMBER", defaults.whatsapp_number),
            script_url: optional("SCRIPT_URL"),
            nats_url: optional("NATS_URL"),
            http_timeout: Duration::from_secs(try_load("HTTP_TIMEOUT_SECS", defaults.http_timeout.as_secs())),
            session_ttl: Duration::from_secs(try_load("SESSION_TTL_SECS", defaults.session_ttl.as_secs())),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn optional(key: &str) -> Option<String> {
    let value = var(key);
    if value.is_none() {
        info!("{key} not set");
    }
    value
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}
