use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_KNOWLEDGE_TIMEOUT_MS: u64 = 800;

/// Process-level settings read once at startup.
///
/// - `PORT` (default 3000)
/// - `TRIAGE_CORS_ORIGINS`: comma-separated list (default `http://localhost:3000`)
/// - `TRIAGE_KNOWLEDGE_TIMEOUT_MS`: hard timeout for knowledge retrieval (default 800)
///
/// Unparseable values fall back to the default with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub knowledge_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            knowledge_timeout: Duration::from_millis(DEFAULT_KNOWLEDGE_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = parse_or_default(lookup("PORT"), "PORT", defaults.port);
        let cors_origins = lookup("TRIAGE_CORS_ORIGINS")
            .map(|raw| split_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);
        let timeout_ms = parse_or_default(
            lookup("TRIAGE_KNOWLEDGE_TIMEOUT_MS"),
            "TRIAGE_KNOWLEDGE_TIMEOUT_MS",
            DEFAULT_KNOWLEDGE_TIMEOUT_MS,
        );

        Self {
            port,
            cors_origins,
            knowledge_timeout: Duration::from_millis(timeout_ms),
        }
    }
}

fn parse_or_default<T: std::str::FromStr + Copy + std::fmt::Display>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, fallback = %default, "Invalid config value, using default");
            default
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
