use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration loaded explicitly from environment variables.
///
/// Every setting has a default except the rules file; when `rules_path` is `None`
/// the built-in standard ruleset is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Raises the default log level to DEBUG.
    pub debug: bool,
    /// JSON ruleset to score with instead of the standard one.
    pub rules_path: Option<PathBuf>,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
    /// Requests per second allowed on the analyze route. `None` disables limiting.
    pub rate_limit_rps: Option<u32>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `CONTRACT_ANALYZER_HOST` (default: "127.0.0.1")
    /// - `CONTRACT_ANALYZER_PORT` (default: 5000)
    /// - `CONTRACT_ANALYZER_DEBUG` (1/true/yes/on)
    /// - `CONTRACT_RULES_PATH`: JSON ruleset file
    /// - `MAX_UPLOAD_BYTES` (default: 16 MiB)
    /// - `RATE_LIMIT_RPS`: positive integer enables rate limiting
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("CONTRACT_ANALYZER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get("CONTRACT_ANALYZER_PORT") {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_PORT,
        };

        let debug = match get("CONTRACT_ANALYZER_DEBUG") {
            Some(raw) => parse_flag("CONTRACT_ANALYZER_DEBUG", &raw)?,
            None => false,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => parse_positive("MAX_UPLOAD_BYTES", &raw)?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let rate_limit_rps = match get("RATE_LIMIT_RPS") {
            Some(raw) => Some(parse_positive("RATE_LIMIT_RPS", &raw)?),
            None => None,
        };

        Ok(Self {
            host,
            port,
            debug,
            rules_path: get("CONTRACT_RULES_PATH").map(PathBuf::from),
            max_upload_bytes,
            rate_limit_rps,
        })
    }

    /// Resolve the bind address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .or_else(|_| format!("[{}]:{}", self.host, self.port).parse::<SocketAddr>())
            .map_err(|_| {
                AppError::Config(format!(
                    "CONTRACT_ANALYZER_HOST must be an IP address, got {:?}",
                    self.host
                ))
            })
    }
}

fn invalid(key: &str, expected: &str, raw: &str) -> AppError {
    AppError::Config(format!("{key} must be {expected}, got {raw:?}"))
}

fn parse_port(raw: &str) -> Result<u16, AppError> {
    raw.parse()
        .map_err(|_| invalid("CONTRACT_ANALYZER_PORT", "a port number", raw))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, "a boolean", raw)),
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
{
    raw.parse::<T>()
        .ok()
        .filter(|n| *n > T::default())
        .ok_or_else(|| invalid(key, "a positive integer", raw))
}
