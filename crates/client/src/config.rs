use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default API root. Always ends with a slash.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1/";
/// Default location of the persisted session file.
pub const DEFAULT_SESSION_PATH: &str = ".quill/session.json";
/// Cached reads stay fresh for five minutes.
pub const DEFAULT_QUERY_STALE_SECS: u64 = 300;
/// Maximum number of cached query results.
pub const DEFAULT_QUERY_CACHE_CAPACITY: u64 = 1000;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://cms.example.com/api/v1/`.
    pub api_base_url: String,
    /// CAPTCHA site key; when set, logins must carry a CAPTCHA token.
    pub captcha_site_key: Option<String>,
    /// Where the session token and role are persisted.
    pub session_path: PathBuf,
    /// Per-request timeout. `None` keeps the transport default.
    pub request_timeout_secs: Option<u64>,
    pub query_stale_secs: u64,
    pub query_cache_capacity: u64,
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `API_BASE_URL`         | `http://localhost:8000/api/v1/`  |
    /// | `CAPTCHA_SITE_KEY`     | --                               |
    /// | `QUILL_SESSION_PATH`   | `.quill/session.json`            |
    /// | `REQUEST_TIMEOUT_SECS` | -- (transport default)           |
    /// | `QUERY_STALE_SECS`     | `300`                            |
    /// | `QUERY_CACHE_CAPACITY` | `1000`                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            &lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
        );

        let captcha_site_key = lookup("CAPTCHA_SITE_KEY").filter(|k| !k.trim().is_empty());

        let session_path = lookup("QUILL_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH));

        let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")?;
        let query_stale_secs =
            parse_var(&lookup, "QUERY_STALE_SECS", "u64")?.unwrap_or(DEFAULT_QUERY_STALE_SECS);
        let query_cache_capacity = parse_var(&lookup, "QUERY_CACHE_CAPACITY", "u64")?
            .unwrap_or(DEFAULT_QUERY_CACHE_CAPACITY);

        Ok(Self {
            api_base_url,
            captcha_site_key,
            session_path,
            request_timeout_secs,
            query_stale_secs,
            query_cache_capacity,
        })
    }

    /// Defaults pointed at a specific API root.
    pub fn for_base_url(url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(url),
            ..Self::default()
        }
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.query_stale_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            captcha_site_key: None,
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            request_timeout_secs: None,
            query_stale_secs: DEFAULT_QUERY_STALE_SECS,
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var,
                expected,
                value,
            }),
    }
}
