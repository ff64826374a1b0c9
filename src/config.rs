use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Consent Portal";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Request timeout applied by the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of transactions requested by the history view.
pub const DEFAULT_TRANSACTIONS_LIMIT: u32 = 20;

const ENV_API_URL: &str = "CONSENT_PORTAL_API_URL";
const ENV_TIMEOUT_SECS: &str = "CONSENT_PORTAL_TIMEOUT_SECS";
const ENV_TX_LIMIT: &str = "CONSENT_PORTAL_TX_LIMIT";
const ENV_WALLET_KEY: &str = "CONSENT_PORTAL_WALLET_KEY";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "consent_portal_lib=info,consent_portal=info,warn"
}

/// Get the application data directory
/// ~/ConsentPortal/ on all platforms
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("ConsentPortal"))
}

/// Default location of the local wallet key file.
pub fn wallet_key_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("wallet.key"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("Cannot determine home directory; set CONSENT_PORTAL_WALLET_KEY")]
    NoHomeDir,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub transactions_limit: u32,
    /// `None` when no home directory exists and no override was given.
    pub wallet_key_path: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            transactions_limit: DEFAULT_TRANSACTIONS_LIMIT,
            wallet_key_path: wallet_key_path(),
        }
    }
}

impl PortalConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_positive(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_TX_LIMIT) {
            config.transactions_limit = parse_positive(ENV_TX_LIMIT, &raw)?;
        }
        if let Some(path) = get(ENV_WALLET_KEY) {
            config.wallet_key_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Wallet key location, or an error when none can be determined.
    pub fn require_wallet_key_path(&self) -> Result<PathBuf, ConfigError> {
        self.wallet_key_path.clone().ok_or(ConfigError::NoHomeDir)
    }
}

fn parse_positive<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        }),
    }
}
