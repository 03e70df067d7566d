use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use serpline::config::load_config;
///
/// let config = load_config(Path::new("serpline.toml")).unwrap();
/// println!("Results per page: {:?}", config.query.num);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Fills in settings the environment provides when the config leaves them unset
///
/// Currently this is only the proxy, taken from `https_proxy`.
pub fn apply_environment(mut config: Config) -> Config {
    if config.connection.proxy.is_none() {
        if let Some(proxy) = https_proxy_from_environment() {
            tracing::debug!("Using proxy {} from https_proxy", proxy);
            config.connection.proxy = Some(proxy);
        }
    }
    config
}

/// Reads `https_proxy` and reduces it to HOST:PORT
pub fn https_proxy_from_environment() -> Option<String> {
    let value = std::env::var("https_proxy").ok()?;
    parse_proxy(&value)
}

/// Extracts HOST:PORT from a proxy setting
///
/// Accepts both URL form (`http://localhost:8118`) and the bare form
/// (`localhost:8118`).
pub fn parse_proxy(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let candidate = if value.contains("://") {
        value.to_string()
    } else {
        format!("http://{}", value)
    };

    let url = Url::parse(&candidate).ok()?;
    let host = url.host_str()?;
    match url.port_or_known_default() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}
