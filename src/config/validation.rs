use crate::config::types::{Config, ConnectionConfig};
use crate::query::{domains, QueryOptions};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_query_options(&config.query)?;
    validate_connection_config(&config.connection)?;
    Ok(())
}

/// Validates the initial query options
fn validate_query_options(options: &QueryOptions) -> Result<(), ConfigError> {
    if let Some(num) = options.num {
        if num < 1 {
            return Err(ConfigError::Validation(format!(
                "num must be a positive integer, got {}",
                num
            )));
        }
    }

    if let Some(duration) = &options.duration {
        if !is_duration(duration) {
            return Err(ConfigError::Validation(format!(
                "'{}' is not a valid duration (expected e.g. h5, d5, w5, m5, y5)",
                duration
            )));
        }
    }

    if let Some(tld) = &options.tld {
        if domains::domain_for(tld).is_none() {
            tracing::warn!("Unknown country code '{}', using {}", tld, domains::DEFAULT_HOST);
        }
    }

    Ok(())
}

/// Validates connection configuration
fn validate_connection_config(config: &ConnectionConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if let Some(proxy) = &config.proxy {
        validate_proxy(proxy)?;
    }

    Ok(())
}

/// Validates a HOST:PORT proxy string
fn validate_proxy(proxy: &str) -> Result<(), ConfigError> {
    let (host, port) = proxy
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::InvalidProxy(format!("'{}' is not HOST:PORT", proxy)))?;

    if host.is_empty() {
        return Err(ConfigError::InvalidProxy(format!(
            "'{}' has an empty host",
            proxy
        )));
    }

    port.parse::<u16>()
        .map_err(|_| ConfigError::InvalidProxy(format!("'{}' has an invalid port", proxy)))?;

    Ok(())
}

/// Checks if a string is a valid time restriction
///
/// A valid duration is a single unit letter (h, d, w, m or y) followed by a
/// non-negative integer, e.g. `d5` for the last five days.
pub fn is_duration(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some('h' | 'd' | 'w' | 'm' | 'y') => {}
        _ => return false,
    }
    let amount = chars.as_str();
    !amount.is_empty() && amount.chars().all(|c| c.is_ascii_digit())
}
