//! Configuration module for Serpline
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every table and key is optional, so an empty file yields the defaults.
//!
//! # Example
//!
//! ```no_run
//! use serpline::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("serpline.toml")).unwrap();
//! println!("Timeout: {}s", config.connection.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ConnectionConfig, DEFAULT_TIMEOUT_SECS};

// Re-export parser functions
pub use parser::{apply_environment, https_proxy_from_environment, load_config, parse_proxy};
pub use validation::{is_duration, validate};
