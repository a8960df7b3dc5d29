//! `set` / `unset` handling for the configuration file.

use std::fmt;

use crate::core::config::{Config, ConfigError};
use crate::core::render::MessageFormat;

pub const KEY_GRAPH_BASE_URL: &str = "graph-base-url";
pub const KEY_LOOKUP_TIMEOUT: &str = "lookup-timeout";
pub const KEY_DEFAULT_FORMAT: &str = "default-format";
const KNOWN_KEYS: &[&str] = &[KEY_GRAPH_BASE_URL, KEY_LOOKUP_TIMEOUT, KEY_DEFAULT_FORMAT];

/// Errors that can occur when modifying configuration settings.
#[derive(Debug)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The value could not be parsed for this key.
    InvalidValue { key: &'static str, reason: String },
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    /// An error occurred while loading or persisting the configuration.
    Config(ConfigError),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Known keys: {}", KNOWN_KEYS.join(", "));
            }
            SettingError::InvalidValue { key, reason } => {
                eprintln!("❌ Invalid value for {key}: {reason}");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            SettingError::Config(err) => {
                eprintln!("❌ {err}");
            }
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SettingError::Config(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
            SettingError::Config(err) => write!(f, "Config error: {err}"),
        }
    }
}

impl std::error::Error for SettingError {}

impl From<ConfigError> for SettingError {
    fn from(err: ConfigError) -> Self {
        SettingError::Config(err)
    }
}

/// Applies `key = value` to `config` without touching disk.
pub fn apply_setting(
    config: &mut Config,
    key: &str,
    value: &[String],
) -> Result<String, SettingError> {
    let joined = value.join(" ");
    let joined = joined.trim();

    match key {
        KEY_GRAPH_BASE_URL => {
            if joined.is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Provide the API base URL",
                    example: "atmention set graph-base-url https://graph.microsoft.com/v1.0",
                });
            }
            if !joined.starts_with("http://") && !joined.starts_with("https://") {
                return Err(SettingError::InvalidValue {
                    key: KEY_GRAPH_BASE_URL,
                    reason: "expected an http(s) URL".to_string(),
                });
            }
            config.graph_base_url = Some(joined.trim_end_matches('/').to_string());
            Ok(format!("✅ Set {KEY_GRAPH_BASE_URL} to: {}", config.graph_base_url()))
        }
        KEY_LOOKUP_TIMEOUT => {
            if joined.is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Provide the lookup timeout in seconds",
                    example: "atmention set lookup-timeout 10",
                });
            }
            let secs: u64 = joined.parse().map_err(|_| SettingError::InvalidValue {
                key: KEY_LOOKUP_TIMEOUT,
                reason: format!("'{joined}' is not a whole number of seconds"),
            })?;
            if secs == 0 {
                return Err(SettingError::InvalidValue {
                    key: KEY_LOOKUP_TIMEOUT,
                    reason: "must be at least 1 second".to_string(),
                });
            }
            config.lookup_timeout_secs = Some(secs);
            Ok(format!("✅ Set {KEY_LOOKUP_TIMEOUT} to: {secs}s"))
        }
        KEY_DEFAULT_FORMAT => {
            let format: MessageFormat = joined.parse().map_err(|reason| SettingError::InvalidValue {
                key: KEY_DEFAULT_FORMAT,
                reason,
            })?;
            config.default_format = Some(format.to_string());
            Ok(format!("✅ Set {KEY_DEFAULT_FORMAT} to: {format}"))
        }
        other => Err(SettingError::UnknownKey(other.to_string())),
    }
}

pub fn clear_setting(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        KEY_GRAPH_BASE_URL => config.graph_base_url = None,
        KEY_LOOKUP_TIMEOUT => config.lookup_timeout_secs = None,
        KEY_DEFAULT_FORMAT => config.default_format = None,
        other => return Err(SettingError::UnknownKey(other.to_string())),
    }
    Ok(format!("✅ Unset {key}"))
}

pub fn set_value(key: &str, value: &[String]) -> Result<(), SettingError> {
    let mut config = Config::load()?;
    let message = apply_setting(&mut config, key, value)?;
    config.save()?;
    println!("{message}");
    Ok(())
}

pub fn unset_value(key: &str) -> Result<(), SettingError> {
    let mut config = Config::load()?;
    let message = clear_setting(&mut config, key)?;
    config.save()?;
    println!("{message}");
    Ok(())
}
