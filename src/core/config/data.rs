use crate::core::render::MessageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the chat/directory API, without a trailing slash
    pub graph_base_url: Option<String>,
    /// Per-user directory lookup timeout in seconds
    pub lookup_timeout_secs: Option<u64>,
    /// Format assumed for message text when none is given ("text" or "markdown")
    pub default_format: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    pub fn graph_base_url(&self) -> &str {
        self.graph_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_GRAPH_BASE_URL)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(
            self.lookup_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS),
        )
    }

    /// Configured default format; unknown values fall back to markdown.
    pub fn default_format(&self) -> MessageFormat {
        self.default_format
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}
