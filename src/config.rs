use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(stripped) = s.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if s == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Host configuration for the board.
///
/// This only describes where to look things up and where state lives; the
/// board's own state is always the query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    /// Base of the commit-history API
    #[serde(default = "defaults::api_base_url")]
    pub api_base_url: Url,
    /// Base for repository links in rendered output
    #[serde(default = "defaults::web_base_url")]
    pub web_base_url: Url,
    /// Base of shareable links
    #[serde(default = "defaults::page_url")]
    pub page_url: Url,
    /// File holding the persisted query string
    #[serde(default = "defaults::state_file")]
    pub state_file: PathBuf,
    /// Sent with every lookup; the GitHub API rejects requests without one
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
    /// Per-request timeout. Unset means lookups may wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::api_base_url(),
            web_base_url: defaults::web_base_url(),
            page_url: defaults::page_url(),
            state_file: defaults::state_file(),
            user_agent: defaults::user_agent(),
            request_timeout_secs: None,
        }
    }
}

impl BoardConfig {
    /// Load configuration from the config file (if any) and environment variables
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        tracing::debug!("loading commit-board config from {:?}", config_path);
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env()
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: BoardConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.state_file = expand_tilde(&config.state_file);

        Ok(config)
    }

    fn apply_env(mut self) -> Result<Self> {
        if let Ok(url) = env::var("COMMIT_BOARD_API_URL") {
            self.api_base_url =
                Url::parse(&url).context("Failed to parse COMMIT_BOARD_API_URL as a URL")?;
        }

        if let Ok(url) = env::var("COMMIT_BOARD_WEB_URL") {
            self.web_base_url =
                Url::parse(&url).context("Failed to parse COMMIT_BOARD_WEB_URL as a URL")?;
        }

        if let Ok(url) = env::var("COMMIT_BOARD_PAGE_URL") {
            self.page_url =
                Url::parse(&url).context("Failed to parse COMMIT_BOARD_PAGE_URL as a URL")?;
        }

        if let Ok(path) = env::var("COMMIT_BOARD_STATE_FILE") {
            self.state_file = expand_tilde(&PathBuf::from(path));
        }

        if let Ok(agent) = env::var("COMMIT_BOARD_USER_AGENT") {
            self.user_agent = agent;
        }

        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Get default config file path
    pub fn config_file_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config/commit-board/config.yaml"))
            .context("Could not determine home directory for config file")
    }
}

mod defaults {
    use std::path::PathBuf;

    use url::Url;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap_or_else(|e| panic!("built-in URL {s} is invalid: {e}"))
    }

    pub(crate) fn api_base_url() -> Url {
        url("https://api.github.com")
    }

    pub(crate) fn web_base_url() -> Url {
        url("https://github.com")
    }

    pub(crate) fn page_url() -> Url {
        url("https://example.invalid/commit-board/")
    }

    pub(crate) fn state_file() -> PathBuf {
        super::expand_tilde(&PathBuf::from("~/.config/commit-board/state.query"))
    }

    pub(crate) fn user_agent() -> String {
        format!("commit-board/{}", env!("CARGO_PKG_VERSION"))
    }
}
