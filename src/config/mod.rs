use std::{env, fs::read_to_string, path::PathBuf, time::Duration};

use cli::Cli;
use serde::Deserialize;

use crate::observability::LogLevel;
use crate::provider::DEFAULT_RPC_URL;

pub mod cli;

pub const CONFIG_DIR: &str = ".drep";
pub const CONFIG_FILE_NAME: &str = "account.toml";

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Defines the configuration parameters for the account client.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// RPC endpoint of the node.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub log_level: LogLevel,
    pub log_file_path: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::default(),
            log_file_path: None,
        }
    }
}

impl ClientConfig {
    /// Try to load a configuration file from either a provided path or the `$HOME` directory.
    ///
    /// A missing file in `$HOME` yields the defaults; a missing file at an explicit
    /// path is an error.
    pub fn try_load(file_path: &Option<String>) -> eyre::Result<ClientConfig> {
        let path = match file_path {
            Some(path) => PathBuf::from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(ClientConfig::default()),
            },
        };

        let toml = read_to_string(&path)
            .map_err(|err| eyre::eyre!("failed reading {}: {}", path.display(), err))?;
        let config = toml::from_str(&toml)?;

        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        // NOTE: `env::home_dir` is not compatible with Windows.
        #[allow(deprecated)]
        let mut path = env::home_dir()?;

        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE_NAME);
        Some(path)
    }

    /// Override the config with values provided by [`Cli`].
    pub fn override_with_opts(&mut self, opt: &Cli) {
        if let Some(url) = &opt.url {
            self.url = url.clone();
        }
        if let Some(timeout) = opt.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(log_level) = opt.log {
            self.log_level = log_level;
        }
        if let Some(file_path) = &opt.log_file_path {
            self.log_file_path = Some(file_path.clone());
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
