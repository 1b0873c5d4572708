//! Configuration management for the server.
//!
//! The configuration object is immutable. Runtime reconfiguration (the admin
//! settings endpoint) builds a whole new [`Config`] and swaps it atomically
//! through [`SharedConfig::replace`] — no component ever mutates a field in
//! place, and every consumer reads a consistent snapshot via
//! [`SharedConfig::current`].

use quadro_engine::SyncTarget;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Remote content store coordinates.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch that holds the collection files
    pub branch: String,
    /// Write credential; reads work without it
    pub token: Option<String>,
}

impl RemoteConfig {
    /// Provider URL of a collection file.
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{}",
            self.owner, self.repo, path
        )
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Remote store coordinates
    pub remote: RemoteConfig,
    /// Root of the local mirror tree
    pub data_dir: PathBuf,
    /// Override for the candidates mirror location
    pub backup_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let remote = RemoteConfig {
            owner: env::var("GITHUB_OWNER").unwrap_or_else(|_| "PopularAtacarejo".to_string()),
            repo: env::var("GITHUB_REPO").unwrap_or_else(|_| "Candidatos".to_string()),
            branch: env::var("GITHUB_BRANCH")
                .or_else(|_| env::var("BRANCH"))
                .unwrap_or_else(|_| "main".to_string()),
            token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        };

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let backup_dir = env::var("LOCAL_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.clone());

        Ok(Self {
            host,
            port,
            remote,
            data_dir,
            backup_dir,
        })
    }

    /// The registry of synchronized collections under this configuration.
    pub fn targets(&self) -> Vec<SyncTarget> {
        quadro_engine::registry(&self.data_dir, &self.backup_dir)
    }

    /// Location of the pending-write queue file.
    pub fn pending_path(&self) -> PathBuf {
        self.data_dir.join("data").join("sync_pending.json")
    }
}

/// Shared handle to the current configuration.
///
/// Cloning is cheap; all clones observe the same snapshot. [`replace`] is
/// the single reconfiguration entry point in the whole server.
///
/// [`replace`]: SharedConfig::replace
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<Config>>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// The current configuration snapshot.
    pub fn current(&self) -> Arc<Config> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Atomically install a new configuration.
    pub fn replace(&self, config: Config) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(config);
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            remote: RemoteConfig {
                owner: "acme".to_string(),
                repo: "people".to_string(),
                branch: "main".to_string(),
                token: None,
            },
            data_dir: PathBuf::from("/tmp/quadro"),
            backup_dir: PathBuf::from("/tmp/quadro"),
        }
    }

    #[test]
    fn contents_url_shape() {
        let config = test_config();
        assert_eq!(
            config.remote.contents_url("setores.json"),
            "https://api.github.com/repos/acme/people/contents/setores.json"
        );
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let shared = SharedConfig::new(test_config());
        let before = shared.current();

        let mut next = test_config();
        next.remote.branch = "develop".to_string();
        shared.replace(next);

        assert_eq!(before.remote.branch, "main");
        assert_eq!(shared.current().remote.branch, "develop");
    }

    #[test]
    fn clones_observe_the_same_snapshot() {
        let shared = SharedConfig::new(test_config());
        let other = shared.clone();

        let mut next = test_config();
        next.remote.owner = "nova".to_string();
        shared.replace(next);

        assert_eq!(other.current().remote.owner, "nova");
    }

    #[test]
    fn pending_path_is_under_the_data_subdirectory() {
        let config = test_config();
        assert_eq!(
            config.pending_path(),
            PathBuf::from("/tmp/quadro/data/sync_pending.json")
        );
    }
}
