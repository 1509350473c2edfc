use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::models::subscription::SubscriptionState;

/// File name of the persisted subscription (the dashboard's `"subscription"` key).
const STORE_FILE: &str = "subscription.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access subscription store at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize subscription: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Local copy of the subscription, kept between runs for demo continuity.
/// Not a system of record: the API wins whenever it is reachable.
#[derive(Debug, Clone)]
pub struct SubscriptionStore {
    path: PathBuf,
}

/// Default store location, respecting XDG_DATA_HOME.
pub fn default_store_path() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join(".local")
                .join("share")
        });
    base.join("navi").join(STORE_FILE)
}

impl SubscriptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the stored subscription. A missing file yields the empty default;
    /// an unreadable or corrupt one is logged and also yields the default.
    pub fn load(&self) -> SubscriptionState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return SubscriptionState::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read subscription store");
                return SubscriptionState::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt subscription store");
                SubscriptionState::default()
            }
        }
    }

    /// Like [`load`](Self::load), but uses `fallback` when nothing has been stored yet.
    pub fn load_or(&self, fallback: impl FnOnce() -> SubscriptionState) -> SubscriptionState {
        if self.exists() {
            self.load()
        } else {
            fallback()
        }
    }

    /// Write the subscription, creating parent directories as needed.
    pub fn save(&self, state: &SubscriptionState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "saved subscription");
        Ok(())
    }

    /// Remove the stored subscription. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
