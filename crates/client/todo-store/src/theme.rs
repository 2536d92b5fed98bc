//! Light/dark theme preference, kept in durable storage.

use serde::{Deserialize, Serialize};
use todo_core::{DurableStorage, StorageError, StorageKey};
use tracing::warn;

/// Display theme preference. Kept in storage, not in [`crate::AppState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Stored preference, or `Light` when missing or unreadable.
    pub fn load(storage: &dyn DurableStorage) -> Self {
        match storage.get(StorageKey::Theme) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown theme {:?}", raw.trim());
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Could not read theme: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(self, storage: &dyn DurableStorage) -> Result<(), StorageError> {
        storage.set(StorageKey::Theme, self.as_str())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}
