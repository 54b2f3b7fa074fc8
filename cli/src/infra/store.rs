//! Component store: where installed component binaries live on disk.
//!
//! Layout: `<root>/<component>/<version>/<component>-server`.

use std::path::PathBuf;

use crate::domain::ComponentVersion;

/// Installed component binaries, keyed by name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentStore {
    root: PathBuf,
}

impl ComponentStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `$TIPLAY_HOME/components`, or `~/.tiplay/components`.
    ///
    /// Returns `None` when neither the variable nor a home directory exists.
    #[must_use]
    pub fn from_home(tiplay_home: Option<PathBuf>) -> Option<Self> {
        let home = tiplay_home.or_else(|| dirs::home_dir().map(|h| h.join(".tiplay")))?;
        Some(Self::new(home.join("components")))
    }

    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Path of the server binary for `component` at `version`.
    #[must_use]
    pub fn binary_path(&self, component: &str, version: &ComponentVersion) -> PathBuf {
        self.root
            .join(component)
            .join(version.to_string())
            .join(format!("{component}-server"))
    }
}
