//! Infrastructure implementation of the `ConfigDecoder` port.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::ConfigDecoder;
use crate::domain::{InstanceError, TidbConfig};

/// Reads `tidb-server` TOML config files from disk.
pub struct TomlConfigDecoder;

impl ConfigDecoder for TomlConfigDecoder {
    fn decode(&self, path: &Path) -> Result<TidbConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| InstanceError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| InstanceError::ConfigDecode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }
}
