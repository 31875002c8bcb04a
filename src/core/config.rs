//! Editor configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::types::Result;

/// Tunables for sessions, shape rasterization and blueprint storage.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Depth of each session's undo and redo stack.
    pub history_capacity: usize,
    /// Lowest y a shape anchor may sit at.
    pub min_anchor_y: i32,
    /// Write blueprints with the LZ4 envelope.
    pub compress_blueprints: bool,
    /// Directory holding exported blueprints.
    pub blueprint_dir: PathBuf,
    /// Version string stamped into exported blueprints.
    pub engine_version: String,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            min_anchor_y: 1,
            compress_blueprints: true,
            blueprint_dir: PathBuf::from("blueprints"),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl EditConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: EditConfig = serde_json::from_str(&text)?;
        log::debug!("Loaded edit config from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditConfig::default();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.min_anchor_y, 1);
        assert!(config.compress_blueprints);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"history_capacity": 4, "compress_blueprints": false}}"#).unwrap();

        let config = EditConfig::load(file.path()).unwrap();
        assert_eq!(config.history_capacity, 4);
        assert!(!config.compress_blueprints);
        assert_eq!(config.min_anchor_y, 1);
        assert_eq!(config.blueprint_dir, PathBuf::from("blueprints"));
    }
}
