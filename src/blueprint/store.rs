//! Named blueprint files in a directory

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor};
use std::path::{Path, PathBuf};

use crate::core::config::EditConfig;
use crate::core::error::PreconditionError;
use crate::core::types::Result;
use super::model::Blueprint;
use super::serializer;

/// File extension for stored blueprints
pub const BLUEPRINT_EXTENSION: &str = "bpz";

/// Directory of blueprints addressed by name
#[derive(Clone, Debug)]
pub struct BlueprintStore {
    dir: PathBuf,
    compress: bool,
    engine_version: String,
}

impl BlueprintStore {
    pub fn new(dir: impl Into<PathBuf>, compress: bool) -> Self {
        Self {
            dir: dir.into(),
            compress,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn from_config(config: &EditConfig) -> Self {
        Self {
            dir: config.blueprint_dir.clone(),
            compress: config.compress_blueprints,
            engine_version: config.engine_version.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `name`.
    ///
    /// Names must be non-empty and may not contain path separators or `..`.
    pub fn path(&self, name: &str) -> std::result::Result<PathBuf, PreconditionError> {
        blueprint_path(&self.dir, name)
    }

    /// Write `blueprint` under `name`, replacing any existing file
    pub fn save(&self, name: &str, blueprint: &Blueprint) -> Result<PathBuf> {
        let path = self.path(name)?;
        fs::create_dir_all(&self.dir)?;

        let writer = BufWriter::new(File::create(&path)?);
        serializer::encode(blueprint, writer, self.compress, &self.engine_version)?;

        log::info!("Saved blueprint '{}' ({} cells) to {}", name, blueprint.len(), path.display());
        Ok(path)
    }

    /// Read the blueprint stored under `name`
    pub fn load(&self, name: &str) -> Result<Blueprint> {
        let path = self.path(name)?;
        let reader = BufReader::new(File::open(&path)?);
        let blueprint = serializer::decode(reader, &self.engine_version)?;
        log::debug!("Loaded blueprint '{}' from {}", name, path.display());
        Ok(blueprint)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_ok_and(|p| p.is_file())
    }

    /// Names of all stored blueprints, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == BLUEPRINT_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn blueprint_path(dir: &Path, name: &str) -> std::result::Result<PathBuf, PreconditionError> {
    let name = name.trim();
    let invalid = name.is_empty()
        || name.contains("..")
        || name.contains(['/', '\\', ':'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(PreconditionError::InvalidBlueprintName(name.to_string()));
    }
    Ok(dir.join(format!("{}.{}", name, BLUEPRINT_EXTENSION)))
}

/// Save a blueprint without blocking the runtime
pub async fn save_blueprint(store: &BlueprintStore, name: &str, blueprint: &Blueprint) -> Result<PathBuf> {
    let path = store.path(name)?;
    let bytes = serializer::to_bytes(blueprint, store.compress, &store.engine_version)?;

    tokio::fs::create_dir_all(&store.dir).await?;
    tokio::fs::write(&path, bytes).await?;

    Ok(path)
}

/// Load a blueprint without blocking the runtime
pub async fn load_blueprint(store: &BlueprintStore, name: &str) -> Result<Blueprint> {
    let path = store.path(name)?;
    let bytes = tokio::fs::read(&path).await?;
    serializer::decode(Cursor::new(bytes), &store.engine_version)
}
