//! Captured regions and their on-disk format.
//!
//! Format versions:
//! - 1.0: blocks only
//! - 1.1: plants and objects in their own layers
//! - 1.2: plants identified by `Species` (1.1 wrote `PlantType`)
//! - 1.3: `Dimension` recorded
//!
//! Older files load with the missing parts defaulted.

pub mod model;
pub mod serializer;
pub mod store;

use std::collections::BTreeMap;
use std::fmt;

use glam::IVec3;

pub use model::{AuthorInformation, Blueprint, BlueprintEntry};
pub use serializer::{decode, encode, from_bytes, to_bytes, COMPRESSION_MARKER, HEADER_LEN};
pub use store::{load_blueprint, save_blueprint, BlueprintStore, BLUEPRINT_EXTENSION};

/// Format version written by this crate
pub const FORMAT_VERSION: f32 = 1.3;

/// Summary of a blueprint for display
#[derive(Clone, Debug, PartialEq)]
pub struct BlueprintInfo {
    pub version: f32,
    pub engine_version: String,
    pub author: String,
    pub dimension: IVec3,
    pub blocks: usize,
    pub plants: usize,
    pub objects: usize,
    pub distribution: BTreeMap<String, usize>,
}

impl BlueprintInfo {
    pub fn new(blueprint: &Blueprint) -> Self {
        Self {
            version: blueprint.version,
            engine_version: blueprint.engine_version.clone(),
            author: blueprint.author.name.clone(),
            dimension: blueprint.dimension,
            blocks: blueprint.blocks.len(),
            plants: blueprint.plants.len(),
            objects: blueprint.objects.len(),
            distribution: blueprint.distribution(),
        }
    }
}

impl fmt::Display for BlueprintInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version:   {:.1}", self.version)?;
        writeln!(f, "Engine:    {}", if self.engine_version.is_empty() { "unknown" } else { &self.engine_version })?;
        writeln!(f, "Author:    {}", self.author)?;
        writeln!(f, "Dimension: {} x {} x {}", self.dimension.x, self.dimension.y, self.dimension.z)?;
        writeln!(f, "Layers:    {} blocks, {} plants, {} objects", self.blocks, self.plants, self.objects)?;
        for (name, count) in &self.distribution {
            writeln!(f, "  {:<16} {}", name, count)?;
        }
        Ok(())
    }
}
