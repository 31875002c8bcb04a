//! In-memory blueprint: a captured region split into block, plant and
//! object layers, with positions relative to the capture origin.

use std::collections::BTreeMap;

use glam::{IVec3, Quat};
use serde::{Deserialize, Serialize};

use crate::core::error::PreconditionError;
use crate::math::WorldRange;
use crate::voxel::{BlockAccess, Layer, VoxelSnapshot};
use super::FORMAT_VERSION;

/// Who made a blueprint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AuthorInformation {
    pub name: String,
    pub id: Option<String>,
    /// Seconds since the Unix epoch
    pub created: Option<u64>,
}

impl AuthorInformation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            created: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs()),
        }
    }
}

/// One voxel of a layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlueprintEntry {
    #[serde(rename = "Position")]
    pub position: IVec3,
    #[serde(rename = "Data")]
    pub snapshot: VoxelSnapshot,
}

/// A captured region.
///
/// Layers are independent; the same position may appear in more than one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Blueprint {
    #[serde(default = "legacy_version")]
    pub version: f32,
    #[serde(default)]
    pub engine_version: String,
    #[serde(default, rename = "Author")]
    pub author: AuthorInformation,
    /// Bounding size; zero when unknown
    #[serde(default)]
    pub dimension: IVec3,
    #[serde(default)]
    pub blocks: Vec<BlueprintEntry>,
    #[serde(default)]
    pub plants: Vec<BlueprintEntry>,
    #[serde(default)]
    pub objects: Vec<BlueprintEntry>,
}

/// Files without a version tag predate tagging
fn legacy_version() -> f32 {
    1.0
}

impl Blueprint {
    /// Empty blueprint in the current format
    pub fn new(author: AuthorInformation) -> Self {
        Self {
            version: FORMAT_VERSION,
            engine_version: String::new(),
            author,
            dimension: IVec3::ZERO,
            blocks: Vec::new(),
            plants: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Read every voxel of `range` from the world. Positions are stored
    /// relative to `origin`.
    pub fn capture(world: &dyn BlockAccess, range: &WorldRange, origin: IVec3, author: AuthorInformation) -> Self {
        let mut blueprint = Self::new(author);
        for pos in range.points() {
            blueprint.push(pos - origin, world.read_voxel(pos));
        }
        blueprint.dimension = range.size();
        blueprint
    }

    /// Add a snapshot to the layer it belongs to
    pub fn push(&mut self, position: IVec3, snapshot: VoxelSnapshot) {
        let entry = BlueprintEntry { position, snapshot };
        match entry.snapshot.layer() {
            Layer::Blocks => self.blocks.push(entry),
            Layer::Plants => self.plants.push(entry),
            Layer::Objects => self.objects.push(entry),
        }
    }

    pub fn layer(&self, layer: Layer) -> &[BlueprintEntry] {
        match layer {
            Layer::Blocks => &self.blocks,
            Layer::Plants => &self.plants,
            Layer::Objects => &self.objects,
        }
    }

    /// All entries: blocks, then plants, then objects
    pub fn entries(&self) -> impl Iterator<Item = &BlueprintEntry> {
        self.blocks.iter().chain(&self.plants).chain(&self.objects)
    }

    pub fn len(&self) -> usize {
        self.blocks.len() + self.plants.len() + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Relative bounds of all entries
    pub fn extents(&self) -> Option<WorldRange> {
        let mut positions = self.entries().map(|e| e.position);
        let first = positions.next()?;
        let mut range = WorldRange::from_point(first);
        for p in positions {
            range.extend_to_include(p);
        }
        Some(range)
    }

    /// Fill in `dimension` from the entries when it is missing
    pub fn ensure_dimension(&mut self) {
        if self.dimension == IVec3::ZERO {
            if let Some(extents) = self.extents() {
                self.dimension = extents.size();
            }
        }
    }

    /// Cell count per type name, across all layers
    pub fn distribution(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries() {
            *counts.entry(entry.snapshot.type_name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Copy rotated about +Y around the origin by a multiple of 90 degrees.
    /// Object rotations are turned by the same angle.
    pub fn rotated(&self, degrees: i32) -> Result<Self, PreconditionError> {
        if degrees % 90 != 0 {
            return Err(PreconditionError::InvalidRotation(degrees));
        }
        let quarter_turns = degrees.rem_euclid(360) / 90;
        let turn = Quat::from_rotation_y((quarter_turns as f32) * std::f32::consts::FRAC_PI_2);

        let mut rotated = self.clone();
        for entry in rotated.blocks.iter_mut().chain(&mut rotated.plants).chain(&mut rotated.objects) {
            entry.position = rotate_quarter_turns(entry.position, quarter_turns);
            if let VoxelSnapshot::Object(object) = &mut entry.snapshot {
                object.rotation = (turn * object.rotation).normalize();
            }
        }
        if quarter_turns % 2 == 1 {
            rotated.dimension = IVec3::new(self.dimension.z, self.dimension.y, self.dimension.x);
        }
        Ok(rotated)
    }
}

/// Rotate about +Y, right-handed: one quarter turn maps +X onto -Z
fn rotate_quarter_turns(p: IVec3, quarter_turns: i32) -> IVec3 {
    match quarter_turns {
        1 => IVec3::new(p.z, p.y, -p.x),
        2 => IVec3::new(-p.x, p.y, -p.z),
        3 => IVec3::new(-p.z, p.y, p.x),
        _ => p,
    }
}
