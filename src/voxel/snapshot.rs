//! What occupies a voxel: empty space, a block, a plant or a placed object.
//!
//! Snapshots are what the change ledger records and what blueprints store,
//! so every type here serializes into the blueprint document.

use std::collections::BTreeMap;

use glam::Quat;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Component kind tag for storage inventories
pub const STORAGE_COMPONENT: &str = "StorageComponent";
/// Component kind tag for custom display text
pub const CUSTOM_TEXT_COMPONENT: &str = "CustomTextComponent";

/// Stable identifier of a block type, e.g. `"Dirt"`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockType(String);

impl BlockType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Which blueprint layer a snapshot belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Blocks,
    Plants,
    Objects,
}

/// State of one voxel before or after a mutation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Kind")]
pub enum VoxelSnapshot {
    #[default]
    Empty,
    Block {
        #[serde(rename = "BlockType")]
        block: BlockType,
    },
    Plant(PlantSnapshot),
    Object(ObjectSnapshot),
}

impl VoxelSnapshot {
    /// Snapshot of a plain block
    pub fn block(name: impl Into<String>) -> Self {
        VoxelSnapshot::Block { block: BlockType::new(name) }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VoxelSnapshot::Empty)
    }

    /// Name used when counting or listing contents
    pub fn type_name(&self) -> &str {
        match self {
            VoxelSnapshot::Empty => "Empty",
            VoxelSnapshot::Block { block } => block.name(),
            VoxelSnapshot::Plant(plant) => &plant.species,
            VoxelSnapshot::Object(object) => &object.object_type,
        }
    }

    /// Blueprint layer this snapshot is captured into
    pub fn layer(&self) -> Layer {
        match self {
            VoxelSnapshot::Empty | VoxelSnapshot::Block { .. } => Layer::Blocks,
            VoxelSnapshot::Plant(_) => Layer::Plants,
            VoxelSnapshot::Object(_) => Layer::Objects,
        }
    }

    /// True if this is a block of type `block`
    pub fn is_block(&self, block: &BlockType) -> bool {
        matches!(self, VoxelSnapshot::Block { block: b } if b == block)
    }
}

/// A plant instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantSnapshot {
    /// Species identifier. Files before 1.2 stored the plant type here.
    #[serde(rename = "Species", alias = "PlantType")]
    pub species: String,
    /// Growth in `0.0..=1.0`
    #[serde(rename = "GrowthStage", default)]
    pub growth: f32,
}

impl PlantSnapshot {
    pub const FULL_GROWTH: f32 = 1.0;

    pub fn new(species: impl Into<String>, growth: f32) -> Self {
        Self {
            species: species.into(),
            growth: growth.clamp(0.0, Self::FULL_GROWTH),
        }
    }
}

/// A placed world object with its rotation and component state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    #[serde(rename = "ObjectType")]
    pub object_type: String,
    #[serde(rename = "Rotation", default = "identity")]
    pub rotation: Quat,
    #[serde(rename = "Components", default)]
    pub components: ComponentBag,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl ObjectSnapshot {
    pub fn new(object_type: impl Into<String>, rotation: Quat) -> Self {
        Self {
            object_type: object_type.into(),
            rotation,
            components: ComponentBag::default(),
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.insert(component);
        self
    }
}

/// One item stack inside a storage component
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStack {
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

/// Component state carried by an object
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// Non-empty inventory stacks
    Storage(Vec<InventoryStack>),
    /// Sign or label text
    CustomText(String),
    /// A kind this version does not understand, kept verbatim
    Opaque { kind: String, payload: Value },
}

impl Component {
    /// Tag this component is stored under
    pub fn kind(&self) -> &str {
        match self {
            Component::Storage(_) => STORAGE_COMPONENT,
            Component::CustomText(_) => CUSTOM_TEXT_COMPONENT,
            Component::Opaque { kind, .. } => kind,
        }
    }

    fn from_tagged(kind: String, payload: Value) -> Self {
        let known = match kind.as_str() {
            STORAGE_COMPONENT => serde_json::from_value(payload.clone()).ok().map(Component::Storage),
            CUSTOM_TEXT_COMPONENT => payload.as_str().map(|s| Component::CustomText(s.to_string())),
            _ => None,
        };
        // Malformed payloads of known kinds are kept rather than dropped.
        known.unwrap_or(Component::Opaque { kind, payload })
    }
}

/// Serializes a component's payload without its kind tag
struct Payload<'a>(&'a Component);

impl Serialize for Payload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Component::Storage(stacks) => stacks.serialize(serializer),
            Component::CustomText(text) => serializer.serialize_str(text),
            Component::Opaque { payload, .. } => payload.serialize(serializer),
        }
    }
}

/// Components of an object, at most one per kind, ordered by kind.
///
/// Stored as a map from kind tag to payload so readers can skip tags
/// they do not know.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct ComponentBag(BTreeMap<String, Component>);

impl ComponentBag {
    /// Insert, replacing any component of the same kind
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        self.0.insert(component.kind().to_string(), component)
    }

    pub fn get(&self, kind: &str) -> Option<&Component> {
        self.0.get(kind)
    }

    /// Components in kind order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ComponentBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (kind, component) in &self.0 {
            map.serialize_entry(kind, &Payload(component))?;
        }
        map.end()
    }
}

impl From<BTreeMap<String, Value>> for ComponentBag {
    fn from(map: BTreeMap<String, Value>) -> Self {
        ComponentBag(
            map.into_iter()
                .map(|(kind, payload)| (kind.clone(), Component::from_tagged(kind, payload)))
                .collect(),
        )
    }
}
