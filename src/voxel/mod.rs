//! Voxel state, the host access port and block type lookup

pub mod snapshot;
pub mod registry;
pub mod port;
pub mod world;

pub use snapshot::{
    BlockType, Component, ComponentBag, InventoryStack, Layer, ObjectSnapshot, PlantSnapshot,
    VoxelSnapshot,
};
pub use registry::BlockRegistry;
pub use port::{distribution, BlockAccess};
pub use world::MemoryWorld;
