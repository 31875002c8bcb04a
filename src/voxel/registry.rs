//! Name lookup for block types typed by users.

use std::collections::HashMap;

use crate::core::error::PreconditionError;
use super::snapshot::{BlockType, VoxelSnapshot};

/// Names that resolve to empty space
const EMPTY_NAMES: [&str; 2] = ["empty", "air"];

/// Block types known to the host world, built once at startup
#[derive(Clone, Debug, Default)]
pub struct BlockRegistry {
    by_key: HashMap<String, BlockType>,
}

impl BlockRegistry {
    /// Registry containing the given canonical block names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for name in names {
            registry.register(name);
        }
        registry
    }

    /// A small set of common terrain blocks
    pub fn with_defaults() -> Self {
        Self::new([
            "Dirt", "Grass", "Sand", "Clay", "Stone", "Granite", "Limestone",
            "Sandstone", "Gravel", "Water", "Ice", "Snow", "Bedrock",
        ])
    }

    /// Register a block type under its canonical name
    pub fn register(&mut self, name: impl Into<String>) -> BlockType {
        let block = BlockType::new(name);
        self.by_key.insert(lookup_key(block.name()), block.clone());
        block
    }

    /// Resolve user text to the state it names. `"Empty"` and `"Air"` are
    /// always known.
    pub fn resolve(&self, text: &str) -> Result<VoxelSnapshot, PreconditionError> {
        let key = lookup_key(text);
        if EMPTY_NAMES.contains(&key.as_str()) {
            return Ok(VoxelSnapshot::Empty);
        }
        self.resolve_block(text).map(|block| VoxelSnapshot::Block { block })
    }

    /// Resolve user text to a registered block type
    pub fn resolve_block(&self, text: &str) -> Result<BlockType, PreconditionError> {
        self.by_key
            .get(&lookup_key(text))
            .cloned()
            .ok_or_else(|| PreconditionError::UnknownBlockType(text.trim().to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Whitespace-free, lowercase, without a trailing "block"
fn lookup_key(text: &str) -> String {
    let key: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    match key.strip_suffix("block") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_variants() {
        let registry = BlockRegistry::with_defaults();
        let dirt = BlockType::new("Dirt");
        assert_eq!(registry.resolve_block("dirt").unwrap(), dirt);
        assert_eq!(registry.resolve_block(" DiRt ").unwrap(), dirt);
        assert_eq!(registry.resolve_block("DirtBlock").unwrap(), dirt);
        assert_eq!(registry.resolve_block("Dirt Block").unwrap(), dirt);
    }

    #[test]
    fn test_resolve_empty() {
        let registry = BlockRegistry::default();
        assert_eq!(registry.resolve("Empty").unwrap(), VoxelSnapshot::Empty);
        assert_eq!(registry.resolve("air").unwrap(), VoxelSnapshot::Empty);
        assert_eq!(registry.resolve("EmptyBlock").unwrap(), VoxelSnapshot::Empty);
    }

    #[test]
    fn test_unknown_name() {
        let registry = BlockRegistry::with_defaults();
        assert_eq!(
            registry.resolve("Unobtanium"),
            Err(PreconditionError::UnknownBlockType("Unobtanium".into()))
        );
        // "block" alone is not stripped to nothing
        assert!(registry.resolve_block("block").is_err());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = BlockRegistry::new(["Stone"]);
        assert_eq!(registry.len(), 1);
        let brick = registry.register("Hewn Log");
        assert_eq!(registry.resolve_block("hewnlog").unwrap(), brick);
    }
}
