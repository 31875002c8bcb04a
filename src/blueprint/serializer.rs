//! Blueprint byte format.
//!
//! ```text
//! compressed:  "LZ4" 0 0 0 0 0 | LZ4 frame of the JSON document
//! raw:         JSON document
//! ```
//!
//! Readers probe the first 8 bytes for the marker and rewind to the start
//! when it is absent.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use crate::core::types::Result;
use super::model::Blueprint;
use super::FORMAT_VERSION;

/// Marker at the start of a compressed stream
pub const COMPRESSION_MARKER: &[u8; 3] = b"LZ4";

/// Fixed width of the envelope header
pub const HEADER_LEN: usize = 8;

fn header() -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..COMPRESSION_MARKER.len()].copy_from_slice(COMPRESSION_MARKER);
    header
}

/// Write `blueprint` in the current format version, stamped with
/// `engine_version`.
pub fn encode<W: Write>(blueprint: &Blueprint, mut writer: W, compress: bool, engine_version: &str) -> Result<()> {
    let mut stamped = blueprint.clone();
    stamped.version = FORMAT_VERSION;
    stamped.engine_version = engine_version.to_string();
    stamped.ensure_dimension();

    if compress {
        writer.write_all(&header())?;
        let mut encoder = FrameEncoder::new(writer);
        serde_json::to_writer(&mut encoder, &stamped)?;
        let mut writer = encoder.finish().map_err(io::Error::other)?;
        writer.flush()?;
    } else {
        serde_json::to_writer(&mut writer, &stamped)?;
        writer.flush()?;
    }
    Ok(())
}

/// Read a blueprint, compressed or raw.
///
/// Version and engine mismatches are accepted as-is and only logged.
pub fn decode<R: Read + Seek>(mut reader: R, engine_version: &str) -> Result<Blueprint> {
    let mut probe = Vec::with_capacity(HEADER_LEN);
    reader.by_ref().take(HEADER_LEN as u64).read_to_end(&mut probe)?;

    let mut blueprint: Blueprint = if probe.starts_with(COMPRESSION_MARKER) {
        serde_json::from_reader(FrameDecoder::new(reader))?
    } else {
        reader.seek(SeekFrom::Start(0))?;
        serde_json::from_reader(reader)?
    };

    if blueprint.version != FORMAT_VERSION {
        log::warn!(
            "Blueprint format {:.1} differs from current {:.1}; loading without migration",
            blueprint.version,
            FORMAT_VERSION
        );
    }
    if !blueprint.engine_version.is_empty() && blueprint.engine_version != engine_version {
        log::warn!(
            "Blueprint written by engine {} (running {})",
            blueprint.engine_version,
            engine_version
        );
    }
    blueprint.ensure_dimension();
    Ok(blueprint)
}

/// Encode into a fresh buffer
pub fn to_bytes(blueprint: &Blueprint, compress: bool, engine_version: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode(blueprint, &mut buf, compress, engine_version)?;
    Ok(buf)
}

/// Decode from an in-memory buffer
pub fn from_bytes(data: &[u8], engine_version: &str) -> Result<Blueprint> {
    decode(Cursor::new(data), engine_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec3, Quat};
    use crate::blueprint::AuthorInformation;
    use crate::core::{Error, ErrorKind};
    use crate::voxel::{Component, InventoryStack, ObjectSnapshot, PlantSnapshot, VoxelSnapshot};

    fn sample() -> Blueprint {
        let mut bp = Blueprint::new(AuthorInformation::new("mason"));
        for x in 0..40 {
            bp.push(IVec3::new(x, 0, 0), VoxelSnapshot::block("Stone"));
        }
        bp.push(IVec3::new(0, 1, 0), VoxelSnapshot::Plant(PlantSnapshot::new("Fern", 0.5)));
        // Kinds inserted out of their sorted order
        let chest = ObjectSnapshot::new("Chest", Quat::from_rotation_y(1.0))
            .with_component(Component::Storage(vec![InventoryStack { item: "Log".into(), quantity: 12 }]))
            .with_component(Component::CustomText("supplies".into()));
        bp.push(IVec3::new(1, 1, 0), VoxelSnapshot::Object(chest));
        bp
    }

    #[test]
    fn test_compressed_envelope() {
        let bytes = to_bytes(&sample(), true, "0.9.0").unwrap();
        assert_eq!(&bytes[..HEADER_LEN], b"LZ4\0\0\0\0\0");

        let bp = from_bytes(&bytes, "0.9.0").unwrap();
        assert_eq!(bp.blocks, sample().blocks);
        assert_eq!(bp.objects, sample().objects);
        assert_eq!(bp.engine_version, "0.9.0");
        assert_eq!(bp.dimension, IVec3::new(40, 2, 1));
    }

    #[test]
    fn test_raw_is_plain_json() {
        let bytes = to_bytes(&sample(), false, "0.9.0").unwrap();
        assert_eq!(bytes[0], b'{');
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["Version"].as_f64().map(|v| v as f32), Some(FORMAT_VERSION));
        assert_eq!(doc["Author"]["Name"], "mason");
        assert_eq!(doc["Plants"][0]["Data"]["Species"], "Fern");
        assert!(doc["Objects"][0]["Data"]["Components"]["StorageComponent"].is_array());

        let bp = from_bytes(&bytes, "0.9.0").unwrap();
        assert_eq!(bp.plants, sample().plants);
    }

    #[test]
    fn test_full_round_trip_both_framings() {
        let original = sample();
        let mut expected = original.clone();
        expected.engine_version = "0.9.0".into();
        expected.ensure_dimension();

        for compress in [true, false] {
            let bytes = to_bytes(&original, compress, "0.9.0").unwrap();
            let decoded = from_bytes(&bytes, "0.9.0").unwrap();
            assert_eq!(decoded, expected, "compress = {}", compress);
            assert_eq!(decoded.author, original.author);
            assert_eq!(decoded.dimension, IVec3::new(40, 2, 1));
        }
    }

    #[test]
    fn test_short_stream() {
        // Shorter than the header: probed, rewound and parsed raw
        let bp = from_bytes(b"{}", "0.9.0").unwrap();
        assert!(bp.is_empty());
        assert_eq!(bp.version, 1.0);

        let err = from_bytes(b"LZ", "0.9.0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_corrupt_frame() {
        let mut bytes = header().to_vec();
        bytes.extend_from_slice(b"not a frame");
        let err = from_bytes(&bytes, "0.9.0").unwrap_err();
        assert!(matches!(err, Error::Format(_) | Error::Io(_)));
    }

    #[test]
    fn test_legacy_document() {
        let legacy = r#"{
            "Version": 1.1,
            "Blocks": [
                { "Position": [0, 0, 0], "Data": { "Kind": "Block", "BlockType": "Dirt" } },
                { "Position": [2, 3, 1], "Data": { "Kind": "Block", "BlockType": "Dirt" } }
            ],
            "Plants": [
                { "Position": [0, 1, 0], "Data": { "Kind": "Plant", "PlantType": "Wheat" } }
            ]
        }"#;
        let bp = from_bytes(legacy.as_bytes(), "0.9.0").unwrap();
        assert_eq!(bp.version, 1.1);
        assert!(bp.objects.is_empty());
        assert_eq!(bp.author, AuthorInformation::default());
        assert_eq!(bp.dimension, IVec3::new(3, 4, 2));
        let VoxelSnapshot::Plant(plant) = &bp.plants[0].snapshot else {
            panic!("Expected plant");
        };
        assert_eq!(plant.species, "Wheat");
    }
}
