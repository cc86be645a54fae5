//! Raw map records to tiles.
//!
//! A raw map holds one fixed 20-byte record per cell followed by a pool of
//! 15-byte addon records. Each cell links into the pool through
//! `next_addon_index`; addons carry the extra fragments of the cell.

use anyhow::Context;

use crate::constants::TERRAIN_IMAGE_MASK;
use crate::map::TileMap;
use crate::tile::Tile;
use crate::types::fragment::{ObjectLayer, TileFragment};
use crate::types::icn::ObjectIcnType;
use crate::types::object_type::MapObjectType;

pub const MP2_TILE_RECORD_SIZE: usize = 20;
pub const MP2_ADDON_RECORD_SIZE: usize = 15;

/// One raw cell record, little-endian, no padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bincode::Decode, bincode::Encode)]
pub struct Mp2TileRecord {
    /// Low 14 bits: terrain image. The upper bits are unused.
    pub terrain_image_index: u16,
    /// Visual group of the bottom sprite, shifted left by 2.
    pub object_name1: u8,
    pub bottom_image_index: u8,
    /// Low 2 bits: structural layer of the bottom sprite.
    pub quantity1: u8,
    pub quantity2: u8,
    /// Visual group of the top sprite, shifted left by 2.
    pub object_name2: u8,
    pub top_image_index: u8,
    /// Low 2 bits: terrain flips. Bit 6 is the editor's road flag, which
    /// is set on cells without any road and is ignored.
    pub terrain_flags: u8,
    pub map_object_type: u8,
    pub next_addon_index: u16,
    pub level1_uid: u32,
    pub level2_uid: u32,
}

/// One raw addon record. Addons form singly linked chains per cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bincode::Decode, bincode::Encode)]
pub struct Mp2AddonRecord {
    pub next_addon_index: u16,
    pub object_name_n1: u8,
    pub bottom_image_index: u8,
    pub quantity_n: u8,
    pub object_name_n2: u8,
    pub top_image_index: u8,
    pub level1_uid: u32,
    pub level2_uid: u32,
}

/// Decodes `count` consecutive fixed-size records.
pub fn decode_records<T: bincode::Decode<()>>(bytes: &[u8], count: usize) -> anyhow::Result<Vec<T>> {
    let config = bincode::config::legacy();
    let mut records = Vec::with_capacity(count);
    let mut offset = 0;

    for position in 0..count {
        let slice = bytes.get(offset..).unwrap_or_default();
        let (record, consumed) = bincode::decode_from_slice(slice, config)
            .with_context(|| format!("record {position} at byte offset {offset}"))?;
        records.push(record);
        offset += consumed;
    }

    Ok(records)
}

fn icn_from_raw(raw: u8) -> ObjectIcnType {
    ObjectIcnType::from_u8_lossy(raw >> 2)
}

impl Tile {
    /// Builds a tile from its raw record. Addons are attached separately.
    pub fn from_mp2(index: i32, record: &Mp2TileRecord) -> Self {
        let mut tile = Tile::new(index);

        tile.metadata[0] = ((u32::from(record.quantity2) << 8) + u32::from(record.quantity1)) >> 3;
        tile.terrain_image_index = record.terrain_image_index & TERRAIN_IMAGE_MASK;
        tile.terrain_flags = record.terrain_flags & 0x03;

        tile.main_object_type = MapObjectType::from_u8(record.map_object_type).unwrap_or_else(|| {
            log::warn!(
                "Tile {}: unknown object type code {:#04x}, treating it as empty",
                index,
                record.map_object_type
            );
            MapObjectType::NONE
        });

        if !tile.main_object_type.contains_metadata() && tile.metadata[0] != 0 {
            // Cleared later when the map is finalized.
            log::warn!(
                "Metadata present for non action object {} at tile {}. Metadata value {}",
                tile.main_object_type.to_string(),
                index,
                tile.metadata[0]
            );
        }

        let bottom_icn = icn_from_raw(record.object_name1);
        let layer = ObjectLayer::from_bits(record.quantity1);

        if tile.main_object_type.is_none() && layer.is_non_blocking() {
            // Shadows and terrain decorations are never the primary object of
            // an empty cell.
            tile.push_bottom_fragment_if_visible(TileFragment::new(
                layer,
                record.level1_uid,
                bottom_icn,
                record.bottom_image_index,
            ));
        } else {
            tile.layer = layer;
            tile.uid = record.level1_uid;
            tile.icn_type = bottom_icn;
            tile.image_index = record.bottom_image_index;
            tile.update_road_flag();
        }

        let top_icn = icn_from_raw(record.object_name2);
        if !top_icn.is_unknown() {
            tile.push_top_fragment(TileFragment::new(
                ObjectLayer::Object,
                record.level2_uid,
                top_icn,
                record.top_image_index,
            ));
        }

        tile
    }

    fn push_bottom_fragment_if_visible(&mut self, fragment: TileFragment) {
        if !fragment.icn_type.is_unknown() {
            self.push_bottom_fragment(fragment);
        }
    }

    /// Attaches both halves of an addon record.
    pub fn push_mp2_addon(&mut self, addon: &Mp2AddonRecord) {
        self.push_bottom_fragment_if_visible(TileFragment::new(
            ObjectLayer::from_bits(addon.quantity_n),
            addon.level1_uid,
            icn_from_raw(addon.object_name_n1),
            addon.bottom_image_index,
        ));

        let top_icn = icn_from_raw(addon.object_name_n2);
        if !top_icn.is_unknown() {
            self.push_top_fragment(TileFragment::new(
                ObjectLayer::Object,
                addon.level2_uid,
                top_icn,
                addon.top_image_index,
            ));
        }
    }
}

impl TileMap {
    /// Builds a complete map from raw records: tiles, addon chains, then
    /// object fixup, both passability passes and region assignment.
    pub fn from_mp2(
        width: i32,
        height: i32,
        tiles: &[Mp2TileRecord],
        addons: &[Mp2AddonRecord],
    ) -> anyhow::Result<Self> {
        let expected = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .map(|(w, h)| w * h)
            .filter(|&count| count > 0)
            .with_context(|| format!("invalid map size {width}x{height}"))?;

        anyhow::ensure!(
            tiles.len() == expected,
            "map is {}x{} but {} tile records were provided",
            width,
            height,
            tiles.len()
        );

        let mut grid = Vec::with_capacity(expected);
        for (position, record) in tiles.iter().enumerate() {
            let mut tile = Tile::from_mp2(position as i32, record);
            attach_addon_chain(&mut tile, record.next_addon_index, addons);
            tile.sort_fragments();
            grid.push(tile);
        }

        let mut map = TileMap::from_tiles(width, height, grid)?;
        map.finalize_load();
        Ok(map)
    }

    /// Same as [`TileMap::from_mp2`], reading the records from raw bytes.
    pub fn from_mp2_bytes(
        width: i32,
        height: i32,
        tile_bytes: &[u8],
        addon_bytes: &[u8],
    ) -> anyhow::Result<Self> {
        let tile_count = tile_bytes.len() / MP2_TILE_RECORD_SIZE;
        let addon_count = addon_bytes.len() / MP2_ADDON_RECORD_SIZE;

        let tiles: Vec<Mp2TileRecord> = decode_records(tile_bytes, tile_count).context("tile records")?;
        let addons: Vec<Mp2AddonRecord> = decode_records(addon_bytes, addon_count).context("addon records")?;

        Self::from_mp2(width, height, &tiles, &addons)
    }
}

/// Follows a cell's addon chain. Index 0 ends the chain; an index outside
/// the pool or a loop cuts it short.
fn attach_addon_chain(tile: &mut Tile, first: u16, addons: &[Mp2AddonRecord]) {
    let mut next = usize::from(first);
    let mut visited: Vec<usize> = Vec::new();

    while next != 0 {
        let Some(addon) = addons.get(next) else {
            log::warn!("Tile {}: addon index {} is outside the addon pool", tile.index(), next);
            return;
        };

        if visited.contains(&next) {
            log::warn!("Tile {}: addon chain loops back to {}, cutting it", tile.index(), next);
            return;
        }
        visited.push(next);

        tile.push_mp2_addon(addon);
        next = usize::from(addon.next_addon_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Direction;
    use crate::types::object_type::ObjectKind;

    fn raw_icn(icn: ObjectIcnType) -> u8 {
        (icn as u8) << 2
    }

    fn encode<T: bincode::Encode>(value: &T) -> Vec<u8> {
        bincode::encode_to_vec(value, bincode::config::legacy()).unwrap()
    }

    #[test]
    fn record_sizes_match_the_raw_layout() {
        assert_eq!(encode(&Mp2TileRecord::default()).len(), MP2_TILE_RECORD_SIZE);
        assert_eq!(encode(&Mp2AddonRecord::default()).len(), MP2_ADDON_RECORD_SIZE);
    }

    #[test]
    fn decodes_fields_in_order() {
        let mut bytes = vec![0u8; MP2_TILE_RECORD_SIZE];
        bytes[0..2].copy_from_slice(&0xC028u16.to_le_bytes());
        bytes[2] = raw_icn(ObjectIcnType::Trefir);
        bytes[3] = 7;
        bytes[9] = 97;
        bytes[12..16].copy_from_slice(&42u32.to_le_bytes());

        let records: Vec<Mp2TileRecord> = decode_records(&bytes, 1).unwrap();
        let tile = Tile::from_mp2(3, &records[0]);

        assert_eq!(tile.terrain_image_index(), 0x28);
        assert_eq!(tile.icn_type(), ObjectIcnType::Trefir);
        assert_eq!(tile.image_index(), 7);
        assert_eq!(tile.uid(), 42);
        assert_eq!(tile.main_object_type(), MapObjectType::non_action(ObjectKind::Trees));
    }

    #[test]
    fn truncated_input_is_an_error() {
        let bytes = vec![0u8; MP2_TILE_RECORD_SIZE + 3];
        assert!(decode_records::<Mp2TileRecord>(&bytes, 2).is_err());
    }

    #[test]
    fn road_flag_bit_is_ignored() {
        let record = Mp2TileRecord {
            terrain_image_index: 40,
            terrain_flags: 0x40,
            object_name1: raw_icn(ObjectIcnType::Road),
            bottom_image_index: 1,
            ..Default::default()
        };

        let tile = Tile::from_mp2(0, &record);
        assert!(!tile.is_road());
        assert_eq!(tile.terrain_flags(), 0);
    }

    #[test]
    fn road_sprite_marks_road() {
        let record = Mp2TileRecord {
            object_name1: raw_icn(ObjectIcnType::Road),
            bottom_image_index: 2,
            quantity1: ObjectLayer::Terrain as u8,
            ..Default::default()
        };

        let tile = Tile::from_mp2(0, &record);
        assert!(tile.is_road());
        // Terrain layer on an empty cell is demoted to the bottom stack.
        assert_eq!(tile.icn_type(), ObjectIcnType::Unknown);
        assert_eq!(tile.bottom_fragments().len(), 1);
    }

    #[test]
    fn top_sprite_always_goes_to_top_stack() {
        let record = Mp2TileRecord {
            object_name2: raw_icn(ObjectIcnType::Trejngl),
            top_image_index: 4,
            level2_uid: 9,
            ..Default::default()
        };

        let tile = Tile::from_mp2(0, &record);
        assert_eq!(tile.top_fragments().len(), 1);
        assert_eq!(tile.top_fragments()[0].layer, ObjectLayer::Object);
        assert_eq!(tile.top_fragments()[0].uid, 9);
    }

    #[test]
    fn metadata_comes_from_both_quantities() {
        let record = Mp2TileRecord {
            quantity1: 0b0010_1000,
            quantity2: 0x01,
            map_object_type: MapObjectType::action(ObjectKind::Resource).to_u8(),
            ..Default::default()
        };

        let tile = Tile::from_mp2(0, &record);
        assert_eq!(tile.metadata()[0], (0x0128 >> 3) as u32);
    }

    #[test]
    fn unknown_object_type_decodes_as_none() {
        let record = Mp2TileRecord {
            map_object_type: 0x80,
            ..Default::default()
        };

        assert!(Tile::from_mp2(0, &record).main_object_type().is_none());
    }

    #[test]
    fn addon_chain_is_followed_and_cut_on_loops() {
        let tiles = vec![
            Mp2TileRecord {
                terrain_image_index: 40,
                next_addon_index: 1,
                ..Default::default()
            };
            4
        ];
        let addons = vec![
            Mp2AddonRecord::default(),
            Mp2AddonRecord {
                next_addon_index: 2,
                object_name_n1: raw_icn(ObjectIcnType::Road),
                bottom_image_index: 0,
                quantity_n: ObjectLayer::Terrain as u8,
                ..Default::default()
            },
            Mp2AddonRecord {
                next_addon_index: 1,
                object_name_n2: raw_icn(ObjectIcnType::Trefir),
                top_image_index: 3,
                ..Default::default()
            },
        ];

        let map = TileMap::from_mp2(2, 2, &tiles, &addons).unwrap();
        let tile = map.tile(0).unwrap();
        assert!(tile.is_road());
        assert_eq!(tile.top_fragments().len(), 1);
        assert_eq!(tile.bottom_fragments().len(), 1);
        assert_eq!(tile.passability() & Direction::CENTER, Direction::CENTER);
    }

    #[test]
    fn wrong_record_count_is_rejected() {
        let tiles = vec![Mp2TileRecord::default(); 3];
        assert!(TileMap::from_mp2(2, 2, &tiles, &[]).is_err());
    }

    #[test]
    fn decodes_from_raw_bytes() {
        let record = Mp2TileRecord {
            terrain_image_index: 40,
            ..Default::default()
        };
        let bytes: Vec<u8> = (0..4).flat_map(|_| encode(&record)).collect();

        let map = TileMap::from_mp2_bytes(2, 2, &bytes, &[]).unwrap();
        assert_eq!(map.width(), 2);
        assert_eq!(map.tile(3).unwrap().terrain_image_index(), 40);
    }
}
