//! Versioned binary persistence of tiles and whole maps.
//!
//! Everything is little-endian. Writers always produce the current format;
//! readers accept every version back to `LAST_SUPPORTED_FORMAT_VERSION`.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::constants::{
    Colors, Direction, CURRENT_FORMAT_VERSION, FORMAT_VERSION_1001_RELEASE,
    FORMAT_VERSION_1002_RELEASE, FORMAT_VERSION_1004_RELEASE, FORMAT_VERSION_PRE1_1001_RELEASE,
    FORMAT_VERSION_PRE2_1001_RELEASE, FORMAT_VERSION_PRE2_1009_RELEASE,
    LAST_SUPPORTED_FORMAT_VERSION, TERRAIN_IMAGE_MASK,
};
use crate::error::TileStreamError;
use crate::map::{HeroPresence, TileMap};
use crate::migration::{self, LegacyQuantity};
use crate::tile::Tile;
use crate::types::fragment::{ObjectLayer, TileFragment};
use crate::types::icn::ObjectIcnType;
use crate::types::object_type::MapObjectType;

/// "MTL1" read as a little-endian u32.
pub const MAP_STREAM_MAGIC: u32 = u32::from_le_bytes(*b"MTL1");

const METADATA_LENGTH: u32 = 3;

const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_PRE2_1001_RELEASE);
const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_1001_RELEASE);
const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_1002_RELEASE);
const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_PRE2_1009_RELEASE);

fn read_icn(bytes: &[u8], cursor: &mut usize, version: u16) -> Result<ObjectIcnType, TileStreamError> {
    let raw = read_u8!(bytes, *cursor)?;

    if version < FORMAT_VERSION_1001_RELEASE {
        return Ok(ObjectIcnType::from_u8_lossy(raw >> 2));
    }

    let icn = ObjectIcnType::from_u8_lossy(raw);
    if version < FORMAT_VERSION_PRE2_1009_RELEASE {
        // Two obsolete flags.
        read_bool!(bytes, *cursor)?;
        read_bool!(bytes, *cursor)?;
    }

    Ok(icn)
}

fn read_object_type(bytes: &[u8], cursor: &mut usize, version: u16) -> Result<MapObjectType, TileStreamError> {
    let mut code = read_u8!(bytes, *cursor)?;
    if version < FORMAT_VERSION_PRE1_1001_RELEASE {
        code = migration::convert_old_main_object_type(code);
    }

    MapObjectType::from_u8(code).ok_or(TileStreamError::UnknownObjectType(code))
}

fn read_fragments(bytes: &[u8], cursor: &mut usize, version: u16) -> Result<Vec<TileFragment>, TileStreamError> {
    let count = read_u32!(bytes, *cursor)?;

    // Never trust the count for the allocation size.
    let mut fragments = Vec::with_capacity((count as usize).min(bytes.len() / 7));
    for _ in 0..count {
        fragments.push(TileFragment::read_from(bytes, cursor, version)?);
    }

    Ok(fragments)
}

fn write_fragments(bytes: &mut Vec<u8>, fragments: &[TileFragment]) {
    bytes.extend_from_slice(&(fragments.len() as u32).to_le_bytes());
    for fragment in fragments {
        fragment.write_to(bytes);
    }
}

impl TileFragment {
    pub fn write_to(&self, bytes: &mut Vec<u8>) {
        bytes.push(self.layer as u8);
        bytes.extend_from_slice(&self.uid.to_le_bytes());
        bytes.push(self.icn_type as u8);
        bytes.push(self.image_index);
    }

    pub fn read_from(bytes: &[u8], cursor: &mut usize, version: u16) -> Result<Self, TileStreamError> {
        let raw_layer = read_u8!(bytes, *cursor)?;
        let layer = if version < FORMAT_VERSION_PRE2_1009_RELEASE {
            ObjectLayer::from_bits(raw_layer)
        } else {
            ObjectLayer::from_u8(raw_layer).ok_or(TileStreamError::InvalidLayer(raw_layer))?
        };

        let uid = read_u32!(bytes, *cursor)?;
        let icn_type = read_icn(bytes, cursor, version)?;
        let image_index = read_u8!(bytes, *cursor)?;

        Ok(TileFragment::new(layer, uid, icn_type, image_index))
    }
}

impl Tile {
    pub fn write_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.terrain_image_index.to_le_bytes());
        bytes.push(self.terrain_flags);
        bytes.extend_from_slice(&self.passability.bits().to_le_bytes());
        bytes.extend_from_slice(&self.uid.to_le_bytes());
        bytes.push(self.icn_type as u8);
        bytes.push(self.image_index);
        bytes.push(self.main_object_type.to_u8());
        bytes.push(self.fog_colors.bits());

        bytes.extend_from_slice(&METADATA_LENGTH.to_le_bytes());
        for value in &self.metadata {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        bytes.push(self.occupant_hero_id);
        bytes.push(u8::from(self.is_road));
        write_fragments(bytes, &self.bottom_fragments);
        write_fragments(bytes, &self.top_fragments);
        bytes.push(self.layer as u8);
        bytes.push(self.boat_owner_color.bits());
    }

    /// Reads one tile written by format `version`. Streams older than the
    /// metadata array return their quantity fields alongside the tile; they
    /// can only be interpreted once the whole map is known.
    pub fn read_from(
        bytes: &[u8],
        cursor: &mut usize,
        version: u16,
    ) -> Result<(Tile, Option<LegacyQuantity>), TileStreamError> {
        let index = read_i32!(bytes, *cursor)?;
        let mut tile = Tile::new(index);

        if version < FORMAT_VERSION_PRE2_1001_RELEASE {
            let packed = read_u16!(bytes, *cursor)?;
            tile.terrain_image_index = packed & TERRAIN_IMAGE_MASK;
            tile.terrain_flags = (packed >> 14) as u8;
        } else {
            tile.terrain_image_index = read_u16!(bytes, *cursor)?;
            tile.terrain_flags = read_u8!(bytes, *cursor)?;
        }

        tile.passability = Direction::from_bits_truncate(read_u16!(bytes, *cursor)?);
        tile.uid = read_u32!(bytes, *cursor)?;
        tile.icn_type = read_icn(bytes, cursor, version)?;
        tile.image_index = read_u8!(bytes, *cursor)?;
        tile.main_object_type = read_object_type(bytes, cursor, version)?;
        tile.fog_colors = Colors::from_bits_truncate(read_u8!(bytes, *cursor)?);

        let mut legacy = None;
        if version < FORMAT_VERSION_1004_RELEASE {
            legacy = Some(LegacyQuantity {
                quantity1: read_u8!(bytes, *cursor)?,
                quantity2: read_u8!(bytes, *cursor)?,
                additional: read_u32!(bytes, *cursor)?,
            });
        } else {
            let length = read_u32!(bytes, *cursor)?;
            if length != METADATA_LENGTH {
                return Err(TileStreamError::MetadataSize(length));
            }
            for slot in 0..tile.metadata.len() {
                tile.metadata[slot] = read_u32!(bytes, *cursor)?;
            }
        }

        tile.occupant_hero_id = read_u8!(bytes, *cursor)?;
        let is_road = read_bool!(bytes, *cursor)?;

        for fragment in read_fragments(bytes, cursor, version)? {
            tile.push_bottom_fragment(fragment);
        }
        for fragment in read_fragments(bytes, cursor, version)? {
            tile.push_top_fragment(fragment);
        }
        // The stored road mark wins over whatever the pushes derived.
        tile.is_road = is_road;

        let raw_layer = read_u8!(bytes, *cursor)?;
        tile.layer = ObjectLayer::from_u8(raw_layer).ok_or(TileStreamError::InvalidLayer(raw_layer))?;

        if version >= FORMAT_VERSION_1002_RELEASE {
            tile.boat_owner_color = Colors::from_bits_truncate(read_u8!(bytes, *cursor)?);
        }

        Ok((tile, legacy))
    }
}

impl TileMap {
    /// Serializes the map in the current format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(16 + self.tiles.len() * 32);

        bytes.extend_from_slice(&MAP_STREAM_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&CURRENT_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&self.width.to_le_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());

        for tile in &self.tiles {
            tile.write_to(&mut bytes);
        }

        bytes.extend_from_slice(&(self.heroes.len() as u32).to_le_bytes());
        for (id, hero) in &self.heroes {
            bytes.push(*id);
            bytes.extend_from_slice(&hero.index.to_le_bytes());
            bytes.push(hero.color.bits());
            bytes.push(hero.object_type_under.to_u8());
        }

        bytes.extend_from_slice(&(self.castle_entrances.len() as u32).to_le_bytes());
        for (index, color) in &self.castle_entrances {
            bytes.extend_from_slice(&index.to_le_bytes());
            bytes.push(color.bits());
        }

        bytes.extend_from_slice(&(self.alliances.len() as u32).to_le_bytes());
        for group in &self.alliances {
            bytes.push(group.bits());
        }

        bytes.extend_from_slice(&self.next_object_uid.to_le_bytes());
        bytes
    }

    /// Reads a map stream of any supported version. Old streams are
    /// migrated once the hero roster is known; regions are always rebuilt.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TileStreamError> {
        let mut cursor: usize = 0;

        let magic = read_u32!(bytes, cursor)?;
        if magic != MAP_STREAM_MAGIC {
            return Err(TileStreamError::InvalidMagic(magic));
        }

        let version = read_u16!(bytes, cursor)?;
        if version < LAST_SUPPORTED_FORMAT_VERSION {
            return Err(TileStreamError::UnsupportedVersion(version));
        }
        if version > CURRENT_FORMAT_VERSION {
            return Err(TileStreamError::FutureVersion(version));
        }

        let width = read_i32!(bytes, cursor)?;
        let height = read_i32!(bytes, cursor)?;
        let tile_count = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .filter(|&count| count > 0)
            .ok_or(TileStreamError::DimensionMismatch {
                width,
                height,
                tiles: 0,
            })?;

        let mut tiles = Vec::with_capacity(tile_count.min(bytes.len()));
        let mut quantities = Vec::new();
        for _ in 0..tile_count {
            let (tile, legacy) = Tile::read_from(bytes, &mut cursor, version)?;
            if let Some(legacy) = legacy {
                quantities.push((tile.index, legacy));
            }
            tiles.push(tile);
        }

        let mut map = TileMap::from_tiles(width, height, tiles)?;

        let hero_count = read_u32!(bytes, cursor)?;
        for _ in 0..hero_count {
            let id = read_u8!(bytes, cursor)?;
            let index = read_i32!(bytes, cursor)?;
            let color = Colors::from_bits_truncate(read_u8!(bytes, cursor)?);
            let object_type_under = read_object_type(bytes, &mut cursor, version)?;
            map.heroes.insert(
                id,
                HeroPresence {
                    index,
                    color,
                    object_type_under,
                },
            );
        }

        let castle_count = read_u32!(bytes, cursor)?;
        for _ in 0..castle_count {
            let index = read_i32!(bytes, cursor)?;
            let color = Colors::from_bits_truncate(read_u8!(bytes, cursor)?);
            map.castle_entrances.insert(index, color);
        }

        let alliance_count = read_u32!(bytes, cursor)?;
        for _ in 0..alliance_count {
            map.alliances.push(Colors::from_bits_truncate(read_u8!(bytes, cursor)?));
        }

        map.next_object_uid = map.next_object_uid.max(read_u32!(bytes, cursor)?);

        if version < CURRENT_FORMAT_VERSION {
            log::debug!(
                "Migrating map stream from version {} to {}",
                version,
                CURRENT_FORMAT_VERSION
            );
            map.finish_legacy_load(version, &quantities);
        }

        map.assign_regions();
        Ok(map)
    }

    /// [`TileMap::to_bytes`] compressed with zlib at `level` (0 to 9).
    pub fn save_compressed(&self, level: u32) -> Result<Vec<u8>, TileStreamError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
        encoder.write_all(&self.to_bytes())?;
        Ok(encoder.finish()?)
    }

    pub fn load_compressed(bytes: &[u8]) -> Result<Self, TileStreamError> {
        let mut decoder = ZlibDecoder::new(bytes);
        let mut raw = Vec::new();
        decoder.read_to_end(&mut raw)?;
        Self::from_bytes(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REGION_NODE_BLOCKED;
    use crate::types::object_type::ObjectKind;
    use crate::types::resource;

    const GRASS: u16 = 40;

    fn sample_tile() -> Tile {
        let mut tile = Tile::new(0);
        tile.terrain_image_index = GRASS;
        tile.terrain_flags = 2;
        tile.passability = Direction::CENTER_ROW;
        tile.uid = 12;
        tile.icn_type = ObjectIcnType::Trefir;
        tile.image_index = 4;
        tile.main_object_type = MapObjectType::non_action(ObjectKind::Trees);
        tile.fog_colors = Colors::RED | Colors::BLUE;
        tile.metadata = [1, 2, 3];
        tile.boat_owner_color = Colors::GREEN;
        tile.push_bottom_fragment(TileFragment::new(ObjectLayer::Terrain, 7, ObjectIcnType::Road, 2));
        tile.push_top_fragment(TileFragment::new(ObjectLayer::Object, 12, ObjectIcnType::Trefir, 5));
        tile
    }

    /// A tile as streams before the metadata array wrote it: shifted visual
    /// groups, packed terrain word, old object codes, quantities, no boat
    /// color.
    fn legacy_tile_bytes(index: i32, object_code: u8, quantity1: u8, quantity2: u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&index.to_le_bytes());
        bytes.extend_from_slice(&(GRASS | (1 << 14)).to_le_bytes());
        bytes.extend_from_slice(&Direction::ALL.bits().to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(0);
        bytes.push(crate::constants::NO_IMAGE);
        bytes.push(object_code);
        bytes.push(Colors::ALL.bits());
        bytes.push(quantity1);
        bytes.push(quantity2);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(0);
        bytes.push(0);

        // One bottom fragment with layer flag bits set.
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(0x04 | ObjectLayer::Shadow as u8);
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.push((ObjectIcnType::Trefir as u8) << 2);
        bytes.push(0);

        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(ObjectLayer::Object as u8);
        bytes
    }

    fn map_header(version: u16, width: i32, height: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAP_STREAM_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&version.to_le_bytes());
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes
    }

    fn empty_rosters() -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..3 {
            bytes.extend_from_slice(&0u32.to_le_bytes());
        }
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes
    }

    #[test]
    fn tile_survives_a_round_trip() {
        let tile = sample_tile();
        let mut bytes = Vec::new();
        tile.write_to(&mut bytes);

        let mut cursor = 0;
        let (read, legacy) = Tile::read_from(&bytes, &mut cursor, CURRENT_FORMAT_VERSION).unwrap();
        assert_eq!(read, tile);
        assert!(legacy.is_none());
        assert_eq!(cursor, bytes.len());
    }

    #[test]
    fn truncated_tile_reports_offset() {
        let mut bytes = Vec::new();
        sample_tile().write_to(&mut bytes);
        bytes.truncate(10);

        let mut cursor = 0;
        assert!(matches!(
            Tile::read_from(&bytes, &mut cursor, CURRENT_FORMAT_VERSION),
            Err(TileStreamError::UnexpectedEof { offset: 9, needed: 4 })
        ));
    }

    #[test]
    fn bad_metadata_length_is_rejected() {
        let mut bytes = Vec::new();
        sample_tile().write_to(&mut bytes);
        // index 4 + terrain 3 + passability 2 + uid 4 + icn/image/type/fog 4
        bytes[17..21].copy_from_slice(&4u32.to_le_bytes());

        let mut cursor = 0;
        assert!(matches!(
            Tile::read_from(&bytes, &mut cursor, CURRENT_FORMAT_VERSION),
            Err(TileStreamError::MetadataSize(4))
        ));
    }

    #[test]
    fn fragment_layer_must_be_valid_in_current_streams() {
        let bytes = [0x05, 1, 0, 0, 0, ObjectIcnType::Trefir as u8, 0];
        let mut cursor = 0;
        assert!(matches!(
            TileFragment::read_from(&bytes, &mut cursor, CURRENT_FORMAT_VERSION),
            Err(TileStreamError::InvalidLayer(5))
        ));
    }

    #[test]
    fn obsolete_flags_are_skipped_between_versions() {
        let version = FORMAT_VERSION_1001_RELEASE;
        let bytes = [0x06, 9, 0, 0, 0, ObjectIcnType::Trefir as u8, 1, 0, 4];
        let mut cursor = 0;
        let fragment = TileFragment::read_from(&bytes, &mut cursor, version).unwrap();

        assert_eq!(fragment.layer, ObjectLayer::Shadow);
        assert_eq!(fragment.uid, 9);
        assert_eq!(fragment.icn_type, ObjectIcnType::Trefir);
        assert_eq!(fragment.image_index, 4);
        assert_eq!(cursor, bytes.len());
    }

    #[test]
    fn map_round_trip_keeps_rosters() {
        let mut map = TileMap::with_terrain(2, 2, GRASS);
        map.with_tile_mut(1, |tile| {
            tile.push_top_fragment(TileFragment::new(ObjectLayer::Object, 4, ObjectIcnType::Trefir, 1))
        });
        map.place_hero(3, 2, Colors::YELLOW);
        map.set_castle_entrance(0, Colors::BLUE);
        map.set_alliances(vec![Colors::BLUE | Colors::YELLOW]);
        map.compute_passability();
        map.assign_regions();

        let read = TileMap::from_bytes(&map.to_bytes()).unwrap();
        assert_eq!(read.tiles(), map.tiles());
        assert_eq!(read.hero(2), map.hero(2));
        assert_eq!(read.castle_entrance_color(0), Some(Colors::BLUE));
        assert!(read.are_friends(Colors::BLUE, Colors::YELLOW));
        // The uid counter never falls behind the uids in use.
        assert_eq!(read.clone().new_object_uid(), 5);
    }

    #[test]
    fn compressed_round_trip() {
        let mut map = TileMap::with_terrain(4, 4, GRASS);
        map.assign_regions();
        let packed = map.save_compressed(6).unwrap();
        assert!(packed.len() < map.to_bytes().len());

        let read = TileMap::load_compressed(&packed).unwrap();
        assert_eq!(read.tiles(), map.tiles());
        assert!(TileMap::load_compressed(&[1, 2, 3]).is_err());
    }

    #[test]
    fn version_window_is_enforced() {
        let mut bytes = map_header(LAST_SUPPORTED_FORMAT_VERSION - 1, 1, 1);
        assert!(matches!(
            TileMap::from_bytes(&bytes),
            Err(TileStreamError::UnsupportedVersion(_))
        ));

        bytes = map_header(CURRENT_FORMAT_VERSION + 1, 1, 1);
        assert!(matches!(TileMap::from_bytes(&bytes), Err(TileStreamError::FutureVersion(_))));

        bytes[0] = b'X';
        assert!(matches!(TileMap::from_bytes(&bytes), Err(TileStreamError::InvalidMagic(_))));
    }

    #[test]
    fn legacy_stream_is_migrated() {
        let version = LAST_SUPPORTED_FORMAT_VERSION;
        let mut bytes = map_header(version, 2, 1);

        let sawmill = MapObjectType::action(ObjectKind::Sawmill).to_u8();
        bytes.extend(legacy_tile_bytes(0, sawmill, resource::GOLD as u8, 5));
        bytes.extend(legacy_tile_bytes(1, MapObjectType::NONE.to_u8(), 0, 0));
        bytes.extend(empty_rosters());

        let map = TileMap::from_bytes(&bytes).unwrap();
        let tile = map.tile(0).unwrap();
        assert_eq!(tile.terrain_image_index(), GRASS);
        assert_eq!(tile.terrain_flags(), 1);
        assert_eq!(tile.metadata(), &[resource::GOLD, 500, 0]);
        assert_eq!(tile.boat_owner_color(), Colors::empty());

        let fragment = tile.bottom_fragments()[0];
        assert_eq!(fragment.layer, ObjectLayer::Shadow);
        assert_eq!(fragment.icn_type, ObjectIcnType::Trefir);

        assert_ne!(tile.region(), REGION_NODE_BLOCKED);
    }

    #[test]
    fn unknown_object_code_is_an_error() {
        let mut tile = Vec::new();
        sample_tile().write_to(&mut tile);
        // The object type byte follows index, terrain, passability, uid, icn and image.
        tile[15] = 0x80;

        let mut cursor = 0;
        assert!(matches!(
            Tile::read_from(&tile, &mut cursor, CURRENT_FORMAT_VERSION),
            Err(TileStreamError::UnknownObjectType(0x80))
        ));
    }
}
