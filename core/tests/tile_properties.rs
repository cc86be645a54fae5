//! Cross-module scenarios: raw decoding, both passability phases, region
//! assignment, persistence and legacy metadata.

use maptile_core::constants::{ARTIFACT_UNKNOWN, FORMAT_VERSION_1003_RELEASE, LEGACY_ARTIFACT_UNKNOWN, REGION_NODE_BLOCKED};
use maptile_core::decoder::{Mp2AddonRecord, Mp2TileRecord};
use maptile_core::migration::{fix_old_artifact_ids, quantity_into_metadata, LegacyQuantity};
use maptile_core::types::resource;
use maptile_core::{
    Colors, Direction, MapObjectType, ObjectIcnType, ObjectKind, ObjectLayer, Tile, TileFragment, TileMap,
};

const GRASS: u16 = 40;
const WATER: u16 = 16;

fn raw_icn(icn: ObjectIcnType) -> u8 {
    (icn as u8) << 2
}

/// Puts a single object sprite on a tile as its primary.
fn place(map: &mut TileMap, index: i32, object_type: MapObjectType, icn: ObjectIcnType, image: u8, uid: u32) {
    map.with_tile_mut(index, |tile| {
        tile.set_main_object_type(object_type);
        tile.push_bottom_fragment(TileFragment::new(ObjectLayer::Object, uid, icn, image));
        tile.sort_fragments();
    })
    .expect("index inside the map");
}

#[test]
fn road_flag_needs_a_road_frame() {
    let mut tile = Tile::new(0);
    tile.push_bottom_fragment(TileFragment::new(ObjectLayer::Terrain, 1, ObjectIcnType::Road, 1));
    assert!(!tile.is_road());

    tile.push_bottom_fragment(TileFragment::new(ObjectLayer::Terrain, 2, ObjectIcnType::Road, 0));
    assert!(tile.is_road());
}

#[test]
fn sorting_twice_changes_nothing() {
    let mut tile = Tile::new(0);
    for (layer, uid, image) in [
        (ObjectLayer::Shadow, 1, 0),
        (ObjectLayer::Object, 2, 1),
        (ObjectLayer::Terrain, 3, 0),
        (ObjectLayer::Background, 4, 2),
        (ObjectLayer::Object, 5, 4),
    ] {
        tile.push_bottom_fragment(TileFragment::new(layer, uid, ObjectIcnType::Trefir, image));
    }

    tile.sort_fragments();
    let once = tile.clone();
    tile.sort_fragments();

    assert_eq!(tile, once);
    assert_eq!(tile.layer(), ObjectLayer::Object);
    // The later object fragment wins the tie.
    assert_eq!(tile.uid(), 5);
}

#[test]
fn map_edges_never_allow_leaving_the_map() {
    let mut map = TileMap::with_terrain(4, 3, GRASS);
    map.compute_passability();

    for index in 0..12 {
        let mask = map.passability(index);
        let (x, y) = (index % 4, index / 4);
        if x == 0 {
            assert!(!mask.intersects(Direction::LEFT | Direction::TOP_LEFT | Direction::BOTTOM_LEFT));
        }
        if x == 3 {
            assert!(!mask.intersects(Direction::RIGHT | Direction::TOP_RIGHT | Direction::BOTTOM_RIGHT));
        }
        if y == 0 {
            assert!(!mask.intersects(Direction::TOP_ROW));
        }
        if y == 2 {
            assert!(!mask.intersects(Direction::BOTTOM_ROW));
        }
    }
}

#[test]
fn unclassified_scenery_above_water_blocks() {
    let mut map = TileMap::with_terrain(3, 3, GRASS);
    map.with_tile_mut(7, |tile| tile.set_terrain(WATER, false, false));
    place(&mut map, 4, MapObjectType::NONE, ObjectIcnType::Objngras, 10, 5);
    map.compute_passability();

    assert_eq!(map.passability(4), Direction::empty());
}

#[test]
fn combined_trees_leave_diagonals_open() {
    let trees = MapObjectType::non_action(ObjectKind::Trees);
    let mut map = TileMap::with_terrain(3, 3, GRASS);

    place(&mut map, 4, trees, ObjectIcnType::Trejngl, 2, 1);
    map.with_tile_mut(4, |tile| {
        tile.push_top_fragment(TileFragment::new(ObjectLayer::Object, 1, ObjectIcnType::Trejngl, 1))
    });
    place(&mut map, 7, trees, ObjectIcnType::Trefir, 1, 2);
    map.compute_passability();

    assert_eq!(
        map.passability(4),
        Direction::LEFT | Direction::CENTER | Direction::RIGHT | Direction::BOTTOM_LEFT | Direction::BOTTOM_RIGHT
    );
}

#[test]
fn blocked_tiles_and_blocked_region_coincide() {
    let mut map = TileMap::with_terrain(4, 4, GRASS);
    let rock = MapObjectType::non_action(ObjectKind::Rock);
    place(&mut map, 5, rock, ObjectIcnType::Objngras, 10, 7);
    place(&mut map, 9, rock, ObjectIcnType::Objngras, 11, 7);
    place(&mut map, 14, rock, ObjectIcnType::Objngras, 12, 8);
    map.with_tile_mut(3, |tile| tile.set_terrain(WATER, false, false));
    map.compute_passability();
    map.assign_regions();

    let mut blocked = 0;
    for tile in map.tiles() {
        assert_eq!(tile.passability().is_empty(), tile.region() == REGION_NODE_BLOCKED);
        if tile.passability().is_empty() {
            blocked += 1;
        }
    }
    assert!(blocked >= 2);
    assert_ne!(map.tile(3).unwrap().region(), map.tile(2).unwrap().region());
}

#[test]
fn raw_map_goes_through_every_stage() {
    let mut tiles = vec![
        Mp2TileRecord {
            terrain_image_index: GRASS,
            ..Default::default()
        };
        9
    ];
    // A jungle tree spanning rows 0 and 1 in the middle column.
    tiles[1].object_name1 = raw_icn(ObjectIcnType::Trejngl);
    tiles[1].bottom_image_index = 5;
    tiles[1].level1_uid = 3;
    tiles[1].map_object_type = MapObjectType::non_action(ObjectKind::Trees).to_u8();
    tiles[4].object_name1 = raw_icn(ObjectIcnType::Trejngl);
    tiles[4].bottom_image_index = 6;
    tiles[4].level1_uid = 3;
    tiles[4].map_object_type = MapObjectType::non_action(ObjectKind::Trees).to_u8();
    tiles[8].next_addon_index = 1;

    let addons = vec![
        Mp2AddonRecord::default(),
        Mp2AddonRecord {
            object_name_n1: raw_icn(ObjectIcnType::Road),
            bottom_image_index: 0,
            quantity_n: ObjectLayer::Terrain as u8,
            level1_uid: 9,
            ..Default::default()
        },
    ];

    let map = TileMap::from_mp2(3, 3, &tiles, &addons).unwrap();
    assert_eq!(map.passability(1), Direction::empty());
    assert!(map.tile(8).unwrap().is_road());
    assert_ne!(map.tile(0).unwrap().region(), REGION_NODE_BLOCKED);
    assert!(map.tile_info(4).unwrap().contains("TREJNGL.ICN"));
}

#[test]
fn saved_map_loads_back_identical() {
    let mut map = TileMap::with_terrain(3, 2, GRASS);
    place(&mut map, 1, MapObjectType::action(ObjectKind::Mines), ObjectIcnType::Mtngras, 20, 4);
    map.set_ownership_flag(1, Colors::GREEN);
    map.place_hero(4, 3, Colors::GREEN);
    map.clear_fog(4, Colors::GREEN);
    map.compute_passability();
    map.assign_regions();

    let packed = map.save_compressed(9).unwrap();
    let loaded = TileMap::load_compressed(&packed).unwrap();

    assert_eq!(loaded.tiles(), map.tiles());
    assert_eq!(loaded.object_type(4, false), MapObjectType::NONE);
    assert_eq!(loaded.hero_on_tile(4), Some(3));
    assert!(!loaded.tile(4).unwrap().is_fog(Colors::GREEN));
}

#[test]
fn legacy_gold_is_stored_in_full() {
    let sawmill = MapObjectType::action(ObjectKind::Sawmill);
    let gold = LegacyQuantity {
        quantity1: resource::GOLD as u8,
        quantity2: 5,
        additional: 0,
    };
    let wood = LegacyQuantity {
        quantity1: resource::WOOD as u8,
        ..gold
    };

    assert_eq!(quantity_into_metadata(sawmill, &gold, FORMAT_VERSION_1003_RELEASE).metadata[1], 500);
    assert_eq!(quantity_into_metadata(sawmill, &wood, FORMAT_VERSION_1003_RELEASE).metadata[1], 5);
}

#[test]
fn legacy_unknown_artifact_becomes_current_unknown() {
    let mut metadata = [LEGACY_ARTIFACT_UNKNOWN, 0, 0];
    fix_old_artifact_ids(MapObjectType::action(ObjectKind::TreasureChest), &mut metadata);
    assert_eq!(metadata[0], ARTIFACT_UNKNOWN);

    let mut known = [12, 0, 0];
    fix_old_artifact_ids(MapObjectType::action(ObjectKind::TreasureChest), &mut known);
    assert_eq!(known[0], 13);
}
