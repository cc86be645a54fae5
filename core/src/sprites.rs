//! Sprite signature tables. Every question the core asks about a single
//! (visual group, image index) pair is answered here.

use crate::types::icn::ObjectIcnType;
use crate::types::object_type::{MapObjectType, ObjectKind};

// Shadow frames per sheet family, sorted.
const MOUNTAINS1_SHADOWS: &[u8] = &[0, 5, 11, 17, 21, 26, 32, 38, 42, 45, 49, 52, 55, 59, 62, 65, 68, 71, 74, 75, 79, 80];
const MOUNTAINS2_SHADOWS: &[u8] = &[
    0, 5, 11, 17, 21, 26, 32, 38, 42, 46, 47, 53, 57, 58, 62, 68, 72, 75, 79, 82, 85, 89, 92, 95, 98, 101, 104, 105, 109, 110,
];
const TREE_SHADOWS: &[u8] = &[0, 3, 7, 10, 13, 17, 20, 23, 26, 29, 32, 34];
const CRACKED_SHADOWS: &[u8] = &[2, 9, 11, 14, 17, 20, 23, 26, 32, 40, 47, 57, 70, 72, 120, 123, 126, 129, 134, 141, 148, 154, 199, 205, 220, 226, 231, 235];
const DIRT_SHADOWS: &[u8] = &[0, 1, 5, 6, 14, 47, 52, 59, 62, 65, 68, 71, 74, 77, 80, 114, 117, 120, 123, 126, 129, 132, 135, 138, 141, 144, 147, 150, 153, 156, 159, 162, 165, 168, 171, 174, 177, 180, 183, 186, 189];
const DESERT_SHADOWS: &[u8] = &[11, 13, 16, 19, 23, 25, 27, 29, 33, 35, 38, 41, 44, 46, 47, 50, 52, 54, 71, 75, 77, 80, 86, 103, 115, 118];
const GRASS2_SHADOWS: &[u8] = &[5, 14, 19, 20, 28, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62];
const GRASS_SHADOWS: &[u8] = &[0, 4, 29, 32, 36, 39, 42, 44, 46, 48, 50, 76, 79, 82, 88, 92, 94, 98, 102, 105, 108, 111, 113, 120, 124, 128, 134, 138, 141, 143, 145, 147, 149];
const MULTI2_SHADOWS: &[u8] = &[14, 17, 20, 24, 34, 36, 42, 43, 49, 50, 60, 71, 72, 113, 115, 118, 121, 123, 127, 137, 143, 147, 153, 155, 157, 159, 161, 163, 165, 167, 169, 171, 173, 175, 177, 179, 181, 183, 185, 187, 189, 191, 193, 195, 197, 199, 201, 203, 205, 207, 209];
const MULTI_SHADOWS: &[u8] = &[1, 3, 15, 25, 27, 40, 42, 59, 63, 65, 72, 75, 78, 80, 86, 93, 97, 101, 104, 108, 111, 116, 119, 123];
const SNOW_SHADOWS: &[u8] = &[21, 25, 29, 31, 33, 47, 51, 60, 62, 66, 68, 70, 72, 74, 76, 78, 80, 82, 84, 86, 88, 90, 92, 94, 96, 98, 100, 102, 104, 106, 108, 110, 112, 114, 116, 118, 120, 122, 124, 126, 128, 130, 132, 134, 136, 138, 140, 142, 144, 146, 148, 150, 152, 154, 156, 158, 160, 162, 164, 166, 168, 170, 172, 174, 176, 178, 180, 182, 184, 186, 188, 190, 192, 194, 196, 198, 200, 202, 204, 206];
const SWAMP_SHADOWS: &[u8] = &[2, 3, 14, 15, 16, 17, 18, 19, 20, 21, 31, 43, 44, 45, 46, 47, 48, 49, 66, 83, 125, 127, 130, 132, 136, 141, 163, 170, 200, 208];
const WATER2_SHADOWS: &[u8] = &[0, 2];
const WATER_SHADOWS: &[u8] = &[12, 38, 52, 55, 118, 166, 188, 240];
const XLOC1_SHADOWS: &[u8] = &[1, 2, 4, 5, 28, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 69, 73, 79, 80, 81, 84, 85, 87, 89, 95, 96, 99, 100, 103, 107, 111, 113, 115, 121, 124, 130, 132];
const XLOC2_SHADOWS: &[u8] = &[2, 10, 47, 83];
const XLOC3_SHADOWS: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 41, 53];
const TOWN_SHADOWS: &[u8] = &[0, 16, 32, 48, 64, 80, 96, 112, 128, 144, 160, 176];
const LAVA_SHADOWS: &[u8] = &[10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79, 80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 91, 92, 93, 94, 95, 96, 97, 98, 99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111, 112, 113, 114, 115, 116, 117, 118, 119, 120, 121, 122, 123, 124, 125, 126, 127, 128, 129, 130, 131, 132, 133, 134, 135, 136, 137, 138, 139, 140, 141, 142, 143, 144, 145, 146, 147, 148, 149, 150, 151, 152, 153, 154, 155, 156, 157, 158, 159, 160];
const LAVA2_SHADOWS: &[u8] = &[0, 7, 14, 29, 33, 44, 55, 78];
const LAVA3_SHADOWS: &[u8] = &[0, 15, 30, 45, 60, 75, 90, 105, 120, 135, 165, 180, 195, 210, 225, 243];

// Frames of a road sprite that actually show a road.
const ROAD_IMAGES: &[u8] = &[0, 2, 3, 4, 5, 6, 7, 9, 12, 13, 14, 16, 17, 18, 19, 20, 21, 26, 28, 29, 30, 31];
const TOWN_GATE_ROAD_IMAGES: &[u8] = &[13, 29, 45, 61, 77, 93, 109, 125, 141, 157, 173, 189];
const TOWN_WALL_ROAD_IMAGES: &[u8] = &[13, 29];

fn contains(table: &[u8], image_index: u8) -> bool {
    table.binary_search(&image_index).is_ok()
}

/// Whether the sprite is nothing but a shadow. A missing object is never a
/// shadow.
pub fn is_shadow_sprite(icn: ObjectIcnType, image_index: u8) -> bool {
    use ObjectIcnType::*;
    match icn {
        Unknown => false,
        Mtndsrt | Mtngras | Mtnlava | Mtnmult | Mtnsnow | Mtnswmp => contains(MOUNTAINS1_SHADOWS, image_index),
        Mtncrck | Mtndirt => contains(MOUNTAINS2_SHADOWS, image_index),
        Tredeci | Treevil | Trefall | Trefir | Trejngl | Tresnow => contains(TREE_SHADOWS, image_index),
        Objncrck => contains(CRACKED_SHADOWS, image_index),
        Objndirt => contains(DIRT_SHADOWS, image_index),
        Objndsrt => contains(DESERT_SHADOWS, image_index),
        Objngra2 => contains(GRASS2_SHADOWS, image_index),
        Objngras => contains(GRASS_SHADOWS, image_index),
        Objnmul2 => contains(MULTI2_SHADOWS, image_index),
        Objnmult => contains(MULTI_SHADOWS, image_index),
        Objnsnow => contains(SNOW_SHADOWS, image_index),
        Objnswmp => contains(SWAMP_SHADOWS, image_index),
        Objnwat2 => contains(WATER2_SHADOWS, image_index),
        Objnwatr => contains(WATER_SHADOWS, image_index),
        Objnarti | Objnrsrc => image_index % 2 == 0,
        Objntwrd => image_index > 31,
        XLoc1 => contains(XLOC1_SHADOWS, image_index),
        XLoc2 => contains(XLOC2_SHADOWS, image_index),
        XLoc3 => contains(XLOC3_SHADOWS, image_index),
        Objntown => contains(TOWN_SHADOWS, image_index),
        Objnlava => contains(LAVA_SHADOWS, image_index),
        Objnlav2 => contains(LAVA2_SHADOWS, image_index),
        Objnlav3 => contains(LAVA3_SHADOWS, image_index),
        Objntwsh => true,
        Stream | Objntwba | Objnxtra | Road | Extraovr | Mons32 | Boat32 | Flag32 | Minihero => false,
    }
}

/// Road detection never trusts the map format's road bit: only these frames
/// show a road.
pub fn is_road_sprite(icn: ObjectIcnType, image_index: u8) -> bool {
    match icn {
        ObjectIcnType::Road => contains(ROAD_IMAGES, image_index),
        ObjectIcnType::Objntown => contains(TOWN_GATE_ROAD_IMAGES, image_index),
        ObjectIcnType::Objntwrd => contains(TOWN_WALL_ROAD_IMAGES, image_index),
        _ => false,
    }
}

pub fn is_stream_sprite(icn: ObjectIcnType, image_index: u8) -> bool {
    icn == ObjectIcnType::Stream || (icn == ObjectIcnType::Objnmul2 && image_index < 14)
}

pub fn is_reefs_sprite(icn: ObjectIcnType, image_index: u8) -> bool {
    icn == ObjectIcnType::XLoc2 && (111..=135).contains(&image_index)
}

/// Artifact frames; the first sixteen frames belong to the ultimate artifact
/// and even frames are shadows.
pub fn is_artifact_sprite(icn: ObjectIcnType, image_index: u8) -> bool {
    icn == ObjectIcnType::Objnarti && image_index > 0x10 && image_index % 2 == 1
}

pub fn is_resource_sprite(icn: ObjectIcnType, image_index: u8) -> bool {
    icn == ObjectIcnType::Objnrsrc && image_index % 2 == 1
}

/// Real type of an expansion placeholder recovered from its sprite, or
/// `MapObjectType::NONE` when the sprite is not part of any expansion object.
pub fn loyalty_object(icn: ObjectIcnType, image_index: u8) -> MapObjectType {
    use ObjectKind::*;

    let (kind, action) = match (icn, image_index) {
        (ObjectIcnType::XLoc1, 3) => (AlchemistTower, true),
        (ObjectIcnType::XLoc1, 0..=2) => (AlchemistTower, false),
        (ObjectIcnType::XLoc1, 70) => (Arena, true),
        (ObjectIcnType::XLoc1, 4..=71) => (Arena, false),
        (ObjectIcnType::XLoc1, 77) => (BarrowMounds, true),
        (ObjectIcnType::XLoc1, 72..=77) => (BarrowMounds, false),
        (ObjectIcnType::XLoc1, 94) => (EarthAltar, true),
        (ObjectIcnType::XLoc1, 78..=111) => (EarthAltar, false),
        (ObjectIcnType::XLoc1, 118) => (AirAltar, true),
        (ObjectIcnType::XLoc1, 112..=119) => (AirAltar, false),
        (ObjectIcnType::XLoc1, 127) => (FireAltar, true),
        (ObjectIcnType::XLoc1, 120..=128) => (FireAltar, false),
        (ObjectIcnType::XLoc1, 135) => (WaterAltar, true),
        (ObjectIcnType::XLoc1, 129..=136) => (WaterAltar, false),

        (ObjectIcnType::XLoc2, 4) => (Stables, true),
        (ObjectIcnType::XLoc2, 0..=3) => (Stables, false),
        (ObjectIcnType::XLoc2, 9) => (Jail, true),
        (ObjectIcnType::XLoc2, 5..=9) => (Jail, false),
        (ObjectIcnType::XLoc2, 37) => (Mermaid, true),
        (ObjectIcnType::XLoc2, 10..=46) => (Mermaid, false),
        (ObjectIcnType::XLoc2, 101) => (Sirens, true),
        (ObjectIcnType::XLoc2, 47..=110) => (Sirens, false),
        (ObjectIcnType::XLoc2, 111..=135) => (Reefs, false),

        (ObjectIcnType::XLoc3, 30) => (HutOfMagi, true),
        (ObjectIcnType::XLoc3, 0..=31) => (HutOfMagi, false),
        (ObjectIcnType::XLoc3, 50) => (EyeOfMagi, true),
        (ObjectIcnType::XLoc3, 32..=58) => (EyeOfMagi, false),

        _ => return MapObjectType::NONE,
    };

    if action {
        MapObjectType::action(kind)
    } else {
        MapObjectType::non_action(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TABLES: &[&[u8]] = &[
        MOUNTAINS1_SHADOWS,
        MOUNTAINS2_SHADOWS,
        TREE_SHADOWS,
        CRACKED_SHADOWS,
        DIRT_SHADOWS,
        DESERT_SHADOWS,
        GRASS2_SHADOWS,
        GRASS_SHADOWS,
        MULTI2_SHADOWS,
        MULTI_SHADOWS,
        SNOW_SHADOWS,
        SWAMP_SHADOWS,
        WATER2_SHADOWS,
        WATER_SHADOWS,
        XLOC1_SHADOWS,
        XLOC2_SHADOWS,
        XLOC3_SHADOWS,
        TOWN_SHADOWS,
        LAVA_SHADOWS,
        LAVA2_SHADOWS,
        LAVA3_SHADOWS,
        ROAD_IMAGES,
        TOWN_GATE_ROAD_IMAGES,
        TOWN_WALL_ROAD_IMAGES,
    ];

    #[test]
    fn tables_are_sorted_for_binary_search() {
        for table in ALL_TABLES {
            assert!(table.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", table);
        }
    }

    #[test]
    fn road_allow_list() {
        assert!(is_road_sprite(ObjectIcnType::Road, 0));
        assert!(is_road_sprite(ObjectIcnType::Road, 31));
        assert!(!is_road_sprite(ObjectIcnType::Road, 1));
        assert!(!is_road_sprite(ObjectIcnType::Road, 8));
        assert!(is_road_sprite(ObjectIcnType::Objntown, 189));
        assert!(!is_road_sprite(ObjectIcnType::Objntown, 190));
        assert!(is_road_sprite(ObjectIcnType::Objntwrd, 29));
        assert!(!is_road_sprite(ObjectIcnType::Objngras, 0));
    }

    #[test]
    fn missing_object_is_never_a_shadow() {
        assert!(!is_shadow_sprite(ObjectIcnType::Unknown, 0));
        assert!(is_shadow_sprite(ObjectIcnType::Objntwsh, 200));
        assert!(is_shadow_sprite(ObjectIcnType::Objnrsrc, 4));
        assert!(!is_shadow_sprite(ObjectIcnType::Objnrsrc, 5));
    }

    #[test]
    fn stream_and_reefs() {
        assert!(is_stream_sprite(ObjectIcnType::Stream, 200));
        assert!(is_stream_sprite(ObjectIcnType::Objnmul2, 13));
        assert!(!is_stream_sprite(ObjectIcnType::Objnmul2, 14));
        assert!(is_reefs_sprite(ObjectIcnType::XLoc2, 111));
        assert!(is_reefs_sprite(ObjectIcnType::XLoc2, 135));
        assert!(!is_reefs_sprite(ObjectIcnType::XLoc2, 136));
        assert!(!is_reefs_sprite(ObjectIcnType::XLoc1, 120));
    }

    #[test]
    fn loyalty_lookup() {
        assert_eq!(
            loyalty_object(ObjectIcnType::XLoc1, 3),
            MapObjectType::action(ObjectKind::AlchemistTower)
        );
        assert_eq!(
            loyalty_object(ObjectIcnType::XLoc1, 71),
            MapObjectType::non_action(ObjectKind::Arena)
        );
        assert_eq!(
            loyalty_object(ObjectIcnType::XLoc2, 120),
            MapObjectType::non_action(ObjectKind::Reefs)
        );
        assert_eq!(
            loyalty_object(ObjectIcnType::XLoc3, 50),
            MapObjectType::action(ObjectKind::EyeOfMagi)
        );
        assert_eq!(loyalty_object(ObjectIcnType::XLoc3, 59), MapObjectType::NONE);
        assert_eq!(loyalty_object(ObjectIcnType::XLoc1, 137), MapObjectType::NONE);
        assert_eq!(loyalty_object(ObjectIcnType::Objngras, 3), MapObjectType::NONE);
    }

    #[test]
    fn artifact_and_resource_frames() {
        assert!(is_artifact_sprite(ObjectIcnType::Objnarti, 0x11));
        assert!(!is_artifact_sprite(ObjectIcnType::Objnarti, 0x0F));
        assert!(!is_artifact_sprite(ObjectIcnType::Objnarti, 0x12));
        assert!(is_resource_sprite(ObjectIcnType::Objnrsrc, 7));
        assert!(!is_resource_sprite(ObjectIcnType::Objnrsrc, 6));
    }
}
