//! Reinterpretation of metadata written by older stream formats.
//!
//! Every function here is a pure transform guarded by the format version it
//! exists for. Callers assert that the data they feed in predates that
//! version; nothing in this module branches on whether a migration is due.

use crate::constants::{
    ARTIFACT_UNKNOWN, FORMAT_VERSION_1003_RELEASE, FORMAT_VERSION_1004_RELEASE,
    FORMAT_VERSION_PRE1_1001_RELEASE, FORMAT_VERSION_PRE1_1005_RELEASE,
    LAST_SUPPORTED_FORMAT_VERSION, LEGACY_ARTIFACT_UNKNOWN,
};
use crate::map::TileMap;
use crate::types::object_type::{MapObjectType, ObjectKind};
use crate::types::resource;

// Once the last supported version reaches a guard, the matching migration
// is dead and must be removed.
const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_PRE1_1001_RELEASE);
const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_1004_RELEASE);
const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_PRE1_1005_RELEASE);

/// The three quantity fields stored per tile before the metadata array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyQuantity {
    pub quantity1: u8,
    pub quantity2: u8,
    pub additional: u32,
}

/// Result of [`quantity_into_metadata`]. Broken mines lose their type, so
/// the classification may change along with the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigratedMetadata {
    pub metadata: [u32; 3],
    pub object_type: MapObjectType,
}

/// Maps object type codes renumbered since the old format to their current
/// codes. Unaffected codes pass through.
pub fn convert_old_main_object_type(code: u8) -> u8 {
    use ObjectKind::*;

    let converted = match code {
        128 => MapObjectType::action(SeaChest),
        235 => MapObjectType::non_action(Stables),
        241 => MapObjectType::action(Stables),
        234 => MapObjectType::non_action(AlchemistTower),
        240 => MapObjectType::action(AlchemistTower),
        118 => MapObjectType::non_action(HutOfMagi),
        238 => MapObjectType::action(HutOfMagi),
        119 => MapObjectType::non_action(EyeOfMagi),
        239 => MapObjectType::action(EyeOfMagi),
        233 => MapObjectType::non_action(Reefs),
        65 => MapObjectType::non_action(PeasantHut),
        193 => MapObjectType::action(PeasantHut),
        117 => MapObjectType::non_action(Sirens),
        237 => MapObjectType::action(Sirens),
        116 => MapObjectType::non_action(Mermaid),
        236 => MapObjectType::action(Mermaid),
        _ => return code,
    };

    converted.to_u8()
}

/// Gold used to be stored divided by 100 to fit in a byte.
fn resource_amount(resource_code: u8, amount: u8) -> u32 {
    if u32::from(resource_code) == resource::GOLD {
        u32::from(amount) * 100
    } else {
        u32::from(amount)
    }
}

fn monster_count(legacy: &LegacyQuantity) -> u32 {
    (u32::from(legacy.quantity1) << 8) + u32::from(legacy.quantity2)
}

/// Gold paid out by a shipwreck for each capture condition. The old format
/// only stored the condition.
fn shipwreck_gold(condition: u32, artifact: u32) -> u32 {
    match condition {
        0 => {
            if artifact != LEGACY_ARTIFACT_UNKNOWN {
                log::warn!("Empty shipwreck holds artifact {}", artifact);
            }
            0
        }
        1 => 1000,
        2 => 2000,
        3 => 5000,
        4 => 2000,
        _ => {
            log::warn!("Shipwreck has invalid capture condition {}", condition);
            0
        }
    }
}

/// Packs the legacy quantity fields of a tile classified as `object_type`
/// into the current metadata slots. `version` is the stream's format
/// version, which must predate 1004.
pub fn quantity_into_metadata(object_type: MapObjectType, legacy: &LegacyQuantity, version: u16) -> MigratedMetadata {
    use ObjectKind::*;

    let mut metadata = [0u32; 3];
    let mut migrated_type = object_type;

    if !object_type.is_action() {
        return MigratedMetadata {
            metadata,
            object_type,
        };
    }

    let q1 = legacy.quantity1;
    let q2 = legacy.quantity2;

    match object_type.kind() {
        AlchemistLab | Mines | Sawmill => {
            metadata[0] = u32::from(q1);
            metadata[1] = resource_amount(q1, q2);

            if metadata[1] == 0 {
                // Broken mine from an old save.
                if resource::is_single_resource(metadata[0]) {
                    metadata[1] = resource::mine_income(metadata[0]);
                    log::debug!(
                        "Restored income {} of {} for a broken mine",
                        metadata[1],
                        resource::to_string(metadata[0])
                    );
                } else {
                    log::warn!("Mine with resource code {} is not a mine, removing it", metadata[0]);
                    migrated_type = MapObjectType::NONE;
                }
            }

            metadata[2] = legacy.additional;
        }

        // Mixed up with mines before 1003.
        AbandonedMine => {
            if version < FORMAT_VERSION_1003_RELEASE {
                metadata[0] = u32::from(q1);
                metadata[1] = u32::from(q2);
            } else {
                metadata[0] = monster_count(legacy);
            }
            metadata[2] = legacy.additional;
        }

        AirAltar | ArcherHouse | BarrowMounds | Cave | CityOfDead | DesertTent | DragonCity
        | DwarfCottage | EarthAltar | Excavation | FireAltar | GoblinHut | HalflingHole
        | PeasantHut | Ruins | TreeCity | TreeHouse | TrollBridge | WagonCamp | WatchTower
        | WaterAltar => {
            metadata[0] = monster_count(legacy);
        }

        GenieLamp => {
            metadata[0] = monster_count(legacy);
            if metadata[0] == 0 {
                log::warn!("Genie lamp without any genies");
            }
        }

        ShrineFirstCircle | ShrineSecondCircle | ShrineThirdCircle | Pyramid => {
            metadata[0] = u32::from(q1);
        }

        Monster => {
            metadata[0] = monster_count(legacy);
            metadata[2] = legacy.additional;
        }

        Resource | TreeOfKnowledge | MagicGarden | WaterWheel | LeanTo | DerelictShip | Windmill => {
            metadata[0] = u32::from(q1);
            metadata[1] = resource_amount(q1, q2);
        }

        Barrier | TravellerTent | WitchsHut | Skeleton | ShipwreckSurvivor => {
            metadata[0] = u32::from(q1);
        }

        Wagon => {
            if q2 > 0 {
                metadata[0] = ARTIFACT_UNKNOWN;
                metadata[1] = u32::from(q1);
                metadata[2] = resource_amount(q1, q2);
            } else {
                metadata[0] = u32::from(q1);
            }
        }

        Flotsam | Graveyard | SeaChest | TreasureChest => {
            metadata[0] = u32::from(q1);
            metadata[1] = u32::from(q2) * 100;
        }

        DaemonCave => {
            metadata[0] = u32::from(q1);
            metadata[1] = u32::from(q2 & 0x0F) * 100;
            metadata[2] = u32::from(q2 >> 4);
        }

        Campfire => {
            metadata[0] = u32::from(q1);
            metadata[1] = u32::from(q2);
        }

        Artifact => {
            metadata[0] = u32::from(q1);
            metadata[1] = u32::from(q2 & 0x0F);
            metadata[2] = u32::from(q2 >> 4);
        }

        Shipwreck => {
            metadata[0] = u32::from(q1);
            metadata[2] = u32::from(q2 >> 4);
            metadata[1] = shipwreck_gold(metadata[2], metadata[0]);
        }

        Cactus | Coast | Crater | DeadTree | Dune | Flowers | LavaPool | Mandrake | MossyRock
        | Mound | Mountains | NothingSpecial | Reefs | Rock | Shrub | Stump | TarPit | Trees
        | Volcano | WaterLake | AlchemistTower | Arena | ArtesianSpring | Boat | Buoy
        | EyeOfMagi | FaerieRing | Fort | Fountain | FreemansFoundry | Gazebo | HillFort
        | HutOfMagi | Idol | Lighthouse | MagellansMaps | MagicWell | MercenaryCamp | Mermaid
        | Oasis | Obelisk | ObservationTower | Oracle | Sirens | Stables | StandingStones
        | StoneLiths | Temple | TradingPost | WateringHole | Whirlpool | WitchDoctorsHut
        | Xanadu => {}

        // Stored by other subsystems.
        Bottle | Castle | Event | Heroes | Jail | Sign | Sphinx => {
            debug_assert!(object_type.needs_extended_metadata());
        }

        None | ExpansionDwelling | ExpansionObject | RandomArtifact | RandomArtifactMajor
        | RandomArtifactMinor | RandomArtifactTreasure | RandomCastle | RandomMonster
        | RandomMonsterMedium | RandomMonsterStrong | RandomMonsterVeryStrong
        | RandomMonsterWeak | RandomResource | RandomTown | RandomUltimateArtifact => {
            invariant_failed!(
                "{} must not exist in a saved map",
                object_type.to_string()
            );
        }
    }

    MigratedMetadata {
        metadata,
        object_type: migrated_type,
    }
}

/// Shifts legacy artifact ids by one and maps the old "unknown artifact"
/// id onto the current one.
pub fn fix_old_artifact_ids(object_type: MapObjectType, metadata: &mut [u32; 3]) {
    use ObjectKind::*;

    if !object_type.is_action() {
        return;
    }

    match object_type.kind() {
        Artifact => {
            if metadata[0] >= LEGACY_ARTIFACT_UNKNOWN {
                invariant_failed!("Artifact tile holds legacy id {}", metadata[0]);
            }
            metadata[0] += 1;
        }
        DaemonCave | Graveyard | SeaChest | Shipwreck | ShipwreckSurvivor | Skeleton
        | TreasureChest | Wagon => {
            if metadata[0] == LEGACY_ARTIFACT_UNKNOWN {
                metadata[0] = ARTIFACT_UNKNOWN;
            } else {
                metadata[0] += 1;
            }
        }
        _ => {}
    }
}

impl TileMap {
    /// Applies the deferred legacy quantities and the artifact id shift to
    /// a freshly read map. Runs after the hero roster is known so tiles
    /// under heroes are migrated by the type beneath the hero.
    pub fn finish_legacy_load(&mut self, version: u16, quantities: &[(i32, LegacyQuantity)]) {
        if version < FORMAT_VERSION_1004_RELEASE {
            for (index, legacy) in quantities {
                self.apply_legacy_quantity(*index, legacy, version);
            }
        }

        if version < FORMAT_VERSION_PRE1_1005_RELEASE {
            for position in 0..self.tiles.len() {
                self.fix_old_artifact_ids_at(position as i32, version);
            }
        }
    }

    fn apply_legacy_quantity(&mut self, index: i32, legacy: &LegacyQuantity, version: u16) {
        debug_assert!(version < FORMAT_VERSION_1004_RELEASE);

        let Some(tile) = self.tile(index) else {
            return;
        };

        let object_type = self.classification(tile);
        let migrated = quantity_into_metadata(object_type, legacy, version);

        if migrated.object_type != object_type {
            self.set_object_type_beneath_hero(index, migrated.object_type);
        }
        if let Some(tile) = self.tile_mut(index) {
            tile.metadata = migrated.metadata;
        }
    }

    fn fix_old_artifact_ids_at(&mut self, index: i32, version: u16) {
        debug_assert!(version < FORMAT_VERSION_PRE1_1005_RELEASE);

        let Some(tile) = self.tile(index) else {
            return;
        };

        let object_type = self.classification(tile);
        if let Some(tile) = self.tile_mut(index) {
            fix_old_artifact_ids(object_type, &mut tile.metadata);
        }
    }
}
