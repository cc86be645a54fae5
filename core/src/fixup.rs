//! Post-decode reconciliation of object classifications the raw format
//! cannot express precisely.

use crate::map::TileMap;
use crate::sprites;
use crate::tile::Tile;
use crate::types::icn::ObjectIcnType;
use crate::types::object_type::{MapObjectType, ObjectKind};

/// Desert sprite drawn left of an interactive skeleton.
const DESERT_SKELETON_LEFT_IMAGE: u8 = 83;

/// Random monster placeholder images and the tier each one stands for.
const MONSTER_PLACEHOLDERS: [(u8, ObjectKind); 5] = [
    (66, ObjectKind::RandomMonster),
    (67, ObjectKind::RandomMonsterWeak),
    (68, ObjectKind::RandomMonsterMedium),
    (69, ObjectKind::RandomMonsterStrong),
    (70, ObjectKind::RandomMonsterVeryStrong),
];

impl Tile {
    /// The classification this tile should have given what it shows, or
    /// `None` when `current` is already right. Rules are tried in order and
    /// the first one that applies wins.
    pub fn corrected_object_type(&self, current: MapObjectType) -> Option<MapObjectType> {
        if current == MapObjectType::action(ObjectKind::Skeleton)
            && self.icn_type == ObjectIcnType::Objndsrt
            && self.image_index == DESERT_SKELETON_LEFT_IMAGE
        {
            return Some(MapObjectType::non_action(ObjectKind::Skeleton));
        }

        // Legacy editors placed reefs as rocks.
        if current == MapObjectType::non_action(ObjectKind::Rock) && self.primary().is_reefs() {
            return Some(MapObjectType::non_action(ObjectKind::Reefs));
        }

        if current == MapObjectType::action(ObjectKind::Coast) && self.is_water() {
            return Some(MapObjectType::NONE);
        }

        // The placeholder sprite decides, not the stored type.
        if self.icn_type == ObjectIcnType::Mons32 {
            let placeholder = MONSTER_PLACEHOLDERS
                .iter()
                .find(|(image, _)| *image == self.image_index)
                .map(|(_, kind)| MapObjectType::action(*kind));

            if let Some(monster) = placeholder.filter(|monster| *monster != current) {
                log::warn!(
                    "Invalid object type index {}: type {}, object sprite index {}, corrected type {}",
                    self.index,
                    current.to_string(),
                    self.image_index,
                    monster.to_string()
                );
                return Some(monster);
            }
        }

        if matches!(current.kind(), ObjectKind::ExpansionDwelling | ObjectKind::ExpansionObject) {
            let resolved = std::iter::once(self.primary())
                .chain(self.bottom_fragments.iter().copied())
                .chain(self.top_fragments.iter().copied())
                .map(|fragment| sprites::loyalty_object(fragment.icn_type, fragment.image_index))
                .find(|object_type| !object_type.is_none());

            if resolved.is_none() {
                log::warn!(
                    "Invalid object type index {}: type {}, icn ID {}",
                    self.index,
                    current.to_string(),
                    self.image_index
                );
            }
            return resolved;
        }

        None
    }

    /// Gives an unclassified tile the type of a pickup lying on it.
    pub fn fix_object(&mut self) {
        if !self.main_object_type.is_none() {
            return;
        }

        if self
            .bottom_fragments
            .iter()
            .any(|fragment| sprites::is_artifact_sprite(fragment.icn_type, fragment.image_index))
        {
            self.main_object_type = MapObjectType::action(ObjectKind::Artifact);
        } else if self
            .bottom_fragments
            .iter()
            .any(|fragment| sprites::is_resource_sprite(fragment.icn_type, fragment.image_index))
        {
            self.main_object_type = MapObjectType::action(ObjectKind::Resource);
        }
    }
}

impl TileMap {
    /// Applies [`Tile::corrected_object_type`] to the tile at `index`. When a
    /// hero stands on the tile the type remembered beneath the hero is
    /// corrected instead.
    pub fn fix_tile_object_type(&mut self, index: i32) {
        let Some(tile) = self.tile(index) else {
            return;
        };

        let current = self.classification(tile);
        if let Some(corrected) = tile.corrected_object_type(current) {
            log::debug!(
                "Tile {}: {} reclassified as {}",
                index,
                current.to_string(),
                corrected.to_string()
            );
            self.set_object_type_beneath_hero(index, corrected);
        }
    }
}
