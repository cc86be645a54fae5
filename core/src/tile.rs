//! The per-cell aggregate and its fragment stack.

use std::fmt::Write;

use crate::constants::{BOAT_SPRITE_MIRRORED, Colors, Direction, NO_IMAGE, REGION_NODE_BLOCKED};
use crate::sprites;
use crate::types::fragment::{ObjectLayer, TileFragment};
use crate::types::ground::{self, Ground};
use crate::types::icn::ObjectIcnType;
use crate::types::object_type::MapObjectType;

/// Which fragment list to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentList {
    Bottom,
    Top,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub(crate) index: i32,
    pub(crate) terrain_image_index: u16,
    /// bit 0 = vertical flip, bit 1 = horizontal flip
    pub(crate) terrain_flags: u8,
    pub(crate) main_object_type: MapObjectType,

    // Inline primary fragment.
    pub(crate) icn_type: ObjectIcnType,
    pub(crate) image_index: u8,
    pub(crate) uid: u32,
    pub(crate) layer: ObjectLayer,

    pub(crate) bottom_fragments: Vec<TileFragment>,
    pub(crate) top_fragments: Vec<TileFragment>,

    pub(crate) passability: Direction,
    pub(crate) region: u32,
    pub(crate) fog_colors: Colors,
    pub(crate) is_road: bool,
    /// hero id + 1, 0 when nobody stands here
    pub(crate) occupant_hero_id: u8,
    pub(crate) boat_owner_color: Colors,
    pub(crate) metadata: [u32; 3],
}

impl Tile {
    pub fn new(index: i32) -> Self {
        Tile {
            index,
            terrain_image_index: 0,
            terrain_flags: 0,
            main_object_type: MapObjectType::NONE,
            icn_type: ObjectIcnType::Unknown,
            image_index: NO_IMAGE,
            uid: 0,
            layer: ObjectLayer::Object,
            bottom_fragments: Vec::new(),
            top_fragments: Vec::new(),
            passability: Direction::ALL,
            region: REGION_NODE_BLOCKED,
            fog_colors: Colors::ALL,
            is_road: false,
            occupant_hero_id: 0,
            boat_owner_color: Colors::empty(),
            metadata: [0; 3],
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn terrain_image_index(&self) -> u16 {
        self.terrain_image_index
    }

    pub fn terrain_flags(&self) -> u8 {
        self.terrain_flags
    }

    pub fn ground(&self) -> Ground {
        Ground::from_image_index(self.terrain_image_index)
    }

    pub fn is_water(&self) -> bool {
        self.ground().is_water()
    }

    /// Classification stored on the tile. A hero standing here reports
    /// `Heroes`; use `TileMap::object_type` to look beneath the hero.
    pub fn main_object_type(&self) -> MapObjectType {
        self.main_object_type
    }

    pub fn set_main_object_type(&mut self, object_type: MapObjectType) {
        self.main_object_type = object_type;
    }

    pub fn primary(&self) -> TileFragment {
        TileFragment::new(self.layer, self.uid, self.icn_type, self.image_index)
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn icn_type(&self) -> ObjectIcnType {
        self.icn_type
    }

    pub fn image_index(&self) -> u8 {
        self.image_index
    }

    pub fn layer(&self) -> ObjectLayer {
        self.layer
    }

    pub fn bottom_fragments(&self) -> &[TileFragment] {
        &self.bottom_fragments
    }

    pub fn top_fragments(&self) -> &[TileFragment] {
        &self.top_fragments
    }

    pub fn passability(&self) -> Direction {
        self.passability
    }

    pub fn region(&self) -> u32 {
        self.region
    }

    pub fn fog_colors(&self) -> Colors {
        self.fog_colors
    }

    pub fn is_road(&self) -> bool {
        self.is_road
    }

    pub fn occupant_hero_id(&self) -> u8 {
        self.occupant_hero_id
    }

    pub fn boat_owner_color(&self) -> Colors {
        self.boat_owner_color
    }

    pub fn metadata(&self) -> &[u32; 3] {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut [u32; 3] {
        &mut self.metadata
    }

    // -------------------------------------------------------------------
    // Fragment stack
    // -------------------------------------------------------------------

    /// Appends to the bottom list. A road sprite marks the tile as road;
    /// the mark is never cleared here.
    pub fn push_bottom_fragment(&mut self, fragment: TileFragment) {
        if fragment.icn_type.is_unknown() {
            log::warn!("Tile {}: dropping a bottom fragment without visual group", self.index);
            return;
        }

        if fragment.is_road() {
            self.is_road = true;
        }

        self.bottom_fragments.push(fragment);
    }

    pub fn push_top_fragment(&mut self, fragment: TileFragment) {
        if fragment.icn_type.is_unknown() {
            log::warn!("Tile {}: dropping a top fragment without visual group", self.index);
            return;
        }

        self.top_fragments.push(fragment);
    }

    /// Re-establishes the inline primary as the highest priority entry of
    /// the bottom stack. The current primary joins the list at its end so
    /// it keeps precedence over earlier fragments of the same layer.
    pub fn sort_fragments(&mut self) {
        if self.bottom_fragments.is_empty() {
            return;
        }

        if !self.icn_type.is_unknown() {
            let primary = self.primary();
            self.bottom_fragments.push(primary);
        }

        // Stable: equal layers keep their insertion order.
        self.bottom_fragments.sort_by(|left, right| right.layer.cmp(&left.layer));

        if let Some(highest) = self.bottom_fragments.pop() {
            self.uid = highest.uid;
            self.icn_type = highest.icn_type;
            self.image_index = highest.image_index;
            self.layer = highest.layer;
        }
    }

    /// Deletes every fragment of a placed object.
    pub fn remove_by_owner(&mut self, uid: u32) {
        self.bottom_fragments.retain(|fragment| fragment.uid != uid);
        self.top_fragments.retain(|fragment| fragment.uid != uid);

        if self.uid == uid {
            self.reset_object_sprite();
            self.uid = 0;
        }

        self.update_road_flag();
    }

    /// Deletes every fragment drawn from one visual group.
    pub fn remove_objects_by_icn(&mut self, icn: ObjectIcnType) {
        self.bottom_fragments.retain(|fragment| fragment.icn_type != icn);
        self.top_fragments.retain(|fragment| fragment.icn_type != icn);

        if self.icn_type == icn {
            self.reset_object_sprite();
            self.uid = 0;
        }

        self.update_road_flag();
    }

    pub fn find_fragment_by_owner(&mut self, uid: u32, list: FragmentList) -> Option<&mut TileFragment> {
        let fragments = match list {
            FragmentList::Bottom => &mut self.bottom_fragments,
            FragmentList::Top => &mut self.top_fragments,
        };

        fragments.iter_mut().find(|fragment| fragment.uid == uid)
    }

    /// Swaps one sprite of a placed object for another. Only one fragment
    /// per tile can match, so the search stops at the first hit.
    pub fn replace_object(
        &mut self,
        uid: u32,
        original_icn: ObjectIcnType,
        new_icn: ObjectIcnType,
        original_image_index: u8,
        new_image_index: u8,
    ) {
        let matches = |fragment: &TileFragment| {
            fragment.uid == uid && fragment.icn_type == original_icn && fragment.image_index == original_image_index
        };

        if let Some(fragment) = self
            .bottom_fragments
            .iter_mut()
            .chain(self.top_fragments.iter_mut())
            .find(|fragment| matches(fragment))
        {
            fragment.icn_type = new_icn;
            fragment.image_index = new_image_index;
        } else if matches(&self.primary()) {
            self.icn_type = new_icn;
            self.image_index = new_image_index;
        }

        self.update_road_flag();
    }

    /// Shifts the image of a placed object's sprite, e.g. to open a
    /// visited chest.
    pub fn update_object_image_index(&mut self, uid: u32, icn: ObjectIcnType, offset: i32) {
        let shift = |image_index: u8| -> u8 {
            let shifted = image_index as i32 + offset;
            if !(0..NO_IMAGE as i32).contains(&shifted) {
                invariant_failed!("Image index {} shifted by {} leaves the sprite sheet", image_index, offset);
                return image_index;
            }
            shifted as u8
        };

        if let Some(fragment) = self
            .bottom_fragments
            .iter_mut()
            .chain(self.top_fragments.iter_mut())
            .find(|fragment| fragment.uid == uid && fragment.icn_type == icn)
        {
            fragment.image_index = shift(fragment.image_index);
        } else if self.uid == uid && self.icn_type == icn {
            self.image_index = shift(self.image_index);
        }

        self.update_road_flag();
    }

    /// Sets a new frame on the bottom fragment or primary owned by `uid`.
    pub fn update_fragment_image_index(&mut self, uid: u32, image_index: u8) {
        if let Some(fragment) = self.find_fragment_by_owner(uid, FragmentList::Bottom) {
            fragment.image_index = image_index;
        } else if self.uid == uid {
            self.image_index = image_index;
        }

        self.update_road_flag();
    }

    pub fn swap_with_fragment(&mut self, fragment: &mut TileFragment) {
        std::mem::swap(&mut fragment.icn_type, &mut self.icn_type);
        std::mem::swap(&mut fragment.image_index, &mut self.image_index);
        std::mem::swap(&mut fragment.uid, &mut self.uid);
        std::mem::swap(&mut fragment.layer, &mut self.layer);
    }

    pub(crate) fn reset_object_sprite(&mut self) {
        self.icn_type = ObjectIcnType::Unknown;
        self.image_index = NO_IMAGE;
    }

    pub(crate) fn update_road_flag(&mut self) {
        self.is_road = sprites::is_road_sprite(self.icn_type, self.image_index)
            || self.bottom_fragments.iter().any(TileFragment::is_road);
    }

    // -------------------------------------------------------------------
    // Fragment queries
    // -------------------------------------------------------------------

    /// Owner id of the first sprite from `icn`, primary first. 0 if absent.
    pub fn object_uid_by_icn(&self, icn: ObjectIcnType) -> u32 {
        if self.icn_type == icn {
            return self.uid;
        }

        self.bottom_fragments
            .iter()
            .chain(self.top_fragments.iter())
            .find(|fragment| fragment.icn_type == icn)
            .map_or(0, |fragment| fragment.uid)
    }

    pub fn valid_icn_types(&self) -> Vec<ObjectIcnType> {
        let mut icn_types = Vec::with_capacity(1 + self.bottom_fragments.len() + self.top_fragments.len());
        if !self.icn_type.is_unknown() {
            icn_types.push(self.icn_type);
        }

        icn_types.extend(
            self.bottom_fragments
                .iter()
                .chain(self.top_fragments.iter())
                .map(|fragment| fragment.icn_type),
        );
        icn_types
    }

    pub fn contains_any_icn(&self, icn_types: &[ObjectIcnType]) -> bool {
        icn_types.iter().any(|icn| {
            self.icn_type == *icn
                || self
                    .bottom_fragments
                    .iter()
                    .chain(self.top_fragments.iter())
                    .any(|fragment| fragment.icn_type == *icn)
        })
    }

    pub fn contains_sprite(&self, icn: ObjectIcnType, image_index: u8) -> bool {
        (self.icn_type == icn && self.image_index == image_index)
            || self
                .bottom_fragments
                .iter()
                .chain(self.top_fragments.iter())
                .any(|fragment| fragment.icn_type == icn && fragment.image_index == image_index)
    }

    /// Whether `uid` owns a blocking piece of this tile's bottom stack.
    pub fn does_object_exist(&self, uid: u32) -> bool {
        self.primary().is_blocking_part_of(uid)
            || self
                .bottom_fragments
                .iter()
                .any(|fragment| fragment.is_blocking_part_of(uid))
    }

    /// The tile shows nothing but shadows.
    pub fn is_shadow(&self) -> bool {
        sprites::is_shadow_sprite(self.icn_type, self.image_index)
            && self.bottom_fragments.iter().all(TileFragment::is_shadow)
    }

    pub fn is_stream(&self) -> bool {
        sprites::is_stream_sprite(self.icn_type, self.image_index)
            || self.bottom_fragments.iter().any(TileFragment::is_stream)
    }

    /// Whether the primary sprite carries an object that takes part in
    /// collisions.
    pub(crate) fn has_blocking_primary(&self) -> bool {
        self.primary().has_visual() && !self.layer.is_non_blocking() && !self.is_shadow()
    }

    // -------------------------------------------------------------------
    // Terrain, fog, regions
    // -------------------------------------------------------------------

    /// Replaces the terrain image. Roads and streams cannot survive on
    /// water, and a road tile never keeps an image with embedded objects.
    pub fn set_terrain(&mut self, terrain_image_index: u16, horizontal_flip: bool, vertical_flip: bool) {
        self.terrain_flags = u8::from(vertical_flip) | (u8::from(horizontal_flip) << 1);

        if self.is_road || self.is_stream() {
            let ground = Ground::from_image_index(terrain_image_index);
            if ground.is_water() {
                self.remove_objects_by_icn(ObjectIcnType::Road);
                self.remove_stream();
            } else if ground::terrain_has_embedded_objects(terrain_image_index) {
                self.terrain_image_index = ground.random_clean_image_index();
                return;
            }
        }

        self.terrain_image_index = terrain_image_index;
    }

    fn remove_stream(&mut self) {
        self.bottom_fragments.retain(|fragment| !fragment.is_stream());
        if sprites::is_stream_sprite(self.icn_type, self.image_index) {
            self.reset_object_sprite();
            self.uid = 0;
        }
    }

    /// True while every color in `colors` still has this tile fogged.
    pub fn is_fog(&self, colors: Colors) -> bool {
        self.fog_colors & colors == colors
    }

    pub(crate) fn clear_fog(&mut self, colors: Colors) {
        self.fog_colors.remove(colors);
    }

    pub fn update_region(&mut self, region: u32) {
        self.region = if self.passability.is_empty() {
            REGION_NODE_BLOCKED
        } else {
            region
        };
    }

    // -------------------------------------------------------------------
    // Boats and flags
    // -------------------------------------------------------------------

    /// Puts a boat facing `direction` on the tile. Whatever was drawn here
    /// moves to the bottom stack.
    pub(crate) fn set_boat(&mut self, direction: Direction, color: Colors, uid: u32) {
        if !self.icn_type.is_unknown() {
            let previous = TileFragment::new(ObjectLayer::Object, self.uid, self.icn_type, self.image_index);
            self.push_bottom_fragment(previous);
        }

        self.main_object_type = MapObjectType::BOAT;
        self.icn_type = ObjectIcnType::Boat32;
        self.image_index = match direction {
            Direction::TOP => 0,
            Direction::TOP_RIGHT => 9,
            Direction::RIGHT => 18,
            Direction::BOTTOM_RIGHT => 27,
            Direction::BOTTOM => 36,
            Direction::BOTTOM_LEFT => 27 + BOAT_SPRITE_MIRRORED,
            Direction::LEFT => 18 + BOAT_SPRITE_MIRRORED,
            Direction::TOP_LEFT => 9 + BOAT_SPRITE_MIRRORED,
            _ => 18,
        };
        self.uid = uid;
        self.boat_owner_color = color;
    }

    /// Facing of the boat drawn on this tile, if any.
    pub fn boat_direction(&self) -> Option<Direction> {
        if self.icn_type != ObjectIcnType::Boat32 {
            return None;
        }

        match self.image_index {
            0 => Some(Direction::TOP),
            9 => Some(Direction::TOP_RIGHT),
            18 => Some(Direction::RIGHT),
            27 => Some(Direction::BOTTOM_RIGHT),
            36 => Some(Direction::BOTTOM),
            index if index == 27 + BOAT_SPRITE_MIRRORED => Some(Direction::BOTTOM_LEFT),
            index if index == 18 + BOAT_SPRITE_MIRRORED => Some(Direction::LEFT),
            index if index == 9 + BOAT_SPRITE_MIRRORED => Some(Direction::TOP_LEFT),
            _ => None,
        }
    }

    /// Installs, recolors or (for an empty color) removes the flag sprite
    /// attached to the object `uid`.
    pub(crate) fn update_flag(&mut self, color: Colors, sprite_index: u8, uid: u32, on_upper_layer: bool) {
        let is_flag = |fragment: &TileFragment| fragment.uid == uid && fragment.icn_type == ObjectIcnType::Flag32;

        if color.is_empty() {
            self.bottom_fragments.retain(|fragment| !is_flag(fragment));
            self.top_fragments.retain(|fragment| !is_flag(fragment));
            return;
        }

        if let Some(flag) = self
            .bottom_fragments
            .iter_mut()
            .chain(self.top_fragments.iter_mut())
            .find(|fragment| is_flag(fragment))
        {
            flag.image_index = sprite_index;
            return;
        }

        let flag = TileFragment::new(ObjectLayer::Object, uid, ObjectIcnType::Flag32, sprite_index);
        if on_upper_layer {
            self.top_fragments.push(flag);
        } else {
            self.bottom_fragments.push(flag);
        }
    }

    // -------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------

    /// Multi-line dump of the tile state. `object_type` is the
    /// classification to report, usually the one beneath any hero.
    pub fn info_string(&self, object_type: MapObjectType, map_width: i32) -> String {
        let mut os = String::new();
        let (x, y) = if map_width > 0 {
            (self.index % map_width, self.index / map_width)
        } else {
            (self.index, 0)
        };

        // Writing into a String cannot fail.
        let _ = writeln!(os, "******* Tile info *******");
        let _ = writeln!(os, "Tile index      : {}, point: ({}, {})", self.index, x, y);
        let _ = writeln!(os, "UID             : {}", self.uid);
        let _ = writeln!(
            os,
            "MP2 object type : {} ({})",
            object_type.to_u8(),
            object_type.to_string()
        );
        let _ = writeln!(
            os,
            "ICN object type : {} ({})",
            self.icn_type as u8,
            self.icn_type.to_string()
        );
        let _ = writeln!(os, "image index     : {}", self.image_index);
        let _ = writeln!(os, "layer type      : {} - {}", self.layer as u8, self.layer.to_string());
        let _ = writeln!(os, "region          : {}", self.region);
        let _ = writeln!(
            os,
            "ground          : {} (isRoad: {})",
            self.ground().to_string(),
            self.is_road
        );
        let _ = writeln!(
            os,
            "ground img index: {}, image flags: {}",
            self.terrain_image_index, self.terrain_flags
        );
        let _ = writeln!(
            os,
            "shadow          : {}",
            sprites::is_shadow_sprite(self.icn_type, self.image_index)
        );
        let _ = writeln!(os, "passable from   : {}", self.passability.describe());
        let _ = writeln!(os, "fogged for      : {}", self.fog_colors.describe());
        for (slot, value) in self.metadata.iter().enumerate() {
            let _ = writeln!(os, "metadata value {}: {}", slot + 1, value);
        }

        if object_type == MapObjectType::BOAT {
            let _ = writeln!(os, "boat owner color: {}", self.boat_owner_color.describe());
        }

        for fragment in &self.bottom_fragments {
            os.push_str(&fragment.info_string(1));
        }
        for fragment in &self.top_fragments {
            os.push_str(&fragment.info_string(2));
        }

        os
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(layer: ObjectLayer, uid: u32, icn: ObjectIcnType, image: u8) -> TileFragment {
        TileFragment::new(layer, uid, icn, image)
    }

    fn layered_tile() -> Tile {
        let mut tile = Tile::new(0);
        tile.icn_type = ObjectIcnType::Objngras;
        tile.image_index = 3;
        tile.uid = 1;
        tile.layer = ObjectLayer::Object;

        tile.push_bottom_fragment(fragment(ObjectLayer::Terrain, 2, ObjectIcnType::Road, 0));
        tile.push_bottom_fragment(fragment(ObjectLayer::Object, 3, ObjectIcnType::Objngras, 5));
        tile.push_bottom_fragment(fragment(ObjectLayer::Shadow, 4, ObjectIcnType::Objngras, 4));
        tile.push_bottom_fragment(fragment(ObjectLayer::Background, 5, ObjectIcnType::Objngras, 7));
        tile
    }

    #[test]
    fn sort_orders_by_layer_and_pops_highest_priority() {
        let mut tile = layered_tile();
        tile.sort_fragments();

        let layers: Vec<ObjectLayer> = tile.bottom_fragments().iter().map(|f| f.layer).collect();
        assert_eq!(
            layers,
            vec![ObjectLayer::Terrain, ObjectLayer::Shadow, ObjectLayer::Background, ObjectLayer::Object]
        );
        assert_eq!(tile.layer(), ObjectLayer::Object);
        // The old primary keeps precedence over the earlier object fragment.
        assert_eq!(tile.uid(), 1);
        assert_eq!(tile.bottom_fragments()[3].uid, 3);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut once = layered_tile();
        once.sort_fragments();

        let mut twice = once.clone();
        twice.sort_fragments();

        assert_eq!(once, twice);
    }

    #[test]
    fn sort_promotes_fragment_when_primary_is_empty() {
        let mut tile = Tile::new(0);
        tile.push_bottom_fragment(fragment(ObjectLayer::Terrain, 2, ObjectIcnType::Road, 0));
        tile.push_bottom_fragment(fragment(ObjectLayer::Shadow, 3, ObjectIcnType::Trefir, 0));
        tile.sort_fragments();

        assert_eq!(tile.uid(), 3);
        assert_eq!(tile.layer(), ObjectLayer::Shadow);
        assert_eq!(tile.bottom_fragments().len(), 1);
    }

    #[test]
    fn sort_without_bottom_fragments_is_noop() {
        let mut tile = Tile::new(0);
        tile.icn_type = ObjectIcnType::Trefir;
        tile.image_index = 1;
        let before = tile.clone();
        tile.sort_fragments();
        assert_eq!(tile, before);
    }

    #[test]
    fn remove_by_owner_clears_primary_and_lists() {
        let mut tile = layered_tile();
        tile.push_top_fragment(fragment(ObjectLayer::Object, 1, ObjectIcnType::Objngras, 9));
        tile.remove_by_owner(1);

        assert_eq!(tile.icn_type(), ObjectIcnType::Unknown);
        assert_eq!(tile.image_index(), NO_IMAGE);
        assert_eq!(tile.uid(), 0);
        assert!(tile.top_fragments().is_empty());
        assert_eq!(tile.bottom_fragments().len(), 4);
    }

    #[test]
    fn removing_road_clears_road_flag() {
        let mut tile = layered_tile();
        assert!(tile.is_road());

        tile.remove_by_owner(2);
        assert!(!tile.is_road());
    }

    #[test]
    fn road_flag_requires_matching_sprite() {
        let mut tile = Tile::new(0);
        tile.push_bottom_fragment(fragment(ObjectLayer::Terrain, 2, ObjectIcnType::Road, 1));
        assert!(!tile.is_road());

        tile.update_fragment_image_index(2, 2);
        assert!(tile.is_road());
    }

    #[test]
    fn unknown_fragments_are_rejected() {
        let mut tile = Tile::new(0);
        tile.push_bottom_fragment(fragment(ObjectLayer::Object, 1, ObjectIcnType::Unknown, 0));
        tile.push_top_fragment(fragment(ObjectLayer::Object, 1, ObjectIcnType::Unknown, 0));
        assert!(tile.bottom_fragments().is_empty());
        assert!(tile.top_fragments().is_empty());
    }

    #[test]
    fn find_fragment_by_owner_returns_first_match() {
        let mut tile = layered_tile();
        assert!(tile.find_fragment_by_owner(42, FragmentList::Bottom).is_none());

        let found = tile.find_fragment_by_owner(3, FragmentList::Bottom).unwrap();
        found.image_index = 11;
        assert!(tile.contains_sprite(ObjectIcnType::Objngras, 11));
        assert!(tile.find_fragment_by_owner(3, FragmentList::Top).is_none());
    }

    #[test]
    fn replace_and_shift_sprites() {
        let mut tile = layered_tile();
        tile.replace_object(5, ObjectIcnType::Objngras, ObjectIcnType::Objndirt, 7, 8);
        assert!(tile.contains_sprite(ObjectIcnType::Objndirt, 8));

        tile.update_object_image_index(1, ObjectIcnType::Objngras, 2);
        assert_eq!(tile.image_index(), 5);
    }

    #[test]
    fn icn_queries() {
        let tile = layered_tile();
        assert_eq!(tile.object_uid_by_icn(ObjectIcnType::Road), 2);
        assert_eq!(tile.object_uid_by_icn(ObjectIcnType::Trefir), 0);
        assert_eq!(tile.valid_icn_types().len(), 5);
        assert!(tile.contains_any_icn(&[ObjectIcnType::Trefir, ObjectIcnType::Road]));
        assert!(!tile.contains_any_icn(&[ObjectIcnType::Trefir]));
    }

    #[test]
    fn object_existence_ignores_non_blocking_layers() {
        let tile = layered_tile();
        assert!(tile.does_object_exist(1));
        assert!(tile.does_object_exist(5));
        assert!(!tile.does_object_exist(4));
        assert!(!tile.does_object_exist(2));
    }

    #[test]
    fn boat_facing_round_trip() {
        let mut tile = Tile::new(0);
        for direction in crate::constants::AROUND_DIRECTIONS {
            tile.set_boat(direction, Colors::RED, 9);
            assert_eq!(tile.boat_direction(), Some(direction));
        }
        assert_eq!(tile.main_object_type(), MapObjectType::BOAT);
        assert_eq!(tile.boat_owner_color(), Colors::RED);
    }

    #[test]
    fn flags_are_replaced_then_removed() {
        let mut tile = Tile::new(0);
        tile.update_flag(Colors::BLUE, 21, 7, true);
        tile.update_flag(Colors::RED, 23, 7, true);
        assert_eq!(tile.top_fragments().len(), 1);
        assert_eq!(tile.top_fragments()[0].image_index, 23);

        tile.update_flag(Colors::empty(), 0, 7, true);
        assert!(tile.top_fragments().is_empty());
    }

    #[test]
    fn water_terrain_strips_roads() {
        let mut tile = Tile::new(0);
        tile.terrain_image_index = 40;
        tile.push_bottom_fragment(fragment(ObjectLayer::Terrain, 2, ObjectIcnType::Road, 0));
        tile.set_terrain(5, true, false);

        assert_eq!(tile.terrain_image_index(), 5);
        assert_eq!(tile.terrain_flags(), 2);
        assert!(!tile.is_road());
        assert!(tile.bottom_fragments().is_empty());
    }

    #[test]
    fn road_terrain_avoids_embedded_objects() {
        let mut tile = Tile::new(0);
        tile.push_bottom_fragment(fragment(ObjectLayer::Terrain, 2, ObjectIcnType::Road, 0));
        tile.set_terrain(80, false, true);

        assert_eq!(tile.ground(), Ground::Grass);
        assert!(!ground::terrain_has_embedded_objects(tile.terrain_image_index()));
        assert_eq!(tile.terrain_flags(), 1);
    }

    #[test]
    fn region_follows_passability() {
        let mut tile = Tile::new(0);
        tile.update_region(5);
        assert_eq!(tile.region(), 5);

        tile.passability = Direction::empty();
        tile.update_region(5);
        assert_eq!(tile.region(), REGION_NODE_BLOCKED);
    }

    #[test]
    fn fog_is_per_color() {
        let mut tile = Tile::new(0);
        assert!(tile.is_fog(Colors::RED));
        tile.clear_fog(Colors::RED);
        assert!(!tile.is_fog(Colors::RED));
        assert!(tile.is_fog(Colors::BLUE));
    }

    #[test]
    fn info_string_mentions_fragments() {
        let tile = layered_tile();
        let info = tile.info_string(MapObjectType::NONE, 4);
        assert!(info.contains("Tile index      : 0, point: (0, 0)"));
        assert!(info.contains("--------- Level 1 --------"));
        assert!(info.contains("ROAD.ICN"));
    }
}
