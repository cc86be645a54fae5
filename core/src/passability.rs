//! Two-pass computation of the directions a mover may use to enter a tile.
//!
//! Phase 1 looks at a tile in isolation. Phase 2 runs once every tile has
//! its phase 1 mask and refines it using the neighbors: objects spanning
//! two rows, land above water, short/detached/combined objects below and
//! tall objects on either side.

use crate::constants::Direction;
use crate::map::TileMap;
use crate::tile::Tile;
use crate::types::icn::ObjectIcnType;
use crate::types::object_type::{MapObjectType, ObjectKind};

/// Rows below and above the search origin, and columns on either side,
/// scanned when looking for the anchor tile of a multi-tile object.
const MAIN_TILE_SEARCH_RADIUS: i32 = 3;

impl Tile {
    /// Phase 1 mask. `object_type` is the classification beneath any hero
    /// standing on the tile.
    pub fn intrinsic_passability(&self, object_type: MapObjectType) -> Direction {
        if object_type.is_action() {
            return object_type.action_direction();
        }

        if self.icn_type == ObjectIcnType::Unknown || self.layer.is_non_blocking() || self.is_shadow() {
            return Direction::ALL;
        }

        if self.primary().is_reefs() || self.bottom_fragments.iter().any(|fragment| fragment.is_reefs()) {
            return Direction::empty();
        }

        Direction::CENTER_ROW | Direction::BOTTOM_ROW
    }

    /// Owner ids of the pieces of this tile that take part in collisions.
    pub(crate) fn blocking_uids(&self, include_top: bool) -> Vec<u32> {
        let mut uids = Vec::new();
        if self.primary().has_visual() && self.uid != 0 && !self.layer.is_non_blocking() {
            uids.push(self.uid);
        }

        let top = self.top_fragments.iter().filter(|_| include_top);
        uids.extend(
            self.bottom_fragments
                .iter()
                .chain(top)
                .filter(|fragment| fragment.uid != 0 && !fragment.layer.is_non_blocking())
                .map(|fragment| fragment.uid),
        );
        uids
    }

    /// No other object shares the tile: the bottom stack holds only shadows,
    /// roads and streams, and the top stack is empty.
    fn is_single_object_tile(&self, bottom_tile: &Tile) -> bool {
        let other_objects = self.bottom_fragments.iter().any(|fragment| {
            !fragment.is_shadow()
                && fragment.icn_type != ObjectIcnType::Road
                && fragment.icn_type != ObjectIcnType::Stream
        });

        !other_objects && self.top_fragments.is_empty() && bottom_tile.icn_type != self.icn_type
    }
}

impl TileMap {
    /// Runs phase 1 over the whole grid, then phase 2 over the whole grid.
    pub fn compute_passability(&mut self) {
        for position in 0..self.tiles.len() {
            let object_type = self.classification(&self.tiles[position]);
            let mask = self.tiles[position].intrinsic_passability(object_type);
            self.tiles[position].passability = mask;
        }

        let refined: Vec<Direction> = (0..self.tiles.len())
            .map(|position| self.refine_passability(position as i32))
            .collect();

        for (tile, mask) in self.tiles.iter_mut().zip(refined) {
            tile.passability = mask;
        }

        self.invalidate_pathfinder();
    }

    /// Recomputes both phases for a tile and its eight neighbors after the
    /// tile's content changed.
    pub fn update_passability_around(&mut self, index: i32) {
        let mut block = vec![index];
        block.extend(self.around_indexes(index));

        for &position in &block {
            if let Some(tile) = self.tile(position) {
                let mask = tile.intrinsic_passability(self.classification(tile));
                if let Some(tile) = self.tile_mut(position) {
                    tile.passability = mask;
                }
            }
        }

        for &position in &block {
            let mask = self.refine_passability(position);
            if let Some(tile) = self.tile_mut(position) {
                tile.passability = mask;
            }
        }

        self.invalidate_pathfinder();
    }

    /// Phase 2 mask of the tile at `index`, computed from its phase 1 mask.
    pub fn refine_passability(&self, index: i32) -> Direction {
        let Some(tile) = self.tile(index) else {
            return Direction::empty();
        };

        let mut mask = tile.passability;

        if !self.is_valid_direction(index, Direction::LEFT) {
            mask.remove(Direction::LEFT | Direction::TOP_LEFT | Direction::BOTTOM_LEFT);
        }
        if !self.is_valid_direction(index, Direction::RIGHT) {
            mask.remove(Direction::RIGHT | Direction::TOP_RIGHT | Direction::BOTTOM_RIGHT);
        }
        if !self.is_valid_direction(index, Direction::TOP) {
            mask.remove(Direction::TOP_ROW);
        }
        if !self.is_valid_direction(index, Direction::BOTTOM) {
            mask.remove(Direction::BOTTOM_ROW);
        }

        let object_type = self.classification(tile);
        if !object_type.is_action() && tile.has_blocking_primary() {
            match self.bottom_neighbor_rule(tile, object_type) {
                BottomRule::Keep => {}
                BottomRule::ClearBottom => mask.remove(Direction::BOTTOM),
                BottomRule::Block => return Direction::empty(),
            }
        }

        if mask.contains(Direction::TOP_LEFT) && self.blocks_from_above(index, Direction::LEFT) {
            mask.remove(Direction::TOP_LEFT);
        }

        if mask.contains(Direction::TOP_RIGHT) && self.blocks_from_above(index, Direction::RIGHT) {
            mask.remove(Direction::TOP_RIGHT);
        }

        mask
    }

    fn bottom_neighbor_rule(&self, tile: &Tile, object_type: MapObjectType) -> BottomRule {
        let Some(bottom_tile) = self
            .direction_index(tile.index, Direction::BOTTOM)
            .and_then(|bottom| self.tile(bottom))
        else {
            return BottomRule::Block;
        };

        // The same object continues one row down: the lower tile is the
        // real collision surface.
        if tile
            .blocking_uids(false)
            .into_iter()
            .any(|uid| bottom_tile.does_object_exist(uid))
        {
            return BottomRule::Block;
        }

        // A hero could never disembark here.
        if !tile.is_water() && bottom_tile.is_water() {
            return BottomRule::Block;
        }

        if tile.is_single_object_tile(bottom_tile)
            || self.is_detached_object(tile.index)
            || bottom_tile.layer.is_non_blocking()
            || !bottom_tile.primary().has_visual()
        {
            return BottomRule::Keep;
        }

        let bottom_type = self.classification(bottom_tile);
        let corrected_type = bottom_type.base_action_type();

        if bottom_type.is_action() {
            if bottom_type.action_direction().contains(Direction::TOP) {
                return BottomRule::Keep;
            }
            return if bottom_type.is_short() {
                BottomRule::ClearBottom
            } else {
                BottomRule::Block
            };
        }

        if !bottom_tile.main_object_type.is_none()
            && corrected_type != bottom_type
            && corrected_type.is_action()
            && corrected_type.is_short()
            && !bottom_tile.intrinsic_passability(bottom_type).contains(Direction::TOP)
        {
            return BottomRule::ClearBottom;
        }

        if bottom_type.is_short()
            || (!bottom_tile.contains_any_icn(&tile.valid_icn_types())
                && (object_type.is_combined() || bottom_type.is_combined()))
        {
            return BottomRule::ClearBottom;
        }

        BottomRule::Block
    }

    /// Whether the neighbor on `side` is a tall object that cannot be
    /// entered from the north.
    fn blocks_from_above(&self, index: i32, side: Direction) -> bool {
        let Some(neighbor) = self.direction_index(index, side) else {
            return false;
        };

        let Some(neighbor_tile) = self.tile(neighbor) else {
            return false;
        };

        self.is_tall_object(neighbor)
            && !neighbor_tile
                .intrinsic_passability(self.classification(neighbor_tile))
                .contains(Direction::TOP)
    }

    /// A tall object continues into the row above: the tile to the north
    /// holds a visible, non-shadow piece of one of its owners.
    pub fn is_tall_object(&self, index: i32) -> bool {
        let Some(tile) = self.tile(index) else {
            return false;
        };

        let Some(top_tile) = self
            .direction_index(index, Direction::TOP)
            .and_then(|top| self.tile(top))
        else {
            return false;
        };

        tile.blocking_uids(true).into_iter().any(|uid| {
            (top_tile.uid == uid && !top_tile.primary().is_shadow())
                || top_tile
                    .bottom_fragments
                    .iter()
                    .chain(top_tile.top_fragments.iter())
                    .any(|fragment| fragment.uid == uid && !fragment.is_shadow())
        })
    }

    /// Index of the anchor tile of the action object that the non-action
    /// tile at `index` belongs to. The anchor is searched bottom rows first
    /// within a fixed radius. Returns the tile itself when it already is an
    /// anchor and `None` for a broken object.
    pub fn index_of_main_tile(&self, index: i32) -> Option<i32> {
        let tile = self.tile(index)?;
        let object_type = self.classification(tile);
        let corrected_type = object_type.base_action_type();

        if corrected_type == object_type {
            return Some(index);
        }

        let mut uids = vec![tile.uid];
        uids.extend(
            tile.bottom_fragments
                .iter()
                .chain(tile.top_fragments.iter())
                .map(|fragment| fragment.uid),
        );

        for y in (-1..=MAIN_TILE_SEARCH_RADIUS).rev() {
            for x in -MAIN_TILE_SEARCH_RADIUS..=MAIN_TILE_SEARCH_RADIUS {
                let candidate = index + y * self.width + x;
                let Some(found) = self.tile(candidate) else {
                    continue;
                };

                if self.classification(found) != corrected_type {
                    continue;
                }

                if found.uid != 0 && uids.contains(&found.uid) {
                    return Some(candidate);
                }
            }
        }

        log::debug!(
            "Tile {} of type {} has no parent tile.",
            index,
            object_type.to_string()
        );
        None
    }

    /// Detached objects ignore whatever sits below them. Non-anchor tiles
    /// inherit the property from their anchor when they carry a blocking
    /// piece of it.
    pub fn is_detached_object(&self, index: i32) -> bool {
        let Some(tile) = self.tile(index) else {
            return false;
        };

        let object_type = self.classification(tile);
        if object_type.is_detached() {
            return true;
        }

        if !object_type.base_action_type().is_detached() {
            return false;
        }

        let Some(anchor_uid) = self
            .index_of_main_tile(index)
            .and_then(|main| self.tile(main))
            .map(Tile::uid)
        else {
            return false;
        };

        if tile.uid == anchor_uid {
            return !tile.layer.is_non_blocking();
        }

        tile.bottom_fragments
            .iter()
            .find(|fragment| fragment.uid == anchor_uid)
            .is_some_and(|fragment| !fragment.layer.is_non_blocking())
    }

    /// Opens or closes the north-west approach of a troll bridge.
    pub fn set_object_passable(&mut self, index: i32, pass: bool) {
        let Some(tile) = self.tile(index) else {
            return;
        };

        if self.classification(tile).kind() != ObjectKind::TrollBridge {
            return;
        }

        if let Some(tile) = self.tile_mut(index) {
            tile.passability.set(Direction::TOP_LEFT, pass);
        }
        self.invalidate_pathfinder();
    }
}

enum BottomRule {
    Keep,
    ClearBottom,
    Block,
}
