//! The tile grid and the per-map state tiles need to answer questions
//! about themselves: the hero roster, alliances and castle entrances.

use std::collections::{BTreeMap, VecDeque};

use crate::constants::{
    AROUND_DIRECTIONS, Colors, Direction, FLAG_ALCHEMIST_LAB_OFFSET, FLAG_LIGHTHOUSE_OFFSET,
    FLAG_MAGIC_GARDEN_OFFSET, FLAG_MINE_OFFSET, FLAG_SAWMILL_OFFSET, FLAG_SECOND_PART_OFFSET,
    PlayerColor, REGION_NODE_BLOCKED,
};
use crate::error::TileStreamError;
use crate::tile::Tile;
use crate::types::object_type::{MapObjectType, ObjectKind};

/// A hero standing on the map. The tile only stores the hero id; the type
/// of the object the hero covers lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroPresence {
    pub index: i32,
    pub color: Colors,
    pub object_type_under: MapObjectType,
}

#[derive(Debug, Clone)]
pub struct TileMap {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) heroes: BTreeMap<u8, HeroPresence>,
    pub(crate) castle_entrances: BTreeMap<i32, Colors>,
    pub(crate) alliances: Vec<Colors>,
    pub(crate) next_object_uid: u32,
    // Bumped by every mutation that can change a path.
    pathfinder_epoch: u64,
}

impl TileMap {
    /// A map covered by one terrain image and nothing else.
    pub fn with_terrain(width: i32, height: i32, terrain_image_index: u16) -> Self {
        let width = width.max(0);
        let height = height.max(0);

        let tiles = (0..width * height)
            .map(|index| {
                let mut tile = Tile::new(index);
                tile.terrain_image_index = terrain_image_index;
                tile
            })
            .collect();

        TileMap {
            width,
            height,
            tiles,
            heroes: BTreeMap::new(),
            castle_entrances: BTreeMap::new(),
            alliances: Vec::new(),
            next_object_uid: 0,
            pathfinder_epoch: 0,
        }
    }

    /// Wraps an already built grid. Every tile must sit at the position
    /// its own index names.
    pub fn from_tiles(width: i32, height: i32, tiles: Vec<Tile>) -> Result<Self, TileStreamError> {
        let expected = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .map(|(w, h)| w * h);

        if width <= 0 || height <= 0 || expected != Some(tiles.len()) {
            return Err(TileStreamError::DimensionMismatch {
                width,
                height,
                tiles: tiles.len(),
            });
        }

        if let Some((position, tile)) = tiles
            .iter()
            .enumerate()
            .find(|(position, tile)| tile.index as i64 != *position as i64)
        {
            return Err(TileStreamError::TileIndexMismatch {
                position,
                index: tile.index,
            });
        }

        let next_object_uid = tiles
            .iter()
            .flat_map(|tile| {
                std::iter::once(tile.uid)
                    .chain(tile.bottom_fragments.iter().map(|fragment| fragment.uid))
                    .chain(tile.top_fragments.iter().map(|fragment| fragment.uid))
            })
            .max()
            .unwrap_or(0);

        Ok(TileMap {
            width,
            height,
            tiles,
            heroes: BTreeMap::new(),
            castle_entrances: BTreeMap::new(),
            alliances: Vec::new(),
            next_object_uid,
            pathfinder_epoch: 0,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: i32) -> Option<&Tile> {
        usize::try_from(index).ok().and_then(|position| self.tiles.get(position))
    }

    pub(crate) fn tile_mut(&mut self, index: i32) -> Option<&mut Tile> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.tiles.get_mut(position))
    }

    /// Runs `f` on the tile at `index`. Any change made through the closure
    /// invalidates cached paths.
    pub fn with_tile_mut<R>(&mut self, index: i32, f: impl FnOnce(&mut Tile) -> R) -> Option<R> {
        let result = self.tile_mut(index).map(f);
        if result.is_some() {
            self.invalidate_pathfinder();
        }
        result
    }

    // -------------------------------------------------------------------
    // Grid geometry
    // -------------------------------------------------------------------

    pub fn is_valid_index(&self, index: i32) -> bool {
        index >= 0 && (index as i64) < self.tiles.len() as i64
    }

    /// Index of the neighbor of `index` in a single `direction`, `None` at
    /// the map edge.
    pub fn direction_index(&self, index: i32, direction: Direction) -> Option<i32> {
        if !self.is_valid_index(index) {
            return None;
        }

        let (dx, dy) = direction.offset()?;
        let x = index % self.width + dx;
        let y = index / self.width + dy;

        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }

        Some(y * self.width + x)
    }

    pub fn is_valid_direction(&self, index: i32, direction: Direction) -> bool {
        self.direction_index(index, direction).is_some()
    }

    /// Valid neighbors of `index`, clockwise from the top.
    pub fn around_indexes(&self, index: i32) -> Vec<i32> {
        AROUND_DIRECTIONS
            .iter()
            .filter_map(|direction| self.direction_index(index, *direction))
            .collect()
    }

    // -------------------------------------------------------------------
    // Pathfinder invalidation and object ids
    // -------------------------------------------------------------------

    /// Changes whenever passability, fog or classification may have
    /// changed. Cached paths computed under another value are stale.
    pub fn pathfinder_epoch(&self) -> u64 {
        self.pathfinder_epoch
    }

    pub(crate) fn invalidate_pathfinder(&mut self) {
        self.pathfinder_epoch = self.pathfinder_epoch.wrapping_add(1);
    }

    pub fn new_object_uid(&mut self) -> u32 {
        self.next_object_uid += 1;
        self.next_object_uid
    }

    // -------------------------------------------------------------------
    // Classification and heroes
    // -------------------------------------------------------------------

    fn hero_of(&self, tile: &Tile) -> Option<&HeroPresence> {
        let id = tile.occupant_hero_id.checked_sub(1)?;
        self.heroes.get(&id)
    }

    /// Classification used by every rule: the type beneath a hero when one
    /// stands on the tile.
    pub(crate) fn classification(&self, tile: &Tile) -> MapObjectType {
        if tile.main_object_type != MapObjectType::HEROES {
            return tile.main_object_type;
        }

        match self.hero_of(tile) {
            Some(hero) => hero.object_type_under,
            None => {
                log::warn!("Tile {} is marked as hero tile but no hero stands there", tile.index);
                MapObjectType::NONE
            }
        }
    }

    /// With `ignore_object_under_hero` set a hero tile reports `Heroes`,
    /// otherwise the object the hero covers.
    pub fn object_type(&self, index: i32, ignore_object_under_hero: bool) -> MapObjectType {
        match self.tile(index) {
            Some(tile) if ignore_object_under_hero => tile.main_object_type,
            Some(tile) => self.classification(tile),
            None => MapObjectType::NONE,
        }
    }

    /// Sets the classification, or the type remembered beneath the hero
    /// standing on the tile.
    pub(crate) fn set_object_type_beneath_hero(&mut self, index: i32, object_type: MapObjectType) {
        let Some(tile) = self.tile(index) else {
            return;
        };

        let hero_id = tile
            .occupant_hero_id
            .checked_sub(1)
            .filter(|_| tile.main_object_type == MapObjectType::HEROES);

        match hero_id.and_then(|id| self.heroes.get_mut(&id)) {
            Some(hero) => hero.object_type_under = object_type,
            None => {
                if let Some(tile) = self.tile_mut(index) {
                    tile.main_object_type = object_type;
                }
            }
        }

        self.invalidate_pathfinder();
    }

    pub fn set_object_type(&mut self, index: i32, object_type: MapObjectType) {
        if let Some(tile) = self.tile_mut(index) {
            tile.main_object_type = object_type;
            self.invalidate_pathfinder();
        }
    }

    pub fn passability(&self, index: i32) -> Direction {
        self.tile(index).map_or(Direction::empty(), Tile::passability)
    }

    /// Id of the hero standing on the tile.
    pub fn hero_on_tile(&self, index: i32) -> Option<u8> {
        let tile = self.tile(index)?;
        if tile.main_object_type != MapObjectType::HEROES {
            return None;
        }

        let id = tile.occupant_hero_id.checked_sub(1)?;
        self.heroes.contains_key(&id).then_some(id)
    }

    pub fn hero(&self, id: u8) -> Option<&HeroPresence> {
        self.heroes.get(&id)
    }

    /// Puts hero `id` on the tile, moving it off any tile it stood on.
    pub fn place_hero(&mut self, index: i32, id: u8, color: Colors) {
        if !self.is_valid_index(index) {
            return;
        }

        if id == u8::MAX {
            invariant_failed!("Hero id {} cannot be stored on a tile", id);
            return;
        }

        if let Some(previous) = self.heroes.get(&id).map(|hero| hero.index) {
            if previous != index {
                self.remove_hero(previous);
            }
        }

        let object_type_under = self.object_type(index, false);
        self.heroes.insert(
            id,
            HeroPresence {
                index,
                color,
                object_type_under,
            },
        );

        if let Some(tile) = self.tile_mut(index) {
            tile.occupant_hero_id = id + 1;
            tile.main_object_type = MapObjectType::HEROES;
        }
        self.invalidate_pathfinder();
    }

    /// Takes the hero off the tile and restores the object beneath it.
    pub fn remove_hero(&mut self, index: i32) {
        match self.hero_on_tile(index) {
            Some(id) => {
                let object_type_under = self
                    .heroes
                    .remove(&id)
                    .map_or(MapObjectType::NONE, |hero| hero.object_type_under);

                if let Some(tile) = self.tile_mut(index) {
                    tile.main_object_type = object_type_under;
                }
            }
            None => self.set_tile_as_empty(index),
        }

        if let Some(tile) = self.tile_mut(index) {
            tile.occupant_hero_id = 0;
        }
        self.invalidate_pathfinder();
    }

    // -------------------------------------------------------------------
    // Diplomacy
    // -------------------------------------------------------------------

    /// Each entry is one group of allied colors.
    pub fn set_alliances(&mut self, alliances: Vec<Colors>) {
        self.alliances = alliances;
        self.invalidate_pathfinder();
    }

    pub fn are_friends(&self, first: Colors, second: Colors) -> bool {
        if first.is_empty() || second.is_empty() {
            return false;
        }

        first == second
            || self
                .alliances
                .iter()
                .any(|group| group.contains(first) && group.contains(second))
    }

    pub fn set_castle_entrance(&mut self, index: i32, color: Colors) {
        self.castle_entrances.insert(index, color);
        self.invalidate_pathfinder();
    }

    pub fn castle_entrance_color(&self, index: i32) -> Option<Colors> {
        self.castle_entrances.get(&index).copied()
    }

    // -------------------------------------------------------------------
    // Ownership flags and boats
    // -------------------------------------------------------------------

    /// Draws the flag of `color` on the object anchored at `index`. Where
    /// the flag goes depends on the object: most place it on a neighbor
    /// and large ones use two flag halves. An empty color removes it.
    pub fn set_ownership_flag(&mut self, index: i32, color: Colors) {
        let Some(tile) = self.tile(index) else {
            return;
        };

        let uid = tile.uid;
        let object_type = self.classification(tile);

        let color_index = if color.is_empty() {
            0
        } else {
            match PlayerColor::from_colors(color) {
                Some(player) => player as u8,
                None => {
                    invariant_failed!("Flag color must be a single player, got {}", color.describe());
                    return;
                }
            }
        };

        // (direction from `index`, sprite, on upper layer) per flag half.
        let placements: Vec<(Direction, u8, bool)> = match object_type.kind() {
            ObjectKind::MagicGarden => {
                let sprite = color_index + FLAG_MAGIC_GARDEN_OFFSET;
                vec![
                    (Direction::CENTER, sprite, false),
                    (Direction::RIGHT, sprite + FLAG_SECOND_PART_OFFSET, false),
                ]
            }
            ObjectKind::WaterWheel | ObjectKind::Mines => {
                let sprite = color_index + FLAG_MINE_OFFSET;
                vec![
                    (Direction::TOP, sprite, true),
                    (Direction::TOP_RIGHT, sprite + FLAG_SECOND_PART_OFFSET, true),
                ]
            }
            ObjectKind::Windmill | ObjectKind::Lighthouse => {
                let sprite = color_index + FLAG_LIGHTHOUSE_OFFSET;
                vec![
                    (Direction::LEFT, sprite, false),
                    (Direction::CENTER, sprite + FLAG_SECOND_PART_OFFSET, false),
                ]
            }
            ObjectKind::AlchemistLab => {
                vec![(Direction::TOP, color_index + FLAG_ALCHEMIST_LAB_OFFSET, true)]
            }
            ObjectKind::Sawmill => {
                vec![(Direction::TOP_RIGHT, color_index + FLAG_SAWMILL_OFFSET, true)]
            }
            ObjectKind::Castle => {
                let sprite = color_index * 2;
                vec![(Direction::LEFT, sprite, true), (Direction::RIGHT, sprite + 1, true)]
            }
            _ => return,
        };

        for (direction, sprite, on_upper_layer) in placements {
            let Some(target) = self.direction_index(index, direction) else {
                continue;
            };
            if let Some(tile) = self.tile_mut(target) {
                tile.update_flag(color, sprite, uid, on_upper_layer);
            }
        }
        self.invalidate_pathfinder();
    }

    pub fn remove_ownership_flag(&mut self, index: i32) {
        self.set_ownership_flag(index, Colors::empty());
    }

    /// Places a new boat of `color` facing `direction` and returns its id.
    pub fn set_boat(&mut self, index: i32, direction: Direction, color: Colors) -> Option<u32> {
        if !self.is_valid_index(index) {
            return None;
        }

        let uid = self.new_object_uid();
        if let Some(tile) = self.tile_mut(index) {
            tile.set_boat(direction, color, uid);
        }
        self.update_passability_around(index);
        Some(uid)
    }

    pub fn boat_direction(&self, index: i32) -> Option<Direction> {
        self.tile(index).and_then(Tile::boat_direction)
    }

    // -------------------------------------------------------------------
    // Fog, terrain and object removal
    // -------------------------------------------------------------------

    pub fn clear_fog(&mut self, index: i32, colors: Colors) {
        if let Some(tile) = self.tile_mut(index) {
            tile.clear_fog(colors);
            self.invalidate_pathfinder();
        }
    }

    /// Marks a tile as empty land, or as coast when water is next to it.
    pub fn set_tile_as_empty(&mut self, index: i32) {
        let Some(tile) = self.tile(index) else {
            return;
        };

        let object_type = if tile.is_water() {
            MapObjectType::NONE
        } else if self
            .around_indexes(index)
            .into_iter()
            .filter_map(|around| self.tile(around))
            .any(Tile::is_water)
        {
            MapObjectType::action(ObjectKind::Coast)
        } else {
            MapObjectType::NONE
        };

        self.set_object_type(index, object_type);
    }

    /// Re-evaluates the coast status of a tile that holds no object.
    pub fn update_empty(&mut self, index: i32) {
        if self.tile(index).is_some_and(|tile| tile.main_object_type.is_none()) {
            self.set_tile_as_empty(index);
        }
    }

    pub fn set_terrain(&mut self, index: i32, terrain_image_index: u16, horizontal_flip: bool, vertical_flip: bool) {
        let Some(tile) = self.tile_mut(index) else {
            return;
        };

        tile.set_terrain(terrain_image_index, horizontal_flip, vertical_flip);
        self.update_passability_around(index);
    }

    /// Deletes every fragment of the object `uid` from the whole map and
    /// refreshes passability where it stood.
    pub fn remove_object(&mut self, uid: u32) {
        if uid == 0 {
            return;
        }

        let mut touched = Vec::new();
        for tile in &mut self.tiles {
            let owns = tile.uid == uid
                || tile
                    .bottom_fragments
                    .iter()
                    .chain(tile.top_fragments.iter())
                    .any(|fragment| fragment.uid == uid);

            if owns {
                tile.remove_by_owner(uid);
                touched.push(tile.index);
            }
        }

        for index in touched {
            self.update_passability_around(index);
        }
        self.invalidate_pathfinder();
    }

    // -------------------------------------------------------------------
    // Movement queries
    // -------------------------------------------------------------------

    /// Whether a hero of `hero_color` coming from `direction` may enter the
    /// tile. `from_water` says whether the mover is at sea.
    pub fn is_passable_from(
        &self,
        index: i32,
        direction: Direction,
        from_water: bool,
        skip_fog: bool,
        hero_color: Colors,
    ) -> bool {
        let Some(tile) = self.tile(index) else {
            return false;
        };

        if !skip_fog && tile.is_fog(hero_color) {
            return false;
        }

        let main_object_type = tile.main_object_type;
        let is_water = tile.is_water();

        // From a boat only the coast or open water is reachable.
        if from_water
            && main_object_type != MapObjectType::action(ObjectKind::Coast)
            && (!is_water || main_object_type == MapObjectType::BOAT)
        {
            return false;
        }

        if !from_water
            && is_water
            && main_object_type != MapObjectType::action(ObjectKind::Shipwreck)
            && main_object_type != MapObjectType::HEROES
            && main_object_type != MapObjectType::BOAT
        {
            return false;
        }

        if main_object_type == MapObjectType::HEROES {
            if let Some(hero) = self.hero_of(tile) {
                if hero.color != hero_color && self.are_friends(hero.color, hero_color) {
                    return false;
                }
            }
        }

        if main_object_type == MapObjectType::action(ObjectKind::Castle) {
            if let Some(castle_color) = self.castle_entrance_color(index) {
                if castle_color != hero_color && self.are_friends(castle_color, hero_color) {
                    return false;
                }
            }
        }

        direction.intersects(tile.passability)
    }

    /// A land tile reachable from its center that shows nothing but
    /// shadows, so a buried artifact could be dug up there.
    pub fn good_for_ultimate_artifact(&self, index: i32) -> bool {
        let Some(tile) = self.tile(index) else {
            return false;
        };

        if tile.is_water() || !self.is_passable_from(index, Direction::CENTER, false, true, Colors::empty()) {
            return false;
        }

        (tile.icn_type.is_unknown() || crate::sprites::is_shadow_sprite(tile.icn_type, tile.image_index))
            && tile.bottom_fragments.iter().all(|fragment| fragment.is_shadow())
            && tile.top_fragments.iter().all(|fragment| fragment.is_shadow())
    }

    // -------------------------------------------------------------------
    // Regions
    // -------------------------------------------------------------------

    /// Splits the map into connected areas. Two tiles share a region when a
    /// chain of orthogonal steps over passable tiles of the same kind (land
    /// or water) joins them. Region ids start at 1.
    pub fn assign_regions(&mut self) {
        let mut regions = vec![REGION_NODE_BLOCKED; self.tiles.len()];
        let mut next_region = REGION_NODE_BLOCKED + 1;
        let mut queue = VecDeque::new();

        for start in 0..self.tiles.len() {
            if regions[start] != REGION_NODE_BLOCKED || self.tiles[start].passability.is_empty() {
                continue;
            }

            let is_water = self.tiles[start].is_water();
            regions[start] = next_region;
            queue.push_back(start as i32);

            while let Some(current) = queue.pop_front() {
                for direction in [Direction::TOP, Direction::RIGHT, Direction::BOTTOM, Direction::LEFT] {
                    let Some(neighbor) = self.direction_index(current, direction) else {
                        continue;
                    };
                    let position = neighbor as usize;
                    let tile = &self.tiles[position];

                    if regions[position] == REGION_NODE_BLOCKED
                        && !tile.passability.is_empty()
                        && tile.is_water() == is_water
                    {
                        regions[position] = next_region;
                        queue.push_back(neighbor);
                    }
                }
            }

            next_region += 1;
        }

        for (tile, region) in self.tiles.iter_mut().zip(regions) {
            tile.update_region(region);
        }
        log::debug!("Assigned {} regions", next_region - 1);
    }

    // -------------------------------------------------------------------
    // Loading and diagnostics
    // -------------------------------------------------------------------

    /// Reconciles a freshly built grid: object fixup, pickups, metadata
    /// cleanup, both passability phases and regions.
    pub(crate) fn finalize_load(&mut self) {
        for position in 0..self.tiles.len() {
            let index = position as i32;
            self.fix_tile_object_type(index);

            let Some(tile) = self.tile(index) else {
                continue;
            };
            let object_type = self.classification(tile);

            if let Some(tile) = self.tile_mut(index) {
                if object_type.is_none() {
                    tile.fix_object();
                }

                if !tile.main_object_type.contains_metadata() && tile.metadata != [0; 3] {
                    log::debug!(
                        "Tile {}: clearing metadata of {}",
                        index,
                        tile.main_object_type.to_string()
                    );
                    tile.metadata = [0; 3];
                }
            }
        }

        self.compute_passability();
        self.assign_regions();
    }

    /// Human readable dump of a tile, including the hero standing on it.
    pub fn tile_info(&self, index: i32) -> Option<String> {
        let tile = self.tile(index)?;
        let mut info = tile.info_string(self.classification(tile), self.width);

        if let Some(hero) = self.hero_of(tile) {
            info.push_str(&format!(
                "hero            : {} ({})\n",
                tile.occupant_hero_id - 1,
                hero.color.describe()
            ));
        }
        if let Some(color) = self.castle_entrance_color(index) {
            info.push_str(&format!("castle entrance : {}\n", color.describe()));
        }

        Some(info)
    }
}
