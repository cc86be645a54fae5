//! Constants shared by the tile core: direction and color masks, format
//! versions and the sentinels the engine relies on.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// =============================================================================
// Directions
// =============================================================================

bitflags! {
    /// Compass directions plus the tile center. Used both as a single
    /// direction and as a passability mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Direction: u16 {
        const TOP_LEFT = 1 << 0;
        const TOP = 1 << 1;
        const TOP_RIGHT = 1 << 2;
        const RIGHT = 1 << 3;
        const BOTTOM_RIGHT = 1 << 4;
        const BOTTOM = 1 << 5;
        const BOTTOM_LEFT = 1 << 6;
        const LEFT = 1 << 7;
        const CENTER = 1 << 8;

        const TOP_ROW = Self::TOP_LEFT.bits() | Self::TOP.bits() | Self::TOP_RIGHT.bits();
        const CENTER_ROW = Self::LEFT.bits() | Self::CENTER.bits() | Self::RIGHT.bits();
        const BOTTOM_ROW = Self::BOTTOM_LEFT.bits() | Self::BOTTOM.bits() | Self::BOTTOM_RIGHT.bits();
        const ALL = Self::TOP_ROW.bits() | Self::CENTER_ROW.bits() | Self::BOTTOM_ROW.bits();
    }
}

/// The eight compass directions in clockwise order starting at the top.
pub const AROUND_DIRECTIONS: [Direction; 8] = [
    Direction::TOP,
    Direction::TOP_RIGHT,
    Direction::RIGHT,
    Direction::BOTTOM_RIGHT,
    Direction::BOTTOM,
    Direction::BOTTOM_LEFT,
    Direction::LEFT,
    Direction::TOP_LEFT,
];

impl Direction {
    /// Human readable list of the set directions, e.g. `"top, center"`.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "nowhere".to_string();
        }

        self.iter_names()
            .filter(|(_, flag)| flag.bits().count_ones() == 1)
            .map(|(name, _)| name.to_ascii_lowercase().replace('_', " "))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Column and row offset of a single direction.
    pub fn offset(&self) -> Option<(i32, i32)> {
        match *self {
            Direction::TOP_LEFT => Some((-1, -1)),
            Direction::TOP => Some((0, -1)),
            Direction::TOP_RIGHT => Some((1, -1)),
            Direction::RIGHT => Some((1, 0)),
            Direction::BOTTOM_RIGHT => Some((1, 1)),
            Direction::BOTTOM => Some((0, 1)),
            Direction::BOTTOM_LEFT => Some((-1, 1)),
            Direction::LEFT => Some((-1, 0)),
            Direction::CENTER => Some((0, 0)),
            _ => None,
        }
    }
}

// =============================================================================
// Player colors
// =============================================================================

bitflags! {
    /// Player color mask. A single bit identifies one player.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Colors: u8 {
        const BLUE = 1 << 0;
        const GREEN = 1 << 1;
        const RED = 1 << 2;
        const YELLOW = 1 << 3;
        const ORANGE = 1 << 4;
        const PURPLE = 1 << 5;
        /// Neutral owner, used for gray flags.
        const UNUSED = 1 << 7;

        const ALL = Self::BLUE.bits()
            | Self::GREEN.bits()
            | Self::RED.bits()
            | Self::YELLOW.bits()
            | Self::ORANGE.bits()
            | Self::PURPLE.bits();
    }
}

impl Colors {
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }

        self.iter_names()
            .filter(|(name, _)| *name != "ALL")
            .map(|(name, _)| match name {
                "UNUSED" => "neutral".to_string(),
                other => other.to_ascii_lowercase(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One player color. The discriminant is the color's frame offset inside
/// the flag sprite sheet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlayerColor {
    Blue = 0,
    Green = 1,
    Red = 2,
    Yellow = 3,
    Orange = 4,
    Purple = 5,
    Neutral = 6,
}

impl PlayerColor {
    /// The player a single-bit color mask stands for.
    pub fn from_colors(colors: Colors) -> Option<Self> {
        match colors {
            c if c == Colors::BLUE => Some(PlayerColor::Blue),
            c if c == Colors::GREEN => Some(PlayerColor::Green),
            c if c == Colors::RED => Some(PlayerColor::Red),
            c if c == Colors::YELLOW => Some(PlayerColor::Yellow),
            c if c == Colors::ORANGE => Some(PlayerColor::Orange),
            c if c == Colors::PURPLE => Some(PlayerColor::Purple),
            c if c == Colors::UNUSED => Some(PlayerColor::Neutral),
            _ => None,
        }
    }

    pub fn to_colors(&self) -> Colors {
        match self {
            PlayerColor::Blue => Colors::BLUE,
            PlayerColor::Green => Colors::GREEN,
            PlayerColor::Red => Colors::RED,
            PlayerColor::Yellow => Colors::YELLOW,
            PlayerColor::Orange => Colors::ORANGE,
            PlayerColor::Purple => Colors::PURPLE,
            PlayerColor::Neutral => Colors::UNUSED,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            PlayerColor::Blue => "Blue",
            PlayerColor::Green => "Green",
            PlayerColor::Red => "Red",
            PlayerColor::Yellow => "Yellow",
            PlayerColor::Orange => "Orange",
            PlayerColor::Purple => "Purple",
            PlayerColor::Neutral => "Neutral",
        }
    }
}

// =============================================================================
// Tile values
// =============================================================================

/// Image index reserved to mean "no visual".
pub const NO_IMAGE: u8 = 255;

/// Region id assigned to every tile without any passable direction.
pub const REGION_NODE_BLOCKED: u32 = 0;

/// Terrain image indices occupy the low 14 bits of the raw terrain word.
pub const TERRAIN_IMAGE_MASK: u16 = 0x3FFF;

/// Current "unknown artifact" identifier.
pub const ARTIFACT_UNKNOWN: u32 = 0;

/// "Unknown artifact" identifier used by streams written before artifact
/// identifiers were shifted by one.
pub const LEGACY_ARTIFACT_UNKNOWN: u32 = 103;

// Flag sprites inside FLAG32. Each color is one frame apart.
pub const FLAG_MAGIC_GARDEN_OFFSET: u8 = 128 + 14;
pub const FLAG_MINE_OFFSET: u8 = 128 + 14;
pub const FLAG_LIGHTHOUSE_OFFSET: u8 = 128 + 42;
pub const FLAG_ALCHEMIST_LAB_OFFSET: u8 = 21;
pub const FLAG_SAWMILL_OFFSET: u8 = 28;
pub const FLAG_SECOND_PART_OFFSET: u8 = 7;

// Boat sprites inside BOAT32. Left facing frames are mirrored copies.
pub const BOAT_SPRITE_MIRRORED: u8 = 128;

// =============================================================================
// Save format versions
// =============================================================================

/// Oldest stream this build still reads. Every legacy branch below guards a
/// version strictly newer than this one.
pub const LAST_SUPPORTED_FORMAT_VERSION: u16 = 10004;

/// Object type codes were renumbered.
pub const FORMAT_VERSION_PRE1_1001_RELEASE: u16 = 10005;
/// Terrain image index and flags were split into two fields.
pub const FORMAT_VERSION_PRE2_1001_RELEASE: u16 = 10006;
/// Visual group codes are stored unshifted.
pub const FORMAT_VERSION_1001_RELEASE: u16 = 10007;
/// Boat owner color was added.
pub const FORMAT_VERSION_1002_RELEASE: u16 = 10008;
/// Abandoned mines store a packed monster count.
pub const FORMAT_VERSION_1003_RELEASE: u16 = 10009;
/// Legacy quantity fields were replaced by the metadata array.
pub const FORMAT_VERSION_1004_RELEASE: u16 = 10010;
/// Artifact identifiers were shifted by one.
pub const FORMAT_VERSION_PRE1_1005_RELEASE: u16 = 10011;
/// Fragment layers lost their extra flag bits and two obsolete booleans
/// were dropped after the visual group.
pub const FORMAT_VERSION_PRE2_1009_RELEASE: u16 = 10021;

pub const CURRENT_FORMAT_VERSION: u16 = 10023;

const _: () = assert!(LAST_SUPPORTED_FORMAT_VERSION < FORMAT_VERSION_PRE1_1001_RELEASE);
const _: () = assert!(FORMAT_VERSION_PRE2_1009_RELEASE < CURRENT_FORMAT_VERSION);
