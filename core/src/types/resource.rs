//! Resource codes as stored in tile metadata.

pub const WOOD: u32 = 0x01;
pub const MERCURY: u32 = 0x02;
pub const ORE: u32 = 0x04;
pub const SULFUR: u32 = 0x08;
pub const CRYSTAL: u32 = 0x10;
pub const GEMS: u32 = 0x20;
pub const GOLD: u32 = 0x40;

pub const ALL: u32 = WOOD | MERCURY | ORE | SULFUR | CRYSTAL | GEMS | GOLD;

/// True when the code names exactly one known resource.
pub fn is_single_resource(code: u32) -> bool {
    code & !ALL == 0 && code.count_ones() == 1
}

/// Daily income of a mine producing `code`, or 0 for anything that is not a
/// single resource.
pub fn mine_income(code: u32) -> u32 {
    match code {
        WOOD | ORE => 2,
        MERCURY | SULFUR | CRYSTAL | GEMS => 1,
        GOLD => 1000,
        _ => 0,
    }
}

pub fn to_string(code: u32) -> &'static str {
    match code {
        WOOD => "Wood",
        MERCURY => "Mercury",
        ORE => "Ore",
        SULFUR => "Sulfur",
        CRYSTAL => "Crystal",
        GEMS => "Gems",
        GOLD => "Gold",
        _ => "Unknown",
    }
}
