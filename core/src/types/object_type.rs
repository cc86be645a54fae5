//! Semantic classification of whatever occupies a tile.
//!
//! A raw object type code is a 7-bit [`ObjectKind`] plus the action bit
//! (`0x80`). The action variant of a kind is the tile a hero interacts with;
//! the non-action variant covers the remaining tiles of the same object.

use serde::{Deserialize, Serialize};

use crate::constants::Direction;

const ACTION_BIT: u8 = 0x80;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObjectKind {
    None = 0,
    AlchemistLab = 1,
    Sign = 2,
    Buoy = 3,
    Skeleton = 4,
    DaemonCave = 5,
    TreasureChest = 6,
    FaerieRing = 7,
    Campfire = 8,
    Fountain = 9,
    Gazebo = 10,
    GenieLamp = 11,
    Graveyard = 12,
    ArcherHouse = 13,
    GoblinHut = 14,
    DwarfCottage = 15,
    PeasantHut = 16,
    Sirens = 17,
    Mermaid = 18,
    Event = 19,
    DragonCity = 20,
    Lighthouse = 21,
    WaterWheel = 22,
    Mines = 23,
    Monster = 24,
    Obelisk = 25,
    Oasis = 26,
    Resource = 27,
    Coast = 28,
    Sawmill = 29,
    Oracle = 30,
    ShrineFirstCircle = 31,
    Shipwreck = 32,
    SeaChest = 33,
    DesertTent = 34,
    Castle = 35,
    StoneLiths = 36,
    WagonCamp = 37,
    MagicWell = 38,
    Whirlpool = 39,
    Windmill = 40,
    Artifact = 41,
    Heroes = 42,
    Boat = 43,
    RandomUltimateArtifact = 44,
    RandomArtifact = 45,
    RandomResource = 46,
    RandomMonster = 47,
    RandomTown = 48,
    RandomCastle = 49,
    EyeOfMagi = 50,
    RandomMonsterWeak = 51,
    RandomMonsterMedium = 52,
    RandomMonsterStrong = 53,
    RandomMonsterVeryStrong = 54,
    HutOfMagi = 55,
    NothingSpecial = 56,
    MossyRock = 57,
    WatchTower = 58,
    TreeHouse = 59,
    TreeCity = 60,
    Ruins = 61,
    Fort = 62,
    TradingPost = 63,
    AbandonedMine = 64,
    TreeOfKnowledge = 65,
    WitchDoctorsHut = 66,
    Temple = 67,
    HillFort = 68,
    HalflingHole = 69,
    MercenaryCamp = 70,
    ShrineSecondCircle = 71,
    ShrineThirdCircle = 72,
    Pyramid = 73,
    CityOfDead = 74,
    Excavation = 75,
    Sphinx = 76,
    Wagon = 77,
    TarPit = 78,
    ArtesianSpring = 79,
    TrollBridge = 80,
    WateringHole = 81,
    WitchsHut = 82,
    Xanadu = 83,
    Cave = 84,
    LeanTo = 85,
    MagellansMaps = 86,
    Flotsam = 87,
    DerelictShip = 88,
    ShipwreckSurvivor = 89,
    Bottle = 90,
    MagicGarden = 91,
    ObservationTower = 92,
    FreemansFoundry = 93,
    Idol = 94,
    StandingStones = 95,
    Reefs = 96,
    Trees = 97,
    Mountains = 98,
    Volcano = 99,
    Flowers = 100,
    Rock = 101,
    WaterLake = 102,
    Mandrake = 103,
    DeadTree = 104,
    Stump = 105,
    Crater = 106,
    Cactus = 107,
    Mound = 108,
    Dune = 109,
    LavaPool = 110,
    Shrub = 111,
    Arena = 112,
    BarrowMounds = 113,
    RandomArtifactTreasure = 114,
    RandomArtifactMinor = 115,
    RandomArtifactMajor = 116,
    Barrier = 117,
    TravellerTent = 118,
    ExpansionDwelling = 119,
    ExpansionObject = 120,
    Jail = 121,
    FireAltar = 122,
    AirAltar = 123,
    EarthAltar = 124,
    WaterAltar = 125,
    Stables = 126,
    AlchemistTower = 127,
}

/// Every kind indexed by its code.
const KINDS: [ObjectKind; 128] = {
    use ObjectKind::*;
    [
        None, AlchemistLab, Sign, Buoy, Skeleton, DaemonCave, TreasureChest, FaerieRing,
        Campfire, Fountain, Gazebo, GenieLamp, Graveyard, ArcherHouse, GoblinHut, DwarfCottage,
        PeasantHut, Sirens, Mermaid, Event, DragonCity, Lighthouse, WaterWheel, Mines,
        Monster, Obelisk, Oasis, Resource, Coast, Sawmill, Oracle, ShrineFirstCircle,
        Shipwreck, SeaChest, DesertTent, Castle, StoneLiths, WagonCamp, MagicWell, Whirlpool,
        Windmill, Artifact, Heroes, Boat, RandomUltimateArtifact, RandomArtifact,
        RandomResource, RandomMonster, RandomTown, RandomCastle, EyeOfMagi, RandomMonsterWeak,
        RandomMonsterMedium, RandomMonsterStrong, RandomMonsterVeryStrong, HutOfMagi,
        NothingSpecial, MossyRock, WatchTower, TreeHouse, TreeCity, Ruins, Fort, TradingPost,
        AbandonedMine, TreeOfKnowledge, WitchDoctorsHut, Temple, HillFort, HalflingHole,
        MercenaryCamp, ShrineSecondCircle, ShrineThirdCircle, Pyramid, CityOfDead, Excavation,
        Sphinx, Wagon, TarPit, ArtesianSpring, TrollBridge, WateringHole, WitchsHut, Xanadu,
        Cave, LeanTo, MagellansMaps, Flotsam, DerelictShip, ShipwreckSurvivor, Bottle,
        MagicGarden, ObservationTower, FreemansFoundry, Idol, StandingStones, Reefs, Trees,
        Mountains, Volcano, Flowers, Rock, WaterLake, Mandrake, DeadTree, Stump, Crater,
        Cactus, Mound, Dune, LavaPool, Shrub, Arena, BarrowMounds, RandomArtifactTreasure,
        RandomArtifactMinor, RandomArtifactMajor, Barrier, TravellerTent, ExpansionDwelling,
        ExpansionObject, Jail, FireAltar, AirAltar, EarthAltar, WaterAltar, Stables,
        AlchemistTower,
    ]
};

impl ObjectKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        KINDS.get(value as usize).copied()
    }

    /// Natural scenery has no interactive tile of its own; its action code
    /// exists only for maps that mark scenery as visitable.
    pub fn is_natural(&self) -> bool {
        use ObjectKind::*;
        matches!(
            self,
            NothingSpecial
                | MossyRock
                | Coast
                | TarPit
                | Reefs
                | Trees
                | Mountains
                | Volcano
                | Flowers
                | Rock
                | WaterLake
                | Mandrake
                | DeadTree
                | Stump
                | Crater
                | Cactus
                | Mound
                | Dune
                | LavaPool
                | Shrub
        )
    }

    pub fn to_string(&self) -> &'static str {
        use ObjectKind::*;
        match self {
            None => "None",
            AlchemistLab => "Alchemist Lab",
            Sign => "Sign",
            Buoy => "Buoy",
            Skeleton => "Skeleton",
            DaemonCave => "Daemon Cave",
            TreasureChest => "Treasure Chest",
            FaerieRing => "Faerie Ring",
            Campfire => "Campfire",
            Fountain => "Fountain",
            Gazebo => "Gazebo",
            GenieLamp => "Genie Lamp",
            Graveyard => "Graveyard",
            ArcherHouse => "Archer's House",
            GoblinHut => "Goblin Hut",
            DwarfCottage => "Dwarf Cottage",
            PeasantHut => "Peasant Hut",
            Sirens => "Sirens",
            Mermaid => "Mermaid",
            Event => "Event",
            DragonCity => "Dragon City",
            Lighthouse => "Lighthouse",
            WaterWheel => "Water Wheel",
            Mines => "Mines",
            Monster => "Monster",
            Obelisk => "Obelisk",
            Oasis => "Oasis",
            Resource => "Resource",
            Coast => "Coast",
            Sawmill => "Sawmill",
            Oracle => "Oracle",
            ShrineFirstCircle => "Shrine of the First Circle",
            Shipwreck => "Shipwreck",
            SeaChest => "Sea Chest",
            DesertTent => "Desert Tent",
            Castle => "Castle",
            StoneLiths => "Stone Liths",
            WagonCamp => "Wagon Camp",
            MagicWell => "Magic Well",
            Whirlpool => "Whirlpool",
            Windmill => "Windmill",
            Artifact => "Artifact",
            Heroes => "Hero",
            Boat => "Boat",
            RandomUltimateArtifact => "Random Ultimate Artifact",
            RandomArtifact => "Random Artifact",
            RandomResource => "Random Resource",
            RandomMonster => "Random Monster",
            RandomTown => "Random Town",
            RandomCastle => "Random Castle",
            EyeOfMagi => "Eye of Magi",
            RandomMonsterWeak => "Random Monster - weak",
            RandomMonsterMedium => "Random Monster - medium",
            RandomMonsterStrong => "Random Monster - strong",
            RandomMonsterVeryStrong => "Random Monster - very strong",
            HutOfMagi => "Hut of Magi",
            NothingSpecial => "Nothing Special",
            MossyRock => "Mossy Rock",
            WatchTower => "Watch Tower",
            TreeHouse => "Tree House",
            TreeCity => "Tree City",
            Ruins => "Ruins",
            Fort => "Fort",
            TradingPost => "Trading Post",
            AbandonedMine => "Abandoned Mine",
            TreeOfKnowledge => "Tree of Knowledge",
            WitchDoctorsHut => "Witch Doctor's Hut",
            Temple => "Temple",
            HillFort => "Hill Fort",
            HalflingHole => "Halfling Hole",
            MercenaryCamp => "Mercenary Camp",
            ShrineSecondCircle => "Shrine of the Second Circle",
            ShrineThirdCircle => "Shrine of the Third Circle",
            Pyramid => "Pyramid",
            CityOfDead => "City of the Dead",
            Excavation => "Excavation",
            Sphinx => "Sphinx",
            Wagon => "Wagon",
            TarPit => "Tar Pit",
            ArtesianSpring => "Artesian Spring",
            TrollBridge => "Troll Bridge",
            WateringHole => "Watering Hole",
            WitchsHut => "Witch's Hut",
            Xanadu => "Xanadu",
            Cave => "Cave",
            LeanTo => "Lean-To",
            MagellansMaps => "Magellan's Maps",
            Flotsam => "Flotsam",
            DerelictShip => "Derelict Ship",
            ShipwreckSurvivor => "Shipwreck Survivor",
            Bottle => "Bottle",
            MagicGarden => "Magic Garden",
            ObservationTower => "Observation Tower",
            FreemansFoundry => "Freeman's Foundry",
            Idol => "Idol",
            StandingStones => "Standing Stones",
            Reefs => "Reefs",
            Trees => "Trees",
            Mountains => "Mountains",
            Volcano => "Volcano",
            Flowers => "Flowers",
            Rock => "Rock",
            WaterLake => "Water Lake",
            Mandrake => "Mandrake",
            DeadTree => "Dead Tree",
            Stump => "Stump",
            Crater => "Crater",
            Cactus => "Cactus",
            Mound => "Mound",
            Dune => "Dune",
            LavaPool => "Lava Pool",
            Shrub => "Shrub",
            Arena => "Arena",
            BarrowMounds => "Barrow Mounds",
            RandomArtifactTreasure => "Random Artifact - treasure",
            RandomArtifactMinor => "Random Artifact - minor",
            RandomArtifactMajor => "Random Artifact - major",
            Barrier => "Barrier",
            TravellerTent => "Traveller's Tent",
            ExpansionDwelling => "Expansion Dwelling",
            ExpansionObject => "Expansion Object",
            Jail => "Jail",
            FireAltar => "Fire Summoning Altar",
            AirAltar => "Air Summoning Altar",
            EarthAltar => "Earth Summoning Altar",
            WaterAltar => "Water Summoning Altar",
            Stables => "Stables",
            AlchemistTower => "Alchemist Tower",
        }
    }
}

/// Classification of a tile: an object kind and whether this is the tile
/// a hero interacts with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapObjectType {
    kind: ObjectKind,
    action: bool,
}

impl Default for MapObjectType {
    fn default() -> Self {
        Self::NONE
    }
}

impl MapObjectType {
    pub const NONE: Self = Self {
        kind: ObjectKind::None,
        action: false,
    };

    pub const HEROES: Self = Self::action(ObjectKind::Heroes);
    pub const BOAT: Self = Self::action(ObjectKind::Boat);

    /// The interactive variant of `kind`.
    pub const fn action(kind: ObjectKind) -> Self {
        Self { kind, action: true }
    }

    /// The non-interactive variant of `kind`; for natural scenery this is
    /// the plain type.
    pub const fn non_action(kind: ObjectKind) -> Self {
        Self {
            kind,
            action: false,
        }
    }

    /// Decodes a raw object type code. Returns `None` for the one code that
    /// carries no meaning (`0x80`).
    pub fn from_u8(value: u8) -> Option<Self> {
        let kind = ObjectKind::from_u8(value & !ACTION_BIT)?;
        let action = value & ACTION_BIT != 0;
        if action && kind == ObjectKind::None {
            return None;
        }

        Some(Self { kind, action })
    }

    pub fn to_u8(&self) -> u8 {
        let code = self.kind as u8;
        if self.action { code | ACTION_BIT } else { code }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn is_none(&self) -> bool {
        self.kind == ObjectKind::None
    }

    pub fn is_action(&self) -> bool {
        self.action
    }

    /// The action variant of a non-action building tile. Natural scenery,
    /// action types and `None` map to themselves.
    pub fn base_action_type(&self) -> Self {
        if self.action || self.kind == ObjectKind::None || self.kind.is_natural() {
            *self
        } else {
            Self::action(self.kind)
        }
    }

    /// Directions from which a hero may step onto an action tile.
    pub fn action_direction(&self) -> Direction {
        use ObjectKind::*;
        if !self.action {
            return Direction::ALL;
        }

        match self.kind {
            Artifact | Barrier | Boat | Bottle | Buoy | Campfire | Coast | Event | Flotsam
            | GenieLamp | Heroes | Monster | RandomArtifact | RandomArtifactMajor
            | RandomArtifactMinor | RandomArtifactTreasure | RandomMonster
            | RandomMonsterMedium | RandomMonsterStrong | RandomMonsterVeryStrong
            | RandomMonsterWeak | RandomResource | RandomUltimateArtifact | Resource
            | SeaChest | ShipwreckSurvivor | TreasureChest | Whirlpool => Direction::ALL,
            Castle => Direction::CENTER | Direction::BOTTOM,
            TrollBridge => Direction::CENTER | Direction::RIGHT | Direction::BOTTOM_ROW,
            _ => Direction::CENTER_ROW | Direction::BOTTOM_ROW,
        }
    }

    /// Objects that still allow lateral and diagonal moves around the tile
    /// below them since they have no sprites above their bottom row.
    pub fn is_short(&self) -> bool {
        use ObjectKind::*;
        match (self.kind, self.action) {
            (HalflingHole | MercenaryCamp | Ruins | StoneLiths | WagonCamp | FaerieRing, _) => true,
            (
                LeanTo | StandingStones | ShrineFirstCircle | ShrineSecondCircle
                | ShrineThirdCircle | MagicGarden | Sign | Idol | Wagon | GoblinHut | Barrier
                | MagicWell,
                true,
            ) => true,
            (WaterLake | TarPit | NothingSpecial, false) => true,
            _ => false,
        }
    }

    /// Objects that ignore whatever sits below them for collisions.
    pub fn is_detached(&self) -> bool {
        use ObjectKind::*;
        self.action
            && matches!(
                self.kind,
                Castle
                    | WagonCamp
                    | FaerieRing
                    | Mines
                    | Sawmill
                    | WaterAltar
                    | AirAltar
                    | FireAltar
                    | EarthAltar
            )
    }

    /// Objects that do not block a neighbor of the same family from below.
    pub fn is_combined(&self) -> bool {
        !self.action && matches!(self.kind, ObjectKind::Trees | ObjectKind::Crater)
    }

    /// Whether the three metadata slots mean anything for this type.
    pub fn contains_metadata(&self) -> bool {
        use ObjectKind::*;
        if !self.action {
            return false;
        }

        match self.kind {
            AbandonedMine | AirAltar | AlchemistLab | ArcherHouse | Artifact | BarrowMounds
            | Barrier | Campfire | Cave | CityOfDead | DaemonCave | DerelictShip | DesertTent
            | DragonCity | DwarfCottage | EarthAltar | Excavation | FireAltar | Flotsam
            | GenieLamp | GoblinHut | Graveyard | HalflingHole | LeanTo | MagicGarden | Mines
            | Monster | PeasantHut | Pyramid | Resource | Ruins | Sawmill | SeaChest
            | ShipwreckSurvivor | Shipwreck | ShrineFirstCircle | ShrineSecondCircle
            | ShrineThirdCircle | Skeleton | TravellerTent | TreasureChest | TreeCity
            | TreeHouse | TreeOfKnowledge | TrollBridge | Wagon | WagonCamp | WatchTower
            | WaterAltar | WaterWheel | Windmill | WitchsHut | ExpansionDwelling
            | ExpansionObject => true,
            RandomArtifact | RandomArtifactMajor | RandomArtifactMinor
            | RandomArtifactTreasure | RandomMonster | RandomMonsterMedium
            | RandomMonsterStrong | RandomMonsterVeryStrong | RandomMonsterWeak
            | RandomResource | RandomCastle | RandomTown | RandomUltimateArtifact => true,
            _ => false,
        }
    }

    /// Types whose extra data lives in a collaborator rather than in the
    /// tile metadata.
    pub fn needs_extended_metadata(&self) -> bool {
        use ObjectKind::*;
        self.action && matches!(self.kind, Bottle | Castle | Event | Heroes | Jail | Sign | Sphinx)
    }

    pub fn to_string(&self) -> String {
        match (self.action, self.kind.is_natural()) {
            (false, false) if self.kind != ObjectKind::None => {
                format!("Non-action {}", self.kind.to_string())
            }
            (true, true) => format!("Action {}", self.kind.to_string()),
            _ => self.kind.to_string().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_table_matches_discriminants() {
        for (code, kind) in KINDS.iter().enumerate() {
            assert_eq!(*kind as u8 as usize, code);
        }
        assert_eq!(ObjectKind::from_u8(128), None);
    }

    #[test]
    fn codes_round_trip_for_every_valid_value() {
        for code in 0..=u8::MAX {
            match MapObjectType::from_u8(code) {
                Some(object_type) => assert_eq!(object_type.to_u8(), code),
                None => assert_eq!(code, 0x80),
            }
        }
    }

    #[test]
    fn action_codes_have_high_bit() {
        let mines = MapObjectType::action(ObjectKind::Mines);
        assert_eq!(mines.to_u8(), 23 | 0x80);
        assert!(mines.is_action());
        assert!(!MapObjectType::non_action(ObjectKind::Mines).is_action());
    }

    #[test]
    fn base_action_type_promotes_buildings_only() {
        let hut = MapObjectType::non_action(ObjectKind::PeasantHut);
        assert_eq!(hut.base_action_type(), MapObjectType::action(ObjectKind::PeasantHut));

        let trees = MapObjectType::non_action(ObjectKind::Trees);
        assert_eq!(trees.base_action_type(), trees);
        assert_eq!(MapObjectType::NONE.base_action_type(), MapObjectType::NONE);
    }

    #[test]
    fn taxonomy_tables() {
        assert!(MapObjectType::action(ObjectKind::Sign).is_short());
        assert!(!MapObjectType::non_action(ObjectKind::Sign).is_short());
        assert!(MapObjectType::non_action(ObjectKind::Ruins).is_short());
        assert!(MapObjectType::non_action(ObjectKind::WaterLake).is_short());
        assert!(!MapObjectType::action(ObjectKind::Castle).is_short());

        assert!(MapObjectType::action(ObjectKind::Castle).is_detached());
        assert!(!MapObjectType::non_action(ObjectKind::Castle).is_detached());

        assert!(MapObjectType::non_action(ObjectKind::Trees).is_combined());
        assert!(MapObjectType::non_action(ObjectKind::Crater).is_combined());
        assert!(!MapObjectType::non_action(ObjectKind::Rock).is_combined());
    }

    #[test]
    fn action_directions() {
        assert_eq!(
            MapObjectType::action(ObjectKind::Resource).action_direction(),
            Direction::ALL
        );
        assert_eq!(
            MapObjectType::action(ObjectKind::Mines).action_direction(),
            Direction::CENTER_ROW | Direction::BOTTOM_ROW
        );
        assert!(
            !MapObjectType::action(ObjectKind::TrollBridge)
                .action_direction()
                .contains(Direction::LEFT)
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(MapObjectType::NONE.to_string(), "None");
        assert_eq!(
            MapObjectType::non_action(ObjectKind::Mines).to_string(),
            "Non-action Mines"
        );
        assert_eq!(MapObjectType::non_action(ObjectKind::Trees).to_string(), "Trees");
        assert_eq!(MapObjectType::action(ObjectKind::Trees).to_string(), "Action Trees");
    }
}
