use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ground {
    Water,
    Grass,
    Snow,
    Swamp,
    Lava,
    Desert,
    Dirt,
    Wasteland,
    Beach,
}

/// Terrain image layout for one ground: the full range, the clean images
/// and the images with embedded decorations (pebbles, flowers, ...).
struct GroundImages {
    ground: Ground,
    last: u16,
    clean: (u16, u16),
    embedded: Option<(u16, u16)>,
}

const GROUND_IMAGES: [GroundImages; 9] = [
    GroundImages {
        ground: Ground::Water,
        last: 29,
        clean: (16, 19),
        embedded: None,
    },
    GroundImages {
        ground: Ground::Grass,
        last: 91,
        clean: (68, 75),
        embedded: Some((76, 91)),
    },
    GroundImages {
        ground: Ground::Snow,
        last: 145,
        clean: (130, 137),
        embedded: Some((138, 145)),
    },
    GroundImages {
        ground: Ground::Swamp,
        last: 207,
        clean: (184, 191),
        embedded: Some((192, 207)),
    },
    GroundImages {
        ground: Ground::Lava,
        last: 261,
        clean: (246, 253),
        embedded: Some((254, 261)),
    },
    GroundImages {
        ground: Ground::Desert,
        last: 320,
        clean: (300, 307),
        embedded: Some((308, 320)),
    },
    GroundImages {
        ground: Ground::Dirt,
        last: 360,
        clean: (337, 344),
        embedded: Some((345, 360)),
    },
    GroundImages {
        ground: Ground::Wasteland,
        last: 414,
        clean: (399, 406),
        embedded: Some((407, 414)),
    },
    GroundImages {
        ground: Ground::Beach,
        last: 431,
        clean: (423, 427),
        embedded: Some((428, 431)),
    },
];

impl Ground {
    /// Ground of a terrain image. Indices past the last beach image are
    /// treated as beach.
    pub fn from_image_index(index: u16) -> Self {
        GROUND_IMAGES
            .iter()
            .find(|images| index <= images.last)
            .map_or(Ground::Beach, |images| images.ground)
    }

    pub fn is_water(&self) -> bool {
        *self == Ground::Water
    }

    /// A clean terrain image of this ground, chosen at random.
    pub fn random_clean_image_index(&self) -> u16 {
        let images = self.images();
        let mut rng = rand::thread_rng();
        rng.gen_range(images.clean.0..=images.clean.1)
    }

    fn images(&self) -> &'static GroundImages {
        // The table is ordered like the enum.
        &GROUND_IMAGES[*self as usize]
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Ground::Water => "Water",
            Ground::Grass => "Grass",
            Ground::Snow => "Snow",
            Ground::Swamp => "Swamp",
            Ground::Lava => "Lava",
            Ground::Desert => "Desert",
            Ground::Dirt => "Dirt",
            Ground::Wasteland => "Wasteland",
            Ground::Beach => "Beach",
        }
    }
}

/// Whether the terrain image has decorations drawn into it. Roads and
/// streams must not sit on such images.
pub fn terrain_has_embedded_objects(index: u16) -> bool {
    let ground = Ground::from_image_index(index);
    ground
        .images()
        .embedded
        .is_some_and(|(first, last)| (first..=last).contains(&index))
}
