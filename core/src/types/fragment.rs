use serde::{Deserialize, Serialize};

use super::icn::ObjectIcnType;
use crate::constants::NO_IMAGE;
use crate::sprites;

/// Structural layer of a fragment. Higher codes are drawn first; Shadow and
/// Terrain never block movement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum ObjectLayer {
    #[default]
    Object = 0,
    Background = 1,
    Shadow = 2,
    Terrain = 3,
}

impl ObjectLayer {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ObjectLayer::Object),
            1 => Some(ObjectLayer::Background),
            2 => Some(ObjectLayer::Shadow),
            3 => Some(ObjectLayer::Terrain),
            _ => None,
        }
    }

    /// Keeps the two low bits of a packed quantity byte.
    pub fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => ObjectLayer::Object,
            1 => ObjectLayer::Background,
            2 => ObjectLayer::Shadow,
            _ => ObjectLayer::Terrain,
        }
    }

    pub fn is_non_blocking(&self) -> bool {
        (*self as u8 >> 1) & 1 == 1
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            ObjectLayer::Object => "Object layer",
            ObjectLayer::Background => "Background layer",
            ObjectLayer::Shadow => "Shadow layer",
            ObjectLayer::Terrain => "Terrain layer",
        }
    }
}

/// One drawable piece of a placed object attached to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileFragment {
    pub layer: ObjectLayer,
    /// Id shared by every fragment of the same placed object, 0 if none.
    pub uid: u32,
    pub icn_type: ObjectIcnType,
    pub image_index: u8,
}

impl TileFragment {
    pub fn new(layer: ObjectLayer, uid: u32, icn_type: ObjectIcnType, image_index: u8) -> Self {
        TileFragment {
            layer,
            uid,
            icn_type,
            image_index,
        }
    }

    pub fn has_visual(&self) -> bool {
        !self.icn_type.is_unknown() && self.image_index < NO_IMAGE
    }

    pub fn is_shadow(&self) -> bool {
        sprites::is_shadow_sprite(self.icn_type, self.image_index)
    }

    pub fn is_road(&self) -> bool {
        sprites::is_road_sprite(self.icn_type, self.image_index)
    }

    pub fn is_stream(&self) -> bool {
        sprites::is_stream_sprite(self.icn_type, self.image_index)
    }

    pub fn is_reefs(&self) -> bool {
        sprites::is_reefs_sprite(self.icn_type, self.image_index)
    }

    /// Whether this fragment belongs to `uid` and takes part in collisions.
    pub fn is_blocking_part_of(&self, uid: u32) -> bool {
        self.uid == uid && !self.layer.is_non_blocking()
    }

    pub(crate) fn info_string(&self, level: u8) -> String {
        format!(
            "--------- Level {} --------\n\
             UID             : {}\n\
             ICN object type : {} ({})\n\
             image index     : {}\n\
             layer type      : {} - {}\n\
             is shadow       : {}\n",
            level,
            self.uid,
            self.icn_type as u8,
            self.icn_type.to_string(),
            self.image_index,
            self.layer as u8,
            self.layer.to_string(),
            if self.is_shadow() { "yes" } else { "no" },
        )
    }
}
