use serde::{Deserialize, Serialize};

/// Visual group (sprite sheet) a fragment image belongs to. `Unknown`
/// means "no object".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ObjectIcnType {
    #[default]
    Unknown = 0,
    Boat32 = 10,
    Objnarti = 11,
    Mons32 = 12,
    Flag32 = 14,
    Minihero = 21,
    Mtnsnow = 22,
    Mtnswmp = 23,
    Mtnlava = 24,
    Mtndsrt = 25,
    Mtndirt = 26,
    Mtnmult = 27,
    Extraovr = 29,
    Road = 30,
    Mtncrck = 31,
    Mtngras = 32,
    Trejngl = 33,
    Treevil = 34,
    Objntown = 35,
    Objntwba = 36,
    Objntwsh = 37,
    Objntwrd = 38,
    Objnxtra = 39,
    Objnwat2 = 40,
    Objnmul2 = 41,
    Tresnow = 42,
    Trefir = 43,
    Trefall = 44,
    Stream = 45,
    Objnrsrc = 46,
    Objngra2 = 48,
    Tredeci = 49,
    Objnwatr = 50,
    Objngras = 51,
    Objnsnow = 52,
    Objnswmp = 53,
    Objnlava = 54,
    Objndsrt = 55,
    Objndirt = 56,
    Objncrck = 57,
    Objnlav3 = 58,
    Objnmult = 59,
    Objnlav2 = 60,
    XLoc1 = 61,
    XLoc2 = 62,
    XLoc3 = 63,
}

impl ObjectIcnType {
    /// Decodes a visual group code. Unassigned codes yield `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use ObjectIcnType::*;
        let icn = match value {
            0 => Unknown,
            10 => Boat32,
            11 => Objnarti,
            12 => Mons32,
            14 => Flag32,
            21 => Minihero,
            22 => Mtnsnow,
            23 => Mtnswmp,
            24 => Mtnlava,
            25 => Mtndsrt,
            26 => Mtndirt,
            27 => Mtnmult,
            29 => Extraovr,
            30 => Road,
            31 => Mtncrck,
            32 => Mtngras,
            33 => Trejngl,
            34 => Treevil,
            35 => Objntown,
            36 => Objntwba,
            37 => Objntwsh,
            38 => Objntwrd,
            39 => Objnxtra,
            40 => Objnwat2,
            41 => Objnmul2,
            42 => Tresnow,
            43 => Trefir,
            44 => Trefall,
            45 => Stream,
            46 => Objnrsrc,
            48 => Objngra2,
            49 => Tredeci,
            50 => Objnwatr,
            51 => Objngras,
            52 => Objnsnow,
            53 => Objnswmp,
            54 => Objnlava,
            55 => Objndsrt,
            56 => Objndirt,
            57 => Objncrck,
            58 => Objnlav3,
            59 => Objnmult,
            60 => Objnlav2,
            61 => XLoc1,
            62 => XLoc2,
            63 => XLoc3,
            _ => return None,
        };

        Some(icn)
    }

    /// Decodes a code and degrades unassigned values to `Unknown`.
    pub fn from_u8_lossy(value: u8) -> Self {
        Self::from_u8(value).unwrap_or_else(|| {
            log::warn!("Unassigned visual group code {}, treating it as no object", value);
            ObjectIcnType::Unknown
        })
    }

    pub fn is_unknown(&self) -> bool {
        *self == ObjectIcnType::Unknown
    }

    pub fn to_string(&self) -> &'static str {
        use ObjectIcnType::*;
        match self {
            Unknown => "UNKNOWN",
            Boat32 => "BOAT32.ICN",
            Objnarti => "OBJNARTI.ICN",
            Mons32 => "MONS32.ICN",
            Flag32 => "FLAG32.ICN",
            Minihero => "MINIHERO.ICN",
            Mtnsnow => "MTNSNOW.ICN",
            Mtnswmp => "MTNSWMP.ICN",
            Mtnlava => "MTNLAVA.ICN",
            Mtndsrt => "MTNDSRT.ICN",
            Mtndirt => "MTNDIRT.ICN",
            Mtnmult => "MTNMULT.ICN",
            Extraovr => "EXTRAOVR.ICN",
            Road => "ROAD.ICN",
            Mtncrck => "MTNCRCK.ICN",
            Mtngras => "MTNGRAS.ICN",
            Trejngl => "TREJNGL.ICN",
            Treevil => "TREEVIL.ICN",
            Objntown => "OBJNTOWN.ICN",
            Objntwba => "OBJNTWBA.ICN",
            Objntwsh => "OBJNTWSH.ICN",
            Objntwrd => "OBJNTWRD.ICN",
            Objnxtra => "OBJNXTRA.ICN",
            Objnwat2 => "OBJNWAT2.ICN",
            Objnmul2 => "OBJNMUL2.ICN",
            Tresnow => "TRESNOW.ICN",
            Trefir => "TREFIR.ICN",
            Trefall => "TREFALL.ICN",
            Stream => "STREAM.ICN",
            Objnrsrc => "OBJNRSRC.ICN",
            Objngra2 => "OBJNGRA2.ICN",
            Tredeci => "TREDECI.ICN",
            Objnwatr => "OBJNWATR.ICN",
            Objngras => "OBJNGRAS.ICN",
            Objnsnow => "OBJNSNOW.ICN",
            Objnswmp => "OBJNSWMP.ICN",
            Objnlava => "OBJNLAVA.ICN",
            Objndsrt => "OBJNDSRT.ICN",
            Objndirt => "OBJNDIRT.ICN",
            Objncrck => "OBJNCRCK.ICN",
            Objnlav3 => "OBJNLAV3.ICN",
            Objnmult => "OBJNMULT.ICN",
            Objnlav2 => "OBJNLAV2.ICN",
            XLoc1 => "X_LOC1.ICN",
            XLoc2 => "X_LOC2.ICN",
            XLoc3 => "X_LOC3.ICN",
        }
    }
}
