use thiserror::Error;

/// Errors raised while decoding a persisted tile or map stream.
#[derive(Debug, Error)]
pub enum TileStreamError {
    #[error("stream ended at offset {offset}, {needed} more bytes needed")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("format version {0} is older than the last supported version")]
    UnsupportedVersion(u16),

    #[error("format version {0} is newer than this build understands")]
    FutureVersion(u16),

    #[error("bad map stream magic {0:#010x}")]
    InvalidMagic(u32),

    #[error("structural layer {0} is out of its 2-bit range")]
    InvalidLayer(u8),

    #[error("object type code {0:#04x} has no meaning")]
    UnknownObjectType(u8),

    #[error("metadata array has {0} slots, expected 3")]
    MetadataSize(u32),

    #[error("map is {width}x{height} but the stream holds {tiles} tiles")]
    DimensionMismatch { width: i32, height: i32, tiles: usize },

    #[error("tile at position {position} carries index {index}")]
    TileIndexMismatch { position: usize, index: i32 },

    #[error("compression failure: {0}")]
    Compression(#[from] std::io::Error),
}
