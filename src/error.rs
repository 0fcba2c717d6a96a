use thiserror::Error;

use crate::mp2::objects::ObjectType;


/// Everything that can go wrong while opening an archive, decoding sprites or loading a map.
/// Format errors carry the offending raw value.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no such file in archive: {0}")]
    NoSuchFile(String),

    #[error("read of {requested} bytes at {position} is out of bounds (buffer length {len})")]
    OutOfBounds { position: usize, requested: usize, len: usize },

    #[error("malformed archive: {records} records do not fit into {file_size} bytes")]
    MalformedArchive { records: usize, file_size: usize },

    #[error("bad map magic {0:#010x}")]
    BadMagic(u32),

    #[error("map must be square, got {width}x{height}")]
    NotSquare { width: i64, height: i64 },

    #[error("unknown map size {0}")]
    UnknownMapSize(i64),

    #[error("size class mismatch: header says {expected}, tile table says {found}")]
    SizeClassMismatch { expected: usize, found: u32 },

    #[error("unknown difficulty {0}")]
    UnknownDifficulty(u16),

    #[error("unknown victory condition {0}")]
    UnknownVictoryCondition(u8),

    #[error("unknown defeat condition {0}")]
    UnknownDefeatCondition(u8),

    #[error("unknown race {0:#04x}")]
    UnknownRace(u8),

    #[error("unknown object type {0:#04x}")]
    UnknownObjectType(u8),

    #[error("unknown capture object {0:#04x}")]
    UnknownCaptureObject(u8),

    #[error("block for {kind:?} has {found} bytes, expected {expected}")]
    BlockSize { kind: ObjectType, expected: usize, found: usize },

    #[error("failed to load image sprite: {0}")]
    SpriteLoad(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
