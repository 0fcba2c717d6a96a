//! Readers for the data files of Heroes of Might and Magic II: the AGG resource archive,
//! the ICN sprite groups stored in it and the MP2 world maps.

pub mod agg;
pub mod assets;
pub mod config;
pub mod cursor;
pub mod error;
pub mod mp2;

pub use assets::Assets;
pub use config::AssetConfig;
pub use cursor::{ByteCursor, Endian};
pub use error::{Error, Result};
