pub mod archive;
pub mod icn;
pub mod palette;
pub mod sprites;

pub use archive::{Archive, ArchiveRecord};
pub use icn::{decode_icn_group, Sprite, SpriteVariant};
pub use palette::Palette;
pub use sprites::SpriteCache;
