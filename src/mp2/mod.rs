pub mod blocks;
pub mod header;
pub mod loader;
pub mod objects;
pub mod tiles;
pub mod tileset;

pub use blocks::{Buildings, Castle, EventDate, Hero, MapEvent, Resources, Riddle, Rumor, SecondarySkill, Sign, Troop};
pub use header::{Color, ColorSet, DefeatCondition, Difficulty, MapHeader, MapSize, Race, VictoryCondition};
pub use loader::{CapturedObject, CastleSlot, Map, MapLoader, MapObject};
pub use objects::ObjectType;
pub use tiles::{AddOn, Ground, Level, Passability, Tile};
pub use tileset::icon_for_tileset;
