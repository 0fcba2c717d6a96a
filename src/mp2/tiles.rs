use std::mem;
use log::warn;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::mp2::objects::ObjectType;
use crate::mp2::tileset::{icon_for_tileset, is_road_tileset};


#[repr(C, packed)]
#[derive(Debug, Copy, Clone)]
pub(crate) struct Mp2Tile {
    pub tile_index: u16,
    pub tileset1: u8,
    pub index1: u8,
    pub quantity1: u8,
    pub quantity2: u8,
    pub tileset2: u8,
    pub index2: u8,
    pub flags: u8,
    pub object_type: u8,
    pub next_addon: u16,
    pub uid1: u32,
    pub uid2: u32,
}

#[repr(C, packed)]
#[derive(Debug, Copy, Clone)]
pub(crate) struct Mp2Addon {
    pub next: u16,
    pub tileset1: u8,
    pub index1: u8,
    pub quantity: u8,
    pub tileset2: u8,
    pub index2: u8,
    pub uid1: u32,
    pub uid2: u32,
}

pub const TILE_RECORD_SIZE: usize = mem::size_of::<Mp2Tile>();
pub const ADDON_RECORD_SIZE: usize = mem::size_of::<Mp2Addon>();


impl Mp2Tile {
    pub(crate) fn read(f: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            tile_index: f.read_u16()?,
            tileset1: f.read_u8()?,
            index1: f.read_u8()?,
            quantity1: f.read_u8()?,
            quantity2: f.read_u8()?,
            tileset2: f.read_u8()?,
            index2: f.read_u8()?,
            flags: f.read_u8()?,
            object_type: f.read_u8()?,
            next_addon: f.read_u16()?,
            uid1: f.read_u32()?,
            uid2: f.read_u32()?,
        })
    }
}

impl Mp2Addon {
    pub(crate) fn read(f: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            next: f.read_u16()?,
            // the editor stores this one halved
            tileset1: f.read_u8()?.wrapping_mul(2),
            index1: f.read_u8()?,
            quantity: f.read_u8()?,
            tileset2: f.read_u8()?,
            index2: f.read_u8()?,
            uid1: f.read_u32()?,
            uid2: f.read_u32()?,
        })
    }
}


/// Terrain kind, derived from the ground sprite index
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
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

impl Ground {
    pub fn from_tile_index(index: u16) -> Self {
        match index {
            0..=29 => Self::Water,
            30..=91 => Self::Grass,
            92..=145 => Self::Snow,
            146..=207 => Self::Swamp,
            208..=261 => Self::Lava,
            262..=320 => Self::Desert,
            321..=360 => Self::Dirt,
            361..=414 => Self::Wasteland,
            _ => Self::Beach,
        }
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Passability {
    Free,
    /// entering the tile triggers the object
    Action,
    Blocked,
}


/// One object layer of a tile
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Level {
    pub tileset: u8,
    pub index: u8,
    pub uid: u32,
    pub quantity: u8,
}

impl Level {
    pub fn icon(&self) -> Option<&'static str> {
        icon_for_tileset(self.tileset)
    }
}


/// Additional object layer stacked on a tile. Only the low two bits of `level` take part in ordering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddOn {
    pub level: u8,
    pub uid: u32,
    pub tileset: u8,
    pub index: u8,
}

impl AddOn {
    fn new(level: u8, uid: u32, tileset: u8, index: u8) -> Option<Self> {
        (tileset != 0 && index < 0xFF).then_some(Self { level, uid, tileset, index })
    }

    pub fn icon(&self) -> Option<&'static str> {
        icon_for_tileset(self.tileset)
    }

    #[inline]
    fn priority(&self) -> u8 {
        self.level % 4
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub terrain_index: u16,
    pub ground: Ground,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub road: bool,
    /// effective first level object, after finalization
    pub level1: Level,
    pub level2: Level,
    /// 0..=3
    pub level: u8,
    pub object_type: ObjectType,
    pub quantity1: u8,
    pub quantity2: u8,
    pub passability: Passability,
    pub level1_addons: Vec<AddOn>,
    pub level2_addons: Vec<AddOn>,
}


impl Tile {
    /// Builds a tile from its raw record: walks the addon chain threaded through `addons`
    /// and picks the effective first level object.
    pub(crate) fn from_raw(index: usize, side: usize, raw: &Mp2Tile, addons: &[Mp2Addon]) -> Result<Self> {
        let raw = *raw;
        let object_type = ObjectType::try_from(raw.object_type)?;

        let mut tile = Tile {
            index,
            x: index % side,
            y: index / side,
            terrain_index: raw.tile_index,
            ground: Ground::from_tile_index(raw.tile_index),
            flip_horizontal: raw.flags & 0x01 != 0,
            flip_vertical: raw.flags & 0x02 != 0,
            road: (raw.tileset1 >> 1) & 1 != 0,
            level1: Level { tileset: raw.tileset1, index: raw.index1, uid: raw.uid1, quantity: raw.quantity1 },
            level2: Level { tileset: raw.tileset2, index: raw.index2, uid: raw.uid2, quantity: raw.quantity2 },
            level: raw.quantity1 & 0x03,
            object_type,
            quantity1: raw.quantity1,
            quantity2: raw.quantity2,
            passability: Passability::Free,
            level1_addons: Vec::new(),
            level2_addons: Vec::new(),
        };

        tile.level1_addons.extend(AddOn::new(tile.level, raw.uid1, raw.tileset1, raw.index1));
        tile.level2_addons.extend(AddOn::new(tile.level, raw.uid2, raw.tileset2, raw.index2));

        tile.follow_addons(raw.next_addon, addons);
        tile.finalize();
        Ok(tile)
    }

    // at most one step per arena slot, a corrupted chain cannot loop forever
    fn follow_addons(&mut self, first: u16, addons: &[Mp2Addon]) {
        let mut next = first as usize;
        let mut steps = 0;
        while next != 0 {
            let Some(addon) = addons.get(next) else {
                warn!("tile {}: addon chain stops at {next}, only {} addons", self.index, addons.len());
                return;
            };
            if steps == addons.len() {
                warn!("tile {}: addon chain longer than the addon table, cut", self.index);
                return;
            }
            steps += 1;

            let addon = *addon;
            self.level1_addons.extend(AddOn::new(addon.quantity, addon.uid1, addon.tileset1, addon.index1));
            self.level2_addons.extend(AddOn::new(addon.quantity, addon.uid2, addon.tileset2, addon.index2));
            next = addon.next as usize;
        }
    }

    fn finalize(&mut self) {
        // stable: equal priorities keep the file order
        self.level1_addons.sort_by(|a, b| b.priority().cmp(&a.priority()));
        self.level2_addons.sort_by_key(AddOn::priority);

        if let Some(top) = self.level1_addons.pop() {
            self.level1 = Level { tileset: top.tileset, index: top.index, uid: top.uid, quantity: self.quantity1 };
            self.level = top.level & 0x03;
        }

        self.road = self.road
            || is_road_tileset(self.level1.tileset)
            || self.level1_addons.iter().any(|addon| is_road_tileset(addon.tileset));

        self.passability = if self.object_type == ObjectType::Nothing {
            Passability::Free
        } else if self.object_type.is_action() {
            Passability::Action
        } else {
            Passability::Blocked
        };
    }

    /// Key matching the tile to its trailing block, see `owns_block`
    #[inline]
    pub fn order_key(&self) -> u32 {
        (self.quantity2 as u32) << 8 | self.quantity1 as u32
    }

    /// block indices start at 0, order keys at 8
    pub fn owns_block(&self, block: usize) -> bool {
        let order = self.order_key() as usize;
        order != 0 && order % 8 == 0 && block + 1 == order / 8
    }

    pub fn icon(&self) -> Option<&'static str> {
        self.level1.icon()
    }
}


#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw_tile(tileset1: u8, index1: u8, object_type: u8, next_addon: u16) -> Mp2Tile {
        Mp2Tile {
            tile_index: 40,
            tileset1,
            index1,
            quantity1: 0,
            quantity2: 0,
            tileset2: 0,
            index2: 0xFF,
            flags: 0,
            object_type,
            next_addon,
            uid1: 1,
            uid2: 0,
        }
    }

    pub(crate) fn raw_addon(next: u16, tileset1: u8, index1: u8, quantity: u8) -> Mp2Addon {
        Mp2Addon { next, tileset1, index1, quantity, tileset2: 0, index2: 0xFF, uid1: 100 + next as u32, uid2: 0 }
    }

    #[test]
    fn record_sizes() {
        assert_eq!(TILE_RECORD_SIZE, 20);
        assert_eq!(ADDON_RECORD_SIZE, 15);
    }

    #[test]
    fn reads_halved_addon_tileset() {
        let data = [0x02, 0x00, 0x48, 0x48, 0xCA, 0x00, 0xFF, 1, 0, 0, 0, 0, 0, 0, 0];
        let addon = Mp2Addon::read(&mut ByteCursor::new(&data)).unwrap();
        let tileset = addon.tileset1;
        let next = addon.next;
        assert_eq!(tileset, 0x90);
        assert_eq!(next, 2);
    }

    #[test]
    fn castle_keeps_base_object() {
        let mut raw = raw_tile(0x98, 12, 0xB1, 1);
        raw.quantity1 = 8;
        let addons = [raw_addon(0, 0, 0, 0), raw_addon(0, 0x90, 72, 202)];

        let tile = Tile::from_raw(163, 36, &raw, &addons).unwrap();
        assert_eq!((tile.x, tile.y), (19, 4));
        assert_eq!(tile.object_type, ObjectType::RandomCastle);
        assert_eq!(tile.icon(), Some("OBJNTWRD.ICN"));
        assert_eq!(tile.level1_addons.len(), 1);
        assert_eq!(tile.level1_addons[0].icon(), Some("OBJNTWBA.ICN"));
        assert_eq!(tile.level1_addons[0].index, 72);
        assert_eq!(tile.level1_addons[0].level, 202);
        assert_eq!(tile.passability, Passability::Action);
    }

    #[test]
    fn addon_takes_over_empty_tile() {
        let raw = raw_tile(0, 0, 0x00, 1);
        let addons = [raw_addon(0, 0, 0, 0), raw_addon(2, 0xCC, 5, 1), raw_addon(0, 0xCC, 6, 3)];

        let tile = Tile::from_raw(0, 36, &raw, &addons).unwrap();
        assert_eq!(tile.level1.tileset, 0xCC);
        assert_eq!(tile.level1.index, 5);
        assert_eq!(tile.level1.uid, 102);
        assert_eq!(tile.level, 1);
        assert_eq!(tile.level1_addons.len(), 1);
        assert_eq!(tile.level1_addons[0].index, 6);
        assert_eq!(tile.passability, Passability::Free);
    }

    #[test]
    fn cyclic_chain_terminates() {
        let raw = raw_tile(0, 0, 0x00, 1);
        let addons = [raw_addon(0, 0, 0, 0), raw_addon(2, 0xCC, 1, 0), raw_addon(1, 0xCC, 2, 0)];

        let tile = Tile::from_raw(0, 36, &raw, &addons).unwrap();
        assert!(tile.level1_addons.len() + 1 <= addons.len());
    }

    #[test]
    fn out_of_range_chain_stops_early() {
        let raw = raw_tile(0, 0, 0x00, 1);
        let addons = [raw_addon(0, 0, 0, 0), raw_addon(9, 0xCC, 1, 0)];

        let tile = Tile::from_raw(0, 36, &raw, &addons).unwrap();
        assert_eq!(tile.level1.index, 1);
        assert!(tile.level1_addons.is_empty());
    }

    #[test]
    fn level_two_halves_split() {
        let raw = raw_tile(0, 0, 0x00, 1);
        let mut addon = raw_addon(0, 0, 0xFF, 2);
        addon.tileset2 = 0xCC;
        addon.index2 = 9;
        let addons = [raw_addon(0, 0, 0, 0), addon];

        let tile = Tile::from_raw(0, 36, &raw, &addons).unwrap();
        assert_eq!(tile.level1.tileset, 0);
        assert_eq!(tile.level2_addons.len(), 1);
        assert_eq!(tile.level2_addons[0].index, 9);
    }

    #[test]
    fn unknown_object_type_fails() {
        let raw = raw_tile(0, 0, 0x80, 0);
        assert!(Tile::from_raw(0, 36, &raw, &[]).is_err());
    }

    #[test]
    fn derived_fields() {
        let mut raw = raw_tile(0x7A, 3, 0x00, 0);
        raw.tile_index = 300;
        raw.flags = 0x02;
        let tile = Tile::from_raw(37, 36, &raw, &[]).unwrap();
        assert_eq!(tile.ground, Ground::Desert);
        assert!(!tile.flip_horizontal);
        assert!(tile.flip_vertical);
        assert!(tile.road);
        assert_eq!((tile.x, tile.y), (1, 1));
        assert_eq!(Ground::from_tile_index(29), Ground::Water);
        assert_eq!(Ground::from_tile_index(415), Ground::Beach);
    }

    #[test]
    fn order_key_matches_block() {
        let mut raw = raw_tile(0, 0, 0x00, 0);
        raw.quantity1 = 8;
        let tile = Tile::from_raw(0, 36, &raw, &[]).unwrap();
        assert_eq!(tile.order_key(), 8);
        assert!(tile.owns_block(0));
        assert!(!tile.owns_block(1));

        raw.quantity1 = 0;
        raw.quantity2 = 1;
        let tile = Tile::from_raw(0, 36, &raw, &[]).unwrap();
        assert_eq!(tile.order_key(), 256);
        assert!(tile.owns_block(31));

        raw.quantity2 = 0;
        let tile = Tile::from_raw(0, 36, &raw, &[]).unwrap();
        assert!(!tile.owns_block(0));
    }
}
