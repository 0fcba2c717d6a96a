use std::fs;
use std::path::Path;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AssetConfig;
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::mp2::blocks::{Castle, EventDate, Hero, MapEvent, Riddle, Rumor, Sign};
use crate::mp2::header::{Color, MapHeader, MapSize, Race};
use crate::mp2::objects::ObjectType;
use crate::mp2::tiles::{Mp2Addon, Mp2Tile, Tile, ADDON_RECORD_SIZE, TILE_RECORD_SIZE};


/// Start of the tile table
pub const TILES_OFFSET: usize = 428;

const CASTLE_SLOTS: usize = 72;
const CAPTURE_SLOTS: usize = 144;
const EMPTY_SLOT: (u8, u8) = (0xFF, 0xFF);
const MINIHERO_TILESET: u8 = 0x54;
const HERO_SPRITES_PER_COLOR: u8 = 7;


/// A tile whose object owns a trailing block
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MapObject {
    pub object_type: ObjectType,
    pub tile: usize,
    pub position: (u8, u8),
}

/// Entry of the castle coordinate table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CastleSlot {
    pub position: (u8, u8),
    pub race: Race,
    /// a castle rather than a town
    pub is_castle: bool,
}

/// Object a player can capture: castles, mines, sawmills, lighthouses...
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CapturedObject {
    pub position: (u8, u8),
    pub object_type: ObjectType,
    /// resource kind of a mine, 0 for everything else
    pub resource: u8,
}


#[derive(Debug, Clone)]
pub struct Map {
    pub header: MapHeader,
    pub tiles: Vec<Tile>,
    pub addon_count: usize,
    pub objects: Vec<MapObject>,
    pub castle_slots: Vec<CastleSlot>,
    pub captured: Vec<CapturedObject>,
    pub obelisk_count: u8,
    pub castles: Vec<Castle>,
    pub heroes: Vec<Hero>,
    pub signs: Vec<Sign>,
    pub events: Vec<MapEvent>,
    pub riddles: Vec<Riddle>,
    pub dated_events: Vec<EventDate>,
    pub rumors: Vec<Rumor>,
    /// the editor's running unique id counter
    pub unique_id: u32,
}

impl Map {
    #[inline]
    pub fn side(&self) -> usize {
        self.header.size.side()
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= self.side() || y >= self.side() {
            return None;
        }
        self.tiles.get(y * self.side() + x)
    }
}


/// Parses mp2 world files. The random generator decides the buildings of castles
/// the map leaves at their defaults.
pub struct MapLoader {
    rng: StdRng,
}


impl MapLoader {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config.random_seed)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<Map> {
        trace!("MapLoader::load_file {path:?}");
        let data = fs::read(path)?;
        self.load(&data)
    }

    pub fn load(&mut self, data: &[u8]) -> Result<Map> {
        trace!("MapLoader::load");
        let f = &mut ByteCursor::new(data);

        /* metadata */
        let header = MapHeader::read(f)?;
        let side = header.size.side();
        debug!("map {:?}: {:?}, {:?}", header.name, header.size, header.difficulty);

        /* addon table, behind the tiles */
        f.seek(TILES_OFFSET - 8)?;
        for _ in 0..2 {
            let found = f.read_u32()?;
            if MapSize::from_side(found as i64)? != header.size {
                return Err(Error::SizeClassMismatch { expected: side, found });
            }
        }
        f.skip(header.size.tiles() * TILE_RECORD_SIZE)?;

        let addon_count = f.read_u32()? as usize;
        let mut addons = Vec::with_capacity(addon_count.min(f.remaining() / ADDON_RECORD_SIZE));
        for _ in 0..addon_count {
            addons.push(Mp2Addon::read(f)?);
        }
        let addons_end = f.position();

        /* tiles */
        f.seek(TILES_OFFSET)?;
        let mut tiles = Vec::with_capacity(header.size.tiles());
        let mut objects = Vec::new();
        for index in 0..header.size.tiles() {
            let raw = Mp2Tile::read(f)?;
            let tile = Tile::from_raw(index, side, &raw, &addons)?;
            if tile.object_type.owns_block() {
                objects.push(MapObject {
                    object_type: tile.object_type,
                    tile: index,
                    position: (tile.x as u8, tile.y as u8),
                });
            }
            tiles.push(tile);
        }
        debug!("{} tiles, {} addons, {} objects with blocks", tiles.len(), addons.len(), objects.len());

        /* castle coordinates and capturable objects */
        f.seek(addons_end)?;
        let mut castle_slots = Vec::new();
        let mut captured = Vec::new();
        for _ in 0..CASTLE_SLOTS {
            let position = (f.read_u8()?, f.read_u8()?);
            let id = f.read_u8()?;
            if position == EMPTY_SLOT {
                continue;
            }
            let race = Race::try_from(id & 0x7F).map_err(|_| Error::UnknownRace(id))?;
            castle_slots.push(CastleSlot { position, race, is_castle: id & 0x80 != 0 });
            captured.push(CapturedObject { position, object_type: ObjectType::Castle, resource: 0 });
        }

        for _ in 0..CAPTURE_SLOTS {
            let position = (f.read_u8()?, f.read_u8()?);
            let id = f.read_u8()?;
            if position == EMPTY_SLOT {
                continue;
            }
            let (object_type, resource) = match id {
                0x00 => (ObjectType::Sawmill, 0),
                0x01 => (ObjectType::AlchemyLab, 0),
                0x02..=0x06 => (ObjectType::Mines, id - 0x01),
                0x64 => (ObjectType::Lighthouse, 0),
                0x65 => (ObjectType::DragonCity, 0),
                0x67 => (ObjectType::AbandonedMine, 0),
                _ => return Err(Error::UnknownCaptureObject(id)),
            };
            captured.push(CapturedObject { position, object_type, resource });
        }

        let obelisk_count = f.read_u8()?;

        // the last pair before the terminator wins
        let mut block_count = 0usize;
        loop {
            let low = f.read_u8()? as usize;
            let high = f.read_u8()? as usize;
            if low == 0 && high == 0 {
                break;
            }
            block_count = 256 * high + low - 1;
        }
        debug!("{} castles, {} captured objects, {} blocks", castle_slots.len(), captured.len(), block_count);

        let mut map = Map {
            header,
            tiles,
            addon_count,
            objects,
            castle_slots,
            captured,
            obelisk_count,
            castles: Vec::new(),
            heroes: Vec::new(),
            signs: Vec::new(),
            events: Vec::new(),
            riddles: Vec::new(),
            dated_events: Vec::new(),
            rumors: Vec::new(),
            unique_id: 0,
        };

        /* trailing blocks */
        for block in 0..block_count {
            let size = f.read_u16()? as usize;
            let block_data = f.read(size)?;
            self.read_block(&mut map, block, block_data)?;
        }

        f.seek(data.len().saturating_sub(4))?;
        map.unique_id = f.read_u32()?;

        debug!("{} castles, {} heroes, {} signs, {} events, {} riddles, {} dated events, {} rumors",
            map.castles.len(), map.heroes.len(), map.signs.len(), map.events.len(),
            map.riddles.len(), map.dated_events.len(), map.rumors.len());
        Ok(map)
    }

    fn read_block(&mut self, map: &mut Map, block: usize, data: &[u8]) -> Result<()> {
        let owner = map.objects.iter().copied().find(|object| map.tiles[object.tile].owns_block(block));

        let Some(owner) = owner else {
            if EventDate::matches(data) {
                map.dated_events.push(EventDate::read(data)?);
            } else if Rumor::matches(data) {
                map.rumors.push(Rumor::read(data)?);
            } else {
                debug!("block {block} ({} bytes) has no owner, dropped", data.len());
            }
            return Ok(());
        };

        let kind = owner.object_type;
        match kind {
            _ if kind.is_town() => {
                let mut castle = Castle::read(data, kind, map.header.difficulty, &mut self.rng)?;
                castle.position = owner.position;
                match map.castle_slots.iter().find(|slot| slot.position == owner.position) {
                    Some(slot) => castle.race = castle.race.or(Some(slot.race)),
                    None => warn!("castle at {:?} has no coordinate slot", owner.position),
                }
                map.castles.push(castle);
            }
            ObjectType::Heroes | ObjectType::Jail => {
                let mut hero = Hero::read(data, kind)?;
                hero.position = owner.position;
                if kind == ObjectType::Heroes {
                    if let Some(sprite) = hero_sprite(&map.tiles[owner.tile]) {
                        hero.color = Color::from_index(sprite / HERO_SPRITES_PER_COLOR);
                        hero.race = match sprite % HERO_SPRITES_PER_COLOR {
                            6 => Some(Race::Random),
                            race => Race::playable(race),
                        };
                    }
                }
                map.heroes.push(hero);
            }
            ObjectType::Sign | ObjectType::Bottle => match Sign::read(data, kind)? {
                Some(mut sign) => {
                    sign.position = owner.position;
                    map.signs.push(sign);
                }
                None => warn!("{kind:?} block {block} at {:?} has an unexpected marker", owner.position),
            },
            ObjectType::Event => match MapEvent::read(data, kind)? {
                Some(mut event) => {
                    event.position = owner.position;
                    map.events.push(event);
                }
                None => warn!("event block {block} at {:?} has an unexpected marker", owner.position),
            },
            ObjectType::Sphinx => match Riddle::read(data, kind)? {
                Some(mut riddle) => {
                    riddle.position = owner.position;
                    map.riddles.push(riddle);
                }
                None => warn!("sphinx block {block} at {:?} has an unexpected marker", owner.position),
            },
            _ => debug!("block {block} owned by {kind:?}, ignored"),
        }
        Ok(())
    }
}


// sprite index of the hero figure standing on the tile
fn hero_sprite(tile: &Tile) -> Option<u8> {
    if tile.level1.tileset & !0x03 == MINIHERO_TILESET {
        return Some(tile.level1.index);
    }
    tile.level1_addons.iter()
        .find(|addon| addon.tileset & !0x03 == MINIHERO_TILESET)
        .map(|addon| addon.index)
}
