use bitflags::bitflags;
use log::trace;
use rand::Rng;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::mp2::header::{Color, ColorSet, Difficulty, Race};
use crate::mp2::objects::ObjectType;


pub const CASTLE_BLOCK_SIZE: usize = 0x46;
pub const HERO_BLOCK_SIZE: usize = 0x4C;
pub const SIGN_MIN_SIZE: usize = 10;
pub const EVENT_MIN_SIZE: usize = 50;
pub const RIDDLE_MIN_SIZE: usize = 138;
pub const RUMOR_MIN_SIZE: usize = 9;

const OFFSET_JAIL_RACE: usize = 0x3C;
const OFFSET_EVENT_DATE_MARK: usize = 42;
const OFFSET_RUMOR: usize = 8;

const NAME_LENGTH: usize = 13;
const ANSWER_LENGTH: usize = 13;
const ANSWER_SLOTS: usize = 8;
const TROOP_SLOTS: usize = 5;
const SKILL_SLOTS: usize = 8;
const ARTIFACT_SLOTS: usize = 3;
const NO_ARTIFACT: u16 = 0xFFFF;


bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct Buildings: u32 {
        const THIEVES_GUILD = 1 << 0;
        const TAVERN        = 1 << 1;
        const SHIPYARD      = 1 << 2;
        const WELL          = 1 << 3;
        const STATUE        = 1 << 4;
        const LEFT_TURRET   = 1 << 5;
        const RIGHT_TURRET  = 1 << 6;
        const MARKETPLACE   = 1 << 7;
        const FARM          = 1 << 8;
        const MOAT          = 1 << 9;
        const SPECIAL       = 1 << 10;
        const CASTLE        = 1 << 11;
        const CAPTAIN       = 1 << 12;
        const MAGE_GUILD1   = 1 << 13;
        const MAGE_GUILD2   = 1 << 14;
        const MAGE_GUILD3   = 1 << 15;
        const MAGE_GUILD4   = 1 << 16;
        const MAGE_GUILD5   = 1 << 17;
        const DWELLING1     = 1 << 18;
        const DWELLING2     = 1 << 19;
        const DWELLING3     = 1 << 20;
        const DWELLING4     = 1 << 21;
        const DWELLING5     = 1 << 22;
        const DWELLING6     = 1 << 23;
        const UPGRADE2      = 1 << 24;
        const UPGRADE3      = 1 << 25;
        const UPGRADE4      = 1 << 26;
        const UPGRADE5      = 1 << 27;
        const UPGRADE6      = 1 << 28;
    }
}

// bits of the two flag words of a castle block
const BUILDING_BITS: [(u16, Buildings); 11] = [
    (0x0002, Buildings::THIEVES_GUILD),
    (0x0004, Buildings::TAVERN),
    (0x0008, Buildings::SHIPYARD),
    (0x0010, Buildings::WELL),
    (0x0080, Buildings::STATUE),
    (0x0100, Buildings::LEFT_TURRET),
    (0x0200, Buildings::RIGHT_TURRET),
    (0x0400, Buildings::MARKETPLACE),
    (0x0800, Buildings::FARM),
    (0x1000, Buildings::MOAT),
    (0x2000, Buildings::SPECIAL),
];

const DWELLING_BITS: [(u16, Buildings); 11] = [
    (0x0008, Buildings::DWELLING1),
    (0x0010, Buildings::DWELLING2),
    (0x0020, Buildings::DWELLING3),
    (0x0040, Buildings::DWELLING4),
    (0x0080, Buildings::DWELLING5),
    (0x0100, Buildings::DWELLING6),
    (0x0200, Buildings::UPGRADE2),
    (0x0400, Buildings::UPGRADE3),
    (0x0800, Buildings::UPGRADE4),
    (0x1000, Buildings::UPGRADE5),
    (0x2000, Buildings::UPGRADE6),
];

const MAGE_GUILDS: [Buildings; 5] = [
    Buildings::MAGE_GUILD1,
    Buildings::MAGE_GUILD2,
    Buildings::MAGE_GUILD3,
    Buildings::MAGE_GUILD4,
    Buildings::MAGE_GUILD5,
];

impl Buildings {
    fn from_words(buildings: u16, dwellings: u16) -> Self {
        let mut result = Self::empty();
        for (bit, building) in BUILDING_BITS {
            if buildings & bit != 0 {
                result |= building;
            }
        }
        for (bit, dwelling) in DWELLING_BITS {
            if dwellings & bit != 0 {
                result |= dwelling;
            }
        }
        result
    }

    /// all guild levels up to `level`, which is clamped to 5
    fn mage_guild(level: u8) -> Self {
        MAGE_GUILDS.iter().take(level as usize).fold(Self::empty(), |acc, &guild| acc | guild)
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Resources {
    pub wood: i32,
    pub mercury: i32,
    pub ore: i32,
    pub sulfur: i32,
    pub crystal: i32,
    pub gems: i32,
    pub gold: i32,
}

impl Resources {
    fn read(f: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            wood: f.read_i32()?,
            mercury: f.read_i32()?,
            ore: f.read_i32()?,
            sulfur: f.read_i32()?,
            crystal: f.read_i32()?,
            gems: f.read_i32()?,
            gold: f.read_i32()?,
        })
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Troop {
    pub monster: u8,
    pub count: u16,
}

// five monster ids (stored minus one) followed by five counts, empty slots dropped
fn read_troops(f: &mut ByteCursor) -> Result<Vec<Troop>> {
    let monsters = f.read(TROOP_SLOTS)?;
    let mut troops = Vec::with_capacity(TROOP_SLOTS);
    for &monster in monsters {
        let count = f.read_u16()?;
        if count != 0 {
            troops.push(Troop { monster: monster.wrapping_add(1), count });
        }
    }
    Ok(troops)
}

fn read_artifact(f: &mut ByteCursor) -> Result<Option<u16>> {
    let artifact = f.read_u16()?;
    Ok((artifact != NO_ARTIFACT).then_some(artifact))
}

fn check_exact(kind: ObjectType, data: &[u8], expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(Error::BlockSize { kind, expected, found: data.len() });
    }
    Ok(())
}

fn check_min(kind: ObjectType, data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(Error::BlockSize { kind, expected, found: data.len() });
    }
    Ok(())
}


/// Town or castle. `position` and a missing `race` are filled in from the castle coordinate table.
#[derive(Debug, Clone, PartialEq)]
pub struct Castle {
    pub position: (u8, u8),
    pub color: Option<Color>,
    pub custom_buildings: bool,
    pub buildings: Buildings,
    pub troops: Option<Vec<Troop>>,
    pub name: String,
    pub race: Option<Race>,
    pub allow_castle: bool,
}

impl Castle {
    pub fn read<R: Rng>(data: &[u8], kind: ObjectType, difficulty: Difficulty, rng: &mut R) -> Result<Self> {
        trace!("Castle::read");
        check_exact(kind, data, CASTLE_BLOCK_SIZE)?;
        let f = &mut ByteCursor::new(data);

        let color = Color::from_index(f.read_u8()?);

        let custom_buildings = f.read_bool()?;
        let mut buildings = if custom_buildings {
            let building_word = f.read_u16()?;
            let dwelling_word = f.read_u16()?;
            let level = f.read_u8()?;
            Buildings::from_words(building_word, dwelling_word) | Buildings::mage_guild(level)
        } else {
            f.skip(5)?;
            Self::default_buildings(difficulty, rng)
        };

        let troops = if f.read_bool()? {
            Some(read_troops(f)?)
        } else {
            f.skip(15)?;
            None
        };

        if f.read_bool()? {
            buildings |= Buildings::CAPTAIN;
        }

        f.skip(1)?;
        let name = f.read_string(NAME_LENGTH)?;
        let race = Race::playable(f.read_u8()?);

        if f.read_bool()? {
            buildings |= Buildings::CASTLE;
        }
        let allow_castle = f.read_u8()? == 0;

        Ok(Self {
            position: (0, 0),
            color,
            custom_buildings,
            buildings,
            troops,
            name,
            race,
            allow_castle,
        })
    }

    /// dwelling 1, and dwelling 2 with a chance falling with difficulty
    fn default_buildings<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Buildings {
        let chance = match difficulty {
            Difficulty::Easy => 75,
            Difficulty::Normal => 50,
            Difficulty::Hard => 25,
            Difficulty::Expert => 10,
            Difficulty::Impossible => 0,
        };
        let mut buildings = Buildings::DWELLING1;
        if rng.gen_range(0..100) < chance {
            buildings |= Buildings::DWELLING2;
        }
        buildings
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SecondarySkill {
    pub skill: u8,
    pub level: u8,
}


/// A hero standing on the map, or locked in a jail
#[derive(Debug, Clone, PartialEq)]
pub struct Hero {
    pub position: (u8, u8),
    pub color: Option<Color>,
    pub race: Option<Race>,
    pub jailed: bool,
    pub troops: Option<Vec<Troop>>,
    pub portrait: Option<u8>,
    pub artifacts: Vec<u8>,
    pub experience: u32,
    pub skills: Option<Vec<SecondarySkill>>,
    pub name: Option<String>,
    /// patrol radius, when the hero guards its spot
    pub patrol: Option<u8>,
}

impl Hero {
    pub fn read(data: &[u8], kind: ObjectType) -> Result<Self> {
        trace!("Hero::read");
        check_exact(kind, data, HERO_BLOCK_SIZE)?;
        let f = &mut ByteCursor::new(data);

        f.skip(1)?;
        let troops = if f.read_bool()? {
            Some(read_troops(f)?)
        } else {
            f.skip(15)?;
            None
        };

        let portrait = if f.read_bool()? {
            Some(f.read_u8()?)
        } else {
            f.skip(1)?;
            None
        };

        let artifacts = f.read(ARTIFACT_SLOTS)?.iter().copied().filter(|&a| a != 0xFF).collect();
        f.skip(1)?;
        let experience = f.read_u32()?;

        let skills = if f.read_bool()? {
            let ids = f.read(SKILL_SLOTS)?;
            let levels = f.read(SKILL_SLOTS)?;
            Some(ids.iter().zip(levels)
                .filter(|&(_, &level)| level != 0)
                .map(|(&skill, &level)| SecondarySkill { skill: skill.wrapping_add(1), level })
                .collect())
        } else {
            f.skip(16)?;
            None
        };

        f.skip(1)?;
        let name = if f.read_bool()? {
            Some(f.read_string(NAME_LENGTH)?)
        } else {
            f.skip(NAME_LENGTH)?;
            None
        };

        let patrol = if f.read_bool()? {
            Some(f.read_u8()?)
        } else {
            None
        };

        let jailed = kind == ObjectType::Jail;
        let race = if jailed { Race::playable(data[OFFSET_JAIL_RACE]) } else { None };

        Ok(Self {
            position: (0, 0),
            color: None,
            race,
            jailed,
            troops,
            portrait,
            artifacts,
            experience,
            skills,
            name,
            patrol,
        })
    }
}


/// Message of a sign or a bottle
#[derive(Debug, Clone, PartialEq)]
pub struct Sign {
    pub position: (u8, u8),
    pub message: String,
}

impl Sign {
    /// `None` when the block does not carry the sign marker
    pub fn read(data: &[u8], kind: ObjectType) -> Result<Option<Self>> {
        check_min(kind, data, SIGN_MIN_SIZE)?;
        if data[0] != 0x01 {
            return Ok(None);
        }
        let f = &mut ByteCursor::new(data);
        f.skip(9)?;
        Ok(Some(Self { position: (0, 0), message: f.read_zero_string()? }))
    }
}


/// Event placed on a map tile
#[derive(Debug, Clone, PartialEq)]
pub struct MapEvent {
    pub position: (u8, u8),
    pub resources: Resources,
    pub artifact: Option<u16>,
    pub computer: bool,
    pub cancel_after_first_visit: bool,
    pub colors: ColorSet,
    pub message: String,
}

impl MapEvent {
    pub fn read(data: &[u8], kind: ObjectType) -> Result<Option<Self>> {
        check_min(kind, data, EVENT_MIN_SIZE)?;
        if data[0] != 0x01 {
            return Ok(None);
        }
        let f = &mut ByteCursor::new(data);
        f.skip(1)?;

        let resources = Resources::read(f)?;
        let artifact = read_artifact(f)?;
        let computer = f.read_bool()?;
        let cancel_after_first_visit = f.read_bool()?;
        f.skip(10)?;
        let colors = ColorSet::read(f)?;
        let message = f.read_zero_string()?;

        Ok(Some(Self { position: (0, 0), resources, artifact, computer, cancel_after_first_visit, colors, message }))
    }
}


/// Sphinx riddle, answers are compared lowercased
#[derive(Debug, Clone, PartialEq)]
pub struct Riddle {
    pub position: (u8, u8),
    pub resources: Resources,
    pub artifact: Option<u16>,
    pub answers: Vec<String>,
    pub question: String,
}

impl Riddle {
    pub fn read(data: &[u8], kind: ObjectType) -> Result<Option<Self>> {
        check_min(kind, data, RIDDLE_MIN_SIZE)?;
        if data[0] != 0x00 {
            return Ok(None);
        }
        let f = &mut ByteCursor::new(data);
        f.skip(1)?;

        let resources = Resources::read(f)?;
        let artifact = read_artifact(f)?;

        let mut count = f.read_u8()? as usize;
        let mut answers = Vec::new();
        for _ in 0..ANSWER_SLOTS {
            let answer = f.read_string(ANSWER_LENGTH)?;
            if count > 0 && !answer.is_empty() {
                answers.push(answer.to_lowercase());
                count -= 1;
            }
        }
        let question = f.read_zero_string()?;

        Ok(Some(Self { position: (0, 0), resources, artifact, answers, question }))
    }

    pub fn accepts(&self, answer: &str) -> bool {
        let answer = answer.to_lowercase();
        self.answers.iter().any(|a| *a == answer)
    }
}


/// Event firing on a given day rather than on a tile
#[derive(Debug, Clone, PartialEq)]
pub struct EventDate {
    pub resources: Resources,
    pub computer: bool,
    pub first: u16,
    /// days between repetitions, 0 means once
    pub subsequent: u16,
    pub colors: ColorSet,
    pub message: String,
}

impl EventDate {
    pub fn matches(data: &[u8]) -> bool {
        data.len() >= EVENT_MIN_SIZE && data[0] == 0 && data[OFFSET_EVENT_DATE_MARK] == 1
    }

    pub fn read(data: &[u8]) -> Result<Self> {
        let f = &mut ByteCursor::new(data);
        f.skip(1)?;

        let resources = Resources::read(f)?;
        f.skip(2)?;
        let computer = f.read_bool()?;
        let first = f.read_u16()?;
        let subsequent = f.read_u16()?;
        f.skip(6)?;
        let colors = ColorSet::read(f)?;
        let message = f.read_zero_string()?;

        Ok(Self { resources, computer, first, subsequent, colors, message })
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct Rumor {
    pub text: String,
}

impl Rumor {
    pub fn matches(data: &[u8]) -> bool {
        data.len() >= RUMOR_MIN_SIZE && data[0] == 0 && data[OFFSET_RUMOR] != 0
    }

    pub fn read(data: &[u8]) -> Result<Self> {
        let f = &mut ByteCursor::new(data);
        f.seek(OFFSET_RUMOR)?;
        Ok(Self { text: f.read_zero_string()? })
    }
}


#[cfg(test)]
pub(crate) mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use super::*;

    pub(crate) fn castle_block(custom: bool) -> Vec<u8> {
        let mut block = vec![0u8; CASTLE_BLOCK_SIZE];
        block[0] = 3;
        if custom {
            block[1] = 1;
            block[2..4].copy_from_slice(&0x0406u16.to_le_bytes());
            block[4..6].copy_from_slice(&0x0218u16.to_le_bytes());
            block[6] = 2;
        }
        block[7] = 1;
        block[8] = 4;
        block[13..15].copy_from_slice(&25u16.to_le_bytes());
        block[23] = 1;
        block[25..32].copy_from_slice(b"Kaldorn");
        block[38] = 5;
        block[39] = 1;
        block[40] = 0;
        block
    }

    pub(crate) fn hero_block() -> Vec<u8> {
        let mut block = vec![0u8; HERO_BLOCK_SIZE];
        block[17] = 1;
        block[18] = 42;
        block[19..22].copy_from_slice(&[7, 0xFF, 12]);
        block[23..27].copy_from_slice(&1500u32.to_le_bytes());
        block[27] = 1;
        block[28] = 2;
        block[36] = 3;
        block[45] = 1;
        block[46..51].copy_from_slice(b"Dread");
        block[59] = 1;
        block[60] = 3;
        block
    }

    pub(crate) fn text_block(head: &[u8], offset: usize, text: &str, size: usize) -> Vec<u8> {
        let mut block = vec![0u8; size.max(offset + text.len() + 1)];
        block[..head.len()].copy_from_slice(head);
        block[offset..offset + text.len()].copy_from_slice(text.as_bytes());
        block
    }

    #[test]
    fn custom_castle() {
        let mut rng = StdRng::seed_from_u64(1);
        let castle = Castle::read(&castle_block(true), ObjectType::Castle, Difficulty::Normal, &mut rng).unwrap();

        assert_eq!(castle.color, Some(Color::Yellow));
        assert!(castle.custom_buildings);
        assert_eq!(castle.name, "Kaldorn");
        assert_eq!(castle.race, Some(Race::Necromancer));
        assert!(castle.allow_castle);
        assert_eq!(castle.troops, Some(vec![Troop { monster: 5, count: 25 }]));

        let expected = Buildings::THIEVES_GUILD | Buildings::TAVERN | Buildings::MARKETPLACE
            | Buildings::DWELLING1 | Buildings::DWELLING2 | Buildings::UPGRADE2
            | Buildings::MAGE_GUILD1 | Buildings::MAGE_GUILD2
            | Buildings::CAPTAIN | Buildings::CASTLE;
        assert_eq!(castle.buildings, expected);
    }

    #[test]
    fn default_castle_buildings_follow_difficulty() {
        let block = castle_block(false);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let castle = Castle::read(&block, ObjectType::RandomCastle, Difficulty::Impossible, &mut rng).unwrap();
            assert!(castle.buildings.contains(Buildings::DWELLING1));
            assert!(!castle.buildings.contains(Buildings::DWELLING2));
            assert!(!castle.buildings.intersects(Buildings::MAGE_GUILD1));
        }

        let with_second = (0..200)
            .filter(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let castle = Castle::read(&block, ObjectType::Castle, Difficulty::Easy, &mut rng).unwrap();
                castle.buildings.contains(Buildings::DWELLING2)
            })
            .count();
        assert!(with_second > 100);
    }

    #[test]
    fn castle_block_size_is_exact() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut block = castle_block(true);
        block.push(0);
        let result = Castle::read(&block, ObjectType::Castle, Difficulty::Easy, &mut rng);
        assert!(matches!(result, Err(Error::BlockSize { kind: ObjectType::Castle, expected: 0x46, found: 0x47 })));
    }

    #[test]
    fn hero_fields() {
        let hero = Hero::read(&hero_block(), ObjectType::Heroes).unwrap();
        assert_eq!(hero.portrait, Some(42));
        assert_eq!(hero.artifacts, vec![7, 12]);
        assert_eq!(hero.experience, 1500);
        assert_eq!(hero.skills, Some(vec![SecondarySkill { skill: 3, level: 3 }]));
        assert_eq!(hero.name.as_deref(), Some("Dread"));
        assert_eq!(hero.patrol, Some(3));
        assert_eq!(hero.troops, None);
        assert!(!hero.jailed);
        assert_eq!(hero.race, None);
    }

    #[test]
    fn jailed_hero_race() {
        let mut block = hero_block();
        block[59] = 0;
        block[OFFSET_JAIL_RACE] = 2;
        let hero = Hero::read(&block, ObjectType::Jail).unwrap();
        assert!(hero.jailed);
        assert_eq!(hero.race, Some(Race::Sorceress));
        assert_eq!(hero.patrol, None);
    }

    #[test]
    fn sign_and_wrong_marker() {
        let block = text_block(&[1], 9, "Beware", SIGN_MIN_SIZE);
        let sign = Sign::read(&block, ObjectType::Sign).unwrap().unwrap();
        assert_eq!(sign.message, "Beware");

        let block = text_block(&[0], 9, "Beware", SIGN_MIN_SIZE);
        assert_eq!(Sign::read(&block, ObjectType::Bottle).unwrap(), None);

        assert!(matches!(Sign::read(&[1, 0, 0], ObjectType::Sign), Err(Error::BlockSize { .. })));
    }

    #[test]
    fn map_event() {
        let mut block = text_block(&[1], 49, "Gold!", EVENT_MIN_SIZE);
        block[25..29].copy_from_slice(&500i32.to_le_bytes());
        block[29..31].copy_from_slice(&NO_ARTIFACT.to_le_bytes());
        block[32] = 1;
        block[43] = 1;
        block[45] = 1;

        let event = MapEvent::read(&block, ObjectType::Event).unwrap().unwrap();
        assert_eq!(event.resources.gold, 500);
        assert_eq!(event.artifact, None);
        assert!(!event.computer);
        assert!(event.cancel_after_first_visit);
        assert_eq!(event.colors, ColorSet::BLUE | ColorSet::RED);
        assert_eq!(event.message, "Gold!");
    }

    #[test]
    fn riddle_answers() {
        let mut block = text_block(&[0], 136, "What walks at night?", RIDDLE_MIN_SIZE);
        block[29..31].copy_from_slice(&4u16.to_le_bytes());
        block[31] = 2;
        block[32..38].copy_from_slice(b"Zombie");
        block[45..50].copy_from_slice(b"GHOST");
        block[58..63].copy_from_slice(b"ghoul");

        let riddle = Riddle::read(&block, ObjectType::Sphinx).unwrap().unwrap();
        assert_eq!(riddle.artifact, Some(4));
        assert_eq!(riddle.answers, vec!["zombie", "ghost"]);
        assert_eq!(riddle.question, "What walks at night?");
        assert!(riddle.accepts("Ghost"));
        assert!(!riddle.accepts("ghoul"));
    }

    #[test]
    fn dated_event_and_rumor() {
        let mut block = text_block(&[0], 48, "Harvest", EVENT_MIN_SIZE);
        block[32..34].copy_from_slice(&3u16.to_le_bytes());
        block[34..36].copy_from_slice(&7u16.to_le_bytes());
        block[OFFSET_EVENT_DATE_MARK] = 1;
        assert!(EventDate::matches(&block));
        let event = EventDate::read(&block).unwrap();
        assert_eq!((event.first, event.subsequent), (3, 7));
        assert!(event.colors.has(Color::Blue));
        assert_eq!(event.message, "Harvest");

        let block = text_block(&[0], OFFSET_RUMOR, "The sphinx lies", RUMOR_MIN_SIZE);
        assert!(!EventDate::matches(&block));
        assert!(Rumor::matches(&block));
        assert_eq!(Rumor::read(&block).unwrap().text, "The sphinx lies");

        assert!(!Rumor::matches(&[0u8; 12]));
    }
}
