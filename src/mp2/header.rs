use bitflags::bitflags;
use log::trace;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};


pub const MP2_MAGIC: u32 = 0x5C00_0000;

// fixed offsets of the metadata block
const OFFSET_VICTORY: usize = 0x1D;
const OFFSET_VICTORY_PARAM2: usize = 0x2C;
const OFFSET_DEFEAT: usize = 0x22;
const OFFSET_DEFEAT_PARAM2: usize = 0x2E;
const OFFSET_START_WITH_HERO: usize = 0x25;
const OFFSET_NAME: usize = 0x3A;
const OFFSET_DESCRIPTION: usize = 0x76;

const NAME_LENGTH: usize = 16;
const DESCRIPTION_LENGTH: usize = 143;


#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
    Impossible,
}

impl TryFrom<u16> for Difficulty {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Easy),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Expert),
            4 => Ok(Self::Impossible),
            _ => Err(Error::UnknownDifficulty(value)),
        }
    }
}


/// side length of the square world
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapSize {
    Small = 36,
    Medium = 72,
    Large = 108,
    ExtraLarge = 144,
}

impl MapSize {
    pub fn from_side(side: i64) -> Result<Self> {
        match side {
            36 => Ok(Self::Small),
            72 => Ok(Self::Medium),
            108 => Ok(Self::Large),
            144 => Ok(Self::ExtraLarge),
            _ => Err(Error::UnknownMapSize(side)),
        }
    }

    #[inline]
    pub fn side(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn tiles(self) -> usize {
        self.side() * self.side()
    }
}


/// player colors, in the order the file stores per color tables
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Blue,
    Green,
    Red,
    Yellow,
    Orange,
    Purple,
}

impl Color {
    pub const ALL: [Color; 6] = [Color::Blue, Color::Green, Color::Red, Color::Yellow, Color::Orange, Color::Purple];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}


bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ColorSet: u8 {
        const BLUE   = 1 << 0;
        const GREEN  = 1 << 1;
        const RED    = 1 << 2;
        const YELLOW = 1 << 3;
        const ORANGE = 1 << 4;
        const PURPLE = 1 << 5;
    }
}

impl ColorSet {
    pub fn from_color(color: Color) -> Self {
        Self::from_bits_truncate(1 << color as u8)
    }

    pub fn has(&self, color: Color) -> bool {
        self.contains(Self::from_color(color))
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(|&color| self.has(color))
    }

    /// six flag bytes, one per color, non zero means present
    pub fn read(f: &mut ByteCursor) -> Result<Self> {
        let mut set = Self::empty();
        for color in Color::ALL {
            if f.read_u8()? != 0 {
                set |= Self::from_color(color);
            }
        }
        Ok(set)
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Race {
    Knight,
    Barbarian,
    Sorceress,
    Warlock,
    Wizard,
    Necromancer,
    Multi,
    Random,
    Neutral,
}

impl TryFrom<u8> for Race {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Knight),
            0x01 => Ok(Self::Barbarian),
            0x02 => Ok(Self::Sorceress),
            0x03 => Ok(Self::Warlock),
            0x04 => Ok(Self::Wizard),
            0x05 => Ok(Self::Necromancer),
            0x06 => Ok(Self::Multi),
            0x07 => Ok(Self::Random),
            0xFF => Ok(Self::Neutral),
            _ => Err(Error::UnknownRace(value)),
        }
    }
}

impl Race {
    /// the six playable races, the only values castle and hero blocks name explicitly
    pub fn playable(value: u8) -> Option<Self> {
        match value {
            0x00..=0x05 => Self::try_from(value).ok(),
            _ => None,
        }
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VictoryCondition {
    DefeatAllEnemies,
    CaptureTown { x: u16, y: u16 },
    DefeatHero { x: u16, y: u16 },
    FindArtifact { artifact: u16 },
    SideWins { side: u16 },
    AccumulateGold { gold: u32 },
}

impl VictoryCondition {
    fn new(kind: u8, param1: u16, param2: u16) -> Result<Self> {
        match kind {
            0 => Ok(Self::DefeatAllEnemies),
            1 => Ok(Self::CaptureTown { x: param1, y: param2 }),
            2 => Ok(Self::DefeatHero { x: param1, y: param2 }),
            3 => Ok(Self::FindArtifact { artifact: param1 }),
            4 => Ok(Self::SideWins { side: param1 }),
            // stored in thousands
            5 => Ok(Self::AccumulateGold { gold: param1 as u32 * 1000 }),
            _ => Err(Error::UnknownVictoryCondition(kind)),
        }
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DefeatCondition {
    LoseEverything,
    LoseTown { x: u16, y: u16 },
    LoseHero { x: u16, y: u16 },
    TimeExpires { days: u16 },
}

impl DefeatCondition {
    fn new(kind: u8, param1: u16, param2: u16) -> Result<Self> {
        match kind {
            0 => Ok(Self::LoseEverything),
            1 => Ok(Self::LoseTown { x: param1, y: param2 }),
            2 => Ok(Self::LoseHero { x: param1, y: param2 }),
            3 => Ok(Self::TimeExpires { days: param1 }),
            _ => Err(Error::UnknownDefeatCondition(kind)),
        }
    }
}


/// Metadata block at the start of an mp2 file
#[derive(Debug, Clone, PartialEq)]
pub struct MapHeader {
    pub difficulty: Difficulty,
    pub size: MapSize,
    pub kingdom_colors: ColorSet,
    pub human_colors: ColorSet,
    pub computer_colors: ColorSet,
    pub victory: VictoryCondition,
    pub computer_can_win_using_victory_condition: bool,
    pub allow_normal_victory: bool,
    pub defeat: DefeatCondition,
    pub start_with_hero: bool,
    races: [Race; 6],
    pub name: String,
    pub description: String,
}


impl MapHeader {
    pub fn read(f: &mut ByteCursor) -> Result<Self> {
        trace!("MapHeader::read");
        f.seek(0)?;

        let magic = f.read_u32_be()?;
        if magic != MP2_MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let difficulty = Difficulty::try_from(f.read_u16()?)?;

        // a side of 144 does not fit into a signed byte, read them unsigned
        let width = f.read_u8()? as i64;
        let height = f.read_u8()? as i64;
        if width != height {
            return Err(Error::NotSquare { width, height });
        }
        let size = MapSize::from_side(width)?;

        let kingdom_colors = ColorSet::read(f)?;
        let human_colors = ColorSet::read(f)?;
        let computer_colors = ColorSet::read(f)?;

        f.seek(OFFSET_VICTORY)?;
        let victory_kind = f.read_u8()?;
        let computer_can_win_using_victory_condition = f.read_bool()?;
        let allow_normal_victory = f.read_bool()?;
        let victory_param1 = f.read_u16()?;
        f.seek(OFFSET_VICTORY_PARAM2)?;
        let victory_param2 = f.read_u16()?;
        let victory = VictoryCondition::new(victory_kind, victory_param1, victory_param2)?;

        f.seek(OFFSET_DEFEAT)?;
        let defeat_kind = f.read_u8()?;
        let defeat_param1 = f.read_u16()?;
        f.seek(OFFSET_DEFEAT_PARAM2)?;
        let defeat_param2 = f.read_u16()?;
        let defeat = DefeatCondition::new(defeat_kind, defeat_param1, defeat_param2)?;

        // zero means every player starts with a hero, the race table follows directly
        f.seek(OFFSET_START_WITH_HERO)?;
        let start_with_hero = f.read_u8()? == 0;
        let mut races = [Race::Neutral; 6];
        for race in races.iter_mut() {
            *race = Race::try_from(f.read_u8()?)?;
        }

        f.seek(OFFSET_NAME)?;
        let name = f.read_string(NAME_LENGTH)?;
        f.seek(OFFSET_DESCRIPTION)?;
        let description = f.read_string(DESCRIPTION_LENGTH)?;

        Ok(Self {
            difficulty,
            size,
            kingdom_colors,
            human_colors,
            computer_colors,
            victory,
            computer_can_win_using_victory_condition,
            allow_normal_victory,
            defeat,
            start_with_hero,
            races,
            name,
            description,
        })
    }

    pub fn race_of(&self, color: Color) -> Race {
        self.races[color as usize]
    }
}


#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const HEADER_SIZE: usize = OFFSET_DESCRIPTION + DESCRIPTION_LENGTH;

    /// a header shaped like the one of "Pandemonium"
    pub(crate) fn build_header(side: u8) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MP2_MAGIC.to_be_bytes());
        out[4..6].copy_from_slice(&2u16.to_le_bytes());
        out[6] = side;
        out[7] = side;
        // kingdoms, humans, computers
        out[8..14].copy_from_slice(&[1, 1, 1, 1, 0, 0]);
        out[14..20].copy_from_slice(&[1, 1, 1, 1, 0, 0]);
        out[20..26].copy_from_slice(&[1, 1, 1, 1, 0, 0]);

        out[OFFSET_VICTORY] = 5;
        out[OFFSET_VICTORY + 1] = 0;
        out[OFFSET_VICTORY + 2] = 1;
        out[0x20..0x22].copy_from_slice(&200u16.to_le_bytes());
        out[OFFSET_DEFEAT] = 1;
        out[0x23..0x25].copy_from_slice(&19u16.to_le_bytes());
        out[OFFSET_DEFEAT_PARAM2..OFFSET_DEFEAT_PARAM2 + 2].copy_from_slice(&4u16.to_le_bytes());
        out[OFFSET_START_WITH_HERO] = 1;
        out[0x26..0x2C].copy_from_slice(&[7, 7, 7, 5, 0xFF, 0xFF]);

        let name = b"Pandemonium";
        out[OFFSET_NAME..OFFSET_NAME + name.len()].copy_from_slice(name);
        let description = b"Lead the undead.";
        out[OFFSET_DESCRIPTION..OFFSET_DESCRIPTION + description.len()].copy_from_slice(description);
        out
    }

    #[test]
    fn reads_header() {
        let data = build_header(36);
        let header = MapHeader::read(&mut ByteCursor::new(&data)).unwrap();

        assert_eq!(header.name, "Pandemonium");
        assert_eq!(header.description, "Lead the undead.");
        assert_eq!(header.size, MapSize::Small);
        assert_eq!(header.difficulty, Difficulty::Hard);
        assert_eq!(header.victory, VictoryCondition::AccumulateGold { gold: 200_000 });
        assert_eq!(header.defeat, DefeatCondition::LoseTown { x: 19, y: 4 });
        assert!(!header.computer_can_win_using_victory_condition);
        assert!(header.allow_normal_victory);
        assert!(!header.start_with_hero);

        assert_eq!(header.race_of(Color::Yellow), Race::Necromancer);
        assert_eq!(header.race_of(Color::Orange), Race::Neutral);
        assert_eq!(header.race_of(Color::Purple), Race::Neutral);
        for color in [Color::Blue, Color::Green, Color::Red] {
            assert_eq!(header.race_of(color), Race::Random);
        }

        assert_eq!(header.kingdom_colors.colors().count(), 4);
        assert!(header.human_colors.has(Color::Yellow));
        assert!(!header.computer_colors.has(Color::Purple));
    }

    #[test]
    fn extra_large_side() {
        let data = build_header(144);
        let header = MapHeader::read(&mut ByteCursor::new(&data)).unwrap();
        assert_eq!(header.size, MapSize::ExtraLarge);
        assert_eq!(header.size.tiles(), 144 * 144);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = build_header(36);
        data[0] = 0x5D;
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::BadMagic(0x5D00_0000))));
    }

    #[test]
    fn rejects_non_square() {
        let mut data = build_header(36);
        data[7] = 72;
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::NotSquare { width: 36, height: 72 })));
    }

    #[test]
    fn rejects_unknown_size() {
        let data = build_header(40);
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::UnknownMapSize(40))));
    }

    #[test]
    fn rejects_unknown_race() {
        let mut data = build_header(36);
        data[0x27] = 9;
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::UnknownRace(9))));
    }

    #[test]
    fn rejects_unknown_difficulty() {
        let mut data = build_header(36);
        data[4] = 5;
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::UnknownDifficulty(5))));
    }

    #[test]
    fn rejects_unknown_conditions() {
        let mut data = build_header(36);
        data[OFFSET_VICTORY] = 6;
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::UnknownVictoryCondition(6))));

        let mut data = build_header(36);
        data[OFFSET_DEFEAT] = 4;
        assert!(matches!(MapHeader::read(&mut ByteCursor::new(&data)), Err(Error::UnknownDefeatCondition(4))));
    }
}
