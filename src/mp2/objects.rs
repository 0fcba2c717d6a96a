use crate::error::{Error, Result};


// Every action object (0x80..=0xFF) has a non-action twin 0x80 below it,
// the twin marks the remaining tiles of a multi tile object.
macro_rules! object_types {
    (
        $($plain:ident = $plain_value:literal,)*
        ;
        $(($action:ident, $non_action:ident) = $value:literal,)*
    ) => {
        /// The closed set of object kinds a map tile can carry
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum ObjectType {
            $($plain = $plain_value,)*
            $($action = $value, $non_action = $value - 0x80,)*
        }

        impl ObjectType {
            pub const ALL: &'static [ObjectType] = &[
                $(ObjectType::$plain,)*
                $(ObjectType::$action, ObjectType::$non_action,)*
            ];
        }
    };
}

object_types! {
    Nothing = 0x00,
    Coast = 0x1C,
    ;
    (AlchemyLab, NonActionAlchemyLab) = 0x81,
    (Sign, NonActionSign) = 0x82,
    (Buoy, NonActionBuoy) = 0x83,
    (Skeleton, NonActionSkeleton) = 0x84,
    (DaemonCave, NonActionDaemonCave) = 0x85,
    (TreasureChest, NonActionTreasureChest) = 0x86,
    (FaerieRing, NonActionFaerieRing) = 0x87,
    (Campfire, NonActionCampfire) = 0x88,
    (Fountain, NonActionFountain) = 0x89,
    (Gazebo, NonActionGazebo) = 0x8A,
    (AncientLamp, NonActionAncientLamp) = 0x8B,
    (Graveyard, NonActionGraveyard) = 0x8C,
    (ArcherHouse, NonActionArcherHouse) = 0x8D,
    (GoblinHut, NonActionGoblinHut) = 0x8E,
    (DwarfCottage, NonActionDwarfCottage) = 0x8F,
    (PeasantHut, NonActionPeasantHut) = 0x90,
    (Event, NonActionEvent) = 0x93,
    (DragonCity, NonActionDragonCity) = 0x94,
    (Lighthouse, NonActionLighthouse) = 0x95,
    (WaterWheel, NonActionWaterWheel) = 0x96,
    (Mines, NonActionMines) = 0x97,
    (Monster, NonActionMonster) = 0x98,
    (Obelisk, NonActionObelisk) = 0x99,
    (Oasis, NonActionOasis) = 0x9A,
    (Resource, NonActionResource) = 0x9B,
    (Sawmill, NonActionSawmill) = 0x9D,
    (Oracle, NonActionOracle) = 0x9E,
    (ShrineFirstCircle, NonActionShrineFirstCircle) = 0x9F,
    (Shipwreck, NonActionShipwreck) = 0xA0,
    (DesertTent, NonActionDesertTent) = 0xA2,
    (Castle, NonActionCastle) = 0xA3,
    (StoneLiths, NonActionStoneLiths) = 0xA4,
    (WagonCamp, NonActionWagonCamp) = 0xA5,
    (Whirlpool, NonActionWhirlpool) = 0xA7,
    (Windmill, NonActionWindmill) = 0xA8,
    (Artifact, NonActionArtifact) = 0xA9,
    (Boat, NonActionBoat) = 0xAB,
    (RandomUltimateArtifact, NonActionRandomUltimateArtifact) = 0xAC,
    (RandomArtifact, NonActionRandomArtifact) = 0xAD,
    (RandomResource, NonActionRandomResource) = 0xAE,
    (RandomMonster, NonActionRandomMonster) = 0xAF,
    (RandomTown, NonActionRandomTown) = 0xB0,
    (RandomCastle, NonActionRandomCastle) = 0xB1,
    (RandomMonsterWeak, NonActionRandomMonsterWeak) = 0xB3,
    (RandomMonsterMedium, NonActionRandomMonsterMedium) = 0xB4,
    (RandomMonsterStrong, NonActionRandomMonsterStrong) = 0xB5,
    (RandomMonsterVeryStrong, NonActionRandomMonsterVeryStrong) = 0xB6,
    (Heroes, NonActionHeroes) = 0xB7,
    (NothingSpecial, NonActionNothingSpecial) = 0xB8,
    (WatchTower, NonActionWatchTower) = 0xBA,
    (TreeHouse, NonActionTreeHouse) = 0xBB,
    (TreeCity, NonActionTreeCity) = 0xBC,
    (Ruins, NonActionRuins) = 0xBD,
    (Fort, NonActionFort) = 0xBE,
    (TradingPost, NonActionTradingPost) = 0xBF,
    (AbandonedMine, NonActionAbandonedMine) = 0xC0,
    (ThatchedHut, NonActionThatchedHut) = 0xC1,
    (StandingStones, NonActionStandingStones) = 0xC2,
    (Idol, NonActionIdol) = 0xC3,
    (TreeOfKnowledge, NonActionTreeOfKnowledge) = 0xC4,
    (WitchDoctorsHut, NonActionWitchDoctorsHut) = 0xC5,
    (Temple, NonActionTemple) = 0xC6,
    (HillFort, NonActionHillFort) = 0xC7,
    (HalflingHole, NonActionHalflingHole) = 0xC8,
    (MercenaryCamp, NonActionMercenaryCamp) = 0xC9,
    (ShrineSecondCircle, NonActionShrineSecondCircle) = 0xCA,
    (ShrineThirdCircle, NonActionShrineThirdCircle) = 0xCB,
    (Pyramid, NonActionPyramid) = 0xCC,
    (CityOfDead, NonActionCityOfDead) = 0xCD,
    (Excavation, NonActionExcavation) = 0xCE,
    (Sphinx, NonActionSphinx) = 0xCF,
    (Wagon, NonActionWagon) = 0xD0,
    (TarPit, NonActionTarPit) = 0xD1,
    (ArtesianSpring, NonActionArtesianSpring) = 0xD2,
    (TrollBridge, NonActionTrollBridge) = 0xD3,
    (WateringHole, NonActionWateringHole) = 0xD4,
    (WitchsHut, NonActionWitchsHut) = 0xD5,
    (Xanadu, NonActionXanadu) = 0xD6,
    (Cave, NonActionCave) = 0xD7,
    (LeanTo, NonActionLeanTo) = 0xD8,
    (MagellansMaps, NonActionMagellansMaps) = 0xD9,
    (Flotsam, NonActionFlotsam) = 0xDA,
    (DerelictShip, NonActionDerelictShip) = 0xDB,
    (ShipwreckSurvivor, NonActionShipwreckSurvivor) = 0xDC,
    (Bottle, NonActionBottle) = 0xDD,
    (MagicWell, NonActionMagicWell) = 0xDE,
    (MagicGarden, NonActionMagicGarden) = 0xDF,
    (ObservationTower, NonActionObservationTower) = 0xE0,
    (FreemansFoundry, NonActionFreemansFoundry) = 0xE1,
    (Trees, NonActionTrees) = 0xE4,
    (Mounts, NonActionMounts) = 0xE5,
    (Volcano, NonActionVolcano) = 0xE6,
    (Flowers, NonActionFlowers) = 0xE7,
    (Stones, NonActionStones) = 0xE8,
    (WaterLake, NonActionWaterLake) = 0xE9,
    (Mandrake, NonActionMandrake) = 0xEA,
    (DeadTree, NonActionDeadTree) = 0xEB,
    (Stump, NonActionStump) = 0xEC,
    (Crater, NonActionCrater) = 0xED,
    (Cactus, NonActionCactus) = 0xEE,
    (Mound, NonActionMound) = 0xEF,
    (Dune, NonActionDune) = 0xF0,
    (LavaPool, NonActionLavaPool) = 0xF1,
    (Shrub, NonActionShrub) = 0xF2,
    (Arena, NonActionArena) = 0xF3,
    (BarrowMounds, NonActionBarrowMounds) = 0xF4,
    (RandomArtifactTreasure, NonActionRandomArtifactTreasure) = 0xF5,
    (RandomArtifactMinor, NonActionRandomArtifactMinor) = 0xF6,
    (RandomArtifactMajor, NonActionRandomArtifactMajor) = 0xF7,
    (Barrier, NonActionBarrier) = 0xF8,
    (TravellerTent, NonActionTravellerTent) = 0xF9,
    (Jail, NonActionJail) = 0xFB,
    (FireAltar, NonActionFireAltar) = 0xFC,
    (AirAltar, NonActionAirAltar) = 0xFD,
    (EarthAltar, NonActionEarthAltar) = 0xFE,
    (WaterAltar, NonActionWaterAltar) = 0xFF,
}


const LOOKUP: [Option<ObjectType>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < ObjectType::ALL.len() {
        table[ObjectType::ALL[i] as usize] = Some(ObjectType::ALL[i]);
        i += 1;
    }
    table
};


impl TryFrom<u8> for ObjectType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        LOOKUP[value as usize].ok_or(Error::UnknownObjectType(value))
    }
}


impl ObjectType {
    #[inline]
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// the hero can interact with the object by stepping on it
    #[inline]
    pub fn is_action(self) -> bool {
        self.raw() & 0x80 != 0
    }

    /// objects whose details live in a trailing block of the map file
    pub fn owns_block(self) -> bool {
        matches!(self,
            Self::Castle | Self::RandomTown | Self::RandomCastle |
            Self::Heroes | Self::Sign | Self::Bottle | Self::Event |
            Self::Sphinx | Self::Jail)
    }

    pub fn is_town(self) -> bool {
        matches!(self, Self::Castle | Self::RandomTown | Self::RandomCastle)
    }
}
