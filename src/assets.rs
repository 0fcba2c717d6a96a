use std::sync::Arc;
use log::{info, trace};

use crate::agg::{Archive, Palette, Sprite, SpriteCache};
use crate::config::AssetConfig;
use crate::error::Result;


/// Caller owned handle to the game data: the archive, its palette and the sprites decoded so far.
/// Build one and pass it around, there is no global default.
pub struct Assets {
    pub archive: Archive,
    pub palette: Palette,
    pub sprites: SpriteCache,
}


impl Assets {
    pub fn open(config: &AssetConfig) -> Result<Self> {
        trace!("Assets::open");
        let archive = Archive::open(&config.archive_path())?;
        let assets = Self::from_archive(archive, &config.palette)?;
        info!("{:?} opened, {} records", config.archive_path(), assets.archive.number_of_records());
        Ok(assets)
    }

    pub fn from_archive(archive: Archive, palette: &str) -> Result<Self> {
        let palette = Palette::from_bytes(archive.read(palette)?)?;
        Ok(Self {
            archive,
            palette,
            sprites: SpriteCache::new(),
        })
    }

    /// all sprites of an icon group, decoding it on first use
    pub fn sprites(&self, group: &str) -> Result<Vec<Arc<Sprite>>> {
        self.sprites.load(group, &self.archive)?;
        Ok(self.sprites.all_sprites(group))
    }

    pub fn sprite(&self, group: &str, index: usize) -> Result<Option<Arc<Sprite>>> {
        self.sprites.load(group, &self.archive)?;
        Ok(self.sprites.sprite_at(group, index))
    }
}
