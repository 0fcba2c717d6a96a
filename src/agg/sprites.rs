use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::debug;

use crate::agg::archive::Archive;
use crate::agg::icn::{decode_icn_group, Sprite};
use crate::error::{Error, Result};


/// SpriteCache stores decoded sprites grouped by icon group name (`"OBJNTWRD.ICN"`).
/// Groups are decoded at most once, population happens under the write lock
/// so the cache can be shared between threads.
#[derive(Default)]
pub struct SpriteCache {
    groups: RwLock<HashMap<String, Vec<Arc<Sprite>>>>,
}


impl SpriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    // a panic in another reader cannot leave the map half written, so a poisoned lock is still usable
    fn read_groups(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Arc<Sprite>>>> {
        self.groups.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_groups(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Arc<Sprite>>>> {
        self.groups.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// replaces whatever is stored for the group
    pub fn add(&self, group: &str, sprites: Vec<Sprite>) {
        let sprites = sprites.into_iter().map(Arc::new).collect();
        self.write_groups().insert(group_key(group), sprites);
    }

    pub fn sprite_count(&self, group: &str) -> usize {
        self.read_groups().get(&group_key(group)).map_or(0, Vec::len)
    }

    pub fn has_sprites(&self, group: &str) -> bool {
        self.sprite_count(group) > 0
    }

    pub fn sprite_at(&self, group: &str, index: usize) -> Option<Arc<Sprite>> {
        self.read_groups().get(&group_key(group))?.get(index).cloned()
    }

    pub fn all_sprites(&self, group: &str) -> Vec<Arc<Sprite>> {
        self.read_groups().get(&group_key(group)).cloned().unwrap_or_default()
    }

    /// Returns the highest sprite index of the group, reading and decoding it from the archive
    /// on first access. Loading has a visible side effect: the group stays cached afterwards.
    pub fn max_index_for(&self, group: &str, archive: &Archive) -> Result<usize> {
        let count = self.load(group, archive)?;
        Ok(count - 1)
    }

    /// makes sure the group is cached and returns its sprite count, which is never zero
    pub fn load(&self, group: &str, archive: &Archive) -> Result<usize> {
        let key = group_key(group);

        if let Some(sprites) = self.read_groups().get(&key) {
            if !sprites.is_empty() {
                return Ok(sprites.len());
            }
        }

        let mut groups = self.write_groups();
        // somebody could have loaded it between the two locks
        if let Some(sprites) = groups.get(&key) {
            if !sprites.is_empty() {
                return Ok(sprites.len());
            }
        }

        let sprites = decode_icn_group(archive.read(&key)?)?;
        if sprites.is_empty() {
            return Err(Error::SpriteLoad(format!("{key} has no sprites")));
        }

        debug!("icon group {key} loaded, {} sprites", sprites.len());
        let count = sprites.len();
        groups.insert(key, sprites.into_iter().map(Arc::new).collect());

        Ok(count)
    }
}


fn group_key(group: &str) -> String {
    group.to_ascii_uppercase()
}
