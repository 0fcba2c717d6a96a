use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};


/// Where the game data lives and how to load it. Every field may be omitted in the json file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub data_dir: PathBuf,
    pub archive: String,
    pub palette: String,
    /// seed for the difficulty dependent castle defaults, random when absent
    pub random_seed: Option<u64>,
}


impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            archive: "HEROES2.AGG".to_string(),
            palette: "KB.PAL".to_string(),
            random_seed: None,
        }
    }
}


impl AssetConfig {
    pub fn load(file_name: &Path) -> Result<Self> {
        let state = fs::read_to_string(file_name)?;
        let config: Self = serde_json::from_str(&state)?;

        if config.archive.is_empty() {
            return Err(Error::Config(format!("{file_name:?}: archive name is empty")));
        }
        Ok(config)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(&self.archive)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AssetConfig = serde_json::from_str(r#"{"data_dir": "/games/h2", "random_seed": 7}"#).unwrap();
        assert_eq!(config.archive, "HEROES2.AGG");
        assert_eq!(config.palette, "KB.PAL");
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.archive_path(), PathBuf::from("/games/h2/HEROES2.AGG"));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("heroes_data_config_{}.json", std::process::id()));
        fs::write(&path, r#"{"archive": "HEROES2X.AGG"}"#).unwrap();
        let config = AssetConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.archive, "HEROES2X.AGG");
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn rejects_empty_archive_name() {
        let path = std::env::temp_dir().join(format!("heroes_data_config_empty_{}.json", std::process::id()));
        fs::write(&path, r#"{"archive": ""}"#).unwrap();
        let result = AssetConfig::load(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::Config(_))));
    }
}
