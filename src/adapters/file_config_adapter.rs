//! INI file configuration adapter.
//!
//! Section and key names are case-sensitive so ticker symbols such as
//! `[asset.AAPL]` or `AAPL/MSFT = 0.6` keep their spelling.

use crate::domain::error::SignalfolioError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SignalfolioError> {
        let path = path.as_ref();
        let mut config = Ini::new_cs();
        config
            .load(path)
            .map_err(|reason| SignalfolioError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        debug!(file = %path.display(), sections = config.sections().len(), "config loaded");
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SignalfolioError> {
        let mut config = Ini::new_cs();
        config
            .read(content.to_string())
            .map_err(|reason| SignalfolioError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(section)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn sections(&self) -> Vec<String> {
        let mut sections = self.config.sections();
        sections.sort();
        sections
    }

    fn has_section(&self, section: &str) -> bool {
        self.config.get_map_ref().contains_key(section)
    }
}
