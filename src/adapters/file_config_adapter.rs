//! INI file configuration adapter.

use crate::domain::error::OptbenchError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OptbenchError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| OptbenchError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, OptbenchError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| OptbenchError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn non_blank(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .filter(|v| !v.trim().is_empty())
    }
}

fn invalid(section: &str, key: &str, reason: String) -> OptbenchError {
    OptbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, OptbenchError> {
        if self.non_blank(section, key).is_none() {
            return Ok(None);
        }
        self.config
            .getfloat(section, key)
            .map_err(|reason| invalid(section, key, reason))
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, OptbenchError> {
        match self.non_blank(section, key) {
            None => Ok(None),
            Some(v) => Self::parse_bool(&v).map(Some).ok_or_else(|| {
                invalid(
                    section,
                    key,
                    format!("expected true/false/yes/no/on/off/1/0, got {:?}", v),
                )
            }),
        }
    }
}
