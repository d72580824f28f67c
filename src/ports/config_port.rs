//! Configuration access port trait.

use crate::domain::error::OptbenchError;

/// Sectioned key/value lookup.
///
/// Typed getters return `Ok(None)` for a missing or blank key and
/// `ConfigInvalid` for a value that is present but does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, OptbenchError>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, OptbenchError>;

    fn has_key(&self, section: &str, key: &str) -> bool {
        self.get_string(section, key)
            .is_some_and(|v| !v.trim().is_empty())
    }
}
