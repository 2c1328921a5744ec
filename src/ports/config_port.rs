//! Configuration access port trait.

/// Raw string lookups into a sectioned key/value configuration.
///
/// Typed parsing and validation live in `domain::config_validation`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
