//! Configuration access port trait.
//!
//! Values are raw strings looked up by INI-style section and key; typing and
//! validation live in [`crate::domain::config`].

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Keys present in `section`, sorted.
    fn keys(&self, section: &str) -> Vec<String>;

    /// Section names, sorted.
    fn sections(&self) -> Vec<String>;

    fn has_section(&self, section: &str) -> bool;
}
