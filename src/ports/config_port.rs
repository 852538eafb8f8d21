//! Configuration access port trait.

/// Read-only lookup by `[section] key`. Typed parsing and defaults are the
/// caller's concern so a malformed value is reported rather than ignored.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
