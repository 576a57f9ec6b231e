//! Configuration to acknowledge host preferences as well as set defaults.
//!
//! Specifically, we try to find a sector.toml, and if present we load
//! settings from there. This provides the navigation wraparound flag and the
//! demo's scroll granularity. `loop` being a Rust keyword, the wraparound
//! key is spelled `loop_navigation`.

use facet::Facet;
use std::fs;
use std::path::Path;

#[derive(Facet, Clone)]
/// Host preferences loaded from sector.toml or falling back to defaults.
pub struct Config {
    #[facet(default = true)]
    /// Whether `next`/`prev` wrap around the section boundary.
    pub loop_navigation: bool,
    #[facet(default = 3)]
    /// Rows scrolled per keypress in the demo host.
    pub scroll_step: usize,
}

impl Config {
    #[must_use]
    /// Load configuration from sector.toml if present.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(Path::new("sector.toml"))
    }

    #[must_use]
    /// Load configuration from an explicit path, falling back to defaults
    /// if the file is missing or malformed.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                return config;
            }
        }
        facet_toml::from_str::<Self>("").unwrap()
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
