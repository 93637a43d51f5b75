//! Worker Configuration
//!
//! Process-wide immutable configuration for the offline cache manager:
//! the two versioned partition names, the shell asset manifest, the curated
//! font list, and the font CDN location. Initialized once at startup and
//! never mutated; `Default` carries the production TAAG values.

use serde::{Deserialize, Serialize};

/// Active shell partition name. Bump the version suffix to orphan the old
/// partition on the next activation.
pub const SHELL_CACHE_NAME: &str = "taag-cache-v1";

/// Active font partition name.
pub const FONT_CACHE_NAME: &str = "taag-fonts-v1";

/// Shell assets required for offline bootstrap.
const DEFAULT_ASSETS: &[&str] = &["/", "/index.html", "/manifest.json", "/app.js", "/app.css"];

/// Popular fonts pre-cached at install time.
const DEFAULT_FONTS: &[&str] = &[
    "Standard",
    "Graffiti",
    "ANSI Shadow",
    "Slant",
    "Small",
    "Big",
    "Banner",
    "Poison",
    "Ghost",
    "Doom",
];

/// Base URL the curated font names resolve against.
const DEFAULT_FONT_CDN: &str = "https://unpkg.com/figlet/fonts/";

/// Offline cache manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the shell partition.
    pub shell_cache_name: String,
    /// Name of the font partition.
    pub font_cache_name: String,
    /// Root-relative URLs that must be fetchable at install time.
    pub asset_manifest: Vec<String>,
    /// Font names pre-cached at install time (best-effort).
    pub precache_fonts: Vec<String>,
    /// Base URL for font definition files.
    pub font_cdn_base: String,
    /// Document served to HTML requests that miss both network and cache.
    pub offline_fallback: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            shell_cache_name: String::from(SHELL_CACHE_NAME),
            font_cache_name: String::from(FONT_CACHE_NAME),
            asset_manifest: DEFAULT_ASSETS.iter().map(|s| String::from(*s)).collect(),
            precache_fonts: DEFAULT_FONTS.iter().map(|s| String::from(*s)).collect(),
            font_cdn_base: String::from(DEFAULT_FONT_CDN),
            offline_fallback: String::from("/"),
        }
    }
}

impl WorkerConfig {
    /// Load a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolve a font name to its CDN URL (`<base><name>.flf`).
    pub fn font_url(&self, name: &str) -> String {
        format!("{}{}.flf", self.font_cdn_base, name)
    }

    /// Whether a URL addresses the font CDN path this worker manages.
    pub fn is_font_request(&self, url: &str) -> bool {
        let pattern = self
            .font_cdn_base
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        !pattern.is_empty() && url.contains(pattern)
    }
}
