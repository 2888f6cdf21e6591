use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use viewfinder_core::equalize::DEFAULT_CLIP_FRACTION;
use viewfinder_core::Mode;

/// Pipeline configuration: defaults, then an optional TOML file, then
/// `VIEWFINDER_*` environment variables. CLI flags are applied last by the
/// caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Frame width in pixels (default: 320, the preview size).
    pub width: u32,
    /// Frame height in pixels (default: 240).
    pub height: u32,
    /// Decode path for each frame.
    pub mode: Mode,
    /// Fraction of the frame's pixels a single luma bin may hold before
    /// further samples are dropped from the equalization histogram.
    pub clip_fraction: f64,
    /// Whether to compute per-channel statistics for each frame.
    pub compute_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            mode: Mode::Original,
            clip_fraction: DEFAULT_CLIP_FRACTION,
            compute_stats: true,
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply `VIEWFINDER_*` overrides fetched through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.width = override_or(&lookup, "VIEWFINDER_WIDTH", self.width);
        self.height = override_or(&lookup, "VIEWFINDER_HEIGHT", self.height);
        self.mode = override_or(&lookup, "VIEWFINDER_MODE", self.mode);
        self.clip_fraction = override_or(&lookup, "VIEWFINDER_CLIP_FRACTION", self.clip_fraction);
        if let Some(v) = lookup("VIEWFINDER_STATS") {
            self.compute_stats = v != "0";
        }
    }
}

fn override_or<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %v, "ignoring unparsable environment override");
            default
        }),
        None => default,
    }
}
