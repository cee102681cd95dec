use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use obi_ipc::Side;
use regex::Regex;
use serde::Deserialize;

/// Runtime settings for the daemon. Grouped separately from tracked window
/// state; mutated only on the polling context (e.g. by a `set-side`
/// command).
#[derive(Debug, Clone)]
pub struct Config {
    pub side: Side,
    /// Width in pixels of the strip the taskbar reserves at the screen edge.
    pub taskbar_width: u32,
    pub poll_interval_ms: u64,
    /// How far a maximized window's origin may sit from the primary screen
    /// origin before it counts as maximized on another monitor. DPI makes
    /// this fuzzy, hence configurable rather than a constant.
    pub offscreen_tolerance: i32,
    /// Pulled off the strip-facing edge of the pseudo-maximized rect so the
    /// window frame clears the taskbar border.
    pub border_inset: u32,
    /// Titles matching any of these never become tracked entities.
    pub exclude_titles: Vec<Regex>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            side: Side::Right,
            taskbar_width: 200,
            poll_interval_ms: 200,
            offscreen_tolerance: 200,
            border_inset: 8,
            exclude_titles: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    side: Option<Side>,
    taskbar_width: Option<u32>,
    poll_interval_ms: Option<u64>,
    offscreen_tolerance: Option<i32>,
    border_inset: Option<u32>,
    exclude_titles: Vec<String>,
}

impl Config {
    /// Loads `<config_dir>/obi/config.toml`; a missing file means defaults,
    /// an unreadable or malformed one is an error worth failing startup for.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_file() else {
            return Ok(Self::default());
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("obi").join("config.toml"))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let mut config = Self::default();
        if let Some(side) = file.side {
            config.side = side;
        }
        if let Some(width) = file.taskbar_width {
            config.taskbar_width = width;
        }
        if let Some(interval) = file.poll_interval_ms {
            config.poll_interval_ms = interval.max(50);
        }
        if let Some(tolerance) = file.offscreen_tolerance {
            config.offscreen_tolerance = tolerance;
        }
        if let Some(inset) = file.border_inset {
            config.border_inset = inset;
        }
        config.exclude_titles = compile_patterns(&file.exclude_titles);
        Ok(config)
    }

    pub fn is_excluded(&self, title: &str) -> bool {
        self.exclude_titles.iter().any(|re| re.is_match(title))
    }
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!("Skipping invalid exclude pattern '{}': {}", pattern, err);
                None
            }
        })
        .collect()
}
