//! # Configuration
//!
//! The converter and source sites are integrated through hard-coded selectors
//! and timeouts. They live here in one table so a markup change on either site
//! is a configuration edit, not a change to the state machine.
//!
//! Configuration is layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `ALBUMRIP_*` environment variables, where `__`
//! separates nested keys:
//!
//! ```text
//! ALBUMRIP_ISOLATE_TRACK_FAILURES=false
//! ALBUMRIP_SITE__CONVERTER__NAVIGATION_TIMEOUT_MS=20000
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Selectors used on the album (source) page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSelectors {
    /// Element carrying the cover art as an inline `background-image`.
    pub cover: String,
    /// Anchor of every rendered track.
    pub track: String,
    /// Attribute read from each track anchor.
    pub track_attribute: String,
    /// Budget for the initial album page load.
    pub page_load_timeout_ms: u64,
}

impl Default for SourceSelectors {
    fn default() -> Self {
        Self {
            cover: "span[aria-role=img]".to_string(),
            track: "a.trackItem__trackTitle".to_string(),
            track_attribute: "href".to_string(),
            page_load_timeout_ms: 30_000,
        }
    }
}

impl SourceSelectors {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }
}

/// The converter wizard's entry point, controls and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSite {
    /// Start page; `{link}` is replaced by the album's source link.
    pub start_url: String,
    pub input_selector: String,
    pub submit_selector: String,
    pub download_selector: String,
    /// Anchor leading back to the converter's root form.
    pub home_selector: String,
    /// Budget for every navigation the wizard performs.
    pub navigation_timeout_ms: u64,
}

impl Default for ConverterSite {
    fn default() -> Self {
        Self {
            start_url: "https://www.soundcloudme.com/?link={link}".to_string(),
            input_selector: "input[class=form-control]".to_string(),
            submit_selector: "button[type=submit]".to_string(),
            download_selector: "button[type=submit]".to_string(),
            home_selector: r#"a[href="https://www.soundcloudme.com"]"#.to_string(),
            navigation_timeout_ms: 10_000,
        }
    }
}

impl ConverterSite {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// The converter start page for an album.
    pub fn start_url_for(&self, source_link: &str) -> String {
        self.start_url.replace("{link}", source_link)
    }
}

/// Incremental scrolling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Pixels scrolled per tick.
    pub step_px: u32,
    /// Delay between ticks.
    pub interval_ms: u64,
    /// Optional hard stop for pages that never stop growing.
    pub max_ticks: Option<u32>,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step_px: 100,
            interval_ms: 1_000,
            max_ticks: None,
        }
    }
}

impl ScrollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Everything site specific.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    pub source: SourceSelectors,
    pub converter: ConverterSite,
    pub scroll: ScrollSettings,
}

/// Options for a whole pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base directory; album folders go under `<storage_root>/<downloads_dir>`.
    pub storage_root: PathBuf,
    pub downloads_dir: String,
    /// File name of the saved cover inside the album folder.
    pub artwork_filename: String,
    pub headless: bool,
    pub block_ads: bool,
    /// When true a failed track is logged and the album continues with the
    /// next track. When false the first failed track aborts the album.
    pub isolate_track_failures: bool,
    pub site: SiteProfile,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            downloads_dir: "Downloads".to_string(),
            artwork_filename: "cover.jpg".to_string(),
            headless: false,
            block_ads: true,
            isolate_track_failures: true,
            site: SiteProfile::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from an optional file plus the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) {
            log::debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("ALBUMRIP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The folder an album's artwork and audio downloads land in.
    pub fn album_dir(&self, album: &str) -> PathBuf {
        self.storage_root.join(&self.downloads_dir).join(album)
    }
}

/// `HOME` (unix), then `USERPROFILE` (windows), then whatever the platform
/// reports as home, then the current directory.
pub fn default_storage_root() -> PathBuf {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `~/.config/albumrip/config.toml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("albumrip").join("config.toml"))
}
