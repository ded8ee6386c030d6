//! Site configuration (`site.toml`).
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration that matches the stock widget behavior.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VitrineError};

/// The two color schemes a page can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Dark,
    Light,
}

impl ThemeName {
    /// Parse a stored preference value. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Third-party analytics script providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsProvider {
    Plausible,
    Fathom,
    Simple,
}

/// Theme toggle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme used when no preference has been stored.
    #[serde(default = "default_theme")]
    pub default: ThemeName,
    /// Preference store key.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

/// Scroll-to-top button settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollToTopConfig {
    /// The button shows once the page is scrolled past this offset.
    #[serde(default = "default_scroll_threshold")]
    pub threshold_px: i32,
    /// Quiet period after the last scroll before visibility is recomputed.
    #[serde(default = "default_scroll_debounce")]
    pub debounce_ms: u64,
}

/// Copy-to-clipboard button settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyCodeConfig {
    /// How long the "Copied!" / "Failed" feedback stays up.
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u64,
}

/// Contact form settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// How long a success message stays visible.
    #[serde(default = "default_success_hide_ms")]
    pub success_hide_ms: u64,
}

/// Analytics loader settings. Disabled unless explicitly enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: AnalyticsProvider,
    #[serde(default)]
    pub site_id: String,
}

/// Scroll-triggered animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Visible fraction at which cards animate in.
    #[serde(default = "default_card_threshold")]
    pub card_threshold: f32,
    /// Visible fraction at which skill bars fill.
    #[serde(default = "default_skill_threshold")]
    pub skill_threshold: f32,
    /// Delay before a collapsed skill bar is restored to its width.
    #[serde(default = "default_restore_delay")]
    pub restore_delay_ms: u64,
    /// CSS `animation` value applied to revealed cards.
    #[serde(default = "default_animation")]
    pub animation: String,
}

/// Lightbox trigger protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightboxConfig {
    /// Class marking an element as a lightbox trigger.
    #[serde(default = "default_trigger_class")]
    pub trigger_class: String,
    /// Attribute marking a gallery-group container.
    #[serde(default = "default_gallery_attribute")]
    pub gallery_attribute: String,
}

/// Top-level site configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub scroll_to_top: ScrollToTopConfig,
    #[serde(default)]
    pub copy_code: CopyCodeConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub lightbox: LightboxConfig,
}

fn default_theme() -> ThemeName {
    ThemeName::Dark
}
fn default_storage_key() -> String {
    "theme".to_string()
}
fn default_scroll_threshold() -> i32 {
    300
}
fn default_scroll_debounce() -> u64 {
    100
}
fn default_feedback_ms() -> u64 {
    2000
}
fn default_success_hide_ms() -> u64 {
    5000
}
fn default_provider() -> AnalyticsProvider {
    AnalyticsProvider::Plausible
}
fn default_card_threshold() -> f32 {
    0.1
}
fn default_skill_threshold() -> f32 {
    0.5
}
fn default_restore_delay() -> u64 {
    100
}
fn default_animation() -> String {
    "fadeInUp 0.6s ease-out".to_string()
}
fn default_trigger_class() -> String {
    "lightbox-trigger".to_string()
}
fn default_gallery_attribute() -> String {
    "data-gallery".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: default_theme(),
            storage_key: default_storage_key(),
        }
    }
}

impl Default for ScrollToTopConfig {
    fn default() -> Self {
        Self {
            threshold_px: default_scroll_threshold(),
            debounce_ms: default_scroll_debounce(),
        }
    }
}

impl Default for CopyCodeConfig {
    fn default() -> Self {
        Self {
            feedback_ms: default_feedback_ms(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            success_hide_ms: default_success_hide_ms(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            site_id: String::new(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            card_threshold: default_card_threshold(),
            skill_threshold: default_skill_threshold(),
            restore_delay_ms: default_restore_delay(),
            animation: default_animation(),
        }
    }
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            trigger_class: default_trigger_class(),
            gallery_attribute: default_gallery_attribute(),
        }
    }
}

impl SiteConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&text)?;
        log::info!("Loaded site config from {}", path.display());
        Ok(cfg)
    }

    /// Reject values no widget can work with.
    pub fn validate(&self) -> Result<()> {
        if self.theme.storage_key.is_empty() {
            return Err(VitrineError::Config("theme.storage_key is empty".into()));
        }
        if self.lightbox.trigger_class.trim().is_empty() {
            return Err(VitrineError::Config(
                "lightbox.trigger_class is empty".into(),
            ));
        }
        for (name, value) in [
            ("reveal.card_threshold", self.reveal.card_threshold),
            ("reveal.skill_threshold", self.reveal.skill_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VitrineError::Config(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        if self.analytics.enabled
            && self.analytics.provider == AnalyticsProvider::Fathom
            && self.analytics.site_id.is_empty()
        {
            log::warn!("analytics: fathom enabled without a site_id");
        }
        Ok(())
    }
}
