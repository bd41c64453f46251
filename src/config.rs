//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML value, the user's file is merged on top, and the
//! result is deserialized with unknown keys rejected.
//!
//! ## Config File Location
//!
//! Place `config.toml` in the content root:
//!
//! ```text
//! content/
//! ├── config.toml              # Site config
//! ├── data/
//! │   └── australia.json       # Local manifest (written by `travel-gal sync`)
//! └── images/
//!     └── australia/...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! title = "Travel Diary"
//! base_url = "http://localhost:8000/"   # Relative manifest entries resolve here
//! state_dir = ".travel-gal"             # Preference store location
//!
//! [fetch]
//! timeout_secs = 20
//! user_agent = "travel-gal"
//!
//! [destinations.australia]
//! name = "Australia"
//! api_endpoint = "https://example.com/api/australia"
//! share_link = "https://1drv.ms/f/s!abc"
//! local_json = "data/australia.json"
//! default_mode = "grid"                 # grid | list
//! show_mode_toggle = true
//! source_mode = "auto"                  # auto | album
//! description = "Captured during Australia."
//! ```
//!
//! ## Placeholders
//!
//! The site template ships with values such as `PASTE_AUSTRALIA_LINK_HERE`.
//! Any endpoint or share link containing [`PLACEHOLDER_MARKER`] counts as not
//! configured and is never fetched.

use crate::naming;
use crate::types::{LayoutMode, SourceMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Substring marking a template value that was never filled in.
pub const PLACEHOLDER_MARKER: &str = "PASTE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults; user files only specify overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub fetch: FetchConfig,
    pub colors: ColorConfig,
    /// Galleries keyed by slug. The slug names the output directory.
    pub destinations: BTreeMap<String, DestinationConfig>,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url()?;
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than zero".into(),
            ));
        }
        for slug in self.destinations.keys() {
            if naming::slugify(slug) != *slug {
                return Err(ConfigError::Validation(format!(
                    "destination key {slug:?} must be a lowercase slug (e.g. {:?})",
                    naming::slugify(slug)
                )));
            }
        }
        for gallery in self.galleries() {
            if let Some(endpoint) = gallery.usable_api_endpoint() {
                if let Err(e) = base_url.join(endpoint) {
                    return Err(ConfigError::Validation(format!(
                        "destinations.{}.api_endpoint {endpoint:?} is not a valid URL: {e}",
                        gallery.slug
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parsed `site.base_url`. Must be absolute http(s).
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        match url::Url::parse(&self.site.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(u),
            _ => Err(ConfigError::Validation(format!(
                "site.base_url must be an absolute http(s) URL, got {:?}",
                self.site.base_url
            ))),
        }
    }

    /// Per-destination gallery configs in slug order.
    pub fn galleries(&self) -> Vec<GalleryConfig> {
        self.destinations
            .iter()
            .map(|(slug, dest)| dest.gallery_config(slug))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,
    /// Base URL the site is served from. Relative `src` values in local
    /// manifests are joined onto it.
    pub base_url: String,
    /// Directory (relative to the content root) holding the preference store.
    pub state_dir: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Travel Diary".to_string(),
            base_url: "http://localhost:8000/".to_string(),
            state_dir: ".travel-gal".to_string(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: concat!("travel-gal/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// One destination's gallery as written in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DestinationConfig {
    /// Display name. Empty means "derive from the slug".
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_link: Option<String>,
    /// Path of the local manifest, relative to the content root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_json: Option<String>,
    pub default_mode: LayoutMode,
    pub show_mode_toggle: bool,
    pub source_mode: SourceMode,
    /// Description used when a photo has none of its own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            api_endpoint: None,
            share_link: None,
            local_json: None,
            default_mode: LayoutMode::Grid,
            show_mode_toggle: true,
            source_mode: SourceMode::Auto,
            description: None,
        }
    }
}

impl DestinationConfig {
    pub fn gallery_config(&self, slug: &str) -> GalleryConfig {
        let destination_name = if self.name.trim().is_empty() {
            naming::title_case(slug)
        } else {
            self.name.trim().to_string()
        };
        let default_description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("Captured during {destination_name}."));
        GalleryConfig {
            slug: slug.to_string(),
            container_id: format!("{slug}-gallery"),
            api_endpoint: self.api_endpoint.clone(),
            share_link: self.share_link.clone(),
            local_json_path: self.local_json.clone(),
            destination_name,
            default_mode: self.default_mode,
            show_mode_toggle: self.show_mode_toggle,
            source_mode: self.source_mode,
            default_description,
        }
    }
}

/// Resolved, read-only per-gallery input to the source resolver and viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    pub slug: String,
    /// Element id the gallery renders into; also scopes the stored preference.
    pub container_id: String,
    pub api_endpoint: Option<String>,
    pub share_link: Option<String>,
    pub local_json_path: Option<String>,
    pub destination_name: String,
    pub default_mode: LayoutMode,
    pub show_mode_toggle: bool,
    pub source_mode: SourceMode,
    pub default_description: String,
}

impl GalleryConfig {
    /// Minimal config for a destination with no sources; used by tests and
    /// as a starting point for builders.
    pub fn new(slug: &str, destination_name: &str) -> Self {
        let dest = DestinationConfig {
            name: destination_name.to_string(),
            ..DestinationConfig::default()
        };
        dest.gallery_config(slug)
    }

    /// API endpoint, unless unset, blank, or a template placeholder.
    pub fn usable_api_endpoint(&self) -> Option<&str> {
        configured(self.api_endpoint.as_deref())
    }

    /// Share link, unless unset, blank, or a template placeholder.
    pub fn usable_share_link(&self) -> Option<&str> {
        configured(self.share_link.as_deref())
    }

    pub fn usable_local_path(&self) -> Option<&str> {
        self.local_json_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// True when a config value still carries the template placeholder marker.
pub fn is_placeholder(value: &str) -> bool {
    value.contains(PLACEHOLDER_MARKER)
}

fn configured(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !is_placeholder(v))
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Captions, descriptions, panel text.
    pub text_muted: String,
    pub border: String,
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fdfcf9".to_string(),
            text: "#1d1d1b".to_string(),
            text_muted: "#6b6b66".to_string(),
            border: "#e4e1d8".to_string(),
            accent: "#0f766e".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111312".to_string(),
            text: "#ecebe6".to_string(),
            text_muted: "#9c9b95".to_string(),
            border: "#2c2f2d".to_string(),
            accent: "#5eead4".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# travel-gal configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

[site]
title = "Travel Diary"

# Where the generated site is served from. Relative image paths in local
# manifests (e.g. "images/australia/australia-1.jpg") are joined onto it.
base_url = "http://localhost:8000/"

# Preference store directory, relative to the content root.
state_dir = ".travel-gal"

# ---------------------------------------------------------------------------
# HTTP fetching (manifest API and OneDrive share listings)
# ---------------------------------------------------------------------------
[fetch]
timeout_secs = 20
# user_agent = "travel-gal/<version>"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fdfcf9"
text = "#1d1d1b"
text_muted = "#6b6b66"    # Captions, descriptions
border = "#e4e1d8"
accent = "#0f766e"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111312"
text = "#ecebe6"
text_muted = "#9c9b95"
border = "#2c2f2d"
accent = "#5eead4"

# ---------------------------------------------------------------------------
# Destinations - one gallery each, keyed by slug
# ---------------------------------------------------------------------------
# Sources are tried in order: api_endpoint, share_link, local_json. The
# first one that yields photos wins. Values containing PASTE_ are ignored.
#
# [destinations.australia]
# name = "Australia"
# api_endpoint = "PASTE_AUSTRALIA_API_HERE"
# share_link = "PASTE_AUSTRALIA_LINK_HERE"
# local_json = "data/australia.json"
# default_mode = "grid"        # grid | list
# show_mode_toggle = true
# source_mode = "auto"         # auto | album (link to the share, no fetching)
# description = "Captured during Australia."
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = SiteConfig::default();
        config.validate().unwrap();
        assert!(config.destinations.is_empty());
        assert_eq!(config.fetch.timeout_secs, 20);
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.base_url, defaults.site.base_url);
        assert_eq!(config.colors.dark.accent, defaults.colors.dark.accent);
    }

    #[test]
    fn parse_destination() {
        let toml = r#"
[destinations.australia]
name = "Australia"
share_link = "https://1drv.ms/f/s!abc"
local_json = "data/australia.json"
default_mode = "list"
show_mode_toggle = false
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        let dest = &config.destinations["australia"];
        assert_eq!(dest.default_mode, LayoutMode::List);
        assert!(!dest.show_mode_toggle);
        assert_eq!(dest.source_mode, SourceMode::Auto);
        assert_eq!(dest.api_endpoint, None);
    }

    #[test]
    fn gallery_config_derives_ids_and_defaults() {
        let dest = DestinationConfig::default();
        let gallery = dest.gallery_config("gold-coast");
        assert_eq!(gallery.container_id, "gold-coast-gallery");
        assert_eq!(gallery.destination_name, "Gold Coast");
        assert_eq!(gallery.default_description, "Captured during Gold Coast.");
    }

    #[test]
    fn gallery_config_uses_explicit_description() {
        let dest = DestinationConfig {
            name: "Dubai".into(),
            description: Some("Desert days.".into()),
            ..DestinationConfig::default()
        };
        assert_eq!(dest.gallery_config("dubai").default_description, "Desert days.");
    }

    #[test]
    fn placeholder_values_are_unset() {
        let mut gallery = GalleryConfig::new("australia", "Australia");
        gallery.share_link = Some("PASTE_AUSTRALIA_LINK_HERE".into());
        gallery.api_endpoint = Some("https://api.example.com/photos".into());
        assert!(is_placeholder("PASTE_AUSTRALIA_LINK_HERE"));
        assert_eq!(gallery.usable_share_link(), None);
        assert_eq!(
            gallery.usable_api_endpoint(),
            Some("https://api.example.com/photos")
        );
    }

    #[test]
    fn placeholder_checked_independently() {
        let mut gallery = GalleryConfig::new("australia", "Australia");
        gallery.api_endpoint = Some("https://x/PASTE_API".into());
        gallery.share_link = Some("https://1drv.ms/f/s!abc".into());
        assert_eq!(gallery.usable_api_endpoint(), None);
        assert!(gallery.usable_share_link().is_some());
    }

    #[test]
    fn blank_values_are_unset() {
        let mut gallery = GalleryConfig::new("australia", "Australia");
        gallery.api_endpoint = Some("   ".into());
        gallery.local_json_path = Some("".into());
        assert_eq!(gallery.usable_api_endpoint(), None);
        assert_eq!(gallery.usable_local_path(), None);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Travel Diary");
    }

    #[test]
    fn load_config_merges_partial_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[site]
title = "Wander"

[colors.light]
background = "#fafafa"

[destinations.dubai]
local_json = "data/dubai.json"
"##,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Wander");
        assert_eq!(config.site.base_url, "http://localhost:8000/");
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, "#1d1d1b");
        let galleries = config.galleries();
        assert_eq!(galleries.len(), 1);
        assert_eq!(galleries[0].usable_local_path(), Some("data/dubai.json"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r#"
[destinations.dubai]
shareLink = "https://1drv.ms/x"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn validate_rejects_relative_base_url() {
        let mut config = SiteConfig::default();
        config.site.base_url = "/photos".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_unparseable_api_endpoint() {
        let mut config = SiteConfig::default();
        config.destinations.insert(
            "dubai".into(),
            DestinationConfig {
                api_endpoint: Some("https://[not-a-host/photos".into()),
                ..DestinationConfig::default()
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("destinations.dubai.api_endpoint"));

        config.destinations.get_mut("dubai").unwrap().api_endpoint =
            Some("PASTE_DUBAI_ENDPOINT_HERE".into());
        config.validate().unwrap();
        config.destinations.get_mut("dubai").unwrap().api_endpoint = Some("api/dubai.json".into());
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = SiteConfig::default();
        config.fetch.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_non_slug_destination() {
        let mut config = SiteConfig::default();
        config
            .destinations
            .insert("Gold Coast".into(), DestinationConfig::default());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn generate_css_includes_dark_mode_media_query() {
        let css = generate_color_css(&ColorConfig::default());
        assert!(css.contains("--color-accent: #0f766e"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }
}
