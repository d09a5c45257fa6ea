//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml        # Site config (optional)
//! ├── .meta.toml         # Entry metadata (see `metadata`)
//! ├── index.md
//! └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [render]
//! self_reference = "/.ui/ui.html"   # Never embedded into itself
//! redirect_delay_ms = 3000          # Delay before a .goto redirect fires
//! default_script_type = "text/javascript"
//!
//! [index]
//! candidates = ["index.html", "index.md"]
//!
//! [listing]
//! readme_names = ["readme.txt", "readme.md"]
//!
//! [markdown]
//! tables = true
//! strikethrough = true
//! footnotes = true
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for `render.redirect_delay_ms` (ten minutes).
const MAX_REDIRECT_DELAY_MS: u64 = 600_000;

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
/// All fields have defaults; unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Strategy selection and dispatch settings.
    pub render: RenderConfig,
    /// Directory index resolution.
    pub index: IndexConfig,
    /// Directory listing settings.
    pub listing: ListingConfig,
    /// Markdown extensions.
    pub markdown: MarkdownConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.render.self_reference.starts_with('/') {
            return Err(ConfigError::Validation(
                "render.self_reference must be an absolute path".into(),
            ));
        }
        if self.render.redirect_delay_ms > MAX_REDIRECT_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "render.redirect_delay_ms must be at most {MAX_REDIRECT_DELAY_MS}"
            )));
        }
        if self.render.default_script_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "render.default_script_type must not be empty".into(),
            ));
        }
        if self.index.candidates.is_empty() {
            return Err(ConfigError::Validation(
                "index.candidates must not be empty".into(),
            ));
        }
        if self.index.candidates.iter().any(|c| c.is_empty() || c.contains('/')) {
            return Err(ConfigError::Validation(
                "index.candidates must be plain file names".into(),
            ));
        }
        if self.listing.readme_names.is_empty() {
            return Err(ConfigError::Validation(
                "listing.readme_names must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Strategy selection and dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// The site's own rendering-definition resource. Navigating to it renders
    /// a warning instead of embedding the renderer into itself.
    pub self_reference: String,
    /// Delay between showing a redirect notice and navigating.
    pub redirect_delay_ms: u64,
    /// Type given to re-activated scripts that declare none.
    pub default_script_type: String,
}

impl RenderConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            self_reference: "/.ui/ui.html".to_string(),
            redirect_delay_ms: 3000,
            default_script_type: crate::script::DEFAULT_SCRIPT_TYPE.to_string(),
        }
    }
}

/// Directory index resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Names probed, in order, inside a directory path before falling back
    /// to a generated listing.
    pub candidates: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            candidates: vec!["index.html".to_string(), "index.md".to_string()],
        }
    }
}

/// Directory listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// File names (matched case-insensitively) embedded under a listing.
    pub readme_names: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            readme_names: vec!["readme.txt".to_string(), "readme.md".to_string()],
        }
    }
}

/// Markdown extensions passed to the converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            footnotes: true,
        }
    }
}

/// Palette for the CSS custom properties in `static/style.css`.
///
/// `light` is the base palette; `dark` applies under
/// `prefers-color-scheme: dark`.
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

/// One palette. Each field backs exactly one `--color-*` property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Listing dates, directory labels and descriptions.
    pub text_muted: String,
    /// Listing row separators.
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    fn palette(colors: [&str; 6]) -> Self {
        let [background, text, text_muted, border, link, link_hover] = colors.map(String::from);
        Self {
            background,
            text,
            text_muted,
            border,
            link,
            link_hover,
        }
    }

    pub fn default_light() -> Self {
        Self::palette(["#ffffff", "#111111", "#666666", "#e0e0e0", "#333333", "#000000"])
    }

    pub fn default_dark() -> Self {
        Self::palette(["#0a0a0a", "#eeeeee", "#999999", "#333333", "#cccccc", "#ffffff"])
    }

    /// `(property, value)` pairs in stylesheet order.
    pub fn custom_properties(&self) -> [(&'static str, &str); 6] {
        [
            ("--color-bg", self.background.as_str()),
            ("--color-text", self.text.as_str()),
            ("--color-text-muted", self.text_muted.as_str()),
            ("--color-border", self.border.as_str()),
            ("--color-link", self.link.as_str()),
            ("--color-link-hover", self.link_hover.as_str()),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Loading: stock defaults, then the content root's config.toml on top
// =============================================================================

/// `SiteConfig::default()` as a TOML table, the bottom layer of every load.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Layer `overlay` onto `base`.
///
/// Tables merge per key, recursively. Any other overlay value, arrays
/// included, replaces the base value outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(table), toml::Value::Table(layer)) => toml::Value::Table(
            layer.into_iter().fold(table, |mut table, (key, value)| {
                let merged = match table.remove(&key) {
                    Some(below) => merge_toml(below, value),
                    None => value,
                };
                table.insert(key, merged);
                table
            }),
        ),
        (_, replacement) => replacement,
    }
}

/// Parse `<root>/config.toml`, or `None` when the site has none.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let content = match fs::read_to_string(root.join("config.toml")) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Deserialize `base` with `overlay` merged on top, then validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let layered = match overlay {
        Some(layer) => merge_toml(base, layer),
        None => base,
    };
    let config: SiteConfig = layered.try_into()?;
    config.validate()?;
    Ok(config)
}

/// The configuration of the site rooted at `root`.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# hyperpage configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file in the content root.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# The site's own page renderer. Navigating to it shows a warning instead of
# embedding the renderer inside itself.
self_reference = "/.ui/ui.html"

# Milliseconds between showing a .goto redirect notice and navigating.
redirect_delay_ms = 3000

# Type given to re-activated <script> elements that declare none.
default_script_type = "text/javascript"

# ---------------------------------------------------------------------------
# Directory index resolution
# ---------------------------------------------------------------------------
[index]
# Probed in order inside a directory path ("/docs/"). The first one that
# exists is rendered; if none exists the directory is listed.
candidates = ["index.html", "index.md"]

# ---------------------------------------------------------------------------
# Directory listings
# ---------------------------------------------------------------------------
[listing]
# A file with one of these names (any case) is embedded under the listing.
readme_names = ["readme.txt", "readme.md"]

# ---------------------------------------------------------------------------
# Markdown extensions
# ---------------------------------------------------------------------------
[markdown]
tables = true
strikethrough = true
footnotes = true

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Listing dates, directory labels
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
"##
}

fn declarations(scheme: &ColorScheme, indent: &str) -> String {
    scheme
        .custom_properties()
        .iter()
        .map(|(property, value)| format!("{indent}{property}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The `:root` block for the light palette and a dark-mode override.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}\n    }}\n}}",
        declarations(&colors.light, "    "),
        declarations(&colors.dark, "        "),
    )
}
