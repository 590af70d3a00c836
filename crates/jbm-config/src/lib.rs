//! Host configuration for the chat Markdown renderer.
//!
//! Everything here is optional in the TOML file; a missing key takes the
//! built-in default:
//!
//! ```toml
//! light_theme = "InspiredGitHub"
//! dark_theme = "base16-ocean.dark"
//!
//! [language_aliases]
//! kt = "Kotlin"
//!
//! [palette]
//! clickable = "#FF00FF"
//! clickable_background = "#2000FF00"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// A colour string that is not `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour {0:?}, expected #RRGGBB or #AARRGGBB")]
pub struct InvalidColor(pub String);

/// A colour packed as `0xAARRGGBB`.
///
/// Serialized as `#AARRGGBB`; `#RRGGBB` is read as fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Argb(pub u32);

impl Argb {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Argb {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        match hex.len() {
            6 => Ok(Self(0xFF00_0000 | value)),
            8 => Ok(Self(value)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Argb {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Argb> for String {
    fn from(value: Argb) -> Self {
        value.to_string()
    }
}

/// Colours the host theme supplies for interactive text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub clickable: Argb,
    pub clickable_background: Argb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            clickable: Argb(0xFFFF_00FF),
            clickable_background: Argb(0x2000_FF00),
        }
    }
}

/// Built-in short names for fence languages, mapped to syntax names.
pub const BUILTIN_LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("rs", "Rust"),
    ("cs", "C#"),
    ("py", "Python"),
    ("pl", "Perl"),
    ("bash", "Bourne Again Shell (bash)"),
    ("sh", "Bourne Again Shell (bash)"),
    ("coffee", "CoffeeScript"),
    ("bad", "PHP"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Extra fence language aliases; these win over the built-in table
    pub language_aliases: BTreeMap<String, String>,
    /// Highlighting theme for light UI
    pub light_theme: String,
    /// Highlighting theme for dark UI
    pub dark_theme: String,
    pub palette: Palette,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            language_aliases: BTreeMap::new(),
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
            palette: Palette::default(),
        }
    }
}

impl RendererConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: RendererConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/jbm");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Syntax name for a fence language alias, configured aliases first.
    ///
    /// Matching ignores case: `JS` and `js` are the same alias.
    pub fn resolve_alias(&self, hint: &str) -> Option<&str> {
        let key = hint.trim().to_lowercase();
        self.language_aliases
            .iter()
            .find(|(alias, _)| alias.to_lowercase() == key)
            .map(|(_, name)| name.as_str())
            .or_else(|| {
                BUILTIN_LANGUAGE_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == key)
                    .map(|(_, name)| *name)
            })
    }

    pub fn theme_name(&self, dark: bool) -> &str {
        if dark {
            &self.dark_theme
        } else {
            &self.light_theme
        }
    }
}
