use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tunebox/config.toml` or `~/.config/tunebox/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUNEBOX__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub catalog: CatalogSettings,
    pub theme: ThemeSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Initial volume slider value (0-100).
    pub volume: u8,
    /// Whether the loop checkbox starts checked.
    #[serde(rename = "loop")]
    pub looping: bool,
    /// How long a hint stays on screen (milliseconds).
    pub hint_ms: u64,
    /// File name of the track selected at startup. Falls back to the first
    /// catalog entry when nothing matches.
    pub initial_source: Option<String>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: 100,
            looping: false,
            hint_ms: 1400,
            initial_source: None,
        }
    }
}

/// One statically configured catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Display name. Defaults to the last path component of `source`.
    pub name: Option<String>,
    pub source: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Static track list. When empty, the catalog is built by scanning a directory.
    pub tracks: Vec<CatalogEntry>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            extensions: vec![
                "mp3".into(),
                "m4a".into(),
                "mp4".into(),
                "aac".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

/// Where the ambient light/dark preference comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemThemeSetting {
    /// Probe the terminal (`COLORFGBG`).
    Auto,
    Dark,
    Light,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub system: SystemThemeSetting,
    /// File that persists the explicit theme choice. Defaults to `state.toml`
    /// in the state directory.
    pub store_path: Option<PathBuf>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            system: SystemThemeSetting::Auto,
            store_path: None,
        }
    }
}

/// A reference to an external vector icon, as written in the config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconRef {
    pub src: String,
    pub id: Option<String>,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Title rendered in the header box.
    pub header_text: String,
    /// Base directory icon `src` paths are resolved against.
    pub assets_dir: PathBuf,
    /// Icons inlined into the header at startup.
    pub icons: Vec<IconRef>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " tunebox ".to_string(),
            assets_dir: PathBuf::from("assets"),
            icons: vec![IconRef {
                src: "logo.svg".to_string(),
                id: Some("logo".to_string()),
                alt: Some("tunebox".to_string()),
                width: None,
                height: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log file. Defaults to `tunebox.log` in the state directory.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
