use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Directory holding `<profile>.toml`, `<profile>.changes` and `general.toml`.
///
/// Priority: `DLF_PROFILES_DIR` > `<user config dir>/dynamic-loot-filter/profiles`
/// > `./Profiles`.
pub fn default_profiles_dir() -> PathBuf {
    if let Some(dir) = env_opt("DLF_PROFILES_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("dynamic-loot-filter").join("profiles"))
        .unwrap_or_else(|| PathBuf::from("Profiles"))
}

// ── Profile config ────────────────────────────────────────────

/// Per-profile settings, persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    /// Where the game-client filter download lands.
    #[serde(default)]
    pub download_directory: PathBuf,

    /// The game's filter directory; the generated filter is written here.
    #[serde(default)]
    pub path_of_exile_directory: PathBuf,

    /// Where imported base filters are kept between reloads.
    #[serde(default = "default_input_directory")]
    pub input_directory: PathBuf,

    #[serde(default)]
    pub downloaded_filter_filename: String,

    #[serde(default = "default_output_filename")]
    pub output_filter_filename: String,

    /// Move instead of copy when importing the downloaded filter.
    #[serde(default)]
    pub remove_downloaded_filter: bool,

    /// Initial value for the generated map-tier rule.
    #[serde(default)]
    pub hide_maps_below_tier: u32,

    /// Whether generated chaos recipe rules start enabled.
    #[serde(default = "default_true")]
    pub add_chaos_recipe_rules: bool,

    #[serde(default = "default_weapon_classes_any_height")]
    pub chaos_recipe_weapon_classes_any_height: Vec<String>,

    #[serde(default = "default_weapon_classes_max_height_3")]
    pub chaos_recipe_weapon_classes_max_height_3: Vec<String>,
}

fn default_input_directory() -> PathBuf {
    PathBuf::from("FiltersInput")
}

fn default_output_filename() -> String {
    "DynamicLootFilter.filter".to_string()
}

fn default_true() -> bool {
    true
}

fn default_weapon_classes_any_height() -> Vec<String> {
    ["Daggers", "Rune Daggers", "Wands"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_weapon_classes_max_height_3() -> Vec<String> {
    vec!["Bows".to_string()]
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            download_directory: PathBuf::new(),
            path_of_exile_directory: PathBuf::new(),
            input_directory: default_input_directory(),
            downloaded_filter_filename: String::new(),
            output_filter_filename: default_output_filename(),
            remove_downloaded_filter: false,
            hide_maps_below_tier: 0,
            add_chaos_recipe_rules: true,
            chaos_recipe_weapon_classes_any_height: default_weapon_classes_any_height(),
            chaos_recipe_weapon_classes_max_height_3: default_weapon_classes_max_height_3(),
        }
    }
}

impl ProfileConfig {
    /// Build a config from front-end `Keyword: value` lines.
    ///
    /// Required keywords: `DownloadDirectory`, `PathOfExileDirectory`,
    /// `DownloadedLootFilterFilename`. Unknown keywords are rejected.
    pub fn from_key_value_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut config = Self::default();
        let mut seen_required = [false; 3];
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| CoreError::Config(format!("expected `Keyword: value`, got '{}'", line)))?;
            let value = value.trim();
            match key.trim() {
                "DownloadDirectory" => {
                    config.download_directory = PathBuf::from(value);
                    seen_required[0] = true;
                }
                "PathOfExileDirectory" => {
                    config.path_of_exile_directory = PathBuf::from(value);
                    seen_required[1] = true;
                }
                "DownloadedLootFilterFilename" => {
                    config.downloaded_filter_filename = value.to_string();
                    seen_required[2] = true;
                }
                "InputLootFilterDirectory" => config.input_directory = PathBuf::from(value),
                "OutputLootFilterFilename" => config.output_filter_filename = value.to_string(),
                "RemoveDownloadedFilter" => config.remove_downloaded_filter = parse_bool(key, value)?,
                "HideMapsBelowTier" => {
                    config.hide_maps_below_tier = value
                        .parse()
                        .map_err(|_| CoreError::Config(format!("HideMapsBelowTier: not a number: '{}'", value)))?;
                }
                "AddChaosRecipeRules" => config.add_chaos_recipe_rules = parse_bool(key, value)?,
                "ChaosRecipeWeaponClassesAnyHeight" => {
                    config.chaos_recipe_weapon_classes_any_height = parse_quoted_list(value)
                }
                "ChaosRecipeWeaponClassesMaxHeight3" => {
                    config.chaos_recipe_weapon_classes_max_height_3 = parse_quoted_list(value)
                }
                other => return Err(CoreError::Config(format!("unknown profile keyword '{}'", other))),
            }
        }
        if let Some(missing) = seen_required.iter().position(|seen| !seen) {
            let name = ["DownloadDirectory", "PathOfExileDirectory", "DownloadedLootFilterFilename"][missing];
            return Err(CoreError::Config(format!("missing required profile keyword '{}'", name)));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading profile config");
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        crate::fs::write_atomic(path, &toml_str)
    }

    /// Resolve the filesystem locations this profile reads and writes.
    pub fn paths(&self, profiles_dir: &Path, profile_name: &str) -> ProfilePaths {
        ProfilePaths {
            config: profiles_dir.join(format!("{}.toml", profile_name)),
            changes: profiles_dir.join(format!("{}.changes", profile_name)),
            downloaded_filter: self.download_directory.join(&self.downloaded_filter_filename),
            input_filter: self.input_directory.join(&self.downloaded_filter_filename),
            output_filter: self.path_of_exile_directory.join(&self.output_filter_filename),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(CoreError::Config(format!("{}: expected a boolean, got '{}'", key, value))),
    }
}

/// `"Daggers" "Rune Daggers" Wands` -> `[Daggers, Rune Daggers, Wands]`
fn parse_quoted_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('"') {
            let end = stripped.find('"').unwrap_or(stripped.len());
            items.push(stripped[..end].to_string());
            rest = stripped.get(end + 1..).unwrap_or("").trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            items.push(rest[..end].to_string());
            rest = rest[end..].trim_start();
        }
    }
    items
}

/// Fully resolved per-profile file locations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePaths {
    pub config: PathBuf,
    pub changes: PathBuf,
    pub downloaded_filter: PathBuf,
    pub input_filter: PathBuf,
    pub output_filter: PathBuf,
}

// ── General config ────────────────────────────────────────────

/// Cross-profile settings stored in `general.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    #[serde(default)]
    pub active_profile: Option<String>,
}

impl GeneralConfig {
    pub const FILENAME: &'static str = "general.toml";

    /// Returns the default config if the file does not exist.
    pub fn load(profiles_dir: &Path) -> Result<Self> {
        let path = profiles_dir.join(Self::FILENAME);
        let content = crate::fs::read_to_string_or_empty(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, profiles_dir: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        crate::fs::write_atomic(&profiles_dir.join(Self::FILENAME), &toml_str)
    }
}
