//! Profile management: `<name>.toml` config plus `<name>.changes` change log
//! per profile, with the active profile recorded in `general.toml`.

use std::fs;
use std::path::PathBuf;

use dlf_core::{GeneralConfig, ProfileConfig, ProfilePaths};
use tracing::{info, warn};

use crate::error::{CliError, Result};

/// Profiles stored under one directory.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn config_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", name))
    }

    fn changes_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.changes", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.config_path(name).is_file()
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.exists(name) {
            Ok(())
        } else {
            Err(CliError::NoSuchProfile(name.to_string()))
        }
    }

    /// Profile names in sorted order. A missing directory has no profiles.
    pub fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(GeneralConfig::FILENAME) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Profile names with the active profile first.
    pub fn names_active_first(&self) -> Result<Vec<String>> {
        let mut names = self.names()?;
        if let Some(active) = self.active()? {
            if let Some(pos) = names.iter().position(|n| *n == active) {
                let active = names.remove(pos);
                names.insert(0, active);
            }
        }
        Ok(names)
    }

    pub fn is_first_launch(&self) -> Result<bool> {
        Ok(self.names()?.is_empty())
    }

    pub fn active(&self) -> Result<Option<String>> {
        Ok(GeneralConfig::load(&self.dir)?.active_profile)
    }

    pub fn set_active(&self, name: &str) -> Result<()> {
        self.require(name)?;
        self.write_active(Some(name.to_string()))?;
        info!(profile = name, "set active profile");
        Ok(())
    }

    fn write_active(&self, name: Option<String>) -> Result<()> {
        let mut general = GeneralConfig::load(&self.dir)?;
        general.active_profile = name;
        general.save(&self.dir)?;
        Ok(())
    }

    /// Create a profile and make it active. Returns `false` if a profile of
    /// that name already exists, leaving it untouched.
    pub fn create(&self, name: &str, config: &ProfileConfig) -> Result<bool> {
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Err(CliError::Usage(format!("invalid profile name '{}'", name)));
        }
        if self.exists(name) {
            info!(profile = name, "profile already exists");
            return Ok(false);
        }
        fs::create_dir_all(&self.dir)?;
        config.save(&self.config_path(name))?;
        dlf_core::fs::write_atomic(&self.changes_path(name), "")?;
        self.write_active(Some(name.to_string()))?;
        info!(profile = name, "created profile");
        Ok(true)
    }

    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        self.require(old)?;
        if self.exists(new) {
            return Err(CliError::Usage(format!("profile \"{}\" already exists", new)));
        }
        fs::rename(self.config_path(old), self.config_path(new))?;
        if self.changes_path(old).exists() {
            fs::rename(self.changes_path(old), self.changes_path(new))?;
        }
        if self.active()?.as_deref() == Some(old) {
            self.write_active(Some(new.to_string()))?;
        }
        info!(from = old, to = new, "renamed profile");
        Ok(())
    }

    /// Delete a profile. If it was active, the first remaining profile (if
    /// any) becomes active.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.require(name)?;
        fs::remove_file(self.config_path(name))?;
        if let Err(e) = fs::remove_file(self.changes_path(name)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }
        if self.active()?.as_deref() == Some(name) {
            let next = self.names()?.into_iter().next();
            if next.is_none() {
                warn!(profile = name, "deleted the last profile");
            }
            self.write_active(next)?;
        }
        info!(profile = name, "deleted profile");
        Ok(())
    }

    /// Load a profile's config and resolve its file locations.
    pub fn open(&self, name: &str) -> Result<(ProfileConfig, ProfilePaths)> {
        self.require(name)?;
        let config = ProfileConfig::load(&self.config_path(name))?;
        let paths = config.paths(&self.dir, name);
        Ok((config, paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn config() -> ProfileConfig {
        ProfileConfig::from_key_value_lines([
            "DownloadDirectory: dl",
            "PathOfExileDirectory: poe",
            "DownloadedLootFilterFilename: base.filter",
        ])
        .unwrap()
    }

    #[test]
    fn create_lists_and_activates() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("Profiles"));
        assert!(store.is_first_launch().unwrap());

        assert!(store.create("Alpha", &config()).unwrap());
        assert!(store.create("Beta", &config()).unwrap());
        assert!(!store.create("Beta", &config()).unwrap());

        assert!(!store.is_first_launch().unwrap());
        assert_eq!(store.active().unwrap().as_deref(), Some("Beta"));
        assert_eq!(store.names_active_first().unwrap(), vec!["Beta", "Alpha"]);

        store.set_active("Alpha").unwrap();
        assert_eq!(store.names_active_first().unwrap(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn rename_moves_files_and_active_marker() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        store.create("Old", &config()).unwrap();
        store.rename("Old", "New").unwrap();

        assert!(!store.exists("Old"));
        assert!(store.exists("New"));
        assert!(dir.path().join("New.changes").is_file());
        assert_eq!(store.active().unwrap().as_deref(), Some("New"));
    }

    #[test]
    fn deleting_active_profile_promotes_another() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        store.create("Alpha", &config()).unwrap();
        store.create("Beta", &config()).unwrap();

        store.delete("Beta").unwrap();
        assert_eq!(store.active().unwrap().as_deref(), Some("Alpha"));
        store.delete("Alpha").unwrap();
        assert_eq!(store.active().unwrap(), None);
        assert!(store.is_first_launch().unwrap());
    }

    #[test]
    fn missing_profiles_are_reported() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        assert!(matches!(store.set_active("Ghost"), Err(CliError::NoSuchProfile(_))));
        assert!(matches!(store.delete("Ghost"), Err(CliError::NoSuchProfile(_))));
        assert!(matches!(store.rename("Ghost", "Spirit"), Err(CliError::NoSuchProfile(_))));
    }

    #[test]
    fn open_resolves_paths() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        store.create("Main", &config()).unwrap();
        let (config, paths) = store.open("Main").unwrap();
        assert_eq!(config.output_filter_filename, "DynamicLootFilter.filter");
        assert_eq!(paths.changes, dir.path().join("Main.changes"));
        assert_eq!(paths.output_filter, Path::new("poe").join("DynamicLootFilter.filter"));
    }
}
