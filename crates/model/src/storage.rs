//! Settings files on disk
//!
//! Settings live in a directory as `randomness3.xml`. Releases before
//! version 3 of the file format wrote `randomness-beta.xml`, which is still
//! read when the current file does not exist, but is never written.

use crate::persistence::{LoadStatus, PersistentSettings, SETTINGS_FILE_NAME};
use randomness_core::{RandomnessError, RandomnessResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the deprecated settings file
pub const DEPRECATED_SETTINGS_FILE_NAME: &str = "randomness-beta.xml";

/// Reads and writes the settings files in one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStorage {
    directory: PathBuf,
}

impl SettingsStorage {
    /// Storage in `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The file that is written
    pub fn settings_file(&self) -> PathBuf {
        self.directory.join(SETTINGS_FILE_NAME)
    }

    pub fn deprecated_settings_file(&self) -> PathBuf {
        self.directory.join(DEPRECATED_SETTINGS_FILE_NAME)
    }

    /// The file to read from, preferring the current file over the deprecated one
    pub fn source_file(&self) -> Option<PathBuf> {
        [self.settings_file(), self.deprecated_settings_file()]
            .into_iter()
            .find(|path| path.is_file())
    }

    // ========================================================================
    // Load and Save
    // ========================================================================

    /// Load the stored settings into `persistence`
    ///
    /// Leaves `persistence` untouched if no settings file exists.
    pub fn load(&self, persistence: &mut PersistentSettings) -> RandomnessResult<()> {
        let Some(path) = self.source_file() else {
            debug!("No settings file in '{}'.", self.directory.display());
            return Ok(());
        };

        debug!("Loading settings from '{}'.", path.display());
        persistence.load_document(&read(&path)?)
    }

    /// Write the state of `persistence` to the settings file
    ///
    /// Does nothing while the last load failed, so that the file that could
    /// not be loaded is left as it is.
    pub fn save(&self, persistence: &PersistentSettings) -> RandomnessResult<()> {
        if persistence.status() == LoadStatus::Failed {
            debug!("Not saving settings because the last load failed.");
            return Ok(());
        }

        let xml = persistence.get_state().to_xml()?;
        let path = self.settings_file();
        ensure_directory(&self.directory)?;

        let temp_path = path.with_extension("xml.tmp");
        fs::write(&temp_path, xml).map_err(|e| RandomnessError::FileWrite {
            path: temp_path.clone(),
            message: e.to_string(),
        })?;
        fs::rename(&temp_path, &path).map_err(|e| RandomnessError::FileWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;

        debug!("Saved settings to '{}'.", path.display());
        Ok(())
    }

    // ========================================================================
    // Repair
    // ========================================================================

    /// Copy the settings file to `target`, overwriting it
    pub fn back_up_to(&self, target: &Path) -> RandomnessResult<()> {
        let source = self.source_file().ok_or_else(|| RandomnessError::FileRead {
            path: self.settings_file(),
            message: "No settings file exists.".to_string(),
        })?;
        if let Some(parent) = target.parent().filter(|it| !it.as_os_str().is_empty()) {
            ensure_directory(parent)?;
        }

        fs::copy(&source, target).map_err(|e| RandomnessError::FileWrite {
            path: target.to_path_buf(),
            message: e.to_string(),
        })?;
        info!("Backed up settings to '{}'.", target.display());
        Ok(())
    }

    /// Load the settings in `source` into `persistence`
    pub fn restore_from(&self, source: &Path, persistence: &mut PersistentSettings) -> RandomnessResult<()> {
        let xml = read(source)?;
        persistence.load_document(&xml)?;
        info!("Restored settings from '{}'.", source.display());
        Ok(())
    }

    /// Delete the settings file and reset `persistence` to defaults
    pub fn delete_settings(&self, persistence: &mut PersistentSettings) -> RandomnessResult<()> {
        let path = self.settings_file();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| RandomnessError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }

        persistence.reset_state();
        info!("Deleted settings file '{}'.", path.display());
        Ok(())
    }
}

fn read(path: &Path) -> RandomnessResult<String> {
    fs::read_to_string(path).map_err(|e| RandomnessError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn ensure_directory(directory: &Path) -> RandomnessResult<()> {
    fs::create_dir_all(directory).map_err(|e| RandomnessError::FileWrite {
        path: directory.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::settings::Settings;
    use crate::template::{Template, TemplateList};
    use crate::schemes::WordScheme;
    use tempfile::TempDir;

    fn custom_settings() -> Settings {
        Settings::new(TemplateList::new(vec![Template::new(
            "Greeting",
            vec![WordScheme::new(["hello", "hi"]).into()],
        )]))
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path().join("config"));
        let settings = custom_settings();

        let mut persistence = PersistentSettings::new();
        persistence.set_settings(settings.clone());
        storage.save(&persistence).unwrap();
        assert!(storage.settings_file().exists());
        assert!(!storage.settings_file().with_extension("xml.tmp").exists());

        let mut loaded = PersistentSettings::new();
        storage.load(&mut loaded).unwrap();
        assert_eq!(loaded.settings(), &settings);
    }

    #[test]
    fn test_load_without_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path());

        let mut persistence = PersistentSettings::new();
        storage.load(&mut persistence).unwrap();
        assert_eq!(persistence.status(), LoadStatus::Loaded);
        assert!(storage.source_file().is_none());
    }

    #[test]
    fn test_deprecated_file_is_read_but_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path());
        let settings = custom_settings();
        let xml = codec::to_element(&settings).to_xml().unwrap();
        fs::write(storage.deprecated_settings_file(), &xml).unwrap();

        let mut persistence = PersistentSettings::new();
        storage.load(&mut persistence).unwrap();
        assert_eq!(persistence.settings(), &settings);

        storage.save(&persistence).unwrap();
        assert_eq!(fs::read_to_string(storage.deprecated_settings_file()).unwrap(), xml);
        assert!(storage.settings_file().exists());
        assert_eq!(storage.source_file(), Some(storage.settings_file()));
    }

    #[test]
    fn test_broken_file_is_never_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path());
        let broken = r#"<Settings version="3.5.0"><TemplateList><Template><LoremScheme/></Template></TemplateList></Settings>"#;
        fs::write(storage.settings_file(), broken).unwrap();

        let mut persistence = PersistentSettings::new();
        let error = storage.load(&mut persistence).unwrap_err();
        assert!(error.is_settings());
        assert_eq!(persistence.status(), LoadStatus::Failed);

        storage.save(&persistence).unwrap();
        assert_eq!(fs::read_to_string(storage.settings_file()).unwrap(), broken);
    }

    #[test]
    fn test_back_up_and_restore() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path().join("config"));
        let settings = custom_settings();

        let mut persistence = PersistentSettings::new();
        persistence.set_settings(settings.clone());
        storage.save(&persistence).unwrap();

        let backup = temp_dir.path().join("backup").join("randomness3.xml");
        storage.back_up_to(&backup).unwrap();
        assert_eq!(
            fs::read_to_string(&backup).unwrap(),
            fs::read_to_string(storage.settings_file()).unwrap()
        );

        let mut restored = PersistentSettings::new();
        storage.restore_from(&backup, &mut restored).unwrap();
        assert_eq!(restored.settings(), &settings);
    }

    #[test]
    fn test_back_up_without_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path());
        let error = storage.back_up_to(&temp_dir.path().join("backup.xml")).unwrap_err();
        assert!(error.is_io());
    }

    #[test]
    fn test_restore_from_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path());
        let mut persistence = PersistentSettings::new();
        assert!(storage.restore_from(&temp_dir.path().join("nope.xml"), &mut persistence).is_err());
        assert_eq!(persistence.status(), LoadStatus::Loaded);
    }

    #[test]
    fn test_delete_settings_resets() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path());
        fs::write(storage.settings_file(), "<Settings").unwrap();

        let mut persistence = PersistentSettings::new();
        assert!(storage.load(&mut persistence).is_err());

        storage.delete_settings(&mut persistence).unwrap();
        assert!(!storage.settings_file().exists());
        assert_eq!(persistence.status(), LoadStatus::Reset);

        storage.save(&persistence).unwrap();
        assert!(storage.settings_file().exists());
    }
}
