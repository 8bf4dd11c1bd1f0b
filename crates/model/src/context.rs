//! Application-scoped settings
//!
//! An [`AppContext`] owns the live [`PersistentSettings`] of one
//! application and hands out cheap clones of itself. Readers take snapshots;
//! writers validate a complete new graph and swap it in under the write
//! lock, so a reader never observes a partially applied change.

use crate::element::Element;
use crate::persistence::{LoadStatus, PersistentSettings};
use crate::settings::Settings;
use crate::storage::SettingsStorage;
use crate::validation::Validatable;
use parking_lot::RwLock;
use randomness_core::{RandomnessError, RandomnessResult};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to the live settings
#[derive(Debug, Clone)]
pub struct AppContext {
    persistence: Arc<RwLock<PersistentSettings>>,
    storage: Option<SettingsStorage>,
}

impl AppContext {
    /// Context around `persistence` that is not backed by files
    pub fn new(persistence: PersistentSettings) -> Self {
        Self {
            persistence: Arc::new(RwLock::new(persistence)),
            storage: None,
        }
    }

    /// Context with default settings that loads from and saves to `storage`
    ///
    /// Nothing is read until [`Self::load`] is called.
    pub fn with_storage(persistence: PersistentSettings, storage: SettingsStorage) -> Self {
        Self {
            persistence: Arc::new(RwLock::new(persistence)),
            storage: Some(storage),
        }
    }

    pub fn storage(&self) -> Option<&SettingsStorage> {
        self.storage.as_ref()
    }

    fn require_storage(&self) -> RandomnessResult<&SettingsStorage> {
        self.storage
            .as_ref()
            .ok_or(RandomnessError::NoStorage)
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// A copy of the live settings
    pub fn snapshot(&self) -> Settings {
        self.persistence.read().settings().clone()
    }

    /// Call `f` with the live settings while holding the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        f(self.persistence.read().settings())
    }

    pub fn status(&self) -> LoadStatus {
        self.persistence.read().status()
    }

    /// The document that would be saved
    pub fn state(&self) -> Element {
        self.persistence.read().get_state()
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Replace the live settings with `settings` if they are valid
    pub fn apply(&self, settings: Settings) -> RandomnessResult<()> {
        if let Some(info) = settings.do_validate(&settings) {
            return Err(RandomnessError::validation(info.message));
        }

        self.persistence.write().set_settings(settings);
        debug!("Applied new settings.");
        Ok(())
    }

    /// Discard the live settings in favor of defaults
    pub fn reset(&self) {
        self.persistence.write().reset_state();
    }

    /// Load the live settings from storage
    ///
    /// If loading fails, fallback settings are installed before the error is
    /// returned.
    pub fn load(&self) -> RandomnessResult<()> {
        let storage = self.require_storage()?;
        storage.load(&mut self.persistence.write())
    }

    /// Save the live settings to storage
    pub fn save(&self) -> RandomnessResult<()> {
        let storage = self.require_storage()?;
        storage.save(&self.persistence.read())
    }

    /// Copy the settings file to `target`
    pub fn back_up_to(&self, target: &Path) -> RandomnessResult<()> {
        self.require_storage()?.back_up_to(target)
    }

    /// Load the settings in `source`
    pub fn restore_from(&self, source: &Path) -> RandomnessResult<()> {
        let storage = self.require_storage()?;
        storage.restore_from(source, &mut self.persistence.write())
    }

    /// Delete the settings file and reset to defaults
    pub fn delete_settings(&self) -> RandomnessResult<()> {
        let storage = self.require_storage()?;
        storage.delete_settings(&mut self.persistence.write())
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(PersistentSettings::new())
    }
}
