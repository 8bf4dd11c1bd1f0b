//! Live settings with load, save, and reset
//!
//! [`PersistentSettings`] owns the one live settings graph of an
//! application. Loading a document that cannot be upgraded or decoded never
//! loses data: the original document is retained and returned by
//! [`PersistentSettings::get_state`] until the settings are reset, while a
//! default graph stands in so that the application stays usable.

use crate::codec;
use crate::element::Element;
use crate::settings::{CURRENT_VERSION, Settings};
use crate::upgrade::{self, parse_version};
use randomness_core::{Attachment, RandomnessError, RandomnessResult};
use semver::Version;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Name of the current settings file
pub const SETTINGS_FILE_NAME: &str = "randomness3.xml";

/// Message of every error returned by [`PersistentSettings::load_state`]
pub const PARSE_SETTINGS_MESSAGE: &str = "Failed to parse or upgrade settings file.";

// ============================================================================
// Notifier
// ============================================================================

/// Informs the user about settings that could not be loaded
pub trait Notifier: Send + Sync {
    /// The settings were written by a newer release
    fn future_settings(&self, version: &Version) {
        error!(
            "Settings file has unsupported future version {}. Update to use these settings.",
            version
        );
    }

    /// The settings could not be upgraded or parsed
    fn parse_settings_failed(&self, cause: &RandomnessError) {
        error!("Settings file could not be parsed: {}", cause);
    }
}

/// Reports through the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {}

// ============================================================================
// Persistent Settings
// ============================================================================

/// Outcome of the most recent state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The live settings were loaded or created normally
    Loaded,
    /// Loading failed; the original document is retained
    Failed,
    /// The settings were explicitly discarded and replaced by defaults
    Reset,
}

/// The live settings graph and its load state
pub struct PersistentSettings {
    settings: Settings,
    /// The document passed to the last failed load
    failed_state: Option<Element>,
    status: LoadStatus,
    notifier: Arc<dyn Notifier>,
}

impl PersistentSettings {
    /// Default settings, reporting failures through the log
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(LogNotifier))
    }

    /// Default settings, reporting failures to `notifier`
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            settings: Settings::default(),
            failed_state: None,
            status: LoadStatus::Loaded,
            notifier,
        }
    }

    /// Outcome of the most recent transition
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// The live settings, or defaults if loading failed
    ///
    /// Changes to the defaults that stand in after a failed load are not
    /// persisted.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the live settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Upgrade and decode `element` into the live settings
    ///
    /// On failure the live settings fall back to defaults and `element` is
    /// retained before the error is returned. A document from the future is
    /// only reported to the notifier; any other failure is also returned,
    /// with the document attached.
    pub fn load_state(&mut self, element: Element) -> RandomnessResult<()> {
        match Self::decode(element.clone()) {
            Ok(settings) => {
                self.settings = settings;
                self.failed_state = None;
                self.status = LoadStatus::Loaded;
                debug!("Successfully loaded settings.");
                Ok(())
            }
            Err(RandomnessError::FutureSettings { version }) => {
                self.fail(element);
                debug!("Failed to load settings: future version {}.", version);
                self.notifier.future_settings(&version);
                Ok(())
            }
            Err(cause) => {
                let attachment = match element.to_xml() {
                    Ok(xml) => Attachment::new(SETTINGS_FILE_NAME, xml),
                    Err(_) => Attachment::new(SETTINGS_FILE_NAME, "Settings file could not be read."),
                };
                self.fail(element);
                debug!("Failed to load settings: {}.", cause);
                self.notifier.parse_settings_failed(&cause);
                Err(RandomnessError::parse_settings(
                    PARSE_SETTINGS_MESSAGE,
                    cause,
                    vec![attachment],
                ))
            }
        }
    }

    /// Parse `xml` and load it as in [`Self::load_state`]
    ///
    /// A document that is not even well-formed XML cannot be retained as a
    /// tree, so the live settings fall back to defaults and the status
    /// becomes [`LoadStatus::Failed`] without a retained document.
    pub fn load_document(&mut self, xml: &str) -> RandomnessResult<()> {
        match Element::parse(xml) {
            Ok(element) => self.load_state(element),
            Err(cause) => {
                self.settings = Settings::default();
                self.failed_state = None;
                self.status = LoadStatus::Failed;
                debug!("Failed to load settings: {}.", cause);
                self.notifier.parse_settings_failed(&cause);
                Err(RandomnessError::parse_settings(
                    PARSE_SETTINGS_MESSAGE,
                    cause,
                    vec![Attachment::new(SETTINGS_FILE_NAME, xml)],
                ))
            }
        }
    }

    fn decode(mut element: Element) -> RandomnessResult<Settings> {
        upgrade::upgrade(&mut element, &parse_version(CURRENT_VERSION)?)?;
        codec::from_element(&element)
    }

    fn fail(&mut self, element: Element) {
        self.settings = Settings::default();
        self.failed_state = Some(element);
        self.status = LoadStatus::Failed;
    }

    /// The document to persist
    ///
    /// After a failed load this is the untouched document that failed, so
    /// that saving never overwrites data that could not be read.
    pub fn get_state(&self) -> Element {
        match &self.failed_state {
            Some(element) => element.clone(),
            None => codec::to_element(&self.settings),
        }
    }

    /// Discard the live settings and any retained document
    pub fn reset_state(&mut self) {
        self.settings = Settings::default();
        self.failed_state = None;
        self.status = LoadStatus::Reset;
        info!("Reset settings to defaults.");
    }
}

impl Default for PersistentSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PersistentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentSettings")
            .field("status", &self.status)
            .field("settings", &self.settings)
            .field("failed_state", &self.failed_state)
            .finish_non_exhaustive()
    }
}
