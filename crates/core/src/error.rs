//! Error types for Randomness
//!
//! This module provides unified error handling across the workspace,
//! covering settings parsing and upgrading, file access, and data
//! generation. Validation failures of user-configured schemes are *not*
//! errors: they are returned as data by the validation DSL and only
//! converted into a [`RandomnessError::Validation`] at the generation
//! boundary.

use std::path::PathBuf;
use thiserror::Error;

/// A named piece of diagnostic data attached to an error
///
/// Used to carry the contents of a settings file along with the error
/// that occurred while parsing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name the contents belong to
    pub name: String,
    /// Raw contents, or a note explaining why they are unavailable
    pub contents: String,
}

impl Attachment {
    /// Create a new attachment
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// The main error type for Randomness
#[derive(Debug, Error)]
pub enum RandomnessError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// A scheme was invalid when it was asked to generate data
    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// The settings document could not be parsed or upgraded
    #[error("{message}")]
    ParseSettings {
        message: String,
        attachments: Vec<Attachment>,
        #[source]
        source: Option<Box<RandomnessError>>,
    },

    /// The settings document was written by a newer release
    #[error("Unsupported future version {version} in settings file.")]
    FutureSettings { version: semver::Version },

    /// The settings document or upgrade target is older than supported
    #[error("{0}")]
    UnsupportedVersion(String),

    /// The settings document has no version number
    #[error("Missing version number in settings file.")]
    MissingVersion,

    /// A version string could not be parsed
    #[error("Invalid version '{value}': {message}")]
    InvalidVersion { value: String, message: String },

    /// A file operation was requested on settings that live only in memory
    #[error("Settings are not backed by a file.")]
    NoStorage,

    /// The settings document has an unexpected structure
    #[error("Malformed settings document: {0}")]
    MalformedDocument(String),

    // ========================================================================
    // XML Errors
    // ========================================================================
    /// Reading or writing XML failed
    #[error("XML error: {0}")]
    Xml(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Generation Errors
    // ========================================================================
    /// Data generation failed
    #[error("{0}")]
    Generation(String),

    /// Data generation did not finish in time
    #[error("generation timed out")]
    GenerationTimeout,

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Template not found
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl RandomnessError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        RandomnessError::Validation(msg.into())
    }

    /// Create a settings parse error wrapping `source`
    pub fn parse_settings(
        msg: impl Into<String>,
        source: RandomnessError,
        attachments: Vec<Attachment>,
    ) -> Self {
        RandomnessError::ParseSettings {
            message: msg.into(),
            attachments,
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed document error
    pub fn malformed(msg: impl Into<String>) -> Self {
        RandomnessError::MalformedDocument(msg.into())
    }

    /// Create an XML error
    pub fn xml(msg: impl ToString) -> Self {
        RandomnessError::Xml(msg.to_string())
    }

    /// Create a generation error
    pub fn generation(msg: impl Into<String>) -> Self {
        RandomnessError::Generation(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        RandomnessError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Diagnostic attachments carried by this error, if any
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            RandomnessError::ParseSettings { attachments, .. } => attachments,
            _ => &[],
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, RandomnessError::Validation(_))
    }

    /// Check if this error means the stored settings are newer than supported
    pub fn is_future_settings(&self) -> bool {
        matches!(self, RandomnessError::FutureSettings { .. })
    }

    /// Check if this error concerns the structure or version of a settings document
    pub fn is_settings(&self) -> bool {
        matches!(
            self,
            RandomnessError::ParseSettings { .. }
                | RandomnessError::FutureSettings { .. }
                | RandomnessError::UnsupportedVersion(_)
                | RandomnessError::MissingVersion
                | RandomnessError::InvalidVersion { .. }
                | RandomnessError::MalformedDocument(_)
                | RandomnessError::Xml(_)
        )
    }

    /// Check if this error is a generation failure
    pub fn is_generation(&self) -> bool {
        matches!(
            self,
            RandomnessError::Generation(_) | RandomnessError::GenerationTimeout
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, RandomnessError::TemplateNotFound(_))
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            RandomnessError::FileRead { .. }
                | RandomnessError::FileWrite { .. }
        )
    }
}

/// Result type alias using RandomnessError
pub type RandomnessResult<T> = Result<T, RandomnessError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> RandomnessResult<T>;
}

impl<T, E: Into<RandomnessError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> RandomnessResult<T> {
        self.map_err(|e| {
            let err: RandomnessError = e.into();
            RandomnessError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
