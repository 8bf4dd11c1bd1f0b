//! # Randomness Core
//!
//! Core types, traits, and error handling for Randomness.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: Identifier aliases and `CapitalizationMode`
//! - **Traits**: Common behaviors like `Identifiable` and `Named`
//! - **Errors**: Unified error handling with `RandomnessError` and `RandomnessResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{Attachment, RandomnessError, RandomnessResult, ResultExt};
pub use traits::{Identifiable, Named};
pub use types::{CapitalizationMode, StateId, TemplateId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
