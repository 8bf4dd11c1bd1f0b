//! # Randomness Generator
//!
//! Generates data from the templates in the live settings.
//!
//! ## Features
//!
//! - **Lookup**: Templates are found by name or identifier
//! - **Isolation**: Each request works on a snapshot of the settings
//! - **Timeouts**: Requests that take too long are abandoned
//! - **Reproducibility**: An optional seed fixes the output
//!

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod generator;
pub mod timely;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{DEFAULT_SEPARATOR, DEFAULT_TIMEOUT, GeneratorConfig};
pub use generator::{Generator, find_template};
pub use timely::generate_timely;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
