//! Core traits for Randomness
//!
//! This module defines the small behavioral traits shared by the
//! configuration nodes of the settings graph.

use crate::types::StateId;

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a unique identifier
///
/// Types implementing this trait have a UUID-based identifier that
/// survives copies made for editing, so a copy can be matched back to
/// the node it was made from.
pub trait Identifiable {
    /// Get the unique identifier
    fn id(&self) -> StateId;

    /// Check if this matches another identifier
    fn matches_id(&self, id: StateId) -> bool {
        self.id() == id
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types that have a user-facing name
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Set the name
    fn set_name(&mut self, name: String);

    /// Check if the name matches (case-insensitive)
    fn name_matches(&self, other: &str) -> bool {
        self.name().eq_ignore_ascii_case(other)
    }
}

// ============================================================================
// Tests
// ============================================================================
