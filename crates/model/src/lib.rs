//! # Randomness Model
//!
//! This crate holds the settings of Randomness and everything needed to
//! generate data from them and to keep them across sessions.
//!
//! ## Core Concepts
//!
//! - **Scheme**: A configurable generator of strings (integers, words, UUIDs, ...)
//! - **Decorator**: A stage that transforms the output of a scheme (affixes, arrays, padding)
//! - **Template**: A named list of schemes whose outputs are concatenated
//! - **TemplateReference**: A scheme that outputs the strings of another template
//! - **Settings**: The root of the graph, holding the template list
//!
//! Settings are validated through a small declarative DSL
//! ([`validation`]), persisted as XML through an element tree
//! ([`element`], [`codec`]), and upgraded between format versions
//! ([`upgrade`]) before they are loaded ([`persistence`], [`storage`]).
//!

// Module declarations
pub mod codec;
pub mod context;
pub mod decorators;
pub mod editor;
pub mod element;
pub mod persistence;
pub mod schemes;
pub mod settings;
pub mod state;
pub mod storage;
pub mod template;
pub mod timestamp;
pub mod upgrade;
pub mod validation;

// Re-export commonly used types at crate root
pub use codec::Codec;
pub use context::AppContext;
pub use decorators::{AffixDecorator, ArrayDecorator, Decorator, FixedLengthDecorator};
pub use editor::{Draft, SettingsEditor};
pub use element::Element;
pub use persistence::{LoadStatus, LogNotifier, Notifier, PersistentSettings};
pub use schemes::{
    DateTimeScheme, DecimalScheme, IdType, IntegerScheme, NanoIdConfig, SchemeKind, StringScheme,
    UidScheme, UuidConfig, WordScheme,
};
pub use settings::{CURRENT_VERSION, Settings};
pub use state::{Scheme, State};
pub use storage::SettingsStorage;
pub use template::{ReferenceGraph, Template, TemplateList, TemplateReference};
pub use timestamp::Timestamp;
pub use validation::{Validatable, ValidationInfo, Validators};

// Re-export core types that are commonly used with the model
pub use randomness_core::{
    CapitalizationMode, Identifiable, Named, RandomnessError, RandomnessResult, StateId,
    TemplateId,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        AppContext,
        // Re-exported from core
        CapitalizationMode,
        Identifiable,
        Named,
        RandomnessError,
        RandomnessResult,
        // Core types
        Scheme,
        SchemeKind,
        Settings,
        State,
        Template,
        TemplateList,
        TemplateReference,
        // Validation
        Validatable,
        ValidationInfo,
    };
}
