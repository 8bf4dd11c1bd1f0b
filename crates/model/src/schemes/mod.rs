//! Data-producing schemes
//!
//! A template holds a heterogeneous list of schemes. The list is closed:
//! [`SchemeKind`] names every scheme that may appear in a template, and
//! the persisted element tag of each variant identifies it on load.

pub mod datetime;
pub mod decimal;
pub mod integer;
pub mod pattern;
pub mod string;
pub mod uid;
pub mod word;

pub use datetime::DateTimeScheme;
pub use decimal::DecimalScheme;
pub use integer::IntegerScheme;
pub use pattern::{PatternError, PatternGenerator};
pub use string::StringScheme;
pub use uid::{IdType, NanoIdConfig, UidScheme, UuidConfig};
pub use word::WordScheme;

use crate::decorators::Decorator;
use crate::settings::Settings;
use crate::state::{Scheme, State};
use crate::template::TemplateReference;
use crate::validation::{Validatable, ValidationInfo};
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessResult, StateId};

/// Any scheme that can be part of a template
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeKind {
    DateTime(DateTimeScheme),
    Decimal(DecimalScheme),
    Integer(IntegerScheme),
    String(StringScheme),
    TemplateReference(TemplateReference),
    Uid(UidScheme),
    Word(WordScheme),
}

/// Calls `$body` with `$scheme` bound to the scheme inside `$kind`
macro_rules! dispatch {
    ($kind:expr, $scheme:ident => $body:expr) => {
        match $kind {
            SchemeKind::DateTime($scheme) => $body,
            SchemeKind::Decimal($scheme) => $body,
            SchemeKind::Integer($scheme) => $body,
            SchemeKind::String($scheme) => $body,
            SchemeKind::TemplateReference($scheme) => $body,
            SchemeKind::Uid($scheme) => $body,
            SchemeKind::Word($scheme) => $body,
        }
    };
}

impl SchemeKind {
    /// Persisted element tag of this variant
    pub fn tag(&self) -> &'static str {
        match self {
            SchemeKind::DateTime(_) => "DateTimeScheme",
            SchemeKind::Decimal(_) => "DecimalScheme",
            SchemeKind::Integer(_) => "IntegerScheme",
            SchemeKind::String(_) => "StringScheme",
            SchemeKind::TemplateReference(_) => "TemplateReference",
            SchemeKind::Uid(_) => "UidScheme",
            SchemeKind::Word(_) => "WordScheme",
        }
    }

    /// The template reference inside, if this is one
    pub fn as_reference(&self) -> Option<&TemplateReference> {
        match self {
            SchemeKind::TemplateReference(reference) => Some(reference),
            _ => None,
        }
    }
}

impl Identifiable for SchemeKind {
    fn id(&self) -> StateId {
        dispatch!(self, scheme => scheme.id())
    }
}

impl State for SchemeKind {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        match self {
            SchemeKind::DateTime(it) => SchemeKind::DateTime(it.deep_copy(retain_uuid)),
            SchemeKind::Decimal(it) => SchemeKind::Decimal(it.deep_copy(retain_uuid)),
            SchemeKind::Integer(it) => SchemeKind::Integer(it.deep_copy(retain_uuid)),
            SchemeKind::String(it) => SchemeKind::String(it.deep_copy(retain_uuid)),
            SchemeKind::TemplateReference(it) => SchemeKind::TemplateReference(it.deep_copy(retain_uuid)),
            SchemeKind::Uid(it) => SchemeKind::Uid(it.deep_copy(retain_uuid)),
            SchemeKind::Word(it) => SchemeKind::Word(it.deep_copy(retain_uuid)),
        }
    }
}

impl Validatable for SchemeKind {
    fn do_validate(&self, ctx: &Settings) -> Option<ValidationInfo> {
        dispatch!(self, scheme => scheme.do_validate(ctx))
    }

    fn validate_each(&self, ctx: &Settings) -> Vec<ValidationInfo> {
        dispatch!(self, scheme => scheme.validate_each(ctx))
    }

    fn label(&self, ctx: &Settings) -> Option<String> {
        Some(self.name(ctx))
    }
}

impl Scheme for SchemeKind {
    fn name(&self, ctx: &Settings) -> String {
        dispatch!(self, scheme => scheme.name(ctx))
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        dispatch!(self, scheme => scheme.decorators())
    }

    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        dispatch!(self, scheme => scheme.generate_undecorated_strings(count, rng, ctx))
    }
}

macro_rules! impl_from {
    ($($variant:ident($scheme:ty)),* $(,)?) => {
        $(
            impl From<$scheme> for SchemeKind {
                fn from(scheme: $scheme) -> Self {
                    SchemeKind::$variant(scheme)
                }
            }
        )*
    };
}

impl_from!(
    DateTime(DateTimeScheme),
    Decimal(DecimalScheme),
    Integer(IntegerScheme),
    String(StringScheme),
    TemplateReference(TemplateReference),
    Uid(UidScheme),
    Word(WordScheme),
);
