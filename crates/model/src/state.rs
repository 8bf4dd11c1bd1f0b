//! Common contract of configuration nodes
//!
//! Every node of the settings graph has a stable identity and can be deep
//! copied. Nodes that produce data additionally implement [`Scheme`].
//!
//! Nodes do not hold a pointer to the [`Settings`] they live in. Anything
//! that depends on the rest of the graph (resolving template references,
//! naming a reference after its target) takes the settings explicitly.

use crate::decorators::{Decorator, decorate};
use crate::settings::Settings;
use crate::validation::Validatable;
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessError, RandomnessResult, StateId};

/// Identity and deep-copy contract shared by all configuration nodes
pub trait State: Identifiable + Clone {
    /// Returns a deep copy of this node and everything it owns
    ///
    /// If `retain_uuid` is false, every node in the copy gets a fresh
    /// identity, so the copy is a new, distinct entity.
    fn deep_copy(&self, retain_uuid: bool) -> Self;
}

/// Returns `uuid` if `retain` is set, or a fresh identifier otherwise
pub fn copied_uuid(uuid: StateId, retain: bool) -> StateId {
    if retain { uuid } else { StateId::new_v4() }
}

/// A configuration node that generates strings
pub trait Scheme: State + Validatable {
    /// Human-readable name of this scheme
    fn name(&self, ctx: &Settings) -> String;

    /// Decorators applied to the undecorated output, innermost first
    fn decorators(&self) -> Vec<&dyn Decorator>;

    /// Generates `count` strings without applying any decorators
    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        ctx: &Settings,
    ) -> RandomnessResult<Vec<String>>;

    /// Validates this scheme, then generates `count` decorated strings
    fn generate_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        if let Some(info) = self.do_validate(ctx) {
            return Err(RandomnessError::validation(info.message));
        }

        let decorators = self.decorators();
        decorate(&decorators, count, rng, &mut |count: usize, rng: &mut StdRng| {
            self.generate_undecorated_strings(count, rng, ctx)
        })
    }
}
