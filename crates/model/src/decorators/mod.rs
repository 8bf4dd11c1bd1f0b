//! Decorator chain
//!
//! Decorators are generation stages that wrap another generator instead of
//! producing data themselves. A scheme lists its decorators innermost
//! first; [`decorate`] nests them so that the first decorator receives the
//! raw output and the last decorator produces the final output.

pub mod affix;
pub mod array;
pub mod fixed_length;

pub use affix::AffixDecorator;
pub use array::ArrayDecorator;
pub use fixed_length::FixedLengthDecorator;

use rand::rngs::StdRng;
use randomness_core::RandomnessResult;

/// Generator wrapped by a decorator: `(count, rng) -> count strings`
pub type Upstream<'a> = dyn FnMut(usize, &mut StdRng) -> RandomnessResult<Vec<String>> + 'a;

/// A generation stage that transforms the output of an upstream generator
pub trait Decorator {
    /// Whether this decorator is applied; a disabled decorator passes through
    fn is_enabled(&self) -> bool;

    /// Decorators nested in this one, applied to this decorator's own output
    fn decorators(&self) -> Vec<&dyn Decorator> {
        Vec::new()
    }

    /// Generates `count` strings from `upstream`, assuming this decorator is enabled
    fn decorate_enabled(
        &self,
        count: usize,
        rng: &mut StdRng,
        upstream: &mut Upstream<'_>,
    ) -> RandomnessResult<Vec<String>>;

    /// Generates `count` strings from `upstream`
    fn generate(
        &self,
        count: usize,
        rng: &mut StdRng,
        upstream: &mut Upstream<'_>,
    ) -> RandomnessResult<Vec<String>> {
        if !self.is_enabled() {
            return upstream(count, rng);
        }

        let nested = self.decorators();
        decorate(&nested, count, rng, &mut |count: usize, rng: &mut StdRng| {
            self.decorate_enabled(count, rng, upstream)
        })
    }
}

/// Applies `decorators` around `base`, the first decorator innermost
pub fn decorate(
    decorators: &[&dyn Decorator],
    count: usize,
    rng: &mut StdRng,
    base: &mut Upstream<'_>,
) -> RandomnessResult<Vec<String>> {
    match decorators.split_last() {
        None => base(count, rng),
        Some((outer, inner)) => outer.generate(count, rng, &mut |count: usize, rng: &mut StdRng| {
            decorate(inner, count, rng, base)
        }),
    }
}
