//! Prefix/suffix decorator

use super::{Decorator, Upstream};
use crate::state::{State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessResult, StateId};

/// Surrounds each value with a prefix and a suffix
///
/// In the `descriptor`, `\` escapes the next character (including itself)
/// and each unescaped `@` is replaced by the original value. A descriptor
/// without an unescaped `@` is placed both before and after the value:
/// `"(@)"` turns `word` into `(word)`, while `"()"` turns it into `()word()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixDecorator {
    pub uuid: StateId,
    pub enabled: bool,
    pub descriptor: String,
}

impl AffixDecorator {
    /// Create an affix decorator
    pub fn new(enabled: bool, descriptor: impl Into<String>) -> Self {
        Self {
            uuid: StateId::new_v4(),
            enabled,
            descriptor: descriptor.into(),
        }
    }

    /// Splits the descriptor around unescaped `@`, resolving escapes
    fn segments(&self) -> Vec<String> {
        let mut segments = vec![String::new()];
        let mut escaped = false;

        for c in self.descriptor.chars() {
            let Some(current) = segments.last_mut() else {
                break;
            };
            match c {
                '\\' if escaped => {
                    current.push('\\');
                    escaped = false;
                }
                '\\' => escaped = true,
                '@' if !escaped => segments.push(String::new()),
                other => {
                    current.push(other);
                    escaped = false;
                }
            }
        }

        if segments.len() == 1 {
            segments.push(segments[0].clone());
        }
        segments
    }
}

impl Default for AffixDecorator {
    fn default() -> Self {
        Self::new(false, "")
    }
}

/// Whether `text` ends in an escape character that escapes nothing
pub(crate) fn has_trailing_escape(text: &str) -> bool {
    text.chars()
        .fold(false, |escaped, c| if c == '\\' { !escaped } else { false })
}

impl Identifiable for AffixDecorator {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for AffixDecorator {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for AffixDecorator {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.case(
                |it: &AffixDecorator| it.enabled,
                |dsl| {
                    dsl.of("descriptor", |it: &AffixDecorator| it.descriptor.as_str())
                        .check(
                            |_, descriptor| !has_trailing_escape(descriptor),
                            |_, _| "Affix should not end with an unescaped backslash.".to_string(),
                        );
                },
            );
        })
    }
}

impl Decorator for AffixDecorator {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn decorate_enabled(
        &self,
        count: usize,
        rng: &mut StdRng,
        upstream: &mut Upstream<'_>,
    ) -> RandomnessResult<Vec<String>> {
        let segments = self.segments();
        Ok(upstream(count, rng)?
            .iter()
            .map(|value| segments.join(value.as_str()))
            .collect())
    }
}
