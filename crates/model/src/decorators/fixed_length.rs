//! Fixed-length decorator

use super::{Decorator, Upstream};
use crate::state::{State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessResult, StateId};

/// Truncates or left-pads values to exactly `length` characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLengthDecorator {
    pub uuid: StateId,
    pub enabled: bool,
    pub length: usize,
    pub filler: String,
}

impl FixedLengthDecorator {
    /// Create a fixed-length decorator
    pub fn new(enabled: bool, length: usize, filler: impl Into<String>) -> Self {
        Self {
            uuid: StateId::new_v4(),
            enabled,
            length,
            filler: filler.into(),
        }
    }
}

impl Default for FixedLengthDecorator {
    fn default() -> Self {
        Self::new(false, 3, "0")
    }
}

impl Identifiable for FixedLengthDecorator {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for FixedLengthDecorator {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for FixedLengthDecorator {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("length", |it: &FixedLengthDecorator| &it.length).check(
                |_, length| *length >= 1,
                |_, _| "Length should be at least 1.".to_string(),
            );
            dsl.of("filler", |it: &FixedLengthDecorator| it.filler.as_str())
                .check(
                    |_, filler| filler.chars().count() == 1,
                    |_, _| "Filler should be exactly 1 character.".to_string(),
                );
        })
    }
}

impl Decorator for FixedLengthDecorator {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn decorate_enabled(
        &self,
        count: usize,
        rng: &mut StdRng,
        upstream: &mut Upstream<'_>,
    ) -> RandomnessResult<Vec<String>> {
        let filler = self.filler.chars().next().unwrap_or('0');
        Ok(upstream(count, rng)?
            .into_iter()
            .map(|value| {
                let truncated: String = value.chars().take(self.length).collect();
                let padding = self.length - truncated.chars().count();
                std::iter::repeat_n(filler, padding).chain(truncated.chars()).collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorators::tests::rng;
    use crate::settings::Settings;
    use crate::validation::Validatable;

    fn fix(decorator: &FixedLengthDecorator, input: &str) -> String {
        decorator
            .generate(1, &mut rng(), &mut |_, _| Ok(vec![input.to_string()]))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_pads_on_the_left() {
        assert_eq!(fix(&FixedLengthDecorator::new(true, 5, "0"), "42"), "00042");
        assert_eq!(fix(&FixedLengthDecorator::new(true, 3, "é"), ""), "ééé");
    }

    #[test]
    fn test_truncates_from_the_start() {
        assert_eq!(fix(&FixedLengthDecorator::new(true, 3, "0"), "123456"), "123");
        assert_eq!(fix(&FixedLengthDecorator::new(true, 3, "0"), "123"), "123");
    }

    #[test]
    fn test_disabled_passes_through() {
        assert_eq!(fix(&FixedLengthDecorator::new(false, 3, "0"), "123456"), "123456");
    }

    #[test]
    fn test_validation() {
        let ctx = Settings::default();
        assert!(FixedLengthDecorator::new(true, 3, "0").do_validate(&ctx).is_none());
        assert_eq!(
            FixedLengthDecorator::new(true, 0, "0").do_validate(&ctx).unwrap().property,
            "length"
        );
        assert_eq!(
            FixedLengthDecorator::new(true, 3, "00").do_validate(&ctx).unwrap().property,
            "filler"
        );
        assert_eq!(
            FixedLengthDecorator::new(true, 3, "").do_validate(&ctx).unwrap().property,
            "filler"
        );
    }

    #[test]
    fn test_disabled_decorator_is_still_validated() {
        let ctx = Settings::default();
        assert_eq!(
            FixedLengthDecorator::new(false, 3, "ab").do_validate(&ctx).unwrap().property,
            "filler"
        );
        assert_eq!(FixedLengthDecorator::new(false, 0, "").validate_each(&ctx).len(), 2);
        assert!(FixedLengthDecorator::default().do_validate(&ctx).is_none());
    }
}
