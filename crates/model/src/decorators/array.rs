//! Array decorator

use super::{AffixDecorator, Decorator, Upstream};
use crate::state::{State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::Rng;
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessResult, StateId};

/// Default element format
pub const DEFAULT_ELEMENT_FORMAT: &str = "{val}";

/// Default separator between elements
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Turns values into arrays of values
///
/// Each output gets an independently drawn number of elements in
/// `min_count..=max_count`. Elements are formatted with `element_format`,
/// where `{aid}` is the index of the array, `{eid}` the index of the element
/// in its array, and `{val}` the element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDecorator {
    pub uuid: StateId,
    pub enabled: bool,
    pub min_count: usize,
    pub max_count: usize,
    pub separator_enabled: bool,
    pub separator: String,
    pub element_format: String,
    pub affix_decorator: AffixDecorator,
}

impl ArrayDecorator {
    /// Create a disabled array decorator with default settings
    pub fn new() -> Self {
        Self {
            uuid: StateId::new_v4(),
            enabled: false,
            min_count: 3,
            max_count: 3,
            separator_enabled: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            element_format: DEFAULT_ELEMENT_FORMAT.to_string(),
            affix_decorator: AffixDecorator::new(true, "[@]"),
        }
    }

    /// Enable or disable the decorator
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the inclusive range of element counts
    pub fn with_counts(mut self, min_count: usize, max_count: usize) -> Self {
        self.min_count = min_count;
        self.max_count = max_count;
        self
    }

    /// Set the separator, or disable it with `None`
    pub fn with_separator(mut self, separator: Option<&str>) -> Self {
        self.separator_enabled = separator.is_some();
        if let Some(separator) = separator {
            self.separator = separator.to_string();
        }
        self
    }

    /// Set the element format
    pub fn with_element_format(mut self, format: impl Into<String>) -> Self {
        self.element_format = format.into();
        self
    }

    /// Set the affix around the whole array
    pub fn with_affix(mut self, affix: AffixDecorator) -> Self {
        self.affix_decorator = affix;
        self
    }

    fn join(&self, elements: &[String]) -> String {
        if self.separator_enabled {
            elements.join(self.separator.replace("\\n", "\n").as_str())
        } else {
            elements.concat()
        }
    }
}

impl Default for ArrayDecorator {
    fn default() -> Self {
        Self::new()
    }
}

impl Identifiable for ArrayDecorator {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for ArrayDecorator {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            affix_decorator: self.affix_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for ArrayDecorator {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("minCount", |it: &ArrayDecorator| &it.min_count).check(
                |_, min| *min >= 1,
                |_, _| "Minimum count should be at least 1.".to_string(),
            );
            dsl.of("maxCount", |it: &ArrayDecorator| &it.max_count).check(
                |it, max| *max >= it.min_count,
                |_, _| "Maximum count should not be smaller than minimum count.".to_string(),
            );
            dsl.include("affixDecorator", |it: &ArrayDecorator| &it.affix_decorator);
        })
    }
}

impl Decorator for ArrayDecorator {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        vec![&self.affix_decorator]
    }

    fn decorate_enabled(
        &self,
        count: usize,
        rng: &mut StdRng,
        upstream: &mut Upstream<'_>,
    ) -> RandomnessResult<Vec<String>> {
        let max_count = self.max_count.max(self.min_count);
        let part_sizes: Vec<usize> = (0..count)
            .map(|_| rng.gen_range(self.min_count..=max_count))
            .collect();

        let mut values = upstream(part_sizes.iter().sum(), rng)?.into_iter();

        Ok(part_sizes
            .iter()
            .enumerate()
            .map(|(array_index, &size)| {
                let elements: Vec<String> = values
                    .by_ref()
                    .take(size)
                    .enumerate()
                    .map(|(element_index, value)| {
                        self.element_format
                            .replace("{aid}", &array_index.to_string())
                            .replace("{eid}", &element_index.to_string())
                            .replace("{val}", &value)
                    })
                    .collect();
                self.join(&elements)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorators::tests::{counting, rng};
    use crate::settings::Settings;
    use crate::validation::Validatable;

    fn enabled() -> ArrayDecorator {
        ArrayDecorator::new().with_enabled(true)
    }

    #[test]
    fn test_disabled_returns_upstream_unchanged() {
        let output = ArrayDecorator::new()
            .generate(4, &mut rng(), &mut counting())
            .unwrap();
        assert_eq!(output, vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn test_fixed_count_produces_exact_arrays() {
        for count in [0, 1, 5, 20] {
            let output = enabled()
                .with_affix(AffixDecorator::new(false, ""))
                .generate(count, &mut rng(), &mut |n, _| Ok(vec!["x".to_string(); n]))
                .unwrap();
            assert_eq!(output.len(), count);
            assert!(output.iter().all(|it| it == "x, x, x"));
        }
    }

    #[test]
    fn test_partitions_single_upstream_batch_in_order() {
        let mut calls = 0;
        let output = enabled()
            .with_counts(2, 2)
            .generate(2, &mut rng(), &mut |n, _| {
                calls += 1;
                Ok((0..n).map(|it| it.to_string()).collect())
            })
            .unwrap();
        assert_eq!(output, vec!["[0, 1]", "[2, 3]"]);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_counts_within_range() {
        let output = enabled()
            .with_counts(1, 4)
            .with_affix(AffixDecorator::new(false, ""))
            .generate(50, &mut rng(), &mut |n, _| Ok(vec!["x".to_string(); n]))
            .unwrap();
        for array in output {
            let size = array.split(", ").count();
            assert!((1..=4).contains(&size), "size {size} out of range");
        }
    }

    #[test]
    fn test_element_format_substitutes_val_last() {
        let output = enabled()
            .with_counts(2, 2)
            .with_separator(Some("\\n"))
            .with_element_format("{aid}.{eid}={val}")
            .with_affix(AffixDecorator::new(false, ""))
            .generate(1, &mut rng(), &mut |n, _| Ok(vec!["{eid}".to_string(); n]))
            .unwrap();
        assert_eq!(output, vec!["0.0={eid}\n0.1={eid}"]);
    }

    #[test]
    fn test_separator_disabled_concatenates() {
        let output = enabled()
            .with_counts(3, 3)
            .with_separator(None)
            .generate(1, &mut rng(), &mut |n, _| Ok(vec!["a".to_string(); n]))
            .unwrap();
        assert_eq!(output, vec!["[aaa]"]);
    }

    #[test]
    fn test_only_newline_escape_is_converted() {
        let output = enabled()
            .with_counts(2, 2)
            .with_separator(Some("\\t"))
            .with_affix(AffixDecorator::new(false, ""))
            .generate(1, &mut rng(), &mut |n, _| Ok(vec!["a".to_string(); n]))
            .unwrap();
        assert_eq!(output, vec!["a\\ta"]);
    }

    #[test]
    fn test_validation() {
        let ctx = Settings::default();
        assert!(enabled().do_validate(&ctx).is_none());
        assert_eq!(
            enabled().with_counts(0, 3).do_validate(&ctx).unwrap().property,
            "minCount"
        );
        assert_eq!(
            enabled().with_counts(4, 3).do_validate(&ctx).unwrap().property,
            "maxCount"
        );
        assert_eq!(
            enabled()
                .with_affix(AffixDecorator::new(true, "\\"))
                .do_validate(&ctx)
                .unwrap()
                .property,
            "affixDecorator.descriptor"
        );
    }

    #[test]
    fn test_disabled_array_is_still_validated() {
        let ctx = Settings::default();
        let failures = ArrayDecorator::new().with_counts(0, 0).validate_each(&ctx);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].property, "minCount");

        let descending = ArrayDecorator::new().with_counts(4, 3);
        assert_eq!(descending.do_validate(&ctx).unwrap().property, "maxCount");
        assert!(ArrayDecorator::new().do_validate(&ctx).is_none());
    }

    #[test]
    fn test_deep_copy_cascades_to_affix() {
        let array = enabled();
        let copy = array.deep_copy(false);
        assert_ne!(copy.uuid, array.uuid);
        assert_ne!(copy.affix_decorator.uuid, array.affix_decorator.uuid);
        assert_eq!(array.deep_copy(true), array);
    }
}
