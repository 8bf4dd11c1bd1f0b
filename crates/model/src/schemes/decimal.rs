//! Decimal scheme

use crate::decorators::{AffixDecorator, ArrayDecorator, Decorator};
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::Rng;
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessResult, StateId};

/// Largest allowed difference between the minimum and maximum value
pub const MAX_VALUE_DIFFERENCE: f64 = 1e53;

/// Generates decimal numbers in a range
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalScheme {
    pub uuid: StateId,
    pub min_value: f64,
    pub max_value: f64,
    pub decimal_count: usize,
    pub show_trailing_zeroes: bool,
    pub grouping_separator_enabled: bool,
    pub grouping_separator: String,
    pub decimal_separator: String,
    pub affix_decorator: AffixDecorator,
    pub array_decorator: ArrayDecorator,
}

impl DecimalScheme {
    /// Create a scheme for `min..=max`
    pub fn new(min_value: f64, max_value: f64) -> Self {
        Self {
            min_value,
            max_value,
            ..Self::default()
        }
    }

    /// Set the number of decimals
    pub fn with_decimal_count(mut self, decimal_count: usize) -> Self {
        self.decimal_count = decimal_count;
        self
    }

    fn format(&self, value: f64) -> String {
        let text = format!("{value:.*}", self.decimal_count);
        let text = if self.show_trailing_zeroes || !text.contains('.') {
            text
        } else {
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        };

        let (sign, unsigned) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text.as_str()),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (unsigned, None),
        };

        let integer = if self.grouping_separator_enabled {
            let chars: Vec<char> = integer.chars().collect();
            chars
                .rchunks(3)
                .rev()
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
                .join(self.grouping_separator.as_str())
        } else {
            integer.to_string()
        };

        match fraction {
            Some(fraction) => format!("{sign}{integer}{}{fraction}", self.decimal_separator),
            None => format!("{sign}{integer}"),
        }
    }
}

impl Default for DecimalScheme {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            min_value: 0.0,
            max_value: 1000.0,
            decimal_count: 2,
            show_trailing_zeroes: true,
            grouping_separator_enabled: false,
            grouping_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            affix_decorator: AffixDecorator::default(),
            array_decorator: ArrayDecorator::new(),
        }
    }
}

impl Identifiable for DecimalScheme {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for DecimalScheme {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            affix_decorator: self.affix_decorator.deep_copy(retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for DecimalScheme {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("minValue", |it: &DecimalScheme| &it.min_value).check(
                |_, min| min.is_finite(),
                |_, _| "Minimum value should be a finite number.".to_string(),
            );
            dsl.of("maxValue", |it: &DecimalScheme| &it.max_value)
                .check(
                    |_, max| max.is_finite(),
                    |_, _| "Maximum value should be a finite number.".to_string(),
                )
                .check(
                    |it, max| *max >= it.min_value,
                    |_, _| "Maximum value should not be smaller than minimum value.".to_string(),
                )
                .check(
                    |it, max| *max - it.min_value <= MAX_VALUE_DIFFERENCE,
                    |_, _| "Value range should not exceed 1e53.".to_string(),
                );
            dsl.case(
                |it: &DecimalScheme| it.grouping_separator_enabled,
                |dsl| {
                    dsl.of("groupingSeparator", |it: &DecimalScheme| it.grouping_separator.as_str())
                        .check(
                            |_, separator| separator.chars().count() == 1,
                            |_, _| "Grouping separator should be exactly 1 character.".to_string(),
                        );
                },
            );
            dsl.of("decimalSeparator", |it: &DecimalScheme| it.decimal_separator.as_str())
                .check(
                    |_, separator| separator.chars().count() == 1,
                    |_, _| "Decimal separator should be exactly 1 character.".to_string(),
                );
            dsl.include("affixDecorator", |it: &DecimalScheme| &it.affix_decorator);
            dsl.include("arrayDecorator", |it: &DecimalScheme| &it.array_decorator);
        })
    }
}

impl Scheme for DecimalScheme {
    fn name(&self, _ctx: &Settings) -> String {
        "Decimal".to_string()
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        vec![&self.affix_decorator, &self.array_decorator]
    }

    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        _ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        Ok((0..count)
            .map(|_| {
                let value = if self.min_value == self.max_value {
                    self.min_value
                } else {
                    rng.gen_range(self.min_value..=self.max_value)
                };
                self.format(value)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorators::tests::rng;
    use crate::validation::Validatable;

    fn ctx() -> Settings {
        Settings::default()
    }

    fn one(scheme: DecimalScheme) -> String {
        scheme.generate_strings(1, &mut rng(), &ctx()).unwrap().remove(0)
    }

    #[test]
    fn test_generates_within_range() {
        let output = DecimalScheme::new(-2.5, 7.5).generate_strings(100, &mut rng(), &ctx()).unwrap();
        for value in output {
            let parsed: f64 = value.parse().unwrap();
            assert!((-2.5..=7.5).contains(&parsed), "{value}");
            assert_eq!(value.split('.').nth(1).map(str::len), Some(2));
        }
    }

    #[test]
    fn test_trailing_zeroes() {
        assert_eq!(one(DecimalScheme::new(1.5, 1.5).with_decimal_count(3)), "1.500");
        assert_eq!(
            one(DecimalScheme {
                show_trailing_zeroes: false,
                ..DecimalScheme::new(1.5, 1.5).with_decimal_count(3)
            }),
            "1.5"
        );
        assert_eq!(
            one(DecimalScheme {
                show_trailing_zeroes: false,
                ..DecimalScheme::new(100.0, 100.0)
            }),
            "100"
        );
        assert_eq!(one(DecimalScheme::new(7.0, 7.0).with_decimal_count(0)), "7");
    }

    #[test]
    fn test_separators() {
        let scheme = DecimalScheme {
            grouping_separator_enabled: true,
            grouping_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            ..DecimalScheme::new(-1234567.25, -1234567.25)
        };
        assert_eq!(one(scheme), "-1.234.567,25");
    }

    #[test]
    fn test_validation() {
        let ctx = ctx();
        assert!(DecimalScheme::default().do_validate(&ctx).is_none());
        assert_eq!(DecimalScheme::new(2.0, 1.0).do_validate(&ctx).unwrap().property, "maxValue");
        assert_eq!(
            DecimalScheme::new(-1e53, 1e53).do_validate(&ctx).unwrap().message,
            "Value range should not exceed 1e53."
        );
        assert_eq!(
            DecimalScheme {
                decimal_separator: String::new(),
                ..DecimalScheme::default()
            }
            .do_validate(&ctx)
            .unwrap()
            .property,
            "decimalSeparator"
        );
        assert!(
            DecimalScheme {
                grouping_separator: "ab".to_string(),
                ..DecimalScheme::default()
            }
            .do_validate(&ctx)
            .is_none()
        );
    }
}
