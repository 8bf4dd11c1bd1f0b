//! Integer scheme

use crate::decorators::{AffixDecorator, ArrayDecorator, Decorator, FixedLengthDecorator};
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::Rng;
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessResult, StateId};

/// Smallest supported base
pub const MIN_BASE: u32 = 2;

/// Largest supported base
pub const MAX_BASE: u32 = 36;

/// Generates integers in a range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerScheme {
    pub uuid: StateId,
    pub min_value: i64,
    pub max_value: i64,
    pub base: u32,
    pub is_uppercase: bool,
    pub grouping_separator_enabled: bool,
    pub grouping_separator: String,
    pub fixed_length_decorator: FixedLengthDecorator,
    pub affix_decorator: AffixDecorator,
    pub array_decorator: ArrayDecorator,
}

impl IntegerScheme {
    /// Create a base-10 scheme for `min..=max`
    pub fn new(min_value: i64, max_value: i64) -> Self {
        Self {
            min_value,
            max_value,
            ..Self::default()
        }
    }

    /// Set the base
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// Enable grouping with `separator`, or disable it with `None`
    pub fn with_grouping(mut self, separator: Option<&str>) -> Self {
        self.grouping_separator_enabled = separator.is_some();
        if let Some(separator) = separator {
            self.grouping_separator = separator.to_string();
        }
        self
    }

    fn format(&self, value: i64) -> String {
        let digits = to_radix(value.unsigned_abs(), self.base);
        let digits = if self.is_uppercase { digits.to_uppercase() } else { digits };
        let digits = if self.base == 10 && self.grouping_separator_enabled {
            group(&digits, &self.grouping_separator)
        } else {
            digits
        };

        if value < 0 { format!("-{digits}") } else { digits }
    }
}

impl Default for IntegerScheme {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            min_value: 0,
            max_value: 1000,
            base: 10,
            is_uppercase: false,
            grouping_separator_enabled: false,
            grouping_separator: ",".to_string(),
            fixed_length_decorator: FixedLengthDecorator::default(),
            affix_decorator: AffixDecorator::default(),
            array_decorator: ArrayDecorator::new(),
        }
    }
}

/// Lowercase digits of `value` in `base`
fn to_radix(mut value: u64, base: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        let digit = (value % u64::from(base)) as u32;
        digits.push(char::from_digit(digit, base).unwrap_or('?'));
        value /= u64::from(base);
    }
    digits.iter().rev().collect()
}

/// Inserts `separator` between groups of three digits, counted from the right
fn group(digits: &str, separator: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    chars
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(separator)
}

impl Identifiable for IntegerScheme {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for IntegerScheme {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            fixed_length_decorator: self.fixed_length_decorator.deep_copy(retain_uuid),
            affix_decorator: self.affix_decorator.deep_copy(retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for IntegerScheme {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("maxValue", |it: &IntegerScheme| &it.max_value).check(
                |it, max| *max >= it.min_value,
                |_, _| "Maximum value should not be smaller than minimum value.".to_string(),
            );
            dsl.of("base", |it: &IntegerScheme| &it.base).check(
                |_, base| (MIN_BASE..=MAX_BASE).contains(base),
                |_, base| format!("Base {base} is not in range {MIN_BASE}..{MAX_BASE}."),
            );
            dsl.case(
                |it: &IntegerScheme| it.base == 10 && it.grouping_separator_enabled,
                |dsl| {
                    dsl.of("groupingSeparator", |it: &IntegerScheme| it.grouping_separator.as_str())
                        .check(
                            |_, separator| separator.chars().count() == 1,
                            |_, _| "Grouping separator should be exactly 1 character.".to_string(),
                        );
                },
            );
            dsl.include("fixedLengthDecorator", |it: &IntegerScheme| &it.fixed_length_decorator);
            dsl.include("affixDecorator", |it: &IntegerScheme| &it.affix_decorator);
            dsl.include("arrayDecorator", |it: &IntegerScheme| &it.array_decorator);
        })
    }
}

impl Scheme for IntegerScheme {
    fn name(&self, _ctx: &Settings) -> String {
        "Integer".to_string()
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        vec![
            &self.fixed_length_decorator,
            &self.affix_decorator,
            &self.array_decorator,
        ]
    }

    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        _ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        Ok((0..count)
            .map(|_| self.format(rng.gen_range(self.min_value..=self.max_value)))
            .collect())
    }
}
