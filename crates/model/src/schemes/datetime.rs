//! Date-time scheme

use crate::decorators::{ArrayDecorator, Decorator};
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::timestamp::{EPOCH, Timestamp, next_date_time_inclusive};
use crate::validation::{Validator, Validators, validators};
use chrono::format::{Item, StrftimeItems};
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessError, RandomnessResult, StateId};
use std::fmt::Write;

/// Default `strftime` pattern
pub const DEFAULT_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Generates date-times between two bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeScheme {
    pub uuid: StateId,
    pub min_date_time: Timestamp,
    pub max_date_time: Timestamp,
    pub pattern: String,
    pub array_decorator: ArrayDecorator,
}

impl DateTimeScheme {
    /// Create a scheme for date-times between `min` and `max`, inclusive
    pub fn new(min: Timestamp, max: Timestamp) -> Self {
        Self {
            min_date_time: min,
            max_date_time: max,
            ..Self::default()
        }
    }

    /// Set the output pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}

impl Default for DateTimeScheme {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            min_date_time: Timestamp::new(EPOCH),
            max_date_time: Timestamp::now(),
            pattern: DEFAULT_PATTERN.to_string(),
            array_decorator: ArrayDecorator::new(),
        }
    }
}

/// Fails if `pattern` contains an unknown or incomplete specifier
fn check_pattern(pattern: &str) -> Result<(), String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        Err(format!("Invalid date-time pattern '{pattern}'."))
    } else {
        Ok(())
    }
}

impl Identifiable for DateTimeScheme {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for DateTimeScheme {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for DateTimeScheme {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.include("minDateTime", |it: &DateTimeScheme| &it.min_date_time);
            dsl.include("maxDateTime", |it: &DateTimeScheme| &it.max_date_time);
            dsl.of("maxDateTime", |it: &DateTimeScheme| &it.max_date_time).check(
                |it, max| !max.is_before(&it.min_date_time),
                |_, _| "Maximum date-time should not be before minimum date-time.".to_string(),
            );
            dsl.of("pattern", |it: &DateTimeScheme| it.pattern.as_str())
                .check_no_exception(|_, pattern| check_pattern(pattern));
            dsl.include("arrayDecorator", |it: &DateTimeScheme| &it.array_decorator);
        })
    }
}

impl Scheme for DateTimeScheme {
    fn name(&self, _ctx: &Settings) -> String {
        "Date-time".to_string()
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        vec![&self.array_decorator]
    }

    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        _ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        (0..count)
            .map(|_| -> RandomnessResult<String> {
                let date_time = next_date_time_inclusive(rng, &self.min_date_time, &self.max_date_time)?;
                let mut output = String::new();
                write!(output, "{}", date_time.format(&self.pattern)).map_err(|_| {
                    RandomnessError::generation(format!("Invalid date-time pattern '{}'.", self.pattern))
                })?;
                Ok(output)
            })
            .collect()
    }
}
