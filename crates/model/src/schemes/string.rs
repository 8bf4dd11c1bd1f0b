//! String scheme

use super::pattern::{PatternError, PatternGenerator};
use crate::decorators::{ArrayDecorator, Decorator};
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::SeedableRng;
use rand::rngs::StdRng;
use randomness_core::{
    CapitalizationMode, Identifiable, RandomnessError, RandomnessResult, StateId,
};
use regex::Regex;
use std::sync::LazyLock;

/// Default pattern
pub const DEFAULT_PATTERN: &str = "[a-zA-Z0-9]{7,11}";

/// Characters that are easily mistaken for one another
pub const LOOK_ALIKE_CHARACTERS: &str = "01lLiIoO|﹒";

static EMPTY_CURLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\\]\{}").expect("Invalid curly regex"));

static EMPTY_SQUARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\\]\[]").expect("Invalid square regex"));

/// Generates strings from a pattern, which may or may not be a regex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringScheme {
    pub uuid: StateId,
    pub pattern: String,
    pub is_regex: bool,
    pub is_non_matching: bool,
    pub capitalization: CapitalizationMode,
    pub remove_look_alike_symbols: bool,
    pub array_decorator: ArrayDecorator,
}

impl StringScheme {
    /// Create a regex scheme for `pattern`
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Create a scheme that outputs `pattern` literally
    pub fn literal(pattern: impl Into<String>) -> Self {
        Self {
            is_regex: false,
            ..Self::new(pattern)
        }
    }

    fn generate_one(&self, generator: Option<&PatternGenerator>, rng: &mut StdRng) -> RandomnessResult<String> {
        let raw = match generator {
            None => self.pattern.clone(),
            Some(generator) if self.is_non_matching => generator
                .generate_non_matching(rng)
                .map_err(|e| RandomnessError::generation(e.to_string()))?,
            Some(generator) => generator
                .generate(rng)
                .map_err(|e| RandomnessError::generation(e.to_string()))?,
        };

        let capitalized = self.capitalization.transform(&raw, rng);
        if self.remove_look_alike_symbols {
            Ok(capitalized
                .chars()
                .filter(|c| !LOOK_ALIKE_CHARACTERS.contains(*c))
                .collect())
        } else {
            Ok(capitalized)
        }
    }
}

impl Default for StringScheme {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            pattern: DEFAULT_PATTERN.to_string(),
            is_regex: true,
            is_non_matching: false,
            capitalization: CapitalizationMode::Retain,
            remove_look_alike_symbols: false,
            array_decorator: ArrayDecorator::new(),
        }
    }
}

/// Whether `pattern` ends in an odd number of backslashes
fn has_trailing_backslash(pattern: &str) -> bool {
    pattern.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

impl Identifiable for StringScheme {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for StringScheme {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for StringScheme {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.case(
                |it: &StringScheme| it.is_regex,
                |dsl| {
                    dsl.of("pattern", |it: &StringScheme| it.pattern.as_str())
                        .check(
                            |_, pattern| !has_trailing_backslash(pattern),
                            |_, _| "Regex should not end with an unescaped backslash.".to_string(),
                        )
                        .check(
                            |_, pattern| pattern != "{}" && !EMPTY_CURLY.is_match(pattern),
                            |_, _| "Regex should not contain an empty {} quantifier.".to_string(),
                        )
                        .check(
                            |_, pattern| pattern != "[]" && !EMPTY_SQUARE.is_match(pattern),
                            |_, _| "Regex should not contain an empty [] group.".to_string(),
                        )
                        .check_no_exception(|it: &StringScheme, pattern| {
                            let generator = PatternGenerator::parse(pattern)?;
                            if it.is_non_matching {
                                generator.generate_non_matching(&mut StdRng::seed_from_u64(0))?;
                            }
                            Ok::<_, PatternError>(())
                        });
                },
            );
            dsl.include("arrayDecorator", |it: &StringScheme| &it.array_decorator);
        })
    }
}

impl Scheme for StringScheme {
    fn name(&self, _ctx: &Settings) -> String {
        "String".to_string()
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
        let generator = if self.is_regex {
            Some(PatternGenerator::parse(&self.pattern).map_err(|e| RandomnessError::generation(e.to_string()))?)
        } else {
            None
        };

        (0..count)
            .map(|_| self.generate_one(generator.as_ref(), rng))
            .collect()
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

    #[test]
    fn test_default_pattern_output() {
        let output = StringScheme::default()
            .generate_strings(30, &mut rng(), &ctx())
            .unwrap();
        assert_eq!(output.len(), 30);
        for string in output {
            assert!((7..=11).contains(&string.len()));
            assert!(string.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_literal_pattern_is_not_interpreted() {
        let output = StringScheme::literal("[a-z]{3}")
            .generate_strings(2, &mut rng(), &ctx())
            .unwrap();
        assert_eq!(output, vec!["[a-z]{3}", "[a-z]{3}"]);
    }

    #[test]
    fn test_non_matching_output() {
        let scheme = StringScheme {
            is_non_matching: true,
            ..StringScheme::new("[0-9]+")
        };
        let matcher = Regex::new("^[0-9]+$").unwrap();
        for string in scheme.generate_strings(10, &mut rng(), &ctx()).unwrap() {
            assert!(!matcher.is_match(&string), "'{string}' matches");
        }
    }

    #[test]
    fn test_capitalization_is_applied() {
        let scheme = StringScheme {
            capitalization: CapitalizationMode::Upper,
            ..StringScheme::literal("abc")
        };
        assert_eq!(scheme.generate_strings(1, &mut rng(), &ctx()).unwrap(), vec!["ABC"]);
    }

    #[test]
    fn test_look_alike_symbols_are_removed() {
        let scheme = StringScheme {
            remove_look_alike_symbols: true,
            ..StringScheme::literal("a0b1cOdl|e﹒")
        };
        assert_eq!(scheme.generate_strings(1, &mut rng(), &ctx()).unwrap(), vec!["abcde"]);
    }

    #[test]
    fn test_array_decorator_is_applied() {
        let scheme = StringScheme {
            array_decorator: ArrayDecorator::new().with_enabled(true).with_counts(2, 2),
            ..StringScheme::literal("x")
        };
        assert_eq!(scheme.generate_strings(1, &mut rng(), &ctx()).unwrap(), vec!["[x, x]"]);
    }

    #[test]
    fn test_validation_of_patterns() {
        let ctx = ctx();
        assert!(StringScheme::default().do_validate(&ctx).is_none());
        assert!(StringScheme::new("a\\\\").do_validate(&ctx).is_none());

        for pattern in ["a\\", "{}", "a{}", "[]", "x[]", "(ab"] {
            let info = StringScheme::new(pattern).do_validate(&ctx);
            assert_eq!(info.map(|it| it.property), Some("pattern".to_string()), "{pattern}");
        }

        assert!(StringScheme::new("a\\{}").do_validate(&ctx).is_none());
        assert!(StringScheme::literal("(ab").do_validate(&ctx).is_none());
    }

    #[test]
    fn test_pattern_without_non_matching_strings_is_invalid() {
        let ctx = ctx();
        let everything = StringScheme {
            is_non_matching: true,
            ..StringScheme::new(".*")
        };
        let info = everything.do_validate(&ctx).unwrap();
        assert_eq!(info.property, "pattern");
        assert_eq!(info.message, "Could not find a string that does not match '.*'.");
        assert!(everything.generate_strings(1, &mut rng(), &ctx).unwrap_err().is_validation());

        let digits = StringScheme {
            is_non_matching: true,
            ..StringScheme::new("[0-9]+")
        };
        assert!(digits.do_validate(&ctx).is_none());
        assert!(StringScheme::new(".*").do_validate(&ctx).is_none());
    }

    #[test]
    fn test_invalid_scheme_does_not_generate() {
        let err = StringScheme::new("(ab").generate_strings(1, &mut rng(), &ctx()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_deep_copy() {
        let scheme = StringScheme::default();
        assert_eq!(scheme.deep_copy(true), scheme);
        let copy = scheme.deep_copy(false);
        assert_ne!(copy.uuid, scheme.uuid);
        assert_ne!(copy.array_decorator.uuid, scheme.array_decorator.uuid);
    }
}
