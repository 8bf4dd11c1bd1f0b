//! Word scheme

use crate::decorators::{AffixDecorator, ArrayDecorator, Decorator};
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::validation::{Validator, Validators, validators};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use randomness_core::{CapitalizationMode, Identifiable, RandomnessError, RandomnessResult, StateId};

/// Words of a new word scheme
pub const DEFAULT_WORDS: [&str; 5] = ["lorem", "ipsum", "dolor", "sit", "amet"];

/// Picks words from a user-defined list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordScheme {
    pub uuid: StateId,
    pub words: Vec<String>,
    pub capitalization: CapitalizationMode,
    pub affix_decorator: AffixDecorator,
    pub array_decorator: ArrayDecorator,
}

impl WordScheme {
    /// Create a scheme that picks from `words`
    pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Default for WordScheme {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            words: DEFAULT_WORDS.iter().map(|it| it.to_string()).collect(),
            capitalization: CapitalizationMode::Retain,
            affix_decorator: AffixDecorator::new(false, "\""),
            array_decorator: ArrayDecorator::new(),
        }
    }
}

impl Identifiable for WordScheme {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for WordScheme {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            affix_decorator: self.affix_decorator.deep_copy(retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for WordScheme {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("words", |it: &WordScheme| &it.words).check(
                |_, words| !words.is_empty(),
                |_, _| "Enter at least one word.".to_string(),
            );
            dsl.include("affixDecorator", |it: &WordScheme| &it.affix_decorator);
            dsl.include("arrayDecorator", |it: &WordScheme| &it.array_decorator);
        })
    }
}

impl Scheme for WordScheme {
    fn name(&self, _ctx: &Settings) -> String {
        "Word".to_string()
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
        (0..count)
            .map(|_| -> RandomnessResult<String> {
                let word = self
                    .words
                    .choose(rng)
                    .ok_or_else(|| RandomnessError::generation("Enter at least one word."))?;
                Ok(self.capitalization.transform(word, rng))
            })
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
    fn test_picks_from_list() {
        let scheme = WordScheme::new(["a", "b", "c"]);
        let output = scheme.generate_strings(50, &mut rng(), &ctx()).unwrap();
        assert_eq!(output.len(), 50);
        assert!(output.iter().all(|it| ["a", "b", "c"].contains(&it.as_str())));
    }

    #[test]
    fn test_capitalization() {
        let scheme = WordScheme {
            capitalization: CapitalizationMode::FirstLetter,
            ..WordScheme::new(["hello world"])
        };
        assert_eq!(scheme.generate_strings(1, &mut rng(), &ctx()).unwrap(), vec!["Hello World"]);
    }

    #[test]
    fn test_affix_then_array() {
        let scheme = WordScheme {
            affix_decorator: AffixDecorator::new(true, "\""),
            array_decorator: ArrayDecorator::new().with_enabled(true).with_counts(2, 2),
            ..WordScheme::new(["w"])
        };
        assert_eq!(
            scheme.generate_strings(1, &mut rng(), &ctx()).unwrap(),
            vec!["[\"w\", \"w\"]"]
        );
    }

    #[test]
    fn test_empty_list_is_invalid() {
        let scheme = WordScheme::new(Vec::<String>::new());
        assert_eq!(scheme.do_validate(&ctx()).unwrap().property, "words");
        assert!(scheme.generate_strings(1, &mut rng(), &ctx()).is_err());
    }
}
