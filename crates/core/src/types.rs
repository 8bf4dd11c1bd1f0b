//! Core types used throughout Randomness
//!
//! Small value types shared by the settings model and the generators.

use rand::Rng;

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Type alias for the identity of any configuration node
pub type StateId = uuid::Uuid;

/// Type alias for template identifiers, used by template references
pub type TemplateId = uuid::Uuid;

// ============================================================================
// Capitalization
// ============================================================================

/// How generated text should be capitalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CapitalizationMode {
    /// Leave the text as it is
    #[default]
    Retain,
    /// All lowercase
    Lower,
    /// All uppercase
    Upper,
    /// Each character independently upper- or lowercase
    Random,
    /// Uppercase first character, lowercase rest
    Sentence,
    /// Uppercase first letter of every word, lowercase rest
    FirstLetter,
}

impl CapitalizationMode {
    /// Apply this capitalization to `text`
    ///
    /// Only [`CapitalizationMode::Random`] draws from `rng`.
    pub fn transform<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        match self {
            CapitalizationMode::Retain => text.to_string(),
            CapitalizationMode::Lower => text.to_lowercase(),
            CapitalizationMode::Upper => text.to_uppercase(),
            CapitalizationMode::Random => text
                .chars()
                .map(|c| {
                    if rng.gen_bool(0.5) {
                        c.to_uppercase().collect::<String>()
                    } else {
                        c.to_lowercase().collect::<String>()
                    }
                })
                .collect(),
            CapitalizationMode::Sentence => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
            CapitalizationMode::FirstLetter => text
                .split(' ')
                .map(|word| CapitalizationMode::Sentence.transform(word, rng))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Key used when persisting this mode
    pub fn key(&self) -> &'static str {
        match self {
            CapitalizationMode::Retain => "RETAIN",
            CapitalizationMode::Lower => "LOWER",
            CapitalizationMode::Upper => "UPPER",
            CapitalizationMode::Random => "RANDOM",
            CapitalizationMode::Sentence => "SENTENCE",
            CapitalizationMode::FirstLetter => "FIRST_LETTER",
        }
    }

    /// Parse a persisted key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|mode| mode.key() == key)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CapitalizationMode::Retain => "retain",
            CapitalizationMode::Lower => "lower",
            CapitalizationMode::Upper => "upper",
            CapitalizationMode::Random => "random",
            CapitalizationMode::Sentence => "sentence",
            CapitalizationMode::FirstLetter => "first letter",
        }
    }

    /// Get all capitalization modes
    pub fn all() -> &'static [CapitalizationMode] {
        &[
            CapitalizationMode::Retain,
            CapitalizationMode::Lower,
            CapitalizationMode::Upper,
            CapitalizationMode::Random,
            CapitalizationMode::Sentence,
            CapitalizationMode::FirstLetter,
        ]
    }
}

impl std::fmt::Display for CapitalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_capitalization_simple_modes() {
        let mut rng = rng();
        assert_eq!(CapitalizationMode::Retain.transform("hEllo", &mut rng), "hEllo");
        assert_eq!(CapitalizationMode::Lower.transform("hEllo", &mut rng), "hello");
        assert_eq!(CapitalizationMode::Upper.transform("hEllo", &mut rng), "HELLO");
    }

    #[test]
    fn test_capitalization_sentence() {
        let mut rng = rng();
        assert_eq!(
            CapitalizationMode::Sentence.transform("hELLO wORLD", &mut rng),
            "Hello world"
        );
        assert_eq!(CapitalizationMode::Sentence.transform("", &mut rng), "");
    }

    #[test]
    fn test_capitalization_first_letter() {
        let mut rng = rng();
        assert_eq!(
            CapitalizationMode::FirstLetter.transform("hELLO wORLD", &mut rng),
            "Hello World"
        );
    }

    #[test]
    fn test_capitalization_random_keeps_letters() {
        let mut rng = rng();
        let output = CapitalizationMode::Random.transform("abcdefghij", &mut rng);
        assert_eq!(output.to_lowercase(), "abcdefghij");
    }

    #[test]
    fn test_capitalization_keys_roundtrip() {
        for mode in CapitalizationMode::all() {
            assert_eq!(CapitalizationMode::from_key(mode.key()), Some(*mode));
        }
        assert_eq!(CapitalizationMode::from_key("retain"), None);
    }
}
