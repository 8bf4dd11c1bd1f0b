//! Random strings from regular expressions
//!
//! Patterns are parsed into `regex-syntax`'s high-level IR and generated by
//! walking that tree: alternations pick a random branch, repetitions a
//! random count, and classes a random member. Strings that must *not*
//! match are found by sampling candidates and rejecting those the compiled
//! pattern accepts.

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use regex_syntax::hir::{Class, ClassUnicode, ClassUnicodeRange, Hir, HirKind};
use thiserror::Error;

/// Extra repetitions allowed beyond the minimum of an unbounded repetition
const UNBOUNDED_EXTRA: u32 = 10;

/// Classes larger than this are narrowed to printable ASCII where possible
const LARGE_CLASS: u32 = 256;

/// Number of candidates tried when looking for a non-matching string
const NON_MATCHING_ATTEMPTS: usize = 256;

/// Errors of the pattern engine
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern is not a valid regular expression
    #[error("{0}")]
    Parse(String),

    /// The pattern contains a class without members
    #[error("Pattern contains an empty character class.")]
    EmptyClass,

    /// No string was found that does not match the pattern
    #[error("Could not find a string that does not match '{0}'.")]
    NoNonMatching(String),
}

/// Generator of strings that match (or do not match) a pattern
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    pattern: String,
    hir: Hir,
    matcher: Regex,
}

impl PatternGenerator {
    /// Parse `pattern`
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let hir = regex_syntax::Parser::new()
            .parse(pattern)
            .map_err(|e| PatternError::Parse(e.to_string()))?;
        let matcher = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| PatternError::Parse(e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            hir,
            matcher,
        })
    }

    /// Whether `text` matches the whole pattern
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Generate a string matching the pattern
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<String, PatternError> {
        let mut bytes = Vec::new();
        walk(&self.hir, rng, &mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Generate a string that does not match the pattern
    pub fn generate_non_matching<R: Rng>(&self, rng: &mut R) -> Result<String, PatternError> {
        let printable = printable();

        for attempt in 0..NON_MATCHING_ATTEMPTS {
            let candidate = if attempt % 2 == 0 {
                let mut chars: Vec<char> = self.generate(rng)?.chars().collect();
                let replacement = pick_char(&printable, rng).unwrap_or('?');
                if chars.is_empty() || rng.gen_bool(0.25) {
                    chars.push(replacement);
                } else {
                    let index = rng.gen_range(0..chars.len());
                    chars[index] = replacement;
                }
                chars.into_iter().collect()
            } else {
                let length = rng.gen_range(0..=16);
                (0..length)
                    .filter_map(|_| pick_char(&printable, rng))
                    .collect::<String>()
            };

            if !self.is_match(&candidate) {
                return Ok(candidate);
            }
        }

        Err(PatternError::NoNonMatching(self.pattern.clone()))
    }
}

fn walk<R: Rng>(hir: &Hir, rng: &mut R, out: &mut Vec<u8>) -> Result<(), PatternError> {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => out.extend_from_slice(&literal.0),
        HirKind::Class(Class::Unicode(class)) => {
            let class = narrow(class);
            let c = pick_char(&class, rng).ok_or(PatternError::EmptyClass)?;
            let mut buffer = [0; 4];
            out.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
        }
        HirKind::Class(Class::Bytes(class)) => {
            let total: u32 = class
                .ranges()
                .iter()
                .map(|range| u32::from(range.end()) - u32::from(range.start()) + 1)
                .sum();
            if total == 0 {
                return Err(PatternError::EmptyClass);
            }
            let mut index = rng.gen_range(0..total);
            for range in class.ranges() {
                let size = u32::from(range.end()) - u32::from(range.start()) + 1;
                if index < size {
                    out.push(range.start() + index as u8);
                    break;
                }
                index -= size;
            }
        }
        HirKind::Repetition(repetition) => {
            let max = repetition
                .max
                .unwrap_or(repetition.min.saturating_add(UNBOUNDED_EXTRA))
                .max(repetition.min);
            for _ in 0..rng.gen_range(repetition.min..=max) {
                walk(&repetition.sub, rng, out)?;
            }
        }
        HirKind::Capture(capture) => walk(&capture.sub, rng, out)?,
        HirKind::Concat(parts) => {
            for part in parts {
                walk(part, rng, out)?;
            }
        }
        HirKind::Alternation(branches) => {
            if let Some(branch) = branches.choose(rng) {
                walk(branch, rng, out)?;
            }
        }
    }
    Ok(())
}

/// Printable ASCII
fn printable() -> ClassUnicode {
    ClassUnicode::new([ClassUnicodeRange::new(' ', '~')])
}

fn class_size(class: &ClassUnicode) -> u32 {
    class
        .ranges()
        .iter()
        .map(|range| u32::from(range.end()) - u32::from(range.start()) + 1)
        .sum()
}

/// Narrows very large classes such as `.` to their printable ASCII members
fn narrow(class: &ClassUnicode) -> ClassUnicode {
    if class_size(class) <= LARGE_CLASS {
        return class.clone();
    }

    let mut narrowed = class.clone();
    narrowed.intersect(&printable());
    if class_size(&narrowed) == 0 {
        class.clone()
    } else {
        narrowed
    }
}

fn pick_char<R: Rng>(class: &ClassUnicode, rng: &mut R) -> Option<char> {
    let total = class_size(class);
    if total == 0 {
        return None;
    }

    let mut index = rng.gen_range(0..total);
    for range in class.ranges() {
        let start = u32::from(range.start());
        let size = u32::from(range.end()) - start + 1;
        if index < size {
            return char::from_u32(start + index).or(Some(range.start()));
        }
        index -= size;
    }
    None
}
