//! Lenient textual date-times
//!
//! A [`Timestamp`] stores whatever the user typed. If the text can be
//! understood as a date-time it is rewritten into [`FORMAT`]; otherwise it
//! is kept verbatim so that an invalid input is never lost. The special
//! value [`NOW`] always refers to the current moment.

use crate::validation::{Validator, Validators, validators};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rand::Rng;
use randomness_core::{RandomnessError, RandomnessResult};
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// Canonical `chrono` format of a valid timestamp value
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Special value that always refers to the current moment
pub const NOW: &str = "NOW";

/// Value of a default timestamp
pub const EPOCH: &str = "1970-01-01 00:00:00.000";

/// Trailing time of day: `H:m`, `H:m:s`, or `H:m:s.SSS`
static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\sT])(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.(\d{1,3}))?)?\s*$")
        .expect("Invalid time regex")
});

/// Zone designator following a time of day: `Z`, `+HH:MM`, or `-HHMM`
static ZONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d:\d{1,2}(?::\d{1,2}(?:\.\d+)?)?\s*(Z|([+-])(\d{2}):?(\d{2}))$")
        .expect("Invalid zone regex")
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

// ============================================================================
// Timestamp
// ============================================================================

/// A textual, possibly invalid, moment in time
///
/// Two timestamps are equal iff their values are equal.
#[derive(Clone)]
pub struct Timestamp {
    value: String,
    epoch_milli: Option<i64>,
}

impl Timestamp {
    /// Interpret `value` liberally, normalizing it to [`FORMAT`] if possible
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == NOW {
            return Self {
                value,
                epoch_milli: None,
            };
        }

        match parse_liberally(&value) {
            Some(date_time) => Self::from_date_time(date_time),
            None => Self {
                value,
                epoch_milli: None,
            },
        }
    }

    /// The timestamp that always refers to the current moment
    pub fn now() -> Self {
        Self::new(NOW)
    }

    /// The timestamp at `epoch_milli` milliseconds since the Unix epoch
    ///
    /// Moments that `chrono` cannot represent give an invalid timestamp whose
    /// value is the decimal number itself, so validation reports the number
    /// the user would otherwise lose.
    pub fn from_epoch_milli(epoch_milli: i64) -> Self {
        match DateTime::from_timestamp_millis(epoch_milli) {
            Some(date_time) => Self::from_date_time(date_time.naive_utc()),
            None => Self {
                value: epoch_milli.to_string(),
                epoch_milli: None,
            },
        }
    }

    fn from_date_time(date_time: NaiveDateTime) -> Self {
        Self {
            value: date_time.format(FORMAT).to_string(),
            epoch_milli: Some(date_time.and_utc().timestamp_millis()),
        }
    }

    /// The textual representation of this timestamp
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this is the special [`NOW`] timestamp
    pub fn is_now(&self) -> bool {
        self.value == NOW
    }

    /// Milliseconds since the Unix epoch, or `None` if the value is invalid
    ///
    /// Recomputed on every call for [`NOW`].
    pub fn epoch_milli(&self) -> Option<i64> {
        if self.is_now() {
            Some(Utc::now().timestamp_millis())
        } else {
            self.epoch_milli
        }
    }

    /// This timestamp as a date-time, or `None` if the value is invalid
    pub fn to_date_time(&self) -> Option<NaiveDateTime> {
        self.epoch_milli()
            .and_then(DateTime::from_timestamp_millis)
            .map(|it| it.naive_utc())
    }

    /// Returns `true` iff `self` occurs strictly before `that`
    ///
    /// This is not a total order. An invalid `self` is treated as the end of
    /// time and an invalid `that` as the start of time, so whenever either
    /// side is invalid the result is `false`. Two [`NOW`] timestamps are
    /// never before one another. Consequently `a == b`, `a.is_before(b)` and
    /// `b.is_before(a)` may all be false at once.
    pub fn is_before(&self, that: &Timestamp) -> bool {
        if self.is_now() && that.is_now() {
            return false;
        }

        let this_epoch = self.epoch_milli().unwrap_or(i64::MAX);
        let that_epoch = that.epoch_milli().unwrap_or(i64::MIN);
        this_epoch < that_epoch
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::new(EPOCH)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp(value={})", self.value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// Stored as raw text, re-parsed on read.
impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&Timestamp> for String {
    fn from(timestamp: &Timestamp) -> Self {
        timestamp.value.clone()
    }
}

impl Validators for Timestamp {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("value", |it: &Timestamp| it.value.as_str()).check(
                |it, _| it.epoch_milli().is_some(),
                |_, value| format!("Invalid date-time '{value}'."),
            );
        })
    }
}

/// Returns a uniformly random date-time between `min` and `max`, inclusive
pub fn next_date_time_inclusive<R: Rng>(
    rng: &mut R,
    min: &Timestamp,
    max: &Timestamp,
) -> RandomnessResult<NaiveDateTime> {
    let (Some(min_epoch), Some(max_epoch)) = (min.epoch_milli(), max.epoch_milli()) else {
        return Err(RandomnessError::generation("Cannot generate from an invalid date-time."));
    };
    if max_epoch < min_epoch {
        return Err(RandomnessError::generation(
            "Maximum date-time should not be before minimum date-time.",
        ));
    }

    let epoch = rng.gen_range(min_epoch..=max_epoch);
    DateTime::from_timestamp_millis(epoch)
        .map(|it| it.naive_utc())
        .ok_or_else(|| RandomnessError::generation(format!("Date-time {epoch} is out of range.")))
}

// ============================================================================
// Liberal parsing
// ============================================================================

/// Parses free-form date-time text, or returns `None`
fn parse_liberally(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(input, FORMAT) {
        return Some(date_time);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(input) {
        return Some(date_time.naive_utc());
    }
    if let Some(captures) = ZONE_REGEX.captures(input) {
        let zone = captures.get(1)?;
        let offset_minutes = match (captures.get(2), captures.get(3), captures.get(4)) {
            (Some(sign), Some(hours), Some(minutes)) => {
                let minutes = hours.as_str().parse::<i64>().ok()? * 60 + minutes.as_str().parse::<i64>().ok()?;
                if sign.as_str() == "-" { -minutes } else { minutes }
            }
            _ => 0,
        };
        let local = parse_local(input[..zone.start()].trim_end())?;
        return local.checked_sub_signed(TimeDelta::minutes(offset_minutes));
    }

    parse_local(input)
}

/// Parses free-form date-time text without a zone designator
fn parse_local(input: &str) -> Option<NaiveDateTime> {
    let (date_part, time) = match TIME_REGEX.captures(input) {
        Some(captures) => {
            let whole = captures.get(0)?;
            let number = |i: usize| captures.get(i).map(|it| it.as_str().parse::<u32>());
            let hour = number(1)?.ok()?;
            let minute = number(2)?.ok()?;
            let second = number(3).transpose().ok()?.unwrap_or(0);
            let milli = match captures.get(4) {
                Some(fraction) => format!("{:0<3}", fraction.as_str()).parse::<u32>().ok()?,
                None => 0,
            };
            let time = NaiveTime::from_hms_milli_opt(hour, minute, second, milli)?;
            (&input[..whole.start()], time)
        }
        None => (input, NaiveTime::MIN),
    };

    parse_date(date_part).map(|date| date.and_time(time))
}

/// Parses the date portion of liberal input
fn parse_date(input: &str) -> Option<NaiveDate> {
    let mut numbers: Vec<&str> = Vec::new();
    let mut month_name: Option<u32> = None;

    for token in input.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token.is_empty() || token == "T" {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(token);
        } else if month_name.is_none() {
            month_name = Some(month_from_name(token)?);
        } else {
            return None;
        }
    }

    let year = |token: &str| (token.len() == 4).then(|| token.parse::<i32>().ok()).flatten();
    let small = |token: &str| {
        (1..=2)
            .contains(&token.len())
            .then(|| token.parse::<u32>().ok())
            .flatten()
    };

    match (month_name, numbers.as_slice()) {
        // "May 3, 0454", "16 April 0222", "0168 Aug 24"
        (Some(month), &[a, b]) => {
            if a.len() == 4 {
                NaiveDate::from_ymd_opt(year(a)?, month, small(b)?)
            } else {
                NaiveDate::from_ymd_opt(year(b)?, month, small(a)?)
            }
        }
        (Some(_), _) => None,
        (None, &[y]) if y.len() == 4 => NaiveDate::from_ymd_opt(year(y)?, 1, 1),
        (None, &[compact]) if compact.len() == 8 => NaiveDate::from_ymd_opt(
            compact[0..4].parse().ok()?,
            compact[4..6].parse().ok()?,
            compact[6..8].parse().ok()?,
        ),
        (None, &[y, m]) => NaiveDate::from_ymd_opt(year(y)?, small(m)?, 1),
        (None, &[a, b, c]) if a.len() == 4 => NaiveDate::from_ymd_opt(year(a)?, small(b)?, small(c)?),
        (None, &[a, b, c]) if c.len() == 4 => NaiveDate::from_ymd_opt(year(c)?, small(b)?, small(a)?),
        _ => None,
    }
}

/// Month number of an English month name or abbreviation of at least three letters
fn month_from_name(token: &str) -> Option<u32> {
    let token = token.to_ascii_lowercase();
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(&token))
        .map(|index| index as u32 + 1)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::validation::Validatable;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn value(input: &str) -> String {
        Timestamp::new(input).value().to_string()
    }

    #[test]
    fn test_epoch_of_complete_timestamp() {
        assert_eq!(
            Timestamp::new("1168-05-20 06:37:39.725").epoch_milli(),
            Some(-25_296_600_140_275)
        );
        assert_eq!(Timestamp::new("5103-07-25").epoch_milli(), Some(98_885_577_600_000));
    }

    #[test]
    fn test_epoch_of_invalid_timestamps() {
        assert_eq!(Timestamp::new("").epoch_milli(), None);
        assert_eq!(Timestamp::new("invalid").epoch_milli(), None);
        assert_eq!(Timestamp::new("65789190").epoch_milli(), None);
    }

    #[test]
    fn test_now_epoch_changes_over_time() {
        let timestamp = Timestamp::now();
        let first = timestamp.epoch_milli().unwrap();
        assert!(first > 1_735_689_600_000);

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timestamp.epoch_milli().unwrap() > first);
    }

    #[test]
    fn test_completes_partial_dates() {
        assert_eq!(value("1674"), "1674-01-01 00:00:00.000");
        assert_eq!(value("9172-9"), "9172-09-01 00:00:00.000");
        assert_eq!(value("5701-05"), "5701-05-01 00:00:00.000");
        assert_eq!(value("2812-07-7"), "2812-07-07 00:00:00.000");
        assert_eq!(value("4174-08-27"), "4174-08-27 00:00:00.000");
    }

    #[test]
    fn test_completes_partial_times() {
        assert_eq!(value("6346-08-29 3:1"), "6346-08-29 03:01:00.000");
        assert_eq!(value("9177-08-15 07:4"), "9177-08-15 07:04:00.000");
        assert_eq!(value("2604-12-07 15:30:7"), "2604-12-07 15:30:07.000");
        assert_eq!(value("4718-09-12 08:41:06.5"), "4718-09-12 08:41:06.500");
        assert_eq!(value("9351-02-25 17:53:46.85"), "9351-02-25 17:53:46.850");
        assert_eq!(value("7880-08-27 03:02:18.208"), "7880-08-27 03:02:18.208");
    }

    #[test]
    fn test_interprets_date_orders() {
        assert_eq!(value("15-09-5375 21:02:13.284"), "5375-09-15 21:02:13.284");
        assert_eq!(value("19/05/0004 07:42:16.571"), "0004-05-19 07:42:16.571");
        assert_eq!(value("31(10)0807 20:50:22.209"), "0807-10-31 20:50:22.209");
        assert_eq!(value("0428[01]08 04:55:59.004"), "0428-01-08 04:55:59.004");
        assert_eq!(value("12970814"), "1297-08-14 00:00:00.000");
    }

    #[test]
    fn test_parses_english_month_names() {
        assert_eq!(value("0168 Aug 24 06:05:04.898"), "0168-08-24 06:05:04.898");
        assert_eq!(value("0702 January 10 23:57:45.052"), "0702-01-10 23:57:45.052");
        assert_eq!(value("16 April 0222 17:26:01.811"), "0222-04-16 17:26:01.811");
        assert_eq!(value("May 3, 0454 19:43:08.435"), "0454-05-03 19:43:08.435");
    }

    #[test]
    fn test_retains_now_and_invalid_values() {
        assert_eq!(value(NOW), NOW);
        assert_eq!(value(""), "");
        assert_eq!(value("invalid"), "invalid");
        assert_eq!(value("57819512"), "57819512");
    }

    #[test]
    fn test_reparse_is_idempotent() {
        for input in ["1674", "May 3, 0454 19:43:08.435", "invalid", "", NOW, "12970814"] {
            let once = Timestamp::new(input);
            assert_eq!(Timestamp::new(once.value()).value(), once.value());
        }
    }

    #[test]
    fn test_is_before() {
        let t = Timestamp::new;
        assert!(!t("9510-12-27 23:51:18.556").is_before(&t("9510-12-27 23:51:18.556")));
        assert!(!t("8552-08-29 08:33:35.784").is_before(&t("7588-07-06 08:48:00.539")));
        assert!(t("5494-07-30 01:55:03.144").is_before(&t("7783-01-03 03:33:44.932")));
        assert!(!t("invalid").is_before(&t("7927-06-10 12:17:15.448")));
        assert!(!t("8164-03-06 05:00:04.146").is_before(&t("invalid")));
        assert!(t("1714-01-26 01:15:40").is_before(&Timestamp::now()));
        assert!(Timestamp::now().is_before(&t("6379-06-15 14:40:39")));
        assert!(!Timestamp::now().is_before(&Timestamp::now()));
        assert!(!t("invalid").is_before(&t("invalid")));
    }

    #[test]
    fn test_validation() {
        let ctx = Settings::default();
        assert!(Timestamp::default().do_validate(&ctx).is_none());
        assert!(Timestamp::new("8199-01").do_validate(&ctx).is_none());
        assert!(Timestamp::now().do_validate(&ctx).is_none());
        assert!(Timestamp::new("").do_validate(&ctx).is_some());
        assert!(Timestamp::new("71895819").do_validate(&ctx).is_some());
        assert_eq!(
            Timestamp::new("now").do_validate(&ctx).unwrap().message,
            "Invalid date-time 'now'."
        );
    }

    #[test]
    fn test_from_epoch_milli() {
        assert_eq!(Timestamp::from_epoch_milli(0).value(), "1970-01-01 00:00:00.000");
        assert_eq!(
            Timestamp::from_epoch_milli(197_276_354_331_758).value(),
            "8221-06-10 03:18:51.758"
        );
        assert_eq!(
            Timestamp::from_epoch_milli(-108_783_788_697).value(),
            "1966-07-21 22:16:51.303"
        );
        assert_eq!(
            Timestamp::from_epoch_milli(421_949_603_579_485).value(),
            "+15341-01-18 23:12:59.485"
        );
    }

    #[test]
    fn test_from_epoch_milli_out_of_range_is_invalid() {
        let ctx = Settings::default();
        let huge = Timestamp::from_epoch_milli(92_233_720_368_547_758);
        assert_eq!(huge.value(), "92233720368547758");
        assert_eq!(huge.epoch_milli(), None);
        assert_eq!(
            huge.do_validate(&ctx).unwrap().message,
            "Invalid date-time '92233720368547758'."
        );
        assert_eq!(Timestamp::new(huge.value()), huge);
        assert_eq!(Timestamp::from_epoch_milli(i64::MIN).epoch_milli(), None);
    }

    #[test]
    fn test_parses_iso_8601_with_zones() {
        assert_eq!(value("2023-12-31T10:00:00Z"), "2023-12-31 10:00:00.000");
        assert_eq!(value("2023-12-31T10:00:00.123456Z"), "2023-12-31 10:00:00.123");
        assert_eq!(value("2023-12-31T10:00:00+02:00"), "2023-12-31 08:00:00.000");
        assert_eq!(value("2023-12-31T23:30-0100"), "2024-01-01 00:30:00.000");
        assert_eq!(value("2023-12-31 10:00 Z"), "2023-12-31 10:00:00.000");
        assert_eq!(value("2023-12-31T10:00:00"), "2023-12-31 10:00:00.000");
        assert_eq!(
            Timestamp::new("2023-12-31T10:00:00Z").epoch_milli(),
            Some(1_704_016_800_000)
        );
    }

    #[test]
    fn test_next_date_time_inclusive() {
        let mut rng = StdRng::seed_from_u64(7);
        let only = Timestamp::new("9181-07-18 10:59:33.663");
        let generated = next_date_time_inclusive(&mut rng, &only, &only).unwrap();
        assert_eq!(generated.format(FORMAT).to_string(), only.value());

        let invalid = Timestamp::new("invalid");
        assert!(next_date_time_inclusive(&mut rng, &invalid, &only).is_err());
    }
}
