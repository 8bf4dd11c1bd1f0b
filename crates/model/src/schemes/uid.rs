//! Unique identifier scheme
//!
//! One scheme covers every kind of identifier; the active kind is selected
//! by [`IdType`] and only that kind's configuration is used or validated.

use crate::decorators::{AffixDecorator, ArrayDecorator, Decorator};
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::timestamp::{Timestamp, next_date_time_inclusive};
use crate::validation::{Validator, Validators, validators};
use rand::Rng;
use rand::rngs::StdRng;
use randomness_core::{Identifiable, RandomnessError, RandomnessResult, StateId};
use uuid::{Builder, Uuid};

/// Earliest moment that can be encoded in a time-based UUID
pub const MIN_UUID_DATE_TIME: &str = "1970-01-01 00:00:00.000";

/// Latest moment that can be encoded in a time-based UUID
pub const MAX_UUID_DATE_TIME: &str = "5236-03-31 21:21:00.684";

/// Supported UUID versions
pub const SUPPORTED_UUID_VERSIONS: [u8; 5] = [1, 4, 6, 7, 8];

/// UUID versions that encode a moment in time
pub const TIME_BASED_UUID_VERSIONS: [u8; 3] = [1, 6, 7];

/// Default NanoID alphabet
pub const DEFAULT_NANO_ID_ALPHABET: &str =
    "_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default NanoID size
pub const DEFAULT_NANO_ID_SIZE: usize = 21;

/// Milliseconds between the Gregorian epoch (1582-10-15) and the Unix epoch
const GREGORIAN_OFFSET_MILLIS: i64 = 12_219_292_800_000;

// ============================================================================
// Id Type
// ============================================================================

/// Kind of identifier a [`UidScheme`] generates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdType {
    #[default]
    Uuid,
    NanoId,
}

impl IdType {
    /// Key used when persisting this type
    pub fn key(&self) -> &'static str {
        match self {
            IdType::Uuid => "uuid",
            IdType::NanoId => "nanoid",
        }
    }

    /// Parse a persisted key, falling back to [`IdType::Uuid`] for unknown keys
    pub fn from_key(key: &str) -> Self {
        match key {
            "nanoid" => IdType::NanoId,
            _ => IdType::Uuid,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            IdType::Uuid => "UUID",
            IdType::NanoId => "Nano ID",
        }
    }
}

// ============================================================================
// UUID
// ============================================================================

/// Configuration for generating UUIDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UuidConfig {
    pub version: u8,
    pub min_date_time: Timestamp,
    pub max_date_time: Timestamp,
    pub is_uppercase: bool,
    pub add_dashes: bool,
}

impl Default for UuidConfig {
    fn default() -> Self {
        Self {
            version: 4,
            min_date_time: Timestamp::new(MIN_UUID_DATE_TIME),
            max_date_time: Timestamp::new(MAX_UUID_DATE_TIME),
            is_uppercase: false,
            add_dashes: true,
        }
    }
}

impl UuidConfig {
    /// Whether the configured version encodes a moment in time
    pub fn is_time_based(&self) -> bool {
        TIME_BASED_UUID_VERSIONS.contains(&self.version)
    }

    fn generate(&self, count: usize, rng: &mut StdRng) -> RandomnessResult<Vec<String>> {
        (0..count)
            .map(|_| -> RandomnessResult<String> {
                let uuid = self.generate_uuid(rng)?;
                let text = if self.add_dashes {
                    uuid.hyphenated().to_string()
                } else {
                    uuid.simple().to_string()
                };
                Ok(if self.is_uppercase { text.to_uppercase() } else { text })
            })
            .collect()
    }

    fn generate_uuid(&self, rng: &mut StdRng) -> RandomnessResult<Uuid> {
        let builder = match self.version {
            4 => Builder::from_random_bytes(rng.r#gen()),
            8 => Builder::from_custom_bytes(rng.r#gen()),
            1 | 6 | 7 => {
                let millis = next_date_time_inclusive(rng, &self.min_date_time, &self.max_date_time)?
                    .and_utc()
                    .timestamp_millis();
                match self.version {
                    1 => Builder::from_gregorian_timestamp(gregorian_ticks(millis), rng.r#gen(), &rng.r#gen()),
                    6 => Builder::from_sorted_gregorian_timestamp(
                        gregorian_ticks(millis),
                        rng.r#gen(),
                        &rng.r#gen(),
                    ),
                    _ => Builder::from_unix_timestamp_millis(millis as u64, &rng.r#gen()),
                }
            }
            other => return Err(RandomnessError::generation(format!("Unknown UUID version {other}."))),
        };
        Ok(builder.into_uuid())
    }
}

/// 100-nanosecond intervals since the Gregorian epoch (1582-10-15)
fn gregorian_ticks(millis: i64) -> u64 {
    ((millis + GREGORIAN_OFFSET_MILLIS) as u64).wrapping_mul(10_000)
}

impl Validators for UuidConfig {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("version", |it: &UuidConfig| &it.version).check(
                |_, version| SUPPORTED_UUID_VERSIONS.contains(version),
                |_, version| format!("Unknown UUID version {version}"),
            );
            dsl.case(
                |it: &UuidConfig| it.is_time_based(),
                |dsl| {
                    dsl.include("minDateTime", |it: &UuidConfig| &it.min_date_time);
                    dsl.of("minDateTime", |it: &UuidConfig| &it.min_date_time).check(
                        |_, min| !min.is_before(&Timestamp::new(MIN_UUID_DATE_TIME)),
                        |_, _| format!("Minimum date-time should be at or after {MIN_UUID_DATE_TIME}."),
                    );
                    dsl.include("maxDateTime", |it: &UuidConfig| &it.max_date_time);
                    dsl.of("maxDateTime", |it: &UuidConfig| &it.max_date_time)
                        .check(
                            |_, max| !Timestamp::new(MAX_UUID_DATE_TIME).is_before(max),
                            |_, _| format!("Maximum date-time should be at or before {MAX_UUID_DATE_TIME}."),
                        )
                        .check(
                            |it, max| !max.is_before(&it.min_date_time),
                            |_, _| "Maximum date-time should not be before minimum date-time.".to_string(),
                        );
                },
            );
        })
    }
}

// ============================================================================
// NanoID
// ============================================================================

/// Configuration for generating NanoIDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NanoIdConfig {
    pub size: usize,
    pub alphabet: String,
}

impl Default for NanoIdConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_NANO_ID_SIZE,
            alphabet: DEFAULT_NANO_ID_ALPHABET.to_string(),
        }
    }
}

impl NanoIdConfig {
    fn generate(&self, count: usize, rng: &mut StdRng) -> RandomnessResult<Vec<String>> {
        let alphabet: Vec<char> = self.alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(RandomnessError::generation("Alphabet must not be empty."));
        }

        Ok((0..count)
            .map(|_| {
                (0..self.size)
                    .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                    .collect::<String>()
            })
            .collect())
    }
}

impl Validators for NanoIdConfig {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("size", |it: &NanoIdConfig| &it.size)
                .check(|_, size| *size >= 1, |_, _| "Size should be at least 1.".to_string());
            dsl.of("alphabet", |it: &NanoIdConfig| it.alphabet.as_str())
                .check(|_, alphabet| !alphabet.is_empty(), |_, _| "Alphabet must not be empty.".to_string());
        })
    }
}

// ============================================================================
// Scheme
// ============================================================================

/// Generates unique identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidScheme {
    pub uuid: StateId,
    pub id_type: IdType,
    pub uuid_config: UuidConfig,
    pub nano_id_config: NanoIdConfig,
    pub affix_decorator: AffixDecorator,
    pub array_decorator: ArrayDecorator,
}

impl UidScheme {
    /// Create a scheme for `id_type` with default configurations
    pub fn new(id_type: IdType) -> Self {
        Self {
            id_type,
            ..Self::default()
        }
    }
}

impl Default for UidScheme {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            id_type: IdType::Uuid,
            uuid_config: UuidConfig::default(),
            nano_id_config: NanoIdConfig::default(),
            affix_decorator: AffixDecorator::new(false, "\""),
            array_decorator: ArrayDecorator::new(),
        }
    }
}

impl Identifiable for UidScheme {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for UidScheme {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            affix_decorator: self.affix_decorator.deep_copy(retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for UidScheme {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.include_if(
                "uuidConfig",
                |it: &UidScheme| &it.uuid_config,
                |it: &UidScheme| it.id_type == IdType::Uuid,
            );
            dsl.include_if(
                "nanoIdConfig",
                |it: &UidScheme| &it.nano_id_config,
                |it: &UidScheme| it.id_type == IdType::NanoId,
            );
            dsl.include("affixDecorator", |it: &UidScheme| &it.affix_decorator);
            dsl.include("arrayDecorator", |it: &UidScheme| &it.array_decorator);
        })
    }
}

impl Scheme for UidScheme {
    fn name(&self, _ctx: &Settings) -> String {
        self.id_type.display_name().to_string()
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
        match self.id_type {
            IdType::Uuid => self.uuid_config.generate(count, rng),
            IdType::NanoId => self.nano_id_config.generate(count, rng),
        }
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

    fn uuid_scheme(config: UuidConfig) -> UidScheme {
        UidScheme {
            uuid_config: config,
            ..UidScheme::default()
        }
    }

    fn parse(text: &str) -> Uuid {
        Uuid::parse_str(text).unwrap()
    }

    #[test]
    fn test_id_type_keys() {
        assert_eq!(IdType::from_key("nanoid"), IdType::NanoId);
        assert_eq!(IdType::from_key("uuid"), IdType::Uuid);
        assert_eq!(IdType::from_key("something"), IdType::Uuid);
        assert_eq!(IdType::NanoId.key(), "nanoid");
    }

    #[test]
    fn test_generates_requested_versions() {
        for version in SUPPORTED_UUID_VERSIONS {
            let scheme = uuid_scheme(UuidConfig {
                version,
                ..UuidConfig::default()
            });
            for text in scheme.generate_strings(5, &mut rng(), &ctx()).unwrap() {
                let uuid = parse(&text);
                assert_eq!(uuid.get_version_num(), usize::from(version), "{text}");
                assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122);
            }
        }
    }

    #[test]
    fn test_time_based_uuids_encode_bounds() {
        let moment = Timestamp::new("2021-04-05 06:07:08.009");
        let millis = moment.epoch_milli().unwrap();
        let config = |version| UuidConfig {
            version,
            min_date_time: moment.clone(),
            max_date_time: moment.clone(),
            ..UuidConfig::default()
        };

        let encoded = |version| {
            let text = &uuid_scheme(config(version)).generate_strings(1, &mut rng(), &ctx()).unwrap()[0];
            let (seconds, nanos) = parse(text).get_timestamp().unwrap().to_unix();
            seconds as i64 * 1000 + i64::from(nanos / 1_000_000)
        };
        for version in TIME_BASED_UUID_VERSIONS {
            assert_eq!(encoded(version), millis, "version {version}");
        }
    }

    #[test]
    fn test_uuid_formatting_options() {
        let scheme = uuid_scheme(UuidConfig {
            is_uppercase: true,
            add_dashes: false,
            ..UuidConfig::default()
        });
        let text = &scheme.generate_strings(1, &mut rng(), &ctx()).unwrap()[0];
        assert_eq!(text.len(), 32);
        assert!(!text.contains('-'));
        assert_eq!(text, &text.to_uppercase());

        let text = &UidScheme::default().generate_strings(1, &mut rng(), &ctx()).unwrap()[0];
        assert_eq!(text.len(), 36);
        assert_eq!(text, &text.to_lowercase());
    }

    #[test]
    fn test_nano_id_generation() {
        let scheme = UidScheme {
            nano_id_config: NanoIdConfig {
                size: 8,
                alphabet: "ab".to_string(),
            },
            ..UidScheme::new(IdType::NanoId)
        };
        for text in scheme.generate_strings(10, &mut rng(), &ctx()).unwrap() {
            assert_eq!(text.len(), 8);
            assert!(text.chars().all(|c| c == 'a' || c == 'b'));
        }
    }

    #[test]
    fn test_uuid_validation() {
        let ctx = ctx();
        assert!(UidScheme::default().do_validate(&ctx).is_none());

        let info = uuid_scheme(UuidConfig {
            version: 3,
            ..UuidConfig::default()
        })
        .do_validate(&ctx)
        .unwrap();
        assert_eq!(info.property, "uuidConfig.version");
        assert_eq!(info.message, "Unknown UUID version 3");

        let info = uuid_scheme(UuidConfig {
            version: 1,
            min_date_time: Timestamp::new("2000-01-01 00:00:00.000"),
            max_date_time: Timestamp::new("1999-01-01 00:00:00.000"),
            ..UuidConfig::default()
        })
        .do_validate(&ctx)
        .unwrap();
        assert_eq!(info.property, "uuidConfig.maxDateTime");

        let info = uuid_scheme(UuidConfig {
            version: 7,
            min_date_time: Timestamp::new("1960-01-01 00:00:00.000"),
            ..UuidConfig::default()
        })
        .do_validate(&ctx)
        .unwrap();
        assert_eq!(info.property, "uuidConfig.minDateTime");

        let info = uuid_scheme(UuidConfig {
            version: 6,
            max_date_time: Timestamp::new("6000-01-01 00:00:00.000"),
            ..UuidConfig::default()
        })
        .do_validate(&ctx)
        .unwrap();
        assert_eq!(info.property, "uuidConfig.maxDateTime");
    }

    #[test]
    fn test_version_4_ignores_date_times() {
        let scheme = uuid_scheme(UuidConfig {
            version: 4,
            min_date_time: Timestamp::new("invalid"),
            ..UuidConfig::default()
        });
        assert!(scheme.do_validate(&ctx()).is_none());
    }

    #[test]
    fn test_inactive_variant_is_not_validated() {
        let scheme = UidScheme {
            nano_id_config: NanoIdConfig {
                size: 0,
                alphabet: String::new(),
            },
            ..UidScheme::new(IdType::Uuid)
        };
        assert!(scheme.do_validate(&ctx()).is_none());

        let scheme = UidScheme {
            id_type: IdType::NanoId,
            uuid_config: UuidConfig {
                version: 2,
                ..UuidConfig::default()
            },
            ..scheme
        };
        assert_eq!(scheme.do_validate(&ctx()).unwrap().property, "nanoIdConfig.size");
    }

    #[test]
    fn test_affix_applies_before_array() {
        let scheme = UidScheme {
            nano_id_config: NanoIdConfig {
                size: 1,
                alphabet: "x".to_string(),
            },
            affix_decorator: AffixDecorator::new(true, "'"),
            array_decorator: ArrayDecorator::new().with_enabled(true).with_counts(2, 2),
            ..UidScheme::new(IdType::NanoId)
        };
        assert_eq!(scheme.generate_strings(1, &mut rng(), &ctx()).unwrap(), vec!["['x', 'x']"]);
    }
}
