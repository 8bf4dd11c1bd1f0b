//! Versioned upgrades of persisted settings
//!
//! Each entry of [`UPGRADES`] mutates a settings document in place so that
//! it conforms to the format of the entry's version. Upgrading applies, in
//! ascending order, every entry newer than the document and not newer than
//! the target, and stamps the document with each entry's version as soon as
//! that entry has been applied.

use crate::element::Element;
use crate::timestamp::Timestamp;
use randomness_core::{RandomnessError, RandomnessResult};
use semver::Version;
use tracing::debug;

/// Oldest document version that can still be upgraded
pub const OLDEST_SUPPORTED_VERSION: &str = "3.0.0";

/// An in-place structural edit of a settings document
pub type Mutation = fn(&mut Element) -> RandomnessResult<()>;

/// All upgrades, in ascending version order
pub const UPGRADES: &[(&str, Mutation)] = &[
    ("3.2.0", rename_uuid_type_to_version),
    ("3.3.5", remove_decorator_generators),
    ("3.4.0", convert_epoch_date_times),
    ("3.5.0", merge_id_schemes),
];

/// Parse a version string
pub fn parse_version(value: &str) -> RandomnessResult<Version> {
    Version::parse(value).map_err(|e| RandomnessError::InvalidVersion {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Newest version any upgrade produces
pub fn latest_version() -> RandomnessResult<Version> {
    UPGRADES
        .iter()
        .map(|(version, _)| parse_version(version))
        .try_fold(parse_version(OLDEST_SUPPORTED_VERSION)?, |max, version| {
            Ok(max.max(version?))
        })
}

/// Upgrade `settings` in place to the newest format not newer than `target`
///
/// Fails without touching the document if the target is unsupported, or if
/// the document's version is missing, unsupported, or from the future.
pub fn upgrade(settings: &mut Element, target: &Version) -> RandomnessResult<()> {
    let oldest = parse_version(OLDEST_SUPPORTED_VERSION)?;
    if *target < oldest {
        return Err(RandomnessError::UnsupportedVersion(format!(
            "Unsupported upgrade target version {target}."
        )));
    }

    let stored = settings
        .attribute("version")
        .ok_or(RandomnessError::MissingVersion)
        .and_then(parse_version)?;
    if stored < oldest {
        return Err(RandomnessError::UnsupportedVersion(format!(
            "Unsupported old version {stored} in settings file."
        )));
    }
    if stored > latest_version()? {
        return Err(RandomnessError::FutureSettings { version: stored });
    }

    for (key, mutation) in UPGRADES {
        let version = parse_version(key)?;
        if stored < version && version <= *target {
            mutation(settings)?;
            settings.set_attribute("version", &version);
            debug!("Upgraded settings to version {}", version);
        }
    }
    Ok(())
}

// ============================================================================
// Mutations
// ============================================================================

fn rename_uuid_type_to_version(settings: &mut Element) -> RandomnessResult<()> {
    settings.visit_mut(&mut |element| {
        if element.name == "UuidScheme" {
            element.rename_attribute("type", "version");
        }
    });
    Ok(())
}

fn remove_decorator_generators(settings: &mut Element) -> RandomnessResult<()> {
    settings.visit_mut(&mut |element| {
        if element.name.ends_with("Decorator") {
            element.remove_attribute("generator");
        }
    });
    Ok(())
}

fn convert_epoch_date_times(settings: &mut Element) -> RandomnessResult<()> {
    let mut result = Ok(());
    settings.visit_mut(&mut |element| {
        if element.name != "DateTimeScheme" || result.is_err() {
            return;
        }

        for key in ["minDateTime", "maxDateTime"] {
            let Some(value) = element.attribute(key) else {
                continue;
            };
            match value.trim().parse::<i64>() {
                Ok(epoch_milli) => {
                    element.set_attribute(key, Timestamp::from_epoch_milli(epoch_milli).value());
                }
                Err(e) => {
                    result = Err(RandomnessError::malformed(format!(
                        "Invalid epoch time '{value}' for '{key}': {e}"
                    )));
                    return;
                }
            }
        }
    });
    result
}

/// Attributes that move from a `UuidScheme` into its `UuidConfig`
const UUID_CONFIG_ATTRIBUTES: [&str; 5] =
    ["version", "minDateTime", "maxDateTime", "isUppercase", "addDashes"];

/// Attributes that move from a `NanoIdScheme` into its `NanoIdConfig`
const NANO_ID_CONFIG_ATTRIBUTES: [&str; 2] = ["size", "alphabet"];

fn merge_id_schemes(settings: &mut Element) -> RandomnessResult<()> {
    settings.visit_mut(&mut |element| {
        let (config_tag, id_type_key, attributes) = match element.name.as_str() {
            "UuidScheme" => ("UuidConfig", "uuid", &UUID_CONFIG_ATTRIBUTES[..]),
            "NanoIdScheme" => ("NanoIdConfig", "nanoid", &NANO_ID_CONFIG_ATTRIBUTES[..]),
            _ => return,
        };

        let mut config = Element::new(config_tag);
        for &key in attributes {
            if let Some(value) = element.remove_attribute(key) {
                config.set_attribute(key, value);
            }
        }

        element.name = "UidScheme".to_string();
        element.set_attribute("idTypeKey", id_type_key);
        element.children.insert(0, config);
    });
    Ok(())
}
