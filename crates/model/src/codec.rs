//! Settings graph ↔ element tree
//!
//! Every persisted type maps to one element whose tag identifies the type.
//! Scalar properties become attributes, owned sub-objects become child
//! elements, and word lists become repeated `<word value="…"/>` children.
//!
//! Decoding starts from the type's default value, so attributes that are
//! absent keep their defaults. Attributes that are present but cannot be
//! parsed make the whole document malformed.

use crate::decorators::{AffixDecorator, ArrayDecorator, FixedLengthDecorator};
use crate::element::Element;
use crate::schemes::{
    DateTimeScheme, DecimalScheme, IdType, IntegerScheme, NanoIdConfig, SchemeKind, StringScheme,
    UidScheme, UuidConfig, WordScheme,
};
use crate::settings::{CURRENT_VERSION, Settings};
use crate::template::{Template, TemplateList, TemplateReference};
use crate::timestamp::Timestamp;
use randomness_core::{CapitalizationMode, RandomnessError, RandomnessResult, StateId};
use std::fmt::Display;
use std::str::FromStr;

/// Tag of the elements in a word list
const WORD_TAG: &str = "word";

/// A type that is persisted as a single element
pub trait Codec: Sized {
    /// Tag of the element representing this type
    const TAG: &'static str;

    /// Serialize into an element tagged [`Self::TAG`]
    fn encode(&self) -> Element;

    /// Deserialize from an element tagged [`Self::TAG`]
    fn decode(element: &Element) -> RandomnessResult<Self>;
}

/// Serialize settings into a document tree
pub fn to_element(settings: &Settings) -> Element {
    settings.encode()
}

/// Deserialize settings from a document tree at the current version
pub fn from_element(element: &Element) -> RandomnessResult<Settings> {
    Settings::decode(element)
}

// ============================================================================
// Attribute Access
// ============================================================================

/// Typed read access to the attributes of one element
struct Fields<'a> {
    element: &'a Element,
}

impl<'a> Fields<'a> {
    fn of<T: Codec>(element: &'a Element) -> RandomnessResult<Self> {
        if element.name != T::TAG {
            return Err(RandomnessError::malformed(format!(
                "Expected element '{}' but found '{}'.",
                T::TAG,
                element.name
            )));
        }
        Ok(Self { element })
    }

    fn parsed<T>(&self, key: &str, default: T) -> RandomnessResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.element.attribute(key) {
            Some(value) => value.parse().map_err(|e| {
                RandomnessError::malformed(format!(
                    "Invalid value '{value}' for '{key}' in '{}': {e}",
                    self.element.name
                ))
            }),
            None => Ok(default),
        }
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.element.attribute(key).unwrap_or(default).to_string()
    }

    fn timestamp(&self, key: &str, default: &Timestamp) -> Timestamp {
        self.element
            .attribute(key)
            .map_or_else(|| default.clone(), Timestamp::new)
    }

    /// The `uuid` attribute, or a fresh identifier if there is none
    fn uuid(&self) -> RandomnessResult<StateId> {
        self.parsed("uuid", StateId::new_v4())
    }

    fn capitalization(&self, default: CapitalizationMode) -> RandomnessResult<CapitalizationMode> {
        match self.element.attribute("capitalization") {
            Some(key) => CapitalizationMode::from_key(key).ok_or_else(|| {
                RandomnessError::malformed(format!("Unknown capitalization mode '{key}'."))
            }),
            None => Ok(default),
        }
    }

    /// Decode the child tagged `T::TAG`, if there is one
    fn child<T: Codec>(&self, default: T) -> RandomnessResult<T> {
        match self.element.child(T::TAG) {
            Some(child) => T::decode(child),
            None => Ok(default),
        }
    }
}

// ============================================================================
// Decorators
// ============================================================================

impl Codec for AffixDecorator {
    const TAG: &'static str = "AffixDecorator";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("enabled", self.enabled)
            .with_attribute("descriptor", &self.descriptor)
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            enabled: fields.parsed("enabled", default.enabled)?,
            descriptor: fields.string("descriptor", &default.descriptor),
        })
    }
}

impl Codec for ArrayDecorator {
    const TAG: &'static str = "ArrayDecorator";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("enabled", self.enabled)
            .with_attribute("minCount", self.min_count)
            .with_attribute("maxCount", self.max_count)
            .with_attribute("separatorEnabled", self.separator_enabled)
            .with_attribute("separator", &self.separator)
            .with_attribute("elementFormat", &self.element_format)
            .with_child(self.affix_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::new();
        Ok(Self {
            uuid: fields.uuid()?,
            enabled: fields.parsed("enabled", default.enabled)?,
            min_count: fields.parsed("minCount", default.min_count)?,
            max_count: fields.parsed("maxCount", default.max_count)?,
            separator_enabled: fields.parsed("separatorEnabled", default.separator_enabled)?,
            separator: fields.string("separator", &default.separator),
            element_format: fields.string("elementFormat", &default.element_format),
            affix_decorator: fields.child(default.affix_decorator)?,
        })
    }
}

impl Codec for FixedLengthDecorator {
    const TAG: &'static str = "FixedLengthDecorator";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("enabled", self.enabled)
            .with_attribute("length", self.length)
            .with_attribute("filler", &self.filler)
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            enabled: fields.parsed("enabled", default.enabled)?,
            length: fields.parsed("length", default.length)?,
            filler: fields.string("filler", &default.filler),
        })
    }
}

// ============================================================================
// Schemes
// ============================================================================

impl Codec for DateTimeScheme {
    const TAG: &'static str = "DateTimeScheme";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("minDateTime", self.min_date_time.value())
            .with_attribute("maxDateTime", self.max_date_time.value())
            .with_attribute("pattern", &self.pattern)
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            min_date_time: fields.timestamp("minDateTime", &default.min_date_time),
            max_date_time: fields.timestamp("maxDateTime", &default.max_date_time),
            pattern: fields.string("pattern", &default.pattern),
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for DecimalScheme {
    const TAG: &'static str = "DecimalScheme";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("minValue", self.min_value)
            .with_attribute("maxValue", self.max_value)
            .with_attribute("decimalCount", self.decimal_count)
            .with_attribute("showTrailingZeroes", self.show_trailing_zeroes)
            .with_attribute("groupingSeparatorEnabled", self.grouping_separator_enabled)
            .with_attribute("groupingSeparator", &self.grouping_separator)
            .with_attribute("decimalSeparator", &self.decimal_separator)
            .with_child(self.affix_decorator.encode())
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            min_value: fields.parsed("minValue", default.min_value)?,
            max_value: fields.parsed("maxValue", default.max_value)?,
            decimal_count: fields.parsed("decimalCount", default.decimal_count)?,
            show_trailing_zeroes: fields.parsed("showTrailingZeroes", default.show_trailing_zeroes)?,
            grouping_separator_enabled: fields
                .parsed("groupingSeparatorEnabled", default.grouping_separator_enabled)?,
            grouping_separator: fields.string("groupingSeparator", &default.grouping_separator),
            decimal_separator: fields.string("decimalSeparator", &default.decimal_separator),
            affix_decorator: fields.child(default.affix_decorator)?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for IntegerScheme {
    const TAG: &'static str = "IntegerScheme";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("minValue", self.min_value)
            .with_attribute("maxValue", self.max_value)
            .with_attribute("base", self.base)
            .with_attribute("isUppercase", self.is_uppercase)
            .with_attribute("groupingSeparatorEnabled", self.grouping_separator_enabled)
            .with_attribute("groupingSeparator", &self.grouping_separator)
            .with_child(self.fixed_length_decorator.encode())
            .with_child(self.affix_decorator.encode())
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            min_value: fields.parsed("minValue", default.min_value)?,
            max_value: fields.parsed("maxValue", default.max_value)?,
            base: fields.parsed("base", default.base)?,
            is_uppercase: fields.parsed("isUppercase", default.is_uppercase)?,
            grouping_separator_enabled: fields
                .parsed("groupingSeparatorEnabled", default.grouping_separator_enabled)?,
            grouping_separator: fields.string("groupingSeparator", &default.grouping_separator),
            fixed_length_decorator: fields.child(default.fixed_length_decorator)?,
            affix_decorator: fields.child(default.affix_decorator)?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for StringScheme {
    const TAG: &'static str = "StringScheme";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("pattern", &self.pattern)
            .with_attribute("isRegex", self.is_regex)
            .with_attribute("isNonMatching", self.is_non_matching)
            .with_attribute("capitalization", self.capitalization.key())
            .with_attribute("removeLookAlikeSymbols", self.remove_look_alike_symbols)
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            pattern: fields.string("pattern", &default.pattern),
            is_regex: fields.parsed("isRegex", default.is_regex)?,
            is_non_matching: fields.parsed("isNonMatching", default.is_non_matching)?,
            capitalization: fields.capitalization(default.capitalization)?,
            remove_look_alike_symbols: fields
                .parsed("removeLookAlikeSymbols", default.remove_look_alike_symbols)?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for UuidConfig {
    const TAG: &'static str = "UuidConfig";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("version", self.version)
            .with_attribute("minDateTime", self.min_date_time.value())
            .with_attribute("maxDateTime", self.max_date_time.value())
            .with_attribute("isUppercase", self.is_uppercase)
            .with_attribute("addDashes", self.add_dashes)
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            version: fields.parsed("version", default.version)?,
            min_date_time: fields.timestamp("minDateTime", &default.min_date_time),
            max_date_time: fields.timestamp("maxDateTime", &default.max_date_time),
            is_uppercase: fields.parsed("isUppercase", default.is_uppercase)?,
            add_dashes: fields.parsed("addDashes", default.add_dashes)?,
        })
    }
}

impl Codec for NanoIdConfig {
    const TAG: &'static str = "NanoIdConfig";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("size", self.size)
            .with_attribute("alphabet", &self.alphabet)
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            size: fields.parsed("size", default.size)?,
            alphabet: fields.string("alphabet", &default.alphabet),
        })
    }
}

impl Codec for UidScheme {
    const TAG: &'static str = "UidScheme";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("idTypeKey", self.id_type.key())
            .with_child(self.uuid_config.encode())
            .with_child(self.nano_id_config.encode())
            .with_child(self.affix_decorator.encode())
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            id_type: element.attribute("idTypeKey").map_or(default.id_type, IdType::from_key),
            uuid_config: fields.child(default.uuid_config)?,
            nano_id_config: fields.child(default.nano_id_config)?,
            affix_decorator: fields.child(default.affix_decorator)?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for WordScheme {
    const TAG: &'static str = "WordScheme";

    fn encode(&self) -> Element {
        let mut element = Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("capitalization", self.capitalization.key());
        for word in &self.words {
            element.children.push(Element::new(WORD_TAG).with_attribute("value", word));
        }
        element
            .with_child(self.affix_decorator.encode())
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            words: element
                .children_named(WORD_TAG)
                .map(|word| word.attribute("value").unwrap_or_default().to_string())
                .collect(),
            capitalization: fields.capitalization(default.capitalization)?,
            affix_decorator: fields.child(default.affix_decorator)?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for TemplateReference {
    const TAG: &'static str = "TemplateReference";

    fn encode(&self) -> Element {
        let mut element = Element::new(Self::TAG).with_attribute("uuid", self.uuid);
        if let Some(template_uuid) = self.template_uuid {
            element.set_attribute("templateUuid", template_uuid);
        }
        element
            .with_attribute("capitalization", self.capitalization.key())
            .with_child(self.affix_decorator.encode())
            .with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            template_uuid: match element.attribute("templateUuid") {
                Some(_) => Some(fields.parsed("templateUuid", StateId::nil())?),
                None => None,
            },
            capitalization: fields.capitalization(default.capitalization)?,
            affix_decorator: fields.child(default.affix_decorator)?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl SchemeKind {
    /// Serialize the scheme inside
    pub fn encode(&self) -> Element {
        match self {
            SchemeKind::DateTime(it) => it.encode(),
            SchemeKind::Decimal(it) => it.encode(),
            SchemeKind::Integer(it) => it.encode(),
            SchemeKind::String(it) => it.encode(),
            SchemeKind::TemplateReference(it) => it.encode(),
            SchemeKind::Uid(it) => it.encode(),
            SchemeKind::Word(it) => it.encode(),
        }
    }

    /// Deserialize a scheme, choosing the variant by the element's tag
    pub fn decode(element: &Element) -> RandomnessResult<Self> {
        Ok(match element.name.as_str() {
            "DateTimeScheme" => DateTimeScheme::decode(element)?.into(),
            "DecimalScheme" => DecimalScheme::decode(element)?.into(),
            "IntegerScheme" => IntegerScheme::decode(element)?.into(),
            "StringScheme" => StringScheme::decode(element)?.into(),
            "TemplateReference" => TemplateReference::decode(element)?.into(),
            "UidScheme" => UidScheme::decode(element)?.into(),
            "WordScheme" => WordScheme::decode(element)?.into(),
            other => {
                return Err(RandomnessError::malformed(format!("Unknown scheme type '{other}'.")));
            }
        })
    }
}

// ============================================================================
// Templates and Settings
// ============================================================================

impl Codec for Template {
    const TAG: &'static str = "Template";

    fn encode(&self) -> Element {
        let mut element = Element::new(Self::TAG)
            .with_attribute("uuid", self.uuid)
            .with_attribute("name", &self.name);
        element.children.extend(self.schemes.iter().map(SchemeKind::encode));
        element.with_child(self.array_decorator.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        let default = Self::default();
        Ok(Self {
            uuid: fields.uuid()?,
            name: fields.string("name", &default.name),
            schemes: element
                .children
                .iter()
                .filter(|it| it.name != ArrayDecorator::TAG)
                .map(SchemeKind::decode)
                .collect::<RandomnessResult<_>>()?,
            array_decorator: fields.child(default.array_decorator)?,
        })
    }
}

impl Codec for TemplateList {
    const TAG: &'static str = "TemplateList";

    fn encode(&self) -> Element {
        let mut element = Element::new(Self::TAG).with_attribute("uuid", self.uuid);
        element.children.extend(self.templates.iter().map(Template::encode));
        element
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        Ok(Self {
            uuid: fields.uuid()?,
            templates: element
                .children_named(Template::TAG)
                .map(Template::decode)
                .collect::<RandomnessResult<_>>()?,
        })
    }
}

impl Codec for Settings {
    const TAG: &'static str = "Settings";

    fn encode(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute("version", &self.version)
            .with_attribute("uuid", self.uuid)
            .with_child(self.template_list.encode())
    }

    fn decode(element: &Element) -> RandomnessResult<Self> {
        let fields = Fields::of::<Self>(element)?;
        Ok(Self {
            uuid: fields.uuid()?,
            version: fields.string("version", CURRENT_VERSION),
            template_list: fields.child(TemplateList::default())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_survive_a_round_trip_through_xml() {
        let settings = Settings::default();
        let xml = to_element(&settings).to_xml().unwrap();
        let decoded = from_element(&Element::parse(&xml).unwrap()).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_layout_uses_tags_attributes_and_word_children() {
        let settings = Settings::new(TemplateList::new(vec![Template::new(
            "Words",
            vec![WordScheme::new(["a", "b"]).into()],
        )]));
        let element = to_element(&settings);

        assert_eq!(element.attribute("version"), Some(CURRENT_VERSION));
        let template = element.child("TemplateList").unwrap().child("Template").unwrap();
        assert_eq!(template.attribute("name"), Some("Words"));

        let scheme = template.child("WordScheme").unwrap();
        let words: Vec<_> = scheme.children_named("word").filter_map(|it| it.attribute("value")).collect();
        assert_eq!(words, vec!["a", "b"]);
        assert_eq!(scheme.attribute("capitalization"), Some("RETAIN"));
        assert!(scheme.child("AffixDecorator").is_some());
    }

    #[test]
    fn test_missing_attributes_keep_defaults() {
        let element = Element::new("IntegerScheme").with_attribute("maxValue", 5);
        let scheme = IntegerScheme::decode(&element).unwrap();
        assert_eq!(scheme.max_value, 5);
        assert_eq!(scheme.min_value, IntegerScheme::default().min_value);
        assert_eq!(scheme.base, 10);
    }

    #[test]
    fn test_unparsable_attribute_is_malformed() {
        let element = Element::new("IntegerScheme").with_attribute("maxValue", "lots");
        let error = IntegerScheme::decode(&element).unwrap_err();
        assert!(matches!(error, RandomnessError::MalformedDocument(_)));
        assert!(error.to_string().contains("maxValue"));
    }

    #[test]
    fn test_unknown_scheme_tag_is_malformed() {
        let element = Element::new("Template").with_child(Element::new("LoremScheme"));
        let error = Template::decode(&element).unwrap_err();
        assert!(error.to_string().contains("LoremScheme"));
    }

    #[test]
    fn test_invalid_timestamp_is_kept_verbatim() {
        let element = Element::new("DateTimeScheme").with_attribute("minDateTime", "whenever");
        let scheme = DateTimeScheme::decode(&element).unwrap();
        assert_eq!(scheme.min_date_time.value(), "whenever");
        assert_eq!(scheme.encode().attribute("minDateTime"), Some("whenever"));
    }

    #[test]
    fn test_uid_scheme_nests_its_configs() {
        let scheme = UidScheme {
            nano_id_config: NanoIdConfig {
                size: 8,
                ..NanoIdConfig::default()
            },
            ..UidScheme::new(IdType::NanoId)
        };
        let element = scheme.encode();
        assert_eq!(element.attribute("idTypeKey"), Some("nanoid"));
        assert_eq!(element.child("NanoIdConfig").unwrap().attribute("size"), Some("8"));
        assert_eq!(UidScheme::decode(&element).unwrap(), scheme);
    }

    #[test]
    fn test_reference_without_target_omits_attribute() {
        let reference = TemplateReference::new(None);
        let element = reference.encode();
        assert_eq!(element.attribute("templateUuid"), None);
        assert_eq!(TemplateReference::decode(&element).unwrap(), reference);
    }

    #[test]
    fn test_wrong_root_tag_is_malformed() {
        assert!(from_element(&Element::new("Project")).is_err());
    }
}
