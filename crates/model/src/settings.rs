//! Root of the settings graph

use crate::decorators::ArrayDecorator;
use crate::schemes::{
    DateTimeScheme, DecimalScheme, IdType, IntegerScheme, StringScheme, UidScheme, WordScheme,
};
use crate::state::{State, copied_uuid};
use crate::template::{Template, TemplateList, TemplateReference};
use crate::validation::{Validator, Validators, validators};
use randomness_core::{Identifiable, StateId, TemplateId};

/// Format version of settings written by this build
///
/// Equals the newest key of the upgrade table in [`crate::upgrade`].
pub const CURRENT_VERSION: &str = "3.5.0";

/// All persistent settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub uuid: StateId,
    /// Format version of these settings
    pub version: String,
    pub template_list: TemplateList,
}

impl Settings {
    /// Create settings at the current version
    pub fn new(template_list: TemplateList) -> Self {
        Self {
            uuid: StateId::new_v4(),
            version: CURRENT_VERSION.to_string(),
            template_list,
        }
    }

    /// Settings without any templates
    pub fn empty() -> Self {
        Self::new(TemplateList::default())
    }

    /// The templates, in order
    pub fn templates(&self) -> &[Template] {
        &self.template_list.templates
    }

    /// Find a template by identifier
    pub fn find_template(&self, uuid: TemplateId) -> Option<&Template> {
        self.template_list.find(uuid)
    }
}

impl Default for Settings {
    /// Settings with a set of starter templates
    fn default() -> Self {
        Self::new(TemplateList::new(default_templates()))
    }
}

/// Starter templates of fresh settings
pub fn default_templates() -> Vec<Template> {
    let integer = Template::new("Integer", vec![IntegerScheme::default().into()]);
    let decimal = Template::new("Decimal", vec![DecimalScheme::default().into()]);
    let string = Template::new("String", vec![StringScheme::default().into()]);
    let word = Template::new("Word", vec![WordScheme::default().into()]);
    let uuid = Template::new("UUID", vec![UidScheme::new(IdType::Uuid).into()]);
    let date_time = Template::new("Date-time", vec![DateTimeScheme::default().into()]);
    let words = Template {
        array_decorator: ArrayDecorator::new().with_enabled(true),
        ..Template::new(
            "Words",
            vec![TemplateReference::new(Some(word.uuid)).into()],
        )
    };

    vec![integer, decimal, string, word, uuid, date_time, words]
}

impl Identifiable for Settings {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for Settings {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            version: self.version.clone(),
            template_list: self.template_list.deep_copy(retain_uuid),
        }
    }
}

impl Validators for Settings {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.include("templateList", |it: &Settings| &it.template_list);
        })
    }
}
