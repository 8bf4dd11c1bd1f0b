//! Editing copies of settings
//!
//! Editors never touch the live settings while the user is editing. A
//! [`Draft`] holds a private copy of a state next to the state it was made
//! from; the copy is validated on demand and committed explicitly.

use crate::context::AppContext;
use crate::settings::Settings;
use crate::state::State;
use crate::template::TemplateList;
use crate::validation::{Validatable, ValidationInfo};
use randomness_core::{RandomnessError, RandomnessResult};

/// A modifiable copy of a state
#[derive(Debug, Clone)]
pub struct Draft<T: State> {
    original: T,
    current: T,
}

impl<T: State + PartialEq> Draft<T> {
    /// Start editing a copy of `state`
    pub fn new(state: &T) -> Self {
        Self {
            original: state.deep_copy(true),
            current: state.deep_copy(true),
        }
    }

    /// The state as it was when editing started or was last applied
    pub fn original(&self) -> &T {
        &self.original
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.original
    }

    /// Discard all changes since the last apply
    pub fn reset(&mut self) {
        self.current = self.original.deep_copy(true);
    }

    /// Accept the changes, returning the committed state
    pub fn apply(&mut self) -> T {
        self.original = self.current.deep_copy(true);
        self.current.deep_copy(true)
    }
}

impl<T: State + PartialEq + Validatable> Draft<T> {
    /// All validation failures of the copy
    pub fn validate_each(&self, ctx: &Settings) -> Vec<ValidationInfo> {
        self.current.validate_each(ctx)
    }
}

// ============================================================================
// Settings Editor
// ============================================================================

/// Edits the template list of an [`AppContext`]
#[derive(Debug)]
pub struct SettingsEditor {
    context: AppContext,
    draft: Draft<TemplateList>,
}

impl SettingsEditor {
    /// Start editing the live templates of `context`
    pub fn new(context: AppContext) -> Self {
        let draft = context.read(|it| Draft::new(&it.template_list));
        Self { context, draft }
    }

    pub fn template_list(&self) -> &TemplateList {
        self.draft.current()
    }

    pub fn template_list_mut(&mut self) -> &mut TemplateList {
        self.draft.current_mut()
    }

    pub fn is_modified(&self) -> bool {
        self.draft.is_modified()
    }

    /// The live settings with the edited template list in place
    fn edited_settings(&self) -> Settings {
        let mut settings = self.context.snapshot();
        settings.template_list = self.draft.current().deep_copy(true);
        settings
    }

    /// All validation failures of the edited templates
    ///
    /// References resolve against the edited templates, not the live ones.
    pub fn validate_each(&self) -> Vec<ValidationInfo> {
        let settings = self.edited_settings();
        self.draft.validate_each(&settings)
    }

    /// Discard all changes since the last apply
    pub fn reset(&mut self) {
        self.draft.reset();
    }

    /// Replace the live template list with the edited one
    ///
    /// Fails without changing anything if the edited templates are invalid.
    pub fn apply(&mut self) -> RandomnessResult<()> {
        let settings = self.edited_settings();
        if let Some(info) = settings.do_validate(&settings) {
            return Err(RandomnessError::validation(info.message));
        }

        self.context.apply(settings)?;
        self.draft.apply();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemes::{IntegerScheme, SchemeKind};
    use crate::template::{Template, TemplateReference};

    fn editor() -> (AppContext, SettingsEditor) {
        let context = AppContext::default();
        let editor = SettingsEditor::new(context.clone());
        (context, editor)
    }

    #[test]
    fn test_draft_tracks_modifications() {
        let scheme = IntegerScheme::new(1, 2);
        let mut draft = Draft::new(&scheme);
        assert!(!draft.is_modified());
        assert_eq!(draft.current().uuid, scheme.uuid);

        draft.current_mut().max_value = 3;
        assert!(draft.is_modified());
        assert_eq!(draft.original().max_value, 2);

        draft.reset();
        assert!(!draft.is_modified());

        draft.current_mut().max_value = 4;
        assert_eq!(draft.apply().max_value, 4);
        assert!(!draft.is_modified());
    }

    #[test]
    fn test_draft_reports_every_failure() {
        let scheme = IntegerScheme {
            base: 1,
            ..IntegerScheme::new(2, 1)
        };
        let draft = Draft::new(&scheme);
        assert_eq!(draft.validate_each(&Settings::default()).len(), 2);
    }

    #[test]
    fn test_edits_are_invisible_until_applied() {
        let (context, mut editor) = editor();
        editor.template_list_mut().templates.push(Template::new("Extra", Vec::new()));

        assert!(editor.is_modified());
        assert!(context.read(|it| it.template_list.find_by_name("Extra").is_none()));

        editor.apply().unwrap();
        assert!(!editor.is_modified());
        assert!(context.read(|it| it.template_list.find_by_name("Extra").is_some()));
    }

    #[test]
    fn test_invalid_edits_are_not_applied() {
        let (context, mut editor) = editor();
        let before = context.snapshot();
        editor.template_list_mut().templates[0].name = String::new();

        assert_eq!(editor.validate_each().len(), 1);
        assert!(editor.apply().unwrap_err().is_validation());
        assert_eq!(context.snapshot(), before);
        assert!(editor.is_modified());
    }

    #[test]
    fn test_validation_resolves_references_in_edited_templates() {
        let (_, mut editor) = editor();
        let target = Template::new("Target", vec![IntegerScheme::default().into()]);
        let reference = TemplateReference::new(Some(target.uuid));
        editor.template_list_mut().templates.push(target);
        editor
            .template_list_mut()
            .templates
            .push(Template::new("Source", vec![SchemeKind::from(reference)]));

        assert!(editor.validate_each().is_empty());
        editor.apply().unwrap();
    }

    #[test]
    fn test_reset_discards_edits() {
        let (_, mut editor) = editor();
        editor.template_list_mut().templates.clear();
        editor.reset();
        assert!(!editor.template_list().templates.is_empty());
    }
}
