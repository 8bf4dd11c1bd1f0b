//! Templates and references between them
//!
//! A [`Template`] concatenates the output of its schemes. Through a
//! [`TemplateReference`], one template can include the output of another
//! template in the same [`TemplateList`]. References hold only the target's
//! identifier and resolve it through the settings on every use, so a
//! dangling reference is a validation failure rather than a fault.
//!
//! References must never form a cycle. [`ReferenceGraph`] models the
//! templates as a directed graph so that a prospective reference can be
//! checked before it is made.

use crate::decorators::{AffixDecorator, ArrayDecorator, Decorator};
use crate::schemes::SchemeKind;
use crate::settings::Settings;
use crate::state::{Scheme, State, copied_uuid};
use crate::validation::{Validatable, Validator, Validators, validators};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use randomness_core::{
    CapitalizationMode, Identifiable, Named, RandomnessError, RandomnessResult, StateId,
    TemplateId,
};
use std::collections::{HashMap, HashSet};

/// Prefix of the action identifier of every template
pub const ACTION_ID_PREFIX: &str = "randomness.insert.";

/// Name of a new template
pub const DEFAULT_TEMPLATE_NAME: &str = "Template";

// ============================================================================
// Template
// ============================================================================

/// A named, ordered list of schemes whose outputs are concatenated
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub uuid: TemplateId,
    pub name: String,
    pub schemes: Vec<SchemeKind>,
    pub array_decorator: ArrayDecorator,
}

impl Template {
    /// Create a template
    pub fn new(name: impl Into<String>, schemes: Vec<SchemeKind>) -> Self {
        Self {
            uuid: TemplateId::new_v4(),
            name: name.into(),
            schemes,
            array_decorator: ArrayDecorator::new(),
        }
    }

    /// Identifier of the editor action that inserts this template
    pub fn action_id(&self) -> String {
        format!("{ACTION_ID_PREFIX}{}", self.uuid.simple())
    }

    /// Template references among this template's schemes
    pub fn references(&self) -> impl Iterator<Item = &TemplateReference> {
        self.schemes.iter().filter_map(SchemeKind::as_reference)
    }

    /// Whether a new reference in this template to `target` would not cause recursion
    pub fn can_reference(&self, target: TemplateId, ctx: &Settings) -> bool {
        if target == self.uuid {
            return false;
        }

        let mut graph = ReferenceGraph::from_templates(ctx.templates(), None);
        graph.add_edge(self.uuid, target);
        graph.find_cycle_from(self.uuid).is_none()
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_NAME, Vec::new())
    }
}

/// Seed of the random stream of the child identified by `uuid`
fn child_seed(seed: u64, uuid: StateId) -> u64 {
    let (high, low) = uuid.as_u64_pair();
    seed.wrapping_add(high ^ low)
}

impl Identifiable for Template {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl Named for Template {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl State for Template {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            name: self.name.clone(),
            schemes: self.schemes.iter().map(|it| it.deep_copy(retain_uuid)).collect(),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
        }
    }
}

impl Validators for Template {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("name", |it: &Template| it.name.as_str()).check(
                |_, name| !name.trim().is_empty(),
                |_, _| "Templates must have a name.".to_string(),
            );
            dsl.of("schemes", |it: &Template| &it.schemes).check_with(|_, schemes, ctx| {
                schemes.iter().find_map(|scheme| {
                    scheme
                        .do_validate(ctx)
                        .map(|info| info.prepend(&scheme.name(ctx)).message)
                })
            });
            dsl.include("arrayDecorator", |it: &Template| &it.array_decorator);
        })
    }

    fn label(&self, _ctx: &Settings) -> Option<String> {
        Some(self.name.clone())
    }
}

impl Scheme for Template {
    fn name(&self, _ctx: &Settings) -> String {
        self.name.clone()
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        vec![&self.array_decorator]
    }

    /// Concatenates the outputs of the schemes positionally
    ///
    /// One seed is drawn for the whole batch. Each scheme gets its own
    /// random stream derived from that seed and the scheme's identifier, so
    /// its output does not depend on its siblings or its position.
    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        let seed = rng.next_u64();

        let mut output = vec![String::new(); count];
        for scheme in &self.schemes {
            let mut child_rng = StdRng::seed_from_u64(child_seed(seed, scheme.id()));
            let strings = scheme.generate_strings(count, &mut child_rng, ctx)?;
            for (target, string) in output.iter_mut().zip(strings) {
                target.push_str(&string);
            }
        }
        Ok(output)
    }
}

// ============================================================================
// Template List
// ============================================================================

/// The ordered list of all templates
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateList {
    pub uuid: StateId,
    pub templates: Vec<Template>,
}

impl TemplateList {
    /// Create a list of `templates`
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            uuid: StateId::new_v4(),
            templates,
        }
    }

    /// Find a template by identifier
    pub fn find(&self, uuid: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|it| it.uuid == uuid)
    }

    /// Find a template by identifier, mutably
    pub fn find_mut(&mut self, uuid: TemplateId) -> Option<&mut Template> {
        self.templates.iter_mut().find(|it| it.uuid == uuid)
    }

    /// Find a template by name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|it| it.name_matches(name))
    }

    /// The template containing the scheme identified by `scheme`
    pub fn parent_of(&self, scheme: StateId) -> Option<&Template> {
        self.templates
            .iter()
            .find(|template| template.schemes.iter().any(|it| it.id() == scheme))
    }
}

impl Default for TemplateList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Identifiable for TemplateList {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for TemplateList {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            templates: self.templates.iter().map(|it| it.deep_copy(retain_uuid)).collect(),
        }
    }
}

impl Validators for TemplateList {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("templates", |it: &TemplateList| &it.templates)
                .check_with(|_, templates, _| {
                    let mut seen = HashSet::new();
                    templates
                        .iter()
                        .find(|it| !seen.insert(it.name.as_str()))
                        .map(|it| format!("There are multiple templates with the name '{}'.", it.name))
                })
                .check_with(|_, templates, ctx| {
                    templates.iter().find_map(|template| {
                        template.do_validate(ctx).map(|info| match Validatable::label(template, ctx) {
                            Some(label) => info.prepend(&label).message,
                            None => info.message,
                        })
                    })
                });
        })
    }
}

// ============================================================================
// Template Reference
// ============================================================================

/// Outputs the strings of another template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReference {
    pub uuid: StateId,
    pub template_uuid: Option<TemplateId>,
    pub capitalization: CapitalizationMode,
    pub affix_decorator: AffixDecorator,
    pub array_decorator: ArrayDecorator,
}

impl TemplateReference {
    /// Create a reference to `template_uuid`
    pub fn new(template_uuid: Option<TemplateId>) -> Self {
        Self {
            template_uuid,
            ..Self::default()
        }
    }

    /// The referenced template, if it exists in `ctx`
    pub fn template<'a>(&self, ctx: &'a Settings) -> Option<&'a Template> {
        self.template_uuid.and_then(|uuid| ctx.template_list.find(uuid))
    }

    /// The template containing this reference, if it exists in `ctx`
    pub fn parent<'a>(&self, ctx: &'a Settings) -> Option<&'a Template> {
        ctx.template_list.parent_of(self.uuid)
    }

    /// Whether this reference could refer to `target` without causing recursion
    ///
    /// The current target of this reference is ignored.
    pub fn can_reference(&self, target: TemplateId, ctx: &Settings) -> bool {
        self.find_recursion(target, ctx).is_none()
    }

    /// The cycle that would exist if this reference referred to `target`
    fn find_recursion(&self, target: TemplateId, ctx: &Settings) -> Option<Vec<TemplateId>> {
        let parent = self.parent(ctx)?;
        if parent.uuid == target {
            return Some(vec![target, target]);
        }

        let mut graph = ReferenceGraph::from_templates(ctx.templates(), Some(self.uuid));
        graph.add_edge(parent.uuid, target);
        graph.find_cycle_from(parent.uuid)
    }

    fn recursion_message(&self, target: TemplateId, ctx: &Settings) -> Option<String> {
        let cycle = self.find_recursion(target, ctx)?;
        let names: Vec<&str> = cycle
            .iter()
            .map(|uuid| ctx.template_list.find(*uuid).map_or("?", |it| it.name.as_str()))
            .collect();
        Some(format!("Found recursion: ({})", names.join(" → ")))
    }
}

impl Default for TemplateReference {
    fn default() -> Self {
        Self {
            uuid: StateId::new_v4(),
            template_uuid: None,
            capitalization: CapitalizationMode::Retain,
            affix_decorator: AffixDecorator::new(false, "\""),
            array_decorator: ArrayDecorator::new(),
        }
    }
}

impl Identifiable for TemplateReference {
    fn id(&self) -> StateId {
        self.uuid
    }
}

impl State for TemplateReference {
    fn deep_copy(&self, retain_uuid: bool) -> Self {
        Self {
            uuid: copied_uuid(self.uuid, retain_uuid),
            affix_decorator: self.affix_decorator.deep_copy(retain_uuid),
            array_decorator: self.array_decorator.deep_copy(retain_uuid),
            ..self.clone()
        }
    }
}

impl Validators for TemplateReference {
    fn validators() -> Vec<Validator<Self>> {
        validators(|dsl| {
            dsl.of("templateUuid", |it: &TemplateReference| &it.template_uuid)
                .check_with(|it, target, ctx| match target {
                    None => Some("No template selected.".to_string()),
                    Some(uuid) if ctx.template_list.find(*uuid).is_none() => {
                        Some(format!("Cannot find referenced template {uuid}."))
                    }
                    Some(uuid) => it.recursion_message(*uuid, ctx),
                });
            dsl.include("affixDecorator", |it: &TemplateReference| &it.affix_decorator);
            dsl.include("arrayDecorator", |it: &TemplateReference| &it.array_decorator);
        })
    }
}

impl Scheme for TemplateReference {
    fn name(&self, ctx: &Settings) -> String {
        match self.template(ctx) {
            Some(template) => format!("[{}]", template.name),
            None => "Reference".to_string(),
        }
    }

    fn decorators(&self) -> Vec<&dyn Decorator> {
        vec![&self.affix_decorator, &self.array_decorator]
    }

    fn generate_undecorated_strings(
        &self,
        count: usize,
        rng: &mut StdRng,
        ctx: &Settings,
    ) -> RandomnessResult<Vec<String>> {
        let Some(uuid) = self.template_uuid else {
            return Err(RandomnessError::generation("No template selected."));
        };
        let template = ctx
            .template_list
            .find(uuid)
            .ok_or_else(|| RandomnessError::TemplateNotFound(uuid.to_string()))?;

        Ok(template
            .generate_strings(count, rng, ctx)?
            .iter()
            .map(|it| self.capitalization.transform(it, rng))
            .collect())
    }
}

// ============================================================================
// Reference Graph
// ============================================================================

/// Directed graph of which template references which
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    edges: HashMap<TemplateId, Vec<TemplateId>>,
}

impl ReferenceGraph {
    /// Build the graph of `templates`, leaving out the reference identified by `excluded`
    pub fn from_templates(templates: &[Template], excluded: Option<StateId>) -> Self {
        let mut graph = Self::default();
        for template in templates {
            graph.edges.entry(template.uuid).or_default();
            for reference in template.references() {
                if Some(reference.uuid) == excluded {
                    continue;
                }
                if let Some(target) = reference.template_uuid {
                    graph.add_edge(template.uuid, target);
                }
            }
        }
        graph
    }

    /// Add an edge from `from` to `to`
    pub fn add_edge(&mut self, from: TemplateId, to: TemplateId) {
        self.edges.entry(from).or_default().push(to);
    }

    /// Templates directly referenced by `from`
    pub fn targets(&self, from: TemplateId) -> &[TemplateId] {
        self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A path from `start` back to itself, if one exists
    ///
    /// The returned path begins and ends with `start`.
    pub fn find_cycle_from(&self, start: TemplateId) -> Option<Vec<TemplateId>> {
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        self.search(start, start, &mut path, &mut visited).then_some(path)
    }

    fn search(
        &self,
        node: TemplateId,
        start: TemplateId,
        path: &mut Vec<TemplateId>,
        visited: &mut HashSet<TemplateId>,
    ) -> bool {
        for &next in self.targets(node) {
            if next == start {
                path.push(next);
                return true;
            }
            if visited.insert(next) {
                path.push(next);
                if self.search(next, start, path, visited) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================
