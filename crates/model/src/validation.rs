//! Validation DSL for configuration nodes
//!
//! Every configuration node declares its validators once, through the
//! [`validators`] builder. Each validator is bound to one property and
//! returns `None` when that property is valid, or a [`ValidationInfo`]
//! explaining the problem otherwise.
//!
//! Validation failures are data, never errors: they flow as return values
//! through nested nodes until some caller decides what to do with them.
//!
//! ```rust,ignore
//! impl Validators for FixedLengthDecorator {
//!     fn validators() -> Vec<Validator<Self>> {
//!         validators(|dsl| {
//!             dsl.case(|it| it.enabled, |dsl| {
//!                 dsl.of("length", |it| &it.length)
//!                     .check(|_, length| *length >= 1, |_, _| "Length should be at least 1.".into());
//!             });
//!         })
//!     }
//! }
//! ```

use crate::settings::Settings;
use std::fmt;
use std::rc::Rc;

/// Separator placed between a parent label and a nested failure message
pub const PATH_SEPARATOR: &str = " > ";

// ============================================================================
// Validation Info
// ============================================================================

/// A failed validation of a single property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationInfo {
    /// Dotted path of the property that is invalid
    pub property: String,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationInfo {
    /// Create a new validation failure
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Returns a copy with `prefix` and [`PATH_SEPARATOR`] prepended to the message
    pub fn prepend(self, prefix: &str) -> Self {
        Self {
            message: format!("{prefix}{PATH_SEPARATOR}{}", self.message),
            ..self
        }
    }

    /// Returns a copy whose property is nested under `parent`
    pub fn nest(self, parent: &str) -> Self {
        Self {
            property: format!("{parent}.{}", self.property),
            ..self
        }
    }
}

impl fmt::Display for ValidationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ============================================================================
// Validator
// ============================================================================

type Condition<T> = Rc<dyn Fn(&T) -> bool>;
type Check<T> = Box<dyn Fn(&T, &Settings) -> Option<ValidationInfo>>;

/// A validation closure bound to one property of `T`
pub struct Validator<T> {
    property: &'static str,
    condition: Option<Condition<T>>,
    check: Check<T>,
}

impl<T> Validator<T> {
    /// The property this validator checks
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Run this validator against `target`
    ///
    /// The enclosing `case` conditions are evaluated first, on every call.
    pub fn validate(&self, target: &T, ctx: &Settings) -> Option<ValidationInfo> {
        if let Some(condition) = &self.condition {
            if !condition(target) {
                return None;
            }
        }
        (self.check)(target, ctx)
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("property", &self.property)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// Returns the first failure of `validators` in declaration order
pub fn validate_first<T>(
    validators: &[Validator<T>],
    target: &T,
    ctx: &Settings,
) -> Option<ValidationInfo> {
    validators.iter().find_map(|it| it.validate(target, ctx))
}

/// Returns every failure of `validators`, each evaluated independently
pub fn validate_all<T>(validators: &[Validator<T>], target: &T, ctx: &Settings) -> Vec<ValidationInfo> {
    validators
        .iter()
        .filter_map(|it| it.validate(target, ctx))
        .collect()
}

// ============================================================================
// Traits
// ============================================================================

/// Types that can explain whether they are valid
pub trait Validatable {
    /// Validate, returning the first failure only
    fn do_validate(&self, ctx: &Settings) -> Option<ValidationInfo>;

    /// Validate every property independently, returning all failures
    fn validate_each(&self, ctx: &Settings) -> Vec<ValidationInfo>;

    /// Label prepended to failures when this value is included by a parent
    fn label(&self, _ctx: &Settings) -> Option<String> {
        None
    }

    /// Check validity without details
    fn is_valid(&self, ctx: &Settings) -> bool {
        self.do_validate(ctx).is_none()
    }
}

/// Types that declare their validators through the DSL
pub trait Validators: Sized + 'static {
    /// Builds this type's validators
    fn validators() -> Vec<Validator<Self>>;

    /// See [`Validatable::label`]
    fn label(&self, _ctx: &Settings) -> Option<String> {
        None
    }
}

impl<T: Validators> Validatable for T {
    fn do_validate(&self, ctx: &Settings) -> Option<ValidationInfo> {
        validate_first(&T::validators(), self, ctx)
    }

    fn validate_each(&self, ctx: &Settings) -> Vec<ValidationInfo> {
        validate_all(&T::validators(), self, ctx)
    }

    fn label(&self, ctx: &Settings) -> Option<String> {
        Validators::label(self, ctx)
    }
}

// ============================================================================
// DSL
// ============================================================================

/// Runs `body` in a fresh DSL and returns the validators it created
pub fn validators<T: 'static>(body: impl FnOnce(&mut ValidatorDsl<T>)) -> Vec<Validator<T>> {
    let mut dsl = ValidatorDsl {
        validators: Vec::new(),
        condition: None,
    };
    body(&mut dsl);
    dsl.validators
}

/// Builder for the validators of `T`
pub struct ValidatorDsl<T> {
    validators: Vec<Validator<T>>,
    condition: Option<Condition<T>>,
}

impl<T: 'static> ValidatorDsl<T> {
    fn push(&mut self, property: &'static str, check: Check<T>) {
        self.validators.push(Validator {
            property,
            condition: self.condition.clone(),
            check,
        });
    }

    /// Enters a sub-DSL for validating the value returned by `getter`
    pub fn of<V: ?Sized + 'static>(
        &mut self,
        property: &'static str,
        getter: fn(&T) -> &V,
    ) -> OfDsl<'_, T, V> {
        OfDsl {
            dsl: self,
            property,
            getter,
        }
    }

    /// Validates the nested value returned by `getter`
    ///
    /// The nested property path is joined with a dot, and the child's label
    /// (if any) is prepended to the message.
    pub fn include<S: Validatable + ?Sized + 'static>(
        &mut self,
        property: &'static str,
        getter: fn(&T) -> &S,
    ) {
        self.push(
            property,
            Box::new(move |target, ctx| {
                let child = getter(target);
                child.do_validate(ctx).map(|info| {
                    let info = info.nest(property);
                    match child.label(ctx) {
                        Some(label) => info.prepend(&label),
                        None => info,
                    }
                })
            }),
        );
    }

    /// Like [`ValidatorDsl::include`], skipped whenever `condition` is false
    pub fn include_if<S: Validatable + ?Sized + 'static>(
        &mut self,
        property: &'static str,
        getter: fn(&T) -> &S,
        condition: impl Fn(&T) -> bool + 'static,
    ) {
        self.case(condition, |dsl| dsl.include(property, getter));
    }

    /// Validators added inside `body` return `None` while `condition` is false
    ///
    /// Conditions of nested cases are combined conjunctively and read at
    /// validation time.
    pub fn case(
        &mut self,
        condition: impl Fn(&T) -> bool + 'static,
        body: impl FnOnce(&mut ValidatorDsl<T>),
    ) {
        let parent = self.condition.clone();
        let combined: Condition<T> =
            Rc::new(move |target: &T| parent.as_ref().is_none_or(|it| it(target)) && condition(target));

        let mut nested = ValidatorDsl {
            validators: std::mem::take(&mut self.validators),
            condition: Some(combined),
        };
        body(&mut nested);
        self.validators = nested.validators;
    }
}

/// Builder for validators of one property
pub struct OfDsl<'a, T, V: ?Sized> {
    dsl: &'a mut ValidatorDsl<T>,
    property: &'static str,
    getter: fn(&T) -> &V,
}

impl<T: 'static, V: ?Sized + 'static> OfDsl<'_, T, V> {
    /// Fails with `message` whenever `is_valid` returns false
    pub fn check(
        self,
        is_valid: impl Fn(&T, &V) -> bool + 'static,
        message: impl Fn(&T, &V) -> String + 'static,
    ) -> Self {
        let (property, getter) = (self.property, self.getter);
        self.dsl.push(
            property,
            Box::new(move |target, _| {
                let value = getter(target);
                if is_valid(target, value) {
                    None
                } else {
                    Some(ValidationInfo::new(property, message(target, value)))
                }
            }),
        );
        self
    }

    /// Fails with the message returned by `validate`, if any
    pub fn check_with(
        self,
        validate: impl Fn(&T, &V, &Settings) -> Option<String> + 'static,
    ) -> Self {
        let (property, getter) = (self.property, self.getter);
        self.dsl.push(
            property,
            Box::new(move |target, ctx| {
                validate(target, getter(target), ctx).map(|message| ValidationInfo::new(property, message))
            }),
        );
        self
    }

    /// Fails whenever `block` returns an error
    ///
    /// The error's message becomes the failure message, or the error's type
    /// name if the message is empty.
    pub fn check_no_exception<R: 'static, E: fmt::Display + 'static>(
        self,
        block: impl Fn(&T, &V) -> Result<R, E> + 'static,
    ) -> Self {
        let (property, getter) = (self.property, self.getter);
        self.dsl.push(
            property,
            Box::new(move |target, _| match block(target, getter(target)) {
                Ok(_) => None,
                Err(error) => {
                    let message = error.to_string();
                    let message = if message.is_empty() {
                        std::any::type_name::<E>().to_string()
                    } else {
                        message
                    };
                    Some(ValidationInfo::new(property, message))
                }
            }),
        );
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Default)]
    struct Child {
        count: i32,
    }

    impl Validators for Child {
        fn validators() -> Vec<Validator<Self>> {
            validators(|dsl| {
                dsl.of("count", |it: &Child| &it.count)
                    .check(|_, count| *count >= 0, |_, count| format!("Count {count} is negative."));
            })
        }

        fn label(&self, _ctx: &Settings) -> Option<String> {
            Some("Child".to_string())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Parent {
        enabled: bool,
        strict: bool,
        name: String,
        child: Child,
    }

    impl Validators for Parent {
        fn validators() -> Vec<Validator<Self>> {
            validators(|dsl| {
                dsl.of("name", |it: &Parent| it.name.as_str())
                    .check(|_, name| !name.is_empty(), |_, _| "Name is empty.".to_string());
                dsl.case(
                    |it: &Parent| it.enabled,
                    |dsl| {
                        dsl.include("child", |it: &Parent| &it.child);
                        dsl.case(
                            |it: &Parent| it.strict,
                            |dsl| {
                                dsl.of("name", |it: &Parent| it.name.as_str()).check(
                                    |_, name| name.len() > 3,
                                    |_, _| "Name is too short.".to_string(),
                                );
                            },
                        );
                    },
                );
            })
        }
    }

    fn ctx() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_validation_info_prepend_and_nest() {
        let info = ValidationInfo::new("count", "Too low.")
            .nest("child")
            .prepend("Integer");
        assert_eq!(info.property, "child.count");
        assert_eq!(info.message, "Integer > Too low.");
        assert_eq!(info.to_string(), "Integer > Too low.");
    }

    #[test]
    fn test_valid_object_returns_none() {
        let parent = Parent {
            name: "name".to_string(),
            ..Default::default()
        };
        assert_eq!(parent.do_validate(&ctx()), None);
        assert!(parent.is_valid(&ctx()));
    }

    #[test]
    fn test_first_failure_is_returned() {
        let parent = Parent {
            enabled: true,
            name: String::new(),
            child: Child { count: -1 },
            ..Default::default()
        };
        let info = parent.do_validate(&ctx()).unwrap();
        assert_eq!(info.property, "name");
        assert_eq!(info.message, "Name is empty.");
    }

    #[test]
    fn test_validate_each_returns_all_failures() {
        let parent = Parent {
            enabled: true,
            strict: true,
            name: String::new(),
            child: Child { count: -1 },
        };
        let infos = parent.validate_each(&ctx());
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[1].property, "child.count");
        assert_eq!(infos[1].message, "Child > Count -1 is negative.");
    }

    #[test]
    fn test_case_suppresses_validators_when_false() {
        let parent = Parent {
            enabled: false,
            strict: true,
            name: "ab".to_string(),
            child: Child { count: -1 },
        };
        assert_eq!(parent.do_validate(&ctx()), None);
    }

    #[test]
    fn test_nested_case_is_conjunctive() {
        let parent = Parent {
            enabled: true,
            strict: false,
            name: "ab".to_string(),
            child: Child::default(),
        };
        assert_eq!(parent.do_validate(&ctx()), None);

        let parent = Parent {
            strict: true,
            ..parent
        };
        assert_eq!(parent.do_validate(&ctx()).unwrap().message, "Name is too short.");
    }

    #[test]
    fn test_condition_is_evaluated_late() {
        let validators = Parent::validators();
        let mut parent = Parent {
            enabled: false,
            name: "name".to_string(),
            child: Child { count: -1 },
            ..Default::default()
        };
        assert_eq!(validate_first(&validators, &parent, &ctx()), None);

        parent.enabled = true;
        assert!(validate_first(&validators, &parent, &ctx()).is_some());
    }

    #[test]
    fn test_check_no_exception_uses_message_or_type_name() {
        #[derive(Debug)]
        struct Silent;
        impl fmt::Display for Silent {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Ok(())
            }
        }

        let validators: Vec<Validator<String>> = validators(|dsl| {
            dsl.of("value", |it: &String| it.as_str())
                .check_no_exception(|_, value| value.parse::<i32>());
            dsl.of("value", |it: &String| it.as_str())
                .check_no_exception(|_, _| Err::<(), _>(Silent));
        });

        let infos = validate_all(&validators, &"abc".to_string(), &ctx());
        assert_eq!(infos[0].message, "invalid digit found in string");
        assert!(infos[1].message.ends_with("Silent"));
    }

    #[test]
    fn test_check_with_sees_context() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let validators: Vec<Validator<i32>> = validators(move |dsl| {
            dsl.of("value", |it: &i32| it).check_with(move |_, _, ctx| {
                counter.set(counter.get() + 1);
                if ctx.templates().is_empty() {
                    Some("No templates.".to_string())
                } else {
                    None
                }
            });
        });

        assert_eq!(validate_first(&validators, &1, &ctx()), None);
        assert_eq!(validate_first(&validators, &1, &Settings::empty()).unwrap().message, "No templates.");
        assert_eq!(calls.get(), 2);
    }
}
