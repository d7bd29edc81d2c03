//! The mapping orchestrator.
//!
//! [`Mapper`] walks a shape's fields in declaration order, resolves each
//! field's source key through the attached mapping rules, coerces the raw
//! value and assigns it onto the instance. Validation runs separately
//! (or fused, via [`Mapper::hydrate`]) so callers can choose between
//! fill-only population and the full fill-and-validate pipeline.

use serde_json::Value;
use tracing::{debug, trace};

use crate::coerce::coerce;
use crate::error::{MapError, Result};
use crate::infer::infer_type;
use crate::rules::KeyResolution;
use crate::types::{FieldSchema, Instance, SchemaRegistry, ShapeSchema};
use crate::validate::{ValidationError, Validator};

/// Resolves the source key for a field within its shape.
///
/// The first field-level rule is the only active rule when any are
/// attached; otherwise the first shape-level rule applies; otherwise the
/// source key is the field name itself. A resolution of
/// [`KeyResolution::Omit`] (from a `Skip` rule or an unusable
/// conversion) suppresses the field entirely.
///
/// # Examples
///
/// ```
/// use datamap_core::*;
///
/// let shape = ShapeSchema::new("User")
///     .with_rule(MappingRule::from_snake())
///     .with_field(FieldSchema::untyped("displayName"))
///     .with_field(FieldSchema::untyped("id").with_rule(MappingRule::rename("uuid")));
///
/// let display = shape.field("displayName").unwrap();
/// assert_eq!(resolve_key(display, &shape), KeyResolution::Key("display_name".into()));
///
/// // The field-level rename beats the shape-level case rule.
/// let id = shape.field("id").unwrap();
/// assert_eq!(resolve_key(id, &shape), KeyResolution::Key("uuid".into()));
/// ```
pub fn resolve_key(field: &FieldSchema, shape: &ShapeSchema) -> KeyResolution {
    if let Some(rule) = field.rules.first() {
        return rule.resolve(&field.name);
    }
    if let Some(rule) = shape.rules.first() {
        return rule.resolve(&field.name);
    }
    KeyResolution::Key(field.name.clone())
}

/// Fills instances of registered shapes from raw input and validates
/// them through an injected constraint engine.
///
/// Nested shape fields recurse through the same mapper, so every shape
/// reachable from the one being filled must be registered. Schemas are
/// expected to form a DAG; a cyclic schema fed matching cyclic input
/// would recurse without bound.
///
/// # Examples
///
/// ```
/// use datamap_core::*;
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new().with_shape(
///     ShapeSchema::new("User")
///         .with_rule(MappingRule::from_snake())
///         .with_field(FieldSchema::new("displayName", TypeRef::of(TypeKind::String)))
///         .with_field(FieldSchema::new("age", TypeRef::of(TypeKind::Int))),
/// );
///
/// let mapper = Mapper::new(&registry, &AcceptAll);
/// let user = mapper
///     .hydrate("User", &json!({"display_name": "Ada", "age": "36"}))
///     .unwrap();
///
/// assert_eq!(user.get("displayName").and_then(|v| v.as_str()), Some("Ada"));
/// assert_eq!(user.get("age").and_then(|v| v.as_i64()), Some(36));
/// ```
pub struct Mapper<'a> {
    registry: &'a SchemaRegistry,
    validator: &'a dyn Validator,
}

impl<'a> Mapper<'a> {
    /// Creates a mapper over the given registry and constraint engine.
    pub fn new(registry: &'a SchemaRegistry, validator: &'a dyn Validator) -> Self {
        Self {
            registry,
            validator,
        }
    }

    /// The registry this mapper resolves nested shapes against.
    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    /// Populates `instance` from `data` in place, without validating.
    ///
    /// Fields are processed in declaration order. For each field the
    /// source key is resolved; omitted fields stay untouched. An absent
    /// key falls back to the field's declared default; with no default
    /// the field is left unset for validation to judge. Values (defaults
    /// included) are coerced to the field's inferred type, and
    /// assignment always overwrites, so refilling is idempotent.
    ///
    /// The only error is a [`ValidationError`] propagating unwrapped out
    /// of a nested shape, or [`MapError::UnknownShape`] when the
    /// instance's shape is not registered.
    pub fn fill(&self, instance: &mut Instance, data: &Value) -> Result<()> {
        let schema = self
            .registry
            .get(instance.shape())
            .ok_or_else(|| MapError::UnknownShape(instance.shape().to_string()))?;

        for field in &schema.fields {
            let key = match resolve_key(field, schema) {
                KeyResolution::Key(key) => key,
                KeyResolution::Omit => {
                    trace!(shape = %schema.name, field = %field.name, "Field omitted by mapping rule");
                    continue;
                }
            };

            let raw = match data.get(key.as_str()) {
                Some(value) => value,
                None => match &field.default {
                    Some(default) => default,
                    None => continue,
                },
            };

            let descriptor = infer_type(field);
            let value = coerce(self, &descriptor, raw)?;
            instance.set(field.name.clone(), value);
        }

        Ok(())
    }

    /// Runs the constraint engine against a populated instance.
    ///
    /// Atomic: succeeds only when the engine reports zero violations,
    /// and fails with the complete ordered violation set otherwise.
    pub fn validate(&self, instance: &Instance) -> Result<()> {
        let violations = self.validator.validate(instance);
        if violations.is_empty() {
            return Ok(());
        }
        debug!(
            shape = %instance.shape(),
            count = violations.len(),
            "Validation failed"
        );
        Err(ValidationError::new(violations).into())
    }

    /// One-shot fill and validate of a fresh instance.
    ///
    /// The shape name must be registered; the returned instance has
    /// passed the full constraint check.
    pub fn hydrate(&self, shape: &str, data: &Value) -> Result<Instance> {
        let schema = self
            .registry
            .get(shape)
            .ok_or_else(|| MapError::UnknownShape(shape.to_string()))?;
        let mut instance = Instance::new(schema);
        self.fill(&mut instance, data)?;
        self.validate(&instance)?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::rules::MappingRule;
    use crate::types::{TypeKind, TypeRef, TypedValue};
    use crate::validate::{AcceptAll, FnValidator, Violation};

    use super::*;

    fn user_shape() -> ShapeSchema {
        ShapeSchema::new("User")
            .with_field(FieldSchema::untyped("name"))
            .with_field(FieldSchema::new("age", TypeRef::of(TypeKind::Int)))
    }

    #[test]
    fn test_resolve_key_defaults_to_field_name() {
        let shape = user_shape();
        let field = shape.field("name").unwrap();
        assert_eq!(resolve_key(field, &shape), KeyResolution::Key("name".into()));
    }

    #[test]
    fn test_field_rule_beats_shape_rule() {
        let shape = ShapeSchema::new("User")
            .with_rule(MappingRule::rename("shape_wide"))
            .with_field(FieldSchema::untyped("id").with_rule(MappingRule::rename("uuid")));

        let field = shape.field("id").unwrap();
        assert_eq!(resolve_key(field, &shape), KeyResolution::Key("uuid".into()));
    }

    #[test]
    fn test_first_field_rule_wins_over_later_ones() {
        let shape = ShapeSchema::new("User").with_field(
            FieldSchema::untyped("id")
                .with_rule(MappingRule::rename("first"))
                .with_rule(MappingRule::rename("second")),
        );

        let field = shape.field("id").unwrap();
        assert_eq!(resolve_key(field, &shape), KeyResolution::Key("first".into()));
    }

    #[test]
    fn test_skip_rule_omits_even_with_matching_input() {
        let registry = SchemaRegistry::new().with_shape(
            ShapeSchema::new("User")
                .with_field(FieldSchema::untyped("foo"))
                .with_field(
                    FieldSchema::untyped("bar")
                        .with_default(json!("baz"))
                        .with_rule(MappingRule::Skip),
                ),
        );
        let mapper = Mapper::new(&registry, &AcceptAll);

        let user = mapper
            .hydrate("User", &json!({"foo": "fooz", "bar": "barz"}))
            .unwrap();
        assert_eq!(user.get("bar").and_then(|v| v.as_str()), Some("baz"));
        assert_eq!(user.get("foo").and_then(|v| v.as_str()), Some("fooz"));
    }

    #[test]
    fn test_absent_key_falls_back_to_coerced_default() {
        let registry = SchemaRegistry::new().with_shape(
            ShapeSchema::new("Config").with_field(
                FieldSchema::new("retries", TypeRef::of(TypeKind::Int)).with_default(json!("3")),
            ),
        );
        let mapper = Mapper::new(&registry, &AcceptAll);

        let config = mapper.hydrate("Config", &json!({})).unwrap();
        assert_eq!(config.get("retries"), Some(&TypedValue::Int(3)));
    }

    #[test]
    fn test_absent_key_without_default_leaves_field_unset() {
        let registry = SchemaRegistry::new().with_shape(user_shape());
        let mapper = Mapper::new(&registry, &AcceptAll);

        let user = mapper.hydrate("User", &json!({"name": "Ada"})).unwrap();
        assert!(!user.is_set("age"));
    }

    #[test]
    fn test_refill_overwrites_instead_of_merging() {
        let registry = SchemaRegistry::new().with_shape(user_shape());
        let mapper = Mapper::new(&registry, &AcceptAll);
        let data = json!({"name": "Ada", "age": 36});

        let once = mapper.hydrate("User", &data).unwrap();
        let mut twice = once.clone();
        mapper.fill(&mut twice, &data).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_surfaces_all_violations_atomically() {
        let registry = SchemaRegistry::new().with_shape(user_shape());
        let engine = FnValidator(|_: &Instance| {
            vec![
                Violation::new("name", "must not be blank"),
                Violation::new("age", "must be positive"),
            ]
        });
        let mapper = Mapper::new(&registry, &engine);

        let error = mapper
            .hydrate("User", &json!({"name": "", "age": -1}))
            .unwrap_err();
        let violations = error.violations().expect("validation error");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path, "name");
        assert_eq!(violations[1].path, "age");
    }

    #[test]
    fn test_hydrate_unknown_shape_errors() {
        let registry = SchemaRegistry::new();
        let mapper = Mapper::new(&registry, &AcceptAll);

        let error = mapper.hydrate("Ghost", &json!({})).unwrap_err();
        assert_eq!(error, MapError::UnknownShape("Ghost".into()));
    }
}
