//! Schema and value model for shape-driven mapping.
//!
//! This module defines the static schema side ([`ShapeSchema`],
//! [`FieldSchema`], [`TypeRef`], [`SchemaRegistry`]) and the dynamic value
//! side ([`Instance`], [`TypedValue`]) of the mapping pipeline. Schemas are
//! plain data built once through fluent constructors and are designed for
//! serialization with [`serde`], so shape definitions can round-trip through
//! JSON or be embedded at build time.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::MappingRule;

/// Semantic kind of a field's value.
///
/// Scalars coerce from loosely typed input (numeric strings, truthy
/// markers), `DateTime` parses date strings and Unix timestamps, and
/// `Shape` triggers recursive instantiation of a registered nested shape.
/// `Any` disables coercion entirely; the raw value passes through.
///
/// # Examples
///
/// ```
/// use datamap_core::TypeKind;
///
/// let kind = TypeKind::default();
/// assert_eq!(kind, TypeKind::Any);
///
/// let nested = TypeKind::Shape("Address".into());
/// assert!(matches!(nested, TypeKind::Shape(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TypeKind {
    /// Truthy boolean (`"1"`, `"true"`, `1`, `true` and nothing else).
    Bool,
    /// Signed integer, coerced from numeric-looking input.
    Int,
    /// Floating point, coerced from numeric-looking input.
    Float,
    /// UTF-8 string; no coercion is applied.
    String,
    /// Point in time, parsed from ISO-ish strings or Unix seconds.
    DateTime,
    /// A nested shape registered under the given name.
    Shape(String),
    /// Unknown/any type; values pass through uncoerced (the default).
    #[default]
    Any,
}

/// Type reference attached to a field declaration.
///
/// Mirrors what a host language's type annotation would carry: the value
/// kind, whether the field holds a sequence of such values, and whether
/// null is admitted.
///
/// # Examples
///
/// ```
/// use datamap_core::{TypeKind, TypeRef};
///
/// let age = TypeRef::of(TypeKind::Int);
/// assert!(!age.container && !age.optional);
///
/// let tags = TypeRef::array();
/// assert!(tags.container);
///
/// let nick = TypeRef::of(TypeKind::String).nullable();
/// assert!(nick.optional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Value kind.
    pub kind: TypeKind,
    /// Whether the field holds a sequence of values.
    pub container: bool,
    /// Whether null is an admitted value.
    pub optional: bool,
}

impl TypeRef {
    /// A plain reference to the given kind.
    pub fn of(kind: TypeKind) -> Self {
        Self {
            kind,
            container: false,
            optional: false,
        }
    }

    /// The generic container type with untyped elements.
    pub fn array() -> Self {
        Self {
            kind: TypeKind::Any,
            container: true,
            optional: false,
        }
    }

    /// A container whose elements have the given kind.
    ///
    /// Useful as a documented type; declared container types carry no
    /// element typing (see [`infer_type`](crate::infer_type)).
    pub fn array_of(kind: TypeKind) -> Self {
        Self {
            kind,
            container: true,
            optional: false,
        }
    }

    /// A reference to a registered nested shape.
    pub fn shape(name: impl Into<String>) -> Self {
        Self::of(TypeKind::Shape(name.into()))
    }

    /// Marks the type as admitting null.
    pub fn nullable(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl Default for TypeRef {
    fn default() -> Self {
        Self::of(TypeKind::Any)
    }
}

/// Declaration of a single field within a shape.
///
/// Carries the declared type, an optional richer documented type (which
/// can describe a container's element shape), an optional default value
/// substituted for absent input, and the field's own mapping rules.
///
/// # Examples
///
/// ```
/// use datamap_core::{FieldSchema, MappingRule, TypeKind, TypeRef};
///
/// let field = FieldSchema::new("createdAt", TypeRef::of(TypeKind::DateTime))
///     .with_rule(MappingRule::rename("created_at"));
/// assert_eq!(field.name, "createdAt");
/// assert_eq!(field.rules.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name on the target instance.
    pub name: String,
    /// Formal declared type.
    pub declared: TypeRef,
    /// Richer documented type, preferred over `declared` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documented: Option<TypeRef>,
    /// Default value substituted when the source key is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Mapping rules attached directly to this field, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<MappingRule>,
}

impl FieldSchema {
    /// Creates a field with the given declared type.
    pub fn new(name: impl Into<String>, declared: TypeRef) -> Self {
        Self {
            name: name.into(),
            declared,
            documented: None,
            default: None,
            rules: Vec::new(),
        }
    }

    /// Creates a field with no declared type; values pass through.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::default())
    }

    /// Attaches a documented type.
    pub fn with_documented(mut self, documented: TypeRef) -> Self {
        self.documented = Some(documented);
        self
    }

    /// Attaches a default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Appends a field-level mapping rule.
    pub fn with_rule(mut self, rule: MappingRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Declaration of a target shape: an ordered set of fields plus
/// shape-level mapping rules applying to every field without its own.
///
/// # Examples
///
/// ```
/// use datamap_core::*;
///
/// let shape = ShapeSchema::new("User")
///     .with_rule(MappingRule::from_snake())
///     .with_field(FieldSchema::new("displayName", TypeRef::of(TypeKind::String)))
///     .with_field(FieldSchema::new("age", TypeRef::of(TypeKind::Int)));
///
/// assert_eq!(shape.fields.len(), 2);
/// assert!(shape.field("age").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSchema {
    /// Shape name, used for registry lookups and nested references.
    pub name: String,
    /// Field declarations in declaration order.
    pub fields: Vec<FieldSchema>,
    /// Shape-level mapping rules, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<MappingRule>,
}

impl ShapeSchema {
    /// Creates an empty shape.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Appends a field declaration.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a shape-level mapping rule.
    pub fn with_rule(mut self, rule: MappingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Looks up a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Registry of shape declarations, consulted during nested coercion.
///
/// Shapes are registered once (the explicit stand-in for runtime
/// reflection) and looked up by name whenever a field's type references
/// another shape.
///
/// # Examples
///
/// ```
/// use datamap_core::{SchemaRegistry, ShapeSchema};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(ShapeSchema::new("User"));
/// assert!(registry.get("User").is_some());
/// assert!(registry.get("Ghost").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    shapes: HashMap<String, ShapeSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shape under its own name, replacing any previous entry.
    pub fn register(&mut self, shape: ShapeSchema) {
        self.shapes.insert(shape.name.clone(), shape);
    }

    /// Registers a shape and returns the registry for chaining.
    pub fn with_shape(mut self, shape: ShapeSchema) -> Self {
        self.register(shape);
        self
    }

    /// Looks up a shape by name.
    pub fn get(&self, name: &str) -> Option<&ShapeSchema> {
        self.shapes.get(name)
    }

    /// Returns the number of registered shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` when no shapes are registered.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// A coerced value held by an [`Instance`] field.
///
/// Untyped raw input converts structurally (objects become [`Map`],
/// arrays become [`Seq`]); coercion introduces the richer [`DateTime`]
/// and [`Instance`] variants.
///
/// [`Map`]: TypedValue::Map
/// [`Seq`]: TypedValue::Seq
/// [`DateTime`]: TypedValue::DateTime
/// [`Instance`]: TypedValue::Instance
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    String(String),
    /// Parsed point in time.
    DateTime(DateTime<Utc>),
    /// Ordered sequence of values.
    Seq(Vec<TypedValue>),
    /// Untyped mapping that passed through without a shape.
    Map(BTreeMap<String, TypedValue>),
    /// A validated nested shape instance.
    Instance(Box<Instance>),
}

impl TypedValue {
    /// Structural conversion from raw JSON, with no coercion applied.
    ///
    /// This is the passthrough used whenever a value reaches a field
    /// without a usable type: numbers keep their integer/float identity,
    /// arrays and objects convert element-wise.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Seq(items.iter().map(Self::from_json).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), Self::from_json(item)))
                    .collect(),
            ),
        }
    }

    /// Renders the value back into JSON.
    ///
    /// Timestamps render as RFC 3339 strings, nested instances as objects.
    /// Non-finite floats render as null (JSON cannot represent them).
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::DateTime(dt) => Value::String(dt.to_rfc3339()),
            Self::Seq(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), item.to_json()))
                    .collect(),
            ),
            Self::Instance(instance) => instance.to_json(),
        }
    }

    /// Returns `true` for [`TypedValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the string content, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean content, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer content, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric content as a float, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrows the timestamp content, if any.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Borrows the sequence content, if any.
    pub fn as_seq(&self) -> Option<&[TypedValue]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the nested instance content, if any.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

/// A populated (or in-progress) instance of a shape.
///
/// Fields live in an ordered map so instance state is deterministic
/// regardless of input key order. A fresh instance starts with the
/// shape's declared defaults; [`Mapper::fill`](crate::Mapper::fill)
/// overwrites fields from raw input. Fields that are neither defaulted
/// nor present in input stay unset, which the configured validator is
/// expected to catch.
///
/// # Examples
///
/// ```
/// use datamap_core::*;
/// use serde_json::json;
///
/// let shape = ShapeSchema::new("Task")
///     .with_field(FieldSchema::untyped("title"))
///     .with_field(FieldSchema::untyped("done").with_default(json!(false)));
///
/// let task = Instance::new(&shape);
/// assert!(task.get("title").is_none());
/// assert_eq!(task.get("done"), Some(&TypedValue::Bool(false)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    shape: String,
    fields: BTreeMap<String, TypedValue>,
}

impl Instance {
    /// Creates a fresh instance of the shape, seeded with declared defaults.
    pub fn new(schema: &ShapeSchema) -> Self {
        let fields = schema
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .default
                    .as_ref()
                    .map(|default| (field.name.clone(), TypedValue::from_json(default)))
            })
            .collect();
        Self {
            shape: schema.name.clone(),
            fields,
        }
    }

    /// Name of the shape this instance belongs to.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Borrows a field value; `None` when the field is unset.
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.fields.get(field)
    }

    /// Overwrites a field value.
    pub fn set(&mut self, field: impl Into<String>, value: TypedValue) {
        self.fields.insert(field.into(), value);
    }

    /// Returns `true` when the field has been written or defaulted.
    pub fn is_set(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over set fields in deterministic (name) order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Renders the instance into a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_registry_lookup_and_replace() {
        let mut registry = SchemaRegistry::new();
        registry.register(ShapeSchema::new("User").with_field(FieldSchema::untyped("a")));
        registry.register(ShapeSchema::new("User").with_field(FieldSchema::untyped("b")));

        let shape = registry.get("User").unwrap();
        assert_eq!(registry.len(), 1);
        assert!(shape.field("b").is_some());
        assert!(shape.field("a").is_none());
    }

    #[test]
    fn test_instance_seeds_declared_defaults() {
        let shape = ShapeSchema::new("Config")
            .with_field(FieldSchema::untyped("host").with_default(json!("localhost")))
            .with_field(FieldSchema::untyped("port"));

        let instance = Instance::new(&shape);
        assert_eq!(
            instance.get("host"),
            Some(&TypedValue::String("localhost".into()))
        );
        assert!(!instance.is_set("port"));
    }

    #[test]
    fn test_from_json_preserves_number_identity() {
        assert_eq!(TypedValue::from_json(&json!(3)), TypedValue::Int(3));
        assert_eq!(TypedValue::from_json(&json!(3.5)), TypedValue::Float(3.5));
    }

    #[test]
    fn test_json_round_trip_of_structural_values() {
        let raw = json!({"name": "foo", "tags": ["a", "b"], "extra": {"n": 1}});
        let value = TypedValue::from_json(&raw);
        assert_eq!(value.to_json(), raw);
    }

    #[test]
    fn test_shape_schema_serde_round_trip() {
        let shape = ShapeSchema::new("User")
            .with_rule(MappingRule::from_snake())
            .with_field(
                FieldSchema::new("age", TypeRef::of(TypeKind::Int).nullable())
                    .with_default(json!(0)),
            )
            .with_field(
                FieldSchema::new("children", TypeRef::array())
                    .with_documented(TypeRef::array_of(TypeKind::Shape("Child".into()))),
            );

        let encoded = serde_json::to_string(&shape).unwrap();
        let decoded: ShapeSchema = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, shape);
    }
}
