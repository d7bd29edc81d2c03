//! Raw value coercion.
//!
//! Turns a raw JSON value into the [`TypedValue`] a field's
//! [`TypeDescriptor`] calls for. Coercion never fails on its own: input
//! that cannot be interpreted (non-numeric strings for numeric fields,
//! malformed dates, unregistered shape names) passes through unchanged
//! and is left for validation to flag. The only error that can leave this
//! module is a validation failure propagating out of a nested shape,
//! which is surfaced unwrapped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::Result;
use crate::infer::TypeDescriptor;
use crate::mapper::Mapper;
use crate::types::{Instance, TypeKind, TypedValue};

/// Coerces a raw value according to the field's descriptor.
///
/// Container descriptors map element coercion over array input,
/// preserving order and length. Non-array input to a container field
/// falls through to plain item coercion unchanged.
pub(crate) fn coerce(mapper: &Mapper<'_>, descriptor: &TypeDescriptor, raw: &Value) -> Result<TypedValue> {
    if descriptor.container {
        if let Value::Array(items) = raw {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(coerce_item(mapper, &descriptor.element, descriptor.optional, item)?);
            }
            return Ok(TypedValue::Seq(out));
        }
    }
    coerce_item(mapper, &descriptor.element, descriptor.optional, raw)
}

fn coerce_item(
    mapper: &Mapper<'_>,
    element: &TypeKind,
    optional: bool,
    raw: &Value,
) -> Result<TypedValue> {
    if optional && raw.is_null() {
        return Ok(TypedValue::Null);
    }

    if let TypeKind::Shape(name) = element {
        if raw.is_object() {
            if let Some(schema) = mapper.registry().get(name) {
                let mut nested = Instance::new(schema);
                mapper.fill(&mut nested, raw)?;
                mapper.validate(&nested)?;
                return Ok(TypedValue::Instance(Box::new(nested)));
            }
        }
        // Unregistered shape or non-object input: passthrough below.
    }

    Ok(match element {
        TypeKind::DateTime => coerce_datetime(raw),
        TypeKind::Bool => TypedValue::Bool(is_truthy(raw)),
        TypeKind::Int => coerce_int(raw),
        TypeKind::Float => coerce_float(raw),
        _ => TypedValue::from_json(raw),
    })
}

/// The asymmetric truthy test: only `"1"`, `"true"`, `1` and `true` are
/// true; everything else, including `"0"` and arbitrary strings, is
/// false. This is deliberately not a general boolean parse.
fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::String(s) => s == "1" || s == "true",
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    }
}

fn coerce_int(raw: &Value) -> TypedValue {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .map(TypedValue::Int)
            .or_else(|| n.as_f64().map(|f| TypedValue::Int(f as i64)))
            .unwrap_or_else(|| TypedValue::from_json(raw)),
        Value::String(s) => match parse_numeric(s) {
            Some(f) => TypedValue::Int(f as i64),
            None => TypedValue::from_json(raw),
        },
        _ => TypedValue::from_json(raw),
    }
}

fn coerce_float(raw: &Value) -> TypedValue {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .map(TypedValue::Float)
            .unwrap_or_else(|| TypedValue::from_json(raw)),
        Value::String(s) => match parse_numeric(s) {
            Some(f) => TypedValue::Float(f),
            None => TypedValue::from_json(raw),
        },
        _ => TypedValue::from_json(raw),
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn coerce_datetime(raw: &Value) -> TypedValue {
    match raw {
        Value::String(s) => match parse_datetime(s) {
            Some(dt) => TypedValue::DateTime(dt),
            None => TypedValue::from_json(raw),
        },
        Value::Number(n) => {
            let seconds = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64));
            match seconds.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
                Some(dt) => TypedValue::DateTime(dt),
                None => TypedValue::from_json(raw),
            }
        }
        _ => TypedValue::from_json(raw),
    }
}

/// Parses RFC 3339 first, then the common space-separated and date-only
/// forms, all normalized to UTC.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}
