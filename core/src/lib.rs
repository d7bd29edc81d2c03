//! Schema-driven mapping and validation of untyped data into typed
//! instances.
//!
//! This crate takes a plain associative structure (decoded JSON) and a
//! declared "shape" with typed fields, and produces a fully typed
//! instance of that shape:
//!
//! - [`ShapeSchema`] / [`FieldSchema`] — explicit schema objects declaring
//!   fields, types, defaults, and key-mapping rules.
//! - [`MappingRule`] — declarative source-key remapping: exact rename,
//!   case-convention conversion, or field suppression.
//! - [`Mapper`] — the orchestrator: resolves keys, coerces values
//!   (scalars, dates, nested shapes, arrays of shapes) and assigns them
//!   onto an [`Instance`].
//! - [`Validator`] — injected constraint engine; failures surface as a
//!   [`ValidationError`] carrying the full ordered [`Violation`] set.
//!
//! Coercion is deliberately permissive: input that cannot be interpreted
//! for a field's type passes through unchanged, and flagging it is the
//! validator's job.
//!
//! # Example
//!
//! ```
//! use datamap_core::*;
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::new()
//!     .with_shape(
//!         ShapeSchema::new("User")
//!             .with_rule(MappingRule::from_snake())
//!             .with_field(FieldSchema::new("displayName", TypeRef::of(TypeKind::String)))
//!             .with_field(FieldSchema::new("signedUpAt", TypeRef::of(TypeKind::DateTime)))
//!             .with_field(
//!                 FieldSchema::new("addresses", TypeRef::array())
//!                     .with_documented(TypeRef::array_of(TypeKind::Shape("Address".into()))),
//!             ),
//!     )
//!     .with_shape(
//!         ShapeSchema::new("Address")
//!             .with_field(FieldSchema::new("city", TypeRef::of(TypeKind::String))),
//!     );
//!
//! let mapper = Mapper::new(&registry, &AcceptAll);
//! let user = mapper
//!     .hydrate(
//!         "User",
//!         &json!({
//!             "display_name": "Ada",
//!             "signed_up_at": "2024-01-15T10:30:00Z",
//!             "addresses": [{"city": "London"}],
//!         }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(user.get("displayName").and_then(|v| v.as_str()), Some("Ada"));
//! let addresses = user.get("addresses").and_then(|v| v.as_seq()).unwrap();
//! let city = addresses[0].as_instance().and_then(|a| a.get("city"));
//! assert_eq!(city.and_then(|v| v.as_str()), Some("London"));
//! ```

mod coerce;
mod error;
mod infer;
mod mapper;
mod rules;
mod types;
mod validate;

pub use error::{MapError, Result};
pub use infer::{TypeDescriptor, infer_type};
pub use mapper::{Mapper, resolve_key};
pub use rules::{CaseConvention, KeyResolution, MappingRule};
pub use types::{
    FieldSchema, Instance, SchemaRegistry, ShapeSchema, TypeKind, TypeRef, TypedValue,
};
pub use validate::{AcceptAll, FnValidator, ValidationError, Validator, Violation};
