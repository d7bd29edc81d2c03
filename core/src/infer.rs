//! Field type inference.
//!
//! Collapses a field's declared and documented types into the single
//! [`TypeDescriptor`] the coercer works with. The documented type wins
//! when it references a shape (it is the only way to describe a
//! container's element shape); otherwise the declared type decides, with
//! the generic container carrying untyped elements.

use crate::types::{FieldSchema, TypeKind};

/// The coercer's view of a field: element type, container flag,
/// optionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type each (element) value coerces to; [`TypeKind::Any`] means
    /// passthrough.
    pub element: TypeKind,
    /// Whether the raw value is mapped element-wise as a sequence.
    pub container: bool,
    /// Whether null short-circuits coercion.
    pub optional: bool,
}

impl TypeDescriptor {
    /// The inert descriptor: no coercion, no container handling.
    pub fn passthrough() -> Self {
        Self {
            element: TypeKind::Any,
            container: false,
            optional: false,
        }
    }
}

/// Infers the semantic type of a field, two passes with first match wins.
///
/// Documented pass: a documented type referencing a shape yields that
/// shape as the element type, container flag taken from the annotation.
/// Documented scalars carry no extra information and are ignored.
///
/// Declared pass: the generic container type yields untyped elements;
/// any other kind becomes the element type directly. Optionality comes
/// from the declared type.
///
/// If neither pass yields a type the field passes through uncoerced.
///
/// # Examples
///
/// ```
/// use datamap_core::*;
///
/// let children = FieldSchema::new("children", TypeRef::array())
///     .with_documented(TypeRef::array_of(TypeKind::Shape("Child".into())));
/// let descriptor = infer_type(&children);
/// assert!(descriptor.container);
/// assert_eq!(descriptor.element, TypeKind::Shape("Child".into()));
/// ```
pub fn infer_type(field: &FieldSchema) -> TypeDescriptor {
    if let Some(documented) = &field.documented {
        if matches!(documented.kind, TypeKind::Shape(_)) {
            return TypeDescriptor {
                element: documented.kind.clone(),
                container: documented.container,
                optional: false,
            };
        }
    }

    let declared = &field.declared;
    if declared.container {
        return TypeDescriptor {
            element: TypeKind::Any,
            container: true,
            optional: declared.optional,
        };
    }
    if declared.kind != TypeKind::Any {
        return TypeDescriptor {
            element: declared.kind.clone(),
            container: false,
            optional: declared.optional,
        };
    }

    TypeDescriptor::passthrough()
}
