//! Type classification — which shape of type a descriptor names.

use crate::error::TranslateError;
use crate::model::{DeclKind, TypeDescriptor, TypeRegistry};

/// Semantic kind of a name in the direct-type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectKind {
    Void,
    Int,
    Float,
    Double,
    Byte,
    Bool,
    Enum,
    Struct,
    String,
    Typealias,
}

impl DirectKind {
    /// Declared names win over the primitive names.
    fn lookup(name: &str, registry: &TypeRegistry) -> Option<Self> {
        if let Some(kind) = registry.kind_of(name) {
            return Some(match kind {
                DeclKind::Struct => DirectKind::Struct,
                DeclKind::Enum => DirectKind::Enum,
                DeclKind::Typealias => DirectKind::Typealias,
            });
        }
        match name {
            "void" => Some(DirectKind::Void),
            "int" => Some(DirectKind::Int),
            "float" => Some(DirectKind::Float),
            "double" => Some(DirectKind::Double),
            "byte" => Some(DirectKind::Byte),
            "bool" => Some(DirectKind::Bool),
            "string" => Some(DirectKind::String),
            _ => None,
        }
    }
}

/// The category a descriptor falls into. Borrowed names point into the
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory<'a> {
    /// `unsigned int`, `unsigned short`, … already ABI safe.
    UnsignedPrimitive(&'a str),
    /// `void *`.
    VoidPointer,
    /// A typedef registered as a function pointer.
    KnownFunctionPointer(&'a str),
    /// `vector<element>`.
    GenericContainer { container: &'a str, element: &'a str },
    Direct(DirectKind, &'a str),
}

/// Classify `ty`. The first matching rule wins; a name that matches none
/// of them is an [`TranslateError::UnmappedType`].
pub fn classify<'a>(
    ty: &'a TypeDescriptor,
    registry: &TypeRegistry,
) -> Result<TypeCategory<'a>, TranslateError> {
    let name = ty.ty.as_str();

    if is_unsigned_prefixed(name) {
        return Ok(TypeCategory::UnsignedPrimitive(name));
    }
    if ty.is_void_pointer() {
        return Ok(TypeCategory::VoidPointer);
    }
    if registry.is_function_pointer(name) {
        return Ok(TypeCategory::KnownFunctionPointer(name));
    }
    if name == "vector" {
        if let Some(element) = ty.type_p.as_deref() {
            return Ok(TypeCategory::GenericContainer {
                container: name,
                element,
            });
        }
    }

    DirectKind::lookup(name, registry)
        .map(|kind| TypeCategory::Direct(kind, name))
        .ok_or_else(|| TranslateError::UnmappedType(name.to_string()))
}

/// Matches `unsigned` followed by whitespace and a word, e.g. `unsigned int`.
pub fn is_unsigned_prefixed(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("unsigned") else {
        return false;
    };
    let trimmed = rest.trim_start();
    trimmed.len() < rest.len()
        && trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
}
