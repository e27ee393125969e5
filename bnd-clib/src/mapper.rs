//! Type mapping — descriptor → flat ABI type token.
//!
//! [`Translator`] bundles the read-only inputs every translation step
//! needs. The mangler, declaration builders and adapter resolver add their
//! own `impl Translator` blocks in their modules.

use crate::classify::{DirectKind, TypeCategory, classify};
use crate::config::Naming;
use crate::error::TranslateError;
use crate::model::{TypeDescriptor, TypeRegistry};

/// Read-only translation context for one generation pass.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    pub naming: &'a Naming,
    pub registry: &'a TypeRegistry,
}

impl<'a> Translator<'a> {
    pub fn new(naming: &'a Naming, registry: &'a TypeRegistry) -> Self {
        Self { naming, registry }
    }

    /// The ABI type token for `ty`, e.g. `__sklib_circle` or `unsigned char`.
    ///
    /// This is the only place type names are validated.
    pub fn map_type(&self, ty: &TypeDescriptor) -> Result<String, TranslateError> {
        let token = match classify(ty, self.registry)? {
            TypeCategory::UnsignedPrimitive(name) => name.to_string(),
            TypeCategory::VoidPointer => self.naming.opaque_ptr(),
            TypeCategory::KnownFunctionPointer(name) => self.naming.abi_type(name),
            TypeCategory::GenericContainer { container, element } => {
                self.naming.container_type(container, element)
            }
            TypeCategory::Direct(kind, name) => match kind {
                DirectKind::Void => "void".to_string(),
                DirectKind::Int => "int".to_string(),
                DirectKind::Float => "float".to_string(),
                DirectKind::Double => "double".to_string(),
                DirectKind::Byte => "unsigned char".to_string(),
                DirectKind::Bool | DirectKind::Enum => "int".to_string(),
                DirectKind::Struct => self.naming.abi_type(name),
                DirectKind::String => self.naming.abi_type("string"),
                DirectKind::Typealias => self.naming.opaque_ptr(),
            },
        };
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeclKind;

    fn registry() -> TypeRegistry {
        let mut r = TypeRegistry::default();
        r.register("circle", DeclKind::Struct);
        r.register("key_code", DeclKind::Enum);
        r.register("bitmap", DeclKind::Typealias);
        r.register("key_callback", DeclKind::Typealias);
        r.function_pointers.insert("key_callback".to_string());
        r
    }

    fn map(ty: TypeDescriptor) -> Result<String, TranslateError> {
        let naming = Naming::default();
        let registry = registry();
        Translator::new(&naming, &registry).map_type(&ty)
    }

    #[test]
    fn direct_table() {
        let cases = [
            ("void", "void"),
            ("int", "int"),
            ("float", "float"),
            ("double", "double"),
            ("byte", "unsigned char"),
            ("bool", "int"),
            ("key_code", "int"),
            ("circle", "__sklib_circle"),
            ("string", "__sklib_string"),
            ("bitmap", "__sklib_ptr"),
        ];
        for (name, expected) in cases {
            assert_eq!(map(TypeDescriptor::named(name)).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn structural_shapes() {
        assert_eq!(
            map(TypeDescriptor::named("unsigned short")).unwrap(),
            "unsigned short"
        );
        assert_eq!(
            map(TypeDescriptor::named("key_callback")).unwrap(),
            "__sklib_key_callback"
        );
        let vec = TypeDescriptor {
            type_p: Some("string".to_string()),
            ..TypeDescriptor::named("vector")
        };
        assert_eq!(map(vec).unwrap(), "__sklib_vector_string");
    }

    #[test]
    fn void_pointer_is_opaque_not_namespaced_void() {
        let ty = TypeDescriptor {
            is_pointer: true,
            ..TypeDescriptor::void()
        };
        assert_eq!(map(ty).unwrap(), "__sklib_ptr");
    }

    #[test]
    fn modifiers_do_not_change_the_token() {
        let ty = TypeDescriptor {
            is_pointer: true,
            is_const: true,
            is_array: true,
            array_dimension_sizes: vec![4],
            ..TypeDescriptor::named("circle")
        };
        assert_eq!(map(ty).unwrap(), "__sklib_circle");
    }

    #[test]
    fn every_accepted_name_maps_to_a_non_empty_token() {
        for name in [
            "void", "int", "float", "double", "byte", "bool", "string", "circle", "key_code",
            "bitmap", "key_callback", "unsigned int",
        ] {
            let token = map(TypeDescriptor::named(name)).unwrap();
            assert!(!token.is_empty(), "{name}");
        }
    }

    #[test]
    fn unknown_type_fails_with_its_name() {
        let err = map(TypeDescriptor::named("quaternion")).unwrap_err();
        assert_eq!(err, TranslateError::UnmappedType("quaternion".to_string()));
        assert!(err.to_string().contains("`quaternion`"));
    }
}
