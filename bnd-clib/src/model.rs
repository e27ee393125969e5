//! Intermediate model types — the API description consumed by the translator.
//!
//! These types mirror the JSON document produced by the upstream header
//! parser. Ordered collections (parameters, struct fields, enum constants)
//! arrive as JSON objects whose key order is significant, so they are read
//! into `Vec`s through [`named`] rather than into maps.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A type as written on a parameter, field or return value, together with
/// its modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    pub ty: String,
    /// Element type of a single-parameter generic container (`vector<T>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_p: Option<String>,
    #[serde(default)]
    pub is_pointer: bool,
    #[serde(default)]
    pub is_reference: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub array_dimension_sizes: Vec<usize>,
    /// Documentation keys carried through to the docs output untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TypeDescriptor {
    /// A plain value of the named type, without modifiers.
    pub fn named(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn void() -> Self {
        Self::named("void")
    }

    /// True for `void` itself — not `void *`.
    pub fn is_void(&self) -> bool {
        self.ty == "void" && !self.is_pointer
    }

    pub fn is_void_pointer(&self) -> bool {
        self.ty == "void" && self.is_pointer
    }

    /// The same type with the array modifier removed, i.e. the element type
    /// of an array field.
    pub fn element(&self) -> Self {
        Self {
            is_array: false,
            array_dimension_sizes: Vec::new(),
            ..self.clone()
        }
    }
}

/// An entry of an ordered `name → value` JSON object.
pub trait NamedEntry {
    type Value;
    fn from_entry(name: String, value: Self::Value) -> Self;
    fn entry(&self) -> (&str, &Self::Value);
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl NamedEntry for ParamDef {
    type Value = TypeDescriptor;
    fn from_entry(name: String, ty: TypeDescriptor) -> Self {
        Self { name, ty }
    }
    fn entry(&self) -> (&str, &TypeDescriptor) {
        (&self.name, &self.ty)
    }
}

/// A single struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl NamedEntry for FieldDef {
    type Value = TypeDescriptor;
    fn from_entry(name: String, ty: TypeDescriptor) -> Self {
        Self { name, ty }
    }
    fn entry(&self) -> (&str, &TypeDescriptor) {
        (&self.name, &self.ty)
    }
}

/// A function declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default, with = "named")]
    pub parameters: Vec<ParamDef>,
    #[serde(rename = "return", default = "TypeDescriptor::void")]
    pub return_type: TypeDescriptor,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A struct definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,
    #[serde(default, with = "named")]
    pub fields: Vec<FieldDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An enum definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default, with = "named")]
    pub constants: Vec<EnumConstant>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single enum constant.
#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub details: ConstantDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstantDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NamedEntry for EnumConstant {
    type Value = ConstantDetails;
    fn from_entry(name: String, details: ConstantDetails) -> Self {
        Self { name, details }
    }
    fn entry(&self) -> (&str, &ConstantDetails) {
        (&self.name, &self.details)
    }
}

/// A typedef. Function-pointer typedefs may carry their own signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedefDef {
    pub name: String,
    #[serde(default)]
    pub is_function_pointer: bool,
    #[serde(default, with = "named", skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParamDef>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeDescriptor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the description — usually everything declared by one
/// source header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub brief: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
    #[serde(default)]
    pub typedefs: Vec<TypedefDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    /// Opaque to translation; passed through to the docs output.
    #[serde(default)]
    pub defines: Vec<Value>,
}

/// The whole API description: entry name → header record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ApiDescription {
    pub headers: BTreeMap<String, Header>,
}

impl ApiDescription {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.headers.values().flat_map(|h| h.functions.iter())
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.headers.values().flat_map(|h| h.structs.iter())
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.headers.values().flat_map(|h| h.enums.iter())
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &TypedefDef> {
        self.headers.values().flat_map(|h| h.typedefs.iter())
    }
}

/// Load and parse a JSON API description.
pub fn load_description(path: &Path) -> anyhow::Result<ApiDescription> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read description {}: {}", path.display(), e))?;
    let desc: ApiDescription = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse description {}: {}", path.display(), e))?;
    Ok(desc)
}

/// What a declared (non-primitive) type name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Struct,
    Enum,
    Typealias,
}

/// Global type registry — what every declared name is, and which typedefs
/// are function pointers.
///
/// Built once from the description and then only read.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Maps declared type name → kind.
    pub types: HashMap<String, DeclKind>,
    /// Typedef names treated as opaque function-pointer types.
    pub function_pointers: HashSet<String>,
}

impl TypeRegistry {
    /// Build the registry from a description, adding `extra_function_pointers`
    /// to the typedefs flagged `is_function_pointer`.
    pub fn from_description(desc: &ApiDescription, extra_function_pointers: &[String]) -> Self {
        let mut registry = Self::default();
        for s in desc.structs() {
            registry.register(&s.name, DeclKind::Struct);
        }
        for e in desc.enums() {
            registry.register(&e.name, DeclKind::Enum);
        }
        for td in desc.typedefs() {
            registry.register(&td.name, DeclKind::Typealias);
            if td.is_function_pointer {
                registry.function_pointers.insert(td.name.clone());
            }
        }
        registry
            .function_pointers
            .extend(extra_function_pointers.iter().cloned());
        registry
    }

    pub fn register(&mut self, name: &str, kind: DeclKind) {
        self.types.insert(name.to_string(), kind);
    }

    pub fn kind_of(&self, name: &str) -> Option<DeclKind> {
        self.types.get(name).copied()
    }

    pub fn is_function_pointer(&self, name: &str) -> bool {
        self.function_pointers.contains(name)
    }
}

/// Serde adapter for ordered `name → value` JSON objects read into a `Vec`.
pub mod named {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::NamedEntry;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: NamedEntry,
        T::Value: Deserialize<'de>,
    {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for EntriesVisitor<T>
        where
            T: NamedEntry,
            T::Value: Deserialize<'de>,
        {
            type Value = Vec<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping names to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<T>, A::Error> {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, T::Value>()? {
                    out.push(T::from_entry(name, value));
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, T>(entries: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: NamedEntry,
        T::Value: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for entry in entries {
            let (name, value) = entry.entry();
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_keep_document_order() {
        let f: FunctionDef = serde_json::from_str(
            r#"{
                "name": "draw",
                "parameters": {
                    "zeta": { "type": "float" },
                    "alpha": { "type": "circle", "is_reference": true, "description": "shape" }
                }
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = f.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert!(f.parameters[1].ty.is_reference);
        assert_eq!(f.parameters[1].ty.extra["description"], "shape");
        assert!(f.return_type.is_void());
    }

    #[test]
    fn function_serializes_parameters_as_object() {
        let f: FunctionDef = serde_json::from_str(
            r#"{ "name": "f", "brief": "b", "parameters": { "x": { "type": "int" } } }"#,
        )
        .unwrap();
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["parameters"]["x"]["type"], "int");
        assert_eq!(v["brief"], "b");
        assert_eq!(v["return"]["type"], "void");
    }

    #[test]
    fn registry_collects_kinds_and_function_pointers() {
        let desc: ApiDescription = serde_json::from_str(
            r#"{
                "geometry": {
                    "structs": [ { "name": "circle", "fields": {} } ],
                    "enums": [ { "name": "key_code", "constants": { "A": { "number": 1 } } } ],
                    "typedefs": [
                        { "name": "bitmap" },
                        { "name": "key_callback", "is_function_pointer": true }
                    ]
                }
            }"#,
        )
        .unwrap();
        let registry = TypeRegistry::from_description(&desc, &["extra_fn".to_string()]);

        assert_eq!(registry.kind_of("circle"), Some(DeclKind::Struct));
        assert_eq!(registry.kind_of("key_code"), Some(DeclKind::Enum));
        assert_eq!(registry.kind_of("bitmap"), Some(DeclKind::Typealias));
        assert_eq!(registry.kind_of("float"), None);
        assert!(registry.is_function_pointer("key_callback"));
        assert!(registry.is_function_pointer("extra_fn"));
        assert!(!registry.is_function_pointer("bitmap"));
    }
}
