//! Documentation tree — the description grouped for the website, with
//! per-target signatures attached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::decl::native_signature;
use crate::error::TranslateError;
use crate::mapper::Translator;
use crate::model::{ApiDescription, EnumDef, FunctionDef};

/// A language a signature can be rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The native C++ API.
    Cpp,
    /// The flat C library.
    Clib,
}

impl Target {
    pub fn name(&self) -> &'static str {
        match self {
            Target::Cpp => "cpp",
            Target::Clib => "clib",
        }
    }

    pub fn function_signature(
        &self,
        tr: &Translator<'_>,
        function: &FunctionDef,
    ) -> Result<String, TranslateError> {
        match self {
            Target::Cpp => Ok(native_signature(function)),
            Target::Clib => tr.signature(function),
        }
    }

    /// Enum declaration, for targets that have one. The C library passes
    /// enums as `int`.
    pub fn enum_signature(&self, en: &EnumDef) -> Option<String> {
        match self {
            Target::Cpp => {
                let constants: Vec<String> = en
                    .constants
                    .iter()
                    .map(|c| match c.details.number {
                        Some(n) => format!("    {} = {n}", c.name),
                        None => format!("    {}", c.name),
                    })
                    .collect();
                Some(format!(
                    "enum {}\n{{\n{}\n}};",
                    en.name,
                    constants.join(",\n")
                ))
            }
            Target::Clib => None,
        }
    }
}

/// One group of the documentation tree.
#[derive(Debug, Default, Serialize)]
pub struct DocGroup {
    pub brief: String,
    pub description: String,
    pub functions: Vec<Value>,
    pub typedefs: Vec<Value>,
    pub structs: Vec<Value>,
    pub enums: Vec<Value>,
    pub defines: Vec<Value>,
}

/// Group headers by their `group` (the entry name when absent), sorted by
/// group name, with signatures attached for every target in `targets`.
pub fn grouped(
    desc: &ApiDescription,
    tr: &Translator<'_>,
    targets: &[Target],
) -> anyhow::Result<BTreeMap<String, DocGroup>> {
    let mut groups: BTreeMap<String, DocGroup> = BTreeMap::new();

    for (key, header) in &desc.headers {
        let group_key = header.group.clone().unwrap_or_else(|| key.clone());
        let group = groups.entry(group_key).or_default();

        group.brief.push_str(&header.brief);
        group.description.push_str(&header.description);

        for f in &header.functions {
            let mut value = serde_json::to_value(f)?;
            let signatures = function_signatures(tr, f, targets)
                .map_err(|e| anyhow::anyhow!("{e} (in function `{}`)", f.name))?;
            insert(&mut value, "signatures", Value::Object(signatures));
            group.functions.push(value);
        }
        for en in &header.enums {
            let mut value = serde_json::to_value(en)?;
            let signatures: Map<String, Value> = targets
                .iter()
                .filter_map(|t| {
                    let signature = t.enum_signature(en)?;
                    Some((t.name().to_string(), Value::String(signature)))
                })
                .collect();
            insert(&mut value, "signatures", Value::Object(signatures));
            group.enums.push(value);
        }
        for td in &header.typedefs {
            group.typedefs.push(serde_json::to_value(td)?);
        }
        for s in &header.structs {
            group.structs.push(serde_json::to_value(s)?);
        }
        group.defines.extend(header.defines.iter().cloned());
    }

    debug!(groups = groups.len(), "grouped documentation");
    Ok(groups)
}

/// The grouped tree as pretty-printed JSON.
pub fn render(
    desc: &ApiDescription,
    tr: &Translator<'_>,
    targets: &[Target],
) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&grouped(desc, tr, targets)?)?)
}

fn function_signatures(
    tr: &Translator<'_>,
    function: &FunctionDef,
    targets: &[Target],
) -> Result<Map<String, Value>, TranslateError> {
    targets
        .iter()
        .map(|t| {
            let signature = t.function_signature(tr, function)?;
            Ok((t.name().to_string(), Value::String(signature)))
        })
        .collect::<Result<Map<_, _>, TranslateError>>()
}

fn insert(value: &mut Value, key: &str, entry: Value) {
    if let Value::Object(map) = value {
        map.insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Naming;
    use crate::model::TypeRegistry;

    fn description() -> ApiDescription {
        serde_json::from_str(
            r#"{
                "circle_drawing": {
                    "group": "graphics",
                    "brief": "Circles. ",
                    "functions": [
                        {
                            "name": "move_circle",
                            "parameters": {
                                "circle": { "type": "circle", "is_reference": true },
                                "dx": { "type": "float" }
                            }
                        }
                    ],
                    "structs": [ { "name": "circle", "fields": { "radius": { "type": "float" } } } ]
                },
                "colors": {
                    "group": "graphics",
                    "brief": "Colors.",
                    "enums": [
                        { "name": "palette", "constants": { "RED": { "number": 0 }, "BLUE": {} } }
                    ],
                    "defines": [ { "name": "MAX_COLORS" } ]
                },
                "input": {
                    "typedefs": [ { "name": "key_callback", "is_function_pointer": true } ]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn groups_fold_and_sort() {
        let desc = description();
        let naming = Naming::default();
        let registry = TypeRegistry::from_description(&desc, &[]);
        let tr = Translator::new(&naming, &registry);

        let groups = grouped(&desc, &tr, &[Target::Cpp, Target::Clib]).unwrap();
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, ["graphics", "input"]);

        let graphics = &groups["graphics"];
        assert_eq!(graphics.brief, "Circles. Colors.");
        assert_eq!(graphics.functions.len(), 1);
        assert_eq!(graphics.structs.len(), 1);
        assert_eq!(graphics.defines.len(), 1);
        assert_eq!(groups["input"].typedefs.len(), 1);
    }

    #[test]
    fn function_signatures_per_target() {
        let desc = description();
        let naming = Naming::default();
        let registry = TypeRegistry::from_description(&desc, &[]);
        let tr = Translator::new(&naming, &registry);

        let groups = grouped(&desc, &tr, &[Target::Cpp, Target::Clib]).unwrap();
        let signatures = &groups["graphics"].functions[0]["signatures"];
        assert_eq!(signatures["cpp"], "void move_circle(circle &circle, float dx)");
        assert_eq!(
            signatures["clib"],
            "void __sklib__move_circle__circle_ref__float(__sklib_circle *circle, float dx)"
        );
    }

    #[test]
    fn enum_signatures_only_for_supporting_targets() {
        let desc = description();
        let naming = Naming::default();
        let registry = TypeRegistry::from_description(&desc, &[]);
        let tr = Translator::new(&naming, &registry);

        let groups = grouped(&desc, &tr, &[Target::Cpp, Target::Clib]).unwrap();
        let signatures = groups["graphics"].enums[0]["signatures"].as_object().unwrap();
        assert_eq!(signatures.len(), 1);
        assert_eq!(
            signatures["cpp"],
            "enum palette\n{\n    RED = 0,\n    BLUE\n};"
        );
    }

    #[test]
    fn unmapped_type_names_the_function() {
        let desc: ApiDescription = serde_json::from_str(
            r#"{ "h": { "functions": [ { "name": "spin", "parameters": { "q": { "type": "quaternion" } } } ] } }"#,
        )
        .unwrap();
        let naming = Naming::default();
        let registry = TypeRegistry::from_description(&desc, &[]);
        let tr = Translator::new(&naming, &registry);

        // The native target never validates types.
        assert!(grouped(&desc, &tr, &[Target::Cpp]).is_ok());

        let err = grouped(&desc, &tr, &[Target::Clib]).unwrap_err().to_string();
        assert!(err.contains("quaternion"), "{err}");
        assert!(err.contains("spin"), "{err}");
    }

    #[test]
    fn render_is_pretty_json() {
        let desc = description();
        let naming = Naming::default();
        let registry = TypeRegistry::from_description(&desc, &[]);
        let tr = Translator::new(&naming, &registry);

        let text = render(&desc, &tr, &[Target::Clib]).unwrap();
        assert!(text.starts_with("{\n  \"graphics\": {"));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["input"]["brief"], "");
    }
}
