//! Symbol mangling.
//!
//! ```text
//! my_function(int p1, float p2)  =>  __sklib__my_function__int__float
//! ```
//!
//! Parameter tokens use the *declared* type name, not the ABI token, so
//! exported symbols stay stable when the ABI mapping changes. Return type
//! and parameter names never take part.

use crate::config::Naming;
use crate::mapper::Translator;
use crate::model::{FunctionDef, TypeDescriptor};

/// Ordered name tokens of the mangled symbol: the root followed by one
/// token per parameter.
pub fn mangle_tokens(naming: &Naming, function: &FunctionDef) -> Vec<String> {
    std::iter::once(naming.symbol_root(&function.name))
        .chain(function.parameters.iter().map(|p| parameter_token(&p.ty)))
        .collect()
}

/// Join the tokens of [`mangle_tokens`].
pub fn mangle(naming: &Naming, function: &FunctionDef) -> String {
    mangle_tokens(naming, function).join("__")
}

fn parameter_token(ty: &TypeDescriptor) -> String {
    let mut token = underscored(&ty.ty);
    if ty.is_reference {
        token.push_str("_ref");
    }
    if ty.is_pointer {
        token.push_str("_ptr");
    }
    if ty.is_array {
        token.push_str("_array");
    }
    token
}

/// Replace every whitespace character with `_` (`unsigned int` → `unsigned_int`).
pub(crate) fn underscored(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

impl Translator<'_> {
    pub fn mangle(&self, function: &FunctionDef) -> String {
        mangle(self.naming, function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamDef;

    fn param(name: &str, ty: TypeDescriptor) -> ParamDef {
        ParamDef {
            name: name.to_string(),
            ty,
        }
    }

    fn function(name: &str, params: Vec<ParamDef>) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            parameters: params,
            return_type: TypeDescriptor::void(),
            extra: Default::default(),
        }
    }

    fn move_circle() -> FunctionDef {
        function(
            "move_circle",
            vec![
                param(
                    "circle",
                    TypeDescriptor {
                        is_reference: true,
                        ..TypeDescriptor::named("circle")
                    },
                ),
                param("dx", TypeDescriptor::named("float")),
            ],
        )
    }

    #[test]
    fn move_circle_symbol() {
        let naming = Naming::default();
        assert_eq!(
            mangle(&naming, &move_circle()),
            "__sklib__move_circle__circle_ref__float"
        );
    }

    #[test]
    fn tokens_follow_parameter_order() {
        let naming = Naming::default();
        assert_eq!(
            mangle_tokens(&naming, &move_circle()),
            ["__sklib__move_circle", "circle_ref", "float"]
        );
        assert_eq!(
            mangle_tokens(&naming, &function("clear", vec![])),
            ["__sklib__clear"]
        );
    }

    #[test]
    fn suffixes_are_ref_ptr_array_in_that_order() {
        let naming = Naming::default();
        let f = function(
            "fill",
            vec![
                param(
                    "values",
                    TypeDescriptor {
                        is_reference: true,
                        is_pointer: true,
                        is_array: true,
                        array_dimension_sizes: vec![2],
                        ..TypeDescriptor::named("unsigned int")
                    },
                ),
            ],
        );
        assert_eq!(mangle(&naming, &f), "__sklib__fill__unsigned_int_ref_ptr_array");
    }

    #[test]
    fn parameter_names_and_return_type_are_ignored() {
        let naming = Naming::default();
        let mut renamed = move_circle();
        renamed.parameters[0].name = "c".to_string();
        renamed.parameters[1].name = "amount".to_string();
        renamed.return_type = TypeDescriptor::named("bool");
        assert_eq!(mangle(&naming, &renamed), mangle(&naming, &move_circle()));
    }

    #[test]
    fn overloads_mangle_apart() {
        let naming = Naming::default();
        let by_value = function("draw", vec![param("c", TypeDescriptor::named("circle"))]);
        let by_ref = function(
            "draw",
            vec![param(
                "c",
                TypeDescriptor {
                    is_reference: true,
                    ..TypeDescriptor::named("circle")
                },
            )],
        );
        let swapped = function(
            "draw",
            vec![
                param("a", TypeDescriptor::named("int")),
                param("b", TypeDescriptor::named("float")),
            ],
        );
        let original = function(
            "draw",
            vec![
                param("a", TypeDescriptor::named("float")),
                param("b", TypeDescriptor::named("int")),
            ],
        );
        assert_ne!(mangle(&naming, &by_value), mangle(&naming, &by_ref));
        assert_ne!(mangle(&naming, &swapped), mangle(&naming, &original));
    }

    #[test]
    fn const_does_not_take_part() {
        let naming = Naming::default();
        let plain = function("f", vec![param("x", TypeDescriptor::named("int"))]);
        let constant = function(
            "f",
            vec![param(
                "x",
                TypeDescriptor {
                    is_const: true,
                    ..TypeDescriptor::named("int")
                },
            )],
        );
        assert_eq!(mangle(&naming, &plain), mangle(&naming, &constant));
    }
}
