//! Declaration builders — C text fragments for parameter lists, exported
//! signatures and struct fields.

use crate::array::flatten;
use crate::error::TranslateError;
use crate::mangle::underscored;
use crate::mapper::Translator;
use crate::model::{FieldDef, FunctionDef, ParamDef, TypeDescriptor};

impl Translator<'_> {
    /// `const __sklib_circle *c, float dx`.
    ///
    /// References become pointers; C has no reference type.
    pub fn parameter_list(&self, params: &[ParamDef]) -> Result<String, TranslateError> {
        let rendered = params
            .iter()
            .map(|p| self.parameter(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(", "))
    }

    fn parameter(&self, param: &ParamDef) -> Result<String, TranslateError> {
        let ty = self.map_type(&param.ty)?;
        let konst = if param.ty.is_const { "const " } else { "" };
        let star = if param.ty.is_pointer || param.ty.is_reference {
            "*"
        } else {
            ""
        };
        Ok(format!("{konst}{ty} {star}{}", param.name))
    }

    /// The exported declaration, `void __sklib__f__int(int x)`.
    pub fn signature(&self, function: &FunctionDef) -> Result<String, TranslateError> {
        let return_type = self.map_type(&function.return_type)?;
        let name = self.mangle(function);
        let params = self.parameter_list(&function.parameters)?;
        Ok(format!("{return_type} {name}({params})"))
    }

    /// A field of the flat struct. Multi-dimensional arrays collapse to one
    /// dimension.
    pub fn struct_field(&self, field: &FieldDef) -> String {
        let ty = &field.ty;
        if ty.is_void_pointer() {
            return format!("{} {}", self.naming.opaque_ptr(), field.name);
        }
        let star = if ty.is_pointer { "*" } else { "" };
        let array = if ty.is_array {
            format!("[{}]", flatten(&ty.array_dimension_sizes))
        } else {
            String::new()
        };
        format!("{} {star}{}{array}", self.field_type(ty), field.name)
    }

    /// The type name a struct field is declared with. Containers use the
    /// same token as signatures, everything else `__sklib_<type>`.
    pub fn field_type(&self, ty: &TypeDescriptor) -> String {
        match &ty.type_p {
            Some(element) if ty.ty == "vector" => self.naming.container_type(&ty.ty, element),
            _ => self.naming.abi_type(&underscored(&ty.ty)),
        }
    }
}

/// The declaration as the native C++ API spells it,
/// `void move_circle(circle &c, float dx)`.
pub fn native_signature(function: &FunctionDef) -> String {
    let params = function
        .parameters
        .iter()
        .map(|p| {
            let konst = if p.ty.is_const { "const " } else { "" };
            format!("{konst}{} {}{}", native_type(&p.ty), modifier(&p.ty), p.name)
        })
        .collect::<Vec<_>>()
        .join(", ");
    let ret = &function.return_type;
    format!(
        "{}{} {}({params})",
        native_type(ret),
        modifier(ret).trim_end(),
        function.name
    )
}

fn native_type(ty: &TypeDescriptor) -> String {
    match &ty.type_p {
        Some(element) => format!("{}<{element}>", ty.ty),
        None => ty.ty.clone(),
    }
}

fn modifier(ty: &TypeDescriptor) -> &'static str {
    if ty.is_reference {
        "&"
    } else if ty.is_pointer {
        "*"
    } else {
        ""
    }
}
