//! Adapter names — the conversion functions between native values and
//! their flat library representation.
//!
//! Both directions share the `__skadapter__to_` prefix and are told apart
//! by the token (and, in the generated C++, by overloading on the argument
//! type).

use crate::classify::is_unsigned_prefixed;
use crate::config::strip_leading_underscores;
use crate::error::TranslateError;
use crate::mangle::underscored;
use crate::mapper::Translator;
use crate::model::TypeDescriptor;

impl Translator<'_> {
    /// Token naming the native type a library value converts *to*.
    pub fn native_token(&self, ty: &TypeDescriptor) -> String {
        if ty.is_void_pointer() {
            self.naming.opaque_ptr_token()
        } else if is_unsigned_prefixed(&ty.ty) {
            underscored(&ty.ty)
        } else if ty.ty == "byte" {
            "unsigned_char".to_string()
        } else if let Some(element) = &ty.type_p {
            format!("{}_{element}", ty.ty)
        } else {
            ty.ty.clone()
        }
    }

    /// Token naming the library type a native value converts *to*.
    pub fn lib_token(&self, ty: &TypeDescriptor) -> Result<String, TranslateError> {
        let token = self.map_type(ty)?;
        Ok(underscored(strip_leading_underscores(&token)))
    }

    /// library → native, e.g. `__skadapter__to_circle`.
    pub fn native_adapter(&self, ty: &TypeDescriptor) -> String {
        self.naming.adapter(&self.native_token(ty))
    }

    /// native → library, e.g. `__skadapter__to_sklib_circle`.
    pub fn lib_adapter(&self, ty: &TypeDescriptor) -> Result<String, TranslateError> {
        Ok(self.naming.adapter(&self.lib_token(ty)?))
    }
}
