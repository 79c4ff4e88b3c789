//! Native C++-runtime back-end (component G, the other leg of the ×2
//! back-ends). Kernels are plain C functions invoked through the runtime's
//! FFI bridge rather than RenderScript `__attribute__((kernel))` entries.

pub mod array;
pub mod bitmap;
pub mod hdr;

use dualforge_core::catalog::{AccessorKind, Catalog, CatalogMethod};
use dualforge_core::error::CompilationException;
use dualforge_core::ir::MethodCall;
use dualforge_core::types::Location;

use crate::dispatch::BackEndTranslator;

pub struct NativeTranslator;

impl BackEndTranslator for NativeTranslator {
    fn translate_method_call(
        &self,
        call: &MethodCall,
        catalog: &Catalog,
        at: Location,
    ) -> Result<String, CompilationException> {
        let unsupported = || CompilationException::UnsupportedMethod {
            type_name: call.variable.type_name.clone(),
            method: call.method_name.clone(),
            back_end: "Native".to_string(),
            at: at.clone(),
        };
        let CatalogMethod::Accessor(kind) = catalog
            .valid_method(&call.variable.type_name, &call.method_name)
            .ok_or_else(unsupported)?
        else {
            return Err(unsupported());
        };
        Ok(match kind {
            AccessorKind::Width => format!("{}->width()", call.variable.name),
            AccessorKind::Height => format!("{}->height()", call.variable.name),
            AccessorKind::Length => format!("{}->size()", call.variable.name),
            AccessorKind::Value => call.variable.name.clone(),
        })
    }
}

/// Shared FFI declaration line for the generated header each kernel file
/// exports to the C++ runtime (spec.md §6).
pub fn ffi_export(fn_name: &str) -> String {
    format!("extern \"C\" void {fn_name}(void* data, size_t count);\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualforge_core::ir::{Variable, VariableModifier};

    fn call(type_name: &str, method: &str) -> MethodCall {
        MethodCall {
            variable: Variable {
                name: "img".into(),
                type_name: type_name.into(),
                type_parameter: None,
                modifier: VariableModifier::Final,
                identifier: 0,
            },
            method_name: method.into(),
            expression_range: dualforge_core::types::TokenAddress::new(0, 1, 1, 1),
        }
    }

    #[test]
    fn length_translates_to_size_call() {
        let catalog = Catalog::standard();
        let translator = NativeTranslator;
        let out = translator
            .translate_method_call(&call("Array", "length"), &catalog, Location::new("F.java", 1, 1))
            .unwrap();
        assert_eq!(out, "img->size()");
    }

    #[test]
    fn unrecognized_method_is_unsupported() {
        let catalog = Catalog::standard();
        let translator = NativeTranslator;
        let err = translator
            .translate_method_call(&call("Array", "sort"), &catalog, Location::new("F.java", 1, 1))
            .unwrap_err();
        assert!(matches!(err, CompilationException::UnsupportedMethod { .. }));
    }

    #[test]
    fn ffi_export_declares_extern_c() {
        assert!(ffi_export("function1").starts_with("extern \"C\""));
    }
}
