//! RenderScript-dialect back-end (component G, one leg of the ×2 back-ends).
//!
//! Kernels use the back-end's `__attribute__((kernel))` convention and the
//! vector types `uchar4`, `float3`, `float4` (spec.md §6 kernel-file format).

pub mod array;
pub mod bitmap;
pub mod hdr;

use dualforge_core::catalog::{AccessorKind, Catalog, CatalogMethod};
use dualforge_core::error::CompilationException;
use dualforge_core::ir::MethodCall;
use dualforge_core::types::Location;

use crate::dispatch::BackEndTranslator;

pub struct RenderScriptTranslator;

impl BackEndTranslator for RenderScriptTranslator {
    fn translate_method_call(
        &self,
        call: &MethodCall,
        catalog: &Catalog,
        at: Location,
    ) -> Result<String, CompilationException> {
        let unsupported = || CompilationException::UnsupportedMethod {
            type_name: call.variable.type_name.clone(),
            method: call.method_name.clone(),
            back_end: "RenderScript".to_string(),
            at: at.clone(),
        };
        let CatalogMethod::Accessor(kind) = catalog
            .valid_method(&call.variable.type_name, &call.method_name)
            .ok_or_else(unsupported)?
        else {
            return Err(unsupported());
        };
        Ok(match kind {
            AccessorKind::Width => format!("{}_alloc.getType().getX()", call.variable.name),
            AccessorKind::Height => format!("{}_alloc.getType().getY()", call.variable.name),
            AccessorKind::Length => format!("{}_alloc.getType().getX()", call.variable.name),
            AccessorKind::Value => call.variable.name.clone(),
        })
    }
}

/// `#pragma version(1)` / `#pragma rs java_package_name(P)` preamble, shared
/// by every generated `.rs` kernel file (spec.md §6).
pub fn kernel_file_header(package: &str) -> String {
    format!("#pragma version(1)\n#pragma rs java_package_name({package})\n\n")
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
    fn width_translates_to_allocation_dimension() {
        let catalog = Catalog::standard();
        let translator = RenderScriptTranslator;
        let out = translator
            .translate_method_call(&call("BitmapImage", "width"), &catalog, Location::new("F.java", 1, 1))
            .unwrap();
        assert_eq!(out, "img_alloc.getType().getX()");
    }

    #[test]
    fn unrecognized_method_is_unsupported() {
        let catalog = Catalog::standard();
        let translator = RenderScriptTranslator;
        let err = translator
            .translate_method_call(&call("BitmapImage", "rotate"), &catalog, Location::new("F.java", 1, 1))
            .unwrap_err();
        assert!(matches!(err, CompilationException::UnsupportedMethod { .. }));
    }

    #[test]
    fn kernel_file_header_carries_package_pragma() {
        let header = kernel_file_header("com.example");
        assert!(header.starts_with("#pragma version(1)\n"));
        assert!(header.contains("com.example"));
    }
}
