//! Per-class kernel file assembly and the one native build-script artifact
//! (spec.md §6 outputs).
//!
//! RenderScript: one `.rs` file per class, preamble followed by every
//! generated kernel concatenated in discovery order. Native: one `.cpp`
//! translation unit per class, plus a single `Android.mk` per compilation
//! enumerating all of them.

use dualforge_core::catalog::Catalog;
use dualforge_core::error::CompilationException;
use dualforge_core::ir::Operation;
use dualforge_core::naming::{self, kernel_function_name, BackEnd};

use crate::dispatch::emit_kernel;
use crate::renderscript::kernel_file_header;

/// Concatenate every operation's kernel for one class into a single
/// RenderScript source file, in discovery order (spec.md §6 first bullet).
pub fn emit_renderscript_file(
    package: &str,
    operations: &[Operation],
    catalog: &Catalog,
) -> Result<String, CompilationException> {
    let mut kernels = Vec::with_capacity(operations.len());
    for (op, fn_name) in operations.iter().zip((1..).map(kernel_function_name)) {
        kernels.push(emit_kernel(op, &fn_name, BackEnd::RenderScript, catalog, op_location(op))?);
    }
    Ok(format!("{}{}", kernel_file_header(package), naming::aggregate(&kernels, "\n")))
}

/// One native translation unit per class: every operation's kernel plus the
/// FFI export line [`crate::native::ffi_export`] names for the host bridge.
pub fn emit_native_translation_unit(
    class_name: &str,
    operations: &[Operation],
    catalog: &Catalog,
) -> Result<String, CompilationException> {
    let mut body = vec![format!("#include \"{class_name}.h\"\n")];
    for (op, fn_name) in operations.iter().zip((1..).map(kernel_function_name)) {
        body.push(crate::native::ffi_export(&fn_name));
        body.push(emit_kernel(op, &fn_name, BackEnd::Native, catalog, op_location(op))?);
    }
    Ok(naming::aggregate(&body, "\n"))
}

fn op_location(op: &Operation) -> dualforge_core::types::Location {
    dualforge_core::types::Location::new("", op.statement_range.line, op.statement_range.col)
}

/// Enumerate every generated native translation unit in a single
/// `Android.mk` (spec.md §6 second bullet: "once per compilation").
pub fn emit_android_mk(translation_units: &[String]) -> String {
    let sources = translation_units
        .iter()
        .map(|name| format!("    {name}"))
        .collect::<Vec<_>>()
        .join(" \\\n");
    format!(
        "LOCAL_PATH := $(call my-dir)\n\
         include $(CLEAR_VARS)\n\
         LOCAL_MODULE := dualforge_native\n\
         LOCAL_SRC_FILES := \\\n{sources}\n\
         include $(BUILD_SHARED_LIBRARY)\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualforge_core::ir::{Execution, OperationKind, UserFunction, Variable, VariableModifier};
    use dualforge_core::types::TokenAddress;

    fn sample_op() -> Operation {
        Operation {
            variable: Variable {
                name: "img".into(),
                type_name: "BitmapImage".into(),
                type_parameter: None,
                modifier: VariableModifier::Final,
                identifier: 0,
            },
            kind: OperationKind::Foreach,
            user_function: UserFunction {
                code: "pixel.rgba.red = pixel.rgba.red * k;".into(),
                variable_argument: Variable {
                    name: "pixel".into(),
                    type_name: "Pixel".into(),
                    type_parameter: None,
                    modifier: VariableModifier::Final,
                    identifier: 0,
                },
            },
            external_variables: vec![Variable {
                name: "k".into(),
                type_name: "float".into(),
                type_parameter: None,
                modifier: VariableModifier::Final,
                identifier: 0,
            }],
            statement_range: TokenAddress::new(0, 0, 1, 1),
            execution: Execution::Parallel,
        }
    }

    #[test]
    fn renderscript_file_starts_with_pragma_preamble() {
        let catalog = Catalog::standard();
        let out = emit_renderscript_file("com.example", &[sample_op()], &catalog).unwrap();
        assert!(out.starts_with("#pragma version(1)\n"));
        assert!(out.contains("function1"));
    }

    #[test]
    fn renderscript_file_concatenates_kernels_in_discovery_order() {
        let catalog = Catalog::standard();
        let mut second = sample_op();
        second.kind = OperationKind::Map;
        let out = emit_renderscript_file("com.example", &[sample_op(), second], &catalog).unwrap();
        let first_pos = out.find("function1_user").unwrap();
        let second_pos = out.find("function2_user").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn native_translation_unit_includes_ffi_export_per_kernel() {
        let catalog = Catalog::standard();
        let out = emit_native_translation_unit("Blur", &[sample_op()], &catalog).unwrap();
        assert!(out.contains("extern \"C\""));
        assert!(out.contains("#include \"Blur.h\""));
    }

    #[test]
    fn android_mk_enumerates_every_translation_unit() {
        let mk = emit_android_mk(&["Blur.cpp".to_string(), "Sharpen.cpp".to_string()]);
        assert!(mk.contains("Blur.cpp"));
        assert!(mk.contains("Sharpen.cpp"));
        assert!(mk.contains("BUILD_SHARED_LIBRARY"));
    }
}
