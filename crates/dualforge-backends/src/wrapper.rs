//! Neutral wrapper interface/impl and runtime-selector generation
//! (component H steps 2–3, spec.md §4.H).
//!
//! One interface method per input bind, operation, output bind, and method
//! call (spec.md §4.H step 2); one implementation class per back-end with
//! bodies supplied by the emitters in [`crate::renderscript`] /
//! [`crate::native`] (step 3); plus the runtime-selector constructor that
//! picks the preferred back-end and falls back to the secondary one.

use dualforge_core::catalog::Catalog;
use dualforge_core::error::CompilationException;
use dualforge_core::ir::{InputBind, MethodCall, Operation, OperationsAndBinds, OutputBind};
use dualforge_core::naming::{
    self, input_helper_name, kernel_function_name, output_helper_name, wrapper_field_name,
    wrapper_impl_name, wrapper_interface_name, BackEnd,
};
use dualforge_core::types::Location;

use crate::dispatch::{base_type_of, bind_arguments_text, translator_for, DslBaseType};
use crate::{native, renderscript};

fn operation_params(op: &Operation) -> String {
    op.external_variables
        .iter()
        .map(|v| {
            if v.modifier.is_final() {
                format!(", {} {}", v.type_name, v.name)
            } else {
                format!(", {}[] {}", v.type_name, v.name)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn interface_method_for_input_bind(bind: &InputBind) -> String {
    let params = bind_arguments_text(&bind.arguments);
    format!("    void {}({params});\n", input_helper_name(&bind.variable.name))
}

fn interface_method_for_operation(op: &Operation, fn_name: &str) -> String {
    format!("    void {fn_name}(Object data{});\n", operation_params(op))
}

fn interface_method_for_output_bind(bind: &OutputBind) -> String {
    format!("    Object {}();\n", output_helper_name(&bind.variable.name))
}

fn interface_method_for_method_call(call: &MethodCall) -> String {
    format!("    Object {}();\n", call.method_name)
}

/// The sequence of `function<n>` names assigned to a class's operations, in
/// the same discovery order [`crate::kernel_file`] concatenates kernels in.
pub fn operation_function_names(ops_binds: &OperationsAndBinds) -> Vec<String> {
    (1..=ops_binds.operations.len() as u32).map(kernel_function_name).collect()
}

/// Emit the back-end-neutral interface: one method per input bind,
/// operation, output bind, and method call (spec.md §4.H step 2).
pub fn emit_wrapper_interface(
    class_name: &str,
    ops_binds: &OperationsAndBinds,
    method_calls: &[MethodCall],
) -> String {
    let mut methods = String::new();
    for bind in &ops_binds.input_binds {
        methods.push_str(&interface_method_for_input_bind(bind));
    }
    for (op, fn_name) in ops_binds.operations.iter().zip(operation_function_names(ops_binds)) {
        methods.push_str(&interface_method_for_operation(op, &fn_name));
    }
    for bind in &ops_binds.output_binds {
        methods.push_str(&interface_method_for_output_bind(bind));
    }
    for call in method_calls {
        methods.push_str(&interface_method_for_method_call(call));
    }
    naming::render(
        "interface {{name}} {\n{{methods}}}\n",
        &[("name", &wrapper_interface_name(class_name)), ("methods", &methods)],
    )
}

fn bind_error(back_end: BackEnd, type_name: &str, at: Location) -> CompilationException {
    CompilationException::UnsupportedMethod {
        type_name: type_name.to_string(),
        method: "bind".to_string(),
        back_end: format!("{back_end:?}"),
        at,
    }
}

fn emit_input_bind_body(
    back_end: BackEnd,
    bind: &InputBind,
    catalog: &Catalog,
) -> Result<String, CompilationException> {
    let loc = Location::new("", bind.decl_range.line, bind.decl_range.col);
    let base = base_type_of(&bind.variable.type_name).ok_or_else(|| bind_error(back_end, &bind.variable.type_name, loc))?;
    Ok(match (back_end, base) {
        (BackEnd::RenderScript, DslBaseType::Bitmap) => renderscript::bitmap::emit_input_bind(bind),
        (BackEnd::RenderScript, DslBaseType::Hdr) => renderscript::hdr::emit_input_bind(bind),
        (BackEnd::RenderScript, DslBaseType::Array) => renderscript::array::emit_input_bind(bind, catalog),
        (BackEnd::Native, DslBaseType::Bitmap) => native::bitmap::emit_input_bind(bind),
        (BackEnd::Native, DslBaseType::Hdr) => native::hdr::emit_input_bind(bind),
        (BackEnd::Native, DslBaseType::Array) => native::array::emit_input_bind(bind, catalog),
    })
}

fn emit_output_bind_body(
    back_end: BackEnd,
    bind: &OutputBind,
    catalog: &Catalog,
) -> Result<String, CompilationException> {
    let loc = Location::new("", bind.statement_range.line, bind.statement_range.col);
    let base = base_type_of(&bind.variable.type_name).ok_or_else(|| bind_error(back_end, &bind.variable.type_name, loc))?;
    Ok(match (back_end, base) {
        (BackEnd::RenderScript, DslBaseType::Bitmap) => renderscript::bitmap::emit_output_bind(bind),
        (BackEnd::RenderScript, DslBaseType::Hdr) => renderscript::hdr::emit_output_bind(bind),
        (BackEnd::RenderScript, DslBaseType::Array) => renderscript::array::emit_output_bind(bind, catalog),
        (BackEnd::Native, DslBaseType::Bitmap) => native::bitmap::emit_output_bind(bind),
        (BackEnd::Native, DslBaseType::Hdr) => native::hdr::emit_output_bind(bind),
        (BackEnd::Native, DslBaseType::Array) => native::array::emit_output_bind(bind, catalog),
    })
}

fn emit_operation_body(op: &Operation, fn_name: &str) -> String {
    let args = op
        .external_variables
        .iter()
        .map(|v| format!(", {}", v.name))
        .collect::<Vec<_>>()
        .join("");
    format!("    {fn_name}(data{args});\n")
}

/// Emit one wrapper implementation class for `back_end` (spec.md §4.H step
/// 3), delegating every method body to the emitters already written for
/// binds, the generated kernel functions for operations, and
/// [`crate::dispatch::BackEndTranslator`] for leftover accessor calls.
pub fn emit_wrapper_impl(
    class_name: &str,
    back_end: BackEnd,
    ops_binds: &OperationsAndBinds,
    method_calls: &[MethodCall],
    catalog: &Catalog,
) -> Result<String, CompilationException> {
    let mut body = String::new();
    for bind in &ops_binds.input_binds {
        let sig = interface_method_for_input_bind(bind);
        let stmt = emit_input_bind_body(back_end, bind, catalog)?;
        body.push_str(&format!("{}    {{\n        {}    }}\n", sig.trim_end_matches(";\n"), stmt));
    }
    for (op, fn_name) in ops_binds.operations.iter().zip(operation_function_names(ops_binds)) {
        let sig = interface_method_for_operation(op, &fn_name);
        let stmt = emit_operation_body(op, &fn_name);
        body.push_str(&format!("{}    {{\n{}    }}\n", sig.trim_end_matches(";\n"), stmt));
    }
    for bind in &ops_binds.output_binds {
        let sig = interface_method_for_output_bind(bind);
        let stmt = emit_output_bind_body(back_end, bind, catalog)?;
        body.push_str(&format!(
            "{}    {{\n        return {};\n    }}\n",
            sig.trim_end_matches(";\n"),
            stmt.trim_end_matches(";\n")
        ));
    }
    let translator = translator_for(back_end);
    for call in method_calls {
        let sig = interface_method_for_method_call(call);
        let loc = Location::new("", call.expression_range.line, call.expression_range.col);
        let expr = translator.translate_method_call(call, catalog, loc)?;
        body.push_str(&format!(
            "{}    {{\n        return {expr};\n    }}\n",
            sig.trim_end_matches(";\n"),
        ));
    }
    Ok(naming::render(
        "class {{impl_name}} implements {{interface_name}} {\n{{body}}}\n",
        &[
            ("impl_name", &wrapper_impl_name(class_name, back_end)),
            ("interface_name", &wrapper_interface_name(class_name)),
            ("body", &body),
        ],
    ))
}

/// Field/constructor code instantiating the preferred back-end and falling
/// back to `secondary` if the preferred implementation reports invalid at
/// runtime (spec.md §4.H step 5). The declared field is the same
/// `wrapper_field_name` every generated call site in the rewritten host
/// source addresses, and it is initialized inline by calling `$select()` so
/// the field is never left uninstantiated.
pub fn emit_runtime_selector(class_name: &str, preferred: BackEnd, secondary: BackEnd) -> String {
    let field_type = wrapper_interface_name(class_name);
    let field_name = wrapper_field_name(class_name);
    let preferred_impl = wrapper_impl_name(class_name, preferred);
    let secondary_impl = wrapper_impl_name(class_name, secondary);
    naming::render(
        "private final {{field_type}} {{field_name}} = $select();\n{{field_type}} $select() {\n    {{field_type}} candidate = new {{preferred_impl}}();\n    if (candidate.isValid()) {\n        return candidate;\n    }\n    return new {{secondary_impl}}();\n}\n",
        &[
            ("field_type", &field_type),
            ("field_name", &field_name),
            ("preferred_impl", &preferred_impl),
            ("secondary_impl", &secondary_impl),
        ],
    )
}
