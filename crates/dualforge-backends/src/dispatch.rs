//! Dispatch table and shared kernel-shape emission (component G).
//!
//! Per REDESIGN FLAGS item 1, per-operation emission is looked up in a table
//! keyed by `(BackEnd, DslBaseType, OperationKind)` rather than resolved
//! through a class hierarchy. The table's entries are themselves thin
//! wrappers (in [`crate::renderscript`] / [`crate::native`]) around the
//! shared shape-generating free functions in this module, so the four
//! operation shapes (spec.md §4.G) are written once and parameterized by
//! back-end dialect and element type rather than duplicated per DSL type.

use std::collections::HashMap;

use dualforge_core::catalog::Catalog;
use dualforge_core::error::CompilationException;
use dualforge_core::ir::{Execution, Operation, OperationKind};
use dualforge_core::naming::{
    substitute_numeric_box_value, substitute_pixel_accessors, substitute_reduce_operands, BackEnd,
};
use dualforge_core::types::Location;

use crate::{native, renderscript};

/// The three DSL base types back-ends translate (spec.md §2 row G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DslBaseType {
    Bitmap,
    Hdr,
    Array,
}

pub fn base_type_of(type_name: &str) -> Option<DslBaseType> {
    match type_name {
        "BitmapImage" => Some(DslBaseType::Bitmap),
        "HDRImage" => Some(DslBaseType::Hdr),
        "Array" => Some(DslBaseType::Array),
        _ => None,
    }
}

/// Back-end-specific kernel syntax. Two dialects today (RenderScript,
/// Native); both share the shape generators below.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    pub back_end: BackEnd,
    pub kernel_attr: &'static str,
    pub vector3: &'static str,
    pub vector4: &'static str,
}

pub fn dialect(back_end: BackEnd) -> Dialect {
    match back_end {
        BackEnd::RenderScript => Dialect {
            back_end,
            kernel_attr: "__attribute__((kernel))",
            vector3: "float3",
            vector4: "float4",
        },
        BackEnd::Native => Dialect {
            back_end,
            kernel_attr: "",
            vector3: "float3",
            vector4: "float4",
        },
    }
}

/// Rewrite the user function's body from DSL accessor syntax into the
/// kernel C dialect, per spec.md §4.F, based on the per-element parameter's
/// declared type.
pub fn substitute_user_code(op: &Operation) -> String {
    let param = &op.user_function.variable_argument.name;
    match op.user_function.variable_argument.type_name.as_str() {
        "Pixel" => substitute_pixel_accessors(&op.user_function.code, param),
        _ => substitute_numeric_box_value(&op.user_function.code, param),
    }
}

/// The user function as a standalone C function (spec.md §4.G first bullet).
pub fn emit_user_function(op: &Operation, fn_name: &str, element_c_type: &str) -> String {
    let body = substitute_user_code(op);
    format!(
        "{ret} {name}_user({ty} {param}) {{\n    {body}\n    return {param};\n}}\n",
        ret = element_c_type,
        name = fn_name,
        ty = element_c_type,
        param = op.user_function.variable_argument.name,
        body = body,
    )
}

fn external_params(op: &Operation) -> String {
    op.external_variables
        .iter()
        .map(|v| {
            if v.modifier.is_final() {
                format!(", {} {}", v.type_name, v.name)
            } else {
                format!(", {}* {}", v.type_name, v.name)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

/// `Foreach`: an in-place per-element kernel.
pub fn emit_foreach(dialect: &Dialect, op: &Operation, fn_name: &str, element_c_type: &str) -> String {
    let user_fn = emit_user_function(op, fn_name, element_c_type);
    let driver = format!(
        "{attr}\n{ty} {name}({ty} in, uint32_t x, uint32_t y{extra}) {{\n    return {name}_user(in{args});\n}}\n",
        attr = dialect.kernel_attr,
        ty = element_c_type,
        name = fn_name,
        extra = external_params(op),
        args = op
            .external_variables
            .iter()
            .map(|v| format!(", {}", v.name))
            .collect::<Vec<_>>()
            .join(""),
    );
    format!("{user_fn}\n{driver}")
}

/// `Map`: a per-element transform writing to a new allocation. Shape is
/// identical to `Foreach` at the kernel level (RenderScript-style kernels
/// always write their return value to the output allocation); the
/// distinction that `Map` allocates a new output lives in the wrapper/bind
/// layer (component H), not the kernel body.
pub fn emit_map(dialect: &Dialect, op: &Operation, fn_name: &str, element_c_type: &str) -> String {
    emit_foreach(dialect, op, fn_name, element_c_type)
}

/// `Reduce`: two-stage (tile, final) when `Parallel`; a single sequential
/// loop kernel otherwise.
pub fn emit_reduce(dialect: &Dialect, op: &Operation, fn_name: &str, element_c_type: &str) -> String {
    if matches!(op.execution, Execution::Sequential) {
        return emit_sequential(dialect, op, fn_name, element_c_type);
    }
    let user_fn = emit_user_function(op, fn_name, element_c_type);
    let tile = format!(
        "{attr}\n{ty} {name}_tile({ty} in, uint32_t x) {{\n    return in;\n}}\n",
        attr = dialect.kernel_attr,
        ty = element_c_type,
        name = fn_name,
    );
    let fin = format!(
        "{ty} {name}_final(const {ty}* tiles, size_t count) {{\n    {ty} acc = tiles[0];\n    for (size_t i = 1; i < count; ++i) {{\n        acc = {name}_user(acc);\n        acc = {name}_user_combine(acc, tiles[i]);\n    }}\n    return acc;\n}}\n",
        ty = element_c_type,
        name = fn_name,
    );
    // `_user_combine` invokes the real binary user function (`acc, next`);
    // `_user` stays unary to satisfy the shared `emit_user_function` shape.
    // The lambda's declared parameter renames to `acc`; the body's other
    // implicit operand (not modeled in `UserFunction`, which carries only
    // one `variable_argument`) renames to `next` (spec.md §4.G tie-break).
    let externals: Vec<&str> = op.external_variables.iter().map(|v| v.name.as_str()).collect();
    let combine = format!(
        "{ty} {name}_user_combine({ty} acc, {ty} next) {{\n    {body}\n}}\n",
        ty = element_c_type,
        name = fn_name,
        body = substitute_reduce_operands(
            &substitute_user_code(op),
            &op.user_function.variable_argument.name,
            &externals,
        ),
    );
    format!("{user_fn}\n{combine}\n{tile}\n{fin}")
}

/// `Filter`: a two-pass kernel — tile predicate/prefix, then final
/// compaction preserving input order.
pub fn emit_filter(dialect: &Dialect, op: &Operation, fn_name: &str, element_c_type: &str) -> String {
    let predicate = format!(
        "{attr}\nbool {name}_predicate({ty} {param}, uint32_t index) {{\n    {body}\n}}\n",
        attr = dialect.kernel_attr,
        ty = element_c_type,
        name = fn_name,
        param = op.user_function.variable_argument.name,
        body = substitute_user_code(op),
    );
    let compact = format!(
        "size_t {name}_compact(const {ty}* in, const bool* keep, size_t count, {ty}* out) {{\n    size_t written = 0;\n    for (size_t i = 0; i < count; ++i) {{\n        if (keep[i]) {{\n            out[written++] = in[i];\n        }}\n    }}\n    return written;\n}}\n",
        ty = element_c_type,
        name = fn_name,
    );
    format!("{predicate}\n{compact}")
}

/// Sequential lowering for any operation kind: a plain loop invoking the
/// user function once per element; non-final externals are passed as
/// single-element-array references so mutations propagate back (spec.md
/// §4.G last bullet / §4.H host-side counterpart).
pub fn emit_sequential(dialect: &Dialect, op: &Operation, fn_name: &str, element_c_type: &str) -> String {
    let user_fn = emit_user_function(op, fn_name, element_c_type);
    let _ = dialect;
    format!(
        "{user_fn}\nvoid {name}({ty}* data, size_t count{extra}) {{\n    for (size_t i = 0; i < count; ++i) {{\n        data[i] = {name}_user(data[i]);\n    }}\n}}\n",
        ty = element_c_type,
        name = fn_name,
        extra = external_params(op),
    )
}

/// A per-`(BackEnd, DslBaseType, OperationKind)` kernel emission function.
pub type KernelEmitFn = fn(&Dialect, &Operation, &str, &str) -> String;

fn kernel_table() -> HashMap<(BackEnd, DslBaseType, OperationKind), KernelEmitFn> {
    use BackEnd::{Native, RenderScript};
    use DslBaseType::{Array, Bitmap, Hdr};
    use OperationKind::{Filter, Foreach, Map, Reduce};

    HashMap::from([
        ((RenderScript, Bitmap, Foreach), emit_foreach as KernelEmitFn),
        ((RenderScript, Bitmap, Map), emit_map as KernelEmitFn),
        ((RenderScript, Bitmap, Reduce), emit_reduce as KernelEmitFn),
        ((RenderScript, Bitmap, Filter), emit_filter as KernelEmitFn),
        ((RenderScript, Hdr, Foreach), emit_foreach as KernelEmitFn),
        ((RenderScript, Hdr, Map), emit_map as KernelEmitFn),
        ((RenderScript, Hdr, Reduce), emit_reduce as KernelEmitFn),
        ((RenderScript, Hdr, Filter), emit_filter as KernelEmitFn),
        ((RenderScript, Array, Foreach), emit_foreach as KernelEmitFn),
        ((RenderScript, Array, Map), emit_map as KernelEmitFn),
        ((RenderScript, Array, Reduce), emit_reduce as KernelEmitFn),
        ((RenderScript, Array, Filter), emit_filter as KernelEmitFn),
        ((Native, Bitmap, Foreach), emit_foreach as KernelEmitFn),
        ((Native, Bitmap, Map), emit_map as KernelEmitFn),
        ((Native, Bitmap, Reduce), emit_reduce as KernelEmitFn),
        ((Native, Bitmap, Filter), emit_filter as KernelEmitFn),
        ((Native, Hdr, Foreach), emit_foreach as KernelEmitFn),
        ((Native, Hdr, Map), emit_map as KernelEmitFn),
        ((Native, Hdr, Reduce), emit_reduce as KernelEmitFn),
        // Native, Hdr, Filter intentionally absent: the native runtime has
        // no HDR compaction buffer, so Filter on HDRImage is unsupported on
        // this back-end (spec.md §7 item 1 / §8 S6).
        ((Native, Array, Foreach), emit_foreach as KernelEmitFn),
        ((Native, Array, Map), emit_map as KernelEmitFn),
        ((Native, Array, Reduce), emit_reduce as KernelEmitFn),
        ((Native, Array, Filter), emit_filter as KernelEmitFn),
    ])
}

/// The element C type a kernel operates over for `op`'s collection: the
/// fixed RGB lane width for image collections (the bitmap/HDR backing
/// allocation never carries alpha — see [`crate::renderscript::bitmap`]),
/// or the catalog's mapping of the collection's type parameter for `Array`.
pub fn element_c_type(op: &Operation, base: DslBaseType, dialect: &Dialect, catalog: &Catalog) -> String {
    match base {
        DslBaseType::Bitmap | DslBaseType::Hdr => dialect.vector3.to_string(),
        DslBaseType::Array => catalog.c_type(op.variable.type_parameter.as_deref().unwrap_or("")),
    }
}

/// Look up and run the kernel emitter for `op` on `back_end`, or fail with
/// `UnsupportedMethod` if the operation's DSL type or kind has no
/// translator registered (spec.md §7 item 1 / §8 S6).
pub fn emit_kernel(
    op: &Operation,
    fn_name: &str,
    back_end: BackEnd,
    catalog: &Catalog,
    at: Location,
) -> Result<String, CompilationException> {
    let base = base_type_of(&op.variable.type_name).ok_or_else(|| CompilationException::UnsupportedMethod {
        type_name: op.variable.type_name.clone(),
        method: op.kind.to_string(),
        back_end: format!("{back_end:?}"),
        at: at.clone(),
    })?;
    let table = kernel_table();
    let dialect = dialect(back_end);
    let emit = table
        .get(&(back_end, base, op.kind))
        .ok_or_else(|| CompilationException::UnsupportedMethod {
            type_name: op.variable.type_name.clone(),
            method: op.kind.to_string(),
            back_end: format!("{back_end:?}"),
            at,
        })?;
    let element_ty = element_c_type(op, base, &dialect, catalog);
    Ok(emit(&dialect, op, fn_name, &element_ty))
}

/// Every back-end module implements this shape for accessor method calls
/// (`.width`, `.height`, `.length`, `.value`) and for bind emission; kept
/// here as the shared contract both [`renderscript`] and [`native`]
/// implement, referenced from [`crate::wrapper`].
pub trait BackEndTranslator {
    fn translate_method_call(
        &self,
        call: &dualforge_core::ir::MethodCall,
        catalog: &Catalog,
        at: Location,
    ) -> Result<String, CompilationException>;
}

pub fn translator_for(back_end: BackEnd) -> Box<dyn BackEndTranslator> {
    match back_end {
        BackEnd::RenderScript => Box::new(renderscript::RenderScriptTranslator),
        BackEnd::Native => Box::new(native::NativeTranslator),
    }
}

/// Render a bind's arguments as a comma-joined call-argument list, shared by
/// every back-end's input-bind emitter.
pub fn bind_arguments_text(arguments: &[dualforge_core::ir::BindArgument]) -> String {
    use dualforge_core::ir::BindArgument;
    arguments
        .iter()
        .map(|a| match a {
            BindArgument::Literal(lit) => lit.value.clone(),
            BindArgument::Variable(var) => var.name.clone(),
            BindArgument::Expression(expr) => expr.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
