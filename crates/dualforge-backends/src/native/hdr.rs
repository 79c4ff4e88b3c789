//! `HDRImage` input/output bind emission for the native C++ runtime.

use dualforge_core::ir::{InputBind, OutputBind};

use crate::dispatch::bind_arguments_text;

pub fn emit_input_bind(bind: &InputBind) -> String {
    let name = &bind.variable.name;
    format!(
        "auto {name} = dualforge::hdr_from_floats({args});\n",
        args = bind_arguments_text(&bind.arguments),
    )
}

pub fn emit_output_bind(bind: &OutputBind) -> String {
    format!(
        "auto {dest} = dualforge::hdr_to_floats({src});\n",
        dest = bind.destination.name,
        src = bind.variable.name,
    )
}
