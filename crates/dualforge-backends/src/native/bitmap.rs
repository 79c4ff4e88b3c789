//! `BitmapImage` input/output bind emission for the native C++ runtime.
//!
//! Same RGB-only, alpha-discarding contract as the RenderScript leg (spec.md
//! §3 testable round-trip property), expressed as FFI calls instead of
//! `Allocation` construction.

use dualforge_core::ir::{InputBind, OutputBind};

use crate::dispatch::bind_arguments_text;

pub fn emit_input_bind(bind: &InputBind) -> String {
    let name = &bind.variable.name;
    format!(
        "auto {name} = dualforge::bitmap_to_float3({args}); // alpha discarded\n",
        args = bind_arguments_text(&bind.arguments),
    )
}

pub fn emit_output_bind(bind: &OutputBind) -> String {
    format!(
        "auto {dest} = dualforge::float3_to_bitmap({src}, /* alpha */ 255);\n",
        dest = bind.destination.name,
        src = bind.variable.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualforge_core::ir::{BindArgument, Expression, OutputBindKind, Variable, VariableModifier};
    use dualforge_core::types::TokenAddress;

    fn var(name: &str) -> Variable {
        Variable {
            name: name.into(),
            type_name: "BitmapImage".into(),
            type_parameter: None,
            modifier: VariableModifier::Final,
            identifier: 0,
        }
    }

    #[test]
    fn input_bind_calls_ffi_conversion() {
        let bind = InputBind {
            variable: var("img"),
            sequence_index: 1,
            arguments: vec![BindArgument::Expression(Expression { text: "src".into() })],
            decl_range: TokenAddress::new(0, 0, 1, 1),
            creation_range: TokenAddress::new(0, 0, 1, 1),
        };
        assert!(emit_input_bind(&bind).contains("bitmap_to_float3"));
    }

    #[test]
    fn output_bind_fixes_alpha_opaque() {
        let bind = OutputBind {
            variable: var("img"),
            destination: var("result"),
            statement_range: TokenAddress::new(0, 0, 1, 1),
            kind: OutputBindKind::DeclarativeAssignment,
        };
        assert!(emit_output_bind(&bind).contains("255"));
    }
}
