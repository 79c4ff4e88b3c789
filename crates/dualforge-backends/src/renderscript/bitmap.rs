//! `BitmapImage` input/output bind emission for the RenderScript back-end.
//!
//! The backing allocation is RGB-only (`float3`); alpha is dropped on input
//! and fixed to opaque on output (spec.md §3 testable round-trip property).

use dualforge_core::ir::{InputBind, OutputBind};

use crate::dispatch::bind_arguments_text;

pub fn emit_input_bind(bind: &InputBind) -> String {
    let name = &bind.variable.name;
    format!(
        "Allocation {name}_alloc = Allocation.createFromBitmap(mRS, {args});\n\
         Allocation {name} = toFloat3(mRS, {name}_alloc); // alpha discarded\n",
        args = bind_arguments_text(&bind.arguments),
    )
}

pub fn emit_output_bind(bind: &OutputBind) -> String {
    format!(
        "Bitmap {dest} = fromFloat3(mRS, {src}, /* alpha */ 255);\n",
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
    fn input_bind_discards_alpha() {
        let bind = InputBind {
            variable: var("img"),
            sequence_index: 1,
            arguments: vec![BindArgument::Expression(Expression { text: "srcBitmap".into() })],
            decl_range: TokenAddress::new(0, 0, 1, 1),
            creation_range: TokenAddress::new(0, 0, 1, 1),
        };
        let out = emit_input_bind(&bind);
        assert!(out.contains("toFloat3"));
        assert!(out.contains("srcBitmap"));
    }

    #[test]
    fn output_bind_fixes_alpha_opaque() {
        let bind = OutputBind {
            variable: var("img"),
            destination: var("result"),
            statement_range: TokenAddress::new(0, 0, 1, 1),
            kind: OutputBindKind::DeclarativeAssignment,
        };
        let out = emit_output_bind(&bind);
        assert!(out.contains("255"));
        assert!(out.contains("result"));
    }
}
