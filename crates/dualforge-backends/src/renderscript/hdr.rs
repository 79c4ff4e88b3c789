//! `HDRImage` input/output bind emission for the RenderScript back-end.
//!
//! Same RGB-only `float3` backing shape as [`crate::renderscript::bitmap`],
//! but sourced from a linear float buffer rather than an 8-bit `Bitmap`, so
//! there is no alpha byte to discard or re-fix.

use dualforge_core::ir::{InputBind, OutputBind};

use crate::dispatch::bind_arguments_text;

pub fn emit_input_bind(bind: &InputBind) -> String {
    let name = &bind.variable.name;
    format!(
        "Allocation {name}_alloc = Allocation.createTyped(mRS, hdrType({args}));\n\
         Allocation {name} = {name}_alloc;\n",
        args = bind_arguments_text(&bind.arguments),
    )
}

pub fn emit_output_bind(bind: &OutputBind) -> String {
    format!(
        "float[] {dest} = toFloatArray({src});\n",
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
            type_name: "HDRImage".into(),
            type_parameter: None,
            modifier: VariableModifier::Final,
            identifier: 0,
        }
    }

    #[test]
    fn input_bind_creates_typed_allocation() {
        let bind = InputBind {
            variable: var("hdr"),
            sequence_index: 1,
            arguments: vec![BindArgument::Expression(Expression { text: "srcFloats".into() })],
            decl_range: TokenAddress::new(0, 0, 1, 1),
            creation_range: TokenAddress::new(0, 0, 1, 1),
        };
        let out = emit_input_bind(&bind);
        assert!(out.contains("createTyped"));
        assert!(out.contains("srcFloats"));
    }

    #[test]
    fn output_bind_does_not_mention_alpha() {
        let bind = OutputBind {
            variable: var("hdr"),
            destination: var("result"),
            statement_range: TokenAddress::new(0, 0, 1, 1),
            kind: OutputBindKind::Assignment,
        };
        let out = emit_output_bind(&bind);
        assert!(!out.contains("alpha"));
        assert!(out.contains("result"));
    }
}
