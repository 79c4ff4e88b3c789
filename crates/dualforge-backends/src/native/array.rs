//! `Array<T>` input/output bind emission for the native C++ runtime.

use dualforge_core::catalog::Catalog;
use dualforge_core::ir::{InputBind, OutputBind};

use crate::dispatch::bind_arguments_text;

fn element_type(type_parameter: Option<&str>, catalog: &Catalog) -> String {
    catalog.c_type(type_parameter.unwrap_or(""))
}

pub fn emit_input_bind(bind: &InputBind, catalog: &Catalog) -> String {
    let ty = element_type(bind.variable.type_parameter.as_deref(), catalog);
    format!(
        "std::vector<{ty}> {name}({args});\n",
        name = bind.variable.name,
        args = bind_arguments_text(&bind.arguments),
    )
}

pub fn emit_output_bind(bind: &OutputBind, catalog: &Catalog) -> String {
    let ty = element_type(bind.variable.type_parameter.as_deref(), catalog);
    format!(
        "std::vector<{ty}> {dest} = {src};\n",
        dest = bind.destination.name,
        src = bind.variable.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualforge_core::ir::{BindArgument, Expression, OutputBindKind, Variable, VariableModifier};
    use dualforge_core::types::TokenAddress;

    fn var(name: &str, type_parameter: &str) -> Variable {
        Variable {
            name: name.into(),
            type_name: "Array".into(),
            type_parameter: Some(type_parameter.into()),
            modifier: VariableModifier::Final,
            identifier: 0,
        }
    }

    #[test]
    fn input_bind_declares_typed_vector() {
        let catalog = Catalog::standard();
        let bind = InputBind {
            variable: var("xs", "Int32"),
            sequence_index: 1,
            arguments: vec![BindArgument::Expression(Expression { text: "src".into() })],
            decl_range: TokenAddress::new(0, 0, 1, 1),
            creation_range: TokenAddress::new(0, 0, 1, 1),
        };
        assert!(emit_input_bind(&bind, &catalog).contains("std::vector<int>"));
    }

    #[test]
    fn output_bind_copies_into_matching_vector() {
        let catalog = Catalog::standard();
        let bind = OutputBind {
            variable: var("xs", "Float32"),
            destination: var("ys", "Float32"),
            statement_range: TokenAddress::new(0, 0, 1, 1),
            kind: OutputBindKind::Assignment,
        };
        assert!(emit_output_bind(&bind, &catalog).contains("std::vector<float>"));
    }
}
