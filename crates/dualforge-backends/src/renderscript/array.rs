//! `Array<T>` input/output bind emission for the RenderScript back-end.
//!
//! Unlike the image types, the element C type is not fixed — it is resolved
//! from the collection's own type parameter via [`Catalog::c_type`].

use dualforge_core::catalog::Catalog;
use dualforge_core::ir::{InputBind, OutputBind};

use crate::dispatch::bind_arguments_text;

fn element_type(type_parameter: Option<&str>, catalog: &Catalog) -> String {
    catalog.c_type(type_parameter.unwrap_or(""))
}

pub fn emit_input_bind(bind: &InputBind, catalog: &Catalog) -> String {
    let name = &bind.variable.name;
    let ty = element_type(bind.variable.type_parameter.as_deref(), catalog);
    format!(
        "Allocation {name}_alloc = Allocation.createSized(mRS, Element.{ty}(mRS), {args}.length);\n\
         {name}_alloc.copyFrom({args});\n",
        args = bind_arguments_text(&bind.arguments),
    )
}

pub fn emit_output_bind(bind: &OutputBind, catalog: &Catalog) -> String {
    let ty = element_type(bind.variable.type_parameter.as_deref(), catalog);
    format!(
        "{ty}[] {dest} = new {ty}[{src}_alloc.getType().getX()];\n{src}_alloc.copyTo({dest});\n",
        dest = bind.destination.name,
        src = bind.variable.name,
    )
}
