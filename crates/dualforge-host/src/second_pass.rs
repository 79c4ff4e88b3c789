//! Second-pass extractor (component D, spec.md §4.D).
//!
//! Consumes the parse tree plus the symbol table the first pass built and
//! produces, per class, an [`OperationsAndBinds`] and the remaining
//! recognized [`MethodCall`]s. Implements the four-step algorithmic
//! contract verbatim: input binds, operations (with ordered free-variable
//! capture), output binds, then leftover method calls.

use std::collections::HashSet;

use dualforge_core::catalog::{Catalog, CatalogMethod};
use dualforge_core::ir::{
    BindArgument, Expression as IrExpression, InputBind, Literal as IrLiteral, MethodCall,
    Operation, OperationKind, OperationsAndBinds, OutputBind, OutputBindKind, UserFunction,
    Variable as IrVariable, VariableModifier,
};
use dualforge_core::symbols::{Modifier as SymModifier, ScopeId, SymbolKindTag, SymbolTable, VariableData};
use dualforge_core::types::TokenAddress;

use crate::ast::{ClassNode, ExprNode, FileNode, LiteralNode, StmtNode};
use crate::first_pass::{expr_to_text, ClassScope, CollectedFile};

/// Everything the second pass produced for one class.
pub struct ClassExtraction {
    pub class_name: String,
    pub operations_and_binds: OperationsAndBinds,
    pub method_calls: Vec<MethodCall>,
}

/// The extractor's output for a whole file.
pub struct ExtractedFile {
    pub package: String,
    pub import_ranges: Vec<TokenAddress>,
    pub classes: Vec<ClassExtraction>,
}

fn to_ir_modifier(m: SymModifier) -> VariableModifier {
    match m {
        SymModifier::Final => VariableModifier::Final,
        SymModifier::Mutable => VariableModifier::Mutable,
    }
}

fn to_ir_variable(data: &VariableData, identifier: u32) -> IrVariable {
    IrVariable {
        name: data.name.clone(),
        type_name: data.type_name.clone(),
        type_parameter: data.type_parameters.first().cloned(),
        modifier: to_ir_modifier(data.modifier),
        identifier,
    }
}

/// Resolve `name` to its declared `Variable`/`UserLibraryVariable` binding,
/// nearest scope first.
fn resolve_variable(table: &SymbolTable, scope: ScopeId, name: &str) -> Option<IrVariable> {
    for tag in [SymbolKindTag::UserLibraryVariable, SymbolKindTag::Variable] {
        if let Some(id) = table.lookup_upward(scope, name, tag) {
            let symbol = table.symbol(id);
            let data = match &symbol.kind {
                dualforge_core::symbols::SymbolKind::Variable(d)
                | dualforge_core::symbols::SymbolKind::UserLibraryVariable(d) => d,
                _ => continue,
            };
            return Some(to_ir_variable(data, symbol.identifier));
        }
    }
    None
}

fn literal_type_name(node: &LiteralNode) -> &'static str {
    match node {
        LiteralNode::Boolean(_) => "boolean",
        LiteralNode::Char(_) => "char",
        LiteralNode::Int(_) => "int",
        LiteralNode::Float(_) => "float",
        LiteralNode::Str(_) => "String",
    }
}

/// Convert one bind/operation argument expression to its IR shape
/// (spec.md §4.D edge case: non-identifier text becomes `Expression`).
fn to_bind_argument(table: &SymbolTable, scope: ScopeId, expr: &ExprNode) -> BindArgument {
    match expr {
        ExprNode::Ident { name, .. } => match resolve_variable(table, scope, name) {
            Some(var) => BindArgument::Variable(var),
            None => BindArgument::Expression(IrExpression { text: name.clone() }),
        },
        ExprNode::Literal { node, .. } => BindArgument::Literal(IrLiteral {
            value: expr_to_text(expr),
            type_name: literal_type_name(node).to_string(),
        }),
        other => BindArgument::Expression(IrExpression {
            text: expr_to_text(other),
        }),
    }
}

/// Collect a lambda body's free variables, in order of first reference,
/// excluding the lambda's own parameter and any names it locally declares.
fn free_variables(
    table: &SymbolTable,
    method_scope: ScopeId,
    parameter: &str,
    body: &[StmtNode],
) -> Vec<IrVariable> {
    let mut locally_bound: HashSet<String> = HashSet::new();
    locally_bound.insert(parameter.to_string());
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    fn walk_expr(
        table: &SymbolTable,
        scope: ScopeId,
        locally_bound: &HashSet<String>,
        seen: &mut HashSet<String>,
        ordered: &mut Vec<IrVariable>,
        expr: &ExprNode,
    ) {
        match expr {
            ExprNode::Ident { name, .. } => {
                if locally_bound.contains(name) || seen.contains(name) {
                    return;
                }
                if let Some(var) = resolve_variable(table, scope, name) {
                    seen.insert(name.clone());
                    ordered.push(var);
                }
            }
            ExprNode::FieldAccess { receiver, .. } => {
                walk_expr(table, scope, locally_bound, seen, ordered, receiver);
            }
            ExprNode::MethodCall {
                receiver, arguments, ..
            } => {
                walk_expr(table, scope, locally_bound, seen, ordered, receiver);
                for arg in arguments {
                    walk_expr(table, scope, locally_bound, seen, ordered, arg);
                }
            }
            ExprNode::New { arguments, .. } => {
                for arg in arguments {
                    walk_expr(table, scope, locally_bound, seen, ordered, arg);
                }
            }
            ExprNode::Lambda { .. } | ExprNode::Literal { .. } | ExprNode::Raw { .. } => {}
        }
    }

    for stmt in body {
        match stmt {
            StmtNode::VarDecl { init, name, .. } => {
                if let Some(expr) = init {
                    walk_expr(table, method_scope, &locally_bound, &mut seen, &mut ordered, expr);
                }
                locally_bound.insert(name.clone());
            }
            StmtNode::Assign { value, .. } => {
                walk_expr(table, method_scope, &locally_bound, &mut seen, &mut ordered, value);
            }
            StmtNode::ExprStmt { expr, .. } => {
                walk_expr(table, method_scope, &locally_bound, &mut seen, &mut ordered, expr);
            }
            StmtNode::Raw { .. } => {}
        }
    }

    ordered
}

/// Whether `expr` is a direct method call on a simple identifier receiver,
/// returning `(receiver_name, method, arguments, address)`.
fn as_dsl_method_call(expr: &ExprNode) -> Option<(&str, &str, &[ExprNode], TokenAddress)> {
    if let ExprNode::MethodCall {
        receiver,
        method,
        arguments,
        address,
    } = expr
    {
        if let ExprNode::Ident { name, .. } = receiver.as_ref() {
            return Some((name, method, arguments, *address));
        }
    }
    None
}

struct ClassContext<'a> {
    table: &'a SymbolTable,
    scope: ScopeId,
    catalog: &'a Catalog,
}

/// Handle one DSL method call found in the tree, dispatching into the
/// relevant bucket of [`OperationsAndBinds`] or the leftover-calls list.
#[allow(clippy::too_many_arguments)]
fn handle_dsl_call(
    ctx: &ClassContext,
    receiver_name: &str,
    method: &str,
    arguments: &[ExprNode],
    address: TokenAddress,
    destination: Option<(IrVariable, OutputBindKind)>,
    out: &mut OperationsAndBinds,
    calls: &mut Vec<MethodCall>,
) {
    let Some(receiver) = resolve_variable(ctx.table, ctx.scope, receiver_name) else {
        return;
    };
    let Some(catalog_method) = ctx.catalog.valid_method(&receiver.type_name, method) else {
        return;
    };

    match catalog_method {
        CatalogMethod::Operation(kind) => {
            let Some(ExprNode::Lambda {
                parameter,
                parameter_type,
                body,
                body_text,
                ..
            }) = arguments.first()
            else {
                return;
            };
            let external_variables = free_variables(ctx.table, ctx.scope, parameter, body);
            out.operations.push(Operation {
                variable: receiver,
                kind,
                user_function: UserFunction {
                    code: body_text.clone(),
                    variable_argument: IrVariable {
                        name: parameter.clone(),
                        type_name: parameter_type.clone(),
                        type_parameter: None,
                        modifier: VariableModifier::Final,
                        identifier: 0,
                    },
                },
                external_variables,
                statement_range: address,
                execution: dualforge_core::ir::Execution::Sequential,
            });
        }
        CatalogMethod::OutputBind => {
            if let Some((destination, kind)) = destination {
                out.output_binds.push(OutputBind {
                    variable: receiver,
                    destination,
                    statement_range: address,
                    kind,
                });
            }
        }
        CatalogMethod::Accessor(_) => {
            calls.push(MethodCall {
                variable: receiver,
                method_name: method.to_string(),
                expression_range: address,
            });
        }
    }
}

fn extract_class(class: &ClassScope, node: &ClassNode, table: &SymbolTable, catalog: &Catalog) -> ClassExtraction {
    let mut out = OperationsAndBinds::default();
    let mut calls = Vec::new();
    let mut next_sequence_index = 1u32;

    for (method_scope, method_node) in class.methods.iter().zip(&node.methods) {
        let ctx = ClassContext {
            table,
            scope: method_scope.scope,
            catalog,
        };

        for stmt in &method_node.body {
            match stmt {
                StmtNode::VarDecl {
                    name,
                    type_name,
                    init: Some(ExprNode::New { type_name: ctor_type, arguments, address: creation_range }),
                    address: decl_range,
                    ..
                } if catalog.recognizes(type_name) && catalog.is_collection(type_name) => {
                    let Some(variable) = resolve_variable(table, ctx.scope, name) else {
                        continue;
                    };
                    let bind_arguments = arguments
                        .iter()
                        .map(|a| to_bind_argument(table, ctx.scope, a))
                        .collect();
                    out.input_binds.push(InputBind {
                        variable,
                        sequence_index: next_sequence_index,
                        arguments: bind_arguments,
                        decl_range: *decl_range,
                        creation_range: *creation_range,
                    });
                    next_sequence_index += 1;
                    let _ = ctor_type;
                }
                StmtNode::VarDecl {
                    name,
                    type_name,
                    init: Some(init_expr),
                    address,
                    ..
                } => {
                    if let Some((receiver_name, method, args, call_address)) = as_dsl_method_call(init_expr) {
                        let destination = resolve_variable(table, ctx.scope, name).map(|v| {
                            (v, OutputBindKind::DeclarativeAssignment)
                        });
                        handle_dsl_call(
                            &ctx,
                            receiver_name,
                            method,
                            args,
                            call_address,
                            destination,
                            &mut out,
                            &mut calls,
                        );
                    }
                    let _ = (type_name, address);
                }
                StmtNode::Assign { name, value, address } => {
                    if let Some((receiver_name, method, args, call_address)) = as_dsl_method_call(value) {
                        let destination = resolve_variable(table, ctx.scope, name)
                            .map(|v| (v, OutputBindKind::Assignment));
                        handle_dsl_call(
                            &ctx,
                            receiver_name,
                            method,
                            args,
                            call_address,
                            destination,
                            &mut out,
                            &mut calls,
                        );
                    }
                    let _ = address;
                }
                StmtNode::ExprStmt { expr, .. } => {
                    if let Some((receiver_name, method, args, call_address)) = as_dsl_method_call(expr) {
                        handle_dsl_call(
                            &ctx,
                            receiver_name,
                            method,
                            args,
                            call_address,
                            None,
                            &mut out,
                            &mut calls,
                        );
                    }
                }
                StmtNode::Raw { .. } | StmtNode::VarDecl { .. } => {}
            }
        }
    }

    ClassExtraction {
        class_name: class.name.clone(),
        operations_and_binds: out,
        method_calls: calls,
    }
}

/// Run the second pass over a whole file.
pub fn extract(file: &FileNode, collected: &CollectedFile, catalog: &Catalog) -> ExtractedFile {
    let classes = collected
        .classes
        .iter()
        .zip(&file.classes)
        .map(|(class_scope, node)| extract_class(class_scope, node, &collected.table, catalog))
        .collect();

    ExtractedFile {
        package: file.package.clone(),
        import_ranges: file.import_ranges.clone(),
        classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassNode, MethodNode, Modifier};
    use crate::first_pass::collect;
    use dualforge_core::types::TokenAddress;

    fn addr(n: u32) -> TokenAddress {
        TokenAddress::new(n, n, n as u32 + 1, 1)
    }

    fn lambda(parameter: &str, parameter_type: &str, body_text: &str, body: Vec<StmtNode>) -> ExprNode {
        ExprNode::Lambda {
            parameter: parameter.to_string(),
            parameter_type: parameter_type.to_string(),
            body,
            body_text: body_text.to_string(),
            body_text_address: addr(100),
        }
    }

    /// S1/S2-shaped fixture: one `BitmapImage` input bind, one `foreach`
    /// whose body references `k`.
    fn foreach_file(k_final: bool) -> FileNode {
        FileNode {
            package: "com.example".to_string(),
            import_ranges: vec![],
            classes: vec![ClassNode {
                name: "Blur".to_string(),
                body_range: addr(0),
                methods: vec![MethodNode {
                    name: "Blur".to_string(),
                    signature_address: addr(1),
                    body: vec![
                        StmtNode::VarDecl {
                            name: "k".to_string(),
                            type_name: "float".to_string(),
                            type_parameter: None,
                            modifier: if k_final { Modifier::Final } else { Modifier::Mutable },
                            init: None,
                            address: addr(2),
                        },
                        StmtNode::VarDecl {
                            name: "img".to_string(),
                            type_name: "BitmapImage".to_string(),
                            type_parameter: None,
                            modifier: Modifier::Final,
                            init: Some(ExprNode::New {
                                type_name: "BitmapImage".to_string(),
                                arguments: vec![ExprNode::Ident {
                                    name: "bitmap".to_string(),
                                    address: addr(3),
                                }],
                                address: addr(4),
                            }),
                            address: addr(5),
                        },
                        StmtNode::ExprStmt {
                            expr: ExprNode::MethodCall {
                                receiver: Box::new(ExprNode::Ident {
                                    name: "img".to_string(),
                                    address: addr(6),
                                }),
                                method: "foreach".to_string(),
                                arguments: vec![lambda(
                                    "pixel",
                                    "Pixel",
                                    "pixel.rgba.red = pixel.rgba.red * k;",
                                    vec![StmtNode::Assign {
                                        name: "pixel".to_string(),
                                        value: ExprNode::Ident {
                                            name: "k".to_string(),
                                            address: addr(7),
                                        },
                                        address: addr(8),
                                    }],
                                )],
                                address: addr(9),
                            },
                            address: addr(9),
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn input_bind_is_assigned_sequence_index_one() {
        let catalog = Catalog::standard();
        let file = foreach_file(true);
        let collected = collect(&file, &catalog);
        let extracted = extract(&file, &collected, &catalog);
        let binds = &extracted.classes[0].operations_and_binds.input_binds;
        assert_eq!(binds.len(), 1);
        assert_eq!(binds[0].sequence_index, 1);
        assert_eq!(binds[0].variable.name, "img");
    }

    #[test]
    fn operation_captures_external_variable_in_order() {
        let catalog = Catalog::standard();
        let file = foreach_file(true);
        let collected = collect(&file, &catalog);
        let extracted = extract(&file, &collected, &catalog);
        let ops = &extracted.classes[0].operations_and_binds.operations;
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OperationKind::Foreach);
        assert_eq!(ops[0].external_variables.len(), 1);
        assert_eq!(ops[0].external_variables[0].name, "k");
        assert!(ops[0].external_variables[0].modifier.is_final());
    }

    #[test]
    fn non_final_capture_is_recorded_as_mutable() {
        let catalog = Catalog::standard();
        let file = foreach_file(false);
        let collected = collect(&file, &catalog);
        let extracted = extract(&file, &collected, &catalog);
        let ops = &extracted.classes[0].operations_and_binds.operations;
        assert!(!ops[0].external_variables[0].modifier.is_final());
    }

    #[test]
    fn width_accessor_becomes_method_call_not_operation() {
        let catalog = Catalog::standard();
        let mut file = foreach_file(true);
        file.classes[0].methods[0].body.push(StmtNode::VarDecl {
            name: "w".to_string(),
            type_name: "int".to_string(),
            type_parameter: None,
            modifier: Modifier::Final,
            init: Some(ExprNode::MethodCall {
                receiver: Box::new(ExprNode::Ident {
                    name: "img".to_string(),
                    address: addr(10),
                }),
                method: "width".to_string(),
                arguments: vec![],
                address: addr(11),
            }),
            address: addr(12),
        });
        let collected = collect(&file, &catalog);
        let extracted = extract(&file, &collected, &catalog);
        assert_eq!(extracted.classes[0].method_calls.len(), 1);
        assert_eq!(extracted.classes[0].method_calls[0].method_name, "width");
    }
}
