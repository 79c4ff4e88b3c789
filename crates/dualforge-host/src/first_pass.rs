//! First-pass collector (component C, spec.md §4.C).
//!
//! Walks a [`FileNode`] and populates a [`SymbolTable`] with one `Class` per
//! top-level class and nested `Method`, `Variable`, and `Creator` symbols.
//! Purely syntactic: the only catalog consultation is the table lookup that
//! decides whether a declared type name names a recognized DSL collection
//! (promoting `Variable` to `UserLibraryVariable`), which spec.md §4.B treats
//! as a flat registry check rather than semantic interpretation.

use dualforge_core::catalog::Catalog;
use dualforge_core::symbols::{
    LiteralKind, Modifier as SymModifier, ScopeId, SymbolId, SymbolKind, SymbolKindTag,
    SymbolTable, VariableData,
};

use crate::ast::{ClassNode, ExprNode, FileNode, LiteralNode, Modifier, StmtNode};

/// A collected class: its symbol-table scope plus the scopes of its methods,
/// so `second_pass` can query variables without re-walking the tree.
pub struct ClassScope {
    pub name: String,
    pub symbol: SymbolId,
    pub scope: ScopeId,
    pub methods: Vec<MethodScope>,
    pub node: ClassNode,
}

pub struct MethodScope {
    pub name: String,
    pub symbol: SymbolId,
    pub scope: ScopeId,
}

/// The result of running the first pass over one file.
pub struct CollectedFile {
    pub table: SymbolTable,
    pub root: ScopeId,
    pub classes: Vec<ClassScope>,
}

/// Run the first pass over `file`, consulting `catalog` only to decide
/// `Variable` vs. `UserLibraryVariable`.
pub fn collect(file: &FileNode, catalog: &Catalog) -> CollectedFile {
    let mut table = SymbolTable::new();
    let root = table.root_scope();
    table.declare(root, "<root>", SymbolKind::Root);

    let mut classes = Vec::with_capacity(file.classes.len());
    for class in &file.classes {
        let class_scope = table.new_scope(root);
        let class_symbol = table.declare(
            root,
            class.name.clone(),
            SymbolKind::Class {
                name: class.name.clone(),
                body_range: class.body_range,
            },
        );

        let mut methods = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            let method_scope = table.new_scope(class_scope);
            let method_symbol = table.declare(
                class_scope,
                method.name.clone(),
                SymbolKind::Method {
                    name: method.name.clone(),
                    signature: method.name.clone(),
                },
            );
            for stmt in &method.body {
                collect_statement(&mut table, method_scope, stmt, catalog);
            }
            methods.push(MethodScope {
                name: method.name.clone(),
                symbol: method_symbol,
                scope: method_scope,
            });
        }

        classes.push(ClassScope {
            name: class.name.clone(),
            symbol: class_symbol,
            scope: class_scope,
            methods,
            node: class.clone(),
        });
    }

    CollectedFile { table, root, classes }
}

fn to_symbol_modifier(modifier: Modifier) -> SymModifier {
    match modifier {
        Modifier::Final => SymModifier::Final,
        Modifier::Mutable => SymModifier::Mutable,
    }
}

fn collect_statement(table: &mut SymbolTable, scope: ScopeId, stmt: &StmtNode, catalog: &Catalog) {
    if let StmtNode::VarDecl {
        name,
        type_name,
        type_parameter,
        modifier,
        init,
        address,
    } = stmt
    {
        let data = VariableData {
            name: name.clone(),
            type_name: type_name.clone(),
            type_parameters: type_parameter.iter().cloned().collect(),
            modifier: to_symbol_modifier(*modifier),
            statement_range: *address,
        };
        let kind = if catalog.recognizes(type_name) {
            SymbolKind::UserLibraryVariable(data)
        } else {
            SymbolKind::Variable(data)
        };
        table.declare(scope, name.clone(), kind);

        if let Some(ExprNode::New {
            type_name: ctor_type,
            arguments,
            address: ctor_address,
        }) = init
        {
            let arg_symbols: Vec<SymbolId> = arguments
                .iter()
                .map(|arg| symbol_for_argument(table, scope, arg))
                .collect();
            table.declare(
                scope,
                ctor_type.clone(),
                SymbolKind::Creator {
                    attributed_object_name: name.clone(),
                    arguments: arg_symbols,
                    statement_range: *ctor_address,
                },
            );
        }
    }
}

/// Convert one constructor-argument expression into a symbol: an existing
/// variable binding for a bare identifier, a fresh `Literal` for a literal,
/// or a fresh `Expression` (opaque text) for anything else.
fn symbol_for_argument(table: &mut SymbolTable, scope: ScopeId, expr: &ExprNode) -> SymbolId {
    match expr {
        ExprNode::Ident { name, .. } => {
            if let Some(existing) =
                table.lookup_upward(scope, name, SymbolKindTag::UserLibraryVariable)
            {
                return existing;
            }
            if let Some(existing) = table.lookup_upward(scope, name, SymbolKindTag::Variable) {
                return existing;
            }
            table.declare(scope, name.clone(), SymbolKind::Expression { text: name.clone() })
        }
        ExprNode::Literal { node, .. } => {
            let (kind, value) = literal_kind_and_value(node);
            table.declare(scope, "<literal>", SymbolKind::Literal { kind, value })
        }
        other => {
            let text = expr_to_text(other);
            table.declare(scope, "<expr>", SymbolKind::Expression { text })
        }
    }
}

fn literal_kind_and_value(node: &LiteralNode) -> (LiteralKind, String) {
    match node {
        LiteralNode::Boolean(v) => (LiteralKind::Boolean, v.clone()),
        LiteralNode::Char(v) => (LiteralKind::Char, v.clone()),
        LiteralNode::Int(v) => (LiteralKind::Int, v.clone()),
        LiteralNode::Float(v) => (LiteralKind::Float, v.clone()),
        LiteralNode::Str(v) => (LiteralKind::String, v.clone()),
    }
}

/// Reconstruct a best-effort textual form of an expression this model
/// doesn't resolve to a symbol reference, for `Expression { text }`
/// pass-through (spec.md §4.D edge case).
pub(crate) fn expr_to_text(expr: &ExprNode) -> String {
    match expr {
        ExprNode::Ident { name, .. } => name.clone(),
        ExprNode::FieldAccess { receiver, field, .. } => {
            format!("{}.{}", expr_to_text(receiver), field)
        }
        ExprNode::MethodCall {
            receiver,
            method,
            arguments,
            ..
        } => {
            let args = arguments.iter().map(expr_to_text).collect::<Vec<_>>().join(", ");
            format!("{}.{}({})", expr_to_text(receiver), method, args)
        }
        ExprNode::Lambda { parameter, .. } => format!("({parameter}) -> {{ ... }}"),
        ExprNode::Literal { node, .. } => match node {
            LiteralNode::Str(v) => format!("\"{v}\""),
            LiteralNode::Boolean(v)
            | LiteralNode::Char(v)
            | LiteralNode::Int(v)
            | LiteralNode::Float(v) => v.clone(),
        },
        ExprNode::New {
            type_name,
            arguments,
            ..
        } => {
            let args = arguments.iter().map(expr_to_text).collect::<Vec<_>>().join(", ");
            format!("new {type_name}({args})")
        }
        ExprNode::Raw { text, .. } => text.clone(),
    }
}
