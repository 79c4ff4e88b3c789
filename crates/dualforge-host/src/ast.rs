//! Host parse-tree boundary model (ambient; spec.md treats the parser as an
//! external collaborator: "a generated parser provides parse trees and a
//! token stream").
//!
//! This module is the narrow data shape that collaborator would populate.
//! dualforge does not lex or parse the host language; `first_pass` and
//! `second_pass` only ever walk the trees defined here. Test fixtures build
//! them directly, the same way the teacher's Python analyzer tests build
//! `tugtool_python_cst` trees by hand rather than re-deriving them from a
//! real parser in every test.

use serde::{Deserialize, Serialize};

use dualforge_core::types::TokenAddress;

/// One lexical token, carrying enough position data to reconstruct source
/// text and to slice `TokenAddress` ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub line: u32,
    pub col: u32,
}

/// The token stream for one file, addressable by inclusive `[start, stop]`
/// index ranges (`TokenAddress`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Token> {
        self.tokens.get(index as usize)
    }

    /// The tokens named by an inclusive `[start, stop]` address.
    pub fn slice(&self, address: TokenAddress) -> &[Token] {
        &self.tokens[address.start as usize..=address.stop as usize]
    }

    /// Re-join a token slice with single spaces, for diagnostics and for
    /// capturing a user function's verbatim body text.
    pub fn text(&self, address: TokenAddress) -> String {
        self.slice(address)
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The byte span `address` occupies under the same single-space join
    /// [`TokenStream::text`] uses — the coordinate system the orchestrator
    /// hands to [`dualforge_core::rewrite::Rewriter`].
    pub fn byte_span(&self, address: TokenAddress) -> dualforge_core::rewrite::Span {
        let mut offset: u32 = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            let i = i as u32;
            if i > 0 {
                offset += 1;
            }
            if i == address.start {
                let mut end = offset + token.text.len() as u32;
                let mut j = i;
                while j < address.stop {
                    j += 1;
                    end += 1 + self.tokens[j as usize].text.len() as u32;
                }
                return dualforge_core::rewrite::Span::new(offset, end);
            }
            offset += token.text.len() as u32;
        }
        dualforge_core::rewrite::Span::point(offset)
    }
}

/// A variable modifier as written in the host source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    Final,
    Mutable,
}

/// A literal's host-language kind, preserved verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralNode {
    Boolean(String),
    Char(String),
    Int(String),
    Float(String),
    Str(String),
}

/// One expression node. `Raw` is the escape hatch for host syntax this
/// model doesn't name explicitly — second_pass treats it as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprNode {
    Ident {
        name: String,
        address: TokenAddress,
    },
    FieldAccess {
        receiver: Box<ExprNode>,
        field: String,
        address: TokenAddress,
    },
    MethodCall {
        receiver: Box<ExprNode>,
        method: String,
        arguments: Vec<ExprNode>,
        address: TokenAddress,
    },
    /// An anonymous function literal (the user function passed to an
    /// operation), e.g. a lambda or anonymous-class body. `body` is
    /// structured for the free-variable walk; `body_text` is the verbatim
    /// source the external `translate_c` boundary eventually consumes.
    Lambda {
        parameter: String,
        parameter_type: String,
        body: Vec<StmtNode>,
        body_text: String,
        body_text_address: TokenAddress,
    },
    Literal {
        node: LiteralNode,
        address: TokenAddress,
    },
    /// A `new Type(args...)` construction.
    New {
        type_name: String,
        arguments: Vec<ExprNode>,
        address: TokenAddress,
    },
    /// Opaque pass-through text for anything this model doesn't model
    /// explicitly.
    Raw {
        text: String,
        address: TokenAddress,
    },
}

impl ExprNode {
    pub fn address(&self) -> TokenAddress {
        match self {
            ExprNode::Ident { address, .. }
            | ExprNode::FieldAccess { address, .. }
            | ExprNode::MethodCall { address, .. }
            | ExprNode::Literal { address, .. }
            | ExprNode::New { address, .. }
            | ExprNode::Raw { address, .. } => *address,
            ExprNode::Lambda {
                body_text_address, ..
            } => *body_text_address,
        }
    }
}

/// One statement. Declarations carry their own `TokenAddress` so the
/// orchestrator can delete or replace them independently of the expression
/// they contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtNode {
    /// `Type name = expr;` — a combined declaration and initialization.
    VarDecl {
        name: String,
        type_name: String,
        type_parameter: Option<String>,
        modifier: Modifier,
        init: Option<ExprNode>,
        address: TokenAddress,
    },
    /// `name = expr;` — an assignment to an already-declared variable.
    Assign {
        name: String,
        value: ExprNode,
        address: TokenAddress,
    },
    /// A bare expression statement, e.g. `image.foreach(...);`.
    ExprStmt {
        expr: ExprNode,
        address: TokenAddress,
    },
    /// Anything this model doesn't name explicitly (control flow bodies
    /// are flattened into their contained statements by the parser this
    /// model stands in for; dualforge's own passes never need to
    /// distinguish an `if` body from a top-level block per spec.md §4.D).
    Raw {
        text: String,
        address: TokenAddress,
    },
}

impl StmtNode {
    pub fn address(&self) -> TokenAddress {
        match self {
            StmtNode::VarDecl { address, .. }
            | StmtNode::Assign { address, .. }
            | StmtNode::ExprStmt { address, .. }
            | StmtNode::Raw { address, .. } => *address,
        }
    }
}

/// One method (constructor or ordinary method) of a host class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    pub signature_address: TokenAddress,
    pub body: Vec<StmtNode>,
}

/// One top-level host class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    pub body_range: TokenAddress,
    pub methods: Vec<MethodNode>,
}

/// The parsed shape of one input file: a package/namespace name, any import
/// statement ranges (kept for optional pruning per spec.md §4.D outputs),
/// and the top-level classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub package: String,
    pub import_ranges: Vec<TokenAddress>,
    pub classes: Vec<ClassNode>,
}
