//! Back-end-neutral intermediate representation (component E).
//!
//! These types are produced by the second pass (`dualforge-host`), consumed
//! by the classifier (this crate's [`crate::classify`]) and by the
//! translators (`dualforge-backends`). Neither the second pass nor the
//! classifier mutate an IR value after constructing it; classification
//! produces a new `Operation` with `execution` filled in rather than editing
//! one in place (see [`crate::classify`]).

use serde::{Deserialize, Serialize};

use crate::types::TokenAddress;

/// A host-language value referenced by an IR node.
///
/// Compared structurally: two `Variable`s are equal iff every field matches,
/// including `identifier` (which disambiguates homonyms — see
/// [`crate::symbols::SymbolTable`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    /// Single generic parameter, e.g. `Array<Int32>` -> `Some("Int32")`.
    pub type_parameter: Option<String>,
    pub modifier: VariableModifier,
    /// Disambiguates homonyms; mirrors `symbols::Symbol::identifier`.
    pub identifier: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableModifier {
    Final,
    Mutable,
}

impl VariableModifier {
    pub fn is_final(&self) -> bool {
        matches!(self, VariableModifier::Final)
    }
}

/// A numeric/boolean/string constant captured verbatim from host source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub type_name: String,
}

/// An opaque host-source fragment passed through literally.
///
/// Used whenever a bind argument or operation argument is "not a simple
/// identifier" (spec.md §4.D edge case policy): the text is captured as-is
/// and handed to the back-end unexamined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
    pub text: String,
}

/// The shape an `InputBind`/operation argument may take (spec.md §4.D.1).
///
/// A shape outside these three is a compile error: see
/// [`crate::error::CompilationException::UnsupportedArgumentShape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindArgument {
    Literal(Literal),
    Variable(Variable),
    Expression(Expression),
}

/// "Construct this DSL collection from host data."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBind {
    pub variable: Variable,
    /// 1-indexed, monotonically assigned in lexical order within a class.
    pub sequence_index: u32,
    pub arguments: Vec<BindArgument>,
    pub decl_range: TokenAddress,
    pub creation_range: TokenAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputBindKind {
    /// The to-host call is embedded in a variable declaration:
    /// `T x = dsl.toHost();`
    DeclarativeAssignment,
    /// The to-host call is a plain assignment: `x = dsl.toHost();`
    Assignment,
}

/// "Materialize DSL collection to host data."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBind {
    pub variable: Variable,
    pub destination: Variable,
    pub statement_range: TokenAddress,
    pub kind: OutputBindKind,
}

/// The four parallelizable higher-order operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Foreach,
    Map,
    Reduce,
    Filter,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationKind::Foreach => "foreach",
            OperationKind::Map => "map",
            OperationKind::Reduce => "reduce",
            OperationKind::Filter => "filter",
        };
        write!(f, "{s}")
    }
}

/// Whether an operation's body runs concurrently over elements or as a
/// single sequential loop. Set once by the classifier and never revised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    Parallel,
    Sequential,
}

/// The anonymous-function body passed to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFunction {
    /// Body text, captured verbatim for the external `translate_c` boundary.
    pub code: String,
    /// The lambda's sole formal parameter (the per-element value).
    pub variable_argument: Variable,
}

/// A DSL method call whose argument is a user-supplied anonymous function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub variable: Variable,
    pub kind: OperationKind,
    pub user_function: UserFunction,
    /// Free variables of `user_function`, in order first referenced.
    pub external_variables: Vec<Variable>,
    pub statement_range: TokenAddress,
    pub execution: Execution,
}

/// A DSL method call that is neither a bind nor an operation, but whose
/// method the catalog recognizes (e.g. `.width()`, `.height()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub variable: Variable,
    pub method_name: String,
    pub expression_range: TokenAddress,
}

/// The extractor's primary output for one class (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationsAndBinds {
    pub input_binds: Vec<InputBind>,
    pub operations: Vec<Operation>,
    pub output_binds: Vec<OutputBind>,
}
