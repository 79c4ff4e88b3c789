//! Host-language analyzer: the two-pass front end (components C and D).
//!
//! `ast` is the narrow parse-tree boundary a real generated parser would
//! populate (spec.md treats parsing as an external collaborator).
//! `first_pass` walks it into a scoped [`dualforge_core::symbols::SymbolTable`];
//! `second_pass` extracts the back-end-neutral IR.

pub mod ast;
pub mod first_pass;
pub mod second_pass;
