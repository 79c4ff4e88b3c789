//! dualforge: a source-to-source compiler that lifts an embedded
//! image/array-processing DSL out of host-language classes and lowers it to
//! RenderScript-dialect GPU kernels and a native C++ runtime via FFI
//! (spec.md §1).
//!
//! This crate wires together [`dualforge_core`] (symbol tables, IR,
//! classifier, catalog, error types, source rewriter), [`dualforge_host`]
//! (the two-pass host-language analyzer) and [`dualforge_backends`]
//! (per-back-end kernel/wrapper emission) behind the [`orchestrator`] driver
//! and the [`cli`]/[`commands`] front door.

pub mod cli;
pub mod commands;
pub mod orchestrator;
