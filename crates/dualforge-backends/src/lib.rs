//! Back-end translators and artifact assembly (component G, spec.md §4.G,
//! plus the wrapper/kernel-file assembly component H delegates to).
//!
//! `dispatch` holds the `(BackEnd, DslBaseType, OperationKind)` table and the
//! shared kernel-shape generators; `renderscript`/`native` are the two
//! concrete dialects; `wrapper` builds the neutral interface/impl/selector
//! skeletons; `kernel_file` assembles per-class kernel files and the one
//! `Android.mk` build artifact.

pub mod dispatch;
pub mod kernel_file;
pub mod native;
pub mod renderscript;
pub mod wrapper;
