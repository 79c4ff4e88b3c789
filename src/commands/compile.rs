//! The `compile` command (spec.md §6 CLI boundary).
//!
//! Parsing itself is out of scope (spec.md §1: "a generated parser provides
//! parse trees and a token stream"); this command's input boundary is the
//! JSON that collaborator would hand back — one [`ParsedInput`] document per
//! source file, read from `--input`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, info_span};

use dualforge_core::catalog::Catalog;
use dualforge_core::error::CompilationException;
use dualforge_core::naming::BackEnd;
use dualforge_host::ast::{FileNode, TokenStream};

use crate::orchestrator::{compile_batch, CompiledFile, InputUnit, Options};

/// One parsed source file as handed back by the external parser
/// collaborator: the original file name (for diagnostics and for the
/// rewritten-source output path), its verbatim bytes, the token stream the
/// rewriter edits against, and the parse tree the analyzer passes walk.
#[derive(Debug, Deserialize)]
struct ParsedInput {
    file_name: String,
    source: String,
    tokens: TokenStream,
    file: FileNode,
}

fn io_error(path: &Path, err: std::io::Error) -> CompilationException {
    CompilationException::GenerationIo {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn read_input(path: &Path) -> Result<InputUnit, CompilationException> {
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let parsed: ParsedInput = serde_json::from_str(&text).map_err(|e| CompilationException::GenerationIo {
        path: path.display().to_string(),
        message: format!("malformed parsed-input document: {e}"),
    })?;
    Ok(InputUnit {
        file_name: parsed.file_name,
        source: parsed.source.into_bytes(),
        tokens: parsed.tokens,
        file: parsed.file,
    })
}

fn package_dir(dest: &Path, package: &str) -> PathBuf {
    let mut dir = dest.to_path_buf();
    for segment in package.split('.') {
        if !segment.is_empty() {
            dir.push(segment);
        }
    }
    dir
}

fn write_artifact(path: &Path, contents: &str) -> Result<(), CompilationException> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| io_error(path, e))
}

/// Write every artifact for one successfully compiled file (spec.md §6
/// Outputs), under `dest/<package-as-path>/`.
fn write_compiled_file(dest: &Path, original_path: &Path, compiled: &CompiledFile) -> Result<(), CompilationException> {
    let dir = package_dir(dest, &compiled.package);
    let file_name = original_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| original_path.display().to_string());

    write_artifact(
        &dir.join(&file_name),
        std::str::from_utf8(&compiled.rewritten_source).map_err(|e| CompilationException::GenerationIo {
            path: file_name.clone(),
            message: format!("rewritten source is not valid UTF-8: {e}"),
        })?,
    )?;

    for class in &compiled.classes {
        write_artifact(&dir.join(format!("{}Wrapper.java", class.class_name)), &class.wrapper_interface)?;
        write_artifact(
            &dir.join(format!("{}WrapperRS.java", class.class_name)),
            &class.wrapper_impl_preferred,
        )?;
        write_artifact(
            &dir.join(format!("{}WrapperPM.java", class.class_name)),
            &class.wrapper_impl_secondary,
        )?;
        write_artifact(&dir.join(format!("{}.rs", class.class_name)), &class.renderscript_kernel_file)?;
        write_artifact(&dir.join(format!("{}.cpp", class.class_name)), &class.native_translation_unit)?;

        for diagnostic in &class.diagnostics {
            info!(target: "dualforge::cli", %diagnostic, "non-final capture");
        }
    }
    Ok(())
}

/// Run the `compile` subcommand: read every `--input` document, compile the
/// batch, write artifacts for every file that succeeded, and report the
/// first failure (if any) to the caller after all writes have been
/// attempted (spec.md §7 propagation policy: other files still continue).
pub fn run_compile(
    inputs: &[PathBuf],
    dest: &Path,
    preferred: BackEnd,
    secondary: BackEnd,
) -> Result<(), CompilationException> {
    let _span = info_span!("compile", inputs = inputs.len()).entered();

    let mut units = Vec::with_capacity(inputs.len());
    for input in inputs {
        units.push(read_input(input)?);
    }

    let catalog = Catalog::standard();
    let options = Options { preferred, secondary };
    let batch = compile_batch(&units, &catalog, &options);

    write_artifact(&dest.join("Android.mk"), &batch.android_mk)?;

    let mut first_error = None;
    for ((file_name, result), original_path) in batch.files.into_iter().zip(inputs) {
        match result {
            Ok(compiled) => write_compiled_file(dest, original_path, &compiled)?,
            Err(err) => {
                tracing::error!(target: "dualforge::cli", file = %file_name, error = %err, "compilation failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
