//! Top-level orchestrator (component H, spec.md §4.H).
//!
//! Drives, per input file: collection (C), extraction (D), classification
//! (E), neutral-interface/per-back-end-impl/kernel-file emission (G), and
//! finally the token-level host rewrite (H's own rewriting engine). One
//! `Android.mk` is assembled once per whole compilation, not per file.

use tracing::{info, info_span};

use dualforge_backends::dispatch::bind_arguments_text;
use dualforge_backends::kernel_file::{emit_android_mk, emit_native_translation_unit, emit_renderscript_file};
use dualforge_backends::wrapper::{
    emit_runtime_selector, emit_wrapper_impl, emit_wrapper_interface, operation_function_names,
};
use dualforge_core::catalog::Catalog;
use dualforge_core::classify::classify_all;
use dualforge_core::error::{CompilationException, Diagnostic};
use dualforge_core::ir::OperationsAndBinds;
use dualforge_core::naming::{input_helper_name, output_helper_name, wrapper_field_name, BackEnd};
use dualforge_core::rewrite::{Rewriter, Span};
use dualforge_host::ast::{FileNode, TokenStream};
use dualforge_host::first_pass::collect;
use dualforge_host::second_pass::{extract, ClassExtraction};

/// Compile-wide configuration. The CLI's `--backend` flag narrows this to a
/// single leg for testing; the default is both legs, RenderScript preferred.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub preferred: BackEnd,
    pub secondary: BackEnd,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            preferred: BackEnd::RenderScript,
            secondary: BackEnd::Native,
        }
    }
}

/// Everything generated for one class (spec.md §4.H steps 2–4).
pub struct CompiledClass {
    pub class_name: String,
    pub wrapper_interface: String,
    pub wrapper_impl_preferred: String,
    pub wrapper_impl_secondary: String,
    pub renderscript_kernel_file: String,
    pub native_translation_unit: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything produced for one input file.
pub struct CompiledFile {
    pub package: String,
    pub rewritten_source: Vec<u8>,
    pub classes: Vec<CompiledClass>,
}

/// Rewrite one class's declarations and call sites to delegate to its
/// generated wrapper field (spec.md §4.H step 5). Input-bind declarations
/// are deleted outright and the delegating call inserted just after, rather
/// than deleted-and-replaced as two overlapping edits against the same
/// statement: `decl_range` contains `creation_range`, and the rewriter's
/// conflict model treats any shared byte range (including containment) as a
/// conflict (see `dualforge_core::rewrite`), so a genuinely nested pair of
/// edits against one input bind is expressed as one deletion plus one
/// insertion instead.
fn rewrite_class(rewriter: &mut Rewriter, tokens: &TokenStream, class_name: &str, extraction: &ClassExtraction) {
    let field = wrapper_field_name(class_name);

    for bind in &extraction.operations_and_binds.input_binds {
        let decl = tokens.byte_span(bind.decl_range);
        let args = bind_arguments_text(&bind.arguments);
        let helper = input_helper_name(&bind.variable.name);
        rewriter.delete(decl);
        rewriter.insert_after(Span::point(decl.end), format!("{field}.{helper}({args});\n"));
    }

    for (op, fn_name) in extraction
        .operations_and_binds
        .operations
        .iter()
        .zip(operation_function_names(&extraction.operations_and_binds))
    {
        let range = tokens.byte_span(op.statement_range);

        let mut boxing = String::new();
        let mut args = String::new();
        let mut unboxing = String::new();
        for v in &op.external_variables {
            if v.modifier.is_final() {
                args.push_str(&format!(", {}", v.name));
            } else {
                let box_name = format!("{}$box", v.name);
                let ty = &v.type_name;
                let name = &v.name;
                boxing.push_str(&format!("{ty}[] {box_name} = new {ty}[]{{ {name} }};\n"));
                args.push_str(&format!(", {box_name}"));
                unboxing.push_str(&format!("{name} = {box_name}[0];\n"));
            }
        }

        rewriter.replace(range, format!("{boxing}{field}.{fn_name}(data{args});\n{unboxing}"));
    }

    for bind in &extraction.operations_and_binds.output_binds {
        let range = tokens.byte_span(bind.statement_range);
        let helper = output_helper_name(&bind.variable.name);
        rewriter.replace(range, format!("{field}.{helper}()"));
    }

    for call in &extraction.method_calls {
        let range = tokens.byte_span(call.expression_range);
        rewriter.replace(range, format!("{field}.{}()", call.method_name));
    }
}

/// Compile one file: two-pass analysis, classification, per-class
/// generation, and the host-source rewrite (spec.md §4.H steps 1–5; step 6,
/// writing artifacts to disk, is the CLI's job).
pub fn compile_file(
    file_name: &str,
    file: &FileNode,
    tokens: &TokenStream,
    source: &[u8],
    catalog: &Catalog,
    options: &Options,
) -> Result<CompiledFile, CompilationException> {
    let _file_span = info_span!("compile_file", file = file_name).entered();

    let collected = collect(file, catalog);
    let extracted = extract(file, &collected, catalog);

    // spec.md §8 invariant: a file with no DSL references produces no
    // generated artifacts and is left byte-identical, so a class with no
    // binds, operations, or leftover method calls is skipped entirely
    // rather than emitting an empty interface/impl/kernel set.
    let has_dsl_content = |raw: &ClassExtraction| {
        !raw.operations_and_binds.input_binds.is_empty()
            || !raw.operations_and_binds.operations.is_empty()
            || !raw.operations_and_binds.output_binds.is_empty()
            || !raw.method_calls.is_empty()
    };
    let touched_dsl = extracted.classes.iter().any(has_dsl_content);

    let mut rewriter = Rewriter::new();
    if touched_dsl {
        rewriter.insert_before(Span::point(0), "import com.dualforge.generated.*;\n");
    }
    let mut classes = Vec::with_capacity(extracted.classes.len());

    for raw in &extracted.classes {
        if !has_dsl_content(raw) {
            continue;
        }

        let _class_span = info_span!("translate_class", class = %raw.class_name).entered();

        let (classified_operations, diagnostics) =
            classify_all(raw.operations_and_binds.operations.clone(), file_name);
        let operations_and_binds = OperationsAndBinds {
            input_binds: raw.operations_and_binds.input_binds.clone(),
            operations: classified_operations,
            output_binds: raw.operations_and_binds.output_binds.clone(),
        };
        let extraction = ClassExtraction {
            class_name: raw.class_name.clone(),
            operations_and_binds,
            method_calls: raw.method_calls.clone(),
        };

        let wrapper_interface =
            emit_wrapper_interface(&extraction.class_name, &extraction.operations_and_binds, &extraction.method_calls);
        let wrapper_impl_preferred = emit_wrapper_impl(
            &extraction.class_name,
            options.preferred,
            &extraction.operations_and_binds,
            &extraction.method_calls,
            catalog,
        )?;
        let wrapper_impl_secondary = emit_wrapper_impl(
            &extraction.class_name,
            options.secondary,
            &extraction.operations_and_binds,
            &extraction.method_calls,
            catalog,
        )?;
        let renderscript_kernel_file =
            emit_renderscript_file(&extracted.package, &extraction.operations_and_binds.operations, catalog)?;
        let native_translation_unit = emit_native_translation_unit(
            &extraction.class_name,
            &extraction.operations_and_binds.operations,
            catalog,
        )?;

        rewrite_class(&mut rewriter, tokens, &extraction.class_name, &extraction);
        let selector = emit_runtime_selector(&extraction.class_name, options.preferred, options.secondary);
        rewriter.insert_after(Span::point(0), selector);

        for diagnostic in &diagnostics {
            info!(target: "dualforge::orchestrator", %diagnostic, "non-final capture demoted operation");
        }

        classes.push(CompiledClass {
            class_name: extraction.class_name.clone(),
            wrapper_interface,
            wrapper_impl_preferred,
            wrapper_impl_secondary,
            renderscript_kernel_file,
            native_translation_unit,
            diagnostics,
        });
    }

    let rewritten_source = rewriter.apply(source).map_err(|conflicts| CompilationException::GenerationIo {
        path: file_name.to_string(),
        message: format!("{} overlapping rewrite edits", conflicts.len()),
    })?;

    Ok(CompiledFile {
        package: extracted.package.clone(),
        rewritten_source,
        classes,
    })
}

/// One parsed input unit. Parsing itself is out of scope (spec.md §1): this
/// is what the external parser collaborator hands back.
pub struct InputUnit {
    pub file_name: String,
    pub source: Vec<u8>,
    pub tokens: TokenStream,
    pub file: FileNode,
}

/// The result of compiling a whole batch of files: each file's own result
/// (so one file's failure doesn't discard a sibling's successful output,
/// per spec.md §7 propagation policy) plus the one cross-file `Android.mk`.
pub struct CompiledBatch {
    pub files: Vec<(String, Result<CompiledFile, CompilationException>)>,
    pub android_mk: String,
}

/// Compile every unit, continuing past per-file failures, and assemble the
/// single `Android.mk` from every class's native translation unit across
/// every file that succeeded (spec.md §6 second bullet).
pub fn compile_batch(units: &[InputUnit], catalog: &Catalog, options: &Options) -> CompiledBatch {
    let mut files = Vec::with_capacity(units.len());
    let mut translation_unit_names = Vec::new();

    for unit in units {
        let result = compile_file(&unit.file_name, &unit.file, &unit.tokens, &unit.source, catalog, options);
        if let Ok(compiled) = &result {
            for class in &compiled.classes {
                translation_unit_names.push(format!("{}.cpp", class.class_name));
            }
        }
        files.push((unit.file_name.clone(), result));
    }

    CompiledBatch {
        files,
        android_mk: emit_android_mk(&translation_unit_names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualforge_host::ast::{ExprNode, Modifier, Token};
    use dualforge_host::ast::{ClassNode, MethodNode, StmtNode};
    use dualforge_core::types::TokenAddress;

    fn word_tokens(words: &[&str]) -> TokenStream {
        TokenStream::new(
            words
                .iter()
                .enumerate()
                .map(|(i, w)| Token {
                    text: w.to_string(),
                    line: 1,
                    col: i as u32,
                })
                .collect(),
        )
    }

    fn addr(start: u32, stop: u32) -> TokenAddress {
        TokenAddress::new(start, stop, 1, 1)
    }

    /// "BitmapImage img = new BitmapImage ( bitmap ) ;" tokenized one word
    /// per token, with a trailing `foreach` statement over `img`.
    fn blur_fixture() -> (FileNode, TokenStream, Vec<u8>) {
        let words = [
            "BitmapImage", "img", "=", "new", "BitmapImage", "(", "bitmap", ")", ";",
        ];
        let tokens = word_tokens(&words);
        let source = words.join(" ").into_bytes();

        let file = FileNode {
            package: "com.example".to_string(),
            import_ranges: vec![],
            classes: vec![ClassNode {
                name: "Blur".to_string(),
                body_range: addr(0, 8),
                methods: vec![MethodNode {
                    name: "Blur".to_string(),
                    signature_address: addr(0, 0),
                    body: vec![StmtNode::VarDecl {
                        name: "img".to_string(),
                        type_name: "BitmapImage".to_string(),
                        type_parameter: None,
                        modifier: Modifier::Final,
                        init: Some(ExprNode::New {
                            type_name: "BitmapImage".to_string(),
                            arguments: vec![ExprNode::Ident {
                                name: "bitmap".to_string(),
                                address: addr(6, 6),
                            }],
                            address: addr(3, 7),
                        }),
                        address: addr(0, 8),
                    }],
                }],
            }],
        };
        (file, tokens, source)
    }

    #[test]
    fn compiling_a_file_with_one_input_bind_deletes_its_declaration() {
        let catalog = Catalog::standard();
        let (file, tokens, source) = blur_fixture();
        let compiled = compile_file("Blur.java", &file, &tokens, &source, &catalog, &Options::default()).unwrap();
        let rewritten = String::from_utf8(compiled.rewritten_source).unwrap();
        assert!(!rewritten.contains("BitmapImage img ="));
        assert!(rewritten.contains("$imgIn"));
    }

    #[test]
    fn compiling_emits_a_wrapper_interface_and_both_backend_impls() {
        let catalog = Catalog::standard();
        let (file, tokens, source) = blur_fixture();
        let compiled = compile_file("Blur.java", &file, &tokens, &source, &catalog, &Options::default()).unwrap();
        assert_eq!(compiled.classes.len(), 1);
        let class = &compiled.classes[0];
        assert!(class.wrapper_interface.contains("interface BlurWrapper"));
        assert!(class.wrapper_impl_preferred.contains("class BlurWrapperRS"));
        assert!(class.wrapper_impl_secondary.contains("class BlurWrapperPM"));
    }

    /// A class binding an `HDRImage` and running `.filter()` over it: the one
    /// combination [`dualforge_backends::dispatch::kernel_table`] omits for
    /// the native back-end (spec.md §8 S6), so compiling it always fails.
    fn unsupported_hdr_filter_fixture() -> (FileNode, TokenStream, Vec<u8>) {
        let words = [
            "HDRImage", "img", "=", "new", "HDRImage", "(", "raw", ")", ";",
        ];
        let tokens = word_tokens(&words);
        let source = words.join(" ").into_bytes();

        let file = FileNode {
            package: "com.example".to_string(),
            import_ranges: vec![],
            classes: vec![ClassNode {
                name: "Threshold".to_string(),
                body_range: addr(0, 8),
                methods: vec![MethodNode {
                    name: "Threshold".to_string(),
                    signature_address: addr(0, 0),
                    body: vec![
                        StmtNode::VarDecl {
                            name: "img".to_string(),
                            type_name: "HDRImage".to_string(),
                            type_parameter: None,
                            modifier: Modifier::Final,
                            init: Some(ExprNode::New {
                                type_name: "HDRImage".to_string(),
                                arguments: vec![ExprNode::Ident {
                                    name: "raw".to_string(),
                                    address: addr(6, 6),
                                }],
                                address: addr(3, 7),
                            }),
                            address: addr(0, 8),
                        },
                        StmtNode::ExprStmt {
                            expr: ExprNode::MethodCall {
                                receiver: Box::new(ExprNode::Ident {
                                    name: "img".to_string(),
                                    address: addr(0, 0),
                                }),
                                method: "filter".to_string(),
                                arguments: vec![ExprNode::Lambda {
                                    parameter: "pixel".to_string(),
                                    parameter_type: "Pixel".to_string(),
                                    body: vec![],
                                    body_text: "return true;".to_string(),
                                    body_text_address: addr(0, 0),
                                }],
                                address: addr(0, 0),
                            },
                            address: addr(0, 0),
                        },
                    ],
                }],
            }],
        };
        (file, tokens, source)
    }

    #[test]
    fn compile_batch_continues_past_a_failing_file() {
        let catalog = Catalog::standard();
        let (good_file, good_tokens, good_source) = blur_fixture();
        let (bad_file, bad_tokens, bad_source) = unsupported_hdr_filter_fixture();

        let units = vec![
            InputUnit {
                file_name: "Good.java".to_string(),
                source: good_source,
                tokens: good_tokens,
                file: good_file,
            },
            InputUnit {
                file_name: "Bad.java".to_string(),
                source: bad_source,
                tokens: bad_tokens,
                file: bad_file,
            },
        ];
        let batch = compile_batch(&units, &catalog, &Options::default());
        assert_eq!(batch.files.len(), 2);
        assert!(batch.files[0].1.is_ok());
        assert!(batch.files[1].1.is_err());
    }
}
