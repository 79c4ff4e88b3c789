//! Back-end-neutral definitions (component F).
//!
//! Deterministic naming for generated kernels and wrapper types, the
//! Pixel/numeric-box accessor substitution rules, and a single minimal
//! string-template primitive used by the back-end translators to assemble
//! wrapper/selector skeletons. Per REDESIGN FLAGS, the template primitive
//! itself knows nothing about host or kernel syntax — it is named-placeholder
//! substitution over plain text, nothing more.

/// Which concrete back-end a generated artifact targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackEnd {
    RenderScript,
    Native,
}

impl BackEnd {
    /// The suffix spec.md §4.F uses for wrapper implementation class names
    /// (`<Class>WrapperRS`, `<Class>WrapperPM`).
    pub fn suffix(&self) -> &'static str {
        match self {
            BackEnd::RenderScript => "RS",
            BackEnd::Native => "PM",
        }
    }
}

/// The Nth generated kernel function name: `function1`, `function2`, ...
/// (1-indexed, matching `InputBind::sequence_index`'s convention).
pub fn kernel_function_name(n: u32) -> String {
    format!("function{n}")
}

/// The back-end-neutral wrapper interface name: `<Class>Wrapper`.
pub fn wrapper_interface_name(class_name: &str) -> String {
    format!("{class_name}Wrapper")
}

/// The per-back-end wrapper implementation class name.
pub fn wrapper_impl_name(class_name: &str, back_end: BackEnd) -> String {
    format!("{class_name}Wrapper{}", back_end.suffix())
}

/// Input-bind helper name: `$<bindName>In`.
pub fn input_helper_name(bind_name: &str) -> String {
    format!("${bind_name}In")
}

/// Output-bind helper name: `$<bindName>Out`.
pub fn output_helper_name(bind_name: &str) -> String {
    format!("${bind_name}Out")
}

/// The delegating wrapper field name a class's generated call sites address:
/// `$<class_name, lowercased>`.
pub fn wrapper_field_name(class_name: &str) -> String {
    format!("${}", class_name.to_ascii_lowercase())
}

// ============================================================================
// Accessor substitution rules
// ============================================================================

/// Rewrite `Pixel` accessor syntax in a user-function body into the kernel
/// C dialect, for the Pixel argument named `pixel_var`:
///
/// - `pixel_var.x` -> `x`, `pixel_var.y` -> `y`
/// - `pixel_var.rgba.red` -> `pixel_var.s0`, `.green` -> `.s1`,
///   `.blue` -> `.s2`, `.alpha` -> `.s3`
///
/// After this runs, no substring `.rgba.` remains for `pixel_var`.
pub fn substitute_pixel_accessors(code: &str, pixel_var: &str) -> String {
    let mut out = code.to_string();
    for (component, lane) in [("red", "s0"), ("green", "s1"), ("blue", "s2"), ("alpha", "s3")] {
        let pattern = format!("{pixel_var}.rgba.{component}");
        let replacement = format!("{pixel_var}.{lane}");
        out = out.replace(&pattern, &replacement);
    }
    out = out.replace(&format!("{pixel_var}.x"), "x");
    out = out.replace(&format!("{pixel_var}.y"), "y");
    out
}

/// Rewrite `n.value` -> `n` for a numeric box variable named `var_name`.
pub fn substitute_numeric_box_value(code: &str, var_name: &str) -> String {
    code.replace(&format!("{var_name}.value"), var_name)
}

/// Keywords a `Reduce` combine body's identifier scan must never rename.
const RESERVED_WORDS: &[&str] = &["return", "if", "else", "true", "false", "while", "for"];

/// Rename a `Reduce` combine body's bound operands to the combine function's
/// declared parameter names (`acc`, `next`), per spec.md §4.G's tie-break
/// `acc = user_fn(acc, next)`. The lambda's own declared parameter (`first`)
/// becomes `acc`; the body's data model carries no name for the second,
/// implicit operand (`Operation.user_function` has a single
/// `variable_argument`), so the first bare identifier that names neither
/// `first` nor a captured external variable becomes `next`.
pub fn substitute_reduce_operands(code: &str, first: &str, externals: &[&str]) -> String {
    let word = regex::Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("static pattern is valid");
    let mut next_name: Option<String> = None;
    word.replace_all(code, |caps: &regex::Captures| {
        let ident = &caps[0];
        if ident == first {
            "acc".to_string()
        } else if RESERVED_WORDS.contains(&ident) || externals.contains(&ident) {
            ident.to_string()
        } else {
            match &next_name {
                Some(bound) if bound == ident => "next".to_string(),
                Some(_) => ident.to_string(),
                None => {
                    next_name = Some(ident.to_string());
                    "next".to_string()
                }
            }
        }
    })
    .into_owned()
}

// ============================================================================
// Minimal string-template primitive
// ============================================================================

/// Render `template`, replacing every `{{name}}` placeholder with the value
/// supplied for `name` in `vars`. Placeholders with no matching entry are
/// left untouched. Carries no host-language or kernel-language syntax
/// knowledge — it is pure text substitution.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}

/// Join a list of already-rendered fragments with `sep`, skipping empty
/// fragments (the "list aggregation" half of the template primitive).
pub fn aggregate(fragments: &[String], sep: &str) -> String {
    fragments
        .iter()
        .filter(|f| !f.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(sep)
}
