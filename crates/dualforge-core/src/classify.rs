//! Operation classifier (component E, spec.md §4.E).
//!
//! For every [`Operation`], `execution` is `Parallel` iff every external
//! variable is declared `final`; otherwise it is `Sequential`, and a
//! [`Diagnostic`] names the line of the offending statement. The decision is
//! irrevocable: callers get back a new `Operation` with `execution` filled
//! in, never a handle to mutate in place.

use tracing::warn;

use crate::error::Diagnostic;
use crate::ir::{Execution, Operation};
use crate::types::Location;

/// Classify one operation, returning the classified operation and, if it was
/// demoted, the warning diagnostic that names why.
pub fn classify(operation: Operation, file: &str) -> (Operation, Option<Diagnostic>) {
    let all_final = operation
        .external_variables
        .iter()
        .all(|v| v.modifier.is_final());

    if all_final {
        (
            Operation {
                execution: Execution::Parallel,
                ..operation
            },
            None,
        )
    } else {
        let offending = operation
            .external_variables
            .iter()
            .find(|v| !v.modifier.is_final())
            .expect("not all_final implies at least one non-final variable");
        let at = Location::new(file, operation.statement_range.line, operation.statement_range.col);
        let diagnostic = Diagnostic::non_final_capture(at, &offending.name);
        warn!(target: "dualforge::classify", %diagnostic, "operation demoted to sequential");
        (
            Operation {
                execution: Execution::Sequential,
                ..operation
            },
            Some(diagnostic),
        )
    }
}

/// Classify a whole batch, in order, collecting every diagnostic raised.
pub fn classify_all(operations: Vec<Operation>, file: &str) -> (Vec<Operation>, Vec<Diagnostic>) {
    let mut classified = Vec::with_capacity(operations.len());
    let mut diagnostics = Vec::new();
    for op in operations {
        let (op, diag) = classify(op, file);
        classified.push(op);
        if let Some(diag) = diag {
            diagnostics.push(diag);
        }
    }
    (classified, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{OperationKind, UserFunction, Variable, VariableModifier};
    use crate::types::TokenAddress;

    fn var(name: &str, modifier: VariableModifier) -> Variable {
        Variable {
            name: name.to_string(),
            type_name: "float".to_string(),
            type_parameter: None,
            modifier,
            identifier: 0,
        }
    }

    fn operation(external_variables: Vec<Variable>) -> Operation {
        Operation {
            variable: var("image", VariableModifier::Final),
            kind: OperationKind::Foreach,
            user_function: UserFunction {
                code: "pixel.rgba.red = pixel.rgba.red * k;".to_string(),
                variable_argument: var("pixel", VariableModifier::Final),
            },
            external_variables,
            statement_range: TokenAddress::new(0, 5, 3, 1),
            execution: Execution::Sequential, // pre-classification placeholder
        }
    }

    #[test]
    fn all_final_captures_classify_parallel() {
        let op = operation(vec![var("k", VariableModifier::Final)]);
        let (classified, diag) = classify(op, "Foo.java");
        assert_eq!(classified.execution, Execution::Parallel);
        assert!(diag.is_none());
    }

    #[test]
    fn no_external_variables_classify_parallel() {
        let op = operation(vec![]);
        let (classified, diag) = classify(op, "Foo.java");
        assert_eq!(classified.execution, Execution::Parallel);
        assert!(diag.is_none());
    }

    #[test]
    fn one_non_final_capture_demotes_to_sequential() {
        let op = operation(vec![
            var("k", VariableModifier::Final),
            var("counter", VariableModifier::Mutable),
        ]);
        let (classified, diag) = classify(op, "Foo.java");
        assert_eq!(classified.execution, Execution::Sequential);
        let diag = diag.expect("expected NonFinalCapture diagnostic");
        assert!(diag.message.contains("counter"));
        assert_eq!(diag.at.line, 3);
    }

    #[test]
    fn classify_all_preserves_order_and_collects_diagnostics() {
        let ops = vec![
            operation(vec![var("k", VariableModifier::Final)]),
            operation(vec![var("counter", VariableModifier::Mutable)]),
        ];
        let (classified, diagnostics) = classify_all(ops, "Foo.java");
        assert_eq!(classified[0].execution, Execution::Parallel);
        assert_eq!(classified[1].execution, Execution::Sequential);
        assert_eq!(diagnostics.len(), 1);
    }
}
