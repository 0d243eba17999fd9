use crate::error::{RenameError, Result};
use crate::model::{Scope, VariableContext, VariableKind};
use crate::syntax::scope::{Binding, Bindings};
use crate::syntax::{SourceFile, contains, field_nodes, is_identifier, named_children, preorder};
use tree_sitter::Node;

const UNKNOWN_TYPE: &str = "unknown";

/// Context for `variable` inside the function or method named `function`.
/// The name must match exactly; there is no fallback to another function.
pub fn build_variable_context(
    file: &SourceFile,
    function: &str,
    variable: &str,
) -> Result<VariableContext> {
    let Some(func) = file
        .functions()
        .into_iter()
        .find(|func| file.function_name(*func) == function)
    else {
        return Err(RenameError::not_found(format!(
            "function {function:?} not found"
        )));
    };
    Ok(build_variable_context_in(file, func, variable))
}

/// Context for `variable` inside the function or method declaration
/// `func` itself, so same-named methods on other receivers are never
/// consulted.
pub fn build_variable_context_in(file: &SourceFile, func: Node<'_>, variable: &str) -> VariableContext {
    let related_identifiers = parameter_names(file, func);
    let mut ctx = VariableContext {
        package_name: file.package_name(),
        file_name: file.file_name().to_string(),
        function_name: file.function_name(func).to_string(),
        function_summary: file.doc_text(func),
        variable_name: variable.to_string(),
        variable_type: UNKNOWN_TYPE.to_string(),
        scope: Scope::Function,
        kind: VariableKind::Local,
        assignments: Vec::new(),
        usages: Vec::new(),
        related_identifiers,
        imports: file.imports(),
        file_comments: file.file_comments(),
    };

    let Some(body) = func.child_by_field_name("body") else {
        return ctx;
    };

    for node in preorder(body) {
        if let Some(op) = assignment_operator(node) {
            for target in assigned_identifiers(node) {
                if file.text(target) == variable {
                    ctx.assignments.push(format!("{op} {variable}"));
                }
            }
        } else if is_identifier(node) && file.text(node) == variable {
            ctx.usages.push(file.location(node));
        }
    }

    ctx.variable_type = infer_literal_kind(file, body, variable)
        .unwrap_or(UNKNOWN_TYPE)
        .to_string();

    let bindings = Bindings::build(file);
    let first_binding = preorder(body)
        .filter(|node| node.kind() == "identifier" && file.text(*node) == variable)
        .find_map(|node| bindings.get(node));
    match first_binding {
        Some(binding) => {
            ctx.scope = binding_scope(func, binding);
            ctx.kind = binding_kind(func, binding);
        }
        None if ctx.related_identifiers.iter().any(|name| name == variable) => {
            ctx.kind = VariableKind::Parameter;
        }
        None => {}
    }

    ctx
}

/// Names declared in the parameter list, receiver and results excluded.
fn parameter_names(file: &SourceFile, func: Node<'_>) -> Vec<String> {
    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(params)
        .into_iter()
        .flat_map(|param| field_nodes(param, "name"))
        .map(|name| file.text(name).to_string())
        .collect()
}

/// The operator of an assignment-like statement (`:=`, `=`, `+=`, ...).
fn assignment_operator(node: Node<'_>) -> Option<&'static str> {
    match node.kind() {
        "assignment_statement" | "short_var_declaration" | "receive_statement" => {
            if node.child_by_field_name("left").is_none() {
                return None;
            }
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|child| !child.is_named())
                .map(|child| child.kind())
                .find(|kind| kind.ends_with('='))
        }
        _ => None,
    }
}

/// Bare identifiers on the left of an assignment, in order. Index
/// expressions and selectors are not assignments to a name.
fn assigned_identifiers(node: Node<'_>) -> Vec<Node<'_>> {
    node.child_by_field_name("left")
        .map(|left| {
            named_children(left)
                .into_iter()
                .filter(|target| target.kind() == "identifier")
                .collect()
        })
        .unwrap_or_default()
}

/// Literal kind of the first assignment `name = <literal>` in source
/// order. Anything but a basic literal on the right is not inferred.
fn infer_literal_kind(file: &SourceFile, body: Node<'_>, name: &str) -> Option<&'static str> {
    preorder(body)
        .filter(|node| matches!(node.kind(), "assignment_statement" | "short_var_declaration"))
        .find_map(|node| {
            let lefts = named_children(node.child_by_field_name("left")?);
            let rights = named_children(node.child_by_field_name("right")?);
            lefts.iter().enumerate().find_map(|(idx, lhs)| {
                if lhs.kind() != "identifier" || file.text(*lhs) != name {
                    return None;
                }
                rights.get(idx).and_then(|rhs| literal_kind(*rhs))
            })
        })
}

fn literal_kind(node: Node<'_>) -> Option<&'static str> {
    match node.kind() {
        "int_literal" => Some("INT"),
        "float_literal" => Some("FLOAT"),
        "imaginary_literal" => Some("IMAG"),
        "rune_literal" => Some("CHAR"),
        "interpreted_string_literal" | "raw_string_literal" => Some("STRING"),
        _ => None,
    }
}

fn binding_scope(func: Node<'_>, binding: Binding<'_>) -> Scope {
    if contains(func, binding.decl) {
        Scope::Function
    } else {
        Scope::File
    }
}

/// Parameter only when declared by this function's own receiver or
/// parameter list; closure parameters count as locals.
fn binding_kind(func: Node<'_>, binding: Binding<'_>) -> VariableKind {
    let own_lists = ["receiver", "parameters"]
        .into_iter()
        .filter_map(|field| func.child_by_field_name(field))
        .map(|list| list.id())
        .collect::<Vec<_>>();
    let declared_by_signature = binding
        .decl
        .parent()
        .is_some_and(|parent| own_lists.contains(&parent.id()));
    if declared_by_signature {
        VariableKind::Parameter
    } else {
        VariableKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"// Report helpers.
package report

import (
	"fmt"
	str "strings"
)

var header = "== report =="

// Render formats rows.
func Render(rows []string, width int) string {
	out := ""
	sep, pad := ", ", 2
	for i := 0; i < len(rows); i++ {
		out += rows[i] + sep
	}
	out = str.Repeat(" ", pad) + out
	fmt.Println(header, width)
	return out
}
"#;

    fn parse() -> SourceFile {
        SourceFile::parse("report.go", SOURCE.to_string()).unwrap()
    }

    #[test]
    fn collects_assignments_usages_and_literal_type() {
        let file = parse();
        let ctx = build_variable_context(&file, "Render", "out").unwrap();
        assert_eq!(ctx.package_name, "report");
        assert_eq!(ctx.function_summary, "Render formats rows.");
        assert_eq!(ctx.assignments, vec![":= out", "+= out", "= out"]);
        assert_eq!(ctx.usages.len(), 5);
        assert_eq!(ctx.usages[0].to_string(), "report.go:13:2");
        assert_eq!(ctx.variable_type, "STRING");
        assert_eq!(ctx.scope, Scope::Function);
        assert_eq!(ctx.kind, VariableKind::Local);
        assert_eq!(ctx.related_identifiers, vec!["rows", "width"]);
        assert_eq!(ctx.imports, vec!["fmt", "strings"]);
        assert_eq!(ctx.file_comments, vec!["// Report helpers."]);
    }

    #[test]
    fn multi_assignment_infers_by_position() {
        let file = parse();
        assert_eq!(
            build_variable_context(&file, "Render", "pad").unwrap().variable_type,
            "INT"
        );
        assert_eq!(
            build_variable_context(&file, "Render", "sep").unwrap().variable_type,
            "STRING"
        );
    }

    #[test]
    fn parameters_and_package_variables_are_tagged() {
        let file = parse();
        let width = build_variable_context(&file, "Render", "width").unwrap();
        assert_eq!(width.kind, VariableKind::Parameter);
        assert_eq!(width.scope, Scope::Function);
        assert_eq!(width.variable_type, UNKNOWN_TYPE);

        let header = build_variable_context(&file, "Render", "header").unwrap();
        assert_eq!(header.scope, Scope::File);
        assert_eq!(header.kind, VariableKind::Local);
        assert!(header.assignments.is_empty());
    }

    #[test]
    fn function_must_match_by_name() {
        let file = parse();
        for name in ["", "render"] {
            let err = build_variable_context(&file, name, "out").unwrap_err();
            assert!(matches!(err, RenameError::NotFound(_)), "{err:?}");
        }
    }
}
