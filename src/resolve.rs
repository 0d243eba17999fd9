use crate::error::{RenameError, Result};
use crate::model::Selector;
use crate::syntax::scope::{Binding, Bindings};
use crate::syntax::{SourceFile, is_identifier, preorder};
use tree_sitter::Node;

/// How a resolved identifier relates to the declarations of the file.
#[derive(Debug, Clone, Copy)]
pub enum IdentRole<'t> {
    Declared(Binding<'t>),
    /// The field name of `x.Field`, which declares nothing itself.
    FieldSelector,
}

/// The identifier a selector points at. Borrows the tree it came from.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedIdentifier<'t> {
    pub node: Node<'t>,
    pub name: &'t str,
    pub role: IdentRole<'t>,
}

impl<'t> ResolvedIdentifier<'t> {
    pub fn binding(&self) -> Option<Binding<'t>> {
        match self.role {
            IdentRole::Declared(binding) => Some(binding),
            IdentRole::FieldSelector => None,
        }
    }
}

pub fn resolve<'t>(file: &'t SourceFile, selector: &Selector) -> Result<ResolvedIdentifier<'t>> {
    let bindings = Bindings::build(file);
    let resolved = match selector {
        Selector::Position { row, col } => resolve_position(file, &bindings, *row, *col),
        Selector::FunctionVariable { function, variable } => {
            resolve_function_variable(file, &bindings, function, variable)
        }
    }?;
    tracing::debug!(
        name = resolved.name,
        at = %file.location(resolved.node),
        declared = resolved.binding().is_some(),
        "resolved identifier"
    );
    Ok(resolved)
}

fn resolve_position<'t>(
    file: &'t SourceFile,
    bindings: &Bindings<'t>,
    row: usize,
    col: usize,
) -> Result<ResolvedIdentifier<'t>> {
    let Some(target) = file.offset_at(row, col) else {
        return Err(RenameError::not_found(format!(
            "position {row}:{col} is outside {}",
            file.file_name()
        )));
    };

    // Identifiers bound to a declaration win over selector names.
    for node in preorder(file.root()) {
        if let Some(binding) = bindings.get(node)
            && covers(node, target)
        {
            return Ok(ResolvedIdentifier {
                node,
                name: file.text(node),
                role: IdentRole::Declared(binding),
            });
        }
    }

    for node in preorder(file.root()) {
        if node.kind() != "selector_expression" {
            continue;
        }
        if let Some(field) = node.child_by_field_name("field")
            && covers(field, target)
        {
            return Ok(ResolvedIdentifier {
                node: field,
                name: file.text(field),
                role: IdentRole::FieldSelector,
            });
        }
    }

    Err(RenameError::not_found("no identifier at position"))
}

fn resolve_function_variable<'t>(
    file: &'t SourceFile,
    bindings: &Bindings<'t>,
    function: &str,
    variable: &str,
) -> Result<ResolvedIdentifier<'t>> {
    let mut function_found = false;
    for func in file.functions() {
        if file.function_name(func) != function {
            continue;
        }
        function_found = true;
        let Some(body) = func.child_by_field_name("body") else {
            continue;
        };
        for node in preorder(body) {
            if !is_identifier(node) || file.text(node) != variable {
                continue;
            }
            if let Some(binding) = bindings.get(node) {
                return Ok(ResolvedIdentifier {
                    node,
                    name: file.text(node),
                    role: IdentRole::Declared(binding),
                });
            }
        }
    }

    if !function_found {
        return Err(RenameError::not_found(format!(
            "function {function:?} not found"
        )));
    }
    Err(RenameError::not_found(format!(
        "variable {variable:?} not found in function {function:?}"
    )))
}

/// Inclusive on both ends, so a cursor just past the last character
/// still selects the identifier.
fn covers(node: Node<'_>, offset: usize) -> bool {
    node.start_byte() <= offset && offset <= node.end_byte()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package p\n\ntype T struct{ v int }\n\nfunc f(t T) int {\n\tv := t.v\n\treturn v\n}\n";

    fn parse() -> SourceFile {
        SourceFile::parse("p.go", SOURCE.to_string()).unwrap()
    }

    #[test]
    fn span_end_is_inclusive() {
        let file = parse();
        // `return v`: v sits at column 9, one past it is column 10
        for col in [9, 10] {
            let ident = resolve(&file, &Selector::position(7, col)).unwrap();
            assert_eq!(ident.name, "v");
            assert!(ident.binding().is_some());
        }
    }

    #[test]
    fn selector_fields_are_found_after_bound_names() {
        let file = parse();
        let local = resolve(&file, &Selector::position(6, 2)).unwrap();
        assert!(matches!(local.role, IdentRole::Declared(_)));

        let field = resolve(&file, &Selector::position(6, 9)).unwrap();
        assert_eq!(field.name, "v");
        assert!(matches!(field.role, IdentRole::FieldSelector));
        assert_eq!(file.location(field.node).to_string(), "p.go:6:9");
    }

    #[test]
    fn outside_the_file_is_not_found() {
        let file = parse();
        let err = resolve(&file, &Selector::position(42, 1)).unwrap_err();
        assert!(matches!(err, RenameError::NotFound(_)), "{err:?}");
    }

    #[test]
    fn columns_past_the_line_end_do_not_spill_over() {
        let file = SourceFile::parse("p.go", "package p\nvar x = 1\n".to_string()).unwrap();
        for (row, col) in [(1, 15), (2, usize::MAX)] {
            let err = resolve(&file, &Selector::position(row, col)).unwrap_err();
            assert!(matches!(err, RenameError::NotFound(_)), "{row}:{col} {err:?}");
        }
        let x = resolve(&file, &Selector::position(2, 5)).unwrap();
        assert_eq!(file.location(x.node).to_string(), "p.go:2:5");
    }
}
