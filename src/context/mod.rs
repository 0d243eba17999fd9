//! Fact sheets for each kind of renameable entity.

pub mod field;
pub mod types;
pub mod variable;

pub use field::build_field_context;
pub use types::build_type_context;
pub use variable::{build_variable_context, build_variable_context_in};

use crate::syntax::{SourceFile, named_children, preorder};
use tree_sitter::Node;

/// Doc text of the `type` declaration that holds `spec`, matched by node
/// identity rather than by name.
fn declaration_doc(file: &SourceFile, spec: Node<'_>) -> String {
    preorder(file.root())
        .filter(|node| node.kind() == "type_declaration")
        .find(|decl| {
            named_children(*decl)
                .iter()
                .any(|child| child.id() == spec.id())
        })
        .map(|decl| file.doc_text(decl))
        .unwrap_or_default()
}
