use super::declaration_doc;
use crate::model::TypeContext;
use crate::syntax::{SourceFile, struct_fields, struct_type_of};
use tree_sitter::Node;

/// Context for a named type. `spec` is the `type_spec` (or alias) the
/// classifier found; non-struct types get an empty field list.
pub fn build_type_context(file: &SourceFile, spec: Node<'_>) -> TypeContext {
    let fields = struct_type_of(spec)
        .map(|struct_type| {
            struct_fields(struct_type)
                .into_iter()
                .map(|(name, _)| file.text(name).to_string())
                .collect()
        })
        .unwrap_or_default();

    TypeContext {
        package_name: file.package_name(),
        type_name: spec
            .child_by_field_name("name")
            .map(|name| file.text(name).to_string())
            .unwrap_or_default(),
        fields,
        struct_doc: declaration_doc(file, spec),
    }
}
