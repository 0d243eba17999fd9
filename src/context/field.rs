use super::declaration_doc;
use crate::error::{RenameError, Result};
use crate::model::FieldContext;
use crate::syntax::{
    SourceFile, first_named_child, is_type_spec, preorder, struct_fields, struct_type_of,
};
use tree_sitter::Node;

/// Context for `struct_name.field_name`. The declaration is the first
/// usage; every `x.field_name` selector in the file follows in source
/// order. Selectors are matched by name only.
pub fn build_field_context(
    file: &SourceFile,
    struct_name: &str,
    field_name: &str,
) -> Result<FieldContext> {
    let mut ctx = FieldContext {
        package_name: file.package_name(),
        file_name: file.file_name().to_string(),
        struct_name: struct_name.to_string(),
        field_name: field_name.to_string(),
        field_type: String::new(),
        struct_doc: String::new(),
        usages: Vec::new(),
    };

    let declaration = preorder(file.root())
        .filter(|node| is_type_spec(*node))
        .filter(|spec| {
            spec.child_by_field_name("name")
                .is_some_and(|name| file.text(name) == struct_name)
        })
        .find_map(|spec| {
            let struct_type = struct_type_of(spec)?;
            struct_fields(struct_type)
                .into_iter()
                .find(|(name, _)| file.text(*name) == field_name)
                .map(|(name, decl)| (spec, name, decl))
        });
    let Some((spec, name, decl)) = declaration else {
        return Err(RenameError::not_found(format!(
            "field {field_name:?} not found in struct {struct_name:?}"
        )));
    };

    ctx.struct_doc = declaration_doc(file, spec);
    ctx.field_type = decl
        .child_by_field_name("type")
        .map(|ty| type_string(file, ty))
        .unwrap_or_else(|| "unknown".to_string());
    ctx.usages.push(file.location(name));

    let mut selected: Vec<Node<'_>> = preorder(file.root())
        .filter(|node| node.kind() == "selector_expression")
        .filter_map(|node| node.child_by_field_name("field"))
        .filter(|field| file.text(*field) == field_name)
        .collect();
    // pre-order visits `a.b.c` before `a.b`
    selected.sort_by_key(|field| field.start_byte());
    ctx.usages
        .extend(selected.into_iter().map(|field| file.location(field)));

    Ok(ctx)
}

/// Plain, pointer and slice/array types render as Go source; anything
/// else is `unknown`.
fn type_string(file: &SourceFile, ty: Node<'_>) -> String {
    let inner = |node: Option<Node<'_>>| {
        node.map(|node| type_string(file, node))
            .unwrap_or_else(|| "unknown".to_string())
    };
    match ty.kind() {
        "type_identifier" => file.text(ty).to_string(),
        "pointer_type" => format!("*{}", inner(first_named_child(ty))),
        "slice_type" | "array_type" => {
            format!("[]{}", inner(ty.child_by_field_name("element")))
        }
        _ => "unknown".to_string(),
    }
}
