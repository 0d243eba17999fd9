use crate::error::{RenameError, Result};
use crate::resolve::{IdentRole, ResolvedIdentifier};
use crate::syntax::scope::BindingKind;
use crate::syntax::{SourceFile, is_type_spec, preorder, struct_fields, struct_type_of};
use tree_sitter::Node;

/// What a resolved identifier names. Exactly one context is built per
/// request, chosen by this.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'t> {
    Field { struct_name: &'t str },
    Type { spec: Node<'t> },
    /// `function` is the declaration whose body encloses the identifier,
    /// `None` at file scope.
    Variable { function: Option<Node<'t>> },
}

pub fn classify<'t>(file: &'t SourceFile, ident: &ResolvedIdentifier<'t>) -> Result<Entity<'t>> {
    if let Some(struct_name) = find_struct_for_field(file, ident) {
        tracing::debug!(field = ident.name, struct_name, "classified as struct field");
        return Ok(Entity::Field { struct_name });
    }

    if let IdentRole::Declared(binding) = ident.role
        && binding.kind == BindingKind::Type
    {
        return match binding.decl.kind() {
            "type_spec" | "type_alias" => Ok(Entity::Type { spec: binding.decl }),
            other => Err(RenameError::Classification(format!(
                "type declaration not found for {:?} (declared by {other})",
                ident.name
            ))),
        };
    }

    let function = enclosing_function(file, ident.node);
    tracing::debug!(
        variable = ident.name,
        function = function.map(|func| file.function_name(func)).unwrap_or(""),
        "classified as variable"
    );
    Ok(Entity::Variable { function })
}

/// The struct declaring `ident` as a field: the declaration itself, or,
/// for a selector name, any struct with a field of that name. First
/// struct in the file wins.
fn find_struct_for_field<'t>(file: &'t SourceFile, ident: &ResolvedIdentifier<'t>) -> Option<&'t str> {
    let by_name = matches!(ident.role, IdentRole::FieldSelector);
    for spec in preorder(file.root()) {
        if !is_type_spec(spec) {
            continue;
        }
        let Some(struct_type) = struct_type_of(spec) else {
            continue;
        };
        let matched = struct_fields(struct_type).into_iter().any(|(name, _)| {
            name.id() == ident.node.id() || (by_name && file.text(name) == ident.name)
        });
        if matched {
            return spec.child_by_field_name("name").map(|name| file.text(name));
        }
    }
    None
}

/// The function or method with the smallest body containing `node`.
/// Methods sharing a name on different receivers stay distinct.
pub fn enclosing_function<'t>(file: &'t SourceFile, node: Node<'_>) -> Option<Node<'t>> {
    let pos = node.start_byte();
    file.functions()
        .into_iter()
        .filter_map(|func| {
            let body = func.child_by_field_name("body")?;
            (body.start_byte() <= pos && pos <= body.end_byte())
                .then(|| (body.end_byte() - body.start_byte(), func))
        })
        .min_by_key(|(len, _)| *len)
        .map(|(_, func)| func)
}
