pub mod scope;

use crate::error::{RenameError, Result};
use crate::model::Location;
use crate::util;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// One parsed Go file. The tree is never mutated after parsing; every
/// pass borrows it.
pub struct SourceFile {
    name: String,
    source: String,
    tree: Tree,
}

impl SourceFile {
    pub fn open(path: &Path) -> Result<Self> {
        let source = util::read_to_string(path)?;
        Self::parse(path.display().to_string(), source)
    }

    /// Parses `source`, reporting locations against `name`.
    pub fn parse(name: impl Into<String>, source: String) -> Result<Self> {
        let name = name.into();
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|err| RenameError::Parse(format!("load Go grammar: {err}")))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| RenameError::Parse(format!("{name}: parser returned no tree")))?;
        let file = Self { name, source, tree };
        file.check_syntax()?;
        Ok(file)
    }

    fn check_syntax(&self) -> Result<()> {
        let root = self.root();
        if !root.has_error() {
            return Ok(());
        }
        let bad = first_error(root).unwrap_or(root);
        let what = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            let snippet = util::truncate_str_bytes(self.text(bad), 40);
            format!("unexpected {snippet:?}")
        };
        Err(RenameError::Parse(format!("{}: {what}", self.location(bad))))
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn text<'t>(&'t self, node: Node<'_>) -> &'t str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    pub fn location(&self, node: Node<'_>) -> Location {
        let start = node.start_position();
        Location {
            file: self.name.clone(),
            line: start.row + 1,
            column: start.column + 1,
        }
    }

    /// Byte offset of a 1-based `row:col`, or `None` when the row does not
    /// exist or the column lies past the end of that line. The column
    /// right after the last character (the newline) is still on the line.
    pub fn offset_at(&self, row: usize, col: usize) -> Option<usize> {
        if row == 0 || col == 0 {
            return None;
        }
        let line_start = if row == 1 {
            0
        } else {
            self.source
                .match_indices('\n')
                .nth(row - 2)
                .map(|(idx, _)| idx + 1)?
        };
        let line_len = self.source[line_start..]
            .find('\n')
            .unwrap_or(self.source.len() - line_start);
        if col - 1 > line_len {
            return None;
        }
        line_start.checked_add(col - 1)
    }

    pub fn package_name(&self) -> String {
        let root = self.root();
        named_children(root)
            .into_iter()
            .find(|child| child.kind() == "package_clause")
            .and_then(first_named_child)
            .map(|ident| self.text(ident).to_string())
            .unwrap_or_default()
    }

    /// Import paths in source order, without their quotes.
    pub fn imports(&self) -> Vec<String> {
        preorder(self.root())
            .filter(|node| node.kind() == "import_spec")
            .filter_map(|spec| spec.child_by_field_name("path"))
            .map(|path| {
                let raw = self.text(path);
                util::unquote_go_string(raw).unwrap_or_else(|| raw.to_string())
            })
            .collect()
    }

    /// Raw lines of the comment group directly above the package clause.
    pub fn file_comments(&self) -> Vec<String> {
        let root = self.root();
        let Some(package) = named_children(root)
            .into_iter()
            .find(|child| child.kind() == "package_clause")
        else {
            return Vec::new();
        };
        doc_comments(package)
            .into_iter()
            .map(|comment| self.text(comment).to_string())
            .collect()
    }

    /// Doc text of a declaration, with comment markers stripped.
    pub fn doc_text(&self, decl: Node<'_>) -> String {
        let comments: Vec<&str> = doc_comments(decl)
            .into_iter()
            .map(|comment| self.text(comment))
            .collect();
        comment_group_text(&comments)
    }

    /// Top-level function and method declarations in source order.
    pub fn functions(&self) -> Vec<Node<'_>> {
        named_children(self.root())
            .into_iter()
            .filter(|node| is_function_decl(*node))
            .collect()
    }

    pub fn function_name<'t>(&'t self, func: Node<'_>) -> &'t str {
        func.child_by_field_name("name")
            .map(|name| self.text(name))
            .unwrap_or("")
    }
}

pub fn is_function_decl(node: Node<'_>) -> bool {
    matches!(node.kind(), "function_declaration" | "method_declaration")
}

/// Node kinds that are a bare Go identifier occurrence.
pub fn is_identifier(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "identifier" | "type_identifier" | "field_identifier" | "package_identifier" | "label_name"
    )
}

pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub fn first_named_child<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() != "comment")
}

/// All children stored under `field`, e.g. every name of `a, b int`.
pub fn field_nodes<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Whether `node` has an anonymous child token such as `:=`.
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token)
}

pub fn contains(outer: Node<'_>, inner: Node<'_>) -> bool {
    outer.start_byte() <= inner.start_byte() && inner.end_byte() <= outer.end_byte()
}

/// Named nodes under `node` (itself included) in pre-order.
pub fn preorder<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    let mut stack = vec![node];
    std::iter::from_fn(move || {
        let next = stack.pop()?;
        let mut children = named_children(next);
        children.reverse();
        stack.extend(children);
        Some(next)
    })
}

/// `(name, field_declaration)` pairs of a `struct_type`, skipping
/// embedded fields which have no name.
pub fn struct_fields<'t>(struct_type: Node<'t>) -> Vec<(Node<'t>, Node<'t>)> {
    let mut out = Vec::new();
    for list in named_children(struct_type) {
        if list.kind() != "field_declaration_list" {
            continue;
        }
        for field in named_children(list) {
            if field.kind() != "field_declaration" {
                continue;
            }
            for name in field_nodes(field, "name") {
                out.push((name, field));
            }
        }
    }
    out
}

/// `type T ...` and `type T = ...` both name a type.
pub fn is_type_spec(node: Node<'_>) -> bool {
    matches!(node.kind(), "type_spec" | "type_alias")
}

/// The `struct_type` a type spec or alias declares, if any.
pub fn struct_type_of(spec: Node<'_>) -> Option<Node<'_>> {
    spec.child_by_field_name("type")
        .filter(|ty| ty.kind() == "struct_type")
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

/// The comment group attached to `decl`: consecutive comments ending on
/// the line right above it. A comment trailing code on its own line
/// starts no group.
pub fn doc_comments(decl: Node<'_>) -> Vec<Node<'_>> {
    let mut group = Vec::new();
    let mut next_row = decl.start_position().row;
    let mut current = decl.prev_named_sibling();
    while let Some(sibling) = current {
        if sibling.kind() != "comment" || sibling.end_position().row + 1 != next_row {
            break;
        }
        let before = sibling.prev_named_sibling();
        if let Some(before) = before
            && before.kind() != "comment"
            && before.end_position().row == sibling.start_position().row
        {
            break;
        }
        next_row = sibling.start_position().row;
        group.push(sibling);
        current = before;
    }
    group.reverse();
    group
}

/// Go's `CommentGroup.Text`: markers and the first space of line
/// comments removed, directives dropped, runs of blank lines collapsed,
/// surrounding blank lines trimmed.
pub fn comment_group_text(comments: &[&str]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for raw in comments {
        if let Some(body) = raw.strip_prefix("//") {
            if is_directive(body) {
                continue;
            }
            let body = body.strip_prefix(' ').unwrap_or(body);
            lines.push(body.trim_end().to_string());
        } else if let Some(body) = raw.strip_prefix("/*") {
            let body = body.strip_suffix("*/").unwrap_or(body);
            lines.extend(body.lines().map(|line| line.trim_end().to_string()));
        }
    }

    let mut out: Vec<&str> = Vec::new();
    for line in &lines {
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn is_directive(body: &str) -> bool {
    if body.starts_with("line ") || body.starts_with("extern ") || body.starts_with("export ") {
        return true;
    }
    let Some((head, rest)) = body.split_once(':') else {
        return false;
    };
    !head.is_empty()
        && head
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        && rest
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        SourceFile::parse("test.go", source.to_string()).unwrap()
    }

    #[test]
    fn reports_package_imports_and_file_comments() {
        let file = parse(
            "// Package stats computes things.\n// Second line.\n\npackage stats\n\nimport (\n\t\"fmt\"\n\tio \"io/fs\"\n)\n",
        );
        assert_eq!(file.package_name(), "stats");
        assert_eq!(file.imports(), vec!["fmt", "io/fs"]);
        // blank line between the comments and the clause: not a doc group
        assert!(file.file_comments().is_empty());

        let file = parse("// Package stats computes things.\n// Second line.\npackage stats\n");
        assert_eq!(
            file.file_comments(),
            vec!["// Package stats computes things.", "// Second line."]
        );
    }

    #[test]
    fn offset_at_is_one_based() {
        let file = parse("package a\n\nvar x = 1\n");
        assert_eq!(file.offset_at(1, 1), Some(0));
        assert_eq!(file.offset_at(3, 5), Some(15));
        assert_eq!(&file.source()[15..16], "x");
        assert_eq!(file.offset_at(0, 1), None);
        assert_eq!(file.offset_at(9, 1), None);
    }

    #[test]
    fn offset_at_stays_on_the_requested_line() {
        let file = parse("package p\nvar x = 1\n");
        // one past `package p` is the newline, still line 1
        assert_eq!(file.offset_at(1, 10), Some(9));
        assert_eq!(file.offset_at(1, 11), None);
        assert_eq!(file.offset_at(1, 15), None);
        assert_eq!(file.offset_at(2, usize::MAX), None);
        assert_eq!(file.offset_at(3, 1), Some(20));
        assert_eq!(file.offset_at(3, 2), None);
    }

    #[test]
    fn syntax_errors_are_located() {
        let err = SourceFile::parse("bad.go", "package a\n\nfunc f( {\n".to_string())
            .err()
            .expect("invalid source must not parse");
        match err {
            RenameError::Parse(message) => assert!(message.starts_with("bad.go:"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn comment_group_text_strips_markers() {
        assert_eq!(
            comment_group_text(&["// Foo does bar.", "//", "//", "//go:noinline", "// More."]),
            "Foo does bar.\n\nMore."
        );
        assert_eq!(comment_group_text(&["/*block\n   doc */"]), "block\n   doc");
        assert_eq!(comment_group_text(&[]), "");
    }

    #[test]
    fn doc_comments_need_adjacency() {
        let file = parse(
            "package a\n\n// Orphan.\n\n// Doc for f.\nfunc f() {}\n\nvar y = 1 // trailing\nfunc g() {}\n",
        );
        let funcs = file.functions();
        assert_eq!(file.doc_text(funcs[0]), "Doc for f.");
        assert_eq!(file.doc_text(funcs[1]), "");
    }
}
