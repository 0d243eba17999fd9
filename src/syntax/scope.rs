//! Lexical binding table for one Go file.
//!
//! Links every identifier occurrence that denotes something declared in
//! the file (package-level names, parameters, locals, type names, struct
//! fields) to its declaration. Identifiers that resolve to nothing here,
//! such as imported package names, builtins and the field name of a
//! selector expression, stay unbound.

use super::{SourceFile, field_nodes, has_token, is_type_spec, named_children};
use std::collections::HashMap;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Constant,
    Type,
    Function,
    Field,
}

#[derive(Debug, Clone, Copy)]
pub struct Binding<'t> {
    pub kind: BindingKind,
    /// The declaring node: `type_spec`, `parameter_declaration`,
    /// `short_var_declaration`, `field_declaration`, ...
    pub decl: Node<'t>,
}

pub struct Bindings<'t> {
    by_node: HashMap<usize, Binding<'t>>,
}

impl<'t> Bindings<'t> {
    pub fn build(file: &'t SourceFile) -> Self {
        let mut binder = Binder {
            file,
            scopes: Vec::new(),
            by_node: HashMap::new(),
        };
        binder.bind_file(file.root());
        Self {
            by_node: binder.by_node,
        }
    }

    pub fn get(&self, node: Node<'_>) -> Option<Binding<'t>> {
        self.by_node.get(&node.id()).copied()
    }
}

struct Binder<'t> {
    file: &'t SourceFile,
    scopes: Vec<HashMap<&'t str, Binding<'t>>>,
    by_node: HashMap<usize, Binding<'t>>,
}

impl<'t> Binder<'t> {
    fn bind_file(&mut self, root: Node<'t>) {
        self.scopes.push(HashMap::new());

        // Package-level names are visible before their declaration.
        for decl in named_children(root) {
            match decl.kind() {
                "function_declaration" => {
                    if let Some(name) = decl.child_by_field_name("name") {
                        self.declare(name, BindingKind::Function, decl);
                    }
                }
                "type_declaration" => {
                    for spec in type_specs(decl) {
                        if let Some(name) = spec.child_by_field_name("name") {
                            self.declare(name, BindingKind::Type, spec);
                        }
                    }
                }
                "var_declaration" | "const_declaration" => {
                    let kind = value_kind(decl);
                    for spec in value_specs(decl) {
                        for name in field_nodes(spec, "name") {
                            self.declare(name, kind, spec);
                        }
                    }
                }
                _ => {}
            }
        }

        for decl in named_children(root) {
            match decl.kind() {
                "type_declaration" => {
                    for spec in type_specs(decl) {
                        self.visit_type_spec(spec);
                    }
                }
                "var_declaration" | "const_declaration" => self.visit_value_specs(decl, false),
                _ => self.visit(decl),
            }
        }
    }

    fn visit(&mut self, node: Node<'t>) {
        match node.kind() {
            "identifier" | "type_identifier" => self.reference(node),
            "function_declaration" | "method_declaration" | "func_literal" => {
                self.visit_function(node)
            }
            "function_type" => self.scoped(|b| b.visit_signature(node)),
            "block" | "if_statement" | "for_statement" | "expression_switch_statement"
            | "select_statement" | "expression_case" | "type_case" | "default_case"
            | "communication_case" => self.scoped(|b| b.visit_children(node)),
            "type_switch_statement" => self.visit_type_switch(node),
            "short_var_declaration" => self.visit_define(node),
            "receive_statement" if has_token(node, ":=") => self.visit_define(node),
            "range_clause" => self.visit_range(node),
            "var_declaration" | "const_declaration" => self.visit_value_specs(node, true),
            "type_declaration" => {
                for spec in type_specs(node) {
                    if let Some(name) = spec.child_by_field_name("name") {
                        self.declare(name, BindingKind::Type, spec);
                    }
                    self.visit_type_spec(spec);
                }
            }
            "struct_type" => self.visit_struct(node),
            "interface_type" => self.visit_interface(node),
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.visit(operand);
                }
            }
            "qualified_type" | "field_identifier" | "package_identifier" | "label_name"
            | "comment" => {}
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'t>) {
        for child in named_children(node) {
            self.visit(child);
        }
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(HashMap::new());
        f(self);
        self.scopes.pop();
    }

    fn declare(&mut self, name: Node<'t>, kind: BindingKind, decl: Node<'t>) {
        let text = self.file.text(name);
        if text.is_empty() || text == "_" {
            return;
        }
        let binding = Binding { kind, decl };
        self.by_node.insert(name.id(), binding);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(text, binding);
        }
    }

    fn reference(&mut self, node: Node<'t>) {
        let text = self.file.text(node);
        let found = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(text).copied());
        if let Some(binding) = found {
            self.by_node.insert(node.id(), binding);
        }
    }

    fn visit_function(&mut self, node: Node<'t>) {
        self.scoped(|b| {
            if let Some(params) = node.child_by_field_name("type_parameters") {
                b.declare_type_params(params);
            }
            if let Some(receiver) = node.child_by_field_name("receiver") {
                b.declare_params(receiver);
            }
            b.visit_signature(node);
            // The body shares the scope of the parameters.
            if let Some(body) = node.child_by_field_name("body") {
                b.visit_children(body);
            }
        });
    }

    fn visit_signature(&mut self, node: Node<'t>) {
        if let Some(params) = node.child_by_field_name("parameters") {
            self.declare_params(params);
        }
        if let Some(result) = node.child_by_field_name("result") {
            if result.kind() == "parameter_list" {
                self.declare_params(result);
            } else {
                self.visit(result);
            }
        }
    }

    fn declare_params(&mut self, list: Node<'t>) {
        for param in named_children(list) {
            match param.kind() {
                "parameter_declaration" | "variadic_parameter_declaration" => {
                    if let Some(ty) = param.child_by_field_name("type") {
                        self.visit(ty);
                    }
                    for name in field_nodes(param, "name") {
                        self.declare(name, BindingKind::Variable, param);
                    }
                }
                _ => self.visit(param),
            }
        }
    }

    fn declare_type_params(&mut self, list: Node<'t>) {
        for param in named_children(list) {
            if param.kind() != "type_parameter_declaration" {
                continue;
            }
            for name in field_nodes(param, "name") {
                self.declare(name, BindingKind::Type, param);
            }
            if let Some(constraint) = param.child_by_field_name("type") {
                self.visit(constraint);
            }
        }
    }

    /// `a, b := x, y` and `v := <-ch`: right side first, then names that
    /// are new to the innermost scope are declared; the rest rebind.
    fn visit_define(&mut self, node: Node<'t>) {
        if let Some(right) = node.child_by_field_name("right") {
            self.visit(right);
        }
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        for target in named_children(left) {
            if target.kind() != "identifier" {
                self.visit(target);
                continue;
            }
            let text = self.file.text(target);
            let existing = self
                .scopes
                .last()
                .and_then(|scope| scope.get(text).copied());
            match existing {
                Some(binding) => {
                    self.by_node.insert(target.id(), binding);
                }
                None => self.declare(target, BindingKind::Variable, node),
            }
        }
    }

    fn visit_range(&mut self, node: Node<'t>) {
        if let Some(right) = node.child_by_field_name("right") {
            self.visit(right);
        }
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        if !has_token(node, ":=") {
            self.visit(left);
            return;
        }
        for target in named_children(left) {
            if target.kind() == "identifier" {
                self.declare(target, BindingKind::Variable, node);
            } else {
                self.visit(target);
            }
        }
    }

    fn visit_type_switch(&mut self, node: Node<'t>) {
        self.scoped(|b| {
            if let Some(init) = node.child_by_field_name("initializer") {
                b.visit(init);
            }
            if let Some(value) = node.child_by_field_name("value") {
                b.visit(value);
            }
            if let Some(alias) = node.child_by_field_name("alias") {
                for name in named_children(alias) {
                    if name.kind() == "identifier" {
                        b.declare(name, BindingKind::Variable, node);
                    }
                }
            }
            for case in named_children(node) {
                if matches!(case.kind(), "type_case" | "default_case") {
                    b.visit(case);
                }
            }
        });
    }

    /// `declare` is false at package level, where the names were bound
    /// up front.
    fn visit_value_specs(&mut self, decl: Node<'t>, declare: bool) {
        let kind = value_kind(decl);
        for spec in value_specs(decl) {
            if let Some(ty) = spec.child_by_field_name("type") {
                self.visit(ty);
            }
            if let Some(value) = spec.child_by_field_name("value") {
                self.visit(value);
            }
            if declare {
                for name in field_nodes(spec, "name") {
                    self.declare(name, kind, spec);
                }
            }
        }
    }

    fn visit_type_spec(&mut self, spec: Node<'t>) {
        self.scoped(|b| {
            if let Some(params) = spec.child_by_field_name("type_parameters") {
                b.declare_type_params(params);
            }
            if let Some(ty) = spec.child_by_field_name("type") {
                b.visit(ty);
            }
        });
    }

    fn visit_struct(&mut self, node: Node<'t>) {
        for list in named_children(node) {
            for field in named_children(list) {
                if field.kind() != "field_declaration" {
                    continue;
                }
                if let Some(ty) = field.child_by_field_name("type") {
                    self.visit(ty);
                }
                for name in field_nodes(field, "name") {
                    self.by_node.insert(
                        name.id(),
                        Binding {
                            kind: BindingKind::Field,
                            decl: field,
                        },
                    );
                }
            }
        }
    }

    fn visit_interface(&mut self, node: Node<'t>) {
        for elem in named_children(node) {
            if !matches!(elem.kind(), "method_elem" | "method_spec") {
                self.visit(elem);
                continue;
            }
            if let Some(name) = elem.child_by_field_name("name") {
                self.by_node.insert(
                    name.id(),
                    Binding {
                        kind: BindingKind::Function,
                        decl: elem,
                    },
                );
            }
            self.scoped(|b| b.visit_signature(elem));
        }
    }
}

fn value_kind(decl: Node<'_>) -> BindingKind {
    if decl.kind() == "const_declaration" {
        BindingKind::Constant
    } else {
        BindingKind::Variable
    }
}

/// `var_spec`/`const_spec` children, looking through the parenthesized
/// list form.
fn value_specs<'t>(decl: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    for child in named_children(decl) {
        match child.kind() {
            "var_spec" | "const_spec" => out.push(child),
            "var_spec_list" | "const_spec_list" => out.extend(
                named_children(child)
                    .into_iter()
                    .filter(|spec| matches!(spec.kind(), "var_spec" | "const_spec")),
            ),
            _ => {}
        }
    }
    out
}

pub(crate) fn type_specs<'t>(decl: Node<'t>) -> Vec<Node<'t>> {
    named_children(decl)
        .into_iter()
        .filter(|spec| is_type_spec(*spec))
        .collect()
}
