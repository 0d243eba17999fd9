//! Prompt templates. Formatting is a pure function of the context and the
//! style policy, so the same input always yields the same bytes.

use crate::model::{EntityContext, FieldContext, TypeContext, VariableContext};
use std::fmt::Display;

const DEFAULT_STYLE_POLICY: &str = "STRICT OUTPUT REQUIREMENTS:

- Output exactly 3 lines.
- Do NOT include any introductory sentence.
- Do NOT explain your reasoning.
- Do NOT restate the task.
- Names must be concise and idiomatic Go.
- Prefer conventional short identifiers (n, i, j, a, b, err, ctx, req, resp, buf).
- Do NOT use verbose tutorial-style names.
- If a shorter conventional identifier exists, use it.
- Avoid multi-word identifiers unless absolutely necessary.
- Names should typically be 1-2 words max.
- The justification must be under 5 words.
- No extra commentary.
- No blank lines.
- Each line must follow this exact format:

<name> - <very short justification (max 5 words)>
";

const HEADER: &str = "You are a senior Go engineer writing production-grade code.\n\n";

/// Output-shape instructions appended to every prompt and prepended to
/// the payload handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePolicy {
    text: String,
}

impl StylePolicy {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The full instruction sent to a model: policy, blank line, prompt.
    pub fn payload(&self, prompt: &str) -> String {
        format!("{}\n\n{}", self.text, prompt)
    }
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_POLICY)
    }
}

pub fn format_prompt(context: &EntityContext, policy: &StylePolicy) -> String {
    match context {
        EntityContext::Variable(ctx) => format_variable_prompt(ctx, policy),
        EntityContext::Field(ctx) => format_field_prompt(ctx, policy),
        EntityContext::Type(ctx) => format_type_prompt(ctx, policy),
    }
}

pub fn format_variable_prompt(ctx: &VariableContext, policy: &StylePolicy) -> String {
    let mut out = String::from(HEADER);
    out.push_str("Your task is to suggest better variable names.\n\n");

    out.push_str("Variable to rename:\n");
    push_fact(&mut out, "Name", &ctx.variable_name);
    push_fact(&mut out, "Scope", &ctx.scope);
    push_fact(&mut out, "Kind", &ctx.kind);
    push_fact(&mut out, "Type", &ctx.variable_type);
    out.push('\n');

    push_package(&mut out, &ctx.package_name);

    out.push_str("Function:\n");
    push_fact(&mut out, "Name", &ctx.function_name);
    if !ctx.function_summary.is_empty() {
        push_fact(&mut out, "Summary", &ctx.function_summary);
    }
    out.push('\n');

    push_list(&mut out, "Assignments", &ctx.assignments);
    push_list(&mut out, "Usages", &ctx.usages);
    push_list(&mut out, "Related Identifiers", &ctx.related_identifiers);
    push_list(&mut out, "Imports in Scope", &ctx.imports);
    push_list(&mut out, "File Comments", &ctx.file_comments);

    out.push_str(policy.text());
    out
}

pub fn format_field_prompt(ctx: &FieldContext, policy: &StylePolicy) -> String {
    let mut out = String::from(HEADER);
    out.push_str("Your task is to suggest better struct field names.\n\n");

    out.push_str("Field to rename:\n");
    push_fact(&mut out, "Name", &ctx.field_name);
    push_fact(&mut out, "Type", &ctx.field_type);
    push_fact(&mut out, "Struct", &ctx.struct_name);
    out.push('\n');

    push_package(&mut out, &ctx.package_name);
    push_struct_doc(&mut out, &ctx.struct_doc);
    push_list(&mut out, "Usages (file:line:col)", &ctx.usages);

    out.push_str(policy.text());
    out
}

pub fn format_type_prompt(ctx: &TypeContext, policy: &StylePolicy) -> String {
    let mut out = String::from(HEADER);
    out.push_str("Your task is to suggest better struct type names.\n\n");

    out.push_str("Type to rename:\n");
    push_fact(&mut out, "Name", &ctx.type_name);
    out.push('\n');

    push_package(&mut out, &ctx.package_name);
    push_struct_doc(&mut out, &ctx.struct_doc);
    push_list(&mut out, "Fields", &ctx.fields);

    out.push_str(policy.text());
    out
}

fn push_fact(out: &mut String, label: &str, value: &dyn Display) {
    out.push_str(&format!("- {label}: {value}\n"));
}

fn push_package(out: &mut String, package: &str) {
    out.push_str("Context:\n-----------\n");
    out.push_str(&format!("Package: {package}\n\n"));
}

fn push_struct_doc(out: &mut String, doc: &str) {
    if !doc.is_empty() {
        out.push_str(&format!("Struct doc: {doc}\n\n"));
    }
}

/// Empty lists still get their heading and a `- none` line so every
/// prompt of a kind has the same shape.
fn push_list<T: Display>(out: &mut String, title: &str, items: &[T]) {
    out.push_str(title);
    out.push_str(":\n");
    if items.is_empty() {
        out.push_str("- none\n");
    }
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}
