//! The rename pipeline: parse, resolve, classify, extract, format, ask.

use crate::classify::{Entity, classify, enclosing_function};
use crate::config::Config;
use crate::context::{
    build_field_context, build_type_context, build_variable_context, build_variable_context_in,
};
use crate::error::{RenameError, Result};
use crate::llm::{self, LlmAdapter};
use crate::model::{EntityContext, RenameResult, Selector};
use crate::prompt;
use crate::resolve::resolve;
use crate::syntax::SourceFile;
use serde::Serialize;
use std::path::Path;

/// Everything computed before the model is called.
#[derive(Debug, Clone, Serialize)]
pub struct Prepared {
    pub context: EntityContext,
    pub prompt: String,
}

pub fn prepare(path: &Path, selector: &Selector, config: &Config) -> Result<Prepared> {
    let file = SourceFile::open(path)?;
    prepare_file(&file, selector, config)
}

/// Same as [`prepare`] for a file already in memory.
pub fn prepare_file(file: &SourceFile, selector: &Selector, config: &Config) -> Result<Prepared> {
    let ident = resolve(file, selector)?;

    let context = match selector {
        // the resolved occurrence pins down which same-named method is meant
        Selector::FunctionVariable { function, variable } => {
            let ctx = match enclosing_function(file, ident.node) {
                Some(func) => build_variable_context_in(file, func, variable),
                None => build_variable_context(file, function, variable)?,
            };
            EntityContext::Variable(ctx)
        }
        Selector::Position { .. } => match classify(file, &ident)? {
            Entity::Field { struct_name } => {
                EntityContext::Field(build_field_context(file, struct_name, ident.name)?)
            }
            Entity::Type { spec } => EntityContext::Type(build_type_context(file, spec)),
            Entity::Variable { function: Some(func) } => {
                EntityContext::Variable(build_variable_context_in(file, func, ident.name))
            }
            Entity::Variable { function: None } => {
                return Err(RenameError::not_found(format!(
                    "{:?} at {} is not inside a function body",
                    ident.name,
                    file.location(ident.node)
                )));
            }
        },
    };

    let prompt = prompt::format_prompt(&context, &config.style_policy);
    Ok(Prepared { context, prompt })
}

pub fn run(
    path: &Path,
    selector: &Selector,
    adapter: &dyn LlmAdapter,
    config: &Config,
) -> Result<RenameResult> {
    let prepared = prepare(path, selector, config)?;
    suggest(prepared, adapter, config)
}

/// Sends a prepared prompt to the model and parses its answer.
pub fn suggest(prepared: Prepared, adapter: &dyn LlmAdapter, config: &Config) -> Result<RenameResult> {
    let payload = config.style_policy.payload(&prepared.prompt);
    let lines = llm::request_lines(adapter, &payload, config)?;
    let suggestions = llm::parse_suggestions(&lines)?;
    tracing::info!(count = suggestions.len(), "received suggestions");
    Ok(RenameResult {
        suggestions,
        prompt: prepared.prompt,
    })
}
