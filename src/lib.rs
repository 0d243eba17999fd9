pub mod classify;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod resolve;
pub mod run;
pub mod syntax;
pub mod util;

pub use error::{RenameError, Result};
