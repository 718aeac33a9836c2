//! Driver errors.

use std::path::PathBuf;

use aria_codegen::CodegenError;
use aria_parse::ParseError;

use crate::runtime::RuntimeNotFound;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{0}")]
    Usage(String),

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Every error the parser reported, one per line.
    #[error("{}", render_parse_errors(.0))]
    Parse(Vec<ParseError>),

    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),

    #[error("{0}")]
    RuntimeNotFound(#[from] RuntimeNotFound),

    #[error("{tool} not found: {message}")]
    ToolNotFound { tool: String, message: String },

    #[error("{tool} failed{}:\n{stderr}", exit_code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn render_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
