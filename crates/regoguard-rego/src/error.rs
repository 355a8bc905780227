use crate::ast::Pos;
use thiserror::Error;

/// A parse failure with the position it was detected at.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{file}:{}:{}: rego_parse_error: {message}", .pos.line, .pos.col)]
pub struct SyntaxError {
    pub file: String,
    pub pos: Pos,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(file: &str, pos: Pos, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            pos,
            message: message.into(),
        }
    }
}
