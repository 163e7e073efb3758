//! Parser errors.

use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("empty query")]
    Empty,

    #[error("unterminated {0}-quoted literal")]
    Unterminated(char),

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("syntax error: {0}")]
    Syntax(String),
}
