//! Routing errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("no replica query rule named \"{0}\"")]
    UnknownRule(String),

    #[error("can't tell if \"{0}\" reads or writes")]
    UnroutableStatement(String),

    #[error("rule \"{0}\" has no replicas")]
    NoReplicas(String),
}
