//! Load balancer errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("unknown load balancer type \"{0}\", expected one of: {1}")]
    UnknownAlgorithmType(String, String),

    #[error("load balancer \"{kind}\" property \"{name}\" is invalid: \"{value}\"")]
    InvalidProperty {
        kind: String,
        name: String,
        value: String,
    },
}
