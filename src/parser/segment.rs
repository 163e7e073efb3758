//! Parse tree segments.
//!
//! A segment is one piece of information pulled out of a statement by the
//! parser, e.g. the schema in `USE sales`. Segments are handed to fillers,
//! which copy what they carry onto the statement.

use std::any::Any;
use std::fmt::Debug;

use super::statement::LockStrength;

/// A piece of a parsed statement.
///
/// Implement this for new segment types; fillers are looked up by
/// the concrete type returned from [`Segment::as_any`].
pub trait Segment: Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Identifier as written in the query, with quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub value: String,
    pub quoted: bool,
}

impl Identifier {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: &str) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }
}

/// Schema name, e.g. `sales` in `USE sales`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSegment {
    pub identifier: Identifier,
}

impl Segment for SchemaSegment {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Table reference, e.g. `sales.orders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSegment {
    pub owner: Option<Identifier>,
    pub name: Identifier,
}

impl Segment for TableSegment {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Row locking clause, e.g. `FOR UPDATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSegment {
    pub strength: LockStrength,
}

impl Segment for LockSegment {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Function call, e.g. `nextval` in `SELECT nextval('users_id_seq')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSegment {
    pub name: Identifier,
}

impl Segment for FunctionSegment {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
