//! Function filler.

use super::SegmentFiller;
use crate::parser::{segment::FunctionSegment, Statement};

/// Functions that change data or take locks, so the query
/// must run on the primary even though it's a SELECT.
const WRITE_FUNCTIONS: &[&str] = &[
    "nextval",
    "setval",
    "pg_advisory_lock",
    "pg_advisory_xact_lock",
    "pg_advisory_lock_shared",
    "pg_advisory_xact_lock_shared",
    "pg_try_advisory_lock",
    "pg_try_advisory_xact_lock",
    "pg_try_advisory_lock_shared",
    "pg_try_advisory_xact_lock_shared",
    "pg_advisory_unlock",
    "pg_advisory_unlock_all",
    "get_lock",
    "release_lock",
];

/// Marks SELECTs calling functions that write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionFiller;

impl FunctionFiller {
    /// This function writes.
    pub fn writes(name: &str) -> bool {
        WRITE_FUNCTIONS.iter().any(|f| f.eq_ignore_ascii_case(name))
    }
}

impl SegmentFiller for FunctionFiller {
    type Segment = FunctionSegment;

    fn fill(&self, segment: &FunctionSegment, statement: &mut Statement) {
        if let Statement::Select(select) = statement {
            if Self::writes(&segment.name.value) {
                select.writes = true;
            }
        }
    }
}
