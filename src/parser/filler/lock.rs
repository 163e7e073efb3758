//! Row lock filler.

use super::SegmentFiller;
use crate::parser::{segment::LockSegment, Statement};

/// Marks SELECT ... FOR UPDATE and friends.
#[derive(Debug, Default, Clone, Copy)]
pub struct LockFiller;

impl SegmentFiller for LockFiller {
    type Segment = LockSegment;

    fn fill(&self, segment: &LockSegment, statement: &mut Statement) {
        if let Statement::Select(select) = statement {
            select.lock = Some(segment.strength);
        }
    }
}
