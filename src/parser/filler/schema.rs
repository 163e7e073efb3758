//! Schema filler.

use super::SegmentFiller;
use crate::parser::{segment::SchemaSegment, Statement};

/// Sets the schema of USE statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaFiller;

impl SegmentFiller for SchemaFiller {
    type Segment = SchemaSegment;

    fn fill(&self, segment: &SchemaSegment, statement: &mut Statement) {
        if let Statement::Use(use_statement) = statement {
            use_statement.schema = Some(segment.identifier.value.clone());
        }
    }
}
