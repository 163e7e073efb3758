//! Table filler.

use super::SegmentFiller;
use crate::parser::{segment::TableSegment, statement::Table, Statement};

/// Records tables on statements that reference them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableFiller;

impl SegmentFiller for TableFiller {
    type Segment = TableSegment;

    fn fill(&self, segment: &TableSegment, statement: &mut Statement) {
        if let Some(tables) = statement.tables_mut() {
            let table = Table {
                schema: segment.owner.as_ref().map(|owner| owner.value.clone()),
                name: segment.name.value.clone(),
            };

            if !tables.contains(&table) {
                tables.push(table);
            }
        }
    }
}
