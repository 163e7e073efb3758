//! Statement parsing and enrichment.
//!
//! The parser produces a [`ParseTree`]: a statement skeleton plus the
//! segments found in the query. Fillers then copy segments onto the
//! statement, producing the [`EnrichedStatement`] the router works with.

pub mod error;
pub mod filler;
pub mod lexer;
pub mod query;
pub mod segment;
pub mod statement;
pub mod tokens;

pub use error::Error;
pub use filler::{fillers, FillerEngine, SegmentFiller};
pub use lexer::Lexer;
pub use query::parse;
pub use segment::Segment;
pub use statement::{EnrichedStatement, Intent, Statement};
pub use tokens::Token;

/// Statement skeleton and the segments extracted from the query.
#[derive(Debug)]
pub struct ParseTree {
    pub statement: Statement,
    pub segments: Vec<Box<dyn Segment>>,
}

impl ParseTree {
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            segments: vec![],
        }
    }

    /// Add a segment. Segments are filled in the order they are added.
    pub fn segment(mut self, segment: impl Segment + 'static) -> Self {
        self.segments.push(Box::new(segment));
        self
    }
}

/// Parse the query and fill in the statement using the built-in fillers.
pub fn enrich(sql: &str) -> Result<EnrichedStatement, Error> {
    Ok(fillers().enrich(parse(sql)?))
}
