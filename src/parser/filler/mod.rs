//! Segment fillers.
//!
//! Each filler handles exactly one segment type. The [`FillerEngine`] maps
//! segment types to their fillers once, when it's built; filling a statement
//! is then a map lookup per segment. Supporting a new segment type means
//! writing a new filler and registering it with [`Builder::filler`].

pub mod function;
pub mod lock;
pub mod schema;
pub mod table;

pub use function::FunctionFiller;
pub use lock::LockFiller;
pub use schema::SchemaFiller;
pub use table::TableFiller;

use std::any::{Any, TypeId};

use fnv::FnvHashMap as HashMap;
use once_cell::sync::Lazy;
use tracing::trace;

use super::{EnrichedStatement, ParseTree, Segment, Statement};

static FILLERS: Lazy<FillerEngine> = Lazy::new(FillerEngine::default);

/// Engine with the built-in fillers.
pub fn fillers() -> &'static FillerEngine {
    &FILLERS
}

/// Copies what a segment carries onto the statement.
///
/// Fillers must only touch the statement they are given, and
/// leave it alone if the statement isn't the kind they handle.
pub trait SegmentFiller: Send + Sync {
    type Segment: Segment + 'static;

    fn fill(&self, segment: &Self::Segment, statement: &mut Statement);
}

trait AnyFiller: Send + Sync {
    fn fill(&self, segment: &dyn Any, statement: &mut Statement);
}

struct Typed<F>(F);

impl<F: SegmentFiller> AnyFiller for Typed<F> {
    fn fill(&self, segment: &dyn Any, statement: &mut Statement) {
        if let Some(segment) = segment.downcast_ref::<F::Segment>() {
            self.0.fill(segment, statement);
        }
    }
}

/// Dispatches segments to fillers.
pub struct FillerEngine {
    fillers: HashMap<TypeId, Vec<Box<dyn AnyFiller>>>,
}

impl std::fmt::Debug for FillerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillerEngine")
            .field("segment_types", &self.fillers.len())
            .finish()
    }
}

impl Default for FillerEngine {
    fn default() -> Self {
        Self::builder()
            .filler(SchemaFiller)
            .filler(TableFiller)
            .filler(LockFiller)
            .filler(FunctionFiller)
            .build()
    }
}

impl FillerEngine {
    /// Engine without any fillers.
    pub fn builder() -> Builder {
        Builder {
            fillers: HashMap::default(),
        }
    }

    /// Fill the statement from segments, in the order they are given.
    pub fn fill(&self, segments: &[Box<dyn Segment>], statement: &mut Statement) {
        for segment in segments {
            let any = segment.as_any();
            match self.fillers.get(&(*any).type_id()) {
                Some(fillers) => {
                    for filler in fillers {
                        filler.fill(any, statement);
                    }
                }
                None => trace!("no filler for {:?}", segment),
            }
        }
    }

    /// Fill the parse tree's statement from its segments.
    pub fn enrich(&self, tree: ParseTree) -> EnrichedStatement {
        let ParseTree {
            mut statement,
            segments,
        } = tree;
        self.fill(&segments, &mut statement);
        EnrichedStatement::new(statement)
    }
}

/// Builds a [`FillerEngine`].
pub struct Builder {
    fillers: HashMap<TypeId, Vec<Box<dyn AnyFiller>>>,
}

impl Builder {
    /// Register a filler. Several fillers for the same segment
    /// type run in registration order.
    pub fn filler<F: SegmentFiller + 'static>(mut self, filler: F) -> Self {
        self.fillers
            .entry(TypeId::of::<F::Segment>())
            .or_default()
            .push(Box::new(Typed(filler)));
        self
    }

    pub fn build(self) -> FillerEngine {
        FillerEngine {
            fillers: self.fillers,
        }
    }
}
