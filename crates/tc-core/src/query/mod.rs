use thiserror::Error;

mod coordinator;
mod dimension;
mod key;
mod predicate;
mod subscriber;

pub use coordinator::{QueryCoordinator, MAX_DIMENSIONS};
pub use dimension::Dimension;
pub use key::{DimensionKey, GeoBounds, KeyKind};
pub use predicate::FilterPredicate;
pub use subscriber::{FilterSubscriber, SubscriptionId};

/// Names of the standard tree census dimensions
pub mod dims {
    pub const BOROUGH: &str = "borough";
    pub const SPECIES: &str = "species";
    pub const STATUS: &str = "status";
    pub const HEALTH: &str = "health";
    pub const LOCATION: &str = "location";
    pub const YEAR: &str = "year";
}

/// Errors from filter mutations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("dimension '{dimension}' expects {expected:?} keys")]
    KindMismatch { dimension: String, expected: KeyKind },

    #[error("dimension '{0}' is already defined")]
    DuplicateDimension(String),

    #[error("at most 64 dimensions are supported")]
    TooManyDimensions,
}

/// Count of passing records for one distinct key
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub key: DimensionKey,
    pub count: u64,
}

/// Snapshot of the filter state handed to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct FilterContext {
    /// Bumped on every committed mutation
    pub generation: u64,
    pub passing: usize,
    pub total: usize,
    /// Active filters in dimension definition order
    pub active: Vec<(String, FilterPredicate)>,
}

impl FilterContext {
    pub fn is_filtered(&self) -> bool {
        !self.active.is_empty()
    }
}

/// What a committed mutation did
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChangeKind {
    Set { dimension: String, predicate: FilterPredicate },
    Cleared { dimension: String },
    ClearedAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterChange {
    pub kind: FilterChangeKind,
    pub context: FilterContext,
}

impl FilterChange {
    /// Whether the change touched `dimension` directly
    pub fn affects(&self, dimension: &str) -> bool {
        match &self.kind {
            FilterChangeKind::Set { dimension: d, .. } | FilterChangeKind::Cleared { dimension: d } => {
                d == dimension
            }
            FilterChangeKind::ClearedAll => true,
        }
    }
}
