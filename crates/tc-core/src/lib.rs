//! Core functionality for the tree census dashboard
//!
//! This crate provides the in-memory record store, the cross-filter query
//! engine and the shared dashboard state that every view reads from.

pub mod events;
pub mod query;
pub mod record;
pub mod state;

// Re-export commonly used types
pub use query::{
    Dimension, DimensionKey, FilterChange, FilterChangeKind, FilterContext, FilterError,
    FilterPredicate, FilterSubscriber, GeoBounds, GroupEntry, KeyKind, QueryCoordinator,
    SubscriptionId,
};
pub use record::{ColumnMapping, ParseError, RecordStore, TreeRecord};
pub use state::{DashboardState, LoadStatus};
