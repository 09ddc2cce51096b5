//! Views for the tree census dashboard
//!
//! Charts and the map only read group counts and passing records from the
//! query coordinator, and only write through its filter operations.

pub mod charts;
pub mod colors;
pub mod controls;
mod dashboard;
pub mod map;

pub use charts::{toggle_key, ChartKind, ChartSlice, ChartView, Palette};
pub use controls::{data_counter_text, ResetTarget};
pub use dashboard::Dashboard;
pub use map::{MapPanel, MapViewport, Marker};
