//! Filter subscriber trait

use super::FilterChange;

/// Trait for components that need to redraw when the filter state changes
pub trait FilterSubscriber: Send + Sync {
    /// Called synchronously after a filter mutation has been committed
    fn on_filter_change(&self, change: &FilterChange);
}

/// Handle returned by `QueryCoordinator::on_filter_changed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
