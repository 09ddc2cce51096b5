use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

type SharedHandler = Arc<Mutex<Box<dyn EventHandler>>>;

/// Dashboard-wide event bus for load lifecycle events
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<SharedHandler>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Load lifecycle events
pub mod events {
    use super::Event;

    /// The tree dataset finished loading
    #[derive(Debug, Clone)]
    pub struct DatasetLoaded {
        pub source_name: String,
        pub row_count: usize,
    }

    /// The tree dataset could not be loaded; charts and markers stay empty
    #[derive(Debug, Clone)]
    pub struct DatasetLoadFailed {
        pub source_name: String,
        pub error: String,
    }

    /// Borough boundaries are available for region filtering
    #[derive(Debug, Clone)]
    pub struct BoundaryLoaded {
        pub source_name: String,
        pub region_count: usize,
    }

    /// Borough boundaries failed to load; region filtering is off for the session
    #[derive(Debug, Clone)]
    pub struct BoundaryUnavailable {
        pub source_name: String,
        pub error: String,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        DatasetLoaded,
        DatasetLoadFailed,
        BoundaryLoaded,
        BoundaryUnavailable
    );
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(Arc::new(Mutex::new(handler)));
    }

    /// Publish an event to every handler subscribed to its type.
    ///
    /// Handlers run with the bus unlocked, so they may subscribe or publish.
    /// A handler already running further up the stack is skipped.
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let targets: Vec<SharedHandler> = self.handlers.lock().get(&type_id).cloned().unwrap_or_default();

        for handler in targets {
            match handler.try_lock() {
                Some(mut handler) => handler.handle(&event),
                None => tracing::warn!("Skipping re-entrant event handler"),
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts a closure into an `EventHandler`
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}
