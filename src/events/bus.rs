// src/events/bus.rs
//
// Synchronous in-process event bus.
//
// Handlers execute immediately, in subscription order, on the emitting
// thread. A panicking handler is isolated so the remaining handlers still
// run. No async, no queues.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::events::types::DomainEvent;

/// Type-erased handler; downcast to the concrete event type inside.
type EventHandler = Box<dyn Fn(&dyn Any) + Send + Sync>;

pub struct EventBus {
    handlers: Arc<RwLock<HashMap<TypeId, Vec<EventHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a specific event type. Handlers run in the order they
    /// were subscribed.
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();

        let wrapped: EventHandler = Box::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                log::error!(
                    "failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        let mut handlers = self.handlers.write().unwrap();
        handlers.entry(type_id).or_default().push(wrapped);
    }

    /// Emit an event and run every handler registered for its type.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let type_id = TypeId::of::<E>();
        let handlers = self.handlers.read().unwrap();
        let event_handlers = handlers.get(&type_id);

        log::debug!(
            "event {} (id: {}) | {} handlers",
            event.event_type(),
            event.event_id(),
            event_handlers.map(|h| h.len()).unwrap_or(0)
        );

        if let Some(handlers) = event_handlers {
            for (idx, handler) in handlers.iter().enumerate() {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    handler(&event as &dyn Any);
                }));

                if result.is_err() {
                    log::error!("handler {} for {} panicked", idx, event.event_type());
                }
            }
        }
    }

    /// Number of subscribers for an event type.
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let type_id = TypeId::of::<E>();
        let handlers = self.handlers.read().unwrap();
        handlers.get(&type_id).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::{GenreAdded, TitleAdded};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe::<GenreAdded, _>(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(GenreAdded::new(1, "Drama".to_string()));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handlers_execute_in_subscription_order() {
        let bus = EventBus::new();
        let sequence = Arc::new(RwLock::new(Vec::new()));

        for n in 1..=3 {
            let seq = Arc::clone(&sequence);
            bus.subscribe::<TitleAdded, _>(move |_| {
                seq.write().unwrap().push(n);
            });
        }

        bus.emit(TitleAdded::new(1, "Test Film".to_string(), "Drama".to_string()));

        assert_eq!(*sequence.read().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subscriber_count_is_per_event_type() {
        let bus = EventBus::new();

        bus.subscribe::<GenreAdded, _>(|_| {});
        bus.subscribe::<GenreAdded, _>(|_| {});

        assert_eq!(bus.subscriber_count::<GenreAdded>(), 2);
        assert_eq!(bus.subscriber_count::<TitleAdded>(), 0);
    }

    #[test]
    fn test_handler_panic_does_not_break_bus() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<GenreAdded, _>(|_| {
            panic!("intentional panic");
        });

        let counter_clone = Arc::clone(&counter);
        bus.subscribe::<GenreAdded, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(GenreAdded::new(1, "Drama".to_string()));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
