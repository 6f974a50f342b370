use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// An event that knows which named topic it is published on.
pub trait Topic {
    fn topic(&self) -> &'static str;
}

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Listener<E> {
    id: ListenerId,
    topic: String,
    handler: Handler<E>,
}

/// Synchronous publish/subscribe channel with named topics.
///
/// Constructed explicitly and shared with `Rc`. Publishing delivers to the
/// listeners registered at that moment; nothing is buffered for late
/// subscribers. Listeners may subscribe or unsubscribe from inside a handler.
pub struct EventChannel<E> {
    listeners: RefCell<Vec<Listener<E>>>,
    next_id: Cell<u32>,
}

impl<E: Topic + 'static> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Register `handler` for every event published on `topic`.
    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        handler: impl FnMut(&E) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        self.listeners.borrow_mut().push(Listener {
            id,
            topic: topic.into(),
            handler,
        });
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| l.id == id) {
            Some(idx) => {
                listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` to every listener of its topic, in subscription order.
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: &E) -> usize {
        let topic = event.topic();

        // Snapshot so handlers can touch the listener list while we dispatch.
        let handlers: Vec<Handler<E>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.topic == topic)
            .map(|l| l.handler.clone())
            .collect();

        let mut delivered = 0;
        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut f) => {
                    (&mut *f)(event);
                    delivered += 1;
                }
                Err(_) => log::warn!("event '{topic}': skipped re-entrant delivery"),
            }
        }
        delivered
    }

    /// Number of listeners registered on `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.topic == topic)
            .count()
    }

    /// Total listeners across all topics.
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Drop every listener. Called when the owning app shuts down.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E: Topic + 'static> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Every listener one caller registered, so they can be detached together.
///
/// A caller that listens on several topics subscribes through this set and
/// calls [`Subscriptions::detach`] once at teardown.
#[derive(Debug, Default)]
pub struct Subscriptions {
    ids: Vec<ListenerId>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe on `channel` and remember the listener.
    pub fn subscribe<E: Topic + 'static>(
        &mut self,
        channel: &EventChannel<E>,
        topic: impl Into<String>,
        handler: impl FnMut(&E) + 'static,
    ) -> ListenerId {
        let id = channel.subscribe(topic, handler);
        self.ids.push(id);
        id
    }

    /// Track a listener registered elsewhere.
    pub fn track(&mut self, id: ListenerId) {
        self.ids.push(id);
    }

    /// Unsubscribe everything tracked. Returns how many were still attached.
    pub fn detach<E: Topic + 'static>(&mut self, channel: &EventChannel<E>) -> usize {
        self.ids
            .drain(..)
            .filter(|&id| channel.unsubscribe(id))
            .count()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
