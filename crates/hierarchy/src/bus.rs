use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use vocab_model::{HierarchyKind, ResourceRef};

/// Mutation or intent announced to every view of a hierarchy kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyEvent {
    /// `parent == None` means a new root
    ChildCreated {
        child: ResourceRef,
        parent: Option<ResourceRef>,
    },
    NodeDeleted {
        target: ResourceRef,
    },
    /// One broader/narrower edge was unlinked; the child may keep other parents
    EdgeRemoved {
        child: ResourceRef,
        parent: ResourceRef,
    },
    SelectionRequested {
        target: ResourceRef,
    },
}

type Handler = Arc<dyn Fn(&HierarchyEvent) + Send + Sync>;

struct Listener {
    id: u64,
    kind: HierarchyKind,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    listeners: Mutex<Vec<Listener>>,
    queue: Mutex<VecDeque<(HierarchyKind, HierarchyEvent)>>,
    dispatching: AtomicBool,
    next_id: AtomicU64,
}

/// Process-wide typed publish/subscribe channel.
///
/// Handlers of one event run synchronously, in registration order, before the
/// next queued event is dispatched. Events published from inside a handler are
/// queued behind the current one.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`.
    ///
    /// The handler stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription deregisters the handler"]
    pub fn subscribe<F>(&self, kind: HierarchyKind, handler: F) -> Subscription
    where
        F: Fn(&HierarchyEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Listener {
                id,
                kind,
                handler: Arc::new(handler),
            });
        log::trace!("bus: listener {id} subscribed to {kind}");
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `event` to every listener of `kind`
    pub fn publish(&self, kind: HierarchyKind, event: HierarchyEvent) {
        {
            let mut queue = self
                .inner
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            queue.push_back((kind, event));
            if self.inner.dispatching.swap(true, Ordering::SeqCst) {
                // The active dispatcher drains the queue.
                return;
            }
        }

        let _reset = DispatchReset(&self.inner);
        loop {
            let (kind, event) = {
                let mut queue = self
                    .inner
                    .queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                match queue.pop_front() {
                    Some(next) => next,
                    None => {
                        self.inner.dispatching.store(false, Ordering::SeqCst);
                        return;
                    }
                }
            };

            let handlers: Vec<Handler> = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|l| l.kind == kind)
                .map(|l| Arc::clone(&l.handler))
                .collect();

            log::trace!("bus: {kind} event to {} listener(s): {event:?}", handlers.len());
            for handler in handlers {
                handler(&event);
            }
        }
    }

    /// Number of live listeners for `kind`
    #[must_use]
    pub fn listener_count(&self, kind: HierarchyKind) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }
}

// A handler panicking mid-dispatch discards the events still queued and
// unblocks the bus.
struct DispatchReset<'a>(&'a BusInner);

impl Drop for DispatchReset<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        let dropped = {
            let mut queue = self.0.queue.lock().unwrap_or_else(PoisonError::into_inner);
            let dropped = queue.len();
            queue.clear();
            dropped
        };
        self.0.dispatching.store(false, Ordering::SeqCst);
        log::warn!("bus: handler panicked, {dropped} queued event(s) discarded");
    }
}

/// Scoped registration on an [`EventBus`]; deregisters on drop.
#[must_use = "dropping the subscription deregisters the handler"]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Subscription {
    /// Deregister now
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        bus.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|l| l.id != self.id);
        log::trace!("bus: listener {} unsubscribed", self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
