//! Generic multicast fan-out.
//!
//! A [`Broadcaster`] accepts values from a single producer and delivers each
//! one to every currently registered subscriber over that subscriber's own
//! unbounded channel. Publishing never blocks and never waits for consumers;
//! a permanently stalled subscriber grows its buffer without bound. That is a
//! deliberate tradeoff: non-blocking publish semantics in exchange for memory
//! growth risk under a stalled consumer.
//!
//! A publish with zero subscribers drops the value; nothing is queued for
//! future subscribers.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;
use uuid::Uuid;

/// One registered subscriber's send side.
struct Outlet<T> {
    id: Uuid,
    sender: mpsc::UnboundedSender<T>,
}

type Registry<T> = Mutex<Vec<Outlet<T>>>;

/// Single-producer, many-subscriber fan-out point.
pub struct Broadcaster<T> {
    registry: Arc<Registry<T>>,
}

impl<T: Clone> Broadcaster<T> {
    /// Create a broadcaster with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a new subscriber and return its private sequence.
    ///
    /// Each call creates an independent subscription with a fresh identity.
    /// Values published before this call are not replayed.
    pub fn subscribe(&self) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.registry.lock().push(Outlet { id, sender });
        trace!(%id, "subscriber registered");
        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver a value to every currently registered subscriber.
    ///
    /// Subscribers whose receiving side has gone away are pruned here; a
    /// racing drop at worst sends into a channel that is being torn down,
    /// which is not an error.
    pub fn publish(&self, value: T) {
        let mut outlets = self.registry.lock();
        if outlets.is_empty() {
            return;
        }
        outlets.retain(|outlet| outlet.sender.send(value.clone()).is_ok());
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().len()
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.registry.lock().len())
            .finish()
    }
}

/// A subscriber's private, ordered sequence of published values.
///
/// Values arrive in publish order. Dropping the subscription removes it from
/// the broadcaster's registry; no further values are delivered to it and
/// other subscribers are unaffected.
pub struct Subscription<T> {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<T>,
    registry: Weak<Registry<T>>,
}

impl<T> Subscription<T> {
    /// Opaque identity of this subscription.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Receive the next buffered value, waiting if none is pending.
    ///
    /// Returns `None` once the broadcaster has been dropped and the buffer is
    /// drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().retain(|outlet| outlet.id != self.id);
            trace!(id = %self.id, "subscriber removed");
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
