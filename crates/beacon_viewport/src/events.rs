//! Scroll and resize notifications.
//!
//! The host calls [`ViewportEvents::notify`] from its scroll and resize
//! handlers; every live [`ViewportSubscription`] receives the event.
//! Dropping a subscription unsubscribes it.

use core::pin::Pin;
use core::task::{Context, Poll};

use futures::Stream;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use parking_lot::Mutex;

/// A viewport change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    /// The page scrolled.
    Scroll,
    /// The window was resized.
    Resize,
}

/// Fan-out hub for [`ViewportEvent`]s.
#[derive(Debug, Default)]
pub struct ViewportEvents {
    subscribers: Mutex<Vec<UnboundedSender<ViewportEvent>>>,
}

impl ViewportEvents {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to future events.
    pub fn subscribe(&self) -> ViewportSubscription {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        ViewportSubscription { receiver }
    }

    /// Delivers `event` to every live subscriber, dropping closed ones.
    pub fn notify(&self, event: ViewportEvent) {
        self.subscribers
            .lock()
            .retain(|sender| sender.unbounded_send(event).is_ok());
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }
}

/// Stream of events from a [`ViewportEvents`] hub.
///
/// Ends when the hub is dropped.
#[derive(Debug)]
pub struct ViewportSubscription {
    receiver: UnboundedReceiver<ViewportEvent>,
}

impl Stream for ViewportSubscription {
    type Item = ViewportEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn every_subscriber_receives_events() {
        let events = ViewportEvents::new();
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        events.notify(ViewportEvent::Scroll);
        assert_eq!(first.next().await, Some(ViewportEvent::Scroll));
        assert_eq!(second.next().await, Some(ViewportEvent::Scroll));
    }

    #[test]
    fn dropping_a_subscription_unsubscribes() {
        let events = ViewportEvents::new();
        let subscription = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropping_the_hub_ends_streams() {
        let events = ViewportEvents::new();
        let mut subscription = events.subscribe();
        drop(events);
        assert_eq!(subscription.next().await, None);
    }
}
