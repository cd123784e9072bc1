//! Update channel for cross-view notifications.
//!
//! A typed publish/subscribe bus over `tokio::sync::broadcast`. Every open
//! view subscribes to the same topic and receives every `UpdateEvent`
//! published after it subscribed, in publication order.
//!
//! # Example
//!
//! ```ignore
//! let channel = UpdateChannel::new("sessions", 256);
//!
//! let mut sub = channel.subscribe();
//! channel.publish(UpdateEvent::Login { session });
//!
//! while let Some(event) = sub.recv().await {
//!     println!("Got: {}", event.kind());
//! }
//! ```

use registro_core::config::ReportConfig;
use registro_core::session::UpdateEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Sending side of one topic. Cheap to clone.
#[derive(Clone, Debug)]
pub struct UpdateChannel {
    topic: Arc<str>,
    sender: broadcast::Sender<UpdateEvent>,
}

impl UpdateChannel {
    /// Creates a standalone channel buffering `capacity` events per subscriber.
    pub fn new(topic: &str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            topic: Arc::from(topic),
            sender,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(&config.topic, config.channel_capacity)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Broadcasts an event; returns how many subscribers will see it.
    pub fn publish(&self, event: UpdateEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(topic = %self.topic, %kind, receivers, "published update");
                receivers
            }
            Err(_) => {
                tracing::debug!(topic = %self.topic, %kind, "published update with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> UpdateSubscription {
        UpdateSubscription {
            topic: Arc::clone(&self.topic),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving side of one topic. Dropping it unsubscribes.
#[derive(Debug)]
pub struct UpdateSubscription {
    topic: Arc<str>,
    receiver: broadcast::Receiver<UpdateEvent>,
}

impl UpdateSubscription {
    /// Waits for the next event.
    ///
    /// A subscriber that fell behind skips the overwritten events and logs
    /// how many were lost. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<UpdateEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "subscriber lagged, updates lost");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registro_core::session::{ActivityRecord, SessionRecord};

    fn activity(student: &str) -> UpdateEvent {
        UpdateEvent::NewActivity {
            activity: ActivityRecord::new(student, 0),
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_events_in_order() {
        let channel = UpdateChannel::new("sessions", 8);
        let mut first = channel.subscribe();
        let mut second = channel.subscribe();

        let login = UpdateEvent::Login {
            session: SessionRecord::open("s1", "anna", "prof", 1),
        };
        assert_eq!(channel.publish(login.clone()), 2);
        channel.publish(activity("anna"));

        for sub in [&mut first, &mut second] {
            assert_eq!(sub.recv().await, Some(login.clone()));
            assert_eq!(sub.recv().await, Some(activity("anna")));
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let channel = UpdateChannel::new("sessions", 8);
        assert_eq!(channel.publish(activity("anna")), 0);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_receiving() {
        let channel = UpdateChannel::new("sessions", 2);
        let mut sub = channel.subscribe();
        for student in ["a", "b", "c", "d"] {
            channel.publish(activity(student));
        }

        assert_eq!(sub.recv().await, Some(activity("c")));
        assert_eq!(sub.recv().await, Some(activity("d")));
    }

    #[tokio::test]
    async fn test_closed_channel_ends_subscription() {
        let channel = UpdateChannel::new("sessions", 2);
        let mut sub = channel.subscribe();
        drop(channel);
        assert_eq!(sub.recv().await, None);
    }
}
