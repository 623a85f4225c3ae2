//! Domain events and the UI cue each one maps to.
//!
//! Handlers publish; anything interested (a logger, a websocket bridge, a
//! sound layer in the client) subscribes. Nothing in the request path waits
//! on a subscriber.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::EmotionSet;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Short feedback sound or animation the client plays for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Click,
    Hover,
    Success,
    Error,
    Scan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    EmotionsSelected {
        session_id: Option<Uuid>,
        emotions: EmotionSet,
    },
    RecommendationsServed {
        emotions: EmotionSet,
        count: usize,
    },
    DiscoveryCompleted {
        emotions: EmotionSet,
        count: usize,
        stages: Vec<&'static str>,
    },
    WatchlistToggled {
        session_id: Uuid,
        movie_id: u64,
        in_watchlist: bool,
    },
    ReportGenerated {
        movie_id: u64,
    },
    LookupFailed {
        operation: &'static str,
        message: String,
    },
}

impl AppEvent {
    pub fn cue(&self) -> Cue {
        match self {
            AppEvent::EmotionsSelected { .. } => Cue::Click,
            AppEvent::RecommendationsServed { .. } => Cue::Success,
            AppEvent::DiscoveryCompleted { .. } => Cue::Scan,
            AppEvent::WatchlistToggled { in_watchlist: true, .. } => Cue::Success,
            AppEvent::WatchlistToggled { .. } => Cue::Hover,
            AppEvent::ReportGenerated { .. } => Cue::Success,
            AppEvent::LookupFailed { .. } => Cue::Error,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::EmotionsSelected { .. } => "emotions_selected",
            AppEvent::RecommendationsServed { .. } => "recommendations_served",
            AppEvent::DiscoveryCompleted { .. } => "discovery_completed",
            AppEvent::WatchlistToggled { .. } => "watchlist_toggled",
            AppEvent::ReportGenerated { .. } => "report_generated",
            AppEvent::LookupFailed { .. } => "lookup_failed",
        }
    }
}

/// Fan-out channel for `AppEvent`s
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Sends to every current subscriber. Returns how many received it;
    /// zero subscribers is fine.
    pub fn publish(&self, event: AppEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Logs every event until the bus is dropped
pub async fn log_events(mut receiver: broadcast::Receiver<AppEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                tracing::info!(event = event.name(), cue = ?event.cue(), "Event published");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        let delivered = bus.publish(AppEvent::ReportGenerated { movie_id: 1 });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = AppEvent::WatchlistToggled {
            session_id: Uuid::nil(),
            movie_id: 680,
            in_watchlist: true,
        };
        assert_eq!(bus.publish(event.clone()), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn test_cues() {
        let toggled = |in_watchlist| AppEvent::WatchlistToggled {
            session_id: Uuid::nil(),
            movie_id: 1,
            in_watchlist,
        };

        assert_eq!(toggled(true).cue(), Cue::Success);
        assert_eq!(toggled(false).cue(), Cue::Hover);
        assert_eq!(
            AppEvent::LookupFailed {
                operation: "discover",
                message: "boom".to_string()
            }
            .cue(),
            Cue::Error
        );
        assert_eq!(
            AppEvent::EmotionsSelected {
                session_id: None,
                emotions: EmotionSet::default()
            }
            .cue(),
            Cue::Click
        );
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(AppEvent::ReportGenerated { movie_id: 7 }).unwrap();
        assert_eq!(json["type"], "report_generated");
        assert_eq!(json["movie_id"], 7);
    }

    #[tokio::test]
    async fn test_log_events_stops_when_bus_dropped() {
        let bus = EventBus::new(4);
        let listener = tokio::spawn(log_events(bus.subscribe()));

        bus.publish(AppEvent::ReportGenerated { movie_id: 3 });
        drop(bus);

        tokio_test::assert_ok!(listener.await);
    }
}
