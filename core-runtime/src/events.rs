//! # Event Bus System
//!
//! Delivers player and streaming notifications to any number of subscribers.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Catalog**: [`PlayerEvent`], a tagged union with one variant per
//!   event name and a fixed payload per variant, and [`EventName`], the
//!   payload-free key subscribers register against
//! - **EventBus**: named-handler registry with synchronous, ordered delivery
//! - **EventStream**: broadcast-backed stream for async consumers, with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  publish   ┌────────────────────┐  handler(&event)  ┌─────────────┐
//! │ NotificationAdapt├───────────>│                    ├──────────────────>│  Handler A  │
//! └──────────────────┘            │     EventBus       │  (same thread,    └─────────────┘
//!                                 │                    │   registration    ┌─────────────┐
//! ┌──────────────────┐  publish   │  handlers by name  ├──────────────────>│  Handler B  │
//! │ PlayerLifecycle  ├───────────>│  + broadcast tail  │   order)          └─────────────┘
//! └──────────────────┘            │                    │  recv().await     ┌─────────────┐
//!                                 │                    ├──────────────────>│ EventStream │
//!                                 └────────────────────┘                   └─────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - `publish` invokes every handler registered for the event's name,
//!   synchronously, in registration order, on the publishing thread.
//! - Nothing is buffered for handlers and nothing is replayed to late
//!   subscribers.
//! - A panicking handler is isolated: the panic is caught and logged, and
//!   delivery continues with the next handler.
//! - After the handlers ran, the event is forwarded to stream subscribers.
//!
//! Publishing is safe from any thread, including the native SDK's callback
//! context. Marshaling onto a UI thread is the host's concern.
//!
//! ## Usage
//!
//! ### Subscribing a Handler
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventName, PlayerEvent};
//!
//! let bus = EventBus::default();
//! let id = bus.subscribe(EventName::ChangedPlaybackStatus, |event| {
//!     if let PlayerEvent::ChangedPlaybackStatus { playing } = event {
//!         println!("playing: {}", playing);
//!     }
//! });
//!
//! bus.publish(PlayerEvent::ChangedPlaybackStatus { playing: true });
//! bus.unsubscribe(id);
//! ```
//!
//! ### Consuming a Stream
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventName, PlayerEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus
//!     .subscribe_stream()
//!     .only(&[EventName::PlayerReady]);
//!
//! bus.publish(PlayerEvent::PlayerReady { logged_in: true });
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event, PlayerEvent::PlayerReady { logged_in: true });
//! # }
//! ```
//!
//! ## Stream Errors
//!
//! Streams use `tokio::sync::broadcast`:
//!
//! - **`RecvError::Lagged(n)`**: the stream fell behind by `n` events. Non-fatal.
//! - **`RecvError::Closed`**: the bus was dropped. Treat as shutdown.

use bridge_traits::TrackMetadata;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for stream subscribers.
///
/// Streams that fall further behind than this receive `RecvError::Lagged`.
/// Handlers are not affected: they are invoked synchronously.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Catalog
// ============================================================================

/// Name of an event, used as the subscription key.
///
/// [`EventName::as_str`] returns the stable camelCase name hosts see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    ChangedPlaybackStatus,
    SeekedToOffset,
    ChangedVolume,
    ChangedShuffleStatus,
    ChangedRepeatStatus,
    ChangedToTrack,
    FailedToPlayTrack,
    StartedPlayingTrack,
    StoppedPlayingTrack,
    SkippedToNextTrack,
    SkippedToPreviousTrack,
    ActivePlaybackDevice,
    InactivePlaybackDevice,
    PoppedQueue,
    TemporaryConnectionError,
    StreamError,
    ReceivedMessage,
    StreamDisconnected,
    PlayerReady,
    AlbumArtChange,
}

impl EventName {
    /// Every event name in the catalog.
    pub const ALL: [EventName; 20] = [
        EventName::ChangedPlaybackStatus,
        EventName::SeekedToOffset,
        EventName::ChangedVolume,
        EventName::ChangedShuffleStatus,
        EventName::ChangedRepeatStatus,
        EventName::ChangedToTrack,
        EventName::FailedToPlayTrack,
        EventName::StartedPlayingTrack,
        EventName::StoppedPlayingTrack,
        EventName::SkippedToNextTrack,
        EventName::SkippedToPreviousTrack,
        EventName::ActivePlaybackDevice,
        EventName::InactivePlaybackDevice,
        EventName::PoppedQueue,
        EventName::TemporaryConnectionError,
        EventName::StreamError,
        EventName::ReceivedMessage,
        EventName::StreamDisconnected,
        EventName::PlayerReady,
        EventName::AlbumArtChange,
    ];

    /// The camelCase name hosts subscribe to.
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::ChangedPlaybackStatus => "changedPlaybackStatus",
            EventName::SeekedToOffset => "seekedToOffset",
            EventName::ChangedVolume => "changedVolume",
            EventName::ChangedShuffleStatus => "changedShuffleStatus",
            EventName::ChangedRepeatStatus => "changedRepeatStatus",
            EventName::ChangedToTrack => "changedToTrack",
            EventName::FailedToPlayTrack => "failedToPlayTrack",
            EventName::StartedPlayingTrack => "startedPlayingTrack",
            EventName::StoppedPlayingTrack => "stoppedPlayingTrack",
            EventName::SkippedToNextTrack => "skippedToNextTrack",
            EventName::SkippedToPreviousTrack => "skippedToPreviousTrack",
            EventName::ActivePlaybackDevice => "activePlaybackDevice",
            EventName::InactivePlaybackDevice => "inactivePlaybackDevice",
            EventName::PoppedQueue => "poppedQueue",
            EventName::TemporaryConnectionError => "temporaryConnectionError",
            EventName::StreamError => "streamError",
            EventName::ReceivedMessage => "receivedMessage",
            EventName::StreamDisconnected => "streamDisconnected",
            EventName::PlayerReady => "playerReady",
            EventName::AlbumArtChange => "albumArtChange",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a name that is not in the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown event name: {0}")]
pub struct UnknownEventName(pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_string()))
    }
}

/// A published notification.
///
/// One variant per event name with a fixed payload shape; serialized as
/// `{"eventName": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "eventName", content = "data", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Native playback started or paused.
    ChangedPlaybackStatus { playing: bool },
    /// Playback position jumped (seconds).
    SeekedToOffset { offset: f64 },
    ChangedVolume { volume: f64 },
    ChangedShuffleStatus { shuffle: bool },
    ChangedRepeatStatus { repeat: bool },
    /// A different track became current; `None` when the SDK gave no metadata.
    ChangedToTrack { metadata: Option<TrackMetadata> },
    FailedToPlayTrack { url: Option<String> },
    StartedPlayingTrack { url: Option<String> },
    StoppedPlayingTrack { url: Option<String> },
    SkippedToNextTrack,
    SkippedToPreviousTrack,
    ActivePlaybackDevice,
    InactivePlaybackDevice,
    PoppedQueue,
    TemporaryConnectionError,
    StreamError { error: String },
    ReceivedMessage { message: String },
    StreamDisconnected,
    /// Login state known or changed.
    PlayerReady {
        #[serde(rename = "loggedIn")]
        logged_in: bool,
    },
    /// Cover art URL of the current album resolved.
    AlbumArtChange { url: String },
}

impl PlayerEvent {
    /// The subscription key of this event.
    pub fn name(&self) -> EventName {
        match self {
            PlayerEvent::ChangedPlaybackStatus { .. } => EventName::ChangedPlaybackStatus,
            PlayerEvent::SeekedToOffset { .. } => EventName::SeekedToOffset,
            PlayerEvent::ChangedVolume { .. } => EventName::ChangedVolume,
            PlayerEvent::ChangedShuffleStatus { .. } => EventName::ChangedShuffleStatus,
            PlayerEvent::ChangedRepeatStatus { .. } => EventName::ChangedRepeatStatus,
            PlayerEvent::ChangedToTrack { .. } => EventName::ChangedToTrack,
            PlayerEvent::FailedToPlayTrack { .. } => EventName::FailedToPlayTrack,
            PlayerEvent::StartedPlayingTrack { .. } => EventName::StartedPlayingTrack,
            PlayerEvent::StoppedPlayingTrack { .. } => EventName::StoppedPlayingTrack,
            PlayerEvent::SkippedToNextTrack => EventName::SkippedToNextTrack,
            PlayerEvent::SkippedToPreviousTrack => EventName::SkippedToPreviousTrack,
            PlayerEvent::ActivePlaybackDevice => EventName::ActivePlaybackDevice,
            PlayerEvent::InactivePlaybackDevice => EventName::InactivePlaybackDevice,
            PlayerEvent::PoppedQueue => EventName::PoppedQueue,
            PlayerEvent::TemporaryConnectionError => EventName::TemporaryConnectionError,
            PlayerEvent::StreamError { .. } => EventName::StreamError,
            PlayerEvent::ReceivedMessage { .. } => EventName::ReceivedMessage,
            PlayerEvent::StreamDisconnected => EventName::StreamDisconnected,
            PlayerEvent::PlayerReady { .. } => EventName::PlayerReady,
            PlayerEvent::AlbumArtChange { .. } => EventName::AlbumArtChange,
        }
    }

    /// Payload as a mapping of named fields (`{}` for payload-less events).
    pub fn payload(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut envelope)) => envelope
                .remove("data")
                .unwrap_or_else(|| Value::Object(Map::new())),
            _ => Value::Object(Map::new()),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::StreamError { .. } | PlayerEvent::FailedToPlayTrack { .. } => {
                EventSeverity::Error
            }
            PlayerEvent::TemporaryConnectionError | PlayerEvent::StreamDisconnected => {
                EventSeverity::Warning
            }
            PlayerEvent::PlayerReady { .. }
            | PlayerEvent::ChangedToTrack { .. }
            | PlayerEvent::AlbumArtChange { .. } => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Identifies a handler registration; pass it to [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handler invoked for each matching publication.
pub type EventHandler = Arc<dyn Fn(&PlayerEvent) + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    handler: EventHandler,
}

struct BusInner {
    handlers: RwLock<HashMap<EventName, Vec<Registration>>>,
    sender: broadcast::Sender<PlayerEvent>,
    enabled: AtomicBool,
}

/// Publish/subscribe channel keyed by [`EventName`].
///
/// Cloning is cheap; clones share the same registrations.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Per-stream buffer; streams lagging further behind
    ///   receive `RecvError::Lagged`. Handlers are unaffected.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                handlers: RwLock::new(HashMap::new()),
                sender,
                enabled: AtomicBool::new(true),
            }),
        }
    }

    /// Registers `handler` for every future publication of `name`.
    pub fn subscribe<F>(&self, name: EventName, handler: F) -> SubscriptionId
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.inner
            .handlers
            .write()
            .entry(name)
            .or_default()
            .push(Registration {
                id,
                handler: Arc::new(handler),
            });
        debug!(event = %name, subscription = %id, "Handler subscribed");
        id
    }

    /// Removes a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.inner.handlers.write();
        for registrations in handlers.values_mut() {
            if let Some(index) = registrations.iter().position(|r| r.id == id) {
                registrations.remove(index);
                debug!(subscription = %id, "Handler unsubscribed");
                return true;
            }
        }
        false
    }

    /// Publishes an event.
    ///
    /// Invokes the handlers registered for the event's name in registration
    /// order, then forwards the event to stream subscribers. Returns the
    /// number of handlers that completed without panicking. Returns `0`
    /// without delivering anything while the bus is disabled.
    pub fn publish(&self, event: PlayerEvent) -> usize {
        let name = event.name();
        if !self.is_enabled() {
            trace!(event = %name, "Event bus disabled, event dropped");
            return 0;
        }

        // Snapshot so handlers may subscribe or unsubscribe while being called.
        let handlers: Vec<(SubscriptionId, EventHandler)> = self
            .inner
            .handlers
            .read()
            .get(&name)
            .map(|registrations| {
                registrations
                    .iter()
                    .map(|r| (r.id, Arc::clone(&r.handler)))
                    .collect()
            })
            .unwrap_or_default();

        match event.severity() {
            EventSeverity::Error | EventSeverity::Warning => {
                warn!(event = %name, handlers = handlers.len(), "Publishing event")
            }
            EventSeverity::Info => {
                debug!(event = %name, handlers = handlers.len(), "Publishing event")
            }
            EventSeverity::Debug => {
                trace!(event = %name, handlers = handlers.len(), "Publishing event")
            }
        }

        let mut delivered = 0;
        for (id, handler) in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    error!(event = %name, subscription = %id, "Event handler panicked, continuing delivery")
                }
            }
        }

        if self.inner.sender.receiver_count() > 0 {
            // Only fails when every receiver was dropped in the meantime.
            let _ = self.inner.sender.send(event);
        }

        delivered
    }

    /// Creates a stream receiving every event published from now on.
    pub fn subscribe_stream(&self) -> EventStream {
        EventStream::new(self.inner.sender.subscribe())
    }

    /// Number of handlers registered for `name`.
    pub fn handler_count(&self, name: EventName) -> usize {
        self.inner
            .handlers
            .read()
            .get(&name)
            .map_or(0, |registrations| registrations.len())
    }

    /// Number of live stream subscribers.
    pub fn stream_subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    /// Enables or disables delivery. Registrations are kept either way.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler_count: usize = self.inner.handlers.read().values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("handler_count", &handler_count)
            .field("stream_subscriber_count", &self.stream_subscriber_count())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&PlayerEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, PlayerEvent};
///
/// let bus = EventBus::default();
/// let errors = bus
///     .subscribe_stream()
///     .filter(|event| matches!(event, PlayerEvent::StreamError { .. }));
/// ```
pub struct EventStream {
    receiver: Receiver<PlayerEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<PlayerEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter; only matching events are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlayerEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Restricts the stream to the given event names.
    pub fn only(self, names: &[EventName]) -> Self {
        let names = names.to_vec();
        self.filter(move |event| names.contains(&event.name()))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the stream fell behind by `n` events.
    /// Returns `RecvError::Closed` if the bus was dropped.
    pub async fn recv(&mut self) -> Result<PlayerEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<PlayerEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn matches(&self, event: &PlayerEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> EventHandler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_factory = Arc::clone(&log);
        let make = move |tag: &str| -> EventHandler {
            let log = Arc::clone(&log_for_factory);
            let tag = tag.to_string();
            Arc::new(move |event: &PlayerEvent| {
                log.lock().unwrap().push(format!("{}:{}", tag, event.name()));
            })
        };
        (log, make)
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::default();
        let (log, make) = recorder();

        let first = make("first");
        let second = make("second");
        let third = make("third");
        bus.subscribe(EventName::PoppedQueue, move |e| first(e));
        bus.subscribe(EventName::PoppedQueue, move |e| second(e));
        bus.subscribe(EventName::PoppedQueue, move |e| third(e));

        let delivered = bus.publish(PlayerEvent::PoppedQueue);

        assert_eq!(delivered, 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "first:poppedQueue",
                "second:poppedQueue",
                "third:poppedQueue"
            ]
        );
    }

    #[test]
    fn test_handlers_only_receive_their_event_name() {
        let bus = EventBus::default();
        let (log, make) = recorder();
        let handler = make("ready");
        bus.subscribe(EventName::PlayerReady, move |e| handler(e));

        assert_eq!(bus.publish(PlayerEvent::StreamDisconnected), 0);
        assert_eq!(bus.publish(PlayerEvent::PlayerReady { logged_in: false }), 1);

        assert_eq!(*log.lock().unwrap(), vec!["ready:playerReady"]);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let bus = EventBus::default();
        bus.publish(PlayerEvent::SkippedToNextTrack);

        let (log, make) = recorder();
        let handler = make("late");
        bus.subscribe(EventName::SkippedToNextTrack, move |e| handler(e));

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus = EventBus::default();
        let (log, make) = recorder();

        let before = make("before");
        let after = make("after");
        bus.subscribe(EventName::StreamError, move |e| before(e));
        bus.subscribe(EventName::StreamError, |_| panic!("subscriber bug"));
        bus.subscribe(EventName::StreamError, move |e| after(e));

        let delivered = bus.publish(PlayerEvent::StreamError {
            error: "decoder stalled".to_string(),
        });

        assert_eq!(delivered, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before:streamError", "after:streamError"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::default();
        let id = bus.subscribe(EventName::ChangedVolume, |_| {});
        assert_eq!(bus.handler_count(EventName::ChangedVolume), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.handler_count(EventName::ChangedVolume), 0);
        assert_eq!(bus.publish(PlayerEvent::ChangedVolume { volume: 0.5 }), 0);
    }

    #[test]
    fn test_handler_may_subscribe_during_publish() {
        let bus = EventBus::default();
        let bus_in_handler = bus.clone();
        bus.subscribe(EventName::PoppedQueue, move |_| {
            bus_in_handler.subscribe(EventName::PoppedQueue, |_| {});
        });

        assert_eq!(bus.publish(PlayerEvent::PoppedQueue), 1);
        assert_eq!(bus.handler_count(EventName::PoppedQueue), 2);
    }

    #[test]
    fn test_disabled_bus_drops_events() {
        let bus = EventBus::default();
        let (log, make) = recorder();
        let handler = make("muted");
        bus.subscribe(EventName::PlayerReady, move |e| handler(e));

        bus.set_enabled(false);
        assert_eq!(bus.publish(PlayerEvent::PlayerReady { logged_in: true }), 0);
        assert!(log.lock().unwrap().is_empty());

        bus.set_enabled(true);
        assert_eq!(bus.publish(PlayerEvent::PlayerReady { logged_in: true }), 1);
    }

    #[tokio::test]
    async fn test_stream_receives_after_handlers() {
        let bus = EventBus::new(10);
        let mut stream = bus.subscribe_stream();
        assert_eq!(bus.stream_subscriber_count(), 1);

        let event = PlayerEvent::ChangedShuffleStatus { shuffle: true };
        bus.publish(event.clone());

        assert_eq!(stream.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_stream_filter() {
        let bus = EventBus::new(10);
        let mut stream = bus.subscribe_stream().only(&[EventName::AlbumArtChange]);

        bus.publish(PlayerEvent::PoppedQueue);
        bus.publish(PlayerEvent::AlbumArtChange {
            url: "https://i.scdn.co/image/cover".to_string(),
        });

        let received = stream.recv().await.unwrap();
        assert_eq!(received.name(), EventName::AlbumArtChange);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_stream() {
        let bus = EventBus::new(2);
        let mut stream = bus.subscribe_stream();

        for offset in 0..5 {
            bus.publish(PlayerEvent::SeekedToOffset {
                offset: offset as f64,
            });
        }

        let result = stream.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_publish_from_other_threads() {
        let bus = EventBus::default();
        let (log, make) = recorder();
        let handler = make("any");
        bus.subscribe(EventName::ReceivedMessage, move |e| handler(e));

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let bus = bus.clone();
                std::thread::spawn(move || {
                    bus.publish(PlayerEvent::ReceivedMessage {
                        message: format!("worker-{}", i),
                    });
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_event_names_round_trip() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>().unwrap(), name);
        }
        assert!("playbackStarted".parse::<EventName>().is_err());
    }

    #[test]
    fn test_serialized_envelope() {
        let json = serde_json::to_value(PlayerEvent::PlayerReady { logged_in: true }).unwrap();
        assert_eq!(json["eventName"], "playerReady");
        assert_eq!(json["data"]["loggedIn"], true);

        let json = serde_json::to_value(PlayerEvent::PoppedQueue).unwrap();
        assert_eq!(json["eventName"], "poppedQueue");
    }

    #[test]
    fn test_payload_mapping() {
        let payload = PlayerEvent::FailedToPlayTrack { url: None }.payload();
        assert!(payload["url"].is_null());

        let payload = PlayerEvent::StreamDisconnected.payload();
        assert_eq!(payload, Value::Object(Map::new()));

        let payload = PlayerEvent::ChangedToTrack { metadata: None }.payload();
        assert!(payload.as_object().unwrap().contains_key("metadata"));
    }

    #[test]
    fn test_event_severity() {
        let error = PlayerEvent::StreamError {
            error: "x".to_string(),
        };
        assert_eq!(error.severity(), EventSeverity::Error);
        assert_eq!(
            PlayerEvent::TemporaryConnectionError.severity(),
            EventSeverity::Warning
        );
        assert_eq!(
            PlayerEvent::PlayerReady { logged_in: true }.severity(),
            EventSeverity::Info
        );
        assert_eq!(
            PlayerEvent::ChangedVolume { volume: 1.0 }.severity(),
            EventSeverity::Debug
        );
    }
}
