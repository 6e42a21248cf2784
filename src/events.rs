//! Typed notifications exchanged between the timeline, the route animator and
//! the application.
//!
//! Producers push into the [`EventBus`] queue; the application drains it,
//! runs its own handlers and then [`EventBus::notify`]s external subscribers
//! in registration order.

use crate::{
    prelude::{HashMap, VecDeque},
    timeline::day::DayData,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TripEvent {
    /// The current day changed, by any means
    DayChanged { day: u32, data: DayData },
    /// The whole route was requested
    ShowFullRoute,
    /// Initial load finished; sent once per application lifetime
    MapReady { load_time_ms: u64 },
    /// Autoplay started or stopped
    PlaybackChanged { playing: bool },
    /// Text for screen readers
    Announcement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DayChanged,
    ShowFullRoute,
    MapReady,
    PlaybackChanged,
    Announcement,
}

impl TripEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TripEvent::DayChanged { .. } => EventKind::DayChanged,
            TripEvent::ShowFullRoute => EventKind::ShowFullRoute,
            TripEvent::MapReady { .. } => EventKind::MapReady,
            TripEvent::PlaybackChanged { .. } => EventKind::PlaybackChanged,
            TripEvent::Announcement(_) => EventKind::Announcement,
        }
    }
}

/// Event listener callback type
pub type EventCallback = Box<dyn FnMut(&TripEvent)>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    /// `None` listens to everything
    kind: Option<EventKind>,
    callback: EventCallback,
}

/// In-process publish/subscribe channel
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    queue: VecDeque<TripEvent>,
    next_id: u64,
    delivered: HashMap<EventKind, u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TripEvent) + 'static,
    {
        self.add_subscriber(None, Box::new(callback))
    }

    /// Register a listener for one kind of event
    pub fn subscribe_to<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&TripEvent) + 'static,
    {
        self.add_subscriber(Some(kind), Box::new(callback))
    }

    fn add_subscriber(&mut self, kind: Option<EventKind>, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, kind, callback });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: TripEvent) {
        self.queue.push_back(event);
    }

    pub fn extend<I: IntoIterator<Item = TripEvent>>(&mut self, events: I) {
        self.queue.extend(events);
    }

    /// Next queued event, oldest first
    pub fn pop(&mut self) -> Option<TripEvent> {
        self.queue.pop_front()
    }

    /// Runs every matching subscriber, in registration order
    pub fn notify(&mut self, event: &TripEvent) {
        let kind = event.kind();
        *self.delivered.entry(kind).or_insert(0) += 1;
        for subscriber in &mut self.subscribers {
            if subscriber.kind.map_or(true, |k| k == kind) {
                (subscriber.callback)(event);
            }
        }
    }

    /// Get number of pending events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// How many events of a kind have been delivered so far
    pub fn delivered(&self, kind: EventKind) -> u64 {
        self.delivered.get(&kind).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.subscribers.clear();
    }
}
