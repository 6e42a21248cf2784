//! Simulated-time scheduler.
//!
//! One cancelable repeating ticker drives timeline autoplay; one-shot
//! visual effects (reveals, highlight expiry, popups, journey steps) wait in
//! a queue ordered by due time. Nothing here reads a clock: the owner moves
//! time forward by polling up to a deadline, which keeps every sequence
//! deterministic under test.

use crate::prelude::Duration;
use std::{cmp::Ordering, collections::BinaryHeap};

/// Stage of one step of the journey animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyPhase {
    /// Fly the camera to the segment start
    Depart,
    /// Draw the segment
    Arrive,
}

/// A delayed visual effect. Effects tagged with a redraw generation are
/// ignored once a newer redraw has happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the snake-in of a drawn route segment
    RevealSegment { generation: u64, layer_id: String },
    /// Fit the camera to the whole route
    FitRoute { generation: u64 },
    /// Remove a temporary highlight marker
    ExpireHighlight { layer_id: String },
    /// Open the popup bound to a layer
    OpenPopup { layer_id: String },
    /// Focus a location through the application entry point
    FocusLocation { key: String },
    JourneyStep {
        generation: u64,
        step: usize,
        phase: JourneyPhase,
    },
}

/// What [`Scheduler::poll`] hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired {
    Tick,
    Effect(Effect),
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    seq: u64,
    effect: Effect,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest entry, FIFO among equals
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Copy)]
struct Ticker {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    ticker: Option<Ticker>,
    queue: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now
    }

    /// (Re)starts the ticker; the first tick is one interval from now
    pub fn start_ticker(&mut self, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        self.ticker = Some(Ticker {
            interval,
            next_due: self.now + interval,
        });
    }

    pub fn cancel_ticker(&mut self) {
        self.ticker = None;
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn ticker_interval(&self) -> Option<Duration> {
        self.ticker.map(|t| t.interval)
    }

    /// Queues a one-shot effect `delay` from now
    pub fn schedule(&mut self, delay: Duration, effect: Effect) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due: self.now + delay,
            seq,
            effect,
        });
    }

    pub fn pending_effects(&self) -> usize {
        self.queue.len()
    }

    /// Drops every queued effect; the ticker is left alone
    pub fn clear_effects(&mut self) {
        self.queue.clear();
    }

    /// Pops the earliest tick or effect due at or before `deadline` and moves
    /// the clock to its due time. Effects win ties with the ticker.
    ///
    /// Callers loop until `None`, handling each item before polling again,
    /// so a handler that cancels the ticker stops later ticks in the same
    /// advance.
    pub fn poll(&mut self, deadline: Duration) -> Option<Fired> {
        let effect_due = self.queue.peek().map(|s| s.due);
        let tick_due = self.ticker.map(|t| t.next_due);

        let take_effect = match (effect_due, tick_due) {
            (Some(e), Some(t)) => e <= t,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };

        if take_effect {
            let due = effect_due?;
            if due > deadline {
                return None;
            }
            let scheduled = self.queue.pop()?;
            self.now = self.now.max(scheduled.due);
            Some(Fired::Effect(scheduled.effect))
        } else {
            let ticker = self.ticker.as_mut()?;
            if ticker.next_due > deadline {
                return None;
            }
            self.now = self.now.max(ticker.next_due);
            ticker.next_due += ticker.interval;
            Some(Fired::Tick)
        }
    }

    /// Moves the clock to `deadline` once nothing more is due before it
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}
