//! Timeline play/pause state machine.
//!
//! `TimelineState` (current day and playback) is owned here and nowhere
//! else. Every change of the current day queues exactly one
//! [`TripEvent::DayChanged`]; the owner drains the queue with
//! [`TimelineController::drain_events`] after each call.

use crate::{
    animation::scheduler::Scheduler,
    core::{config::TimelineConfig, constants::TRIP_DAYS},
    data::TravelData,
    events::TripEvent,
    prelude::{Arc, Duration, VecDeque},
    timeline::day::{format_date, DayData},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// What the timeline panel shows for the current state
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineView {
    pub day_label: String,
    pub date_label: String,
    pub location_name: String,
    pub play_label: &'static str,
    /// Marker days with whether the timeline has reached them
    pub markers: Vec<(u32, bool)>,
    /// 0.0 on day 1, 1.0 on the last day
    pub progress: f32,
}

pub struct TimelineController {
    data: Arc<TravelData>,
    config: TimelineConfig,
    current_day: u32,
    state: PlaybackState,
    play_interval: Duration,
    events: VecDeque<TripEvent>,
}

impl TimelineController {
    pub fn new(data: Arc<TravelData>, config: TimelineConfig) -> Self {
        let play_interval =
            Duration::from_millis(config.clamp_interval(config.play_interval_ms));
        Self {
            data,
            config,
            current_day: 1,
            state: PlaybackState::Idle,
            play_interval,
            events: VecDeque::new(),
        }
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn play_interval(&self) -> Duration {
        self.play_interval
    }

    /// Resolved data for the current day
    pub fn current_day_data(&self) -> DayData {
        DayData::resolve(self.current_day, &self.data)
    }

    /// Hands over the notifications queued since the last call
    pub fn drain_events(&mut self) -> Vec<TripEvent> {
        self.events.drain(..).collect()
    }

    pub fn toggle(&mut self, scheduler: &mut Scheduler) {
        match self.state {
            PlaybackState::Idle => self.play(scheduler),
            PlaybackState::Playing => self.pause(scheduler),
        }
    }

    /// Starts autoplay. From the last day, the timeline is reset first.
    pub fn play(&mut self, scheduler: &mut Scheduler) {
        if self.is_playing() {
            return;
        }
        if self.current_day >= TRIP_DAYS {
            self.reset(scheduler);
        }

        self.state = PlaybackState::Playing;
        scheduler.start_ticker(self.play_interval);
        log::debug!("Autoplay started at day {}", self.current_day);
        self.events.push_back(TripEvent::PlaybackChanged { playing: true });
        self.announce("Timeline playback started");
    }

    pub fn pause(&mut self, scheduler: &mut Scheduler) {
        if !self.is_playing() {
            return;
        }

        self.state = PlaybackState::Idle;
        scheduler.cancel_ticker();
        log::debug!("Autoplay paused at day {}", self.current_day);
        self.events.push_back(TripEvent::PlaybackChanged { playing: false });
        self.announce("Timeline playback paused");
    }

    /// One autoplay step. Landing on the last day stops playback.
    pub fn tick(&mut self, scheduler: &mut Scheduler) {
        if !self.is_playing() {
            log::debug!("Ignoring stale autoplay tick");
            return;
        }
        if self.current_day >= TRIP_DAYS {
            self.pause(scheduler);
            return;
        }

        self.set_day(self.current_day + 1);
        if self.current_day >= TRIP_DAYS {
            self.pause(scheduler);
        }
    }

    /// Pauses and returns to day 1
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        self.pause(scheduler);
        self.set_day(1);
        self.announce("Timeline reset to beginning");
    }

    /// Moves to `day`, clamped to the trip. Always notifies, even when the
    /// day does not change; playback state is left alone.
    pub fn jump_to_day(&mut self, day: i64) {
        let clamped = day.clamp(1, TRIP_DAYS as i64) as u32;
        if clamped as i64 != day {
            log::debug!("Day {} clamped to {}", day, clamped);
        }
        self.set_day(clamped);
    }

    pub fn next_day(&mut self) {
        if self.current_day < TRIP_DAYS {
            self.set_day(self.current_day + 1);
        }
    }

    pub fn previous_day(&mut self) {
        if self.current_day > 1 {
            self.set_day(self.current_day - 1);
        }
    }

    /// Changes the autoplay interval, clamped to the configured bounds.
    /// A running ticker restarts at the new pace.
    pub fn set_play_speed(&mut self, interval_ms: u64, scheduler: &mut Scheduler) {
        let clamped = self.config.clamp_interval(interval_ms);
        if clamped != interval_ms {
            log::warn!(
                "Play interval {}ms out of range, using {}ms",
                interval_ms,
                clamped
            );
        }
        self.play_interval = Duration::from_millis(clamped);
        if self.is_playing() {
            scheduler.start_ticker(self.play_interval);
        }
    }

    pub fn show_full_route(&mut self) {
        self.events.push_back(TripEvent::ShowFullRoute);
        self.announce("Showing complete travel route");
    }

    pub fn view(&self) -> TimelineView {
        let data = self.current_day_data();
        let markers = self
            .data
            .policy()
            .transition_days()
            .into_iter()
            .map(|day| (day, self.current_day >= day))
            .collect();

        TimelineView {
            day_label: format!("Day {}", self.current_day),
            date_label: format_date(data.date),
            location_name: self.data.display_name(&data.location).to_string(),
            play_label: if self.is_playing() { "Pause" } else { "Play Route" },
            markers,
            progress: (self.current_day - 1) as f32 / (TRIP_DAYS - 1) as f32,
        }
    }

    fn set_day(&mut self, day: u32) {
        self.current_day = day;
        let data = DayData::resolve(day, &self.data);
        self.events.push_back(TripEvent::DayChanged { day, data });
    }

    fn announce(&mut self, message: &str) {
        self.events
            .push_back(TripEvent::Announcement(message.to_string()));
    }
}
