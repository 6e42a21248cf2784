//! The composition root.
//!
//! [`MapApplication`] owns the map handle, the scheduler, both controllers
//! and the event bus. Controllers never see each other: the timeline queues
//! [`TripEvent`]s, and [`MapApplication::dispatch`] hands each one to the
//! application's own handler, then the route animator, then external
//! subscribers.

use crate::{
    animation::{
        route::AnimationManager,
        scheduler::{Effect, Fired, Scheduler},
    },
    core::{
        config::TripConfig,
        constants::*,
        geo::LatLngBounds,
        map::{Map, MapEvent},
    },
    data::TravelData,
    events::{EventBus, EventKind, SubscriptionId, TripEvent},
    input::{
        events::InputEvent,
        handler::{Command, InputHandler},
    },
    layers::{
        marker::CircleMarker,
        vector::{PointStyle, Polyline, SerializableColor},
    },
    prelude::{Arc, Duration},
    rendering::context::RenderContext,
    timeline::controller::TimelineController,
    Result, TripError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

/// An entry in the in-memory error log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub message: String,
}

/// Load and usage figures collected while the application runs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppMetrics {
    pub load_time_ms: Option<u64>,
    /// Milliseconds from construction to the first user interaction
    pub first_interaction_ms: Option<u64>,
    pub interactions: u64,
    pub popups_opened: u64,
    pub last_interaction: Option<String>,
}

pub struct MapApplication {
    data: Arc<TravelData>,
    config: TripConfig,
    map: Map,
    scheduler: Scheduler,
    timeline: TimelineController,
    animator: AnimationManager,
    bus: EventBus,
    input: InputHandler,
    created_at: instant::Instant,
    initialized: bool,
    page_visible: bool,
    metrics: AppMetrics,
    errors: Vec<ErrorRecord>,
    /// Location keys whose marker is inside the current view
    visible_markers: Vec<String>,
    hovered_marker: Option<String>,
}

impl MapApplication {
    /// Builds the map and loads every location as a marker. Fails when the
    /// map container is missing.
    pub fn new(mut config: TripConfig, data: TravelData) -> Result<Self> {
        let created_at = instant::Instant::now();
        config.normalize();

        let mut map = Map::new(&config.map)?;
        map.set_easing(config.animation.easing);
        config.capabilities.report();

        let data = Arc::new(data);
        let timeline = TimelineController::new(Arc::clone(&data), config.timeline.clone());
        let animator = AnimationManager::new(
            Arc::clone(&data),
            config.animation.clone(),
            config.capabilities,
        );

        let mut app = Self {
            data,
            config,
            map,
            scheduler: Scheduler::new(),
            timeline,
            animator,
            bus: EventBus::new(),
            input: InputHandler::new(),
            created_at,
            initialized: false,
            page_visible: true,
            metrics: AppMetrics::default(),
            errors: Vec::new(),
            visible_markers: Vec::new(),
            hovered_marker: None,
        };
        app.load_markers();
        Ok(app)
    }

    /// Parses the travel data and builds the application
    pub fn from_json(config: TripConfig, travel_json: &str) -> Result<Self> {
        let data = TravelData::from_json(travel_json)?;
        Self::new(config, data)
    }

    fn load_markers(&mut self) {
        let data = Arc::clone(&self.data);
        for location in data.locations() {
            let style = PointStyle {
                fill_color: SerializableColor::from_hex_or(
                    location.color(),
                    SerializableColor::rgb(0x66, 0x7e, 0xea),
                ),
                radius: location.marker_radius() as f32,
                ..PointStyle::default()
            };
            let marker = CircleMarker::new(location.key.clone(), location.coords)
                .with_style(style)
                .with_popup(location.popup_summary());

            if let Err(e) = self.map.add_layer(Box::new(marker)) {
                self.log_error(&format!("adding marker '{}'", location.key), &e);
            }
        }
        log::info!("Loaded {} location markers", self.map.layer_count());
    }

    /// Finishes loading: fits the view to every marker, announces
    /// [`TripEvent::MapReady`] and focuses the first location a moment
    /// later. Runs once; later calls only warn.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            log::warn!("Map application already initialized");
            return Ok(());
        }
        self.initialized = true;

        self.fit_to_markers();
        if let Some(first) = self.data.locations().first() {
            self.scheduler.schedule(
                Duration::from_millis(INITIAL_FOCUS_DELAY_MS),
                Effect::FocusLocation {
                    key: first.key.clone(),
                },
            );
        }

        let load_time_ms = self.created_at.elapsed().as_millis() as u64;
        self.metrics.load_time_ms = Some(load_time_ms);
        log::info!("Map initialized in {}ms", load_time_ms);

        self.bus.emit(TripEvent::MapReady { load_time_ms });
        self.dispatch();
        self.process_map_events();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn fit_to_markers(&mut self) {
        let coords: Vec<_> = self.data.locations().iter().map(|l| l.coords).collect();
        if let Some(bounds) = LatLngBounds::from_points(coords.iter()) {
            self.map
                .fit_bounds(&bounds.pad(FIT_PADDING_RATIO), 0.0, Duration::ZERO);
        }
    }

    /// Feeds one user interaction through the input handler
    pub fn handle_input(&mut self, event: InputEvent) {
        if event.is_user_interaction() {
            self.record_interaction(event.interaction_name());
        }
        for command in self.input.handle_event(&event) {
            self.execute(command);
        }
        self.dispatch();
        self.process_map_events();
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::TogglePlayback => self.timeline.toggle(&mut self.scheduler),
            Command::Reset => self.timeline.reset(&mut self.scheduler),
            Command::JumpToDay(day) => self.timeline.jump_to_day(day),
            Command::NextDay => self.timeline.next_day(),
            Command::PreviousDay => self.timeline.previous_day(),
            Command::ShowFullRoute => self.timeline.show_full_route(),
            Command::SelectLocation(key) => {
                if !self.map.open_popup(&key) {
                    log::warn!("No marker for location '{}'", key);
                }
            }
            Command::Resize(size) => self.map.set_size(size),
            Command::SetPageVisible(visible) => self.set_page_visible(visible),
        }
    }

    /// Moves simulated time forward: fires due ticks and effects in order,
    /// advancing camera flights between them.
    pub fn advance(&mut self, delta: Duration) -> Result<()> {
        let deadline = self.scheduler.now() + delta;
        let mut cursor = self.scheduler.now();

        while let Some(fired) = self.scheduler.poll(deadline) {
            let now = self.scheduler.now();
            self.map.update(now.saturating_sub(cursor))?;
            cursor = now;

            match fired {
                Fired::Tick => self.timeline.tick(&mut self.scheduler),
                Fired::Effect(effect) => self.apply_effect(effect),
            }
            self.dispatch();
        }

        self.scheduler.settle(deadline);
        self.map.update(deadline.saturating_sub(cursor))?;
        self.process_map_events();
        Ok(())
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::OpenPopup { layer_id } => {
                self.map.open_popup(&layer_id);
            }
            Effect::FocusLocation { key } => self.focus_location(&key),
            effect => {
                if let Err(e) =
                    self.animator
                        .apply_effect(&effect, &mut self.map, &mut self.scheduler)
                {
                    self.log_error("route animation", &e);
                }
            }
        }
    }

    /// Delivers every queued notification. Each event goes to the
    /// application first, then the route animator, then subscribers;
    /// events queued while handling are delivered in the same call.
    pub fn dispatch(&mut self) {
        self.bus.extend(self.timeline.drain_events());
        while let Some(event) = self.bus.pop() {
            if let Err(e) = self.handle_event(&event) {
                self.log_error(&format!("handling {:?}", event.kind()), &e);
            }
            self.bus.notify(&event);
            self.bus.extend(self.timeline.drain_events());
        }
    }

    fn handle_event(&mut self, event: &TripEvent) -> Result<()> {
        match event {
            TripEvent::DayChanged { day, data } => {
                self.focus_location(&data.location);
                self.animator
                    .on_day_changed(*day, data, &mut self.map, &mut self.scheduler)
            }
            TripEvent::ShowFullRoute => self
                .animator
                .show_complete_route(&mut self.map, &mut self.scheduler),
            TripEvent::MapReady { .. } => self
                .animator
                .on_map_ready(&mut self.map, &mut self.scheduler),
            TripEvent::PlaybackChanged { .. } => Ok(()),
            TripEvent::Announcement(text) => {
                log::debug!("Announcement: {}", text);
                Ok(())
            }
        }
    }

    fn process_map_events(&mut self) {
        for event in self.map.process_events() {
            match event {
                MapEvent::ZoomEnd { zoom } => self.scale_markers(zoom),
                MapEvent::MoveEnd { .. } => self.update_visible_markers(),
                MapEvent::PopupOpen { layer_id } => {
                    self.metrics.popups_opened += 1;
                    log::debug!("Popup opened on '{}'", layer_id);
                }
                MapEvent::ViewChanged { .. }
                | MapEvent::LayerAdd { .. }
                | MapEvent::LayerRemove { .. } => {}
            }
        }
    }

    fn scale_markers(&mut self, zoom: f64) {
        let data = Arc::clone(&self.data);
        for location in data.locations() {
            self.map.with_layer_mut(&location.key, |layer| {
                if let Some(marker) = layer.as_any_mut().downcast_mut::<CircleMarker>() {
                    marker.scale_for_zoom(zoom);
                }
            });
        }
    }

    fn update_visible_markers(&mut self) {
        let viewport = self.map.viewport();
        self.visible_markers = self
            .data
            .locations()
            .iter()
            .filter(|l| self.map.has_layer(&l.key) && viewport.contains(&l.coords))
            .map(|l| l.key.clone())
            .collect();
        log::debug!("{} markers in view", self.visible_markers.len());
    }

    /// Flies to a location and opens its marker popup once the camera
    /// arrives. Unknown keys are logged and ignored.
    pub fn focus_location(&mut self, key: &str) {
        if let Err(e) = self.try_focus_location(key) {
            log::warn!("Cannot focus: {}", e);
        }
    }

    /// Like [`focus_location`](Self::focus_location), reporting unknown keys
    pub fn try_focus_location(&mut self, key: &str) -> Result<()> {
        let location = self
            .data
            .location(key)
            .ok_or_else(|| TripError::UnknownLocation(key.to_string()))?;
        let coords = location.coords;
        let zoom = if location.is_base_location {
            FOCUS_ZOOM_BASE
        } else {
            FOCUS_ZOOM_STOP
        };

        let duration = Duration::from_millis(self.config.animation.focus_duration_ms);
        self.map.fly_to(coords, zoom, duration);
        self.scheduler.schedule(
            duration,
            Effect::OpenPopup {
                layer_id: key.to_string(),
            },
        );
        Ok(())
    }

    /// Draws the whole route and fits the camera to it
    pub fn show_full_route(&mut self) {
        self.record_interaction("show_full_route");
        self.timeline.show_full_route();
        self.dispatch();
    }

    /// Starts the sequential journey animation
    pub fn play_route_animation(&mut self) -> Result<()> {
        self.record_interaction("play_route_animation");
        self.animator
            .play_route_animation(&mut self.map, &mut self.scheduler)
    }

    pub fn set_play_speed(&mut self, interval_ms: u64) {
        self.timeline.set_play_speed(interval_ms, &mut self.scheduler);
    }

    /// Hiding the page stops the journey animation
    pub fn set_page_visible(&mut self, visible: bool) {
        self.page_visible = visible;
        if !visible && self.animator.animation_state().is_animating {
            log::debug!("Page hidden, stopping journey animation");
            self.animator.stop_animation(&mut self.map);
        }
    }

    /// Whether anything is still moving without further input: autoplay,
    /// a camera flight, pending effects or a segment being drawn in
    pub fn is_animating(&self) -> bool {
        let snaking = self.animator.overlay_layers().iter().any(|id| {
            self.map
                .get_layer(id)
                .and_then(|layer| layer.as_any().downcast_ref::<Polyline>())
                .is_some_and(|line| line.is_snaking())
        });
        snaking
            || self.timeline.is_playing()
            || self.map.is_flying()
            || self.scheduler.pending_effects() > 0
    }

    pub fn is_page_visible(&self) -> bool {
        self.page_visible
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TripEvent) + 'static,
    {
        self.bus.subscribe(callback)
    }

    pub fn subscribe_to<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&TripEvent) + 'static,
    {
        self.bus.subscribe_to(kind, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn record_interaction(&mut self, name: &str) {
        if self.metrics.first_interaction_ms.is_none() {
            let elapsed = self.created_at.elapsed().as_millis() as u64;
            self.metrics.first_interaction_ms = Some(elapsed);
            log::info!("First user interaction after {}ms", elapsed);
        }
        self.metrics.interactions += 1;
        self.metrics.last_interaction = Some(name.to_string());
        log::debug!("Interaction: {}", name);
    }

    /// Logs an error and keeps it in the in-memory error log
    pub fn log_error(&mut self, context: &str, error: &dyn Display) {
        log::error!("{}: {}", context, error);
        self.errors.push(ErrorRecord {
            timestamp: Utc::now(),
            context: context.to_string(),
            message: error.to_string(),
        });
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    pub fn visible_markers(&self) -> &[String] {
        &self.visible_markers
    }

    /// Emphasizes the location marker under the pointer, `None` when the
    /// pointer left every marker
    pub fn hover_marker(&mut self, key: Option<&str>) {
        let key = key.filter(|k| self.data.location(k).is_some());
        if self.hovered_marker.as_deref() == key {
            return;
        }
        let previous = self.hovered_marker.take();
        for (id, hovered) in [(previous.as_deref(), false), (key, true)] {
            if let Some(id) = id {
                self.map.with_layer_mut(id, |layer| {
                    if let Some(marker) = layer.as_any_mut().downcast_mut::<CircleMarker>() {
                        marker.set_hovered(hovered);
                    }
                });
            }
        }
        self.hovered_marker = key.map(str::to_string);
    }

    pub fn hovered_marker(&self) -> Option<&str> {
        self.hovered_marker.as_deref()
    }

    pub fn data(&self) -> &TravelData {
        &self.data
    }

    pub fn config(&self) -> &TripConfig {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn animator(&self) -> &AnimationManager {
        &self.animator
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        self.map.render(context)
    }

    /// Stops playback and removes everything from the map
    pub fn destroy(&mut self) {
        self.timeline.pause(&mut self.scheduler);
        self.animator.destroy(&mut self.map);
        self.scheduler.clear_effects();
        for layer_id in self.map.list_layers() {
            self.map.remove_layer(&layer_id);
        }
        self.map.process_events();
        self.timeline.drain_events();
        self.bus.clear();
        self.hovered_marker = None;
        log::info!("Map application destroyed");
    }
}
