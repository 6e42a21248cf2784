//! Route overlays and the effects that animate them.
//!
//! Which segments are on the map is a pure function of the current day
//! ([`route_overlays`]). [`AnimationManager`] turns that set into map layers,
//! clearing everything it drew before on every redraw, and schedules the
//! cosmetic parts (staggered snake-in, fit-to-route, highlight expiry,
//! journey steps) on the [`Scheduler`]. Scheduled effects carry the redraw
//! generation they belong to and are dropped once a newer redraw happened.

use crate::{
    animation::scheduler::{Effect, JourneyPhase, Scheduler},
    core::{
        config::{AnimationConfig, Capabilities},
        constants::*,
        geo::LatLngBounds,
        map::Map,
    },
    data::{RouteSegment, TravelData},
    layers::{
        marker::CircleMarker,
        vector::{ArrowDecorator, LineStyle, PointStyle, Polyline, SerializableColor},
    },
    prelude::{Arc, Duration},
    timeline::day::DayData,
    Result,
};

/// One route segment as it should appear for a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOverlay {
    /// Position in the segment table
    pub index: usize,
    /// Travelled: drawn with direction arrows
    pub complete: bool,
}

/// Segments on the map for `current_day`: a segment shows from its first
/// day and is complete from its last day.
pub fn route_overlays(current_day: u32, segments: &[RouteSegment]) -> Vec<SegmentOverlay> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| current_day >= segment.active_days.start_day)
        .map(|(index, segment)| SegmentOverlay {
            index,
            complete: current_day >= segment.active_days.end_day,
        })
        .collect()
}

/// Progress of the sequential journey animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub is_animating: bool,
    pub current_step: usize,
    pub total_steps: usize,
}

fn route_layer_id(segment: &RouteSegment) -> String {
    format!("route:{}", segment.id)
}

fn arrows_layer_id(segment: &RouteSegment) -> String {
    format!("arrows:{}", segment.id)
}

pub struct AnimationManager {
    data: Arc<TravelData>,
    config: AnimationConfig,
    capabilities: Capabilities,
    /// Bumped on every clear; scheduled effects from older generations are stale
    generation: u64,
    /// Layer IDs of the rendered overlay set
    route_layers: Vec<String>,
    drawn: Vec<SegmentOverlay>,
    highlights: Vec<String>,
    next_highlight: u64,
    is_animating: bool,
    current_step: usize,
}

impl AnimationManager {
    pub fn new(data: Arc<TravelData>, config: AnimationConfig, capabilities: Capabilities) -> Self {
        Self {
            data,
            config,
            capabilities,
            generation: 0,
            route_layers: Vec::new(),
            drawn: Vec::new(),
            highlights: Vec::new(),
            next_highlight: 0,
            is_animating: false,
            current_step: 0,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Segments currently drawn, in table order
    pub fn drawn_segments(&self) -> &[SegmentOverlay] {
        &self.drawn
    }

    /// Layer IDs of the route lines and arrows currently drawn
    pub fn overlay_layers(&self) -> &[String] {
        &self.route_layers
    }

    /// Highlight markers that have not expired yet
    pub fn active_highlights(&self) -> &[String] {
        &self.highlights
    }

    pub fn animation_state(&self) -> AnimationState {
        AnimationState {
            is_animating: self.is_animating,
            current_step: self.current_step,
            total_steps: self.data.route_segments().len(),
        }
    }

    /// Snake-in speed in px/s, clamped to 50..=500
    pub fn set_animation_speed(&mut self, speed: f64) {
        self.config.snake_speed = speed.clamp(MIN_SNAKE_SPEED, MAX_SNAKE_SPEED);
    }

    /// Delay between segment reveals, clamped to 200..=2000 ms
    pub fn set_snake_pause(&mut self, pause_ms: u64) {
        self.config.snake_pause_ms = pause_ms.clamp(MIN_SNAKE_PAUSE_MS, MAX_SNAKE_PAUSE_MS);
    }

    pub fn on_map_ready(&mut self, map: &mut Map, scheduler: &mut Scheduler) -> Result<()> {
        self.show_progressive_route(1, map, scheduler)
    }

    pub fn on_day_changed(
        &mut self,
        day: u32,
        data: &DayData,
        map: &mut Map,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        self.show_progressive_route(day, map, scheduler)?;
        if !data.location.is_empty() {
            self.focus_on_location_animated(&data.location, map, scheduler)?;
        }
        Ok(())
    }

    /// Removes every route overlay drawn so far and stops the journey
    pub fn clear_all(&mut self, map: &mut Map) {
        for layer_id in self.route_layers.drain(..) {
            map.remove_layer(&layer_id);
        }
        self.drawn.clear();
        self.generation += 1;
        self.is_animating = false;
        self.current_step = 0;
    }

    /// Redraws the route as it stands on `day`
    pub fn show_progressive_route(
        &mut self,
        day: u32,
        map: &mut Map,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        self.clear_all(map);
        let pause = Duration::from_millis(self.config.snake_pause_ms);
        for overlay in route_overlays(day, self.data.route_segments()) {
            let delay = pause * overlay.index as u32;
            self.add_segment(overlay, delay, map, scheduler)?;
        }
        log::debug!("Route for day {}: {} segments", day, self.drawn.len());
        Ok(())
    }

    /// Draws every segment as travelled, then fits the camera to the route
    pub fn show_complete_route(&mut self, map: &mut Map, scheduler: &mut Scheduler) -> Result<()> {
        self.clear_all(map);
        let stagger = Duration::from_millis(self.config.full_route_stagger_ms);
        let count = self.data.route_segments().len();
        for index in 0..count {
            let overlay = SegmentOverlay {
                index,
                complete: true,
            };
            self.add_segment(overlay, stagger * index as u32, map, scheduler)?;
        }

        let fit_delay =
            stagger * count as u32 + Duration::from_millis(self.config.full_route_fit_delay_ms);
        scheduler.schedule(
            fit_delay,
            Effect::FitRoute {
                generation: self.generation,
            },
        );
        Ok(())
    }

    fn add_segment(
        &mut self,
        overlay: SegmentOverlay,
        reveal_delay: Duration,
        map: &mut Map,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        let Some(segment) = self.data.route_segments().get(overlay.index) else {
            return Ok(());
        };
        let color = SerializableColor::from_hex_or(&segment.color, LineStyle::default().color);
        let path = vec![segment.from, segment.to];

        let route_id = route_layer_id(segment);
        let route = Polyline::new(route_id.clone(), path.clone())
            .with_style(LineStyle {
                color,
                width: segment.weight as f32,
                opacity: 0.8,
            })
            .with_popup(segment.popup_text());
        map.add_layer(Box::new(route))?;
        self.route_layers.push(route_id.clone());

        if overlay.complete {
            if self.capabilities.snake_animation {
                scheduler.schedule(
                    reveal_delay,
                    Effect::RevealSegment {
                        generation: self.generation,
                        layer_id: route_id,
                    },
                );
            }
            if self.capabilities.polyline_decorator {
                let arrows_id = arrows_layer_id(segment);
                let arrows = ArrowDecorator::new(arrows_id.clone(), path, color)
                    .with_pattern(self.config.arrow_repeat_px, self.config.arrow_size_px);
                map.add_layer(Box::new(arrows))?;
                self.route_layers.push(arrows_id);
            }
        }

        self.drawn.push(overlay);
        Ok(())
    }

    /// Flies to a location and drops a short-lived highlight on it.
    /// Returns `false` for an unknown key, leaving the map untouched.
    pub fn focus_on_location_animated(
        &mut self,
        key: &str,
        map: &mut Map,
        scheduler: &mut Scheduler,
    ) -> Result<bool> {
        let Some(location) = self.data.location(key) else {
            log::debug!("No location '{}' to highlight", key);
            return Ok(false);
        };

        let zoom = if location.is_base_location {
            HIGHLIGHT_ZOOM_BASE
        } else {
            HIGHLIGHT_ZOOM_STOP
        };
        map.fly_to(
            location.coords,
            zoom,
            Duration::from_millis(self.config.zoom_duration_ms),
        );

        let layer_id = format!("highlight:{}", self.next_highlight);
        self.next_highlight += 1;
        let highlight = CircleMarker::new(layer_id.clone(), location.coords)
            .with_style(PointStyle {
                fill_color: SerializableColor::WHITE,
                stroke_color: SerializableColor::rgb(0x66, 0x7e, 0xea),
                stroke_width: 3.0,
                radius: HIGHLIGHT_RADIUS as f32,
                fill_opacity: 0.3,
                stroke_opacity: 1.0,
            })
            .with_popup(format!("{}\nCurrent focus location", location.name));
        map.add_layer(Box::new(highlight))?;
        map.open_popup(&layer_id);
        self.highlights.push(layer_id.clone());

        scheduler.schedule(
            Duration::from_millis(self.config.highlight_duration_ms),
            Effect::ExpireHighlight { layer_id },
        );
        Ok(true)
    }

    /// Starts the sequential journey: one segment at a time, camera first.
    /// Ignored while a journey is already running.
    pub fn play_route_animation(&mut self, map: &mut Map, scheduler: &mut Scheduler) -> Result<()> {
        if self.is_animating {
            log::debug!("Journey animation already running");
            return Ok(());
        }
        self.clear_all(map);
        self.is_animating = true;
        self.journey_step(0, JourneyPhase::Depart, map, scheduler)
    }

    pub fn stop_animation(&mut self, map: &mut Map) {
        self.clear_all(map);
    }

    fn journey_step(
        &mut self,
        step: usize,
        phase: JourneyPhase,
        map: &mut Map,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        let Some(segment) = self.data.route_segments().get(step) else {
            self.is_animating = false;
            log::debug!("Journey animation finished");
            return Ok(());
        };

        match phase {
            JourneyPhase::Depart => {
                map.fly_to(
                    segment.from,
                    JOURNEY_ZOOM,
                    Duration::from_millis(self.config.zoom_duration_ms),
                );
                scheduler.schedule(
                    Duration::from_millis(JOURNEY_STEP_DELAY_MS),
                    Effect::JourneyStep {
                        generation: self.generation,
                        step,
                        phase: JourneyPhase::Arrive,
                    },
                );
            }
            JourneyPhase::Arrive => {
                let overlay = SegmentOverlay {
                    index: step,
                    complete: true,
                };
                self.add_segment(overlay, Duration::ZERO, map, scheduler)?;
                self.current_step = step + 1;
                scheduler.schedule(
                    Duration::from_millis(self.config.snake_pause_ms * 2),
                    Effect::JourneyStep {
                        generation: self.generation,
                        step: step + 1,
                        phase: JourneyPhase::Depart,
                    },
                );
            }
        }
        Ok(())
    }

    /// Fits the camera to every route segment, with 10% padding
    pub fn fit_route(&self, map: &mut Map) {
        let coords: Vec<_> = self
            .data
            .route_segments()
            .iter()
            .flat_map(|s| [s.from, s.to])
            .collect();
        if let Some(bounds) = LatLngBounds::from_points(coords.iter()) {
            map.fit_bounds(
                &bounds.pad(FIT_PADDING_RATIO),
                0.0,
                Duration::from_millis(self.config.zoom_duration_ms),
            );
        }
    }

    /// Runs one of the effects this manager scheduled. Returns `false` for
    /// effects that belong to someone else.
    pub fn apply_effect(
        &mut self,
        effect: &Effect,
        map: &mut Map,
        scheduler: &mut Scheduler,
    ) -> Result<bool> {
        match effect {
            Effect::RevealSegment {
                generation,
                layer_id,
            } => {
                if *generation == self.generation {
                    let speed = self.config.snake_speed;
                    map.with_layer_mut(layer_id, |layer| {
                        if let Some(line) = layer.as_any_mut().downcast_mut::<Polyline>() {
                            line.snake_in(speed);
                        }
                    });
                }
            }
            Effect::FitRoute { generation } => {
                if *generation == self.generation {
                    self.fit_route(map);
                }
            }
            Effect::ExpireHighlight { layer_id } => {
                self.highlights.retain(|id| id != layer_id);
                map.remove_layer(layer_id);
            }
            Effect::JourneyStep {
                generation,
                step,
                phase,
            } => {
                if *generation == self.generation && self.is_animating {
                    self.journey_step(*step, *phase, map, scheduler)?;
                }
            }
            Effect::OpenPopup { .. } | Effect::FocusLocation { .. } => return Ok(false),
        }
        Ok(true)
    }

    /// Removes everything this manager put on the map
    pub fn destroy(&mut self, map: &mut Map) {
        self.clear_all(map);
        for layer_id in self.highlights.drain(..) {
            map.remove_layer(&layer_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapViewConfig;

    struct Fixture {
        animator: AnimationManager,
        map: Map,
        scheduler: Scheduler,
    }

    fn fixture(capabilities: Capabilities) -> Fixture {
        let data = Arc::new(TravelData::embedded().unwrap());
        Fixture {
            animator: AnimationManager::new(data, AnimationConfig::default(), capabilities),
            map: Map::new(&MapViewConfig::default()).unwrap(),
            scheduler: Scheduler::new(),
        }
    }

    impl Fixture {
        fn advance(&mut self, ms: u64) {
            let deadline = self.scheduler.now() + Duration::from_millis(ms);
            while let Some(crate::animation::scheduler::Fired::Effect(effect)) =
                self.scheduler.poll(deadline)
            {
                self.animator
                    .apply_effect(&effect, &mut self.map, &mut self.scheduler)
                    .unwrap();
            }
            self.scheduler.settle(deadline);
        }
    }

    #[test]
    fn test_route_overlays_by_day() {
        let data = TravelData::embedded().unwrap();
        let segments = data.route_segments();

        assert_eq!(
            route_overlays(1, segments),
            [SegmentOverlay {
                index: 0,
                complete: false
            }]
        );

        let day8 = route_overlays(8, segments);
        assert_eq!(day8.len(), 2);
        assert!(day8[0].complete);
        assert!(!day8[1].complete);

        let day21 = route_overlays(21, segments);
        assert_eq!(day21.len(), 4);
        assert!(day21.iter().all(|o| o.complete));
    }

    #[test]
    fn test_redraw_replaces_overlays() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .show_progressive_route(21, &mut f.map, &mut f.scheduler)
            .unwrap();
        assert_eq!(f.animator.overlay_layers().len(), 8);

        f.animator
            .show_progressive_route(1, &mut f.map, &mut f.scheduler)
            .unwrap();
        assert_eq!(f.animator.overlay_layers(), ["route:tokyo-to-fuji"]);
        assert_eq!(f.map.layer_count(), 1);
    }

    #[test]
    fn test_stale_reveals_are_ignored() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .show_progressive_route(21, &mut f.map, &mut f.scheduler)
            .unwrap();
        let first_generation = f.animator.generation();
        f.animator
            .show_progressive_route(8, &mut f.map, &mut f.scheduler)
            .unwrap();
        assert!(f.animator.generation() > first_generation);

        // Only the first segment is complete on day 8; the day-21 reveals
        // queued for the other segments are stale
        f.advance(3000);
        let snaking = f
            .map
            .get_layer("route:tokyo-to-fuji")
            .and_then(|l| l.as_any().downcast_ref::<Polyline>())
            .map(|l| l.is_snaking());
        assert_eq!(snaking, Some(true));
        let partial = f
            .map
            .get_layer("route:fuji-to-alps")
            .and_then(|l| l.as_any().downcast_ref::<Polyline>())
            .map(|l| l.is_snaking());
        assert_eq!(partial, Some(false));
    }

    #[test]
    fn test_missing_capabilities_degrade() {
        let mut f = fixture(Capabilities::none());
        f.animator
            .show_progressive_route(21, &mut f.map, &mut f.scheduler)
            .unwrap();
        assert_eq!(f.animator.drawn_segments().len(), 4);
        assert_eq!(f.animator.overlay_layers().len(), 4);
        assert_eq!(f.scheduler.pending_effects(), 0);
    }

    #[test]
    fn test_complete_route_is_idempotent() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .show_progressive_route(3, &mut f.map, &mut f.scheduler)
            .unwrap();
        f.animator
            .show_complete_route(&mut f.map, &mut f.scheduler)
            .unwrap();
        let first = (
            f.animator.drawn_segments().to_vec(),
            f.map.list_layers(),
        );
        f.animator
            .show_complete_route(&mut f.map, &mut f.scheduler)
            .unwrap();
        let second = (
            f.animator.drawn_segments().to_vec(),
            f.map.list_layers(),
        );

        assert_eq!(first, second);
        assert!(first.0.iter().all(|o| o.complete));
        assert_eq!(first.0.len(), 4);
    }

    #[test]
    fn test_complete_route_fits_camera_after_stagger() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .show_complete_route(&mut f.map, &mut f.scheduler)
            .unwrap();

        f.advance(4 * 300 + 499);
        assert!(!f.map.is_flying());
        f.advance(1);
        assert!(f.map.is_flying());
    }

    #[test]
    fn test_highlight_expires_independently() {
        let mut f = fixture(Capabilities::default());
        assert!(f
            .animator
            .focus_on_location_animated("kyoto", &mut f.map, &mut f.scheduler)
            .unwrap());
        f.advance(1000);
        assert!(f
            .animator
            .focus_on_location_animated("kyoto", &mut f.map, &mut f.scheduler)
            .unwrap());
        assert_eq!(f.animator.active_highlights().len(), 2);
        assert_eq!(f.map.camera_target().1, HIGHLIGHT_ZOOM_BASE);

        f.advance(2000);
        assert_eq!(f.animator.active_highlights(), ["highlight:1"]);
        f.advance(1000);
        assert!(f.animator.active_highlights().is_empty());
    }

    #[test]
    fn test_highlights_survive_redraws() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .focus_on_location_animated("tokyo", &mut f.map, &mut f.scheduler)
            .unwrap();
        f.animator
            .show_progressive_route(10, &mut f.map, &mut f.scheduler)
            .unwrap();
        assert!(f.map.has_layer("highlight:0"));
    }

    #[test]
    fn test_unknown_focus_key() {
        let mut f = fixture(Capabilities::default());
        let before = f.map.camera_target();
        assert!(!f
            .animator
            .focus_on_location_animated("atlantis", &mut f.map, &mut f.scheduler)
            .unwrap());
        assert_eq!(f.map.camera_target(), before);
        assert_eq!(f.map.layer_count(), 0);
    }

    #[test]
    fn test_journey_runs_segment_by_segment() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .play_route_animation(&mut f.map, &mut f.scheduler)
            .unwrap();
        assert_eq!(
            f.animator.animation_state(),
            AnimationState {
                is_animating: true,
                current_step: 0,
                total_steps: 4
            }
        );

        // Re-entrant start is ignored
        f.animator
            .play_route_animation(&mut f.map, &mut f.scheduler)
            .unwrap();

        f.advance(1000);
        assert_eq!(f.animator.animation_state().current_step, 1);
        assert_eq!(f.animator.drawn_segments().len(), 1);

        // Each further step takes 2 x snake pause plus the fly-in delay
        f.advance(3 * (1600 + 1000));
        assert_eq!(f.animator.animation_state().current_step, 4);
        f.advance(1600);
        assert!(!f.animator.animation_state().is_animating);
        assert_eq!(f.animator.drawn_segments().len(), 4);
    }

    #[test]
    fn test_stop_animation() {
        let mut f = fixture(Capabilities::default());
        f.animator
            .play_route_animation(&mut f.map, &mut f.scheduler)
            .unwrap();
        f.advance(1000);
        f.animator.stop_animation(&mut f.map);

        let state = f.animator.animation_state();
        assert!(!state.is_animating);
        assert_eq!(state.current_step, 0);
        f.advance(10_000);
        assert!(f.animator.drawn_segments().is_empty());
    }

    #[test]
    fn test_setters_clamp() {
        let mut f = fixture(Capabilities::default());
        f.animator.set_animation_speed(10.0);
        assert_eq!(f.animator.config().snake_speed, 50.0);
        f.animator.set_snake_pause(5000);
        assert_eq!(f.animator.config().snake_pause_ms, 2000);
    }
}
