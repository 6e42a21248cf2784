//! Configuration for the itinerary map
//!
//! Every tunable the controllers consume is collected here: the autoplay
//! interval and its bounds, animation pacing, the initial camera and the
//! optional rendering capabilities. All sections deserialize from JSON with
//! per-field defaults, so a config file only needs to mention what it changes.

use crate::{
    animation::easing::EasingType,
    core::{
        constants::*,
        geo::{LatLng, LatLngBounds, Point},
    },
    Result, TripError,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    pub timeline: TimelineConfig,
    pub animation: AnimationConfig,
    pub map: MapViewConfig,
    pub capabilities: Capabilities,
}

impl TripConfig {
    /// Parses a config document and clamps out-of-range values
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: TripConfig = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Reads a config file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| TripError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Clamps every bounded value into its documented range
    pub fn normalize(&mut self) {
        let timeline = &mut self.timeline;
        if timeline.min_interval_ms > timeline.max_interval_ms {
            log::warn!(
                "interval bounds {}..{}ms are inverted, swapping",
                timeline.min_interval_ms,
                timeline.max_interval_ms
            );
            std::mem::swap(&mut timeline.min_interval_ms, &mut timeline.max_interval_ms);
        }

        let requested = self.timeline.play_interval_ms;
        self.timeline.play_interval_ms = self.timeline.clamp_interval(requested);
        if requested != self.timeline.play_interval_ms {
            log::warn!(
                "play interval {}ms out of range, using {}ms",
                requested,
                self.timeline.play_interval_ms
            );
        }

        self.animation.snake_pause_ms = self
            .animation
            .snake_pause_ms
            .clamp(MIN_SNAKE_PAUSE_MS, MAX_SNAKE_PAUSE_MS);
        self.animation.snake_speed = self
            .animation
            .snake_speed
            .clamp(MIN_SNAKE_SPEED, MAX_SNAKE_SPEED);

        if self.map.min_zoom > self.map.max_zoom {
            std::mem::swap(&mut self.map.min_zoom, &mut self.map.max_zoom);
        }
        self.map.zoom = self.map.zoom.clamp(self.map.min_zoom, self.map.max_zoom);

        if let Some(bounds) = self.map.max_bounds {
            let ordered = bounds.normalized();
            if ordered != bounds {
                log::warn!("max bounds corners are swapped, reordering");
                self.map.max_bounds = Some(ordered);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub play_interval_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl TimelineConfig {
    pub fn clamp_interval(&self, interval_ms: u64) -> u64 {
        let low = self.min_interval_ms.min(self.max_interval_ms);
        let high = self.min_interval_ms.max(self.max_interval_ms);
        interval_ms.clamp(low, high)
    }

    pub fn play_interval(&self) -> Duration {
        Duration::from_millis(self.play_interval_ms)
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            play_interval_ms: DEFAULT_PLAY_INTERVAL_MS,
            min_interval_ms: MIN_PLAY_INTERVAL_MS,
            max_interval_ms: MAX_PLAY_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Pixels per second for the snake-in reveal
    pub snake_speed: f64,
    /// Delay per segment index when revealing completed segments
    pub snake_pause_ms: u64,
    pub full_route_stagger_ms: u64,
    pub full_route_fit_delay_ms: u64,
    pub highlight_duration_ms: u64,
    pub zoom_duration_ms: u64,
    pub focus_duration_ms: u64,
    pub arrow_repeat_px: f64,
    pub arrow_size_px: f64,
    pub easing: EasingType,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            snake_speed: DEFAULT_SNAKE_SPEED,
            snake_pause_ms: DEFAULT_SNAKE_PAUSE_MS,
            full_route_stagger_ms: FULL_ROUTE_STAGGER_MS,
            full_route_fit_delay_ms: FULL_ROUTE_FIT_DELAY_MS,
            highlight_duration_ms: HIGHLIGHT_DURATION_MS,
            zoom_duration_ms: ZOOM_DURATION_MS,
            focus_duration_ms: FOCUS_DURATION_MS,
            arrow_repeat_px: ARROW_REPEAT_PX,
            arrow_size_px: ARROW_SIZE_PX,
            easing: EasingType::EaseInOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Panning is restricted to these bounds
    pub max_bounds: Option<LatLngBounds>,
    /// Container size in pixels; `None` means there is no map container
    pub container_size: Option<Point>,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(36.2048, 138.2529),
            zoom: 6.0,
            min_zoom: 5.0,
            max_zoom: 18.0,
            max_bounds: Some(LatLngBounds::from_coords(24.0, 123.0, 46.0, 148.0)),
            container_size: Some(Point::new(1200.0, 800.0)),
        }
    }
}

/// Optional rendering capabilities. A missing capability disables its
/// effect and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Progressive snake-in drawing of completed segments
    pub snake_animation: bool,
    /// Arrow-head decorations along completed segments
    pub polyline_decorator: bool,
}

impl Capabilities {
    pub fn none() -> Self {
        Self {
            snake_animation: false,
            polyline_decorator: false,
        }
    }

    /// Logs which optional capabilities are available
    pub fn report(&self) {
        for (name, available) in [
            ("Snake animation", self.snake_animation),
            ("Polyline decorator", self.polyline_decorator),
        ] {
            if available {
                log::info!("{} available", name);
            } else {
                log::warn!("{} not available - some animations are disabled", name);
            }
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            snake_animation: true,
            polyline_decorator: true,
        }
    }
}
