//! Itinerary-wide constants.
//! Keeping them in a single place makes it easier to tweak the trip's magic numbers.

/// Number of days on the timeline.
pub const TRIP_DAYS: u32 = 21;

/// Autoplay interval between days.
pub const DEFAULT_PLAY_INTERVAL_MS: u64 = 1500;

/// Autoplay interval limits; requested intervals are clamped into this range.
pub const MIN_PLAY_INTERVAL_MS: u64 = 500;
pub const MAX_PLAY_INTERVAL_MS: u64 = 5000;

/// Delay between successive segment reveals while following the timeline.
pub const DEFAULT_SNAKE_PAUSE_MS: u64 = 800;
pub const MIN_SNAKE_PAUSE_MS: u64 = 200;
pub const MAX_SNAKE_PAUSE_MS: u64 = 2000;

/// Snake-in drawing speed in pixels per second.
pub const DEFAULT_SNAKE_SPEED: f64 = 200.0;
pub const MIN_SNAKE_SPEED: f64 = 50.0;
pub const MAX_SNAKE_SPEED: f64 = 500.0;

/// Stagger between segment reveals when the full route is shown.
pub const FULL_ROUTE_STAGGER_MS: u64 = 300;

/// Extra wait after the last full-route reveal before fitting the camera.
pub const FULL_ROUTE_FIT_DELAY_MS: u64 = 500;

/// Lifetime of a focus highlight circle.
pub const HIGHLIGHT_DURATION_MS: u64 = 3000;

/// Camera flight used by the animation manager.
pub const ZOOM_DURATION_MS: u64 = 1000;

/// Camera flight used by `focus_location`; the marker popup opens when it lands.
pub const FOCUS_DURATION_MS: u64 = 1500;

/// Delay before the first location is focused after the initial fit.
pub const INITIAL_FOCUS_DELAY_MS: u64 = 1000;

/// Journey animation: wait after flying to a segment start before drawing it.
pub const JOURNEY_STEP_DELAY_MS: u64 = 1000;

/// Zoom levels for base locations vs. day-trip stops.
pub const FOCUS_ZOOM_BASE: f64 = 11.0;
pub const FOCUS_ZOOM_STOP: f64 = 13.0;
pub const HIGHLIGHT_ZOOM_BASE: f64 = 10.0;
pub const HIGHLIGHT_ZOOM_STOP: f64 = 12.0;
pub const JOURNEY_ZOOM: f64 = 9.0;

/// Marker radii in pixels.
pub const BASE_MARKER_RADIUS: f64 = 12.0;
pub const STOP_MARKER_RADIUS: f64 = 8.0;
pub const HIGHLIGHT_RADIUS: f64 = 20.0;

/// Emphasis for the marker under the pointer.
pub const HOVER_RADIUS_GROWTH: f32 = 3.0;
pub const HOVER_STROKE_WIDTH: f32 = 4.0;

/// Fraction of the span added around bounds before fitting the camera.
pub const FIT_PADDING_RATIO: f64 = 0.1;

/// Directional arrow decoration.
pub const ARROW_REPEAT_PX: f64 = 50.0;
pub const ARROW_SIZE_PX: f64 = 12.0;

/// Fallback marker colour when a location has no assigned colour.
pub const DEFAULT_LOCATION_COLOR: &str = "#667eea";
