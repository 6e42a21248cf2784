//! # tripmap
//!
//! An interactive itinerary map for a multi-city trip: location markers, a
//! day-by-day timeline with autoplay, and route animations that follow the
//! selected day.
//!
//! The [`MapApplication`] composition root owns the [`Map`] handle, the
//! [`Scheduler`] and the two controllers ([`TimelineController`] and
//! [`AnimationManager`]) and wires them together through typed
//! [`TripEvent`] notifications. All time is simulated: callers feed frame
//! deltas to [`MapApplication::advance`].

pub mod animation;
pub mod app;
pub mod core;
pub mod data;
pub mod events;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod timeline;
#[cfg(feature = "egui")]
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::TripConfig,
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    viewport::Viewport,
};

pub use animation::{
    route::AnimationManager,
    scheduler::{Effect, Scheduler},
};

pub use app::MapApplication;

pub use data::{Location, RouteSegment, TravelData};

pub use events::{EventBus, TripEvent};

pub use input::{events::InputEvent, handler::InputHandler};

pub use timeline::{controller::TimelineController, day::DayData};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, TripError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = TripError;
