//! Prelude module for common tripmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tripmap::prelude::*;`

pub use crate::core::{
    config::{AnimationConfig, Capabilities, MapViewConfig, TimelineConfig, TripConfig},
    geo::{LatLng, LatLngBounds, Point},
    map::{Map, MapEvent},
    viewport::Viewport,
};

pub use crate::data::{DailyPlan, DayPolicy, Location, RouteSegment, TravelData};

pub use crate::layers::{
    base::{LayerTrait, LayerType},
    manager::LayerManager,
    marker::CircleMarker,
    vector::{ArrowDecorator, Polyline},
};

pub use crate::animation::{
    easing::EasingType,
    route::{AnimationManager, AnimationState},
    scheduler::{Effect, Fired, Scheduler},
};

pub use crate::timeline::{
    controller::{PlaybackState, TimelineController},
    day::DayData,
};

pub use crate::events::{EventBus, EventKind, TripEvent};

pub use crate::input::{
    events::{Button, FocusTarget, InputEvent, KeyCode},
    handler::{Command, InputHandler},
};

pub use crate::app::MapApplication;

#[cfg(feature = "egui")]
pub use crate::ui::{MapCanvas, TimelinePanel};

pub use crate::{Error as TripError, Result};

pub use std::{
    collections::VecDeque,
    sync::Arc,
    time::Duration,
};

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
