pub mod controller;
pub mod day;

pub use controller::{PlaybackState, TimelineController, TimelineView};
pub use day::DayData;
