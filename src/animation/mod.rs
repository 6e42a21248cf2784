pub mod easing;
pub mod flight;
pub mod route;
pub mod scheduler;

pub use easing::EasingType;
pub use flight::CameraFlight;
pub use route::{route_overlays, AnimationManager, AnimationState, SegmentOverlay};
pub use scheduler::{Effect, Fired, JourneyPhase, Scheduler};
