use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// User interaction delivered to the application by a UI backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Slider is being dragged
    SliderInput { value: i64 },
    /// Slider value was committed (drag end or keyboard on the slider)
    SliderChange { value: i64 },
    ButtonClick(Button),
    KeyPress { key: KeyCode, target: FocusTarget },
    /// Click on a timeline marker; markers without a day carry `None`
    TimelineMarkerClick { day: Option<u32> },
    /// Click on a location marker on the map
    LocationMarkerClick { key: String },
    /// Map container resized
    Resize { size: Point },
    /// The page or window was hidden or shown again
    VisibilityChange { hidden: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    PlayPause,
    Reset,
    ShowFullRoute,
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Space,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other(u32),
}

/// Where keyboard focus was when a key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FocusTarget {
    /// A text field; timeline shortcuts are suppressed
    TextInput,
    #[default]
    Other,
}

impl InputEvent {
    pub fn key(key: KeyCode) -> Self {
        InputEvent::KeyPress {
            key,
            target: FocusTarget::Other,
        }
    }

    /// Short name used when recording user interactions
    pub fn interaction_name(&self) -> &'static str {
        match self {
            InputEvent::SliderInput { .. } | InputEvent::SliderChange { .. } => "slider",
            InputEvent::ButtonClick(Button::PlayPause) => "play_pause",
            InputEvent::ButtonClick(Button::Reset) => "reset",
            InputEvent::ButtonClick(Button::ShowFullRoute) => "show_full_route",
            InputEvent::KeyPress { .. } => "keyboard",
            InputEvent::TimelineMarkerClick { .. } => "timeline_marker_click",
            InputEvent::LocationMarkerClick { .. } => "marker_click",
            InputEvent::Resize { .. } => "resize",
            InputEvent::VisibilityChange { .. } => "visibility",
        }
    }

    /// Whether this event comes from the user acting on the page
    pub fn is_user_interaction(&self) -> bool {
        !matches!(
            self,
            InputEvent::Resize { .. } | InputEvent::VisibilityChange { .. }
        )
    }
}
