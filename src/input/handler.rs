use crate::{
    core::{constants::TRIP_DAYS, geo::Point},
    input::events::{Button, FocusTarget, InputEvent, KeyCode},
};

/// What the application should do in response to an input event
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePlayback,
    Reset,
    JumpToDay(i64),
    NextDay,
    PreviousDay,
    ShowFullRoute,
    /// A location marker was clicked
    SelectLocation(String),
    Resize(Point),
    SetPageVisible(bool),
}

/// Translates raw UI input into timeline and map commands
#[derive(Debug, Clone)]
pub struct InputHandler {
    pub enabled: bool,
    /// Keyboard shortcuts for the timeline
    pub keyboard: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            enabled: true,
            keyboard: true,
        }
    }

    /// Handle an input event. An empty result means the event was not
    /// consumed and should keep its default behaviour.
    pub fn handle_event(&self, event: &InputEvent) -> Vec<Command> {
        if !self.enabled {
            return vec![];
        }

        let command = match event {
            InputEvent::SliderInput { value } | InputEvent::SliderChange { value } => {
                Some(Command::JumpToDay(*value))
            }
            InputEvent::ButtonClick(Button::PlayPause) => Some(Command::TogglePlayback),
            InputEvent::ButtonClick(Button::Reset) => Some(Command::Reset),
            InputEvent::ButtonClick(Button::ShowFullRoute) => Some(Command::ShowFullRoute),
            InputEvent::KeyPress { key, target } => self.handle_key(*key, *target),
            InputEvent::TimelineMarkerClick { day } => match day {
                Some(day) if *day > 0 => Some(Command::JumpToDay(*day as i64)),
                _ => None,
            },
            InputEvent::LocationMarkerClick { key } => Some(Command::SelectLocation(key.clone())),
            InputEvent::Resize { size } => Some(Command::Resize(*size)),
            InputEvent::VisibilityChange { hidden } => Some(Command::SetPageVisible(!hidden)),
        };

        command.into_iter().collect()
    }

    fn handle_key(&self, key: KeyCode, target: FocusTarget) -> Option<Command> {
        if !self.keyboard || target == FocusTarget::TextInput {
            return None;
        }
        match key {
            KeyCode::Space => Some(Command::TogglePlayback),
            KeyCode::ArrowLeft => Some(Command::PreviousDay),
            KeyCode::ArrowRight => Some(Command::NextDay),
            KeyCode::Home => Some(Command::Reset),
            KeyCode::End => Some(Command::JumpToDay(TRIP_DAYS as i64)),
            KeyCode::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        let handler = InputHandler::new();
        let cases = [
            (KeyCode::Space, Command::TogglePlayback),
            (KeyCode::ArrowLeft, Command::PreviousDay),
            (KeyCode::ArrowRight, Command::NextDay),
            (KeyCode::Home, Command::Reset),
            (KeyCode::End, Command::JumpToDay(21)),
        ];
        for (key, command) in cases {
            assert_eq!(handler.handle_event(&InputEvent::key(key)), [command]);
        }
        assert!(handler
            .handle_event(&InputEvent::key(KeyCode::Other(13)))
            .is_empty());
    }

    #[test]
    fn test_keys_ignored_in_text_input() {
        let handler = InputHandler::new();
        let event = InputEvent::KeyPress {
            key: KeyCode::Space,
            target: FocusTarget::TextInput,
        };
        assert!(handler.handle_event(&event).is_empty());
    }

    #[test]
    fn test_slider_and_markers() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_event(&InputEvent::SliderInput { value: 999 }),
            [Command::JumpToDay(999)]
        );
        assert_eq!(
            handler.handle_event(&InputEvent::TimelineMarkerClick { day: Some(8) }),
            [Command::JumpToDay(8)]
        );
        assert!(handler
            .handle_event(&InputEvent::TimelineMarkerClick { day: None })
            .is_empty());
    }

    #[test]
    fn test_disabled_handler() {
        let handler = InputHandler {
            enabled: false,
            ..InputHandler::new()
        };
        assert!(handler
            .handle_event(&InputEvent::ButtonClick(Button::PlayPause))
            .is_empty());
    }
}
