pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{Button, FocusTarget, InputEvent, KeyCode};
pub use handler::{Command, InputHandler};
