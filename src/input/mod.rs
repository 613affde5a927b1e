pub mod events;
pub mod interaction;

// Re-export the essential types
pub use events::{EventHandled, InputEvent, KeyCode, KeyModifiers};
pub use interaction::{InteractionController, InteractionEvent, SelectionContext};
