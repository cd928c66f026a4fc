// Library surface for the drill core, shared by the TUI binary and the headless tests.
// Keep this free of rendering code; the binary owns main.rs and ui.rs.
pub mod analytics;
pub mod board;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod duration;
pub mod effects;
pub mod events;
pub mod input;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod square;
pub mod timers;

pub use board::{Orientation, SquareVariant};
pub use events::{SessionEvent, SessionListener};
pub use session::{GameSession, GuessRecord};
pub use square::Square;
