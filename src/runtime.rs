use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use tracing::debug;

use crate::clock::{TimeSource, TICK_RATE_MS};
use crate::session::GameSession;

/// Terminal input the drill reacts to.
#[derive(Clone, Debug)]
pub enum DrillInput {
    Key(KeyEvent),
    Resize,
}

/// Anything that can hand over terminal input, waiting at most `wait` for it.
pub trait InputSource {
    fn next_within(&self, wait: Duration) -> Option<DrillInput>;
}

/// Reads crossterm events on a background thread. The thread exits once the
/// terminal stops producing events or the source is dropped.
pub struct TerminalInput {
    rx: Receiver<DrillInput>,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || loop {
            let input = match event::read() {
                Ok(Event::Key(key)) => DrillInput::Key(key),
                Ok(Event::Resize(_, _)) => DrillInput::Resize,
                Ok(_) => continue,
                Err(e) => {
                    debug!(error = %e, "terminal input closed");
                    break;
                }
            };
            if tx.send(input).is_err() {
                break;
            }
        });
        Self { rx }
    }
}

impl InputSource for TerminalInput {
    fn next_within(&self, wait: Duration) -> Option<DrillInput> {
        self.rx.recv_timeout(wait).ok()
    }
}

/// Input fed by hand, for headless drills.
pub struct ScriptedInput {
    rx: Receiver<DrillInput>,
}

impl ScriptedInput {
    pub fn channel() -> (Sender<DrillInput>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl InputSource for ScriptedInput {
    fn next_within(&self, wait: Duration) -> Option<DrillInput> {
        match self.rx.recv_timeout(wait) {
            Ok(input) => Some(input),
            // a closed script behaves like an idle keyboard
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Paces the drill: every step waits at most one tick for input, then lets
/// the session observe the time that passed.
pub struct Runner<S: InputSource> {
    input: S,
    tick_every: Duration,
}

impl<S: InputSource> Runner<S> {
    pub fn new(input: S) -> Self {
        Self {
            input,
            tick_every: Duration::from_millis(TICK_RATE_MS),
        }
    }

    pub fn with_tick(mut self, tick_every: Duration) -> Self {
        self.tick_every = tick_every;
        self
    }

    pub fn tick_every(&self) -> Duration {
        self.tick_every
    }

    /// Ticks the session before handing back the input, so expiry is
    /// observed before the key is applied.
    pub fn step<T: TimeSource>(&self, session: &mut GameSession<T>) -> Option<DrillInput> {
        let input = self.input.next_within(self.tick_every);
        session.tick();
        input
    }
}
