use crate::square::Square;
use crate::timers::TimerTable;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// How long an incorrect flash stays on a square.
pub const INCORRECT_FLASH: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    Incorrect,
}

/// Per-square transient effects. Each square has at most one pending clear;
/// re-marking a square replaces its clear so an old timer never wipes a newer flash.
#[derive(Debug, Clone, Default)]
pub struct EffectTracker {
    effects: BTreeMap<Square, Effect>,
    clears: TimerTable<Square>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_incorrect(&mut self, square: Square, now: Instant) {
        self.effects.insert(square, Effect::Incorrect);
        if self.clears.schedule(square, now + INCORRECT_FLASH) {
            tracing::debug!(%square, "replaced pending effect clear");
        }
    }

    pub fn effect(&self, square: Square) -> Effect {
        self.effects.get(&square).copied().unwrap_or_default()
    }

    pub fn pending_clears(&self) -> usize {
        self.clears.len()
    }

    /// Clears every effect whose deadline has passed and returns those squares.
    pub fn expire(&mut self, now: Instant) -> Vec<Square> {
        let due = self.clears.take_due(now);
        for square in &due {
            self.effects.remove(square);
        }
        due
    }

    pub fn clear_all(&mut self) {
        self.effects.clear();
        self.clears.clear();
    }
}
