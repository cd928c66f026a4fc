use std::time::{Duration, Instant};

pub const COUNTDOWN_START: u32 = 3;
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(1000);

/// One-shot pre-game countdown (3, 2, 1) that hands back a completion payload.
///
/// Each step is a single-shot one-second timer armed when the previous step
/// was observed. Starting again drops any pending completion.
#[derive(Debug)]
pub struct CountdownTimer<C> {
    value: Option<u32>,
    next_step_at: Option<Instant>,
    on_complete: Option<C>,
}

impl<C> Default for CountdownTimer<C> {
    fn default() -> Self {
        Self {
            value: None,
            next_step_at: None,
            on_complete: None,
        }
    }
}

impl<C> CountdownTimer<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, initial: u32, now: Instant, on_complete: C) {
        if self.on_complete.is_some() {
            tracing::debug!("countdown restarted; pending completion dropped");
        }
        self.value = Some(initial.max(1));
        self.next_step_at = Some(now + COUNTDOWN_STEP);
        self.on_complete = Some(on_complete);
    }

    pub fn cancel(&mut self) {
        self.value = None;
        self.next_step_at = None;
        self.on_complete = None;
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    pub fn is_counting(&self) -> bool {
        self.value.is_some()
    }

    /// Advances at most one step. Returns the completion once the final step elapses.
    pub fn poll(&mut self, now: Instant) -> Option<C> {
        let deadline = self.next_step_at?;
        if now < deadline {
            return None;
        }

        match self.value {
            Some(n) if n > 1 => {
                self.value = Some(n - 1);
                self.next_step_at = Some(now + COUNTDOWN_STEP);
                None
            }
            _ => {
                self.value = None;
                self.next_step_at = None;
                self.on_complete.take()
            }
        }
    }
}
