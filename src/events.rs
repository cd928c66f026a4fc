use crate::board::Orientation;
use crate::square::Square;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Things a session tells the outside world about. Domain events feed
/// analytics; `FocusRequested` and `ScrollToResults` are UI signals.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CountdownStarted,
    SessionStarted {
        duration_secs: u32,
        orientation: Orientation,
        hints_enabled: bool,
    },
    GuessSubmitted {
        correct: bool,
        target: Square,
        guess: String,
        time_left: u32,
    },
    SessionEnded {
        final_score: u32,
        elapsed: Duration,
        hints_used: bool,
        guess_count: usize,
    },
    HintsToggled {
        enabled: bool,
    },
    BoardFlipped {
        orientation: Orientation,
    },
    DurationChanged {
        seconds: u32,
    },
    FocusRequested,
    ScrollToResults,
}

/// Subscriber to session events. Listeners are fire-and-forget: they cannot
/// fail the operation that produced the event.
pub trait SessionListener {
    fn on_event(&mut self, event: &SessionEvent);
}

/// Shared, cloneable record of every event seen.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn count(&self, pred: impl Fn(&SessionEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl SessionListener for EventLog {
    fn on_event(&mut self, event: &SessionEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_clones_share_storage() {
        let log = EventLog::new();
        let mut writer = log.clone();
        writer.on_event(&SessionEvent::FocusRequested);
        writer.on_event(&SessionEvent::HintsToggled { enabled: true });

        assert_eq!(log.events().len(), 2);
        assert_eq!(
            log.count(|e| matches!(e, SessionEvent::HintsToggled { .. })),
            1
        );
        assert_eq!(log.drain().len(), 2);
        assert!(log.events().is_empty());
    }
}
