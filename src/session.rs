use crate::board::{Orientation, SquareVariant};
use crate::clock::{SessionClock, SystemTimeSource, TimeSource};
use crate::config::Config;
use crate::countdown::{CountdownTimer, COUNTDOWN_START};
use crate::duration::{normalize_duration, DEFAULT_DURATION_SECS};
use crate::effects::{Effect, EffectTracker};
use crate::events::{SessionEvent, SessionListener};
use crate::square::{pick_different, pick_random, Square};
use crate::timers::TimerTable;
use rand::RngCore;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Settle delay before asking the renderer to bring the results into view.
pub const RESULTS_SCROLL_DELAY: Duration = Duration::from_millis(100);

/// One accepted submission. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub target: Square,
    pub guess: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub active: bool,
    /// Set once a session has ended (or before the first one); guards `end_session`.
    pub ended: bool,
    pub score: u32,
    pub high_score: u32,
    pub target: Option<Square>,
    pub time_left: u32,
    pub duration: u32,
    pub duration_input: String,
    pub guesses: Vec<GuessRecord>,
    pub hints_enabled: bool,
    pub hints_used: bool,
    pub first_square_blinking: bool,
    pub orientation: Orientation,
    pub started_at: Option<Instant>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            active: false,
            ended: true,
            score: 0,
            high_score: 0,
            target: None,
            time_left: DEFAULT_DURATION_SECS,
            duration: DEFAULT_DURATION_SECS,
            duration_input: DEFAULT_DURATION_SECS.to_string(),
            guesses: Vec::new(),
            hints_enabled: false,
            hints_used: false,
            first_square_blinking: false,
            orientation: Orientation::White,
            started_at: None,
        }
    }
}

/// Read-only copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub countdown: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownCompletion {
    BeginPlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Notice {
    ScrollToResults,
}

/// The drill orchestrator. Sole owner and writer of the session state.
pub struct GameSession<T: TimeSource = SystemTimeSource> {
    time: T,
    rng: Box<dyn RngCore>,
    listeners: Vec<Box<dyn SessionListener>>,
    countdown: CountdownTimer<CountdownCompletion>,
    clock: SessionClock,
    effects: EffectTracker,
    notices: TimerTable<Notice>,
    state: SessionState,
}

impl GameSession<SystemTimeSource> {
    pub fn new() -> Self {
        Self::with_time(SystemTimeSource)
    }
}

impl Default for GameSession<SystemTimeSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> GameSession<T> {
    pub fn with_time(time: T) -> Self {
        Self {
            time,
            rng: Box::new(rand::thread_rng()),
            listeners: Vec::new(),
            countdown: CountdownTimer::new(),
            clock: SessionClock::new(),
            effects: EffectTracker::new(),
            notices: TimerTable::new(),
            state: SessionState::default(),
        }
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Applies startup preferences. Emits nothing.
    pub fn with_config(mut self, config: &Config) -> Self {
        let duration = normalize_duration(&config.duration_secs.to_string());
        self.state.duration = duration;
        self.state.duration_input = duration.to_string();
        self.state.time_left = duration;
        self.state.orientation = config.orientation;
        self.state.hints_enabled = config.show_hints;
        self
    }

    pub fn subscribe(&mut self, listener: impl SessionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in self.listeners.iter_mut() {
            listener.on_event(&event);
        }
    }

    fn is_busy(&self) -> bool {
        self.state.active || self.countdown.is_counting()
    }

    /// Stores raw duration text as typed. Normalisation waits for `commit_duration`.
    pub fn edit_duration(&mut self, text: &str) {
        if self.is_busy() {
            debug!("duration edit ignored while a session is running");
            return;
        }
        self.state.duration_input = text.to_string();
    }

    pub fn commit_duration(&mut self) {
        if self.is_busy() {
            debug!("duration commit ignored while a session is running");
            return;
        }
        self.apply_duration_input();
    }

    pub fn configure(&mut self, text: &str) {
        if self.is_busy() {
            debug!("configure ignored while a session is running");
            return;
        }
        self.state.duration_input = text.to_string();
        self.apply_duration_input();
    }

    fn apply_duration_input(&mut self) {
        let seconds = normalize_duration(&self.state.duration_input);
        self.state.duration_input = seconds.to_string();
        if seconds != self.state.duration {
            self.state.duration = seconds;
            self.state.time_left = seconds;
            debug!(seconds, "duration changed");
            self.emit(SessionEvent::DurationChanged { seconds });
        }
    }

    /// Starts the 3-2-1 countdown; play begins when it completes.
    pub fn request_start(&mut self) {
        if self.is_busy() {
            debug!("start requested while counting down or playing; ignored");
            return;
        }
        let now = self.time.now();
        self.countdown
            .start(COUNTDOWN_START, now, CountdownCompletion::BeginPlay);
        self.emit(SessionEvent::CountdownStarted);
    }

    pub fn begin_play(&mut self) {
        if self.state.active {
            debug!("begin_play called on an active session; ignored");
            return;
        }
        self.countdown.cancel();
        self.notices.cancel(&Notice::ScrollToResults);
        self.apply_duration_input();

        let now = self.time.now();
        let first = pick_random(&mut self.rng);
        let state = &mut self.state;
        state.score = 0;
        state.time_left = state.duration;
        state.active = true;
        state.ended = false;
        state.guesses.clear();
        state.target = Some(first);
        state.first_square_blinking = true;
        state.hints_used = false;
        state.started_at = Some(now);
        self.effects.clear_all();
        self.clock.start(self.state.duration, now);

        info!(
            duration = self.state.duration,
            orientation = %self.state.orientation,
            hints = self.state.hints_enabled,
            "session started"
        );
        self.emit(SessionEvent::SessionStarted {
            duration_secs: self.state.duration,
            orientation: self.state.orientation,
            hints_enabled: self.state.hints_enabled,
        });
    }

    /// Evaluates a guess against the target. Returns the record if the guess was accepted.
    pub fn submit_guess(&mut self, raw: &str) -> Option<GuessRecord> {
        if !self.state.active {
            return None;
        }
        let guess = raw.trim().to_lowercase();
        if guess.is_empty() {
            return None;
        }
        let target = self.state.target?;
        let correct = guess == target.to_string();

        let record = GuessRecord {
            target,
            guess: guess.clone(),
            correct,
        };
        self.state.guesses.push(record.clone());

        if correct {
            self.state.score += 1;
            self.state.first_square_blinking = false;
            self.state.target = Some(pick_different(&mut self.rng, Some(target)));
        } else {
            let now = self.time.now();
            self.effects.mark_incorrect(target, now);
        }

        debug!(%target, %guess, correct, score = self.state.score, "guess submitted");
        self.emit(SessionEvent::GuessSubmitted {
            correct,
            target,
            guess,
            time_left: self.state.time_left,
        });
        self.emit(SessionEvent::FocusRequested);
        Some(record)
    }

    pub fn end_session(&mut self) {
        if self.state.ended {
            return;
        }
        let now = self.time.now();
        let elapsed = self
            .state
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();

        self.state.ended = true;
        self.state.active = false;
        self.state.target = None;
        self.clock.stop();
        self.state.high_score = self.state.high_score.max(self.state.score);
        self.notices
            .schedule(Notice::ScrollToResults, now + RESULTS_SCROLL_DELAY);

        info!(
            score = self.state.score,
            high_score = self.state.high_score,
            guesses = self.state.guesses.len(),
            "session ended"
        );
        self.emit(SessionEvent::SessionEnded {
            final_score: self.state.score,
            elapsed,
            hints_used: self.state.hints_used,
            guess_count: self.state.guesses.len(),
        });
    }

    pub fn toggle_hints(&mut self) {
        self.state.hints_enabled = !self.state.hints_enabled;
        // hint usage only latches while a session is running
        if self.state.hints_enabled && self.state.active {
            self.state.hints_used = true;
        }
        let enabled = self.state.hints_enabled;
        self.emit(SessionEvent::HintsToggled { enabled });
    }

    pub fn toggle_board_orientation(&mut self) {
        self.state.orientation = self.state.orientation.flipped();
        let orientation = self.state.orientation;
        self.emit(SessionEvent::BoardFlipped { orientation });
    }

    /// Lets the session observe elapsed time. Call every `TICK_RATE_MS` or so.
    pub fn tick(&mut self) {
        let now = self.time.now();

        if let Some(CountdownCompletion::BeginPlay) = self.countdown.poll(now) {
            self.begin_play();
        }

        if self.state.active {
            let reading = self.clock.poll(now);
            self.state.time_left = reading.remaining;
            if reading.expired {
                self.end_session();
            }
        }

        for square in self.effects.expire(now) {
            debug!(%square, "effect cleared");
        }

        for notice in self.notices.take_due(now) {
            match notice {
                Notice::ScrollToResults => self.emit(SessionEvent::ScrollToResults),
            }
        }
    }

    pub fn variant_for(&self, square: Square) -> SquareVariant {
        if self.countdown.is_counting() || self.state.target != Some(square) {
            return SquareVariant::Base;
        }
        if self.effects.effect(square) == Effect::Incorrect {
            SquareVariant::Incorrect
        } else if self.state.first_square_blinking {
            SquareVariant::FirstBlink
        } else {
            SquareVariant::Highlighted
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            countdown: self.countdown.value(),
        }
    }

    pub fn effect(&self, square: Square) -> Effect {
        self.effects.effect(square)
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn countdown_value(&self) -> Option<u32> {
        self.countdown.value()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn high_score(&self) -> u32 {
        self.state.high_score
    }

    pub fn time_left(&self) -> u32 {
        self.state.time_left
    }

    pub fn target(&self) -> Option<Square> {
        self.state.target
    }

    pub fn guesses(&self) -> &[GuessRecord] {
        &self.state.guesses
    }

    pub fn duration(&self) -> u32 {
        self.state.duration
    }

    pub fn duration_input(&self) -> &str {
        &self.state.duration_input
    }

    pub fn hints_enabled(&self) -> bool {
        self.state.hints_enabled
    }

    pub fn hints_used(&self) -> bool {
        self.state.hints_used
    }

    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    pub fn first_square_blinking(&self) -> bool {
        self.state.first_square_blinking
    }
}
