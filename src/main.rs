mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use square_drill::{
    analytics::{AnalyticsListener, JsonLinesSink},
    config::{Config, ConfigSource, FileConfigSource},
    duration::normalize_duration,
    events::{EventLog, SessionEvent},
    input::{EntryAction, EntryMode, GuessEntry},
    logging::init_logging,
    runtime::{DrillInput, Runner, TerminalInput},
    session::GameSession,
    Orientation,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};
use tracing::{info, warn};

/// timed drill for naming chessboard squares
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A square is highlighted on a chessboard; type its name (e.g. e4) before the clock runs out. Every correct answer scores a point and moves the highlight."
)]
pub struct Cli {
    /// number of seconds per session (5-600)
    #[clap(short = 't', long)]
    time: Option<String>,

    /// view the board from Black's side
    #[clap(long)]
    black: bool,

    /// show rank and file labels around the board
    #[clap(long)]
    hints: bool,

    /// keypad entry: a file letter followed by a rank digit submits immediately
    #[clap(long)]
    keypad: bool,

    /// JSON config file with default settings
    #[clap(long)]
    config: Option<PathBuf>,

    /// seed for square selection (repeatable drills)
    #[clap(long)]
    seed: Option<u64>,

    /// write logs to this file (level from SQUARE_DRILL_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// append analytics events as JSON lines to this file
    #[clap(long)]
    analytics_log: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags override whatever the config file says.
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(ref time) = self.time {
            config.duration_secs = normalize_duration(time);
        }
        if self.black {
            config.orientation = Orientation::Black;
        }
        if self.hints {
            config.show_hints = true;
        }
        if self.keypad {
            config.entry_mode = EntryMode::Keypad;
        }
        config
    }

    fn load_config(&self) -> Config {
        let source = match self.config {
            Some(ref path) => FileConfigSource::with_path(path),
            None => FileConfigSource::new(),
        };
        let base = source.load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default settings");
            Config::default()
        });
        self.apply_to(base)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Ready,
    Countdown,
    Playing,
    Results,
}

pub struct App {
    pub session: GameSession,
    pub entry: GuessEntry,
    pub ui_events: EventLog,
    pub show_results: bool,
    pub epoch: Instant,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let config = cli.load_config();
        let mut session = GameSession::new().with_config(&config);
        if let Some(seed) = cli.seed {
            use rand::SeedableRng;
            session = session.with_rng(rand::rngs::StdRng::seed_from_u64(seed));
        }

        let ui_events = EventLog::new();
        session.subscribe(ui_events.clone());

        if let Some(ref path) = cli.analytics_log {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            session.subscribe(AnalyticsListener::new(JsonLinesSink::new(file)));
        }

        info!(?config, "settings loaded");
        Ok(Self {
            session,
            entry: GuessEntry::new(config.entry_mode),
            ui_events,
            show_results: false,
            epoch: Instant::now(),
        })
    }

    pub fn state(&self) -> AppState {
        if self.session.countdown_value().is_some() {
            AppState::Countdown
        } else if self.session.is_active() {
            AppState::Playing
        } else if self.session.guesses().is_empty() {
            AppState::Ready
        } else {
            AppState::Results
        }
    }

    /// Reacts to UI signals the session emitted since the last call.
    fn drain_ui_events(&mut self) {
        for event in self.ui_events.drain() {
            match event {
                SessionEvent::FocusRequested => self.entry.clear(),
                SessionEvent::ScrollToResults => self.show_results = true,
                SessionEvent::CountdownStarted => {
                    self.show_results = false;
                    self.entry.clear();
                }
                _ => {}
            }
        }
    }

    fn submit(&mut self, action: EntryAction) {
        if let EntryAction::Submit(text) = action {
            self.session.submit_guess(&text);
        }
    }

    /// Returns false when the app should exit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return false;
        }

        match key.code {
            KeyCode::Tab => self.session.toggle_board_orientation(),
            KeyCode::Char('?') => self.session.toggle_hints(),
            _ => match self.state() {
                AppState::Playing => match key.code {
                    KeyCode::Enter => {
                        let action = self.entry.enter();
                        self.submit(action);
                    }
                    KeyCode::Backspace => {
                        self.entry.backspace();
                    }
                    KeyCode::Char(c) => {
                        let action = self.entry.push(c);
                        self.submit(action);
                    }
                    _ => {}
                },
                AppState::Countdown => {}
                AppState::Ready | AppState::Results => match key.code {
                    KeyCode::Enter => {
                        self.session.commit_duration();
                        self.session.request_start();
                    }
                    KeyCode::Backspace => {
                        let mut text = self.session.duration_input().to_string();
                        text.pop();
                        self.session.edit_duration(&text);
                    }
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        let mut text = self.session.duration_input().to_string();
                        if text.len() < 3 {
                            text.push(c);
                            self.session.edit_duration(&text);
                        }
                    }
                    _ => {}
                },
            },
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.as_deref())?;
    let mut app = App::new(&cli)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(TerminalInput::spawn());

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if let Some(DrillInput::Key(key)) = runner.step(&mut app.session) {
            if !app.on_key(key) {
                break;
            }
        }
        app.drain_ui_events();
    }

    app.session.end_session();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// App built against a config path inside a fresh temp dir, so the
    /// user's own config is never read.
    fn app_with(args: &[&str]) -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.json");
        let mut argv = vec!["square-drill", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        let app = App::new(&Cli::parse_from(argv)).unwrap();
        (app, dir)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["square-drill"]);
        assert_eq!(cli.time, None);
        assert!(!cli.black);
        assert!(!cli.hints);
        assert!(!cli.keypad);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.apply_to(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_time() {
        let cli = Cli::parse_from(["square-drill", "-t", "45"]);
        assert_eq!(cli.time.as_deref(), Some("45"));

        let cli = Cli::parse_from(["square-drill", "--time", "2"]);
        assert_eq!(cli.apply_to(Config::default()).duration_secs, 5);

        let cli = Cli::parse_from(["square-drill", "--time", "soon"]);
        assert_eq!(cli.apply_to(Config::default()).duration_secs, 30);
    }

    #[test]
    fn test_config_file_values_are_overridden_by_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"duration_secs": 90, "orientation": "white", "show_hints": false, "entry_mode": "text"}"#,
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let plain = Cli::parse_from(["square-drill", "--config", path]).load_config();
        assert_eq!(plain.duration_secs, 90);
        assert_eq!(plain.orientation, Orientation::White);

        let cli = Cli::parse_from([
            "square-drill",
            "--config",
            path,
            "-t",
            "20",
            "--black",
            "--hints",
            "--keypad",
        ]);
        let config = cli.load_config();
        assert_eq!(config.duration_secs, 20);
        assert_eq!(config.orientation, Orientation::Black);
        assert!(config.show_hints);
        assert_eq!(config.entry_mode, EntryMode::Keypad);
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let cli = Cli::parse_from(["square-drill", "--config", path.to_str().unwrap(), "--black"]);
        let config = cli.load_config();
        assert_eq!(config.duration_secs, 30);
        assert_eq!(config.orientation, Orientation::Black);
    }

    #[test]
    fn test_app_starts_ready_with_flags_applied() {
        let (app, _dir) = app_with(&["-t", "45", "--keypad", "--black"]);
        assert_eq!(app.state(), AppState::Ready);
        assert_eq!(app.session.duration(), 45);
        assert_eq!(app.session.duration_input(), "45");
        assert_eq!(app.session.orientation(), Orientation::Black);
        assert_eq!(app.entry.mode(), EntryMode::Keypad);
    }

    #[test]
    fn test_digits_edit_duration_up_to_three_chars() {
        let (mut app, _dir) = app_with(&[]);
        assert_eq!(app.session.duration_input(), "30");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.duration_input(), "");

        type_str(&mut app, "4x5");
        assert_eq!(app.session.duration_input(), "45");
        type_str(&mut app, "12");
        assert_eq!(app.session.duration_input(), "451");
    }

    #[test]
    fn test_enter_commits_duration_then_counts_down() {
        let (mut app, _dir) = app_with(&[]);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "2");

        assert!(press(&mut app, KeyCode::Enter));
        assert_eq!(app.session.duration(), 5);
        assert_eq!(app.session.duration_input(), "5");
        assert_eq!(app.state(), AppState::Countdown);
        assert_eq!(app.session.countdown_value(), Some(3));
    }

    #[test]
    fn test_blank_duration_commits_default() {
        let (mut app, _dir) = app_with(&["-t", "60"]);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.duration(), 30);
        assert_eq!(app.session.duration_input(), "30");
    }

    #[test]
    fn test_keys_ignored_during_countdown() {
        let (mut app, _dir) = app_with(&[]);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state(), AppState::Countdown);

        type_str(&mut app, "9");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.duration_input(), "30");
        assert_eq!(app.session.countdown_value(), Some(3));
        assert!(app.entry.text().is_empty());
    }

    #[test]
    fn test_playing_keys_go_to_the_entry() {
        let (mut app, _dir) = app_with(&[]);
        app.session.begin_play();
        assert_eq!(app.state(), AppState::Playing);

        type_str(&mut app, "z9");
        assert_eq!(app.entry.text(), "z9");
        assert_eq!(app.session.duration_input(), "30");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.guesses().len(), 1);
        assert!(!app.session.guesses()[0].correct);
    }

    #[test]
    fn test_results_state_accepts_duration_edits() {
        let (mut app, _dir) = app_with(&[]);
        app.session.begin_play();
        app.session.submit_guess("z9");
        app.session.end_session();
        assert_eq!(app.state(), AppState::Results);

        type_str(&mut app, "7");
        assert_eq!(app.session.duration_input(), "307");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.duration(), 307);
        assert_eq!(app.state(), AppState::Countdown);
    }

    #[test]
    fn test_toggles_work_in_any_state() {
        let (mut app, _dir) = app_with(&[]);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.session.orientation(), Orientation::Black);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.session.hints_enabled());
        assert_eq!(app.session.duration_input(), "30");
    }

    #[test]
    fn test_esc_and_ctrl_c_quit() {
        let (mut app, _dir) = app_with(&[]);
        assert!(!press(&mut app, KeyCode::Esc));
        assert!(!app.on_key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(press(&mut app, KeyCode::Char('c')));
    }
}
