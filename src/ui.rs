use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use square_drill::{
    board::is_light,
    input::EntryMode,
    square::FILES,
    SquareVariant,
};

use crate::{App, AppState};

const CELL_WIDTH: usize = 4;
const CELL_HEIGHT: usize = 2;
const RANK_GUTTER: usize = 3;
const BOARD_WIDTH: u16 = (RANK_GUTTER + CELL_WIDTH * 8) as u16;
const BOARD_HEIGHT: u16 = (CELL_HEIGHT * 8 + 1) as u16;
const BLINK_PERIOD_MS: u128 = 400;

pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),            // title
            Constraint::Length(3),            // scoreboard
            Constraint::Length(BOARD_HEIGHT), // board
            Constraint::Length(6),            // controls
            Constraint::Min(0),               // results
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_scoreboard(app, f, chunks[1]);
    render_board(app, f, centered(chunks[2], BOARD_WIDTH, BOARD_HEIGHT));
    render_controls(app, f, chunks[3]);

    if app.show_results && app.state() == AppState::Results {
        render_results(app, f, chunks[4]);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Paragraph::new(vec![
        Line::from(Span::styled("Chess Square Trainer", bold)),
        Line::from(Span::styled(
            "How fast can you identify chess squares?",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_scoreboard(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let side = session.orientation().side_label();
    let dim = Style::default().add_modifier(Modifier::DIM);

    let lines = if session.is_active() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        vec![
            Line::from(Span::styled(
                format!("Time Left: {}s", session.time_left()),
                bold,
            )),
            Line::from(progress_bar(session.time_left(), session.duration(), 24)),
            Line::from(vec![
                Span::raw(format!("Score: {}   ", session.score())),
                Span::styled(side, dim),
            ]),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("Time: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("[{:>3}]s", session.duration_input()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw("   "),
                Span::styled(side, dim),
            ]),
            Line::from(Span::styled(
                "type digits to set the time · Tab flips the board · ? toggles hints",
                dim,
            )),
        ]
    };

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn progress_bar(remaining: u32, total: u32, width: usize) -> Span<'static> {
    let filled = if total == 0 {
        0
    } else {
        (remaining as usize * width) / total as usize
    };
    Span::styled(
        format!("{}{}", "█".repeat(filled.min(width)), "░".repeat(width - filled.min(width))),
        Style::default().fg(Color::Indexed(61)),
    )
}

fn variant_style(variant: SquareVariant, light: bool, blink_on: bool) -> Style {
    let base = if light { Color::White } else { Color::Gray };
    let bg = match variant {
        SquareVariant::Base => base,
        SquareVariant::Highlighted => Color::Yellow,
        SquareVariant::Incorrect => Color::Red,
        SquareVariant::FirstBlink if blink_on => Color::LightYellow,
        SquareVariant::FirstBlink => Color::Yellow,
    };
    Style::default().bg(bg)
}

fn render_board(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let orientation = session.orientation();
    let hints = session.hints_enabled();
    let blink_on = (app.epoch.elapsed().as_millis() / BLINK_PERIOD_MS) % 2 == 0;
    let label_style = Style::default().fg(Color::DarkGray);

    let mut lines: Vec<Line> = Vec::with_capacity(BOARD_HEIGHT as usize);
    for (row, squares) in orientation.rows().iter().enumerate() {
        for sub in 0..CELL_HEIGHT {
            let gutter = match squares.first() {
                Some(sq) if hints && sub == 0 => format!(" {} ", sq.rank()),
                _ => " ".repeat(RANK_GUTTER),
            };
            let mut spans = vec![Span::styled(gutter, label_style)];
            spans.extend(squares.iter().enumerate().map(|(col, sq)| {
                let style = variant_style(session.variant_for(*sq), is_light(row, col), blink_on);
                Span::styled(" ".repeat(CELL_WIDTH), style)
            }));
            lines.push(Line::from(spans));
        }
    }

    if hints {
        let mut footer = " ".repeat(RANK_GUTTER);
        for file in orientation.files_left_to_right() {
            footer.push_str(&format!(
                " {}  ",
                FILES[file as usize].to_ascii_uppercase()
            ));
        }
        lines.push(Line::from(Span::styled(footer, label_style)));
    }

    f.render_widget(Paragraph::new(lines), area);

    if let Some(n) = session.countdown_value() {
        let overlay = centered(area, 11, 3);
        f.render_widget(Clear, overlay);
        f.render_widget(
            Paragraph::new(Span::styled(
                n.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
            overlay,
        );
    }
}

fn render_controls(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let lines = match app.state() {
        AppState::Playing | AppState::Countdown => {
            let text = app.entry.text();
            let shown = if text.is_empty() {
                Span::styled("Enter square e.g. e4", dim)
            } else {
                Span::styled(text.to_string(), bold)
            };
            vec![
                Line::from(vec![Span::raw("> "), shown]),
                Line::from(Span::styled(
                    match app.entry.mode() {
                        EntryMode::Text => "type the square and press Enter · Esc quits",
                        EntryMode::Keypad => "a file letter then a rank digit · Esc quits",
                    },
                    dim,
                )),
            ]
        }
        AppState::Ready => vec![
            Line::from(Span::styled("Press Enter to start", bold.fg(Color::Green))),
            Line::from(Span::styled("How to Play", bold)),
            Line::from("1. Press Enter. A square on the board will be highlighted."),
            Line::from("2. Type its name (e.g. e4)."),
            Line::from("3. Guess right to earn a point and get a new square."),
        ],
        AppState::Results => vec![
            Line::from(Span::styled("Press Enter to play again", bold.fg(Color::Green))),
            Line::from(Span::styled(
                format!(
                    "Your Final Score: {}{}",
                    session.score(),
                    if session.hints_used() { " (with hints)" } else { "" }
                ),
                bold,
            )),
            Line::from(format!("High Score: {}", session.high_score())),
        ],
    };

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_results(app: &App, f: &mut Frame, area: Rect) {
    let guesses = app.session.guesses();
    let visible = area.height.saturating_sub(2) as usize;
    let skip = guesses.len().saturating_sub(visible);

    let lines: Vec<Line> = guesses
        .iter()
        .skip(skip)
        .map(|g| {
            let verdict = if g.correct {
                Span::styled(
                    "Correct",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(
                    "Incorrect",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )
            };
            Line::from(vec![
                Span::raw(format!(
                    "Square: {:<3} Your Guess: {:<8} ",
                    g.target.to_string(),
                    g.guess
                )),
                verdict,
            ])
        })
        .collect();

    let panel = centered(area, 48, area.height);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Results")),
        panel,
    );
}
