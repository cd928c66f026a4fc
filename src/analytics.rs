use crate::events::{SessionEvent, SessionListener};
use chrono::Local;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Write};

/// A named analytics event with free-form parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub params: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics write failed: {0}")]
    Io(#[from] io::Error),
    #[error("analytics encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where analytics events go. Delivery is best effort.
pub trait AnalyticsSink {
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), AnalyticsError>;
}

/// Maps session events to analytics events. UI-only signals have no analytics counterpart.
pub fn to_analytics(event: &SessionEvent) -> Option<AnalyticsEvent> {
    let (name, params) = match event {
        SessionEvent::SessionStarted {
            duration_secs,
            orientation,
            hints_enabled,
        } => (
            "game_start",
            json!({
                "duration": duration_secs,
                "orientation": orientation.to_string(),
                "hints": hints_enabled,
            }),
        ),
        SessionEvent::SessionEnded {
            final_score,
            elapsed,
            hints_used,
            guess_count,
        } => (
            "game_end",
            json!({
                "score": final_score,
                "elapsed_secs": elapsed.as_secs_f64(),
                "hints_used": hints_used,
                "guesses": guess_count,
            }),
        ),
        SessionEvent::GuessSubmitted {
            correct,
            target,
            guess,
            time_left,
        } => (
            "guess",
            json!({
                "correct": correct,
                "square": target.to_string(),
                "guess": guess,
                "time_left": time_left,
            }),
        ),
        SessionEvent::HintsToggled { enabled } => ("toggle_hints", json!({ "enabled": enabled })),
        SessionEvent::BoardFlipped { orientation } => (
            "flip_board",
            json!({ "orientation": orientation.to_string() }),
        ),
        SessionEvent::DurationChanged { seconds } => {
            ("change_duration", json!({ "seconds": seconds }))
        }
        SessionEvent::CountdownStarted
        | SessionEvent::FocusRequested
        | SessionEvent::ScrollToResults => return None,
    };
    Some(AnalyticsEvent { name, params })
}

/// Session listener that forwards to an analytics sink and swallows failures.
pub struct AnalyticsListener<S: AnalyticsSink> {
    sink: S,
    dropped: u64,
}

impl<S: AnalyticsSink> AnalyticsListener<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, dropped: 0 }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: AnalyticsSink> SessionListener for AnalyticsListener<S> {
    fn on_event(&mut self, event: &SessionEvent) {
        let Some(analytics) = to_analytics(event) else {
            return;
        };
        if let Err(e) = self.sink.send(&analytics) {
            self.dropped += 1;
            tracing::warn!(event = analytics.name, error = %e, "analytics event dropped");
        }
    }
}

/// Writes one timestamped JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AnalyticsSink for JsonLinesSink<W> {
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let line = json!({
            "ts": Local::now().to_rfc3339(),
            "event": event.name,
            "params": event.params,
        });
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Orientation;
    use std::time::Duration;

    struct FailingSink;

    impl AnalyticsSink for FailingSink {
        fn send(&mut self, _event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "offline").into())
        }
    }

    #[test]
    fn test_maps_domain_events() {
        let ev = to_analytics(&SessionEvent::SessionStarted {
            duration_secs: 30,
            orientation: Orientation::Black,
            hints_enabled: true,
        })
        .unwrap();
        assert_eq!(ev.name, "game_start");
        assert_eq!(ev.params["duration"], 30);
        assert_eq!(ev.params["orientation"], "black");
        assert_eq!(ev.params["hints"], true);

        let ev = to_analytics(&SessionEvent::SessionEnded {
            final_score: 12,
            elapsed: Duration::from_millis(1500),
            hints_used: false,
            guess_count: 14,
        })
        .unwrap();
        assert_eq!(ev.name, "game_end");
        assert_eq!(ev.params["elapsed_secs"], 1.5);
        assert_eq!(ev.params["guesses"], 14);
    }

    #[test]
    fn test_ui_signals_are_not_analytics() {
        assert!(to_analytics(&SessionEvent::FocusRequested).is_none());
        assert!(to_analytics(&SessionEvent::ScrollToResults).is_none());
        assert!(to_analytics(&SessionEvent::CountdownStarted).is_none());
    }

    #[test]
    fn test_json_lines_sink_writes_one_line_per_event() {
        let mut listener = AnalyticsListener::new(JsonLinesSink::new(Vec::new()));
        listener.on_event(&SessionEvent::HintsToggled { enabled: true });
        listener.on_event(&SessionEvent::FocusRequested);
        listener.on_event(&SessionEvent::DurationChanged { seconds: 45 });

        let out = String::from_utf8(listener.sink().writer.clone()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "toggle_hints");
        assert_eq!(first["params"]["enabled"], true);
        assert!(first["ts"].is_string());
    }

    #[test]
    fn test_failures_are_counted_not_raised() {
        let mut listener = AnalyticsListener::new(FailingSink);
        listener.on_event(&SessionEvent::BoardFlipped {
            orientation: Orientation::Black,
        });
        listener.on_event(&SessionEvent::FocusRequested);
        assert_eq!(listener.dropped(), 1);
    }
}
