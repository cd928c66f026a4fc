use crate::square::{FILES, RANKS};
use serde::{Deserialize, Serialize};

/// How keystrokes become guesses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryMode {
    /// Free typing; Enter submits.
    #[default]
    Text,
    /// A file letter, then a rank digit that submits on its own.
    Keypad,
}

/// Result of feeding one key to the entry buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    Ignored,
    Edited,
    Submit(String),
}

/// Guess being composed by the player.
#[derive(Debug, Clone, Default)]
pub struct GuessEntry {
    mode: EntryMode,
    buffer: String,
}

const MAX_TEXT_LEN: usize = 8;

impl GuessEntry {
    pub fn new(mode: EntryMode) -> Self {
        Self {
            mode,
            buffer: String::new(),
        }
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn push(&mut self, c: char) -> EntryAction {
        match self.mode {
            EntryMode::Text => {
                if c.is_control() || self.buffer.chars().count() >= MAX_TEXT_LEN {
                    return EntryAction::Ignored;
                }
                self.buffer.push(c);
                EntryAction::Edited
            }
            EntryMode::Keypad => {
                let c = c.to_ascii_lowercase();
                if FILES.contains(&c) && self.buffer.is_empty() {
                    self.buffer.push(c);
                    EntryAction::Edited
                } else if RANKS.contains(&c) && self.buffer.chars().count() == 1 {
                    self.buffer.push(c);
                    EntryAction::Submit(std::mem::take(&mut self.buffer))
                } else {
                    EntryAction::Ignored
                }
            }
        }
    }

    pub fn backspace(&mut self) -> EntryAction {
        match self.buffer.pop() {
            Some(_) => EntryAction::Edited,
            None => EntryAction::Ignored,
        }
    }

    /// Enter key. Keypad mode submits by itself, so Enter only matters for text entry.
    pub fn enter(&mut self) -> EntryAction {
        match self.mode {
            EntryMode::Text if !self.buffer.trim().is_empty() => {
                EntryAction::Submit(std::mem::take(&mut self.buffer))
            }
            _ => EntryAction::Ignored,
        }
    }
}
