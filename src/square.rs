use rand::Rng;
use std::fmt;
use std::str::FromStr;

pub const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
pub const RANKS: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];

/// One of the 64 board coordinates, e.g. `e4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a board square: {0:?}")]
pub struct ParseSquareError(pub String);

impl Square {
    /// Builds a square from zero-based file and rank indices.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    pub fn file(&self) -> char {
        FILES[self.file as usize]
    }

    pub fn rank(&self) -> char {
        RANKS[self.rank as usize]
    }

    pub fn file_index(&self) -> u8 {
        self.file
    }

    pub fn rank_index(&self) -> u8 {
        self.rank
    }

    /// All 64 squares, file-major (a1, a2, ..., h8).
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|file| (0..8u8).map(move |rank| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let mut chars = normalized.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => {
                let file = FILES.iter().position(|c| *c == f);
                let rank = RANKS.iter().position(|c| *c == r);
                match (file, rank) {
                    (Some(file), Some(rank)) => Ok(Square {
                        file: file as u8,
                        rank: rank as u8,
                    }),
                    _ => Err(ParseSquareError(s.to_string())),
                }
            }
            _ => Err(ParseSquareError(s.to_string())),
        }
    }
}

/// Uniform pick over the whole board.
pub fn pick_random<R: Rng + ?Sized>(rng: &mut R) -> Square {
    Square {
        file: rng.gen_range(0..8),
        rank: rng.gen_range(0..8),
    }
}

/// Picks a square that differs from `current`. With no current square any pick is valid.
pub fn pick_different<R: Rng + ?Sized>(rng: &mut R, current: Option<Square>) -> Square {
    loop {
        let candidate = pick_random(rng);
        if Some(candidate) != current {
            return candidate;
        }
    }
}
