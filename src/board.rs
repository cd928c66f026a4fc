use crate::square::Square;
use serde::{Deserialize, Serialize};

/// Which side of the board faces the player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    #[default]
    White,
    Black,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::White => Orientation::Black,
            Orientation::Black => Orientation::White,
        }
    }

    pub fn side_label(self) -> &'static str {
        match self {
            Orientation::White => "Playing as White",
            Orientation::Black => "Playing as Black",
        }
    }

    /// Rank indices from the top row of the screen to the bottom.
    pub fn ranks_top_to_bottom(self) -> [u8; 8] {
        match self {
            Orientation::White => [7, 6, 5, 4, 3, 2, 1, 0],
            Orientation::Black => [0, 1, 2, 3, 4, 5, 6, 7],
        }
    }

    /// File indices from the left column to the right.
    pub fn files_left_to_right(self) -> [u8; 8] {
        match self {
            Orientation::White => [0, 1, 2, 3, 4, 5, 6, 7],
            Orientation::Black => [7, 6, 5, 4, 3, 2, 1, 0],
        }
    }

    /// The 8x8 grid in screen order.
    pub fn rows(self) -> Vec<Vec<Square>> {
        let files = self.files_left_to_right();
        self.ranks_top_to_bottom()
            .iter()
            .map(|&rank| {
                files
                    .iter()
                    .filter_map(|&file| Square::new(file, rank))
                    .collect()
            })
            .collect()
    }
}

/// Checker colouring by screen position; the top-left cell is light.
pub fn is_light(row: usize, col: usize) -> bool {
    (row + col) % 2 == 0
}

/// How the renderer should draw a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "camelCase")]
pub enum SquareVariant {
    Base,
    Highlighted,
    Incorrect,
    FirstBlink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_layout() {
        let rows = Orientation::White.rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0][0].to_string(), "a8");
        assert_eq!(rows[7][7].to_string(), "h1");
    }

    #[test]
    fn test_black_layout() {
        let rows = Orientation::Black.rows();
        assert_eq!(rows[0][0].to_string(), "h1");
        assert_eq!(rows[7][7].to_string(), "a8");
    }

    #[test]
    fn test_flip_and_labels() {
        assert_eq!(Orientation::White.flipped(), Orientation::Black);
        assert_eq!(Orientation::Black.flipped(), Orientation::White);
        assert_eq!(Orientation::White.side_label(), "Playing as White");
        assert_eq!(Orientation::Black.to_string(), "black");
    }

    #[test]
    fn test_a1_is_dark_from_either_side() {
        // a1 sits bottom-left for White and top-right for Black
        assert!(!is_light(7, 0));
        assert!(!is_light(0, 7));
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(SquareVariant::FirstBlink.to_string(), "firstBlink");
        assert_eq!(SquareVariant::Base.to_string(), "base");
    }
}
