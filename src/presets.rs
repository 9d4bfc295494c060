//! Built-in Sudoku puzzles, selectable by name from the CLI.

/// Look up a preset board by name. 0 means blank.
pub fn sudoku_preset(name: &str) -> Option<[[u8; 9]; 9]> {
    match name {
        "easy" => Some(EASY),
        "medium" => Some(MEDIUM),
        "hard" => Some(HARD),
        "empty" => Some([[0; 9]; 9]),
        _ => None,
    }
}

pub const PRESET_NAMES: &[&str] = &["easy", "medium", "hard", "empty"];

const EASY: [[u8; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

const MEDIUM: [[u8; 9]; 9] = [
    [0, 0, 0, 6, 0, 0, 4, 0, 0],
    [7, 0, 0, 0, 0, 3, 6, 0, 0],
    [0, 0, 0, 0, 9, 1, 0, 8, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 5, 0, 1, 8, 0, 0, 0, 3],
    [0, 0, 0, 3, 0, 6, 0, 4, 5],
    [0, 4, 0, 2, 0, 0, 0, 6, 0],
    [9, 0, 3, 0, 0, 0, 0, 0, 0],
    [0, 2, 0, 0, 0, 0, 1, 0, 0],
];

const HARD: [[u8; 9]; 9] = [
    [0, 0, 0, 0, 0, 0, 6, 8, 0],
    [0, 0, 0, 0, 4, 6, 0, 0, 0],
    [7, 0, 0, 0, 0, 0, 0, 0, 9],
    [0, 5, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 6, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 4, 0, 0, 0, 0, 0, 0, 2],
    [0, 0, 0, 0, 2, 0, 0, 0, 0],
    [0, 0, 5, 2, 0, 0, 0, 0, 0],
];
