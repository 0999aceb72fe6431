//! Cell address parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style addresses
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates.
//!
//! # Examples
//!
//! ```ignore
//! let addr = CellAddr::from_str("B3").unwrap();
//! assert_eq!(addr.col, 1);  // 0-indexed
//! assert_eq!(addr.row, 2);
//! assert_eq!(addr.to_string(), "B3");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell position by column and row indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellAddr {
    pub row: usize,
    pub col: usize,
}

impl CellAddr {
    pub fn new(col: usize, row: usize) -> CellAddr {
        CellAddr { row, col }
    }

    /// Parse an address from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellAddr> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<CellAddr> {
        let digits_at = name.find(|c: char| c.is_ascii_digit())?;
        let (letters, numbers) = name.split_at(digits_at);
        if !numbers.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let col = Self::letters_to_col(letters)?;
        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellAddr::new(col, row))
    }

    /// Decode column letters to an index (A -> 0, Z -> 25, AA -> 26).
    /// Returns None for empty or non-alphabetic input, or on overflow.
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
            return None;
        }
        let mut acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            acc = acc.checked_mul(26)?.checked_add(digit)?;
        }
        acc.checked_sub(1)
    }

    /// Convert a column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell address: {}", s))
    }
}

impl fmt::Display for CellAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellAddr::col_to_letters(self.col), self.row + 1)
    }
}
