//! Per-table value grid.
//!
//! Rebuilt from the table's visible text at the start of every calculation
//! pass and discarded afterwards. Formula results are written back into the
//! grid mid-pass so cells processed later in the same pass observe them.

use std::collections::HashMap;

use super::addr::CellAddr;

/// Ephemeral mapping from cell address to numeric value for one table.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    values: HashMap<CellAddr, f64>,
}

impl Grid {
    pub fn new() -> Grid {
        Grid::default()
    }

    /// Value at an address. Addresses never written read as 0.
    pub fn value(&self, addr: &CellAddr) -> f64 {
        self.values.get(addr).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, addr: CellAddr, value: f64) {
        self.values.insert(addr, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_addresses_read_zero() {
        let mut grid = Grid::new();
        grid.set(CellAddr::new(0, 0), 5.0);
        assert_eq!(grid.value(&CellAddr::new(0, 0)), 5.0);
        assert_eq!(grid.value(&CellAddr::new(3, 7)), 0.0);
    }

    #[test]
    fn set_overwrites() {
        let mut grid = Grid::new();
        let addr = CellAddr::new(1, 1);
        grid.set(addr, 1.0);
        grid.set(addr, 2.5);
        assert_eq!(grid.value(&addr), 2.5);
        assert_eq!(grid.len(), 1);
    }
}
