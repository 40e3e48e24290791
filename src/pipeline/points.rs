use thiserror::Error;

use crate::domain::types::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointsTableError {
    #[error("points table must not be empty")]
    Empty,

    #[error("points table must be non-increasing by position")]
    NotMonotonic,
}

/// Position -> score mapping. The mapping is configuration, not domain
/// logic; swap the table to change the scoring scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsTable {
    table: Vec<u32>,
}

impl PointsTable {
    /// Standard FIA scheme: top ten positions score, the rest get zero
    pub const STANDARD: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

    pub fn new(table: Vec<u32>) -> Result<Self, PointsTableError> {
        if table.is_empty() {
            return Err(PointsTableError::Empty);
        }
        if table.windows(2).any(|w| w[1] > w[0]) {
            return Err(PointsTableError::NotMonotonic);
        }
        Ok(Self { table })
    }

    /// Score for a position; positions beyond the table score zero
    pub fn points_for(&self, position: Position) -> u32 {
        let idx = (position.as_u8() - 1) as usize;
        self.table.get(idx).copied().unwrap_or(0)
    }
}

impl Default for PointsTable {
    fn default() -> Self {
        Self {
            table: Self::STANDARD.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(n: u32) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_standard_table_values() {
        let table = PointsTable::default();
        assert_eq!(table.points_for(pos(1)), 25);
        assert_eq!(table.points_for(pos(2)), 18);
        assert_eq!(table.points_for(pos(10)), 1);
        assert_eq!(table.points_for(pos(11)), 0);
        assert_eq!(table.points_for(pos(20)), 0);
    }

    #[test]
    fn test_points_never_increase_with_worse_position() {
        let table = PointsTable::default();
        let mut prev = u32::MAX;
        for p in 1..=20u32 {
            let points = table.points_for(pos(p));
            assert!(points <= prev);
            prev = points;
        }
    }

    #[test]
    fn test_custom_table() {
        let table = PointsTable::new(vec![10, 5, 1]).unwrap();
        assert_eq!(table.points_for(pos(1)), 10);
        assert_eq!(table.points_for(pos(3)), 1);
        assert_eq!(table.points_for(pos(4)), 0);
    }

    #[test]
    fn test_rejects_increasing_table() {
        assert_eq!(
            PointsTable::new(vec![10, 15, 1]),
            Err(PointsTableError::NotMonotonic)
        );
        assert_eq!(PointsTable::new(vec![]), Err(PointsTableError::Empty));
    }
}
