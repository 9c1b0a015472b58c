//! Result sorting for query execution
//!
//! Multi-key stable sort. Earlier keys take precedence; records that tie on
//! every key keep their scan (id) order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{FlintError, Result};
use crate::record::Record;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

impl FromStr for Direction {
    type Err = FlintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            other => Err(FlintError::Parse(format!("unknown sort direction \"{}\"", other))),
        }
    }
}

/// One `ORDER BY` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Desc)
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match (a.get(&self.column), b.get(&self.column)) {
            (Some(x), Some(y)) => x.total_cmp(y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        };

        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// Sorts result records
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts records by `keys` in precedence order
    ///
    /// `sort_by` is stable, so the final tie-break is the incoming order.
    pub fn sort(records: &mut [Record], keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }

        records.sort_by(|a, b| {
            keys.iter()
                .map(|key| key.compare(a, b))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}
