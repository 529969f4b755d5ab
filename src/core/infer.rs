// Column type inference over a bounded sample of tokenized rows.
use std::fmt;

use serde::Serialize;

pub const DEFAULT_SAMPLE_ROWS: usize = 1000;

/// Storage type for a loaded column, ordered from narrowest to widest.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Narrowest type able to hold `value`; empty values carry no information.
    fn of(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        if value.parse::<i64>().is_ok() {
            return Some(ColumnType::Integer);
        }
        match value.parse::<f64>() {
            Ok(real) if real.is_finite() => Some(ColumnType::Real),
            _ => Some(ColumnType::Text),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

#[derive(Clone, Debug)]
pub struct TypeInferencer {
    flags: Vec<ColumnType>,
}

impl TypeInferencer {
    pub fn new(columns: usize) -> Self {
        Self {
            flags: vec![ColumnType::Integer; columns],
        }
    }

    /// Widen column flags with one sampled row. Cells past the column count
    /// are ignored and missing trailing cells leave their flags alone.
    pub fn observe<S: AsRef<str>>(&mut self, row: &[S]) {
        for (flag, cell) in self.flags.iter_mut().zip(row) {
            if let Some(seen) = ColumnType::of(cell.as_ref()) {
                *flag = (*flag).max(seen);
            }
        }
    }

    pub fn finish(self) -> Vec<ColumnType> {
        self.flags
    }
}
