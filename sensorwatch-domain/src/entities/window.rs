// Time window entity
// A bounded, columnar slice of sensor readings handed to the detectors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;
use crate::utils::{finite_or_zero, parse_instant, parse_str_or_zero};

pub const VALUE_COLUMN: &str = "value";
pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const TS_COLUMN: &str = "ts";
pub const SENSOR_ID_COLUMN: &str = "sensor_id";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Instant(DateTime<Utc>),
}

impl Cell {
    /// Numeric view of the cell; text is parsed, everything unusable is 0.0.
    pub fn to_f64_or_zero(&self) -> f64 {
        match self {
            Cell::Number(value) => finite_or_zero(*value),
            Cell::Text(text) => parse_str_or_zero(text),
            Cell::Null | Cell::Instant(_) => 0.0,
        }
    }

    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Instant(at) => Some(*at),
            Cell::Text(text) => parse_instant(text),
            Cell::Null | Cell::Number(_) => None,
        }
    }

    fn to_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(value) if value.is_finite() && value.fract() == 0.0 => Some(*value as i64),
            Cell::Text(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Null)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// True when every cell is a number or null.
    pub fn is_numeric(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| matches!(cell, Cell::Number(_) | Cell::Null))
    }
}

/// One observation as handed in by a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRow {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sensor_id: Option<i64>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl WindowRow {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            sensor_id: None,
            value: Some(value),
        }
    }

    pub fn with_sensor(mut self, sensor_id: i64) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeWindow {
    columns: Vec<Column>,
    rows: usize,
}

impl TimeWindow {
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, WindowError> {
        let rows = columns.first().map(|column| column.cells.len()).unwrap_or(0);
        for (idx, column) in columns.iter().enumerate() {
            if column.cells.len() != rows {
                return Err(WindowError::RaggedColumn {
                    name: column.name.clone(),
                    expected: rows,
                    got: column.cells.len(),
                });
            }
            if columns[..idx].iter().any(|prev| prev.name == column.name) {
                return Err(WindowError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds `timestamp`/`sensor_id` columns only when at least one row carries them.
    pub fn from_rows(rows: &[WindowRow]) -> Self {
        let mut columns = Vec::new();
        if rows.iter().any(|row| row.timestamp.is_some()) {
            let cells = rows
                .iter()
                .map(|row| row.timestamp.map(Cell::Instant).unwrap_or(Cell::Null))
                .collect();
            columns.push(Column::new(TIMESTAMP_COLUMN, cells));
        }
        if rows.iter().any(|row| row.sensor_id.is_some()) {
            let cells = rows
                .iter()
                .map(|row| {
                    row.sensor_id
                        .map(|id| Cell::Number(id as f64))
                        .unwrap_or(Cell::Null)
                })
                .collect();
            columns.push(Column::new(SENSOR_ID_COLUMN, cells));
        }
        columns.push(Column::new(
            VALUE_COLUMN,
            rows.iter().map(|row| Cell::from(row.value)).collect(),
        ));
        Self {
            columns,
            rows: rows.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn timestamp_column(&self) -> Option<&Column> {
        self.column(TIMESTAMP_COLUMN).or_else(|| self.column(TS_COLUMN))
    }

    pub fn timestamp_at(&self, idx: usize) -> Option<DateTime<Utc>> {
        self.timestamp_column()?.cells.get(idx)?.to_instant()
    }

    /// The series detectors work on: `value`, else the first numeric column,
    /// else nothing. Cells are coerced, never rejected.
    pub fn numeric_series(&self) -> Vec<f64> {
        let column = self
            .column(VALUE_COLUMN)
            .or_else(|| self.columns.iter().find(|column| column.is_numeric()));
        match column {
            Some(column) => column.cells.iter().map(Cell::to_f64_or_zero).collect(),
            None => Vec::new(),
        }
    }

    /// Sensor identity, only when every row shares exactly one value.
    pub fn single_sensor_id(&self) -> Option<i64> {
        let column = self.column(SENSOR_ID_COLUMN)?;
        let (first, rest) = column.cells.split_first()?;
        if rest.iter().any(|cell| cell != first) {
            return None;
        }
        first.to_integer()
    }
}
