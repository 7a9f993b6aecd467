//! Declarative column schema shared by every sheet

use serde::Serialize;

/// How a column's cells are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// `"$"#,##0`
    Money,
    /// Fraction shown as `0.00%`
    Percent,
    /// Centered whole number
    Integer,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub width: f64,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, width: f64) -> Self {
        Self { name: name.into(), kind, width }
    }

    pub fn money(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Money, 18.0)
    }

    pub fn percent(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Percent, 14.0)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Integer, 10.0)
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Plain, 16.0)
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
}

/// One cell value; unknown numbers render as blanks
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Empty,
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Some(v).into()
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<usize> for CellValue {
    fn from(v: usize) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<Option<String>> for CellValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(CellValue::Empty, CellValue::Text)
    }
}

/// A record type that knows its own table layout
pub trait TableRow {
    fn cells(&self) -> Vec<CellValue>;
}
