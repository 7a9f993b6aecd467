//! Spreadsheet output
//!
//! One renderer driven by a column schema ([`schema`]) serves every
//! workbook in [`books`].

pub mod books;
pub mod schema;
pub mod sheet;

pub use books::{borders_workbook, quote_log_workbook, save_workbook, summary_workbook, TitledMatrix};
pub use schema::{CellValue, Column, ColumnKind, TableRow};
pub use sheet::{apply_heatmap, render_long_table, render_matrix, CellRange};
