//! Worksheet rendering: long tables, percentage matrices and heatmaps
//!
//! All styling lives here. Callers hand over a column schema plus rows, or a
//! [`PercentMatrix`], and get back a formatted worksheet.

use super::schema::{CellValue, Column, ColumnKind};
use crate::compare::PercentMatrix;
use crate::error::Result;
use rust_xlsxwriter::{
    Color, ColNum, ConditionalFormat3ColorScale, Format, FormatAlign, RowNum, Worksheet,
};

const HEADER_FILL: u32 = 0xD9E1F2;
const TITLE_FILL: u32 = 0xC6E0B4;
const BAND_FILL: u32 = 0xF2F2F2;
const HEAT_LOW: u32 = 0x63BE7B;
const HEAT_MID: u32 = 0xFFEB84;
const HEAT_HIGH: u32 = 0xF8696B;

pub const MONEY_FORMAT: &str = "\"$\"#,##0";
pub const PERCENT_FORMAT: &str = "0.00%";

/// Inclusive cell rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: RowNum,
    pub first_col: ColNum,
    pub last_row: RowNum,
    pub last_col: ColNum,
}

impl CellRange {
    pub fn is_empty(&self) -> bool {
        self.last_row < self.first_row || self.last_col < self.first_col
    }
}

pub fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn title_format() -> Format {
    header_format().set_background_color(Color::RGB(TITLE_FILL))
}

/// Cell format for a column kind, optionally on the band fill
pub fn cell_format(kind: ColumnKind, banded: bool) -> Format {
    let f = match kind {
        ColumnKind::Money => Format::new().set_num_format(MONEY_FORMAT).set_align(FormatAlign::Center),
        ColumnKind::Percent => Format::new().set_num_format(PERCENT_FORMAT).set_align(FormatAlign::Center),
        ColumnKind::Integer => Format::new().set_align(FormatAlign::Center),
        ColumnKind::Plain => Format::new(),
    };
    if banded {
        f.set_background_color(Color::RGB(BAND_FILL))
    } else {
        f
    }
}

fn write_cell(ws: &mut Worksheet, row: RowNum, col: ColNum, value: &CellValue, format: &Format) -> Result<()> {
    match value {
        CellValue::Number(n) => ws.write_number_with_format(row, col, *n, format)?,
        CellValue::Text(s) => ws.write_string_with_format(row, col, s, format)?,
        CellValue::Empty => ws.write_blank(row, col, format)?,
    };
    Ok(())
}

/// Header row, one row per record, frozen header and autofilter.
/// `bands[i]` shades row `i` with the band fill. Returns the data range.
pub fn render_long_table(
    ws: &mut Worksheet,
    columns: &[Column],
    rows: &[Vec<CellValue>],
    bands: Option<&[bool]>,
) -> Result<CellRange> {
    let header = header_format();
    let formats: Vec<[Format; 2]> = columns
        .iter()
        .map(|c| [cell_format(c.kind, false), cell_format(c.kind, true)])
        .collect();

    for (c, column) in columns.iter().enumerate() {
        let col = c as ColNum;
        ws.write_string_with_format(0, col, &column.name, &header)?;
        ws.set_column_width(col, column.width)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let banded = bands.and_then(|b| b.get(r)).copied().unwrap_or(false);
        for (c, value) in row.iter().take(columns.len()).enumerate() {
            write_cell(ws, r as RowNum + 1, c as ColNum, value, &formats[c][usize::from(banded)])?;
        }
    }

    let last_col = columns.len().saturating_sub(1) as ColNum;
    let last_row = rows.len() as RowNum;
    ws.set_freeze_panes(1, 0)?;
    if !columns.is_empty() {
        ws.autofilter(0, 0, last_row, last_col)?;
    }

    Ok(CellRange { first_row: 1, first_col: 0, last_row, last_col })
}

/// Data-cell range of one column of a long table
pub fn column_range(table: CellRange, col: ColNum) -> CellRange {
    CellRange { first_row: table.first_row, first_col: col, last_row: table.last_row, last_col: col }
}

/// Title, header (`segmento` + terms), one row per segment and a `Des.`
/// row of mean discounts, starting at (`top`, `left`). Cells are percent;
/// the segment rows get a heatmap. Returns the segment-cell range.
pub fn render_matrix(
    ws: &mut Worksheet,
    matrix: &PercentMatrix,
    title: &str,
    top: RowNum,
    left: ColNum,
) -> Result<CellRange> {
    let header = header_format();
    let pct = cell_format(ColumnKind::Percent, false);
    let plain = cell_format(ColumnKind::Plain, false);
    let n_terms = matrix.terms.len() as ColNum;

    if n_terms > 0 {
        ws.merge_range(top, left, top, left + n_terms, title, &title_format())?;
    } else {
        ws.write_string_with_format(top, left, title, &title_format())?;
    }

    ws.write_string_with_format(top + 1, left, "segmento", &header)?;
    ws.set_column_width(left, 16)?;
    for (i, term) in matrix.terms.iter().enumerate() {
        let col = left + 1 + i as ColNum;
        ws.write_number_with_format(top + 1, col, *term as f64, &header)?;
        ws.set_column_width(col, 10)?;
    }

    let mut row = top + 2;
    for mrow in &matrix.rows {
        ws.write_string_with_format(row, left, mrow.segment.label(), &plain)?;
        for (i, cell) in mrow.cells.iter().enumerate() {
            write_cell(ws, row, left + 1 + i as ColNum, &CellValue::from(*cell), &pct)?;
        }
        row += 1;
    }

    let data = CellRange {
        first_row: top + 2,
        first_col: left + 1,
        last_row: row.saturating_sub(1),
        last_col: left + n_terms,
    };

    ws.write_string_with_format(row, left, "Des.", &header)?;
    for (i, cell) in matrix.discount_row.iter().enumerate() {
        write_cell(ws, row, left + 1 + i as ColNum, &CellValue::from(*cell), &pct)?;
    }

    if n_terms > 0 && !matrix.rows.is_empty() {
        apply_heatmap(ws, data)?;
    }
    Ok(data)
}

/// Three-color scale: green at the minimum, yellow at the median, red at
/// the maximum
pub fn apply_heatmap(ws: &mut Worksheet, range: CellRange) -> Result<()> {
    if range.is_empty() {
        return Ok(());
    }
    // midpoint defaults to the 50th percentile
    let scale = ConditionalFormat3ColorScale::new()
        .set_minimum_color(Color::RGB(HEAT_LOW))
        .set_midpoint_color(Color::RGB(HEAT_MID))
        .set_maximum_color(Color::RGB(HEAT_HIGH));
    ws.add_conditional_format(range.first_row, range.first_col, range.last_row, range.last_col, &scale)?;
    Ok(())
}
