//! Analyst-maintained rate sheets
//!
//! Some provider prices are copied by hand from the web into a CSV, in one
//! of two layouts:
//!
//! - long: `segmento, plazo_meses, precio, desc_pct, pct_sobre_total, cuota, cuotas`
//! - wide: `segmento, <term>, <term>, ...` holding only the fraction of total
//!
//! Column names may carry a provider prefix and a `_$` suffix
//! (`hoggax_precio_$`). Percent columns may be fractions or whole percents;
//! they are detected per column and stored as fractions.

use crate::compare::{Mean, PercentMatrix, PercentScale};
use crate::error::{MonitorError, Result};
use crate::normalize::amount::parse_amount;
use crate::provider::Provider;
use crate::scenario::{sniff_delimiter, Segment};
use csv::ReaderBuilder;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

pub const LONG_COLUMNS: [&str; 7] = ["segmento", "plazo_meses", "precio", "desc_pct", "pct_sobre_total", "cuota", "cuotas"];

/// One hand-copied rate
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub segment: Segment,
    pub term_months: u32,
    pub price: Option<f64>,
    pub discount_fraction: Option<f64>,
    /// Price over (rent + expenses) x term
    pub fraction_of_total: Option<f64>,
    pub installment_amount: Option<f64>,
    pub installment_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    Long,
    Wide,
}

/// Strip a provider prefix and a `_$` suffix: `hoggax_precio_$` -> `precio`
fn canonical_header(h: &str) -> String {
    let lower = h.trim().trim_start_matches('\u{feff}').to_lowercase();
    let h = lower.strip_suffix("_$").unwrap_or(lower.as_str());
    Provider::ALL
        .iter()
        .find_map(|p| h.strip_prefix(&p.log_prefix()))
        .unwrap_or(h)
        .to_string()
}

pub fn load_rate_sheet(path: &Path) -> Result<Vec<RateEntry>> {
    if !path.exists() {
        return Err(MonitorError::MissingFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_rate_sheet(&text, &path.display().to_string())
}

/// Parse sheet text; `source` names it in errors. Rows with an unknown
/// segment or term are skipped with a warning.
pub fn parse_rate_sheet(text: &str, source: &str) -> Result<Vec<RateEntry>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = sniff_delimiter(text);
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(canonical_header).collect();
    let layout = detect_layout(&headers);
    debug!("{source}: {layout:?} rate sheet, delimiter {delimiter:?}");

    let required: Vec<&str> = match layout {
        SheetLayout::Wide => vec!["segmento"],
        SheetLayout::Long => LONG_COLUMNS.to_vec(),
    };
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MonitorError::MissingColumns { file: source.to_string(), missing, present: headers, delimiter });
    }

    let rows: Vec<csv::StringRecord> = rdr.records().collect::<std::result::Result<_, _>>()?;
    let mut entries = match layout {
        SheetLayout::Long => parse_long(&headers, &rows, source),
        SheetLayout::Wide => parse_wide(&headers, &rows, source),
    };

    let mut discounts: Vec<Option<f64>> = entries.iter().map(|e| e.discount_fraction).collect();
    let mut totals: Vec<Option<f64>> = entries.iter().map(|e| e.fraction_of_total).collect();
    let d_scale = PercentScale::normalize_column(&mut discounts);
    let t_scale = PercentScale::normalize_column(&mut totals);
    debug!("{source}: desc_pct read as {d_scale:?}, pct_sobre_total as {t_scale:?}");
    for ((e, d), t) in entries.iter_mut().zip(discounts).zip(totals) {
        e.discount_fraction = d;
        e.fraction_of_total = t;
    }

    Ok(entries)
}

/// Wide when any header is a bare term number
pub fn detect_layout(headers: &[String]) -> SheetLayout {
    if headers.iter().any(|h| !h.is_empty() && h.chars().all(|c| c.is_ascii_digit())) {
        SheetLayout::Wide
    } else {
        SheetLayout::Long
    }
}

fn parse_segment(label: &str, source: &str, line: usize) -> Option<Segment> {
    let seg = Segment::from_label(label);
    if seg.is_none() {
        warn!("{source}:{line}: unknown segment {label:?}, row skipped");
    }
    seg
}

fn parse_long(headers: &[String], rows: &[csv::StringRecord], source: &str) -> Vec<RateEntry> {
    let col = |name: &str| headers.iter().position(|h| h == name);
    let (seg_i, term_i) = (col("segmento"), col("plazo_meses"));
    let (price_i, desc_i, total_i) = (col("precio"), col("desc_pct"), col("pct_sobre_total"));
    let (inst_i, count_i) = (col("cuota"), col("cuotas"));

    let mut out = Vec::new();
    for (n, rec) in rows.iter().enumerate() {
        let line = n + 2;
        let get = |i: Option<usize>| i.and_then(|i| rec.get(i)).map(str::trim).unwrap_or("");
        let num = |i: Option<usize>| parse_amount(get(i));

        let Some(segment) = parse_segment(get(seg_i), source, line) else {
            continue;
        };
        let Some(term_months) = num(term_i).filter(|t| *t >= 1.0).map(|t| t as u32) else {
            warn!("{source}:{line}: bad plazo_meses {:?}, row skipped", get(term_i));
            continue;
        };
        out.push(RateEntry {
            segment,
            term_months,
            price: num(price_i),
            discount_fraction: num(desc_i),
            fraction_of_total: num(total_i),
            installment_amount: num(inst_i),
            installment_count: num(count_i).filter(|c| *c >= 1.0).map(|c| c as u32),
        });
    }
    out
}

fn parse_wide(headers: &[String], rows: &[csv::StringRecord], source: &str) -> Vec<RateEntry> {
    let seg_i = headers.iter().position(|h| h == "segmento");
    let term_cols: Vec<(usize, u32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.parse::<u32>().ok().filter(|t| *t > 0).map(|t| (i, t)))
        .collect();

    let mut out = Vec::new();
    for (n, rec) in rows.iter().enumerate() {
        let label = seg_i.and_then(|i| rec.get(i)).unwrap_or("").trim();
        let Some(segment) = parse_segment(label, source, n + 2) else {
            continue;
        };
        for &(i, term_months) in &term_cols {
            let value = rec.get(i).and_then(|v| parse_amount(v.trim()));
            if value.is_none() {
                continue;
            }
            out.push(RateEntry {
                segment,
                term_months,
                price: None,
                discount_fraction: None,
                fraction_of_total: value,
                installment_amount: None,
                installment_count: None,
            });
        }
    }
    out
}

/// Fill a missing discount with a fixed fraction (the provider's advertised
/// single-payment discount)
pub fn with_default_discount(entries: &mut [RateEntry], fraction: f64) {
    for e in entries.iter_mut().filter(|e| e.discount_fraction.is_none()) {
        e.discount_fraction = Some(fraction);
    }
}

/// Average a rate sheet into the same matrix the quote logs produce
pub fn rate_matrix(entries: &[RateEntry], terms: &[u32]) -> PercentMatrix {
    let mut cells: BTreeMap<(Segment, u32), Mean> = BTreeMap::new();
    let mut discounts: BTreeMap<u32, Mean> = BTreeMap::new();
    for e in entries.iter().filter(|e| terms.contains(&e.term_months)) {
        cells.entry((e.segment, e.term_months)).or_default().push(e.fraction_of_total);
        discounts.entry(e.term_months).or_default().push(e.discount_fraction);
    }
    PercentMatrix::from_cells(terms, &cells, &discounts)
}
