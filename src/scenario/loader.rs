//! Load scenarios from a delimited file
//!
//! The delimiter is sniffed among comma, semicolon and tab. Header names are
//! trimmed and lowercased; the six required columns must all be present.

use super::Scenario;
use crate::error::{MonitorError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 6] = ["scenario_id", "alquiler", "expensas", "meses", "tipo_garantia", "run"];

const CANDIDATE_DELIMITERS: [char; 3] = [',', ';', '\t'];

const TRUE_WORDS: [&str; 5] = ["true", "1", "yes", "si", "sí"];

/// Load every scenario (enabled or not) from a file
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    if !path.exists() {
        return Err(MonitorError::MissingFile(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    load_scenarios_from_reader(file, &path.display().to_string())
}

/// Load scenarios from any reader; `source` names it in error messages
pub fn load_scenarios_from_reader<R: Read>(mut reader: R, source: &str) -> Result<Vec<Scenario>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let delimiter = sniff_delimiter(text);
    debug!("{source}: delimiter {delimiter:?}");

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MonitorError::MissingColumns {
            file: source.to_string(),
            missing,
            present: headers,
            delimiter,
        });
    }

    let col = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let idx = ColumnIndex {
        id: col("scenario_id"),
        rent: col("alquiler"),
        expenses: col("expensas"),
        term: col("meses"),
        guarantee: col("tipo_garantia"),
        run: col("run"),
    };

    let mut scenarios = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        if rec.len() != headers.len() {
            warn!("{source}: skipping malformed row {} ({} fields, expected {})", line + 2, rec.len(), headers.len());
            continue;
        }
        scenarios.push(parse_row(&rec, &idx)?);
    }

    Ok(scenarios)
}

struct ColumnIndex {
    id: usize,
    rent: usize,
    expenses: usize,
    term: usize,
    guarantee: usize,
    run: usize,
}

fn parse_row(rec: &StringRecord, idx: &ColumnIndex) -> Result<Scenario> {
    let field = |i: usize| rec.get(i).unwrap_or("").trim();
    let id = field(idx.id).to_string();

    let rent = parse_whole(field(idx.rent), &id, "alquiler")?;
    let expenses = parse_whole(field(idx.expenses), &id, "expensas")?;
    let term = parse_whole(field(idx.term), &id, "meses")?;
    if term == 0 {
        return Err(MonitorError::InvalidScenario { id, reason: "meses must be > 0".into() });
    }
    let term_months = u32::try_from(term)
        .map_err(|_| MonitorError::InvalidScenario { id: id.clone(), reason: format!("meses out of range: {term}") })?;

    Ok(Scenario {
        scenario_id: id,
        monthly_rent: rent,
        monthly_expenses: expenses,
        term_months,
        guarantee_type: parse_flag(field(idx.guarantee)),
        enabled: parse_flag(field(idx.run)),
    })
}

/// Integer column; accepts "499999" and "499999.0"
fn parse_whole(s: &str, id: &str, column: &str) -> Result<u64> {
    let invalid = |reason: String| MonitorError::InvalidScenario { id: id.to_string(), reason };
    let v: f64 = s
        .parse()
        .map_err(|_| invalid(format!("{column} is not a number: {s:?}")))?;
    if !v.is_finite() || v < 0.0 {
        return Err(invalid(format!("{column} must be >= 0, got {s}")));
    }
    Ok(v.trunc() as u64)
}

/// Boolean column: true/1/yes/si/sí, case-insensitive; anything else is false
pub fn parse_flag(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    TRUE_WORDS.contains(&s.as_str())
}

/// Pick the candidate delimiter that splits the header line into the most
/// fields, preferring one that splits the following lines consistently.
pub fn sniff_delimiter(sample: &str) -> char {
    let mut lines = sample.lines().filter(|l| !l.trim().is_empty()).take(10);
    let Some(header) = lines.next() else {
        return ',';
    };
    let rest: Vec<&str> = lines.collect();

    let mut best = (',', 0usize, false);
    for d in CANDIDATE_DELIMITERS {
        let n = header.matches(d).count();
        if n == 0 {
            continue;
        }
        let consistent = rest.iter().all(|l| l.matches(d).count() == n);
        let better = match (consistent, best.2) {
            (true, false) => true,
            (false, true) => false,
            _ => n > best.1,
        };
        if better {
            best = (d, n, consistent);
        }
    }
    best.0
}

/// Write scenarios back out in the input layout (comma separated)
pub fn write_scenarios(path: &Path, scenarios: &[Scenario]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wrt = WriterBuilder::new().from_path(path)?;
    wrt.write_record(REQUIRED_COLUMNS)?;
    for s in scenarios {
        wrt.write_record([
            s.scenario_id.clone(),
            s.monthly_rent.to_string(),
            s.monthly_expenses.to_string(),
            s.term_months.to_string(),
            s.guarantee_type.to_string(),
            s.enabled.to_string(),
        ])?;
    }
    wrt.flush()?;
    Ok(())
}
