//! The three workbooks: quote log, border comparison and segment summary

use super::schema::{CellValue, Column, TableRow};
use super::sheet::{apply_heatmap, column_range, render_long_table, render_matrix};
use crate::compare::{summarize_segments, ComparisonRow, PercentMatrix, SegmentSummary};
use crate::error::Result;
use crate::normalize::PriceKind;
use crate::provider::Provider;
use crate::record::QuoteRecord;
use crate::scenario::Segment;
use log::info;
use rust_xlsxwriter::{ColNum, Workbook, Worksheet};
use std::path::Path;

/// A matrix with the title printed above it
#[derive(Debug, Clone, PartialEq)]
pub struct TitledMatrix {
    pub title: String,
    pub matrix: PercentMatrix,
}

impl TitledMatrix {
    pub fn new(title: impl Into<String>, matrix: PercentMatrix) -> Self {
        Self { title: title.into(), matrix }
    }

    /// `"<provider> (% sobre total garantía)"`
    pub fn for_provider(provider: Provider, matrix: PercentMatrix) -> Self {
        Self::new(format!("{provider} (% sobre total garantía)"), matrix)
    }
}

pub fn plan_columns() -> Vec<Column> {
    vec![
        Column::plain("proveedor").width(12.0),
        Column::plain("scenario_id").width(18.0),
        Column::plain("segmento"),
        Column::money("alquiler").width(14.0),
        Column::money("expensas").width(14.0),
        Column::integer("meses"),
        Column::integer("cuotas"),
        Column::plain("plan").width(30.0),
        Column::plain("tipo_precio").width(14.0),
        Column::money("total_final"),
        Column::money("lista"),
        Column::money("desc_$"),
        Column::percent("desc_%"),
        Column::percent("desc_proveedor_%").width(18.0),
        Column::money("anticipo"),
        Column::money("monto_cuota"),
        Column::money("costo_mensual"),
        Column::percent("pct_contrato"),
        Column::percent("pct_alquiler"),
        Column::percent("desc_transfer_%").width(18.0),
        Column::money("precio_transfer"),
        Column::plain("fecha_limite_desc").width(20.0),
    ]
}

/// One row per plan of every record
pub fn plan_rows(records: &[QuoteRecord]) -> Vec<Vec<CellValue>> {
    let mut rows = Vec::new();
    for r in records {
        for p in &r.normalized.plans {
            let kind = match p.price_kind {
                PriceKind::Total => "total",
                PriceKind::PerInstallment => "cuota",
            };
            rows.push(vec![
                r.provider.name().into(),
                r.scenario_id.clone().into(),
                r.scenario.segment().label().into(),
                r.scenario.rent.into(),
                r.scenario.expenses.into(),
                r.scenario.term_months.into(),
                p.installment_count.into(),
                p.label.clone().into(),
                kind.into(),
                p.total_price.into(),
                p.list_price_before_discount.into(),
                p.discount_absolute.into(),
                p.discount_fraction.into(),
                // reported as whole percent
                p.provider_discount_percent.map(|v| v / 100.0).into(),
                p.advance_payment.into(),
                p.installment_amount.into(),
                p.monthly_equivalent_cost.into(),
                p.fraction_of_contract_value.into(),
                p.fraction_of_rent_value.into(),
                p.transfer_discount_fraction.into(),
                p.transfer_price.into(),
                p.discount_deadline.clone().into(),
            ]);
        }
    }
    rows
}

pub fn summary_columns() -> Vec<Column> {
    vec![
        Column::plain("proveedor").width(12.0),
        Column::plain("segmento"),
        Column::integer("meses"),
        Column::integer("escenarios").width(12.0),
        Column::money("avg_total_final"),
        Column::money("avg_lista"),
        Column::money("avg_desc_$"),
        Column::percent("avg_desc_%"),
        Column::percent("avg_pct_contrato").width(18.0),
        Column::money("avg_costo_mensual").width(20.0),
    ]
}

impl TableRow for SegmentSummary {
    fn cells(&self) -> Vec<CellValue> {
        vec![
            self.provider.name().into(),
            self.segment.label().into(),
            self.term_months.into(),
            self.scenarios.into(),
            self.mean_total_price.into(),
            self.mean_list_price.into(),
            self.mean_discount_absolute.into(),
            self.mean_discount_fraction.into(),
            self.mean_fraction_of_contract.into(),
            self.mean_monthly_cost.into(),
        ]
    }
}

/// Comparison columns, named after the two providers
pub fn comparison_columns(a: Provider, b: Provider) -> Vec<Column> {
    let mut cols = vec![
        Column::plain("segmento"),
        Column::money("alq_exp").width(14.0),
        Column::integer("meses"),
        Column::integer("cuotas").width(12.0),
    ];
    for p in [a, b] {
        cols.push(Column::money(format!("{p}_lista")));
        cols.push(Column::percent(format!("{p}_transfer_desc_pct")).width(26.0));
        cols.push(Column::money(format!("{p}_total_transfer")).width(22.0));
        cols.push(Column::money(format!("{p}_cuota_equiv")).width(22.0));
    }
    cols.push(Column::money("dif_lista_$"));
    cols.push(Column::money("dif_total_transfer_$").width(22.0));
    cols
}

impl TableRow for ComparisonRow {
    fn cells(&self) -> Vec<CellValue> {
        vec![
            self.segment.label().into(),
            self.monthly_base.into(),
            self.term_months.into(),
            self.installment_count.into(),
            self.list_price_a.into(),
            self.transfer_discount_a.into(),
            self.transfer_price_a.into(),
            self.per_installment_a.into(),
            self.list_price_b.into(),
            self.transfer_discount_b.into(),
            self.transfer_price_b.into(),
            self.per_installment_b.into(),
            self.list_delta.into(),
            self.price_delta.into(),
        ]
    }
}

/// Outer segments are shaded so adjacent bands stand apart
fn is_shaded(segment: Segment) -> bool {
    matches!(segment, Segment::UpTo500k | Segment::Over800k)
}

fn named(name: &str) -> Result<Worksheet> {
    let mut ws = Worksheet::new();
    ws.set_name(name)?;
    Ok(ws)
}

/// Matrices left to right, one blank column apart
fn matrices_sheet(name: &str, matrices: &[TitledMatrix]) -> Result<Worksheet> {
    let mut ws = named(name)?;
    let mut left: ColNum = 0;
    for m in matrices {
        render_matrix(&mut ws, &m.matrix, &m.title, 0, left)?;
        left += m.matrix.terms.len() as ColNum + 2;
    }
    ws.set_freeze_panes(2, 0)?;
    Ok(ws)
}

fn rows_of<T: TableRow>(items: &[T]) -> Vec<Vec<CellValue>> {
    items.iter().map(TableRow::cells).collect()
}

/// "Planes" (every plan) and "Resumen" (segment averages)
pub fn quote_log_workbook(records: &[QuoteRecord]) -> Result<Workbook> {
    let mut planes = named("Planes")?;
    render_long_table(&mut planes, &plan_columns(), &plan_rows(records), None)?;

    let mut resumen = named("Resumen")?;
    render_long_table(&mut resumen, &summary_columns(), &rows_of(&summarize_segments(records)), None)?;

    let mut wb = Workbook::new();
    wb.push_worksheet(planes);
    wb.push_worksheet(resumen);
    Ok(wb)
}

/// "Comparativa" (long table, heatmap on the transfer-price delta) and
/// "Matrices" (one percentage matrix per provider)
pub fn borders_workbook(rows: &[ComparisonRow], a: Provider, b: Provider, matrices: &[TitledMatrix]) -> Result<Workbook> {
    let columns = comparison_columns(a, b);
    let bands: Vec<bool> = rows.iter().map(|r| is_shaded(r.segment)).collect();

    let mut comp = named("Comparativa")?;
    let table = render_long_table(&mut comp, &columns, &rows_of(rows), Some(bands.as_slice()))?;
    if !rows.is_empty() {
        apply_heatmap(&mut comp, column_range(table, (columns.len() - 1) as ColNum))?;
    }

    let mut wb = Workbook::new();
    wb.push_worksheet(comp);
    wb.push_worksheet(matrices_sheet("Matrices", matrices)?);
    Ok(wb)
}

/// "Resumen" plus the matrices
pub fn summary_workbook(summaries: &[SegmentSummary], matrices: &[TitledMatrix]) -> Result<Workbook> {
    let mut resumen = named("Resumen")?;
    render_long_table(&mut resumen, &summary_columns(), &rows_of(summaries), None)?;

    let mut wb = Workbook::new();
    wb.push_worksheet(resumen);
    wb.push_worksheet(matrices_sheet("Matrices", matrices)?);
    Ok(wb)
}

/// Save, creating the parent directory
pub fn save_workbook(wb: &mut Workbook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    wb.save(path)?;
    info!("wrote {}", path.display());
    Ok(())
}
