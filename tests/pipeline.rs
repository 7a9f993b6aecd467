//! End-to-end run against mocked provider endpoints: fetch, log, compare
//! and render.

use approx::assert_relative_eq;
use httpmock::prelude::*;
use price_monitor::compare::{build_border_matrix, build_comparison, summarize_segments, Pricing};
use price_monitor::pipeline::run_provider;
use price_monitor::record::{latest_provider_log, read_quote_log};
use price_monitor::report::{borders_workbook, save_workbook, summary_workbook, TitledMatrix};
use price_monitor::scenario::{load_scenarios, write_scenarios};
use price_monitor::{MonitorConfig, Provider, Scenario, Segment};
use serde_json::json;
use tempfile::tempdir;

fn scenario(term: u32) -> Scenario {
    Scenario {
        scenario_id: format!("S_499999_{term}"),
        monthly_rent: 499_999,
        monthly_expenses: 0,
        term_months: term,
        guarantee_type: false,
        enabled: true,
    }
}

fn finaer_response() -> serde_json::Value {
    json!({"object": {"posibles_planes_de_cuotas": [
        {"cantidad_de_cuotas": 3, "monto_final": 1_200_000, "honorario_sin_descuentos": 1_200_000, "monto_cuotas": 400_000},
        {"cantidad_de_cuotas": 1, "monto_final": 1_020_000, "honorario_sin_descuentos": 1_200_000,
         "descuento_aplicado": 180_000, "porcentaje_de_descuento_aplicado": 15}
    ]}, "errors": []})
}

fn hoggax_response() -> serde_json::Value {
    json!({"payload": {"cotizacion": {
        "alquiler": 499_999,
        "expensas": 0,
        "importeRaw": 1_200_000,
        "facilidades_pago": [
            {"texto": "15% OFF", "sub_texto": "Transferencia", "precio_texto": "Precio FINAL",
             "info_texto": "Te ahorrás $ 180.000", "importe": 1_020_000},
            {"texto": "3 CUOTAS sin interés", "sub_texto": "Crédito", "precio_texto": "Cuotas",
             "info_texto": "Importe total: $ 1.200.000", "importe": 400_000}
        ]
    }}})
}

#[test]
fn test_fetch_compare_and_render() {
    let dir = tempdir().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/finaer");
        then.status(200).json_body(finaer_response());
    });
    let hoggax = server.mock(|when, then| {
        when.method(POST).path("/hoggax");
        then.status(200).json_body(hoggax_response());
    });

    let mut config = MonitorConfig::default();
    config.output_dir = dir.path().join("out");
    config.scenarios_path = dir.path().join("scenarios.csv");
    config.request_delay_ms = 0;
    config.finaer.endpoint = server.url("/finaer");
    config.hoggax.endpoint = server.url("/hoggax");

    // 24 is quoted over HTTP, 12 by rule, 18 is not offered by Hoggax
    write_scenarios(&config.scenarios_path, &[scenario(24), scenario(12), scenario(18)]).unwrap();
    let scenarios = load_scenarios(&config.scenarios_path).unwrap();
    assert_eq!(scenarios.len(), 3);

    let finaer = run_provider(Provider::Finaer, &scenarios, &config).unwrap();
    assert!(finaer.is_clean());
    assert_eq!(finaer.written, 3);

    let hoggax_report = run_provider(Provider::Hoggax, &scenarios, &config).unwrap();
    assert_eq!(hoggax_report.attempted, 3);
    assert_eq!(hoggax_report.written, 2);
    assert_eq!(hoggax_report.failures.len(), 1);
    assert_eq!(hoggax_report.failures[0].scenario_id, "S_499999_18");
    hoggax.assert();

    let a_path = latest_provider_log(&config.output_dir, Provider::Finaer).unwrap();
    let b_path = latest_provider_log(&config.output_dir, Provider::Hoggax).unwrap();
    assert_eq!(a_path, finaer.log_path);
    let a = read_quote_log(&a_path).unwrap();
    let b = read_quote_log(&b_path).unwrap();
    assert_eq!((a.len(), b.len()), (3, 2));

    let rows = build_comparison(&a, &b, &config.targets, &Pricing::from_config(&config, Provider::Finaer, Provider::Hoggax));
    // only the 24-month border point is a comparison target
    assert_eq!(rows.len(), 2);
    let upfront = &rows[0];
    assert_eq!((upfront.segment, upfront.term_months, upfront.installment_count), (Segment::UpTo500k, 24, 1));
    // Finaer: analyst's 20% on the list price; Hoggax: its own quoted total
    assert_relative_eq!(upfront.transfer_price_a.unwrap(), 960_000.0);
    assert_relative_eq!(upfront.transfer_price_b.unwrap(), 1_020_000.0);
    assert_relative_eq!(upfront.transfer_discount_b.unwrap(), 0.15);
    assert_relative_eq!(upfront.price_delta.unwrap(), -60_000.0);
    assert_relative_eq!(rows[1].per_installment_b.unwrap(), 400_000.0);

    let terms = config.matrix_terms.clone();
    let matrices = [
        TitledMatrix::for_provider(Provider::Finaer, build_border_matrix(&a, &config.targets, &terms)),
        TitledMatrix::for_provider(Provider::Hoggax, build_border_matrix(&b, &config.targets, &terms)),
    ];
    let borders = dir.path().join("out/comparativa.xlsx");
    let mut wb = borders_workbook(&rows, Provider::Finaer, Provider::Hoggax, &matrices).unwrap();
    save_workbook(&mut wb, &borders).unwrap();
    assert!(borders.exists());

    let mut records = a;
    records.extend(b);
    let summaries = summarize_segments(&records);
    assert!(summaries.iter().any(|s| s.provider == Provider::Hoggax && s.term_months == 12));
    let summary = dir.path().join("out/resumen.xlsx");
    let mut wb = summary_workbook(&summaries, &matrices).unwrap();
    save_workbook(&mut wb, &summary).unwrap();
    assert!(summary.exists());
}

#[test]
fn test_missing_scenario_file_is_fatal() {
    let dir = tempdir().unwrap();
    assert!(load_scenarios(&dir.path().join("missing.csv")).is_err());
}
