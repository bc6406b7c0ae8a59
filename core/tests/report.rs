//! CSV exports and the parametric-study record.

use coa_core::{
    capital::OCC_ITC,
    estimate::{CostEstimate, EstimateRow},
    params::DesignParams,
    report::{
        append_tracked_costs, estimate_headers, export_detailed, presentation_rows,
        tracked_costs, ESTIMATE_FILE, PARAMETERS_FILE,
    },
    lcoe::{LCOE_ITC, LCOE_WITH_PTC},
    types::AccountId,
};

fn row(account: &str, title: &str, cells: [f64; 4]) -> EstimateRow {
    EstimateRow {
        account:  AccountId::parse(account),
        title:    title.to_string(),
        foak:     cells[0],
        noak:     cells[1],
        foak_std: cells[2],
        noak_std: cells[3],
    }
}

fn estimate(params: DesignParams) -> CostEstimate {
    CostEstimate {
        escalation_year: 2024,
        samples:         1,
        rows: vec![
            row("10", "Capitalized Pre-Construction Costs", [1_234.9, 1_000.2, 0.0, 0.0]),
            row("40", "Capitalized Owners Cost", [0.0, 0.0, 0.0, 0.0]),
            row("OCC", "Overnight Capital Cost", [21_250.7, 19_000.1, 12.5, 9.9]),
            row("LCOE", "Levelized Cost of Energy ($/MWh)", [95.6, 80.4, f64::NAN, 0.0]),
        ],
        params: params.freeze(),
    }
}

fn base_params() -> DesignParams {
    let mut p = DesignParams::new();
    p.set("Power MWe", 10.0);
    p.set("Interest Rate", 0.07);
    p
}

#[test]
fn presentation_drops_zero_rows_and_truncates() {
    let rows = presentation_rows(&estimate(base_params()));

    let accounts: Vec<&str> = rows.iter().map(|r| r.account.as_str()).collect();
    assert_eq!(accounts, vec!["10", "OCC", "LCOE"], "all-zero A40 is dropped");
    assert_eq!(rows[0].values, [Some(1_234), Some(1_000), Some(0), Some(0)]);
    assert_eq!(rows[2].values, [Some(95), Some(80), None, Some(0)]);
}

#[test]
fn headers_carry_the_escalation_year() {
    let headers = estimate_headers(&estimate(base_params()));
    assert_eq!(headers[2], "FOAK Estimated Cost ($2024)");
    assert_eq!(headers[5], "NOAK Estimated Cost std ($2024)");
}

#[test]
fn export_writes_estimate_and_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let (estimate_path, params_path) = export_detailed(&estimate(base_params()), &out).unwrap();

    assert_eq!(estimate_path, out.join(ESTIMATE_FILE));
    assert_eq!(params_path, out.join(PARAMETERS_FILE));

    let mut reader = csv::Reader::from_path(&estimate_path).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[1][0], "OCC");
    assert_eq!(&records[1][2], "21250");
    assert_eq!(&records[2][4], "", "missing std stays empty");

    let params_csv = std::fs::read_to_string(&params_path).unwrap();
    assert!(params_csv.starts_with("Parameter,Value"));
    assert!(params_csv.contains("Power MWe,10"));
}

#[test]
fn tracked_record_lists_params_then_costs() {
    let mut params = base_params();
    params.set("SDM 3D (2D corrected)", 0.05);
    let record = tracked_costs(&estimate(params), &["Power MWe", "Not Set"]);

    let names: Vec<&str> = record.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(&names[..2], &["Power MWe", "SDM 3D (2D corrected)"]);
    assert_eq!(
        &names[2..6],
        &[
            "OCC_FOAK Estimated Cost",
            "OCC_NOAK Estimated Cost",
            "OCC_FOAK Estimated Cost std",
            "OCC_NOAK Estimated Cost std",
        ]
    );
    assert_eq!(record[2].1, "21250.7");

    // Accounts not in the estimate keep empty cells.
    let tci = record.iter().find(|(n, _)| n == "TCI_FOAK Estimated Cost").unwrap();
    assert_eq!(tci.1, "");
    assert!(!names.iter().any(|n| n.starts_with(OCC_ITC)));
    assert!(!names.iter().any(|n| n.starts_with(LCOE_WITH_PTC)));
}

#[test]
fn tracked_record_includes_credit_rows_when_configured() {
    let mut params = base_params();
    params.set("ITC credit level", 0.3);
    let record = tracked_costs(&estimate(params), &[]);
    let itc_cell = format!("{LCOE_ITC}_FOAK Estimated Cost");
    assert!(record.iter().any(|(n, _)| *n == itc_cell));

    let mut params = base_params();
    params.set("PTC credit value", 27.5);
    params.set("PTC credit period", 10);
    let record = tracked_costs(&estimate(params), &[]);
    assert!(record.iter().any(|(n, _)| n.starts_with(LCOE_WITH_PTC)));
    assert!(!record.iter().any(|(n, _)| n.starts_with(OCC_ITC)));
}

#[test]
fn appending_writes_the_header_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracked.csv");
    let record = tracked_costs(&estimate(base_params()), &["Power MWe"]);

    append_tracked_costs(&record, &path).unwrap();
    append_tracked_costs(&record, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3, "header plus two rows:\n{contents}");
    assert!(lines[0].starts_with("Power MWe,OCC_FOAK Estimated Cost"));
    assert_eq!(lines[1], lines[2]);
}
