// Ingestion boundary: loosely-keyed sheet records become typed rows here,
// so nothing past this module ever touches a header-keyed map.
use crate::error::ReportError;
use crate::types::{EngineConfig, HistoryRow, PerformanceRow, SheetRecord};
use crate::util::{cell_text, normalize_amount, parse_flexible_date};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::HashSet;

// Header variants drift between sheet revisions ("Disb. Done" vs
// "Disb Done"); every alias that appears in the source data is listed.
const FLO_NAME_KEYS: &[&str] = &["FLO Name"];
const BRANCH_KEYS: &[&str] = &["Branch"];
const DISB_TARGET_KEYS: &[&str] = &["Disb. Target", "Disb Target"];
const DISB_DONE_KEYS: &[&str] = &["Disb. Done", "Disb Done"];
const FILE_TARGET_KEYS: &[&str] = &["File Target", "File. Target"];
const FILE_DONE_KEYS: &[&str] = &["File Done", "File. Done"];

const PARAM_KEY: &str = "Parameter";
const VALUE_KEY: &str = "Value";
const PARAM_DEADLINE: &str = "Target Deadline";
const PARAM_OFF_DAY: &str = "Off Day";

/// Deadline used when the Config sheet is missing, empty or unparseable.
pub fn fallback_deadline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 26).unwrap()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            deadline: fallback_deadline(),
            off_days: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_records: usize,
    pub loaded_rows: usize,
    pub blank_names: usize,
    pub summary_rows: usize,
}

static NULL_CELL: Value = Value::Null;

fn field<'a>(record: &'a SheetRecord, keys: &[&str]) -> &'a Value {
    for key in keys {
        if let Some(v) = record.get(*key) {
            return v;
        }
    }
    &NULL_CELL
}

/// Decode a raw response body into sheet records. JSON arrays are taken
/// as-is; anything else is treated as CSV with a header row.
pub fn decode_records(body: &str) -> Result<Vec<SheetRecord>, ReportError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<SheetRecord>>(trimmed)
            .map_err(|e| ReportError::Decode(format!("invalid JSON record array: {}", e)));
    }
    records_from_csv(body)
}

/// Parse a CSV body into records keyed by the (trimmed) header row.
pub fn records_from_csv(body: &str) -> Result<Vec<SheetRecord>, ReportError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = rdr.headers()?.clone();
    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut map = SheetRecord::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            map.insert(
                header.trim().to_string(),
                Value::String(cell.to_string()),
            );
        }
        out.push(map);
    }
    Ok(out)
}

/// Load sheet records from a local CSV export (offline mode).
pub fn load_csv_file(path: &std::path::Path) -> Result<Vec<SheetRecord>, ReportError> {
    let body = std::fs::read_to_string(path)?;
    records_from_csv(&body)
}

/// Convert sheet records into typed performance rows.
///
/// Every record is kept, including blank-name and "Total" summary rows; the
/// metrics engine owns that exclusion. The report only counts them so the
/// sync step can say what will be ignored.
pub fn rows_from_records(records: &[SheetRecord]) -> (Vec<PerformanceRow>, LoadReport) {
    let mut rows = Vec::with_capacity(records.len());
    let mut blank_names = 0usize;
    let mut summary_rows = 0usize;

    for record in records {
        let flo_name = cell_text(field(record, FLO_NAME_KEYS));
        if flo_name.is_empty() {
            blank_names += 1;
        } else if flo_name.to_lowercase().contains("total") {
            summary_rows += 1;
        }
        rows.push(PerformanceRow {
            flo_name,
            branch: cell_text(field(record, BRANCH_KEYS)),
            disb_target: normalize_amount(field(record, DISB_TARGET_KEYS)),
            disb_done: normalize_amount(field(record, DISB_DONE_KEYS)),
            file_target: normalize_amount(field(record, FILE_TARGET_KEYS)),
            file_done: normalize_amount(field(record, FILE_DONE_KEYS)),
        });
    }

    let report = LoadReport {
        total_records: records.len(),
        loaded_rows: rows.len() - blank_names - summary_rows,
        blank_names,
        summary_rows,
    };
    (rows, report)
}

/// Resolve the Config sheet (`{Parameter, Value}` rows) into engine config.
///
/// A missing or unparseable `"Target Deadline"` falls back to the fixed
/// cycle deadline; `"Off Day"` rows that fail to parse are dropped.
pub fn config_from_records(records: &[SheetRecord]) -> EngineConfig {
    let deadline = records
        .iter()
        .find(|r| cell_text(field(r, &[PARAM_KEY])) == PARAM_DEADLINE)
        .and_then(|r| parse_flexible_date(field(r, &[VALUE_KEY])))
        .unwrap_or_else(fallback_deadline);

    let off_days: HashSet<NaiveDate> = records
        .iter()
        .filter(|r| cell_text(field(r, &[PARAM_KEY])) == PARAM_OFF_DAY)
        .filter_map(|r| parse_flexible_date(field(r, &[VALUE_KEY])))
        .collect();

    EngineConfig { deadline, off_days }
}

/// Convert History sheet records into dated snapshots. Rows without a
/// parseable `Date` cell carry no usable signal and are skipped.
pub fn history_from_records(records: &[SheetRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .filter_map(|record| {
            let date = parse_flexible_date(field(record, &["Date"]))?;
            Some(HistoryRow {
                date,
                disb_done: normalize_amount(field(record, DISB_DONE_KEYS)),
                file_done: normalize_amount(field(record, FILE_DONE_KEYS)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> SheetRecord {
        let mut map = SheetRecord::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        map
    }

    #[test]
    fn rows_pick_up_header_aliases() {
        let records = vec![
            record(&[
                ("FLO Name", json!("Asha")),
                ("Branch", json!("Tezpur")),
                ("Disb. Target", json!("₹1,00,000")),
                ("Disb. Done", json!(40000)),
                ("File Target", json!("10")),
                ("File Done", json!("4")),
            ]),
            record(&[
                ("FLO Name", json!("Bikash")),
                ("Branch", json!("Dhekiajuli")),
                ("Disb Target", json!("50000")),
                ("Disb Done", json!("20000")),
                ("File. Target", json!("5")),
                ("File. Done", json!("2")),
            ]),
        ];
        let (rows, report) = rows_from_records(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].disb_target, 100000.0);
        assert_eq!(rows[0].disb_done, 40000.0);
        assert_eq!(rows[1].disb_target, 50000.0);
        assert_eq!(rows[1].file_done, 2.0);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.summary_rows, 0);
    }

    #[test]
    fn load_report_counts_blank_and_summary_rows() {
        let records = vec![
            record(&[("FLO Name", json!("Asha")), ("Branch", json!("Tezpur"))]),
            record(&[("FLO Name", json!("")), ("Branch", json!("Tezpur"))]),
            record(&[("FLO Name", json!("Grand Total"))]),
        ];
        let (rows, report) = rows_from_records(&records);
        // Rows are all kept; the engine applies the exclusion.
        assert_eq!(rows.len(), 3);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(report.blank_names, 1);
        assert_eq!(report.summary_rows, 1);
    }

    #[test]
    fn config_resolves_deadline_and_off_days() {
        let records = vec![
            record(&[("Parameter", json!("Target Deadline")), ("Value", json!("28/02/2026"))]),
            record(&[("Parameter", json!("Off Day")), ("Value", json!("22/02/2026"))]),
            record(&[("Parameter", json!("Off Day")), ("Value", json!("not a date"))]),
        ];
        let config = config_from_records(&records);
        assert_eq!(config.deadline, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(config.off_days.len(), 1);
        assert!(config
            .off_days
            .contains(&NaiveDate::from_ymd_opt(2026, 2, 22).unwrap()));
    }

    #[test]
    fn config_falls_back_when_deadline_missing_or_bad() {
        let empty: Vec<SheetRecord> = Vec::new();
        assert_eq!(config_from_records(&empty).deadline, fallback_deadline());

        let bad = vec![record(&[
            ("Parameter", json!("Target Deadline")),
            ("Value", json!("whenever")),
        ])];
        assert_eq!(config_from_records(&bad).deadline, fallback_deadline());
    }

    #[test]
    fn decode_accepts_json_array_or_csv() {
        let json_body = r#"[{"FLO Name": "Asha", "Disb. Done": 500}]"#;
        let records = decode_records(json_body).unwrap();
        assert_eq!(records.len(), 1);

        let csv_body = "FLO Name,Branch,Disb. Done\nAsha,Tezpur,\"₹500\"\n";
        let records = decode_records(csv_body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(cell_text(field(&records[0], FLO_NAME_KEYS)), "Asha");
        assert_eq!(normalize_amount(field(&records[0], DISB_DONE_KEYS)), 500.0);
    }

    #[test]
    fn history_skips_undated_rows() {
        let records = vec![
            record(&[("Date", json!("25/02/2026")), ("Disb Done", json!("1000"))]),
            record(&[("Disb Done", json!("9999"))]),
        ];
        let history = history_from_records(&records);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].disb_done, 1000.0);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2026, 2, 25).unwrap());
    }
}
