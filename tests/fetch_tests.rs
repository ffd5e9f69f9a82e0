// Fetch boundary behavior: the client must hand back usable records for
// JSON and CSV payloads and an empty set for every failure mode.
use httpmock::prelude::*;
use territory_report::fetch::SheetClient;
use territory_report::loader;

#[test]
fn fetch_decodes_json_records() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/exec").query_param("tab", "Sheet1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"FLO Name": "Asha", "Branch": "Tezpur", "Disb. Done": 40000}]"#);
    });

    let client = SheetClient::new(&server.url("/exec")).unwrap();
    let records = client.fetch_tab("Sheet1");

    mock.assert();
    assert_eq!(records.len(), 1);
    let (rows, _) = loader::rows_from_records(&records);
    assert_eq!(rows[0].flo_name, "Asha");
    assert_eq!(rows[0].disb_done, 40000.0);
}

#[test]
fn fetch_decodes_csv_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exec").query_param("tab", "Config");
        then.status(200)
            .header("content-type", "text/csv")
            .body("Parameter,Value\nTarget Deadline,28/02/2026\nOff Day,22/02/2026\n");
    });

    let client = SheetClient::new(&server.url("/exec")).unwrap();
    let records = client.fetch_tab("Config");
    assert_eq!(records.len(), 2);

    let config = loader::config_from_records(&records);
    assert_eq!(
        config.deadline,
        chrono::NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
    );
    assert_eq!(config.off_days.len(), 1);
}

#[test]
fn server_error_degrades_to_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exec");
        then.status(500).body("internal error");
    });

    let client = SheetClient::new(&server.url("/exec")).unwrap();
    assert!(client.fetch_tab("Sheet1").is_empty());
}

#[test]
fn malformed_json_degrades_to_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exec");
        then.status(200)
            .header("content-type", "application/json")
            .body("[{\"FLO Name\": ");
    });

    let client = SheetClient::new(&server.url("/exec")).unwrap();
    assert!(client.fetch_tab("Sheet1").is_empty());
}

#[test]
fn unreachable_endpoint_degrades_to_empty() {
    // Nothing listens here; the request itself fails.
    let client = SheetClient::new("http://127.0.0.1:1/exec").unwrap();
    assert!(client.fetch_tab("Sheet1").is_empty());
}
