// HTTP boundary to the spreadsheet web app.
//
// The backend is a single deployed script URL; `?tab=<name>` selects which
// sheet tab comes back. Responses are either a JSON array of header-keyed
// objects or a CSV body with a header row; both decode into `SheetRecord`s.
use crate::error::ReportError;
use crate::loader;
use crate::types::SheetRecord;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

pub struct SheetClient {
    base_url: String,
    http: Client,
}

impl SheetClient {
    pub fn new(base_url: &str) -> Result<Self, ReportError> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            http,
        })
    }

    /// Fetch one sheet tab. Any failure (network, non-2xx status, payload
    /// that is neither JSON nor CSV) degrades to an empty record set so the
    /// rest of the dashboard still renders; an empty tab aggregates to
    /// all-zero metrics downstream.
    pub fn fetch_tab(&self, tab: &str) -> Vec<SheetRecord> {
        match self.fetch_tab_inner(tab) {
            Ok(records) => {
                debug!(tab, records = records.len(), "sheet tab fetched");
                records
            }
            Err(e) => {
                warn!(tab, error = %e, "sheet fetch failed, continuing with empty data");
                Vec::new()
            }
        }
    }

    fn fetch_tab_inner(&self, tab: &str) -> Result<Vec<SheetRecord>, ReportError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("tab", tab)])
            .header(ACCEPT, "application/json")
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReportError::Status(status));
        }
        let body = resp.text()?;
        loader::decode_records(&body)
    }
}
