use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tabled::Tabled;

/// One decoded sheet record, keyed by column header. Values may be strings,
/// numbers or nulls depending on whether the backend returned JSON or CSV;
/// everything downstream of the loader works on typed rows instead.
pub type SheetRecord = serde_json::Map<String, serde_json::Value>;

/// One FLO's performance record for the current cycle, fully normalized.
///
/// `flo_name` may still be blank or a "Total" summary label here; the engine
/// filters those out so that every consumer applies the same rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub flo_name: String,
    pub branch: String,
    pub disb_target: f64,
    pub disb_done: f64,
    pub file_target: f64,
    pub file_done: f64,
}

/// The two tracked dimensions: disbursement amount and file count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Amount,
    Files,
}

impl Dimension {
    pub fn target(&self, row: &PerformanceRow) -> f64 {
        match self {
            Dimension::Amount => row.disb_target,
            Dimension::Files => row.file_target,
        }
    }

    pub fn done(&self, row: &PerformanceRow) -> f64 {
        match self {
            Dimension::Amount => row.disb_done,
            Dimension::Files => row.file_done,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Amount => "Amount",
            Dimension::Files => "Files",
        }
    }
}

/// Cycle configuration resolved from the `Config` sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub deadline: NaiveDate,
    pub off_days: HashSet<NaiveDate>,
}

/// One snapshot row from the `History` sheet (one FLO, one day).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub disb_done: f64,
    pub file_done: f64,
}

/// Totals for one dimension across the territory (or a branch subset).
/// `achievement_pct` is unclamped and can exceed 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateMetrics {
    pub target_sum: f64,
    pub done_sum: f64,
    pub gap: f64,
    pub achievement_pct: f64,
}

/// One FLO annotated with its achievement for a chosen dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFlo {
    pub flo_name: String,
    pub branch: String,
    pub target: f64,
    pub done: f64,
    pub gap: f64,
    pub achievement_pct: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "FLO Name")]
    #[tabled(rename = "FLO Name")]
    pub flo_name: String,
    #[serde(rename = "Branch")]
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Done")]
    #[tabled(rename = "Done")]
    pub done: String,
    #[serde(rename = "Gap")]
    #[tabled(rename = "Gap")]
    pub gap: String,
    #[serde(rename = "RequiredDRR")]
    #[tabled(rename = "Required DRR")]
    pub required_drr: String,
    #[serde(rename = "AchPct")]
    #[tabled(rename = "Ach %")]
    pub ach_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BranchAnalysisRow {
    #[serde(rename = "Branch")]
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "FLOs")]
    #[tabled(rename = "FLOs")]
    pub flos: usize,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Done")]
    #[tabled(rename = "Done")]
    pub done: String,
    #[serde(rename = "Gap")]
    #[tabled(rename = "Gap")]
    pub gap: String,
    #[serde(rename = "AchPct")]
    #[tabled(rename = "Ach %")]
    pub ach_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FloCardRow {
    #[serde(rename = "FLO Name")]
    #[tabled(rename = "FLO Name")]
    pub flo_name: String,
    #[serde(rename = "DisbTarget")]
    #[tabled(rename = "Disb. Target")]
    pub disb_target: String,
    #[serde(rename = "DisbDone")]
    #[tabled(rename = "Disb. Done")]
    pub disb_done: String,
    #[serde(rename = "DisbGap")]
    #[tabled(rename = "Disb. Gap")]
    pub disb_gap: String,
    #[serde(rename = "DisbAchPct")]
    #[tabled(rename = "Disb. Ach %")]
    pub disb_pct: String,
    #[serde(rename = "Files")]
    #[tabled(rename = "Files")]
    pub files: String,
    #[serde(rename = "FileAchPct")]
    #[tabled(rename = "File Ach %")]
    pub file_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BranchImpactRow {
    #[serde(rename = "Branch")]
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "VolumeDone")]
    #[tabled(rename = "Volume Done")]
    pub volume_done: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "Share %")]
    pub share_pct: String,
    #[serde(rename = "Impact")]
    #[tabled(rename = "Impact")]
    pub impact: String,
}

/// Everything the overview JSON export carries. All percentages unclamped.
#[derive(Debug, Serialize, Clone)]
pub struct TerritorySummary {
    pub deadline: NaiveDate,
    pub working_days_left: u32,
    pub active_flos: usize,
    pub branches: usize,
    pub disb_target: f64,
    pub disb_done: f64,
    pub disb_gap: f64,
    pub disb_pct: f64,
    pub file_target: f64,
    pub file_done: f64,
    pub file_gap: f64,
    pub file_pct: f64,
    pub required_drr_amount: f64,
    pub required_drr_files: f64,
}
