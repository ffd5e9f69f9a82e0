// Report builders: engine output becomes formatted table rows here. All
// display-only adjustments (progress clamps, floored gaps) live in this
// module, never in the engine.
use crate::metrics;
use crate::types::{
    BranchAnalysisRow, BranchImpactRow, Dimension, EngineConfig, FloCardRow, PerformanceRow,
    RankedFlo, RankingRow, TerritorySummary,
};
use crate::util::{format_lakh, format_number, format_pct};
use chrono::NaiveDate;

fn format_quantity(dimension: Dimension, value: f64) -> String {
    match dimension {
        Dimension::Amount => format_lakh(value),
        Dimension::Files => format_number(value, 0),
    }
}

/// Full rankings table for one dimension, with per-FLO required DRR against
/// the shared working-day count.
pub fn ranking_table(
    ranked: &[RankedFlo],
    dimension: Dimension,
    working_days: u32,
) -> Vec<RankingRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, flo)| {
            let drr = metrics::required_rate(flo.target, flo.done, working_days);
            RankingRow {
                rank: idx + 1,
                flo_name: flo.flo_name.clone(),
                branch: flo.branch.clone(),
                target: format_quantity(dimension, flo.target),
                done: format_quantity(dimension, flo.done),
                gap: format_quantity(dimension, flo.gap),
                required_drr: match dimension {
                    Dimension::Amount => format!("{}/day", format_lakh(drr)),
                    Dimension::Files => format!("{}/day", format_number(drr, 1)),
                },
                ach_pct: format_pct(flo.achievement_pct),
            }
        })
        .collect()
}

/// Top performers by disbursement achievement (the overview's podium).
pub fn top_performers(rows: &[PerformanceRow], count: usize) -> Vec<RankedFlo> {
    let mut ranked = metrics::rank(rows, Dimension::Amount, None);
    ranked.truncate(count);
    ranked
}

/// Per-branch disbursement achievement for the overview. The percentage is
/// capped at 100 here because it backs a progress display.
pub fn branch_analysis(rows: &[PerformanceRow]) -> Vec<BranchAnalysisRow> {
    metrics::branch_names(rows)
        .into_iter()
        .map(|branch| {
            let subset = metrics::branch_rows(rows, &branch);
            let flos = subset.len();
            let m = metrics::aggregate_rows(subset.into_iter(), Dimension::Amount);
            BranchAnalysisRow {
                branch,
                flos,
                target: format_lakh(m.target_sum),
                done: format_lakh(m.done_sum),
                gap: format_lakh(m.gap),
                ach_pct: format_pct(m.achievement_pct.min(100.0)),
            }
        })
        .collect()
}

/// Per-FLO cards for one branch, both dimensions side by side. Card
/// percentages are clamped to 100 and the displayed gap never goes negative;
/// both are card-level display rules only.
pub fn flo_cards(rows: &[PerformanceRow], branch: &str) -> Vec<FloCardRow> {
    metrics::branch_rows(rows, branch)
        .into_iter()
        .map(|flo| {
            let disb_pct = if flo.disb_target > 0.0 {
                (flo.disb_done / flo.disb_target * 100.0).min(100.0)
            } else {
                0.0
            };
            let file_pct = if flo.file_target > 0.0 {
                (flo.file_done / flo.file_target * 100.0).min(100.0)
            } else {
                0.0
            };
            let gap = (flo.disb_target - flo.disb_done).max(0.0);
            FloCardRow {
                flo_name: flo.flo_name.clone(),
                disb_target: format_lakh(flo.disb_target),
                disb_done: format_lakh(flo.disb_done),
                disb_gap: format_lakh(gap),
                disb_pct: format_pct(disb_pct),
                files: format!(
                    "{}/{}",
                    format_number(flo.file_done, 0),
                    format_number(flo.file_target, 0)
                ),
                file_pct: format_pct(file_pct),
            }
        })
        .collect()
}

/// Everything the overview shows and the JSON export carries.
pub fn territory_summary(
    rows: &[PerformanceRow],
    config: &EngineConfig,
    today: NaiveDate,
) -> TerritorySummary {
    let disb = metrics::aggregate(rows, Dimension::Amount);
    let files = metrics::aggregate(rows, Dimension::Files);
    let working_days = metrics::working_days_remaining(today, config.deadline, &config.off_days);
    TerritorySummary {
        deadline: config.deadline,
        working_days_left: working_days,
        active_flos: metrics::valid_rows(rows).count(),
        branches: metrics::branch_names(rows).len(),
        disb_target: disb.target_sum,
        disb_done: disb.done_sum,
        disb_gap: disb.gap,
        disb_pct: disb.achievement_pct,
        file_target: files.target_sum,
        file_done: files.done_sum,
        file_gap: files.gap,
        file_pct: files.achievement_pct,
        required_drr_amount: metrics::required_rate(disb.target_sum, disb.done_sum, working_days),
        required_drr_files: metrics::required_rate(files.target_sum, files.done_sum, working_days),
    }
}

/// Branch impact table for the trends report: share of total disbursement
/// volume, flagged High Impact above 30%.
pub fn branch_impact(rows: &[PerformanceRow]) -> Vec<BranchImpactRow> {
    metrics::branch_shares(rows)
        .into_iter()
        .map(|share| BranchImpactRow {
            branch: share.branch,
            volume_done: format_lakh(share.done),
            share_pct: format_pct(share.share_pct),
            impact: if share.share_pct > 30.0 {
                "High Impact".to_string()
            } else {
                "Support".to_string()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn row(name: &str, branch: &str, dt: f64, dd: f64, ft: f64, fd: f64) -> PerformanceRow {
        PerformanceRow {
            flo_name: name.to_string(),
            branch: branch.to_string(),
            disb_target: dt,
            disb_done: dd,
            file_target: ft,
            file_done: fd,
        }
    }

    #[test]
    fn ranking_table_numbers_from_one() {
        let rows = vec![
            row("Asha", "Tezpur", 200_000.0, 100_000.0, 0.0, 0.0),
            row("Bikash", "Dhekiajuli", 200_000.0, 180_000.0, 0.0, 0.0),
        ];
        let ranked = metrics::rank(&rows, Dimension::Amount, None);
        let table = ranking_table(&ranked, Dimension::Amount, 5);
        assert_eq!(table[0].rank, 1);
        assert_eq!(table[0].flo_name, "Bikash");
        assert_eq!(table[1].rank, 2);
        // 100k gap over 5 days.
        assert_eq!(table[1].required_drr, "₹0.2L/day");
    }

    #[test]
    fn branch_analysis_caps_display_pct() {
        let rows = vec![row("Asha", "Tezpur", 100.0, 150.0, 0.0, 0.0)];
        let table = branch_analysis(&rows);
        assert_eq!(table[0].ach_pct, "100.0%");
    }

    #[test]
    fn flo_cards_floor_gap_and_cap_pct() {
        let rows = vec![row("Asha", "Tezpur", 100_000.0, 250_000.0, 10.0, 4.0)];
        let cards = flo_cards(&rows, "Tezpur");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].disb_gap, "₹0.0L");
        assert_eq!(cards[0].disb_pct, "100.0%");
        assert_eq!(cards[0].files, "4/10");
        assert_eq!(cards[0].file_pct, "40.0%");
    }

    #[test]
    fn flo_cards_empty_branch_is_empty() {
        assert!(flo_cards(&[], "Tezpur").is_empty());
    }

    #[test]
    fn summary_of_empty_snapshot_has_no_division_errors() {
        let config = EngineConfig {
            deadline: NaiveDate::from_ymd_opt(2026, 2, 26).unwrap(),
            off_days: HashSet::new(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        let summary = territory_summary(&[], &config, today);
        assert_eq!(summary.working_days_left, 1);
        assert_eq!(summary.disb_pct, 0.0);
        assert_eq!(summary.required_drr_amount, 0.0);
        assert_eq!(summary.required_drr_files, 0.0);
        assert_eq!(summary.active_flos, 0);
    }
}
