// The performance metrics engine. Every function here is a pure function of
// (rows, config, today); `today` is always passed in, never read from the
// clock, so each computation is deterministic and testable.
use crate::types::{AggregateMetrics, Dimension, HistoryRow, PerformanceRow, RankedFlo};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Rows eligible for aggregation and ranking: the FLO name must be present
/// and must not be a "Total" summary line. Summary rows come from the sheet
/// itself and would double-count everything if left in.
pub fn valid_rows(rows: &[PerformanceRow]) -> impl Iterator<Item = &PerformanceRow> {
    rows.iter().filter(|r| {
        let name = r.flo_name.trim();
        !name.is_empty() && !name.to_lowercase().contains("total")
    })
}

/// Count eligible working days from `today` through `deadline`, inclusive,
/// skipping off-days (exact calendar-date match).
///
/// The result is clamped to a minimum of 1 even when today is already past
/// the deadline or every remaining day is an off-day. That floor is policy:
/// callers divide gaps by this value, and a "zero days left" cycle still
/// needs a meaningful daily rate.
pub fn working_days_remaining(
    today: NaiveDate,
    deadline: NaiveDate,
    off_days: &HashSet<NaiveDate>,
) -> u32 {
    let mut count = 0u32;
    let mut day = today;
    while day <= deadline {
        if !off_days.contains(&day) {
            count += 1;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    count.max(1)
}

fn achievement_pct(target: f64, done: f64) -> f64 {
    if target > 0.0 {
        done / target * 100.0
    } else {
        0.0
    }
}

/// Sum targets and done quantities for one dimension over an already
/// filtered set of rows (e.g. a branch subset).
pub fn aggregate_rows<'a, I>(rows: I, dimension: Dimension) -> AggregateMetrics
where
    I: IntoIterator<Item = &'a PerformanceRow>,
{
    let mut target_sum = 0.0;
    let mut done_sum = 0.0;
    for row in rows {
        target_sum += dimension.target(row);
        done_sum += dimension.done(row);
    }
    AggregateMetrics {
        target_sum,
        done_sum,
        gap: target_sum - done_sum,
        achievement_pct: achievement_pct(target_sum, done_sum),
    }
}

/// Territory-wide totals for one dimension. Applies the validity filter,
/// then sums. The percentage is unclamped; progress-bar style clamping is a
/// presentation concern.
pub fn aggregate(rows: &[PerformanceRow], dimension: Dimension) -> AggregateMetrics {
    aggregate_rows(valid_rows(rows), dimension)
}

/// Daily rate needed to close the remaining gap by the deadline. Gaps that
/// are already closed (or over-achieved) project a rate of 0, never a
/// negative number.
pub fn required_rate(target: f64, done: f64, working_days: u32) -> f64 {
    let gap = target - done;
    if gap > 0.0 {
        gap / working_days.max(1) as f64
    } else {
        0.0
    }
}

/// Annotate and order FLOs by achievement for one dimension.
///
/// The optional search term matches case-insensitively against FLO name or
/// branch. The sort is descending by percentage and stable, so FLOs with
/// equal achievement keep their sheet order; there is deliberately no
/// secondary sort key.
pub fn rank(
    rows: &[PerformanceRow],
    dimension: Dimension,
    search: Option<&str>,
) -> Vec<RankedFlo> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut ranked: Vec<RankedFlo> = valid_rows(rows)
        .filter(|r| match &needle {
            Some(n) => {
                r.flo_name.to_lowercase().contains(n) || r.branch.to_lowercase().contains(n)
            }
            None => true,
        })
        .map(|r| {
            let target = dimension.target(r);
            let done = dimension.done(r);
            RankedFlo {
                flo_name: r.flo_name.clone(),
                branch: r.branch.clone(),
                target,
                done,
                gap: target - done,
                achievement_pct: achievement_pct(target, done),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.achievement_pct
            .partial_cmp(&a.achievement_pct)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Distinct branch names among valid rows, first-seen order. Comparison is
/// trimmed and case-insensitive but the first spelling encountered wins.
pub fn branch_names(rows: &[PerformanceRow]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for row in valid_rows(rows) {
        let branch = row.branch.trim();
        if branch.is_empty() {
            continue;
        }
        if seen.insert(branch.to_lowercase()) {
            names.push(branch.to_string());
        }
    }
    names
}

/// Valid rows belonging to one branch (trimmed, case-insensitive match).
pub fn branch_rows<'a>(rows: &'a [PerformanceRow], branch: &str) -> Vec<&'a PerformanceRow> {
    let wanted = branch.trim().to_lowercase();
    valid_rows(rows)
        .filter(|r| r.branch.trim().to_lowercase() == wanted)
        .collect()
}

/// Trend figures for the variance report.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendStats {
    pub total_done_now: f64,
    pub total_files_now: f64,
    pub total_done_prev: f64,
    /// Day-over-day change vs yesterday's snapshot, in percent. Zero when
    /// there is no usable baseline.
    pub day_over_day_pct: f64,
    /// Average disbursement per completed file.
    pub yield_per_file: f64,
    pub active_flos: usize,
}

/// Compare the live totals against yesterday's History snapshot.
pub fn trend_stats(
    rows: &[PerformanceRow],
    history: &[HistoryRow],
    today: NaiveDate,
) -> TrendStats {
    let total_done_now: f64 = valid_rows(rows).map(|r| r.disb_done).sum();
    let total_files_now: f64 = valid_rows(rows).map(|r| r.file_done).sum();
    let active_flos = valid_rows(rows).count();

    let yesterday = today.pred_opt().unwrap_or(today);
    let total_done_prev: f64 = history
        .iter()
        .filter(|h| h.date == yesterday)
        .map(|h| h.disb_done)
        .sum();

    let day_over_day_pct = if total_done_prev > 0.0 {
        (total_done_now - total_done_prev) / total_done_prev * 100.0
    } else {
        0.0
    };
    let yield_per_file = if total_files_now > 0.0 {
        total_done_now / total_files_now
    } else {
        0.0
    };

    TrendStats {
        total_done_now,
        total_files_now,
        total_done_prev,
        day_over_day_pct,
        yield_per_file,
        active_flos,
    }
}

/// One branch's share of the total disbursement volume.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchShare {
    pub branch: String,
    pub done: f64,
    pub share_pct: f64,
}

pub fn branch_shares(rows: &[PerformanceRow]) -> Vec<BranchShare> {
    let total_done: f64 = valid_rows(rows).map(|r| r.disb_done).sum();
    branch_names(rows)
        .into_iter()
        .map(|branch| {
            let done: f64 = branch_rows(rows, &branch).iter().map(|r| r.disb_done).sum();
            let share_pct = if total_done > 0.0 {
                done / total_done * 100.0
            } else {
                0.0
            };
            BranchShare {
                branch,
                done,
                share_pct,
            }
        })
        .collect()
}
