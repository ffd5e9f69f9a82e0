// Entry point and high-level CLI flow.
//
// The binary is a menu-driven console edition of the territory dashboard:
// - Option [1] syncs the data, Config and History tabs into memory.
// - Options [2]-[5] render the overview, rankings, branch and trend reports
//   from that snapshot, exporting tables as CSV and the summary as JSON.
//
// Every report recomputes from the stored snapshot plus "today"; nothing is
// cached between syncs.
use clap::Parser;
use territory_report::{fetch, loader, metrics, output, reports, util};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use territory_report::types::{Dimension, EngineConfig, HistoryRow, PerformanceRow};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "territory_report",
    about = "FLO territory performance dashboard over a spreadsheet backend"
)]
struct Cli {
    /// Spreadsheet web-app endpoint serving sheet tabs as JSON or CSV.
    #[arg(long)]
    url: Option<String>,

    /// Data tab holding the current cycle (e.g. "Sheet1" or "Feb-26").
    #[arg(long, default_value = "Sheet1")]
    tab: String,

    /// Load performance rows from a local CSV export instead of the network.
    /// Config and History tabs are unavailable in this mode; the fallback
    /// deadline applies.
    #[arg(long)]
    csv: Option<PathBuf>,
}

/// One synced snapshot of the spreadsheet. Reports are pure functions of
/// this plus the current date.
struct Snapshot {
    rows: Vec<PerformanceRow>,
    config: EngineConfig,
    history: Vec<HistoryRow>,
}

// Simple in-memory app state so we only sync once but can render reports
// multiple times in a single run.
static APP_STATE: Lazy<Mutex<Option<Snapshot>>> = Lazy::new(|| Mutex::new(None));

/// Read a single line of input after printing a prompt.
fn prompt_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt_line("Enter choice: ")
}

/// Ask which dimension a ranking should use. Loops until valid.
fn prompt_dimension() -> Dimension {
    loop {
        println!("[1] Files");
        println!("[2] Amount");
        match read_choice().as_str() {
            "1" => return Dimension::Files,
            "2" => return Dimension::Amount,
            _ => println!("Invalid choice. Please enter 1 or 2."),
        }
    }
}

/// Handle option [1]: sync the spreadsheet tabs into memory.
fn handle_sync(cli: &Cli) {
    let (data_records, config_records, history_records) = if let Some(path) = &cli.csv {
        match loader::load_csv_file(path) {
            Ok(records) => (records, Vec::new(), Vec::new()),
            Err(e) => {
                eprintln!("Failed to load file: {}\n", e);
                return;
            }
        }
    } else if let Some(url) = &cli.url {
        let client = match fetch::SheetClient::new(url) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Could not build HTTP client: {}\n", e);
                return;
            }
        };
        (
            client.fetch_tab(&cli.tab),
            client.fetch_tab("Config"),
            client.fetch_tab("History"),
        )
    } else {
        println!("Error: provide --url or --csv so the data source can be located.\n");
        return;
    };

    let (rows, load_report) = loader::rows_from_records(&data_records);
    let config = if config_records.is_empty() {
        EngineConfig::default()
    } else {
        loader::config_from_records(&config_records)
    };
    let history = loader::history_from_records(&history_records);

    println!(
        "Processing snapshot... ({} records fetched, {} FLO rows loaded)",
        util::format_int(load_report.total_records as i64),
        util::format_int(load_report.loaded_rows as i64)
    );
    if load_report.blank_names + load_report.summary_rows > 0 {
        println!(
            "Note: {} blank and {} summary rows will be excluded from metrics.",
            util::format_int(load_report.blank_names as i64),
            util::format_int(load_report.summary_rows as i64)
        );
    }
    println!(
        "Cycle deadline: {} ({} off days configured, {} history snapshots)\n",
        config.deadline.format("%d %b %Y"),
        config.off_days.len(),
        history.len()
    );

    let mut state = APP_STATE.lock().unwrap();
    *state = Some(Snapshot {
        rows,
        config,
        history,
    });
}

/// Pull the synced snapshot out of the app state, complaining if option [1]
/// has not run yet.
fn with_snapshot<F: FnOnce(&Snapshot)>(f: F) {
    let state = APP_STATE.lock().unwrap();
    match state.as_ref() {
        Some(snapshot) => f(snapshot),
        None => println!("Error: No data synced. Please sync territory data first (option 1).\n"),
    }
}

/// Handle option [2]: territory overview with scorecards for both
/// dimensions, top performers and branch analysis.
fn handle_overview() {
    with_snapshot(|snapshot| {
        let today = chrono::Local::now().date_naive();
        let summary = reports::territory_summary(&snapshot.rows, &snapshot.config, today);

        println!(
            "Territory Overview ({} cycle, {} production days left)\n",
            summary.deadline.format("%d %b %Y"),
            summary.working_days_left
        );
        println!(
            "Disbursement Achievement: {} (Target {} | Done {} | Gap {})",
            util::format_pct(summary.disb_pct),
            util::format_lakh(summary.disb_target),
            util::format_lakh(summary.disb_done),
            util::format_lakh(summary.disb_gap)
        );
        println!(
            "Required DRR: {}/day",
            util::format_lakh(summary.required_drr_amount)
        );
        println!(
            "File Achievement: {} (Target {} | Done {} | Gap {})",
            util::format_pct(summary.file_pct),
            util::format_number(summary.file_target, 0),
            util::format_number(summary.file_done, 0),
            util::format_number(summary.file_gap, 0)
        );
        println!(
            "Required DRR: {} files/day",
            util::format_number(summary.required_drr_files, 1)
        );
        println!(
            "Active FLOs: {} across {} branches\n",
            summary.active_flos, summary.branches
        );

        println!("Top 3 Performers (Disbursement)");
        let podium = reports::top_performers(&snapshot.rows, 3);
        let podium_table =
            reports::ranking_table(&podium, Dimension::Amount, summary.working_days_left);
        output::preview_table(&podium_table, 3);

        println!("Branch Analysis (Achievement)");
        let branches = reports::branch_analysis(&snapshot.rows);
        output::preview_table(&branches, branches.len());

        let branch_file = "branch_analysis.csv";
        if let Err(e) = output::write_csv(branch_file, &branches) {
            eprintln!("Write error: {}", e);
        }
        let summary_file = "territory_summary.json";
        if let Err(e) = output::write_json(summary_file, &summary) {
            eprintln!("Write error: {}", e);
        }
        println!("(Exported {} and {})\n", branch_file, summary_file);
    });
}

/// Handle option [3]: full FLO rankings for a chosen dimension with an
/// optional search filter.
fn handle_rankings() {
    with_snapshot(|snapshot| {
        let dimension = prompt_dimension();
        let search = prompt_line("Search FLO or Branch (blank for all): ");
        let search = if search.is_empty() {
            None
        } else {
            Some(search.as_str())
        };

        let today = chrono::Local::now().date_naive();
        let working_days = metrics::working_days_remaining(
            today,
            snapshot.config.deadline,
            &snapshot.config.off_days,
        );
        let ranked = metrics::rank(&snapshot.rows, dimension, search);
        let table = reports::ranking_table(&ranked, dimension, working_days);

        println!(
            "\nTerritory Rankings: {} (Cycle: {} | {} production days left)\n",
            dimension.label(),
            snapshot.config.deadline.format("%d %b"),
            working_days
        );
        output::preview_table(&table, 15);

        let file = match dimension {
            Dimension::Amount => "rankings_amount.csv",
            Dimension::Files => "rankings_files.csv",
        };
        if let Err(e) = output::write_csv(file, &table) {
            eprintln!("Write error: {}", e);
        }
        println!("(Full table exported to {})\n", file);
    });
}

/// Handle option [4]: per-FLO cards for one branch.
fn handle_branch() {
    with_snapshot(|snapshot| {
        let branch = prompt_line("Branch name: ");
        if branch.is_empty() {
            println!("Invalid branch name.\n");
            return;
        }
        let cards = reports::flo_cards(&snapshot.rows, &branch);
        if cards.is_empty() {
            println!("No data found for this branch.\n");
            return;
        }
        println!("\n{} Branch Performance\n", branch);
        output::preview_table(&cards, cards.len());
    });
}

/// Handle option [5]: trend and variance figures against the History sheet.
fn handle_trends() {
    with_snapshot(|snapshot| {
        let today = chrono::Local::now().date_naive();
        let stats = metrics::trend_stats(&snapshot.rows, &snapshot.history, today);

        println!("Trend & Variance\n");
        println!(
            "Day-over-Day Variance: {}{} vs yesterday",
            if stats.day_over_day_pct >= 0.0 { "+" } else { "" },
            util::format_pct(stats.day_over_day_pct)
        );
        println!(
            "Yield per File: {}",
            util::format_lakh(stats.yield_per_file)
        );
        println!("Active FLOs: {}\n", stats.active_flos);

        println!("Branch Impact Analysis");
        let impact = reports::branch_impact(&snapshot.rows);
        output::preview_table(&impact, impact.len());

        let file = "trend_branch_impact.csv";
        if let Err(e) = output::write_csv(file, &impact) {
            eprintln!("Write error: {}", e);
        }
        println!("(Full table exported to {})\n", file);
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    loop {
        println!("Territory Performance Report");
        println!("[1] Sync territory data");
        println!("[2] Territory overview");
        println!("[3] FLO rankings");
        println!("[4] Branch report");
        println!("[5] Trend & variance");
        println!("[6] Exit\n");
        match read_choice().as_str() {
            "1" => handle_sync(&cli),
            "2" => handle_overview(),
            "3" => handle_rankings(),
            "4" => handle_branch(),
            "5" => handle_trends(),
            "6" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-6.\n"),
        }
    }
}
