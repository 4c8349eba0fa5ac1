// Entry point and CLI flow.
//
// - `--batch` loads the file, writes every report and exits.
// - Otherwise an interactive menu lets the user load the file, switch mesh
//   type or threshold and regenerate the reports as often as they like.
//   Every generation reruns the full analysis from the loaded raw rows.
mod advisory;
mod cli;
mod derive;
mod error;
mod flags;
mod loader;
mod normalize;
mod output;
mod pipeline;
mod reports;
mod types;
mod util;

use clap::Parser;
use cli::Args;
use loader::RawDataset;
use once_cell::sync::Lazy;
use pipeline::{analyze, Analysis, AnalysisParams};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Mutex, MutexGuard};
use types::{MeshType, UtilizationThreshold};

// Session inputs only. Derived views are never kept between generations.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        input: PathBuf::from("shaker_data.csv"),
        out_dir: PathBuf::from("."),
        data: None,
        params: AnalysisParams::default(),
    })
});

struct AppState {
    input: PathBuf,
    out_dir: PathBuf,
    data: Option<RawDataset>,
    params: AnalysisParams,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    if let Ok(0) = io::stdin().read_line(&mut buf) {
        // stdin closed
        println!("\nExiting the program.");
        process::exit(0);
    }
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Option [1]: load the CSV file into the session.
fn handle_load() -> bool {
    let path = state().input.clone();
    match loader::load_csv(&path) {
        Ok(data) => {
            let r = &data.report;
            println!(
                "Processing dataset... ({} rows loaded from {})",
                util::format_int(r.total_rows),
                path.display()
            );
            if r.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to unreadable records.",
                    util::format_int(r.parse_errors)
                );
            }
            if r.invalid_cells > 0 {
                println!(
                    "Note: {} numeric cells could not be read and are treated as missing.",
                    util::format_int(r.invalid_cells)
                );
            }
            println!();
            state().data = Some(data);
            true
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Failed to load file: {}\n", e);
            false
        }
    }
}

/// Option [2]: choose the screen mesh type.
fn handle_select_mesh() {
    println!("Select Screen Mesh Type:");
    for (idx, mesh) in MeshType::ALL.iter().enumerate() {
        println!("[{}] {} ({} gpm)", idx + 1, mesh, mesh.capacity());
    }
    let choice = read_choice();
    let selected = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| MeshType::ALL.get(i).copied());
    match selected {
        Some(mesh) => {
            state().params.mesh = mesh;
            println!("Mesh type set to {}.\n", mesh);
        }
        None => println!("Invalid choice. Mesh type unchanged.\n"),
    }
}

/// Option [3]: set the daily utilization threshold.
fn handle_set_threshold() {
    let input = prompt(&format!(
        "Utilization Threshold (%) [{}-{}]: ",
        UtilizationThreshold::MIN,
        UtilizationThreshold::MAX
    ));
    match input.parse::<UtilizationThreshold>() {
        Ok(t) => {
            state().params.threshold = t;
            println!("Threshold set to {}.\n", t);
        }
        Err(e) => println!("{}. Threshold unchanged.\n", e),
    }
}

/// Option [4]: run the analysis, write the files and print previews.
fn handle_generate_reports() -> Result<(), error::Error> {
    let (data, params, out_dir) = {
        let s = state();
        (s.data.clone(), s.params, s.out_dir.clone())
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return Ok(());
    };

    println!("Generating reports...");
    let analysis = analyze(&data, params);
    let files = output::write_reports(&out_dir, &analysis)?;
    print_analysis(&analysis, &out_dir);
    println!("Outputs saved:");
    for f in files {
        println!("  {}", f.display());
    }
    println!();
    Ok(())
}

fn print_analysis(a: &Analysis, out_dir: &Path) {
    println!(
        "Mesh: {} ({} gpm) | Threshold: {}\n",
        a.params.mesh,
        a.params.mesh.capacity(),
        a.params.threshold
    );

    for w in &a.warnings {
        println!("Warning: {}", w);
    }
    if !a.warnings.is_empty() {
        println!();
    }

    println!("Key Metrics");
    println!(
        "Avg Utilization: {}% | Avg Flow Rate: {} gpm | Max SHKR3: {}%\n",
        util::format_optional(a.summary.avg_utilization, 1),
        util::format_optional(a.summary.avg_flow_rate, 1),
        util::format_optional(a.summary.max_shaker3, 1)
    );

    println!("Daily Utilization Summary\n");
    output::preview_table_rows(&reports::render_daily(&a.daily), 7);
    println!(
        "(Full table exported to {})\n",
        out_dir.join(output::DAILY_FILE).display()
    );

    println!("Health Flags\n");
    output::preview_table_rows(&a.flags, a.flags.len());

    println!("Advisory");
    println!("{}", a.advisory.recommendation);
    println!(
        "Estimated savings: {} per day\n",
        util::format_optional(a.advisory.estimated_savings_per_day, 2)
    );
}

fn run_batch() -> i32 {
    if !handle_load() {
        return 1;
    }
    match handle_generate_reports() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Write error: {}", e);
            1
        }
    }
}

fn run_interactive() {
    loop {
        {
            let s = state();
            println!(
                "Shaker Health Report [{} | {} | {}]",
                s.input.display(),
                s.params.mesh,
                s.params.threshold
            );
        }
        println!("[1] Load the file");
        println!("[2] Select screen mesh type");
        println!("[3] Set utilization threshold");
        println!("[4] Generate reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => handle_select_mesh(),
            "3" => handle_set_threshold(),
            "4" => {
                println!();
                if let Err(e) = handle_generate_reports() {
                    eprintln!("Write error: {}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    {
        let mut s = state();
        s.input = args.input.clone();
        s.out_dir = args.out_dir.clone();
        s.params = AnalysisParams {
            mesh: args.mesh,
            threshold: args.threshold,
        };
    }

    if args.batch {
        process::exit(run_batch());
    }
    run_interactive();
}
