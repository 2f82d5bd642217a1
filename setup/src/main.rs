//! Machine-setup installer CLI.
//!
//! Drives the orchestration engine non-interactively: list the step catalog
//! or run a selection of steps against their shell scripts, printing the
//! classified session log and a post-run summary.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use setup::app::App;
use setup::core::catalog::{Catalog, default_catalog};
use setup::core::selection::Selection;
use setup::core::types::LogEntry;
use setup::exit_codes;
use setup::io::config::{CONFIG_FILE, load_config};
use setup::io::script::ShellRunner;
use setup::logging;

#[derive(Parser)]
#[command(
    name = "setup",
    version,
    about = "Interactive machine-setup installer orchestrator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the step catalog with gating and category info.
    List {
        /// Emit the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run the given step ids (or every eligible step when none are given).
    Run {
        /// Step ids to run, gated and ordered by the catalog.
        ids: Vec<String>,
        /// Run every eligible step.
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let workdir = std::env::current_dir().context("resolve working directory")?;
    let config = load_config(&workdir.join(CONFIG_FILE))?;
    let catalog = default_catalog(Path::new(&config.scripts_dir));

    match cli.command {
        Command::List { json } => cmd_list(&catalog, json),
        Command::Run { ids, all: _ } => {
            let selection = seed_selection(&catalog, &ids)?;
            let mut app = App::new(catalog, &config, workdir, ShellRunner);
            app.set_selection(selection);
            cmd_run(&mut app)
        }
    }
}

fn cmd_list(catalog: &Catalog, json: bool) -> Result<i32> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(catalog.steps()).context("serialize catalog")?
        );
        return Ok(exit_codes::OK);
    }
    for step in catalog.steps() {
        let category = step.category.as_deref().unwrap_or("-");
        let gated = if step.requires_brew {
            " (requires brew)"
        } else {
            ""
        };
        println!("{:<14} {:<10} {}{}", step.id, category, step.label, gated);
    }
    Ok(exit_codes::OK)
}

/// An explicit id list becomes the selection verbatim; the driver's gate
/// filters ineligible ids when the plan is frozen. No ids means an empty
/// selection, which runs the whole eligible catalog.
fn seed_selection(catalog: &Catalog, ids: &[String]) -> Result<Selection> {
    for id in ids {
        if !catalog.contains(id) {
            bail!("unknown step id '{id}' (see `setup list`)");
        }
    }
    Ok(ids.iter().cloned().collect())
}

fn cmd_run(app: &mut App<ShellRunner>) -> Result<i32> {
    app.run()?;

    for entry in app.logs().iter() {
        print_entry(entry);
    }

    let report = app.last_report().context("run produced no report")?;
    println!();
    for id in &report.executed {
        let Some(step) = app.catalog().get(id) else {
            continue;
        };
        let duration = step
            .duration
            .map(|duration| format!(" ({}s)", duration.as_secs().max(1)))
            .unwrap_or_default();
        println!("{:<20} {}{}", step.label, status_label(step.status), duration);
    }

    if report.failed_labels.is_empty() {
        Ok(exit_codes::OK)
    } else {
        println!("Failed: {}", report.failed_labels.join(", "));
        Ok(exit_codes::FAILED)
    }
}

fn status_label(status: setup::core::types::StepStatus) -> &'static str {
    use setup::core::types::StepStatus;
    match status {
        StepStatus::Idle => "idle",
        StepStatus::Running => "running",
        StepStatus::Ok => "ok",
        StepStatus::Fail => "fail",
    }
}

fn print_entry(entry: &LogEntry) {
    if entry.separator {
        println!();
        return;
    }
    let icon = entry
        .icon
        .map(|icon| format!("{icon} "))
        .unwrap_or_default();
    if entry.dim {
        println!("    {icon}{}", entry.text);
    } else {
        println!("{icon}{}", entry.text);
    }
}
