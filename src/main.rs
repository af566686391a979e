use backlog_check::cli::{inspect, run, show_config, RunOptions};
use backlog_check::error::BacklogResult;
use backlog_check::pipeline::InputPaths;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backlog-check")]
#[command(about = "Weekly backlog check: compare two backlog snapshots and report what changed.")]
#[command(long_about = "Backlog Check - weekly backlog reconciliation

Compares the previous and current backlog exports by (Sales Order, CLI,
WBS Element), adds engagement manager names and TECO status, and writes
one Excel report with three sheets:

  Comparison    - lines in both weeks, with change flags and the
                  Remaining Backlog Delta (highlighted when not 0)
  New Items     - lines only in the current week
  Solved Items  - lines only in the previous week, with TECO status

COMMANDS:
  run      - Build the report from the four input workbooks
  inspect  - Show the columns and first rows of a workbook
  config   - Print the effective configuration (YAML)

EXAMPLES:
  backlog-check run -p prev.xlsx -c curr.xlsx -r eng_mgr.xlsx -t teco.xlsx
  backlog-check run -p prev.xlsx -c curr.xlsx -r eng_mgr.xlsx -t teco.xlsx -d reports/
  backlog-check inspect curr.xlsx --rows 5

Set RUST_LOG=backlog_check=debug for pipeline diagnostics.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Compare the previous and current backlog and write the report.

All four workbooks are read completely before processing. The report is
named Backlog_analysis_<DDMMYYYY>.xlsx (today's date) and written to the
output directory, unless --output gives an explicit file path.

Missing key columns in the backlogs, or missing lookup columns in the
roster or TECO file, abort the run without writing anything.")]
    /// Build the backlog report from the four input workbooks
    Run {
        /// Previous week's backlog (.xlsx)
        #[arg(short, long)]
        previous: PathBuf,

        /// Current week's backlog (.xlsx)
        #[arg(short, long)]
        current: PathBuf,

        /// Engagement manager roster (.xlsx)
        #[arg(short, long)]
        roster: PathBuf,

        /// TECO status export (.xlsx)
        #[arg(short, long)]
        teco: PathBuf,

        /// Directory for the dated report (default: current directory)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Explicit output file path (overrides --output-dir)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// YAML configuration overriding column and sheet names
        #[arg(long, env = "BACKLOG_CONFIG")]
        config: Option<PathBuf>,

        /// Show verbose progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the columns and first rows of a workbook
    Inspect {
        /// Path to the workbook (.xlsx)
        file: PathBuf,

        /// Number of data rows to print
        #[arg(short, long, default_value = "5")]
        rows: usize,
    },

    /// Print the effective configuration as YAML
    Config {
        /// YAML configuration to merge over the defaults
        #[arg(long, env = "BACKLOG_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> BacklogResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            previous,
            current,
            roster,
            teco,
            output_dir,
            output,
            config,
            verbose,
        } => run(RunOptions {
            inputs: InputPaths {
                previous,
                current,
                roster,
                teco,
            },
            output_dir,
            output,
            config,
            verbose,
        })
        .map(|_| ()),

        Commands::Inspect { file, rows } => inspect(file, rows),

        Commands::Config { config } => show_config(config),
    }
}
