use crate::config::ReconcileConfig;
use crate::error::BacklogResult;
use crate::excel::load_workbook_file;
use crate::pipeline::{self, InputPaths, InputTables};
use crate::types::{CellValue, InputKind};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Options of the `run` command
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub inputs: InputPaths,
    /// Directory for the dated report (ignored when `output` is set)
    pub output_dir: Option<PathBuf>,
    /// Explicit output file path
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// Execute the run command: compare backlogs and write the report workbook.
/// Returns the path of the written file.
pub fn run(options: RunOptions) -> BacklogResult<PathBuf> {
    println!("{}", "📊 Backlog Weekly Check".bold().green());
    println!("   Previous: {}", options.inputs.previous.display());
    println!("   Current:  {}", options.inputs.current.display());
    println!("   Roster:   {}", options.inputs.roster.display());
    println!("   TECO:     {}\n", options.inputs.teco.display());

    let config = ReconcileConfig::load_or_default(options.config.as_deref())?;
    if options.verbose {
        if let Some(path) = &options.config {
            println!("   Config: {}", path.display());
        }
        println!("{}", "📖 Reading input workbooks...".cyan());
    }

    let inputs = InputTables::from_paths(&options.inputs)?;

    if options.verbose {
        for (kind, table) in [
            (InputKind::PreviousBacklog, &inputs.previous),
            (InputKind::CurrentBacklog, &inputs.current),
            (InputKind::ManagerRoster, &inputs.roster),
            (InputKind::TecoStatus, &inputs.teco),
        ] {
            println!(
                "   {}: {} rows, {} columns",
                kind.label().bright_blue(),
                table.row_count(),
                table.column_count()
            );
        }
        println!("{}", "🔄 Reconciling and enriching...".cyan());
    }

    let outcome = pipeline::reconcile(&inputs, &config, pipeline::today())?;

    let path = match (&options.output, &options.output_dir) {
        (Some(file), _) => {
            outcome.write_to(file)?;
            file.clone()
        }
        (None, Some(dir)) => outcome.write_to_dir(dir)?,
        (None, None) => outcome.write_to_dir(Path::new("."))?,
    };

    println!("{}", outcome.status_text().bold().green());
    println!(
        "   {} {}  {} {}  {} {}",
        "Comparison:".cyan(),
        outcome.comparison.row_count(),
        "New Items:".cyan(),
        outcome.new_items.row_count(),
        "Solved Items:".cyan(),
        outcome.solved_items.row_count()
    );
    if outcome.stats.delta_computed && outcome.stats.null_deltas > 0 {
        println!(
            "   {} {} highlighted delta(s) without a numeric value",
            "⚠️".yellow(),
            outcome.stats.null_deltas
        );
    } else if !outcome.stats.delta_computed && options.verbose {
        println!(
            "   {}",
            format!(
                "No '{}' column in both backlogs - delta skipped",
                config.remaining_backlog_column
            )
            .yellow()
        );
    }
    println!("   📥 {}", path.display().to_string().bold());

    Ok(path)
}

/// Execute the inspect command: show the header and first rows of a workbook
pub fn inspect(file: PathBuf, rows: usize) -> BacklogResult<()> {
    println!("{}", "🔍 Backlog Check - Inspect".bold().green());
    println!("   File: {}\n", file.display());

    let table = load_workbook_file(&file)?;

    println!(
        "{}",
        format!(
            "📋 {} columns, {} data rows:",
            table.column_count(),
            table.row_count()
        )
        .bold()
        .cyan()
    );
    for (idx, name) in table.columns.iter().enumerate() {
        let kind = table
            .rows
            .iter()
            .map(|r| &r[idx])
            .find(|v| !v.is_empty())
            .map_or("Empty", CellValue::type_name);
        println!("   {:>3}. {} ({})", idx + 1, name.bright_blue(), kind);
    }

    if rows > 0 && !table.is_empty() {
        println!("\n{}", "📄 First rows:".bold().cyan());
        for row in table.rows.iter().take(rows) {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            println!("   {}", cells.join(" | "));
        }
    }

    Ok(())
}

/// Execute the config command: print the effective configuration as YAML
pub fn show_config(config: Option<PathBuf>) -> BacklogResult<()> {
    let config = ReconcileConfig::load_or_default(config.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
