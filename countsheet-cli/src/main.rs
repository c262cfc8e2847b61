use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use countsheet_core::patcher::scratch::sweep_stale_scratch;
use countsheet_core::{CountSheetConfig, CountingSession, export, parse_template};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod formatter;

#[derive(Parser)]
#[command(name = "countsheet")]
#[command(about = "Read, count and write back inventory count templates", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the records of a count template
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Write counted quantities into a timestamped copy of the template
    Patch {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Quantity for a data row, e.g. `--set 4=12`
        #[arg(long = "set", value_name = "ROW=QTY", value_parser = parse_assignment, num_args = 1..)]
        assignments: Vec<(u32, i64)>,

        /// Directory for the patched copy (default: next to the template)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the records as comma-separated text
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory for the export file (default: next to the template)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Remove scratch directories left behind by interrupted write-backs
    Sweep {
        /// Scratch root (default: configured scratch dir or OS temp dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Minimum age in seconds of a directory to remove
        #[arg(long)]
        max_age_secs: Option<u64>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn parse_assignment(s: &str) -> std::result::Result<(u32, i64), String> {
    let (row, qty) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=QTY, got '{}'", s))?;
    let row: u32 = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row number '{}'", row))?;
    if row < 2 {
        return Err(format!("row {} is not a data row", row));
    }
    let qty: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{}'", qty))?;
    Ok((row, qty))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CountSheetConfig> {
    if let Some(config_path) = path {
        return CountSheetConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Fall back to countsheet.toml in the current directory
    let default_config_path = PathBuf::from("countsheet.toml");
    if default_config_path.exists() {
        CountSheetConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(CountSheetConfig::default())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse { file, format } => {
            let parsed = parse_template(&file, &config)
                .with_context(|| format!("Failed to parse template: {}", file.display()))?;
            match format {
                OutputFormat::Human => formatter::print_human(&file, &parsed),
                OutputFormat::Json => formatter::print_json(&file, &parsed)?,
            }
        }

        Command::Patch {
            file,
            assignments,
            output_dir,
            dry_run,
        } => {
            if assignments.is_empty() {
                println!("No quantities specified. Use --set ROW=QTY.");
                return Ok(());
            }
            if output_dir.is_some() {
                config.output_dir = output_dir;
            }

            let mut session = CountingSession::open(&file, &config)
                .with_context(|| format!("Failed to parse template: {}", file.display()))?;
            let mut changes = Vec::new();
            for (row, qty) in assignments {
                let before = session
                    .record(row)
                    .map(|r| r.quantity)
                    .with_context(|| format!("Row {} holds no record", row))?;
                session.set_quantity(row, qty)?;
                changes.push((row, before, qty));
            }

            if dry_run {
                formatter::print_dry_run(&file, &changes, &config.output_dir_for(&file));
                return Ok(());
            }

            println!("Writing counts into a copy of '{}'...", file.display());
            let report = session
                .write_back(&config)
                .with_context(|| "Failed to write back quantities")?;
            formatter::print_patch_report(&report);
        }

        Command::Export {
            file,
            output_dir,
            stdout,
        } => {
            if output_dir.is_some() {
                config.output_dir = output_dir;
            }
            let session = CountingSession::open(&file, &config)
                .with_context(|| format!("Failed to parse template: {}", file.display()))?;

            if stdout {
                print!("{}", export::export_to_string(session.records())?);
            } else {
                let path = session
                    .export(&config)
                    .with_context(|| "Failed to write export")?;
                formatter::print_written("Exported", session.records().len(), &path);
            }
        }

        Command::Sweep { dir, max_age_secs } => {
            let root = dir.unwrap_or_else(|| config.scratch_root());
            let max_age = max_age_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.scratch_max_age());
            let removed = sweep_stale_scratch(&root, max_age)
                .with_context(|| format!("Failed to sweep {}", root.display()))?;
            println!("Removed {} stale scratch area(s) from {}", removed, root.display());
        }
    }

    Ok(())
}
