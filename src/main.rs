use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use table_viewer::ingestion::{load_from_path, LoadOptions, LogObserver};
use table_viewer::processing::CleaningCache;
use table_viewer::scan::{display_names, find_by_name, supported_files};
use table_viewer::view::render_outcome;

#[derive(Parser)]
#[command(name = "table-viewer")]
#[command(about = "Browse CSV, Excel and SAS tables from a data directory")]
#[command(version)]
struct Cli {
    /// Directory scanned (recursively) for tabular files
    #[arg(long, env = "TABLE_VIEWER_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List supported files, one name per line
    List,
    /// Load, clean and print one file
    Show {
        /// Base name of the file, as printed by `list`
        name: String,

        /// Print at most this many rows
        #[arg(long)]
        max_rows: Option<usize>,

        /// Emit the cleaned table as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let files = supported_files(&cli.data_dir);
    if files.is_empty() {
        bail!(
            "No supported tabular files found in the '{}' directory.",
            cli.data_dir.display()
        );
    }
    log::info!("found {} supported files under {}", files.len(), cli.data_dir.display());

    let mut cache = CleaningCache::new();
    match cli.command {
        Some(Command::List) => {
            for name in display_names(&files) {
                println!("{name}");
            }
            Ok(())
        }
        Some(Command::Show { name, max_rows, json }) => {
            let path = resolve(&files, &name)?;
            show(path, &mut cache, max_rows, json)
        }
        None => {
            let path = prompt_for_file(&files)?;
            show(path, &mut cache, None, false)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn resolve<'a>(files: &'a [PathBuf], name: &str) -> Result<&'a Path> {
    match find_by_name(files, name) {
        Some(path) => Ok(path),
        None => bail!("No supported file named '{name}'. Run `table-viewer list` to see the choices."),
    }
}

fn show(path: &Path, cache: &mut CleaningCache, max_rows: Option<usize>, json: bool) -> Result<()> {
    let options = LoadOptions {
        observer: Some(Arc::new(LogObserver)),
        ..LoadOptions::default()
    };
    let cleaned = load_from_path(path, &options).map(|frame| cache.clean(&frame));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if json {
        let frame = cleaned?;
        let text = serde_json::to_string_pretty(&*frame).context("failed to encode table as JSON")?;
        println!("{text}");
        return Ok(());
    }

    print!("{}", render_outcome(&name, &cleaned, max_rows));
    Ok(())
}

fn prompt_for_file(files: &[PathBuf]) -> Result<&Path> {
    let names = display_names(files);
    println!("Select a file to view:");
    for (idx, name) in names.iter().enumerate() {
        println!("  {:>3}. {name}", idx + 1);
    }
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read selection")?;
    let choice = line.trim();

    if let Ok(n) = choice.parse::<usize>() {
        if (1..=files.len()).contains(&n) {
            return Ok(&files[n - 1]);
        }
        bail!("Selection {n} is out of range (1-{}).", files.len());
    }
    resolve(files, choice)
}
