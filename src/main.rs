use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;
use miette::{Context, IntoDiagnostic, Result};

use sstkv::Store;

#[derive(Parser, Debug)]
#[command(name = "sstkv", version, about, long_about = None)]
struct Cli {
    /// Path to the SST data file (defaults to $HOME/.sstkv/data.sst)
    #[arg(global = true, short, long)]
    store_file: Option<PathBuf>,

    /// Raise the log level to debug
    #[arg(global = true, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert a key-value pair
    #[command(alias = "p")]
    Put { key: String, value: String },

    /// Get a value by key
    #[command(alias = "g")]
    Get { key: String },

    /// Remove a key
    #[command(alias = "rm")]
    Del { key: String },

    /// Scan values whose key hashes fall in [key1, key2]
    Scan { key1: String, key2: String },

    /// Force a merge/flush of the memtable into the SST
    Flush,

    /// Replay a CSV file of commands and write a CSV of outcomes
    ///
    /// Input rows: `type,key1,key2,value` (key2/value may be empty
    /// depending on type). Output rows: `type,key1,outcome,values`.
    Batch { input: PathBuf, output: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    let store_path = cli.store_file.unwrap_or_else(default_store_path);
    if let Some(parent) = store_path.parent() {
        fs::create_dir_all(parent).into_diagnostic().wrap_err_with(|| {
            format!("could not create store directory {:?}", parent)
        })?;
    }

    let mut store = Store::open(store_path.clone())
        .into_diagnostic()
        .wrap_err_with(|| format!("could not open store at {:?}", store_path))?;

    match cli.command {
        Command::Put { key, value } => {
            store
                .put(&key, &value)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to put key={key}"))?;
            success(&format!("put: {key} = {value}"));
        }
        Command::Get { key } => match store
            .get(&key)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to get key={key}"))?
        {
            Some(value) => info(&format!("{key} = {value}")),
            None => warn(&format!("key not found: {key}")),
        },
        Command::Del { key } => {
            store.del(&key);
            success(&format!("deleted: {key}"));
        }
        Command::Scan { key1, key2 } => {
            let values = store
                .scan(&key1, &key2)
                .into_diagnostic()
                .wrap_err("scan failed")?;
            info(&format!("{} value(s): {}", values.len(), values.join(", ")));
        }
        Command::Flush => {
            store.flush().into_diagnostic().wrap_err("flush failed")?;
            success("flushed");
        }
        Command::Batch { input, output } => {
            let processed = batch::run(&mut store, &input, &output)
                .into_diagnostic()
                .wrap_err("batch run failed")?;
            success(&format!("processed {processed} command(s)"));
        }
    }

    store.flush().into_diagnostic().wrap_err("final flush failed")?;

    Ok(())
}

fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".sstkv").join("data.sst"))
        .unwrap_or_else(|| PathBuf::from("data.sst"))
}

fn success(msg: &str) {
    println!("{} {}", "✔".bright_green().bold(), msg.normal());
}

fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".bright_yellow().bold(), msg.yellow());
}

fn info(msg: &str) {
    println!("{} {}", "➤".bright_cyan().bold(), msg.cyan());
}

/// The CSV batch driver (spec §6A), adapted from
/// `original_source/controller/controller.go`'s command/output format.
mod batch {
    use std::fs;
    use std::path::Path;

    use sstkv::Store;

    const PUT: &str = "put";
    const GET: &str = "get";
    const DEL: &str = "del";
    const SCAN: &str = "scan";

    /// Reads `input`, replays each row through `store`, and writes the
    /// outcome of each to `output`. Returns the number of rows processed.
    pub fn run(store: &mut Store, input: &Path, output: &Path) -> sstkv::Result<usize> {
        let contents = fs::read_to_string(input).map_err(|source| sstkv::Error::Read {
            path: input.to_path_buf(),
            source,
        })?;

        let mut out = String::from("type,key1,outcome,values\n");
        let mut count = 0usize;

        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let op = fields.first().copied().unwrap_or("").trim();
            let key1 = fields.get(1).copied().unwrap_or("").trim();
            let key2 = fields.get(2).copied().unwrap_or("").trim();
            let value = fields.get(3).copied().unwrap_or("").trim();

            let row = match op {
                PUT => {
                    store.put(key1, value)?;
                    format!("{op},{key1},0,\n")
                }
                GET => {
                    let found = store.get(key1)?;
                    match found {
                        Some(v) => format!("{op},{key1},1,{v}\n"),
                        None => format!("{op},{key1},0,\n"),
                    }
                }
                DEL => {
                    store.del(key1);
                    format!("{op},{key1},1,\n")
                }
                SCAN => {
                    let values = store.scan(key1, key2)?;
                    format!("{op},{key1},{},{}\n", values.len(), values.join(";"))
                }
                other => {
                    return Err(sstkv::Error::InvalidCommand(other.to_string()));
                }
            };
            out.push_str(&row);
            count += 1;
        }

        fs::write(output, out).map_err(|source| sstkv::Error::Write {
            path: output.to_path_buf(),
            source,
        })?;

        Ok(count)
    }
}
