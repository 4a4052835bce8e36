use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

use tauthash::{hash_all, load, FailurePolicy, HashFunction, LoadOptions, PhaseTimer};

/// Load a SMILES file and hash every molecule.
#[derive(Parser)]
#[command(name = "tauthash", version, about)]
struct Cli {
    /// SMILES file, one record per line
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Stop after N molecules (0 = all)
    #[arg(short = 'n', long, value_name = "N", default_value_t = 10000)]
    max_count: usize,

    /// Hash variant
    #[arg(short = 'f', long, value_name = "F", value_enum, default_value_t = HashFunction::HetAtomTautomer)]
    hash_function: HashFunction,

    /// Field delimiter characters
    #[arg(short, long, value_name = "CHARS", default_value = " \t")]
    delimiters: String,

    #[arg(long, value_name = "I", default_value_t = 1)]
    smiles_column: usize,

    #[arg(long, value_name = "I", default_value_t = 0)]
    name_column: usize,

    /// Skip the first line
    #[arg(long)]
    title_line: bool,

    /// Abort on valence errors instead of skipping
    #[arg(long)]
    strict: bool,

    /// Write name<TAB>hash lines
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            max_count: Some(self.max_count),
            delimiters: self.delimiters.clone(),
            smiles_column: self.smiles_column,
            name_column: Some(self.name_column),
            title_line: self.title_line,
            policy: if self.strict {
                FailurePolicy::Abort
            } else {
                FailurePolicy::Skip
            },
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    let targets = match env::var("TAUTHASH_LOG") {
        Ok(filter) => Targets::from_str(&filter).unwrap_or_else(|e| {
            eprintln!("Error in TAUTHASH_LOG environment variable: {e}");
            Targets::new().with_default(default)
        }),
        Err(env::VarError::NotPresent) => Targets::new().with_default(default),
        Err(env::VarError::NotUnicode(_)) => {
            eprintln!("Error in TAUTHASH_LOG environment variable: not valid UTF-8");
            Targets::new().with_default(default)
        }
    };
    Registry::default()
        .with(targets)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    info!("read mols");
    let mols = {
        let _timer = PhaseTimer::new("read mols");
        load(&cli.path, &cli.load_options())
            .with_context(|| format!("Failed to load molecules from {}", cli.path.display()))?
    };

    info!(function = %cli.hash_function, "generate hashes");
    let hashes = {
        let _timer = PhaseTimer::new("generate hashes");
        hash_all(&mols, cli.hash_function)
    };

    if let Some(path) = &cli.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let mut out = BufWriter::new(file);
        for record in &hashes {
            writeln!(out, "{}\t{}", record.name, record.hash)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        out.flush()
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    info!(
        loaded = mols.stats.loaded,
        skipped = mols.stats.skipped,
        hashes = hashes.len(),
        "done"
    );
    Ok(())
}
