//! gcf-search: hash-assisted search for generalized continued fraction
//! identities of mathematical constants.
//!
//! - **[`numeric`]**: exact fractions, constants, Möbius transforms, GCF evaluation.
//! - **[`series`]**: compact polynomials and the sequence generators.
//! - **[`lhs`]**: the LHS table of transformed constants and its snapshots.
//! - **[`search`]**: matching engine, verifier, orchestrator and worker pool.
//! - **[`report`]**: text and JSON output.

pub mod config;
pub mod error;
pub mod lhs;
pub mod model;
pub mod numeric;
pub mod report;
pub mod search;
pub mod series;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, SearchConfig, default_snapshot_dir};
use crate::error::SearchError;
use crate::lhs::{LhsTable, TableParams};
use crate::numeric::Constant;
use crate::report::SearchReport;
use crate::series::{CompactPolynomial, GeneratorKind};

#[derive(Parser, Debug)]
#[command(
    name = "gcf-search",
    version,
    about = "Search for continued-fraction identities of mathematical constants"
)]
pub struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Machine-readable output on stdout and JSON errors on stderr
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that needs an LHS table.
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// TOML configuration file; flags override its values
    #[arg(long, env = "GCF_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Constant name (pi, e, phi, sqrt2, ln2, zeta3) or a decimal literal
    #[arg(long)]
    pub constant: Option<Constant>,

    /// Bound of the Möbius coefficients: a, b in [0, N], c, d in [-N, N]
    #[arg(long)]
    pub lhs_limit: Option<i64>,

    /// Key granularity of the table (e.g. 1e-10)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Digits of the constant used for the table and the first phase
    #[arg(long)]
    pub enum_dps: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a coefficient space for identities
    Search {
        #[command(flatten)]
        table: TableArgs,

        /// a_n compact polynomial, e.g. "0..=3; 1,2" (terms split by ';' or spaces)
        #[arg(long, allow_hyphen_values = true)]
        poly_a: Option<CompactPolynomial>,

        /// b_n compact polynomial; searched with and without a sign flip
        #[arg(long, allow_hyphen_values = true)]
        poly_b: Option<CompactPolynomial>,

        /// Number of workers
        #[arg(long, short = 'j')]
        workers: Option<usize>,

        /// Tile size per leading poly_a term
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        tile_sizes: Option<Vec<usize>>,

        /// Build-or-load the LHS table at this path
        #[arg(long, conflicts_with = "cache_table")]
        snapshot: Option<PathBuf>,

        /// Build-or-load the LHS table in the cache directory
        #[arg(long)]
        cache_table: bool,

        /// Digits of the constant used for verification
        #[arg(long)]
        verify_dps: Option<u32>,

        /// Significant digits that must agree to confirm a match
        #[arg(long)]
        confirm_digits: Option<u32>,

        /// a_n sequence generator (horner, shifted:N)
        #[arg(long)]
        an_generator: Option<GeneratorKind>,

        /// b_n sequence generator (horner, shifted:N)
        #[arg(long)]
        bn_generator: Option<GeneratorKind>,

        /// Never draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Build an LHS table and write it as a snapshot
    BuildTable {
        #[command(flatten)]
        table: TableArgs,

        /// Snapshot path; defaults to the cache directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the header of an LHS table snapshot
    TableInfo {
        /// Snapshot path
        path: PathBuf,
    },
}

/// Error surfaced at the binary boundary.
#[derive(Debug, Clone)]
pub struct CliError {
    pub code: i32,
    pub kind: &'static str,
    pub message: String,
    pub hint: Option<String>,
    pub retryable: bool,
}

impl CliError {
    fn usage(message: String) -> Self {
        Self {
            code: 2,
            kind: "usage",
            message,
            hint: Some("Run `gcf-search --help` for usage.".into()),
            retryable: false,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{err:#}");
        if let Some(search) = err.chain().find_map(|e| e.downcast_ref::<SearchError>()) {
            return Self {
                code: search.exit_code(),
                kind: search.kind(),
                message,
                hint: search.hint().map(str::to_string),
                retryable: false,
            };
        }
        if err.chain().any(|e| e.downcast_ref::<ConfigError>().is_some()) {
            return Self {
                code: 2,
                kind: "config",
                message,
                hint: None,
                retryable: false,
            };
        }
        Self {
            code: 1,
            kind: "internal",
            message,
            hint: None,
            retryable: false,
        }
    }
}

pub struct ParsedCli {
    pub cli: Cli,
}

/// Parse arguments. `--help` and `--version` print and exit here.
pub fn parse_cli(raw_args: Vec<String>) -> Result<ParsedCli, CliError> {
    match Cli::try_parse_from(raw_args) {
        Ok(cli) => Ok(ParsedCli { cli }),
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            e.exit()
        }
        Err(e) => Err(CliError::usage(e.to_string())),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins unless -v or -q is given.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let forced = match (quiet, verbose) {
        (true, _) => Some("gcf_search=warn"),
        (false, 0) => None,
        (false, 1) => Some("gcf_search=debug"),
        (false, _) => Some("gcf_search=trace"),
    };
    let filter = match forced {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gcf_search=info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

pub fn run_with_parsed(parsed: ParsedCli) -> Result<(), CliError> {
    let cli = parsed.cli;
    init_tracing(cli.verbose, cli.quiet);
    let json = cli.json;
    match cli.command {
        Commands::Search {
            table,
            poly_a,
            poly_b,
            workers,
            tile_sizes,
            snapshot,
            cache_table,
            verify_dps,
            confirm_digits,
            an_generator,
            bn_generator,
            no_progress,
        } => {
            let mut config = table.resolve()?;
            if poly_a.is_some() {
                config.poly_a = poly_a;
            }
            if poly_b.is_some() {
                config.poly_b = poly_b;
            }
            override_field(&mut config.workers, workers);
            if tile_sizes.is_some() {
                config.tile_sizes = tile_sizes;
            }
            override_field(&mut config.verify_dps, verify_dps);
            override_field(&mut config.confirm_digits, confirm_digits);
            override_field(&mut config.an_generator, an_generator);
            override_field(&mut config.bn_generator, bn_generator);
            if no_progress || json {
                config.progress = false;
            }
            if let Some(path) = snapshot {
                config.snapshot = Some(path);
            } else if cache_table {
                config.snapshot = Some(cached_snapshot_path(&config)?);
            }
            run_search_command(&config, json).map_err(CliError::from)
        }
        Commands::BuildTable { table, out } => {
            let config = table.resolve()?;
            build_table_command(&config, out, json).map_err(CliError::from)
        }
        Commands::TableInfo { path } => table_info_command(&path, json).map_err(CliError::from),
    }
}

fn override_field<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

impl TableArgs {
    /// The config file (or defaults) with these flags applied.
    fn resolve(&self) -> Result<SearchConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::load_from(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SearchConfig::default(),
        };
        override_field(&mut config.constant, self.constant.clone());
        override_field(&mut config.lhs_limit, self.lhs_limit);
        override_field(&mut config.threshold, self.threshold);
        override_field(&mut config.enum_dps, self.enum_dps);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn cached_snapshot_path(config: &SearchConfig) -> Result<PathBuf, CliError> {
    let dir = default_snapshot_dir().context("locating the snapshot cache")?;
    Ok(dir.join(TableParams::from_config(config).snapshot_file_name()))
}

fn run_search_command(config: &SearchConfig, json: bool) -> Result<()> {
    let results = search::run_search(config).context("search failed")?;
    let report = SearchReport::new(config, results).context("search needs poly_a and poly_b")?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn build_table_command(config: &SearchConfig, out: Option<PathBuf>, json: bool) -> Result<()> {
    let params = TableParams::from_config(config);
    let path = match out {
        Some(path) => path,
        None => default_snapshot_dir()?.join(params.snapshot_file_name()),
    };
    let table = LhsTable::from_params(&params)?;
    table.save(&path)?;
    info!(path = %path.display(), "snapshot written");
    print_table_summary(&path, &table, json)
}

fn table_info_command(path: &Path, json: bool) -> Result<()> {
    let table = LhsTable::load(path)?;
    print_table_summary(path, &table, json)
}

fn print_table_summary(path: &Path, table: &LhsTable, json: bool) -> Result<()> {
    if json {
        let payload = serde_json::json!({
            "path": path.display().to_string(),
            "key_digits": table.key_digits(),
            "entries": table.len(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "{}: {} entries, {} key digits",
            path.display(),
            table.len(),
            table.key_digits()
        );
    }
    Ok(())
}

