use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use metstat_engine::{
    average::AverageMethod, config::VerificationConfig, schema::LineType, statistic::Statistic,
    table::VerificationTable,
};
use tracing_subscriber::EnvFilter;

use self::{bootstrap::BootstrapArg, compare::CompareArg, stat::StatArg};
use crate::{table_io, util};

mod bootstrap;
mod compare;
mod stat;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log everything down to trace level
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare models against the first one, with confidence intervals
    Compare(#[clap(flatten)] CompareArg),
    /// Derive a statistic for every sample of every model group
    Stat(#[clap(flatten)] StatArg),
    /// Bootstrap a confidence interval for every model group
    Bootstrap(#[clap(flatten)] BootstrapArg),
}

/// Input table and the configuration fields every command shares.
#[derive(Debug, Clone, clap::Args)]
struct InputArg {
    /// Verification table (MET-style text, or JSON records with a .json extension)
    input: PathBuf,
    /// JSON configuration file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Statistic to compute
    #[arg(long)]
    statistic: Option<Statistic>,
    /// Averaging method (MEAN, MEDIAN, AGGREGATION)
    #[arg(long)]
    average_method: Option<AverageMethod>,
    /// Line type, instead of detecting it from the columns
    #[arg(long)]
    line_type: Option<LineType>,
    /// Event category for MCTC rows without EVENT_CAT
    #[arg(long)]
    event_category: Option<usize>,
    /// Column naming the model of a row
    #[arg(long)]
    model_column: Option<String>,
    /// Column holding the independent variable
    #[arg(long)]
    independent_column: Option<String>,
    /// Skip event equalization across models
    #[arg(long)]
    no_equalization: bool,
    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl InputArg {
    fn load(&self) -> anyhow::Result<(VerificationTable, VerificationConfig)> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<VerificationConfig, _>("configuration", path)?,
            None => VerificationConfig::default(),
        };
        if let Some(statistic) = self.statistic {
            config.statistic = statistic;
        }
        if let Some(method) = self.average_method {
            config.average_method = method;
        }
        if self.line_type.is_some() {
            config.line_type = self.line_type;
        }
        if self.event_category.is_some() {
            config.event_category = self.event_category;
        }
        if let Some(column) = &self.model_column {
            config.group_keys.model.clone_from(column);
        }
        if let Some(column) = &self.independent_column {
            config.group_keys.independent.clone_from(column);
        }
        if self.no_equalization {
            config.event_equalization = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        tracing::debug!(?config, "effective configuration");

        let table = table_io::read_table(&self.input)
            .with_context(|| format!("Failed to load {}", self.input.display()))?;
        Ok((table, config))
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.debug);
    match args.mode {
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::Stat(arg) => stat::run(&arg)?,
        Mode::Bootstrap(arg) => bootstrap::run(&arg)?,
    }
    Ok(())
}
