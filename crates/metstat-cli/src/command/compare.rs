use metstat_engine::{ci::CiMethod, pipeline::compare_models};

use super::{InputArg, bootstrap::BootstrapFlags};
use crate::util::{Output, Report, seeded_rng};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CompareArg {
    #[command(flatten)]
    input: InputArg,
    /// Difference interval method (EMC, EMC_MONTE_CARLO)
    #[arg(long)]
    ci_method: Option<CiMethod>,
    /// Permutation trials for EMC_MONTE_CARLO
    #[arg(long)]
    trials: Option<usize>,
    #[command(flatten)]
    bootstrap: BootstrapFlags,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let (table, mut config) = arg.input.load()?;
    if let Some(method) = arg.ci_method {
        config.ci_method = method;
    }
    if let Some(trials) = arg.trials {
        config.monte_carlo_trials = trials;
    }
    config.bootstrap = arg.bootstrap.apply(config.bootstrap);
    let (seed, mut rng) = seeded_rng(config.seed);

    let report = compare_models(&table, &config, &mut rng)?;
    tracing::info!(
        statistic = %report.statistic,
        points = report.points.len(),
        equalized = report.equalized,
        "comparison finished"
    );
    Output::save_json(
        &Report::new(&arg.input.input, Some(seed), report),
        arg.input.output.clone(),
    )
}
