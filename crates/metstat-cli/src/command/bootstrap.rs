use metstat_engine::{
    ci::bootstrap::{BootstrapConfig, BootstrapMethod, BootstrapOutcome, bootstrap_ci},
    pipeline::group_samples,
    statistic::Statistic,
};
use serde::Serialize;

use super::InputArg;
use crate::util::{Output, Report, seeded_rng};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BootstrapArg {
    #[command(flatten)]
    input: InputArg,
    #[command(flatten)]
    settings: BootstrapFlags,
}

/// Flags overriding the bootstrap section of the configuration.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct BootstrapFlags {
    /// Resampling scheme (MATCHED_PAIRS, FORECASTS)
    #[arg(long = "bootstrap-method")]
    method: Option<BootstrapMethod>,
    /// Number of bootstrap replicates
    #[arg(long)]
    nrepl: Option<usize>,
    /// Confidence level in (0, 1)
    #[arg(long)]
    level: Option<f64>,
    /// Skip groups with fewer samples than this
    #[arg(long)]
    min_samples: Option<usize>,
}

impl BootstrapFlags {
    /// Merges the flags into `base`; `None` only when neither is set.
    pub(crate) fn apply(&self, base: Option<BootstrapConfig>) -> Option<BootstrapConfig> {
        let any_flag = self.method.is_some()
            || self.nrepl.is_some()
            || self.level.is_some()
            || self.min_samples.is_some();
        if base.is_none() && !any_flag {
            return None;
        }
        let mut config = base.unwrap_or_default();
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(nrepl) = self.nrepl {
            config.nrepl = nrepl;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(min_samples) = self.min_samples {
            config.min_samples = min_samples;
        }
        Some(config)
    }
}

#[derive(Debug, Serialize)]
struct GroupInterval {
    independent: String,
    model: String,
    samples: usize,
    #[serde(flatten)]
    outcome: BootstrapOutcome,
}

#[derive(Debug, Serialize)]
struct BootstrapReport {
    statistic: Statistic,
    display_name: &'static str,
    bootstrap: BootstrapConfig,
    groups: Vec<GroupInterval>,
}

pub(crate) fn run(arg: &BootstrapArg) -> anyhow::Result<()> {
    let BootstrapArg { input, settings } = arg;
    let (table, config) = input.load()?;
    let bootstrap = settings.apply(config.bootstrap).unwrap_or_default();
    let (seed, mut rng) = seeded_rng(config.seed);

    let grouped = group_samples(&table, &config)?;
    let mut groups = vec![];
    for point in grouped.points {
        for group in point.models {
            let outcome = bootstrap_ci(&group.stats, config.statistic, &bootstrap, &mut rng)?;
            tracing::debug!(
                independent = %point.value,
                model = %group.model,
                estimate = outcome.estimate,
                "bootstrapped"
            );
            groups.push(GroupInterval {
                independent: point.value.clone(),
                model: group.model,
                samples: group.stats.len(),
                outcome,
            });
        }
    }

    let report = BootstrapReport {
        statistic: config.statistic,
        display_name: config.statistic.display_name(),
        bootstrap,
        groups,
    };
    Output::save_json(
        &Report::new(&input.input, Some(seed), report),
        input.output.clone(),
    )
}
