//! Model comparison over a combined verification table.
//!
//! The pipeline resolves the schema once, optionally equalizes events across
//! models, and then works point by point along the independent variable:
//! extract and convert each model's sufficient statistics, mask samples that
//! are undefined for any model, average, and put an interval on every model's
//! difference from the reference (first) model.

use arrayvec::ArrayVec;
use rand::Rng;
use serde::Serialize;

use crate::{
    Error,
    average::{AverageMethod, average},
    ci::{
        CiMethod, ConfidenceInterval,
        bootstrap::{BootstrapOutcome, bootstrap_ci},
        difference_interval,
    },
    config::VerificationConfig,
    equalize::{Equalized, common_valid_mask, equalize_samples, match_columns},
    schema::{LineType, Resolution, SufficientStatistics, resolve_with_hint},
    statistic::{Statistic, calculator::calculate},
    table::VerificationTable,
};

/// Sufficient statistics of one model at one independent-variable value.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    pub model: String,
    pub stats: SufficientStatistics,
}

/// All model groups at one independent-variable value, reference model first.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGroups {
    pub value: String,
    pub models: Vec<ModelGroup>,
}

/// A table split into model groups.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSamples {
    pub resolution: Resolution,
    pub equalized: bool,
    pub points: Vec<PointGroups>,
}

/// Splits `table` by independent value and model and extracts every group.
///
/// Models are ordered by first appearance in the table. Each group is sorted
/// by the match columns the table has, so that after equalization sample `i`
/// is the same event for every model. With event equalization on, samples
/// undefined for one model are masked for all of them.
pub fn group_samples(
    table: &VerificationTable,
    config: &VerificationConfig,
) -> Result<GroupedSamples, Error> {
    let resolution = resolve_with_hint(table.columns(), config.line_type)?;
    tracing::debug!(%resolution, rows = table.len(), "resolved schema");

    let Equalized { table, equalized } = if config.event_equalization {
        equalize_samples(table, &config.group_keys)?
    } else {
        Equalized {
            table: table.clone(),
            equalized: false,
        }
    };
    if table.is_empty() {
        tracing::warn!("verification table has no rows");
    }

    let model_column = config.group_keys.model.as_str();
    let mut model_order: Vec<String> = vec![];
    for mut key in table.key_tuples(&[model_column])? {
        let model = key.swap_remove(0);
        if !model_order.contains(&model) {
            model_order.push(model);
        }
    }
    let sort_columns = match_columns(&table);
    let options = config.extract_options();

    let mut points = vec![];
    for (mut value, rows) in table.group_by(&[config.group_keys.independent.as_str()])? {
        let mut models = rows
            .group_by(&[model_column])?
            .into_iter()
            .map(|(mut model, rows)| {
                let rows = rows.sorted_by(&sort_columns)?;
                let stats = SufficientStatistics::extract(&rows, resolution, &options)?
                    .convert(config.conversion.as_ref())?;
                Ok(ModelGroup {
                    model: model.swap_remove(0),
                    stats,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        models.sort_by_key(|group| model_order.iter().position(|model| *model == group.model));
        if config.event_equalization {
            mask_invalid_samples(&mut models, config.statistic)?;
        }
        points.push(PointGroups {
            value: value.swap_remove(0),
            models,
        });
    }

    Ok(GroupedSamples {
        resolution,
        equalized,
        points,
    })
}

/// Masks every sample whose derived value is undefined for any model.
///
/// Skipped when the models have different sample counts.
fn mask_invalid_samples(models: &mut [ModelGroup], statistic: Statistic) -> Result<(), Error> {
    let Some(first) = models.first() else {
        return Ok(());
    };
    let len = first.stats.len();
    if models.iter().any(|group| group.stats.len() != len) {
        tracing::debug!("sample counts differ between models, invalid samples not masked");
        return Ok(());
    }
    let derived = models
        .iter()
        .map(|group| calculate(&group.stats, statistic))
        .collect::<Result<Vec<_>, Error>>()?;
    let series = derived
        .iter()
        .flat_map(|series| &series.components)
        .map(|component| component.values.as_slice())
        .collect::<Vec<_>>();
    let keep = common_valid_mask(&series)?;
    let masked = keep.iter().filter(|keep| !**keep).count();
    if masked > 0 {
        tracing::debug!(masked, samples = len, "masked samples undefined for some model");
        for group in models.iter_mut() {
            group.stats = group.stats.masked(&keep);
        }
    }
    Ok(())
}

/// Summary of one model at one independent-variable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub samples: usize,
    /// One value per statistic component.
    pub average: ArrayVec<f64, 2>,
    /// Interval of `model − reference`; absent for the reference model and
    /// for composite statistics.
    pub ci: Option<ConfidenceInterval>,
    pub bootstrap: Option<BootstrapOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndependentPoint {
    pub value: String,
    pub models: Vec<ModelSummary>,
}

/// Result of [`compare_models`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub statistic: Statistic,
    pub display_name: &'static str,
    /// `None` when the table only carries `TOTAL`.
    pub line_type: Option<LineType>,
    /// The averaging method in effect after the schema policy.
    pub average_method: AverageMethod,
    pub ci_method: CiMethod,
    pub equalized: bool,
    pub points: Vec<IndependentPoint>,
}

/// Compares every model against the reference model at every
/// independent-variable value.
///
/// Difference intervals pair samples by position, so they are only computed
/// on equalized tables.
pub fn compare_models<Rn>(
    table: &VerificationTable,
    config: &VerificationConfig,
    rng: &mut Rn,
) -> Result<ComparisonReport, Error>
where
    Rn: Rng + ?Sized,
{
    let grouped = group_samples(table, config)?;
    let statistic = config.statistic;
    let settings = config.difference_settings();
    let bootstrap_config = config.bootstrap.filter(|_| {
        if statistic.is_composite() {
            tracing::warn!(%statistic, "composite statistics are not bootstrapped");
        }
        !statistic.is_composite()
    });

    let mut points = vec![];
    for point in &grouped.points {
        let Some(reference) = point.models.first() else {
            continue;
        };
        let mut models = vec![];
        for (index, group) in point.models.iter().enumerate() {
            let ci = if index == 0 || statistic.is_composite() {
                None
            } else if !grouped.equalized {
                tracing::warn!(
                    point = %point.value,
                    model = %group.model,
                    "samples are not equalized, interval skipped"
                );
                None
            } else if group.stats.len() != reference.stats.len() {
                tracing::warn!(
                    point = %point.value,
                    model = %group.model,
                    reference = %reference.model,
                    "sample counts differ from the reference model, interval skipped"
                );
                None
            } else {
                Some(difference_interval(&reference.stats, &group.stats, &settings, rng)?)
            };
            let bootstrap = bootstrap_config
                .map(|bootstrap| bootstrap_ci(&group.stats, statistic, &bootstrap, rng))
                .transpose()?;
            models.push(ModelSummary {
                model: group.model.clone(),
                samples: group.stats.len(),
                average: average(&group.stats, statistic, config.average_method)?,
                ci,
                bootstrap,
            });
        }
        points.push(IndependentPoint {
            value: point.value.clone(),
            models,
        });
    }

    let line_type = grouped.resolution.line_type();
    Ok(ComparisonReport {
        statistic,
        display_name: statistic.display_name(),
        line_type,
        average_method: config.average_method.for_line_type(line_type),
        ci_method: config.ci_method,
        equalized: grouped.equalized,
        points,
    })
}
