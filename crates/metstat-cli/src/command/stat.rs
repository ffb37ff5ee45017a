use arrayvec::ArrayVec;
use metstat_engine::{
    average::{AverageMethod, average},
    pipeline::group_samples,
    schema::LineType,
    statistic::calculator::{DerivedStatisticSeries, calculate},
};
use serde::Serialize;

use super::InputArg;
use crate::util::{Output, Report};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatArg {
    #[command(flatten)]
    input: InputArg,
}

#[derive(Debug, Serialize)]
struct GroupSeries {
    independent: String,
    model: String,
    average: ArrayVec<f64, 2>,
    #[serde(flatten)]
    series: DerivedStatisticSeries,
}

#[derive(Debug, Serialize)]
struct StatReport {
    line_type: Option<LineType>,
    average_method: AverageMethod,
    equalized: bool,
    groups: Vec<GroupSeries>,
}

pub(crate) fn run(arg: &StatArg) -> anyhow::Result<()> {
    let (table, config) = arg.input.load()?;
    let grouped = group_samples(&table, &config)?;

    let mut groups = vec![];
    for point in grouped.points {
        for group in point.models {
            groups.push(GroupSeries {
                independent: point.value.clone(),
                average: average(&group.stats, config.statistic, config.average_method)?,
                series: calculate(&group.stats, config.statistic)?,
                model: group.model,
            });
        }
    }

    let line_type = grouped.resolution.line_type();
    let report = StatReport {
        line_type,
        average_method: config.average_method.for_line_type(line_type),
        equalized: grouped.equalized,
        groups,
    };
    Output::save_json(
        &Report::new(&arg.input.input, None, report),
        arg.input.output.clone(),
    )
}
