//! The index size report: load the mix results of every task, average the
//! index sizes, draw the figure and keep the aggregates as csv.

use std::{fs::create_dir_all, path::PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    aggregate::{AggregateTable, mean_index_size},
    config::Config,
    plot::{FigureSpec, render},
    result::ResultTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Render the figure through the plotting script
    pub plot: bool,
    /// Open the figure window after saving
    pub show: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            plot: true,
            show: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    /// One per workload, in config order
    pub aggregates: Vec<AggregateTable>,
    pub figure: FigureSpec,
    pub csv_paths: Vec<PathBuf>,
}

/// Builds one aggregate per workload.
///
/// A results table that cannot be read fails the whole run. An index with no
/// usable rows in a table is logged and left out of that aggregate.
pub fn aggregate(config: &Config) -> Result<Vec<AggregateTable>> {
    let mut aggregates = config
        .workloads
        .iter()
        .map(|workload| AggregateTable::new(&workload.name, &config.indexes, &config.tasks))
        .collect::<Vec<_>>();

    for task in &config.tasks {
        for (workload, aggregate) in config.workloads.iter().zip(aggregates.iter_mut()) {
            let table = ResultTable::load(&config.results_path(task, workload))?;
            for index in &config.indexes {
                match mean_index_size(&table, index) {
                    Ok(mean) => {
                        debug!("{}: {index}/{task} = {mean}", workload.name);
                        aggregate.insert(index, task, mean);
                    }
                    Err(err) => warn!("{}: skipping {index}/{task}, {err}", workload.name),
                }
            }
        }
    }
    Ok(aggregates)
}

/// Writes each aggregate to its analysis csv, returns the written paths
pub fn persist(config: &Config, aggregates: &[AggregateTable]) -> Result<Vec<PathBuf>> {
    create_dir_all(&config.output.analysis_dir).wrap_err_with(|| {
        format!(
            "Create analysis dir {}",
            config.output.analysis_dir.display()
        )
    })?;
    config
        .workloads
        .iter()
        .zip(aggregates)
        .map(|(workload, aggregate)| -> Result<PathBuf> {
            let path = config.analysis_path(workload);
            aggregate.save(&path)?;
            Ok(path)
        })
        .collect()
}

pub fn run(config: &Config, options: RunOptions) -> Result<Report> {
    config.validate()?;
    let aggregates = aggregate(config)?;
    let figure = FigureSpec::build(config, &aggregates)?;
    if options.plot {
        render(config, &figure, options.show && config.figure.show)?;
    } else {
        debug!("Skipping figure");
    }
    let csv_paths = persist(config, &aggregates)?;
    info!(
        "Aggregated {} values over {} workloads",
        aggregates.iter().map(AggregateTable::len).sum::<usize>(),
        aggregates.len()
    );
    Ok(Report {
        aggregates,
        figure,
        csv_paths,
    })
}
