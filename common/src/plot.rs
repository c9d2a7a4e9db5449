use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Context, ContextCompat, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{aggregate::AggregateTable, config::Config, util::plot_python};

/// Everything the plotting script needs to draw the figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
    pub rows: usize,
    pub cols: usize,
    pub title: String,
    pub title_size: u32,
    /// `tight_layout` rect, leaves room for the title
    pub layout_rect: [f64; 4],
    /// Row-major, `None` panels are drawn as empty axes
    pub panels: Vec<Option<BarPanel>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPanel {
    pub title: String,
    pub y_label: String,
    pub ticks: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub series: Vec<BarSeries>,
}

/// One task's bars across all indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub label: String,
    pub color: String,
    pub width: f64,
    pub x: Vec<f64>,
    pub heights: Vec<f64>,
}

impl FigureSpec {
    /// Lays out one bar panel per workload after the reserved panels.
    /// `aggregates` must be in the same order as `config.workloads`.
    pub fn build(config: &Config, aggregates: &[AggregateTable]) -> Result<Self> {
        if aggregates.len() != config.workloads.len() {
            bail!(
                "Got {} aggregates for {} workloads",
                aggregates.len(),
                config.workloads.len()
            );
        }
        let figure = &config.figure;
        let mut panels = vec![None; figure.rows * figure.cols];
        for (i, (workload, aggregate)) in config.workloads.iter().zip(aggregates).enumerate() {
            let slot = panels
                .get_mut(figure.reserved_panels + i)
                .context("Workload panel outside the grid")?;
            *slot = Some(BarPanel::build(config, &workload.title, aggregate));
        }
        Ok(Self {
            width: figure.width,
            height: figure.height,
            dpi: figure.dpi,
            rows: figure.rows,
            cols: figure.cols,
            title: figure.title.clone(),
            title_size: figure.title_size,
            layout_rect: [0.0, 0.0, 1.0, 0.95],
            panels,
        })
    }
}

impl BarPanel {
    fn build(config: &Config, title: &str, aggregate: &AggregateTable) -> Self {
        let bar_width = config.figure.bar_width;
        let group_center = bar_width * config.tasks.len().saturating_sub(1) as f64 / 2.0;
        let series = config
            .tasks
            .iter()
            .enumerate()
            .map(|(task_pos, task)| BarSeries {
                label: task.clone(),
                color: config.task_color(task_pos).to_owned(),
                width: bar_width,
                x: (0..config.indexes.len())
                    .map(|pos| pos as f64 + task_pos as f64 * bar_width)
                    .collect(),
                heights: config
                    .indexes
                    .iter()
                    .map(|index| aggregate.bar_height(index, task))
                    .collect(),
            })
            .collect();
        Self {
            title: title.to_owned(),
            y_label: config.figure.y_label.clone(),
            ticks: (0..config.indexes.len())
                .map(|pos| pos as f64 + group_center)
                .collect(),
            tick_labels: config.indexes.clone(),
            series,
        }
    }
}

/// `<analysis_dir>/plot_data/<figure stem>.json`
pub fn plot_data_path(config: &Config) -> Result<PathBuf> {
    let stem = config
        .output
        .figure
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| eyre::eyre!("Invalid figure path {:?}", config.output.figure))?;
    Ok(config
        .output
        .analysis_dir
        .join("plot_data")
        .join(format!("{stem}.json")))
}

pub fn write_plot_data(spec: &FigureSpec, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(spec)?)
        .wrap_err_with(|| format!("Write plot data {}", path.display()))?;
    debug!("Wrote plot data {}", path.display());
    Ok(())
}

/// Saves the figure's plot data and hands it to the plotting script
pub fn render(config: &Config, spec: &FigureSpec, show: bool) -> Result<()> {
    let data_path = plot_data_path(config)?;
    write_plot_data(spec, &data_path)?;

    if let Some(parent) = config.output.figure.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    let data = data_path
        .to_str()
        .context("Plot data path is not valid utf-8")?;
    let filepath = config
        .output
        .figure
        .to_str()
        .context("Figure path is not valid utf-8")?;
    let mut args = vec![("--data", data), ("--filepath", filepath)];
    if show {
        args.push(("--show", "1"));
    }
    plot_python(&config.python, &config.plot_script, &args)?;
    info!("Saved figure to {}", config.output.figure.display());
    Ok(())
}
