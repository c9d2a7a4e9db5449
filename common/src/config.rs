use std::path::{Path, PathBuf};

use eyre::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset names, one bar per index for each
    pub tasks: Vec<String>,
    /// Index structures to report on, in chart and column order
    pub indexes: Vec<String>,
    pub results_dir: PathBuf,
    pub dataset: String,
    pub ops: String,
    pub range_query_ratio: f64,
    pub non_lookup_ratio: f64,
    pub workload_label: String,
    pub workloads: Vec<Workload>,
    pub output: OutputConfig,
    pub figure: FigureConfig,
    /// Interpreter used to run `plot_script`
    pub python: String,
    pub plot_script: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workload {
    /// Short name used in the analysis csv filename, ie. mix1
    pub name: String,
    pub insert_ratio: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub figure: PathBuf,
    pub analysis_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
    pub rows: usize,
    pub cols: usize,
    /// Leading panels left empty, the workloads fill the panels after these
    pub reserved_panels: usize,
    pub bar_width: f64,
    pub colors: Vec<String>,
    pub title: String,
    pub title_size: u32,
    pub y_label: String,
    pub show: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks: vec!["fb".to_owned()],
            indexes: ["BTree", "DynamicPGM", "LIPP", "HybridPGMLIPP"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            results_dir: PathBuf::from("results"),
            dataset: "100M_public_uint64".to_owned(),
            ops: "2M".to_owned(),
            range_query_ratio: 0.0,
            non_lookup_ratio: 0.5,
            workload_label: "0m_mix".to_owned(),
            workloads: vec![
                Workload {
                    name: "mix1".to_owned(),
                    insert_ratio: 0.1,
                    title: "Mixed Workload (10% insert ratio)".to_owned(),
                },
                Workload {
                    name: "mix2".to_owned(),
                    insert_ratio: 0.9,
                    title: "Mixed Workload (90% insert ratio)".to_owned(),
                },
            ],
            output: OutputConfig::default(),
            figure: FigureConfig::default(),
            python: "python3".to_owned(),
            plot_script: PathBuf::from("plots/index_size.py"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            figure: PathBuf::from("benchmark_results_index_size.png"),
            analysis_dir: PathBuf::from("analysis_results"),
        }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            dpi: 300,
            rows: 2,
            cols: 2,
            reserved_panels: 2,
            bar_width: 0.2,
            colors: ["blue", "green", "red", "orange"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            title: "Benchmark Results Across Different Workloads".to_owned(),
            title_size: 16,
            y_label: "Index Size (Bytes)".to_owned(),
            show: true,
        }
    }
}

impl Config {
    /// Reads a yaml config, any field left out keeps its default
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Read config {}", path.display()))?;
        let config: Config = serde_yml::from_str(&data)
            .wrap_err_with(|| format!("Parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            bail!("No tasks configured");
        }
        if self.indexes.is_empty() {
            bail!("No indexes configured");
        }
        if self.workloads.is_empty() {
            bail!("No workloads configured");
        }
        let panels = self.figure.rows * self.figure.cols;
        if self.figure.reserved_panels + self.workloads.len() > panels {
            bail!(
                "{} reserved panels and {} workloads do not fit a {}x{} grid",
                self.figure.reserved_panels,
                self.workloads.len(),
                self.figure.rows,
                self.figure.cols
            );
        }
        if !(self.figure.bar_width > 0.0) {
            bail!("Bar width must be positive, got {}", self.figure.bar_width);
        }
        if self.figure.colors.is_empty() {
            bail!("No bar colors configured");
        }
        Ok(())
    }

    /// Path of the results table for `task` under `workload`
    pub fn results_path(&self, task: &str, workload: &Workload) -> PathBuf {
        self.results_dir.join(format!(
            "{task}_{}_ops_{}_{:.6}rq_{:.6}nl_{:.6}i_{}_results_table.csv",
            self.dataset,
            self.ops,
            self.range_query_ratio,
            self.non_lookup_ratio,
            workload.insert_ratio,
            self.workload_label
        ))
    }

    pub fn analysis_path(&self, workload: &Workload) -> PathBuf {
        self.output
            .analysis_dir
            .join(format!("insertlookup_{}_index_size.csv", workload.name))
    }

    /// Bar color for the task at `task_pos`, cycling once the palette runs out
    pub fn task_color(&self, task_pos: usize) -> &str {
        &self.figure.colors[task_pos % self.figure.colors.len()]
    }
}
