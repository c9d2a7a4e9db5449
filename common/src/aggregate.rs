use std::{
    collections::HashMap,
    fs::create_dir_all,
    io::{Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, Writer};
use eyre::{Context, ContextCompat, Result, bail};
use thiserror::Error;
use tracing::info;

use crate::result::ResultTable;

/// Why a (index, task) pair has no aggregate value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("no rows for index {index}")]
    NoRows { index: String },
    #[error("{rows} rows for index {index} but none has a size")]
    NoValues { index: String, rows: usize },
}

/// Mean `index_size_bytes` over the rows of `table` for `index`
pub fn mean_index_size(table: &ResultTable, index: &str) -> Result<f64, ExtractError> {
    let mut rows = 0;
    let mut sum = 0.0;
    let mut count = 0;
    for row in table.rows_for(index) {
        rows += 1;
        if let Some(size) = row.index_size_bytes {
            sum += size;
            count += 1;
        }
    }
    match (rows, count) {
        (0, _) => Err(ExtractError::NoRows {
            index: index.to_owned(),
        }),
        (rows, 0) => Err(ExtractError::NoValues {
            index: index.to_owned(),
            rows,
        }),
        _ => Ok(sum / count as f64),
    }
}

/// Index -> task -> mean size for one workload.
///
/// Column and row order follow the configured index and task lists, absent
/// pairs stay absent instead of turning into zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub workload: String,
    indexes: Vec<String>,
    tasks: Vec<String>,
    values: HashMap<String, HashMap<String, f64>>,
}

impl AggregateTable {
    pub fn new(workload: &str, indexes: &[String], tasks: &[String]) -> Self {
        Self {
            workload: workload.to_owned(),
            indexes: indexes.to_vec(),
            tasks: tasks.to_vec(),
            values: indexes
                .iter()
                .map(|index| (index.clone(), HashMap::new()))
                .collect(),
        }
    }

    pub fn indexes(&self) -> &[String] {
        &self.indexes
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn insert(&mut self, index: &str, task: &str, value: f64) {
        if !self.indexes.iter().any(|i| i == index) {
            self.indexes.push(index.to_owned());
        }
        if !self.tasks.iter().any(|t| t == task) {
            self.tasks.push(task.to_owned());
        }
        self.values
            .entry(index.to_owned())
            .or_default()
            .insert(task.to_owned(), value);
    }

    pub fn get(&self, index: &str, task: &str) -> Option<f64> {
        self.values.get(index)?.get(task).copied()
    }

    /// Bar height for a pair, missing pairs are drawn flat
    pub fn bar_height(&self, index: &str, task: &str) -> f64 {
        self.get(index, task).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tasks with a value for at least one index, in task order
    fn populated_tasks(&self) -> impl Iterator<Item = &String> {
        self.tasks.iter().filter(|task| {
            self.values
                .values()
                .any(|per_task| per_task.contains_key(task.as_str()))
        })
    }

    /// Writes indexes as columns and tasks as rows, the header's first cell is empty
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(std::iter::once("").chain(self.indexes.iter().map(String::as_str)))?;
        for task in self.populated_tasks() {
            let mut record = vec![task.clone()];
            record.extend(
                self.indexes
                    .iter()
                    .map(|index| self.get(index, task).map(format_value).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)
            .wrap_err_with(|| format!("Create {}", path.display()))?;
        self.write_csv(file)
            .wrap_err_with(|| format!("Write {}", path.display()))?;
        info!("Wrote {} aggregate to {}", self.workload, path.display());
        Ok(())
    }

    /// Parses the layout produced by [`AggregateTable::write_csv`]
    pub fn read_csv<R: Read>(workload: &str, reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().from_reader(reader);
        let headers = reader.headers()?.clone();
        let indexes = headers
            .iter()
            .skip(1)
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let mut table = Self::new(workload, &indexes, &[]);
        for record in reader.records() {
            let record = record?;
            let task = record.get(0).context("Missing task column")?;
            if record.len() != indexes.len() + 1 {
                bail!(
                    "Row for {task} has {} cells, expected {}",
                    record.len(),
                    indexes.len() + 1
                );
            }
            if !table.tasks.iter().any(|t| t == task) {
                table.tasks.push(task.to_owned());
            }
            for (index, cell) in indexes.iter().zip(record.iter().skip(1)) {
                if cell.is_empty() {
                    continue;
                }
                let value = cell
                    .parse::<f64>()
                    .wrap_err_with(|| format!("Parse {index}/{task} value '{cell}'"))?;
                table.insert(index, task, value);
            }
        }
        Ok(table)
    }

    pub fn load(workload: &str, path: &Path) -> Result<Self> {
        let file =
            std::fs::File::open(path).wrap_err_with(|| format!("Open {}", path.display()))?;
        Self::read_csv(workload, file)
    }
}

/// Shortest round-trip form, integral values keep a trailing `.0`
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}
