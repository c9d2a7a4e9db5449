use std::{path::Path, process::Command};

use eyre::{Context, Result, bail};
use itertools::Itertools;
use tracing::debug;

/// Runs a plotting script with `--flag value` pairs and waits for it
pub fn plot_python(python: &str, script: &Path, args: &[(&str, &str)]) -> Result<()> {
    let flat = args
        .iter()
        .flat_map(|(flag, value)| [*flag, *value])
        .collect::<Vec<_>>();
    debug!("{python} {} {}", script.display(), flat.iter().join(" "));
    let status = Command::new(python)
        .arg(script)
        .args(&flat)
        .status()
        .wrap_err_with(|| format!("Spawn {python} {}", script.display()))?;
    if !status.success() {
        bail!("Plot script {} failed with {status}", script.display());
    }
    Ok(())
}
