use std::path::PathBuf;

use clap::Parser;
use common::{
    config::Config,
    report::{self, RunOptions},
};
use eyre::Result;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Averages index sizes from the mixed workload results and plots them
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Yaml file overriding the built-in tasks, indexes and paths
    #[arg(short, long)]
    config_file: Option<PathBuf>,
    /// Do not generate the figure
    #[arg(long, default_value_t = false)]
    skip_plot: bool,
    /// Save the figure without opening a window
    #[arg(long, default_value_t = false)]
    no_show: bool,
    #[arg(short, long)]
    log: Vec<String>,
}

fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("info".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("index_size_report={log_level}"))
        .add_directive(format!("report_common={log_level}").parse()?);
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    let config = match &args.config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let options = RunOptions {
        plot: !args.skip_plot,
        show: !args.no_show,
    };

    match report::run(&config, options) {
        Ok(report) => {
            for path in &report.csv_paths {
                info!("Saved {}", path.display());
            }
            Ok(())
        }
        Err(err) => {
            error!("{err:#?}");
            Err(err)
        }
    }
}
