use std::{fs, path::Path};

use report_common::{
    aggregate::AggregateTable,
    config::Config,
    report::{RunOptions, run},
};
use tempfile::TempDir;

const NO_PLOT: RunOptions = RunOptions {
    plot: false,
    show: false,
};

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.results_dir = dir.join("results");
    config.output.figure = dir.join("benchmark_results_index_size.png");
    config.output.analysis_dir = dir.join("analysis_results");
    config
}

fn write_results(config: &Config, task: &str, workload: usize, body: &str) {
    let path = config.results_path(task, &config.workloads[workload]);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!("index_name,search_method,value,index_size_bytes,mixed_throughput_mops1\n{body}"),
    )
    .unwrap();
}

fn fixture() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_results(
        &config,
        "fb",
        0,
        "BTree,BranchingBinarySearch,16,1000,1.2\n\
         BTree,LinearSearch,32,2000,1.1\n\
         LIPP,,0,500,3.4\n",
    );
    write_results(
        &config,
        "fb",
        1,
        "DynamicPGM,BranchingBinarySearch,64,4096,0.9\n\
         HybridPGMLIPP,,0,8192,1.0\n\
         HybridPGMLIPP,,0,,1.0\n",
    );
    (dir, config)
}

#[test]
fn aggregates_mean_and_omits_absent_indexes() {
    let (_dir, config) = fixture();
    let report = run(&config, NO_PLOT).unwrap();

    let mix1 = &report.aggregates[0];
    assert_eq!(mix1.workload, "mix1");
    assert_eq!(mix1.get("BTree", "fb"), Some(1500.0));
    assert_eq!(mix1.get("LIPP", "fb"), Some(500.0));
    assert_eq!(mix1.get("DynamicPGM", "fb"), None);
    assert_eq!(mix1.get("HybridPGMLIPP", "fb"), None);

    let mix2 = &report.aggregates[1];
    assert_eq!(mix2.get("DynamicPGM", "fb"), Some(4096.0));
    assert_eq!(mix2.get("HybridPGMLIPP", "fb"), Some(8192.0));
    assert_eq!(mix2.get("BTree", "fb"), None);

    let panel = report.figure.panels[2].as_ref().unwrap();
    assert_eq!(panel.series[0].heights, vec![1500.0, 0.0, 500.0, 0.0]);
}

#[test]
fn writes_analysis_csvs() {
    let (dir, config) = fixture();
    let report = run(&config, NO_PLOT).unwrap();

    let analysis = dir.path().join("analysis_results");
    assert_eq!(
        report.csv_paths,
        vec![
            analysis.join("insertlookup_mix1_index_size.csv"),
            analysis.join("insertlookup_mix2_index_size.csv"),
        ]
    );
    assert_eq!(
        fs::read_to_string(&report.csv_paths[0]).unwrap(),
        ",BTree,DynamicPGM,LIPP,HybridPGMLIPP\nfb,1500.0,,500.0,\n"
    );

    for (path, aggregate) in report.csv_paths.iter().zip(&report.aggregates) {
        let back = AggregateTable::load(&aggregate.workload, path).unwrap();
        assert_eq!(&back, aggregate);
    }
}

#[test]
fn rerun_is_byte_identical() {
    let (_dir, config) = fixture();
    let first = run(&config, NO_PLOT).unwrap();
    let before = first
        .csv_paths
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect::<Vec<_>>();

    let second = run(&config, NO_PLOT).unwrap();
    let after = second
        .csv_paths
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(before, after);
}

#[test]
fn missing_results_file_fails_run() {
    let (_dir, mut config) = fixture();
    config.tasks.push("osmc".to_owned());
    let err = run(&config, NO_PLOT).unwrap_err();
    assert!(format!("{err:#}").contains("osmc_100M_public_uint64"));
    assert!(!config.analysis_path(&config.workloads[0]).exists());
}

#[test]
fn missing_size_column_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    for workload in 0..2 {
        let path = config.results_path("fb", &config.workloads[workload]);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "index_name,size\nBTree,1000\n").unwrap();
    }
    let err = run(&config, NO_PLOT).unwrap_err();
    assert!(format!("{err:#}").contains("index_size_bytes"));
}

#[test]
fn several_tasks_share_columns() {
    let (_dir, mut config) = fixture();
    config.tasks.push("books".to_owned());
    write_results(&config, "books", 0, "LIPP,,0,700,2.0\n");
    write_results(&config, "books", 1, "");
    let report = run(&config, NO_PLOT).unwrap();

    assert_eq!(report.aggregates[0].get("LIPP", "books"), Some(700.0));
    assert!(report.aggregates[1].get("LIPP", "books").is_none());
    assert_eq!(
        fs::read_to_string(&report.csv_paths[0]).unwrap(),
        ",BTree,DynamicPGM,LIPP,HybridPGMLIPP\nfb,1500.0,,500.0,\nbooks,,,700.0,\n"
    );
    // books has nothing under mix2, so it gets no row there
    assert_eq!(
        fs::read_to_string(&report.csv_paths[1]).unwrap(),
        ",BTree,DynamicPGM,LIPP,HybridPGMLIPP\nfb,,4096.0,,8192.0\n"
    );
}
