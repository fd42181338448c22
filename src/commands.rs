//! Join commands.
//!
//! Ties the store, the merger and the scanner together. Console I/O stays
//! in `main`/`cli`; everything here takes its inputs as parameters.

use crate::config::Config;
use crate::error::Result;
use crate::merge::{derive_metric_name, merge, read_metric_source};
use crate::models::{AggregateDocument, MetricSummary};
use crate::scanner::scan_metric_files;
use crate::store::AggregateStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// One metric file; the suffix may be omitted.
    Single { file: String },
    /// Every metric file directly inside a directory.
    Folder { dir: PathBuf },
}

/// Options shared by both join modes.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// Suffix of metric files.
    pub extension: String,
    /// Folder mode: save after every file rather than once at the end.
    pub save_each: bool,
    /// Merge in memory only; never write the aggregate.
    pub dry_run: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            extension: crate::merge::DEFAULT_EXTENSION.to_string(),
            save_each: true,
            dry_run: false,
        }
    }
}

impl From<&Config> for JoinOptions {
    fn from(config: &Config) -> Self {
        Self {
            extension: config.merge.extension.clone(),
            save_each: config.merge.save_each,
            dry_run: false,
        }
    }
}

/// Outcome of a join run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Metric names joined, in processing order.
    pub joined: Vec<String>,
    /// Number of times the aggregate was written.
    pub saves: usize,
}

/// Run one join against the aggregate behind `store`.
///
/// The aggregate is bootstrapped first unless this is a dry run.
pub fn dispatch(
    target: &JoinTarget,
    store: &AggregateStore,
    options: &JoinOptions,
) -> Result<JoinSummary> {
    if !options.dry_run {
        store.ensure_exists()?;
    }

    match target {
        JoinTarget::Single { file } => join_single(store, file, options),
        JoinTarget::Folder { dir } => join_folder(store, dir, options),
    }
}

/// Join one metric file into the aggregate and save it.
pub fn join_single(
    store: &AggregateStore,
    file_spec: &str,
    options: &JoinOptions,
) -> Result<JoinSummary> {
    let path = resolve_metric_path(file_spec, &options.extension);
    let name = derive_metric_name(&path.to_string_lossy(), &options.extension)?;

    let mut document = load_for(store, options)?;
    let raw = read_metric_source(&path)?;
    merge(&mut document, &name, &raw)?;

    let mut summary = JoinSummary::default();
    if !options.dry_run {
        store.save(&document)?;
        summary.saves += 1;
    }

    acknowledge(&name, options.dry_run);
    summary.joined.push(name);
    Ok(summary)
}

/// Join every metric file of `dir` into the aggregate.
///
/// With `save_each` the aggregate is written after each file, so a failure
/// partway through leaves the earlier metrics persisted.
pub fn join_folder(
    store: &AggregateStore,
    dir: &Path,
    options: &JoinOptions,
) -> Result<JoinSummary> {
    let files = scan_metric_files(dir, &options.extension)?;
    info!(
        "Found {} metric file(s) in {}",
        files.len(),
        dir.display()
    );

    let mut document = load_for(store, options)?;
    let mut summary = JoinSummary::default();

    for file in &files {
        let name = derive_metric_name(&file.file_name, &options.extension)?;
        let raw = read_metric_source(&file.path)?;
        merge(&mut document, &name, &raw)?;

        if options.save_each && !options.dry_run {
            store.save(&document)?;
            summary.saves += 1;
        }

        acknowledge(&name, options.dry_run);
        summary.joined.push(name);
    }

    if !options.save_each && !options.dry_run && !summary.joined.is_empty() {
        store.save(&document)?;
        summary.saves += 1;
    }

    Ok(summary)
}

/// Names and entry counts of the metrics already in the aggregate.
pub fn list_metrics(store: &AggregateStore) -> Result<Vec<MetricSummary>> {
    Ok(store.load()?.summaries())
}

/// Append the metric suffix when the user typed the bare name.
fn resolve_metric_path(file_spec: &str, extension: &str) -> PathBuf {
    if file_spec.ends_with(extension) {
        PathBuf::from(file_spec)
    } else {
        PathBuf::from(format!("{}{}", file_spec, extension))
    }
}

/// Dry runs work against an empty aggregate when none exists yet.
fn load_for(store: &AggregateStore, options: &JoinOptions) -> Result<AggregateDocument> {
    if options.dry_run && !store.path().exists() {
        debug!("No aggregate at {}, dry run starts empty", store.path().display());
        return Ok(AggregateDocument::empty());
    }
    store.load()
}

fn acknowledge(name: &str, dry_run: bool) {
    if dry_run {
        println!("Metric {} would be joined", name);
    } else {
        println!("Metric {} joined", name);
    }
    info!("Joined metric '{}'", name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoinError;
    use serde_json::json;
    use tempfile::TempDir;

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_single_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let aggregate = temp_dir.path().join("data.json");
        std::fs::write(&aggregate, r#"{"metrics": {}}"#).unwrap();
        let source = temp_dir.path().join("stars.json");
        std::fs::write(&source, r#"{"repoA": 10, "repoB": 20}"#).unwrap();

        let store = AggregateStore::new(&aggregate);
        let target = JoinTarget::Single {
            file: source.to_string_lossy().to_string(),
        };
        let summary = dispatch(&target, &store, &JoinOptions::default()).unwrap();

        assert_eq!(summary.joined, vec!["stars"]);
        assert_eq!(summary.saves, 1);
        assert_eq!(
            read_json(&aggregate),
            json!({"metrics": {"stars": [
                {"name": "repoA", "value": 10},
                {"name": "repoB", "value": 20}
            ]}})
        );
    }

    #[test]
    fn test_single_file_without_suffix_bootstraps_aggregate() {
        let temp_dir = TempDir::new().unwrap();
        let aggregate = temp_dir.path().join("data.json");
        std::fs::write(temp_dir.path().join("forks.json"), r#"{"r": 3}"#).unwrap();

        let store = AggregateStore::new(&aggregate);
        let spec = temp_dir.path().join("forks").to_string_lossy().to_string();
        dispatch(&JoinTarget::Single { file: spec }, &store, &JoinOptions::default()).unwrap();

        assert_eq!(
            read_json(&aggregate),
            json!({"metrics": {"forks": [{"name": "r", "value": 3}]}})
        );
    }

    #[test]
    fn test_single_missing_source_leaves_aggregate_alone() {
        let temp_dir = TempDir::new().unwrap();
        let aggregate = temp_dir.path().join("data.json");
        let store = AggregateStore::new(&aggregate);

        let spec = temp_dir.path().join("absent.json").to_string_lossy().to_string();
        let err = dispatch(&JoinTarget::Single { file: spec }, &store, &JoinOptions::default())
            .unwrap_err();

        assert!(matches!(err, JoinError::NotFound { .. }));
        assert_eq!(read_json(&aggregate), json!({"metrics": {}}));
    }

    #[test]
    fn test_folder_processes_only_metric_files() {
        let temp_dir = TempDir::new().unwrap();
        let metrics = temp_dir.path().join("metrics");
        std::fs::create_dir(&metrics).unwrap();
        std::fs::write(metrics.join("a.json"), r#"{"x": 1}"#).unwrap();
        std::fs::write(metrics.join("b.json"), r#"{"y": 2}"#).unwrap();
        std::fs::write(metrics.join("readme.txt"), "ignore me").unwrap();
        std::fs::create_dir(metrics.join("subdir")).unwrap();

        let store = AggregateStore::new(temp_dir.path().join("data.json"));
        let summary = dispatch(
            &JoinTarget::Folder { dir: metrics },
            &store,
            &JoinOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.joined, vec!["a", "b"]);
        assert_eq!(summary.saves, 2);
        assert_eq!(store.load().unwrap().metric_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_folder_save_once() {
        let temp_dir = TempDir::new().unwrap();
        let metrics = temp_dir.path().join("metrics");
        std::fs::create_dir(&metrics).unwrap();
        std::fs::write(metrics.join("a.json"), r#"{"x": 1}"#).unwrap();
        std::fs::write(metrics.join("b.json"), r#"{"y": 2}"#).unwrap();

        let store = AggregateStore::new(temp_dir.path().join("data.json"));
        let options = JoinOptions {
            save_each: false,
            ..JoinOptions::default()
        };
        let summary = dispatch(&JoinTarget::Folder { dir: metrics }, &store, &options).unwrap();

        assert_eq!(summary.saves, 1);
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_folder_failure_keeps_earlier_saves() {
        let temp_dir = TempDir::new().unwrap();
        let metrics = temp_dir.path().join("metrics");
        std::fs::create_dir(&metrics).unwrap();
        std::fs::write(metrics.join("a.json"), r#"{"x": 1}"#).unwrap();
        std::fs::write(metrics.join("b.json"), "[1, 2]").unwrap();

        let store = AggregateStore::new(temp_dir.path().join("data.json"));
        let err = dispatch(
            &JoinTarget::Folder { dir: metrics },
            &store,
            &JoinOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, JoinError::InvalidInput(_)));
        assert_eq!(store.load().unwrap().metric_names(), vec!["a"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_folder_joins_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let metrics = temp_dir.path().join("metrics");
        std::fs::create_dir(&metrics).unwrap();
        std::fs::write(metrics.join("a.json"), r#"{"x": 1}"#).unwrap();
        std::fs::write(metrics.join(OsStr::from_bytes(b"b\xff.json")), r#"{"y": 2}"#).unwrap();

        let store = AggregateStore::new(temp_dir.path().join("data.json"));
        let summary = dispatch(
            &JoinTarget::Folder { dir: metrics },
            &store,
            &JoinOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.joined, vec!["a", "b\u{FFFD}"]);
        let doc = store.load().unwrap();
        assert_eq!(doc.metric("b\u{FFFD}").unwrap()[0].value, json!(2));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let aggregate = temp_dir.path().join("data.json");
        let source = temp_dir.path().join("stars.json");
        std::fs::write(&source, r#"{"repoA": 10}"#).unwrap();

        let store = AggregateStore::new(&aggregate);
        let options = JoinOptions {
            dry_run: true,
            ..JoinOptions::default()
        };
        let target = JoinTarget::Single {
            file: source.to_string_lossy().to_string(),
        };
        let summary = dispatch(&target, &store, &options).unwrap();

        assert_eq!(summary.joined, vec!["stars"]);
        assert_eq!(summary.saves, 0);
        assert!(!aggregate.exists());
    }

    #[test]
    fn test_rejoin_replaces_metric() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("stars.json");
        let store = AggregateStore::new(temp_dir.path().join("data.json"));
        let target = JoinTarget::Single {
            file: source.to_string_lossy().to_string(),
        };

        std::fs::write(&source, r#"{"repoA": 1, "repoB": 2}"#).unwrap();
        dispatch(&target, &store, &JoinOptions::default()).unwrap();
        std::fs::write(&source, r#"{"repoC": 3}"#).unwrap();
        dispatch(&target, &store, &JoinOptions::default()).unwrap();

        let doc = store.load().unwrap();
        let entries = doc.metric("stars").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "repoC");
    }

    #[test]
    fn test_list_metrics() {
        let temp_dir = TempDir::new().unwrap();
        let aggregate = temp_dir.path().join("data.json");
        std::fs::write(
            &aggregate,
            r#"{"metrics": {"stars": [{"name": "a", "value": 1}], "empty": []}}"#,
        )
        .unwrap();

        let summaries = list_metrics(&AggregateStore::new(&aggregate)).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "stars");
        assert_eq!(summaries[0].entries, 1);
        assert_eq!(summaries[1].name, "empty");
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.merge.save_each = false;
        config.merge.extension = ".metric".to_string();

        let options = JoinOptions::from(&config);
        assert!(!options.save_each);
        assert_eq!(options.extension, ".metric");
        assert!(!options.dry_run);
    }
}
