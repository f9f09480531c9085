use std::fs;
use std::path::PathBuf;

use datachat_engine::prompt::chat_request;
use datachat_engine::{
    column_distribution, column_stats, ColumnChart, ColumnStats, CsvDatasetProvider,
    DatasetError, DatasetProvider, InferenceSettings, SnapshotMode,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CSV: &str = "name,age,city\nAda,36,London\nAlan,41,Wilmslow\nGrace,85,New York\n";

fn write_csv(temp: &TempDir, contents: &str) -> PathBuf {
    let path = temp.path().join("input.csv");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn rows_snapshot_keeps_header_order() {
    let temp = TempDir::new().unwrap();
    let path = write_csv(&temp, CSV);

    let snapshot = CsvDatasetProvider::new(&path, SnapshotMode::Rows)
        .load()
        .unwrap();

    assert_eq!(snapshot.columns(), &["name", "age", "city"]);
    assert_eq!(snapshot.row_count(), 3);
    let rows: serde_json::Value = serde_json::from_str(snapshot.as_context()).unwrap();
    assert_eq!(rows[1]["name"], "Alan");
    assert_eq!(rows[2]["city"], "New York");

    let first_row = snapshot.as_context().find("\"name\"").unwrap();
    let first_age = snapshot.as_context().find("\"age\"").unwrap();
    assert!(first_row < first_age);
}

#[test]
fn summary_snapshot_lists_columns_samples_and_stats() {
    let temp = TempDir::new().unwrap();
    let path = write_csv(&temp, CSV);

    let snapshot = CsvDatasetProvider::new(&path, SnapshotMode::Summary)
        .load()
        .unwrap();
    let text = snapshot.as_context();

    assert!(text.starts_with("CSV Columns: name, age, city\n\nSample Rows: "));
    assert!(text.contains("Column Statistics: "));
    assert!(text.contains("\"mean\": \"54.00\""));
    assert!(text.contains("\"uniqueValues\": 3"));
}

#[test]
fn missing_file_is_unavailable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.csv");

    let err = CsvDatasetProvider::new(&path, SnapshotMode::Rows)
        .load()
        .unwrap_err();
    let DatasetError::Unavailable { path: reported, .. } = err;
    assert_eq!(reported, path);
}

#[test]
fn empty_file_is_unavailable() {
    let temp = TempDir::new().unwrap();
    let path = write_csv(&temp, "");

    assert!(CsvDatasetProvider::new(&path, SnapshotMode::Summary)
        .load()
        .is_err());
}

#[test]
fn numeric_stats_use_population_stddev_and_upper_median() {
    let stats = column_stats(&["2", "4", "4", "4", "5", "5", "7", "9"]);
    assert_eq!(
        stats,
        ColumnStats::Numeric {
            mean: 5.0,
            median: 5.0,
            stddev: 2.0,
        }
    );
}

#[test]
fn text_columns_count_unique_values() {
    let stats = column_stats(&["red", "blue", "red", ""]);
    assert_eq!(stats, ColumnStats::Categorical { unique_values: 3 });
}

fn bars(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
    pairs.iter().map(|(label, count)| (label.to_string(), *count)).collect()
}

#[test]
fn numeric_columns_bucket_into_ranges_of_ten() {
    let distribution = column_distribution(&["36", "41", "85", "39.5", "-3", "0"]);
    assert_eq!(
        distribution,
        bars(&[("-10--1", 1), ("0-9", 1), ("30-39", 2), ("40-49", 1), ("80-89", 1)])
    );
}

#[test]
fn categorical_columns_keep_two_leaders_and_sum_the_rest() {
    let distribution =
        column_distribution(&["red", "blue", "red", "green", "blue", "red", "teal", "7"]);
    assert_eq!(distribution, bars(&[("red", 3), ("blue", 2), ("Other", 3)]));

    // Ties keep first-appearance order; two categories need no "Other".
    assert_eq!(
        column_distribution(&["b", "a", "a", "b"]),
        bars(&[("b", 2), ("a", 2)])
    );
    assert!(column_distribution(&[]).is_empty());
}

#[test]
fn distributions_chart_every_column_in_header_order() {
    let temp = TempDir::new().unwrap();
    let path = write_csv(&temp, CSV);
    let charts = CsvDatasetProvider::new(path, SnapshotMode::Rows)
        .distributions()
        .unwrap();

    assert_eq!(
        charts,
        vec![
            ColumnChart {
                column: "name".to_string(),
                bars: bars(&[("Ada", 1), ("Alan", 1), ("Other", 1)]),
            },
            ColumnChart {
                column: "age".to_string(),
                bars: bars(&[("30-39", 1), ("40-49", 1), ("80-89", 1)]),
            },
            ColumnChart {
                column: "city".to_string(),
                bars: bars(&[("London", 1), ("Wilmslow", 1), ("Other", 1)]),
            },
        ]
    );
}

#[test]
fn chat_request_embeds_snapshot_and_question() {
    let temp = TempDir::new().unwrap();
    let path = write_csv(&temp, CSV);
    let snapshot = CsvDatasetProvider::new(&path, SnapshotMode::Rows)
        .load()
        .unwrap();
    let options = InferenceSettings::default().options();

    let request = chat_request(&snapshot, "who is oldest?", &options);

    let system = request.system_context.unwrap();
    assert!(system.starts_with("I will now be asking you questions regarding this CSV:\n\n"));
    assert!(system.contains("Grace"));
    assert!(request.user_text.ends_with("who is oldest?"));
    assert_eq!(request.options.max_tokens, 800);
}
