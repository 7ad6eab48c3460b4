//! Batch PUE report
//!
//! The report is the PUE table printed to the terminal and the same table
//! saved as CSV with the columns `timestamp, it_power, total_power, PUE`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{dataset::Dataset, reading::timestamp};

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("failed to create report folder: {1:?}")]
    ReportPath(#[source] io::Error, PathBuf),
    #[error("failed to write the PUE results")]
    Csv(#[from] csv::Error),
    #[error("failed to flush the PUE results")]
    Io(#[from] io::Error),
}
type Result<T> = std::result::Result<T, ReportError>;

/// Columns of the PUE results CSV
pub const COLUMNS: [&str; 4] = ["timestamp", "it_power", "total_power", "PUE"];

/// A row of the PUE results CSV
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PueRecord {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub it_power: f64,
    pub total_power: f64,
    #[serde(rename = "PUE")]
    pub pue: f64,
}

/// Writes the PUE results of the dataset to a CSV file
///
/// Any existing file is overwritten and missing parent folders are created.
/// Returns the number of written rows.
pub fn write_results<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ReportError::ReportPath(e, parent.into()))?;
    }
    // the header is written even when there is no row to serialize
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(COLUMNS)?;
    for r in dataset {
        wtr.serialize(PueRecord {
            timestamp: r.timestamp,
            it_power: r.it_power,
            total_power: r.total_power,
            pue: r.pue(),
        })?;
    }
    wtr.flush()?;
    log::info!("{} PUE results written to {:?}", dataset.len(), path);
    Ok(dataset.len())
}

/// Reads back a PUE results CSV file
pub fn read_results<P: AsRef<Path>>(path: P) -> Result<Vec<PueRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    Ok(rdr
        .deserialize()
        .collect::<std::result::Result<Vec<PueRecord>, csv::Error>>()?)
}

/// Formats the PUE table
pub fn pue_table(dataset: &Dataset) -> String {
    let header = format!(
        "{:>4}  {:<19}  {:>10}  {:>12}  {:>8}",
        "", "timestamp", "it_power", "total_power", "PUE"
    );
    let rows = dataset.iter().enumerate().map(|(k, r)| {
        format!(
            "{:>4}  {:<19}  {:>10.3}  {:>12.3}  {:>8.6}",
            k,
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.it_power,
            r.total_power,
            r.pue()
        )
    });
    std::iter::once(header).chain(rows).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const READINGS: &str = "timestamp,it_power,total_power,outside_temp
2024-01-01 00:00:00,100,150,15
2024-01-01 01:00:00,120,240,28
2024-01-01 02:00:00,137.3,233.41,21.5
2024-01-01 03:00:00,110.7,220.5,31
";

    #[test]
    fn results_round_trip() {
        let dataset = Dataset::from_reader(READINGS.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("pue_results.csv");
        assert_eq!(write_results(&dataset, &path).unwrap(), 4);
        let records = read_results(&path).unwrap();
        assert_eq!(records.len(), dataset.len());
        for (record, reading) in records.iter().zip(dataset.iter()) {
            assert_eq!(record.timestamp, reading.timestamp);
            assert!((record.pue - reading.pue()).abs() < 1e-12);
            assert!((record.pue - record.total_power / record.it_power).abs() < 1e-12);
        }
    }

    #[test]
    fn results_header() {
        let dataset = Dataset::from_reader(READINGS.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pue_results.csv");
        fs::write(&path, "stale content\n").unwrap();
        write_results(&dataset, &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("timestamp,it_power,total_power,PUE"));
        assert_eq!(lines.next(), Some("2024-01-01 00:00:00,100.0,150.0,1.5"));
        assert!(!contents.contains("stale"));
    }

    #[test]
    fn empty_results_keep_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pue_results.csv");
        assert_eq!(write_results(&Dataset::default(), &path).unwrap(), 0);
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents.lines().collect::<Vec<_>>(),
            vec!["timestamp,it_power,total_power,PUE"]
        );
        assert!(read_results(&path).unwrap().is_empty());
    }

    #[test]
    fn table() {
        let dataset = Dataset::from_reader(READINGS.as_bytes()).unwrap();
        let table = pue_table(&dataset);
        assert_eq!(table.lines().count(), 5);
        assert!(table.lines().next().unwrap().contains("PUE"));
        assert!(table.contains("2024-01-01 01:00:00"));
        assert!(table.contains("2.000000"));
    }
}
