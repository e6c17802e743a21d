//! CSV export and import of trajectory records.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ExportError;
use crate::models::TrajectoryRecord;
use crate::spatial::haversine_nm;

/// Column order of exported trajectories.
pub const CSV_HEADER: [&str; 9] = [
    "timestamp",
    "vessel_name",
    "voyage_phase",
    "latitude",
    "longitude",
    "speed_knots",
    "course_deg",
    "heading_deg",
    "nav_status",
];

/// Write `records` with a header row. Missing course/heading become empty cells.
pub fn write_trajectory_csv<W: io::Write>(
    writer: W,
    records: &[TrajectoryRecord],
) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_trajectory_csv<R: io::Read>(reader: R) -> Result<Vec<TrajectoryRecord>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

pub fn save_trajectory_csv(
    path: impl AsRef<Path>,
    records: &[TrajectoryRecord],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_trajectory_csv(file, records)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn load_trajectory_csv(path: impl AsRef<Path>) -> Result<Vec<TrajectoryRecord>, ExportError> {
    read_trajectory_csv(File::open(path)?)
}

/// Aggregate view of an exported trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub records: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    /// Great-circle distance along consecutive record positions.
    pub distance_nm: f64,
    pub min_speed_knots: f64,
    pub max_speed_knots: f64,
    pub mean_speed_knots: f64,
    pub phases: BTreeMap<String, usize>,
}

impl TrajectorySummary {
    pub fn from_records(records: &[TrajectoryRecord]) -> Self {
        let distance_nm = records
            .windows(2)
            .map(|pair| haversine_nm(pair[0].position(), pair[1].position()))
            .sum();

        let mut phases = BTreeMap::new();
        for record in records {
            *phases.entry(record.phase.clone()).or_insert(0) += 1;
        }

        let (min_speed_knots, max_speed_knots, mean_speed_knots) = if records.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let speeds = records.iter().map(|r| r.speed_knots);
            (
                speeds.clone().fold(f64::INFINITY, f64::min),
                speeds.clone().fold(f64::NEG_INFINITY, f64::max),
                speeds.sum::<f64>() / records.len() as f64,
            )
        };

        Self {
            records: records.len(),
            first_timestamp: records.first().map(|r| r.timestamp),
            last_timestamp: records.last().map(|r| r.timestamp),
            distance_nm,
            min_speed_knots,
            max_speed_knots,
            mean_speed_knots,
            phases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NavStatus;
    use chrono::{Duration, TimeZone};

    fn record(minute: i64, lat: f64, speed: f64, phase: &str, status: NavStatus) -> TrajectoryRecord {
        TrajectoryRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap() + Duration::minutes(minute),
            vessel: "OSV_SIM".to_string(),
            phase: phase.to_string(),
            latitude: lat,
            longitude: 72.0,
            speed_knots: speed,
            course_deg: Some(0.0),
            heading_deg: Some(0.0),
            nav_status: status,
        }
    }

    #[test]
    fn header_and_row_layout() {
        let mut stationary = record(0, 19.0, 0.12, "On Site / Stationary", NavStatus::DynamicPositioning);
        stationary.course_deg = None;
        let mut buffer = Vec::new();
        write_trajectory_csv(&mut buffer, &[stationary]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("2025-01-01T06:00:00Z,OSV_SIM,On Site / Stationary,19.0,72.0,0.12,,0.0,Dynamic Positioning")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_reads_back_what_it_wrote() {
        let mut records = vec![
            record(0, 19.0, 10.0, "Transit", NavStatus::Underway),
            record(1, 19.1, 10.0, "Transit", NavStatus::Underway),
        ];
        records[1].heading_deg = None;
        let mut buffer = Vec::new();
        write_trajectory_csv(&mut buffer, &records).unwrap();
        let parsed = read_trajectory_csv(buffer.as_slice()).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn malformed_row_is_an_error() {
        let text = format!("{}\nnot-a-time,OSV_SIM,Transit,1,2,3,,,Underway\n", CSV_HEADER.join(","));
        assert!(matches!(
            read_trajectory_csv(text.as_bytes()),
            Err(ExportError::Csv(_))
        ));
    }

    #[test]
    fn summary_counts_phases_and_speeds() {
        let records = vec![
            record(0, 19.0, 10.0, "Outbound Transit", NavStatus::Underway),
            record(1, 19.1, 10.0, "Outbound Transit", NavStatus::Underway),
            record(2, 19.1, 0.2, "On Site / Stationary", NavStatus::DynamicPositioning),
            record(3, 19.1, 4.0, "On Site / Patrolling", NavStatus::Underway),
        ];
        let summary = TrajectorySummary::from_records(&records);
        assert_eq!(summary.records, 4);
        assert_eq!(summary.phases["Outbound Transit"], 2);
        assert_eq!(summary.phases["On Site / Stationary"], 1);
        assert_eq!(summary.min_speed_knots, 0.2);
        assert_eq!(summary.max_speed_knots, 10.0);
        assert!((summary.mean_speed_knots - 6.05).abs() < 1e-9);
        assert!((summary.distance_nm - 6.0).abs() < 0.05);
        assert_eq!(
            summary.last_timestamp.unwrap() - summary.first_timestamp.unwrap(),
            Duration::minutes(3)
        );
    }

    #[test]
    fn empty_summary() {
        let summary = TrajectorySummary::from_records(&[]);
        assert_eq!(summary.records, 0);
        assert!(summary.first_timestamp.is_none());
        assert_eq!(summary.distance_nm, 0.0);
    }
}
