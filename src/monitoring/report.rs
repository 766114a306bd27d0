use serde::Serialize;
use std::error::Error;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use crate::shared_data::{PerformanceSample, SimulationSnapshot};

/// One row of the end-of-run summary export.
#[derive(Debug, Serialize)]
pub struct SummaryRecord {
    pub status: String,
    pub uptime_ms: u64,
    pub total_vehicles: u64,
    pub processed_cars: u64,
    pub average_wait_secs: f64,
    pub efficiency: f64,
    pub throughput: u64,
    pub weather: String,
    pub congestion: String,
}

impl From<&SimulationSnapshot> for SummaryRecord {
    fn from(snapshot: &SimulationSnapshot) -> Self {
        Self {
            status: snapshot.status.to_string(),
            uptime_ms: snapshot.uptime_ms,
            total_vehicles: snapshot.metrics.total_vehicles,
            processed_cars: snapshot.metrics.processed_cars,
            average_wait_secs: snapshot.metrics.average_wait_secs,
            efficiency: snapshot.metrics.efficiency,
            throughput: snapshot.metrics.throughput,
            weather: snapshot.weather_impact.clone(),
            congestion: snapshot.congestion.to_string(),
        }
    }
}

/// Writes the performance history as CSV, header first.
pub fn write_history<W: io::Write>(writer: W, samples: &[PerformanceSample]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in samples {
        wtr.serialize(sample)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Appends records to a CSV file, writing the header only when the file is new.
fn append_to_csv<T: Serialize>(filename: &Path, records: &[T]) -> Result<(), Box<dyn Error>> {
    let file_exists = filename.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(filename)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_history(path: impl AsRef<Path>, samples: &[PerformanceSample]) -> Result<(), Box<dyn Error>> {
    append_to_csv(path.as_ref(), samples)
}

pub fn export_summary(path: impl AsRef<Path>, snapshot: &SimulationSnapshot) -> Result<(), Box<dyn Error>> {
    append_to_csv(path.as_ref(), &[SummaryRecord::from(snapshot)])
}
