use crate::domain::model::{AggregateReport, FrameReport};
use crate::utils::error::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Serialize)]
pub struct CsvRow<'a> {
    food: &'a str,
    weight: f64,
    volume_cm3: f64,
    calories: u64,
}

pub trait Report: Serialize {
    fn rows(&self) -> Vec<CsvRow<'_>>;
}

impl Report for FrameReport {
    fn rows(&self) -> Vec<CsvRow<'_>> {
        self.results
            .iter()
            .map(|r| CsvRow {
                food: &r.food,
                weight: r.weight_g,
                volume_cm3: r.volume_cm3,
                calories: r.calories,
            })
            .collect()
    }
}

impl Report for AggregateReport {
    fn rows(&self) -> Vec<CsvRow<'_>> {
        self.results
            .iter()
            .map(|r| CsvRow {
                food: &r.food,
                weight: r.weight_g,
                volume_cm3: r.volume_cm3,
                calories: r.calories,
            })
            .collect()
    }
}

pub fn render<R: Report>(report: &R, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            let rows = report.rows();
            if rows.is_empty() {
                writer.write_record(["food", "weight", "volume_cm3", "calories"])?;
            }
            for row in rows {
                writer.serialize(row)?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Writes to `path`, or stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
