pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::{EstimatorConfig, ServiceConfig};
pub use core::{fuse_reports, Aggregator, DensityTable, FrameEstimationEngine};
pub use domain::model::{AggregateReport, FrameReport, SegmentationPayload};
pub use utils::error::{GramsError, Result};
