pub mod aggregate;
pub mod calibration;
pub mod density;
pub mod engine;
pub mod estimator;
pub mod volume;

pub use aggregate::{fuse_reports, Aggregator};
pub use calibration::calibrate;
pub use density::DensityTable;
pub use engine::FrameEstimationEngine;
pub use estimator::{Estimation, SkipReason, VolumetricEstimator};
