#[cfg(feature = "cli")]
pub mod cli;
pub mod estimator;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use estimator::{DiameterMethod, EstimatorConfig, VolumeMethod};
pub use toml_config::{AggregateConfig, ServerConfig, ServiceConfig, UpstreamConfig};
