use crate::app::output::OutputFormat;
use crate::config::toml_config::ServiceConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "grams")]
#[command(about = "Estimate food weight and calories from segmented meal photos")]
pub struct CliConfig {
    #[arg(long, global = true, env = "GRAMS_CONFIG", help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the single-frame modeling API (POST /model)
    ServeModel {
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Serve the multi-image grams API (POST /calculate)
    ServeGrams {
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        #[arg(long, env = "SEGMENTATION_SERVICE_URL")]
        segmentation_url: Option<String>,

        #[arg(long, env = "AUTO_MODELING_SERVICE_URL")]
        estimation_url: Option<String>,

        #[arg(long, help = "Estimate frames in-process instead of calling a modeling service")]
        local_estimation: bool,
    },
    /// Estimate one saved segmentation payload
    Estimate {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fuse saved per-frame reports into one
    Fuse {
        #[arg(long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl CliConfig {
    /// File config when `--config` is given, defaults otherwise.
    pub fn load_service_config(&self) -> Result<ServiceConfig> {
        match &self.config {
            Some(path) => ServiceConfig::from_file(path),
            None => Ok(ServiceConfig::default()),
        }
    }
}
