use crate::config::estimator::EstimatorConfig;
use crate::core::density::DensityTable;
use crate::utils::error::{GramsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub estimator: EstimatorConfig,
    pub aggregate: AggregateConfig,
    pub density: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub model_port: u16,
    pub grams_port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            model_port: 3002,
            grams_port: 3003,
            max_upload_mb: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub segmentation_url: String,
    /// Remote modeling service. Empty or unset means estimate in-process.
    pub estimation_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            segmentation_url: "http://localhost:3001".to_string(),
            estimation_url: Some("http://localhost:3002".to_string()),
            timeout_seconds: 30,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn remote_estimation_url(&self) -> Option<&str> {
        self.estimation_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub max_images: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { max_images: 3 }
    }
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GramsError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GramsError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GramsError::ConfigValidation {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Builds the density table from `[density]`, or the built-in table when
    /// the section is absent.
    pub fn density_table(&self) -> Result<DensityTable> {
        match &self.density {
            Some(entries) => DensityTable::new(entries.clone()),
            None => Ok(DensityTable::builtin()),
        }
    }

    pub fn upload_limit_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number("server.max_upload_mb", self.server.max_upload_mb, 1)?;
        validate_url("upstream.segmentation_url", &self.upstream.segmentation_url)?;
        if let Some(url) = self.upstream.remote_estimation_url() {
            validate_url("upstream.estimation_url", url)?;
        }
        validate_positive_number(
            "upstream.timeout_seconds",
            self.upstream.timeout_seconds as usize,
            1,
        )?;
        validate_positive_number("aggregate.max_images", self.aggregate.max_images, 1)?;
        self.estimator.validate()?;
        self.density_table()?;
        Ok(())
    }
}
