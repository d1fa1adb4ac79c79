use thiserror::Error;

#[derive(Error, Debug)]
pub enum GramsError {
    #[error("Invalid polygon: {reason}")]
    InvalidPolygon { reason: String },

    #[error("Upstream {service} service unavailable: {message}")]
    UpstreamUnavailable {
        service: &'static str,
        message: String,
    },

    #[error("No usable input: all {attempted} frame(s) failed")]
    NoUsableInput { attempted: usize },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("HTTP client error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GramsError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        GramsError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn upstream(service: &'static str, message: impl ToString) -> Self {
        GramsError::UpstreamUnavailable {
            service,
            message: message.to_string(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GramsError::InvalidPolygon { .. } => ErrorSeverity::Low,
            GramsError::UpstreamUnavailable { .. } | GramsError::Api(_) => ErrorSeverity::Medium,
            GramsError::NoUsableInput { .. }
            | GramsError::InvalidInput { .. }
            | GramsError::Serialization(_)
            | GramsError::Csv(_) => ErrorSeverity::High,
            GramsError::Io(_)
            | GramsError::ConfigValidation { .. }
            | GramsError::InvalidConfigValue { .. }
            | GramsError::MissingConfig { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GramsError::NoUsableInput { attempted } => format!(
                "Could not analyze any of the {} submitted image(s)",
                attempted
            ),
            GramsError::UpstreamUnavailable { service, .. } => {
                format!("The {} service could not be reached", service)
            }
            GramsError::InvalidInput { message } => format!("Invalid input: {}", message),
            GramsError::InvalidPolygon { reason } => format!("Skipped a region: {}", reason),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GramsError::NoUsableInput { .. } | GramsError::UpstreamUnavailable { .. } => {
                "Check that the segmentation and modeling services are running and reachable"
            }
            GramsError::Api(_) => "Check network connectivity and upstream URLs",
            GramsError::InvalidInput { .. }
            | GramsError::InvalidPolygon { .. }
            | GramsError::Serialization(_) => "Check the input data format",
            GramsError::Io(_) | GramsError::Csv(_) => {
                "Check file paths and permissions"
            }
            GramsError::ConfigValidation { .. }
            | GramsError::InvalidConfigValue { .. }
            | GramsError::MissingConfig { .. } => "Fix the configuration file and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, GramsError>;
