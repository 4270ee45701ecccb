// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::PathBuf;
use config::{Config, ConfigError, Environment, File};

/// Configuration for the archive packaging step
#[derive(Debug, Deserialize, Clone)]
pub struct PackageConfig {
    /// Serialized model weights file on local disk
    pub model_weights: PathBuf,
    /// Inference entry-point source file
    pub inference_source: PathBuf,
    /// Model definition source file
    pub model_source: PathBuf,
    /// Dependency manifest for the inference code
    pub requirements: PathBuf,
    /// Path where the finished archive is written
    pub output: PathBuf,
}

/// Configuration for the endpoint deployment step
#[derive(Debug, Deserialize, Clone)]
pub struct DeployConfig {
    /// S3 URI where the packaged archive has been uploaded
    pub model_data_url: String,
    /// IAM role ARN SageMaker assumes to fetch the archive and provision compute
    pub execution_role_arn: String,
    /// AWS region hosting the endpoint
    pub region: String,
    /// PyTorch version of the serving image (e.g. "2.5.1")
    pub framework_version: String,
    /// Python version tag of the serving image (e.g. "py311")
    pub py_version: String,
    /// Name registered for the SageMaker model
    pub model_name: String,
    /// Name of the endpoint to create
    pub endpoint_name: String,
    /// Hardware class of the hosting instances (e.g. "ml.g5.xlarge")
    pub instance_type: String,
    /// Number of hosting instances
    pub instance_count: i32,
    /// Seconds between DescribeEndpoint polls while waiting for the endpoint
    pub poll_interval_secs: u64,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log file directory
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Maps the configured level string onto a tracing level filter.
    pub fn max_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Archive packaging settings
    pub package: PackageConfig,
    /// Endpoint deployment settings
    pub deploy: DeployConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with MODELSHIP_
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn new() -> Result<Self, ConfigError> {
        // Check if current directory exists
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        // Check if config directory exists
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        // Check if default.toml exists
        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        // Create the local config path
        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        // Load and validate configuration
        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(Environment::with_prefix("MODELSHIP").separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;

        // Validate settings after loading
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        // The archive must end up somewhere nameable
        if self.package.output.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "package.output must not be empty".to_string()
            ));
        }

        // Validate the remote archive location
        if !self.deploy.model_data_url.starts_with("s3://") {
            return Err(ConfigError::Message(
                format!("model_data_url must be an s3:// URI, got: {}", self.deploy.model_data_url)
            ));
        }

        // Validate the execution role
        if !self.deploy.execution_role_arn.starts_with("arn:") {
            return Err(ConfigError::Message(
                format!("execution_role_arn must be an ARN, got: {}", self.deploy.execution_role_arn)
            ));
        }

        // Validate the serving image version pair
        if self.deploy.framework_version.is_empty() {
            return Err(ConfigError::Message(
                "framework_version must not be empty".to_string()
            ));
        }
        if !self.deploy.py_version.starts_with("py") {
            return Err(ConfigError::Message(
                format!("py_version must look like \"py311\", got: {}", self.deploy.py_version)
            ));
        }

        // Validate resource names
        if self.deploy.model_name.is_empty() || self.deploy.endpoint_name.is_empty() {
            return Err(ConfigError::Message(
                "model_name and endpoint_name must not be empty".to_string()
            ));
        }

        // Validate the hosting hardware request
        if !self.deploy.instance_type.starts_with("ml.") {
            return Err(ConfigError::Message(
                format!("instance_type must be an ml.* type, got: {}", self.deploy.instance_type)
            ));
        }
        if self.deploy.instance_count < 1 {
            return Err(ConfigError::Message(
                format!("instance_count must be at least 1, got: {}", self.deploy.instance_count)
            ));
        }

        // Validate the endpoint wait cadence
        if self.deploy.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "poll_interval_secs must be greater than 0".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log file directory if configured and doesn't exist
        if let Some(log_file) = &self.logging.file {
            if !log_file.exists() {
                std::fs::create_dir_all(log_file).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_file.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_settings() -> Settings {
        Settings {
            package: PackageConfig {
                model_weights: PathBuf::from("model_normalized/model.pth"),
                inference_source: PathBuf::from("inference.py"),
                model_source: PathBuf::from("models.py"),
                requirements: PathBuf::from("requirements.txt"),
                output: PathBuf::from("model.tar.gz"),
            },
            deploy: DeployConfig {
                model_data_url: "s3://meld-sentiment-analysis-saas/inference/model.tar.gz".to_string(),
                execution_role_arn: "arn:aws:iam::354918370928:role/sentiment-analysis-deploy-endpoint-role".to_string(),
                region: "us-east-1".to_string(),
                framework_version: "2.5.1".to_string(),
                py_version: "py311".to_string(),
                model_name: "sentiment-analysis-model".to_string(),
                endpoint_name: "sentiment-analysis-endpoint".to_string(),
                instance_type: "ml.g5.xlarge".to_string(),
                instance_count: 1,
                poll_interval_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }

    #[test]
    fn valid_settings_pass_validation() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn rejects_non_s3_model_data_url() {
        let mut settings = valid_settings();
        settings.deploy.model_data_url = "https://example.com/model.tar.gz".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_non_arn_role() {
        let mut settings = valid_settings();
        settings.deploy.execution_role_arn = "sentiment-analysis-deploy-endpoint-role".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_instances() {
        let mut settings = valid_settings();
        settings.deploy.instance_count = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_bare_python_version() {
        let mut settings = valid_settings();
        settings.deploy.py_version = "3.11".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn level_string_maps_to_tracing_level() {
        let mut logging = valid_settings().logging;
        assert_eq!(logging.max_level(), tracing::Level::INFO);
        logging.level = "debug".to_string();
        assert_eq!(logging.max_level(), tracing::Level::DEBUG);
    }
}
