use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use crate::config::DeployConfig;

/// Account hosting the public deep learning container registry in the
/// standard commercial regions.
const DLC_ACCOUNT: &str = "763104351884";

/// Traffic variant name used for the single-variant endpoint config.
const VARIANT_NAME: &str = "AllTraffic";

/// Errors that can occur while provisioning the endpoint
#[derive(Debug)]
pub enum DeployError {
    /// The deployment configuration could not be resolved into a plan
    InvalidPlan(String),
    /// A SageMaker API call failed
    Api(String),
    /// The endpoint reached Failed status; carries the service's reason
    EndpointFailed(String),
    /// DescribeEndpoint returned no status for the endpoint
    MissingStatus,
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::InvalidPlan(msg) => write!(f, "invalid deployment plan: {}", msg),
            DeployError::Api(msg) => write!(f, "SageMaker API error: {}", msg),
            DeployError::EndpointFailed(reason) => {
                write!(f, "endpoint creation failed: {}", reason)
            }
            DeployError::MissingStatus => {
                write!(f, "DescribeEndpoint returned no endpoint status")
            }
        }
    }
}

impl Error for DeployError {}

/// The fully-resolved provisioning request.
///
/// Built purely from configuration, so the same settings always produce the
/// same request: archive location, role, serving image, container
/// environment, hardware, and resource names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    /// Name registered for the SageMaker model
    pub model_name: String,
    /// Name of the endpoint to create
    pub endpoint_name: String,
    /// Name of the endpoint configuration backing the endpoint
    pub endpoint_config_name: String,
    /// S3 URI of the packaged archive
    pub model_data_url: String,
    /// IAM role ARN the service assumes
    pub execution_role_arn: String,
    /// Serving container image URI
    pub image_uri: String,
    /// Container environment pinning the entry point inside the archive
    pub environment: BTreeMap<String, String>,
    /// Hardware class of the hosting instances
    pub instance_type: String,
    /// Number of hosting instances
    pub instance_count: i32,
    /// Traffic variant name
    pub variant_name: String,
}

impl DeployPlan {
    /// Resolves the deployment configuration into a provisioning plan.
    ///
    /// # Arguments
    ///
    /// * `config` - The deployment settings
    ///
    /// # Returns
    ///
    /// A Result containing the plan or an error
    pub fn from_settings(config: &DeployConfig) -> Result<Self, DeployError> {
        let image_uri = serving_image_uri(
            &config.region,
            &config.framework_version,
            &config.py_version,
            &config.instance_type,
        )?;

        // The archive carries its own entry point under code/, so the
        // serving container is told where to find it instead of receiving
        // a separate source bundle
        let mut environment = BTreeMap::new();
        environment.insert("SAGEMAKER_PROGRAM".to_string(), "inference.py".to_string());
        environment.insert(
            "SAGEMAKER_SUBMIT_DIRECTORY".to_string(),
            "/opt/ml/model/code".to_string(),
        );
        environment.insert(
            "SAGEMAKER_CONTAINER_LOG_LEVEL".to_string(),
            "20".to_string(),
        );
        environment.insert("SAGEMAKER_REGION".to_string(), config.region.clone());

        Ok(Self {
            model_name: config.model_name.clone(),
            endpoint_name: config.endpoint_name.clone(),
            endpoint_config_name: format!("{}-config", config.endpoint_name),
            model_data_url: config.model_data_url.clone(),
            execution_role_arn: config.execution_role_arn.clone(),
            image_uri,
            environment,
            instance_type: config.instance_type.clone(),
            instance_count: config.instance_count,
            variant_name: VARIANT_NAME.to_string(),
        })
    }
}

/// Resolves the serving container image for a framework/Python pair.
///
/// The compute class follows the instance family: accelerated families
/// (`ml.g*`, `ml.p*`) get the GPU image, everything else the CPU image.
fn serving_image_uri(
    region: &str,
    framework_version: &str,
    py_version: &str,
    instance_type: &str,
) -> Result<String, DeployError> {
    let family = instance_type.strip_prefix("ml.").ok_or_else(|| {
        DeployError::InvalidPlan(format!(
            "instance_type must be an ml.* type, got: {}",
            instance_type
        ))
    })?;

    let device = if family.starts_with('g') || family.starts_with('p') {
        "gpu"
    } else {
        "cpu"
    };

    Ok(format!(
        "{}.dkr.ecr.{}.amazonaws.com/pytorch-inference:{}-{}-{}",
        DLC_ACCOUNT, region, framework_version, device, py_version
    ))
}
