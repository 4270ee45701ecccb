use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_sagemaker::types::{
    ContainerDefinition, EndpointStatus, ProductionVariant, ProductionVariantInstanceType,
};
use aws_sdk_sagemaker::Client;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use super::types::{DeployError, DeployPlan};
use crate::config::DeployConfig;

/// Provisions a SageMaker inference endpoint from a packaged model archive.
///
/// The deployer holds the resolved plan and a service client; `run` performs
/// the full provisioning sequence and blocks until the endpoint reports a
/// terminal status.
pub struct EndpointDeployer {
    /// SageMaker service client
    client: Client,
    /// Resolved provisioning request
    plan: DeployPlan,
    /// Delay between DescribeEndpoint polls
    poll_interval: Duration,
}

impl EndpointDeployer {
    /// Creates a deployer with credentials from the default AWS provider
    /// chain and the region fixed in configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The deployment settings
    ///
    /// # Returns
    ///
    /// A Result containing the deployer or an error
    pub async fn new(config: &DeployConfig) -> Result<Self, DeployError> {
        let plan = DeployPlan::from_settings(config)?;

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        let client = Client::new(&aws_config);

        Ok(Self {
            client,
            plan,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        })
    }

    /// Runs the full provisioning sequence and blocks until the endpoint is
    /// in service.
    ///
    /// Any service failure aborts the run as-is. There is no retry and no
    /// rollback; a half-provisioned endpoint is left for manual cleanup,
    /// and re-running against an existing endpoint name surfaces the
    /// service's own rejection.
    pub async fn run(&self) -> Result<(), DeployError> {
        println!(
            "Deploying {} from {}",
            self.plan.model_name, self.plan.model_data_url
        );

        self.create_model().await?;
        self.create_endpoint_config().await?;
        self.create_endpoint().await?;
        self.wait_until_ready().await?;

        println!(
            "{}",
            format!("✓ Endpoint deployed: {}", self.plan.endpoint_name).green()
        );
        Ok(())
    }

    /// Registers the model: serving image, archive location, and the role
    /// the service assumes to fetch both.
    async fn create_model(&self) -> Result<(), DeployError> {
        let container = ContainerDefinition::builder()
            .image(&self.plan.image_uri)
            .model_data_url(&self.plan.model_data_url)
            .set_environment(Some(
                self.plan
                    .environment
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ))
            .build();

        self.client
            .create_model()
            .model_name(&self.plan.model_name)
            .execution_role_arn(&self.plan.execution_role_arn)
            .primary_container(container)
            .send()
            .await
            .map_err(|e| DeployError::Api(e.to_string()))?;

        info!(model = %self.plan.model_name, image = %self.plan.image_uri, "created model");
        println!("Created model {}", self.plan.model_name);
        Ok(())
    }

    /// Creates the endpoint configuration: one variant carrying all traffic
    /// on the configured hardware.
    async fn create_endpoint_config(&self) -> Result<(), DeployError> {
        let variant = ProductionVariant::builder()
            .variant_name(&self.plan.variant_name)
            .model_name(&self.plan.model_name)
            .initial_instance_count(self.plan.instance_count)
            .instance_type(ProductionVariantInstanceType::from(
                self.plan.instance_type.as_str(),
            ))
            .initial_variant_weight(1.0)
            .build();

        self.client
            .create_endpoint_config()
            .endpoint_config_name(&self.plan.endpoint_config_name)
            .production_variants(variant)
            .send()
            .await
            .map_err(|e| DeployError::Api(e.to_string()))?;

        info!(
            endpoint_config = %self.plan.endpoint_config_name,
            instance_type = %self.plan.instance_type,
            instance_count = self.plan.instance_count,
            "created endpoint config"
        );
        println!("Created endpoint config {}", self.plan.endpoint_config_name);
        Ok(())
    }

    /// Requests creation of the endpoint itself.
    async fn create_endpoint(&self) -> Result<(), DeployError> {
        self.client
            .create_endpoint()
            .endpoint_name(&self.plan.endpoint_name)
            .endpoint_config_name(&self.plan.endpoint_config_name)
            .send()
            .await
            .map_err(|e| DeployError::Api(e.to_string()))?;

        info!(endpoint = %self.plan.endpoint_name, "requested endpoint creation");
        Ok(())
    }

    /// Polls DescribeEndpoint until the endpoint reaches a terminal status.
    ///
    /// Blocks indefinitely while the service reports a transitional status;
    /// there is no timeout override or cancellation path.
    async fn wait_until_ready(&self) -> Result<(), DeployError> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix:.bold.dim} {spinner} {wide_msg}")
                .unwrap()
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Waiting for endpoint {}...", self.plan.endpoint_name));

        loop {
            let described = self
                .client
                .describe_endpoint()
                .endpoint_name(&self.plan.endpoint_name)
                .send()
                .await
                .map_err(|e| DeployError::Api(e.to_string()))?;

            let status = described
                .endpoint_status()
                .cloned()
                .ok_or(DeployError::MissingStatus)?;

            match status {
                EndpointStatus::InService => {
                    pb.finish_with_message(format!(
                        "Endpoint {} is in service",
                        self.plan.endpoint_name
                    ));
                    info!(endpoint = %self.plan.endpoint_name, "endpoint in service");
                    return Ok(());
                }
                EndpointStatus::Failed => {
                    let reason = described
                        .failure_reason()
                        .unwrap_or("no failure reason reported")
                        .to_string();
                    pb.finish_with_message("Endpoint creation failed");
                    error!(endpoint = %self.plan.endpoint_name, reason = %reason, "endpoint failed");
                    return Err(DeployError::EndpointFailed(reason));
                }
                other => {
                    pb.set_message(format!(
                        "Endpoint {}: {}",
                        self.plan.endpoint_name,
                        other.as_str()
                    ));
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
