//! # Deployment Module
//!
//! Provisions a SageMaker inference endpoint from the uploaded model
//! archive. The provisioning parameters are resolved up front into a
//! `DeployPlan`, a pure function of configuration, and the
//! `EndpointDeployer` submits that plan as the service's three-step
//! sequence (CreateModel, CreateEndpointConfig, CreateEndpoint), then
//! blocks until the endpoint reports a terminal status.

mod endpoint;
mod types;

pub use endpoint::EndpointDeployer;
pub use types::{DeployError, DeployPlan};
