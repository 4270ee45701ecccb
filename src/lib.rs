//! modelship packages a trained model's weights and inference code into a
//! gzip-compressed tar archive with the layout the SageMaker serving runtime
//! expects, and provisions an inference endpoint from that archive once it
//! has been uploaded to S3.

pub mod cli;
pub mod config;
pub mod deploy;
pub mod package;
