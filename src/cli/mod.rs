use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line interface for modelship
#[derive(Parser)]
#[command(name = "modelship")]
#[command(version = "0.1.0")]
#[command(about = "Package a trained model and ship it to a SageMaker endpoint", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle the model weights and inference code into the deployment archive
    Package,

    /// List the members of a packaged archive
    Inspect {
        /// Path to the archive (defaults to the configured output path)
        #[arg(short, long)]
        archive: Option<PathBuf>,
    },

    /// Provision the SageMaker inference endpoint from the uploaded archive
    Deploy,
}
