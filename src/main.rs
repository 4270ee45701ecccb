use std::error::Error;
use std::path::Path;

use clap::Parser;
use tracing::info;

use modelship::cli::{Cli, Commands};
use modelship::config::Settings;
use modelship::deploy::EndpointDeployer;
use modelship::package::{inspect, ArchivePackager};

/// Main entry point for the modelship tool
///
/// Parses command line arguments and dispatches to one of three operations:
/// - Package: bundle the model weights and inference code into the archive
/// - Inspect: list the members of a packaged archive
/// - Deploy: provision the SageMaker endpoint from the uploaded archive
///
/// # Errors
///
/// Returns an error if configuration loading fails or if the selected
/// operation fails; the error terminates the process with non-zero status
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load settings first
    let settings = Settings::new()?;

    // Initialize the subscriber before any file operations
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        // Use log file path from settings, or default to "logs"
        settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs")),
        "modelship",
    );

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_max_level(settings.logging.max_level())
        .init();

    info!("modelship starting up");

    match cli.command {
        Commands::Package => {
            let packager = ArchivePackager::new(settings.package.clone());
            packager.run()?;
        }
        Commands::Inspect { archive } => {
            let path = archive.unwrap_or_else(|| settings.package.output.clone());
            inspect::print_contents(&path)?;
        }
        Commands::Deploy => {
            let deployer = EndpointDeployer::new(&settings.deploy).await?;
            deployer.run().await?;
        }
    }

    Ok(())
}
