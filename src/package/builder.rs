use std::fs::{self, File};
use std::path::PathBuf;

use chrono::Utc;
use flate2::{Compression, GzBuilder};
use tracing::{debug, info};

use super::inspect;
use super::types::{layout, PackageError};
use crate::config::PackageConfig;

/// Builds the deployment archive from the configured source files.
pub struct ArchivePackager {
    /// Source and output paths for the archive
    config: PackageConfig,
}

impl ArchivePackager {
    /// Creates a packager for the given packaging configuration.
    pub fn new(config: PackageConfig) -> Self {
        Self { config }
    }

    /// Creates the archive, then reads it back and prints its members for
    /// manual verification.
    ///
    /// # Returns
    ///
    /// A Result indicating success or failure
    pub fn run(&self) -> Result<(), PackageError> {
        println!("Creating model package...");
        self.create()?;
        println!("✓ {} created successfully", self.config.output.display());

        // Verify contents. The listing is observational; a malformed archive
        // is caught by the reader erroring, not corrected here.
        println!("\nPackage contents:");
        for member in inspect::read_members(&self.config.output)? {
            println!("  - {}", member.name);
        }

        Ok(())
    }

    /// Writes all four entries into a gzip-compressed tar archive.
    ///
    /// The archive is staged at `<output>.partial` and renamed into place
    /// only after the gzip stream is finished, so an interrupted run never
    /// leaves a complete-looking archive at the output path.
    ///
    /// # Returns
    ///
    /// A Result indicating success or failure
    pub fn create(&self) -> Result<(), PackageError> {
        let entries = layout(&self.config);

        // Every source must exist before any output is opened
        for entry in &entries {
            if !entry.source.is_file() {
                return Err(PackageError::MissingSource(entry.source.clone()));
            }
        }

        let staging = self.staging_path();
        let file = File::create(&staging)?;

        // Stamp the gzip header with the packaging time so each run is
        // distinguishable even when the member set is unchanged
        let encoder = GzBuilder::new()
            .mtime(Utc::now().timestamp() as u32)
            .write(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for entry in &entries {
            println!("Adding {}...", entry.name);
            debug!(
                source = %entry.source.display(),
                name = entry.name,
                "appending archive entry"
            );
            builder.append_path_with_name(&entry.source, entry.name)?;
        }

        let encoder = builder.into_inner()?;
        encoder.finish()?;
        fs::rename(&staging, &self.config.output)?;

        info!(archive = %self.config.output.display(), "wrote model package");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut staged = self.config.output.as_os_str().to_owned();
        staged.push(".partial");
        PathBuf::from(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::REQUIRED_LAYOUT;
    use tempfile::TempDir;

    fn config_with_sources(dir: &TempDir) -> PackageConfig {
        let root = dir.path();
        fs::create_dir(root.join("model_normalized")).unwrap();
        fs::write(root.join("model_normalized/model.pth"), b"weights").unwrap();
        fs::write(root.join("inference.py"), b"def model_fn(model_dir): ...").unwrap();
        fs::write(root.join("models.py"), b"class SentimentModel: ...").unwrap();
        fs::write(root.join("requirements.txt"), b"torch==2.5.1").unwrap();

        PackageConfig {
            model_weights: root.join("model_normalized/model.pth"),
            inference_source: root.join("inference.py"),
            model_source: root.join("models.py"),
            requirements: root.join("requirements.txt"),
            output: root.join("model.tar.gz"),
        }
    }

    #[test]
    fn create_writes_archive_and_removes_staging() {
        let dir = TempDir::new().unwrap();
        let config = config_with_sources(&dir);
        let packager = ArchivePackager::new(config.clone());

        packager.create().unwrap();

        assert!(config.output.is_file());
        assert!(!packager.staging_path().exists());
    }

    #[test]
    fn archive_members_match_required_layout_in_order() {
        let dir = TempDir::new().unwrap();
        let config = config_with_sources(&dir);
        ArchivePackager::new(config.clone()).create().unwrap();

        let names: Vec<String> = inspect::read_members(&config.output)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, REQUIRED_LAYOUT.to_vec());
    }

    #[test]
    fn missing_weights_abort_before_any_output() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_sources(&dir);
        fs::remove_file(&config.model_weights).unwrap();
        config.output = dir.path().join("model.tar.gz");
        let packager = ArchivePackager::new(config.clone());

        let err = packager.create().unwrap_err();
        assert!(matches!(err, PackageError::MissingSource(_)));
        assert!(!config.output.exists());
        assert!(!packager.staging_path().exists());
    }

    #[test]
    fn repackaging_keeps_the_member_set() {
        let dir = TempDir::new().unwrap();
        let config = config_with_sources(&dir);
        let packager = ArchivePackager::new(config.clone());

        packager.create().unwrap();
        let first: Vec<String> = inspect::read_members(&config.output)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();

        packager.create().unwrap();
        let second: Vec<String> = inspect::read_members(&config.output)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();

        assert_eq!(first, second);
    }
}
