use std::fs;

use modelship::config::PackageConfig;
use modelship::package::{inspect, ArchivePackager, REQUIRED_LAYOUT};
use tempfile::TempDir;

fn workspace_with_sources() -> (TempDir, PackageConfig) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir(root.join("model_normalized")).unwrap();
    fs::write(root.join("model_normalized/model.pth"), vec![0u8; 256]).unwrap();
    fs::write(
        root.join("inference.py"),
        "def model_fn(model_dir):\n    return load(model_dir)\n",
    )
    .unwrap();
    fs::write(
        root.join("models.py"),
        "class SentimentClassifier:\n    pass\n",
    )
    .unwrap();
    fs::write(root.join("requirements.txt"), "torch==2.5.1\n").unwrap();

    let config = PackageConfig {
        model_weights: root.join("model_normalized/model.pth"),
        inference_source: root.join("inference.py"),
        model_source: root.join("models.py"),
        requirements: root.join("requirements.txt"),
        output: root.join("model.tar.gz"),
    };

    (dir, config)
}

#[test]
fn package_produces_exactly_the_deployment_layout() {
    let (_dir, config) = workspace_with_sources();
    ArchivePackager::new(config.clone()).run().unwrap();

    let members = inspect::read_members(&config.output).unwrap();
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();

    assert_eq!(names, REQUIRED_LAYOUT.to_vec());
    assert!(inspect::check_layout(&members).is_ok());
}

#[test]
fn packaged_entries_keep_their_source_bytes_sizes() {
    let (_dir, config) = workspace_with_sources();
    ArchivePackager::new(config.clone()).run().unwrap();

    let members = inspect::read_members(&config.output).unwrap();
    assert_eq!(members[0].name, "model.pth");
    assert_eq!(members[0].size, 256);
}

#[test]
fn absent_requirements_file_leaves_no_archive_behind() {
    let (_dir, config) = workspace_with_sources();
    fs::remove_file(&config.requirements).unwrap();

    assert!(ArchivePackager::new(config.clone()).run().is_err());
    assert!(!config.output.exists());
}

#[test]
fn inspect_reports_a_foreign_archive_layout() {
    let (dir, config) = workspace_with_sources();

    // An archive missing code/ entries, as a hand-rolled upload might be
    let foreign = dir.path().join("foreign.tar.gz");
    {
        let file = fs::File::create(&foreign).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_path_with_name(&config.model_weights, "model.pth")
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    let members = inspect::read_members(&foreign).unwrap();
    assert!(inspect::check_layout(&members).is_err());
}
