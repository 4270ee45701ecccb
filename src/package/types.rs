use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use crate::config::PackageConfig;

/// Archive-internal name of the model weights entry
pub const WEIGHTS_NAME: &str = "model.pth";
/// Archive-internal name of the inference entry point
pub const INFERENCE_NAME: &str = "code/inference.py";
/// Archive-internal name of the model definition source
pub const MODELS_NAME: &str = "code/models.py";
/// Archive-internal name of the dependency manifest
pub const REQUIREMENTS_NAME: &str = "code/requirements.txt";

/// The four entries every deployment archive must contain, in archive order.
///
/// The serving runtime resolves the weights at the archive root and the code
/// under `code/`, so these names are fixed regardless of the source paths.
pub const REQUIRED_LAYOUT: [&str; 4] = [
    WEIGHTS_NAME,
    INFERENCE_NAME,
    MODELS_NAME,
    REQUIREMENTS_NAME,
];

/// A single archive entry: the source file on disk and the fixed name it
/// receives inside the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path of the file on local disk
    pub source: PathBuf,
    /// Name of the entry inside the archive
    pub name: &'static str,
}

/// Resolves the packaging configuration into the fixed entry table.
pub fn layout(config: &PackageConfig) -> [ArchiveEntry; 4] {
    [
        ArchiveEntry {
            source: config.model_weights.clone(),
            name: WEIGHTS_NAME,
        },
        ArchiveEntry {
            source: config.inference_source.clone(),
            name: INFERENCE_NAME,
        },
        ArchiveEntry {
            source: config.model_source.clone(),
            name: MODELS_NAME,
        },
        ArchiveEntry {
            source: config.requirements.clone(),
            name: REQUIREMENTS_NAME,
        },
    ]
}

/// Errors that can occur while packaging or inspecting an archive
#[derive(Debug)]
pub enum PackageError {
    /// A source file named in the configuration does not exist
    MissingSource(PathBuf),
    /// An underlying filesystem or archive I/O failure
    Io(std::io::Error),
    /// The archive's entry set does not match the required layout
    BadLayout {
        /// Required entries absent from the archive
        missing: Vec<String>,
        /// Archive entries outside the required layout
        extra: Vec<String>,
    },
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::MissingSource(path) => {
                write!(f, "source file not found: {}", path.display())
            }
            PackageError::Io(e) => write!(f, "archive I/O error: {}", e),
            PackageError::BadLayout { missing, extra } => write!(
                f,
                "archive layout mismatch (missing: [{}], unexpected: [{}])",
                missing.join(", "),
                extra.join(", ")
            ),
        }
    }
}

impl Error for PackageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PackageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PackageError {
    fn from(e: std::io::Error) -> Self {
        PackageError::Io(e)
    }
}
