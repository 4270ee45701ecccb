//! # Packaging Module
//!
//! Bundles the trained model's weights and its inference code into one
//! gzip-compressed tar archive with the internal layout the serving runtime
//! expects: the weights at the archive root, the code under `code/`.
//!
//! ## Key Components
//!
//! - `ArchivePackager`: writes the archive from the configured source files
//! - `inspect`: reopens a finished archive and reports its members
//! - `REQUIRED_LAYOUT`: the fixed entry table shared by the packager, the
//!   inspector, and the tests

mod builder;
mod types;

pub mod inspect;

pub use builder::ArchivePackager;
pub use types::{layout, ArchiveEntry, PackageError, REQUIRED_LAYOUT};
