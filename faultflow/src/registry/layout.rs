//! Path primitives for one registry version directory.

use crate::config::RegistryConfig;
use std::path::{Path, PathBuf};

/// File name of the per-version manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Resolves component paths inside a single version directory.
///
/// Purely path construction; nothing here touches the filesystem. The same
/// layout is used against the final integer-named directory and against the
/// staging directory a publish writes into before its atomic rename.
#[derive(Debug, Clone)]
pub struct VersionLayout {
    dir: PathBuf,
    model_subpath: PathBuf,
    transformer_subpath: PathBuf,
    encoder_subpath: PathBuf,
}

impl VersionLayout {
    /// Creates a layout rooted at the given version directory.
    #[must_use]
    pub fn new(dir: PathBuf, config: &RegistryConfig) -> Self {
        Self {
            dir,
            model_subpath: Path::new(&config.model_dir).join(&config.model_file),
            transformer_subpath: Path::new(&config.transformer_dir)
                .join(&config.transformer_file),
            encoder_subpath: Path::new(&config.encoder_dir).join(&config.encoder_file),
        }
    }

    /// The version directory itself.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the serialized model.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_subpath)
    }

    /// Path of the serialized transformer (or combined pipeline).
    #[must_use]
    pub fn transformer_path(&self) -> PathBuf {
        self.dir.join(&self.transformer_subpath)
    }

    /// Path of the serialized target encoder.
    #[must_use]
    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(&self.encoder_subpath)
    }

    /// Path of the version manifest.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }
}
