//! The versioned on-disk model registry.
//!
//! The registry is the single source of truth for "what is the current
//! production artifact set" and "where does the next one go". Versions are
//! non-negative integers encoded as directory names directly under the
//! registry root; the latest version is the largest such integer. Version
//! directories are immutable once published and only ever created through the
//! atomic publish protocol in [`publish`].
//!
//! Entries whose names begin with `.` are the publish staging namespace and
//! are invisible to version resolution. Any other entry that is not an
//! integer-named directory makes the registry corrupt: silently skipping it
//! could under-report the true latest version.

mod layout;
mod publish;

pub use layout::{VersionLayout, MANIFEST_FILE};

use crate::artifacts::{file_digest, ArtifactBundle, BundleShape};
use crate::config::RegistryConfig;
use crate::errors::{PipelineError, RegistryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One artifact file recorded in a version manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Path relative to the version directory.
    pub path: String,
    /// SHA-256 digest of the file's bytes, hex encoded.
    pub sha256: String,
}

/// The manifest written alongside every published version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    /// The version number this manifest describes.
    pub version: u64,
    /// RFC 3339 publication timestamp.
    pub created_at: String,
    /// Which pipeline shape the bundle carries.
    pub shape: BundleShape,
    /// Every artifact file in the version, with digests.
    pub components: Vec<ComponentRecord>,
}

/// Handle to a registry root directory.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    config: RegistryConfig,
}

impl ModelRegistry {
    /// Opens a registry, creating its root directory if absent.
    ///
    /// This is the only filesystem mutation the registry itself performs;
    /// version directories are created exclusively by [`Self::publish`].
    pub fn open(config: RegistryConfig) -> Result<Self, RegistryError> {
        fs::create_dir_all(&config.root)
            .map_err(|source| RegistryError::io(config.root.clone(), source))?;
        Ok(Self { config })
    }

    /// The registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The registry root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// The highest published version, or `None` for a fresh registry.
    ///
    /// An absent root also reads as "no versions yet": the registry may not
    /// have been created on this host at all.
    pub fn latest_version(&self) -> Result<Option<u64>, RegistryError> {
        let entries = match fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(RegistryError::io(self.root(), source)),
        };

        let mut latest: Option<u64> = None;
        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::io(self.root(), source))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                return Err(RegistryError::corrupt(
                    entry.path(),
                    "entry name is not valid UTF-8",
                ));
            };
            if name.starts_with('.') {
                // Publish staging namespace, never a version.
                continue;
            }
            if !entry.path().is_dir() {
                return Err(RegistryError::corrupt(
                    entry.path(),
                    format!("entry '{name}' is not a version directory"),
                ));
            }
            let version: u64 = name.parse().map_err(|_| {
                RegistryError::corrupt(
                    entry.path(),
                    format!("entry '{name}' is not a numeric version"),
                )
            })?;
            latest = Some(latest.map_or(version, |current| current.max(version)));
        }
        Ok(latest)
    }

    /// The version directory that would hold the given version.
    #[must_use]
    pub fn version_dir(&self, version: u64) -> PathBuf {
        self.root().join(version.to_string())
    }

    /// Component layout for the given version.
    #[must_use]
    pub fn version_layout(&self, version: u64) -> VersionLayout {
        VersionLayout::new(self.version_dir(version), &self.config)
    }

    /// Component layout of the latest version.
    pub fn latest_layout(&self) -> Result<VersionLayout, RegistryError> {
        let version = self
            .latest_version()?
            .ok_or_else(|| RegistryError::NoPriorVersion {
                root: self.root().to_path_buf(),
            })?;
        Ok(self.version_layout(version))
    }

    /// Path of the latest version's model file.
    pub fn latest_model_path(&self) -> Result<PathBuf, RegistryError> {
        Ok(self.latest_layout()?.model_path())
    }

    /// Path of the latest version's transformer file.
    pub fn latest_transformer_path(&self) -> Result<PathBuf, RegistryError> {
        Ok(self.latest_layout()?.transformer_path())
    }

    /// Path of the latest version's target-encoder file.
    pub fn latest_encoder_path(&self) -> Result<PathBuf, RegistryError> {
        Ok(self.latest_layout()?.encoder_path())
    }

    /// The next version to publish: latest + 1, or 0 for a fresh registry.
    ///
    /// Strictly greater than every existing integer name, so it can never
    /// collide with a published version. The directory is not created here.
    pub fn next_version(&self) -> Result<u64, RegistryError> {
        Ok(self.latest_version()?.map_or(0, |version| version + 1))
    }

    /// The directory the next version would be published to.
    pub fn next_version_dir(&self) -> Result<PathBuf, RegistryError> {
        Ok(self.version_dir(self.next_version()?))
    }

    /// Where the promotion step should write the next model file.
    pub fn save_model_at(&self) -> Result<PathBuf, RegistryError> {
        Ok(self
            .version_layout(self.next_version()?)
            .model_path())
    }

    /// Where the promotion step should write the next transformer file.
    pub fn save_transformer_at(&self) -> Result<PathBuf, RegistryError> {
        Ok(self
            .version_layout(self.next_version()?)
            .transformer_path())
    }

    /// Where the promotion step should write the next target-encoder file.
    pub fn save_encoder_at(&self) -> Result<PathBuf, RegistryError> {
        Ok(self
            .version_layout(self.next_version()?)
            .encoder_path())
    }

    /// Reads the manifest of a published version.
    pub fn read_manifest(&self, version: u64) -> Result<VersionManifest, RegistryError> {
        let path = self.version_layout(version).manifest_path();
        let bytes = fs::read(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                RegistryError::corrupt(&path, "version has no manifest")
            } else {
                RegistryError::io(&path, source)
            }
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|err| RegistryError::corrupt(&path, format!("unreadable manifest: {err}")))
    }

    /// Verifies every component digest of a published version.
    pub fn verify_version(&self, version: u64) -> Result<VersionManifest, RegistryError> {
        let layout = self.version_layout(version);
        let manifest = self.read_manifest(version)?;
        if manifest.version != version {
            return Err(RegistryError::corrupt(
                layout.manifest_path(),
                format!(
                    "manifest claims version {}, directory says {version}",
                    manifest.version
                ),
            ));
        }
        for component in &manifest.components {
            let path = layout.dir().join(&component.path);
            let digest = file_digest(&path).map_err(|_| {
                RegistryError::corrupt(&path, "component file missing or unreadable")
            })?;
            if digest != component.sha256 {
                return Err(RegistryError::corrupt(
                    &path,
                    "component digest does not match the manifest",
                ));
            }
        }
        debug!(version, "registry version verified");
        Ok(manifest)
    }

    /// Loads and verifies the latest published bundle.
    pub fn load_latest(&self) -> Result<ArtifactBundle, PipelineError> {
        let version = self
            .latest_version()?
            .ok_or_else(|| RegistryError::NoPriorVersion {
                root: self.root().to_path_buf(),
            })?;
        let manifest = self.verify_version(version)?;
        let layout = self.version_layout(version);
        let bundle = ArtifactBundle::load_components(&layout)?;
        if bundle.shape() != manifest.shape {
            return Err(RegistryError::corrupt(
                layout.dir(),
                format!(
                    "manifest records a {} bundle but the directory holds a {} one",
                    manifest.shape,
                    bundle.shape()
                ),
            )
            .into());
        }
        Ok(bundle)
    }

    /// Publishes a bundle as the next version through the atomic protocol.
    ///
    /// Returns the version number that was created. See [`publish`] for the
    /// staging-and-rename mechanics and conflict handling.
    pub fn publish(&self, bundle: &ArtifactBundle) -> Result<u64, PipelineError> {
        publish::publish(self, bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FittedTransformer, GradientBooster, Stump, TargetEncoder};

    fn test_registry(root: &Path) -> ModelRegistry {
        ModelRegistry::open(RegistryConfig::default().with_root(root)).unwrap()
    }

    pub(super) fn test_bundle() -> ArtifactBundle {
        ArtifactBundle::Split {
            transformer: FittedTransformer::from_parts(
                vec!["s1".to_string()],
                0.0,
                vec![0.0],
                vec![1.0],
            ),
            encoder: TargetEncoder::from_classes(vec!["neg".to_string(), "pos".to_string()]),
            model: GradientBooster::from_parts(
                1,
                0.0,
                1.0,
                vec![Stump {
                    feature: 0,
                    threshold: 0.5,
                    left: -10.0,
                    right: 10.0,
                }],
            ),
        }
    }

    #[test]
    fn test_open_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("saved_models");
        assert!(!root.exists());

        let _registry = test_registry(&root);
        assert!(root.is_dir());
    }

    #[test]
    fn test_latest_version_empty_and_absent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("saved_models");
        let registry = test_registry(&root);

        assert_eq!(registry.latest_version().unwrap(), None);

        fs::remove_dir_all(&root).unwrap();
        assert_eq!(registry.latest_version().unwrap(), None);
    }

    #[test]
    fn test_latest_version_is_maximum() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        for version in ["0", "1", "2"] {
            fs::create_dir(dir.path().join(version)).unwrap();
        }

        assert_eq!(registry.latest_version().unwrap(), Some(2));
        // A gap does not confuse resolution either.
        fs::create_dir(dir.path().join("10")).unwrap();
        assert_eq!(registry.latest_version().unwrap(), Some(10));
    }

    #[test]
    fn test_latest_version_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        fs::create_dir(dir.path().join("3")).unwrap();

        assert_eq!(registry.latest_version().unwrap(), Some(3));
        assert_eq!(registry.latest_version().unwrap(), Some(3));
    }

    #[test]
    fn test_non_numeric_entry_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        fs::create_dir(dir.path().join("0")).unwrap();
        fs::create_dir(dir.path().join("abc")).unwrap();

        let result = registry.latest_version();
        assert!(matches!(result, Err(RegistryError::Corrupt { .. })));
    }

    #[test]
    fn test_stray_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        fs::write(dir.path().join("7"), b"not a directory").unwrap();

        let result = registry.latest_version();
        assert!(matches!(result, Err(RegistryError::Corrupt { .. })));
    }

    #[test]
    fn test_dot_entries_are_invisible() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        fs::create_dir(dir.path().join("1")).unwrap();
        fs::create_dir(dir.path().join(".staging-abandoned")).unwrap();
        fs::write(dir.path().join(".keep"), b"").unwrap();

        assert_eq!(registry.latest_version().unwrap(), Some(1));
    }

    #[test]
    fn test_next_version_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());

        assert_eq!(registry.next_version().unwrap(), 0);
        assert!(!registry.next_version_dir().unwrap().exists());

        fs::create_dir(dir.path().join("0")).unwrap();
        fs::create_dir(dir.path().join("5")).unwrap();
        assert_eq!(registry.next_version().unwrap(), 6);
        assert!(!registry.next_version_dir().unwrap().exists());
    }

    #[test]
    fn test_latest_paths_need_a_version() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());

        assert!(matches!(
            registry.latest_model_path(),
            Err(RegistryError::NoPriorVersion { .. })
        ));
        assert!(matches!(
            registry.latest_transformer_path(),
            Err(RegistryError::NoPriorVersion { .. })
        ));
        assert!(matches!(
            registry.latest_encoder_path(),
            Err(RegistryError::NoPriorVersion { .. })
        ));
    }

    #[test]
    fn test_save_at_paths_point_into_next_version() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        fs::create_dir(dir.path().join("2")).unwrap();

        let model_at = registry.save_model_at().unwrap();
        assert_eq!(model_at, dir.path().join("3").join("model").join("model.bin"));
        let transformer_at = registry.save_transformer_at().unwrap();
        assert_eq!(
            transformer_at,
            dir.path().join("3").join("transformer").join("transformer.bin")
        );
        let encoder_at = registry.save_encoder_at().unwrap();
        assert_eq!(
            encoder_at,
            dir.path().join("3").join("encoder").join("encoder.bin")
        );
    }

    #[test]
    fn test_load_latest_round_trip_and_verification() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        let bundle = test_bundle();

        let version = registry.publish(&bundle).unwrap();
        assert_eq!(version, 0);

        let back = registry.load_latest().unwrap();
        assert_eq!(back, bundle);

        let manifest = registry.verify_version(0).unwrap();
        assert_eq!(manifest.version, 0);
        assert_eq!(manifest.shape, BundleShape::Split);
        assert_eq!(manifest.components.len(), 3);
    }

    #[test]
    fn test_tampered_component_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        registry.publish(&test_bundle()).unwrap();

        let model_path = registry.latest_model_path().unwrap();
        fs::write(&model_path, b"tampered").unwrap();

        let result = registry.load_latest();
        assert!(matches!(
            result,
            Err(PipelineError::Registry(RegistryError::Corrupt { .. }))
        ));
    }

    #[test]
    fn test_missing_component_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        registry.publish(&test_bundle()).unwrap();

        fs::remove_file(registry.latest_encoder_path().unwrap()).unwrap();

        let result = registry.load_latest();
        assert!(matches!(
            result,
            Err(PipelineError::Registry(RegistryError::Corrupt { .. }))
        ));
    }

    #[test]
    fn test_missing_manifest_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(dir.path());
        registry.publish(&test_bundle()).unwrap();

        fs::remove_file(registry.version_layout(0).manifest_path()).unwrap();

        let result = registry.load_latest();
        assert!(matches!(
            result,
            Err(PipelineError::Registry(RegistryError::Corrupt { .. }))
        ));
    }
}
