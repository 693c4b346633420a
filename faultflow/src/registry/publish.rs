//! Atomic publish protocol for new registry versions.
//!
//! A publish writes the complete bundle and its manifest into a dot-prefixed
//! staging directory under the registry root, then renames the staging
//! directory onto the final integer-named slot. The rename is the only point
//! where the version becomes visible, so a partially written version can
//! never be selected as latest. Two writers racing for the same slot resolve
//! through the rename: exactly one succeeds, the loser recomputes the next
//! version against the now-updated registry and tries again.

use super::{ModelRegistry, VersionLayout, VersionManifest};
use crate::artifacts::ArtifactBundle;
use crate::errors::{PipelineError, RegistryError};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Publishes a bundle as the registry's next version.
pub(super) fn publish(
    registry: &ModelRegistry,
    bundle: &ArtifactBundle,
) -> Result<u64, PipelineError> {
    let attempts = registry.config().publish_attempts.max(1);
    let mut last_version = 0;

    for attempt in 1..=attempts {
        let version = registry.next_version()?;
        last_version = version;
        match publish_at(registry, bundle, version) {
            Ok(()) => {
                info!(version, "published new registry version");
                return Ok(version);
            }
            Err(PipelineError::Registry(RegistryError::PublishConflict { version })) => {
                warn!(version, attempt, "version slot contested, recomputing next version");
            }
            Err(err) => return Err(err),
        }
    }

    Err(RegistryError::PublishRetriesExhausted {
        attempts,
        last_version,
    }
    .into())
}

/// One publish attempt against a fixed version slot.
pub(super) fn publish_at(
    registry: &ModelRegistry,
    bundle: &ArtifactBundle,
    version: u64,
) -> Result<(), PipelineError> {
    let staging = registry
        .root()
        .join(format!(".staging-{}", Uuid::new_v4()));
    let layout = VersionLayout::new(staging.clone(), registry.config());

    if let Err(err) = write_staged(bundle, version, &layout) {
        remove_staging(&staging);
        return Err(err);
    }

    let final_dir = registry.version_dir(version);
    match fs::rename(&staging, &final_dir) {
        Ok(()) => Ok(()),
        Err(source) => {
            remove_staging(&staging);
            if source.kind() == ErrorKind::AlreadyExists || final_dir.exists() {
                Err(RegistryError::PublishConflict { version }.into())
            } else {
                Err(RegistryError::io(final_dir, source).into())
            }
        }
    }
}

fn write_staged(
    bundle: &ArtifactBundle,
    version: u64,
    layout: &VersionLayout,
) -> Result<(), PipelineError> {
    let components = bundle.save_components(layout)?;
    let manifest = VersionManifest {
        version,
        created_at: Utc::now().to_rfc3339(),
        shape: bundle.shape(),
        components,
    };
    let bytes = serde_json::to_vec_pretty(&manifest)?;
    fs::write(layout.manifest_path(), bytes)
        .map_err(|source| RegistryError::io(layout.manifest_path(), source))?;
    Ok(())
}

fn remove_staging(staging: &Path) {
    if let Err(err) = fs::remove_dir_all(staging) {
        if err.kind() != ErrorKind::NotFound {
            warn!(staging = %staging.display(), %err, "failed to clean up staging directory");
        }
    }
}
