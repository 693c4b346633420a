//! Model pushing: publish the candidate bundle into the registry.
//!
//! The only component of the system that writes to the registry. Runs after
//! a positive promotion decision and hands the actual write to the registry's
//! atomic publish protocol.

use super::artifact::{DataTransformationArtifact, ModelPushingArtifact, ModelTrainingArtifact};
use crate::errors::PipelineError;
use crate::registry::ModelRegistry;
use std::path::Path;
use tracing::info;

/// The model pushing stage.
#[derive(Debug)]
pub struct ModelPushing<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> ModelPushing<'a> {
    /// Creates the stage against the given registry.
    #[must_use]
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Loads the run's fitted objects and publishes them as the next version.
    pub fn run(
        &self,
        transformation: &DataTransformationArtifact,
        training: &ModelTrainingArtifact,
    ) -> Result<ModelPushingArtifact, PipelineError> {
        let bundle = transformation.load_bundle(Path::new(&training.model_path))?;
        let version = self.registry.publish(&bundle)?;
        let saved_dir = self.registry.version_dir(version);
        info!(version, dir = %saved_dir.display(), "candidate pushed into the registry");

        Ok(ModelPushingArtifact { version, saved_dir })
    }
}
