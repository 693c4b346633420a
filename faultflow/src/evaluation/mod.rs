//! Champion/challenger evaluation: the promotion decision.
//!
//! Evaluation reads the registry and decides; it never writes. The pushing
//! stage consumes the [`EvaluationArtifact`] and alone performs the publish.

use crate::artifacts::ArtifactBundle;
use crate::config::EvaluationConfig;
use crate::dataset::Table;
use crate::errors::{ModelNotImprovedError, PipelineError};
use crate::metrics::Metric;
use crate::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The outcome of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationArtifact {
    /// Whether the candidate becomes the new production model.
    pub is_model_replaced: bool,
    /// Absolute score improvement; `None` for the bootstrap case.
    pub improved_metric: Option<f64>,
}

/// Decides whether a freshly trained bundle replaces the deployed one.
///
/// Stateless across calls: the decision is a pure function of the candidate,
/// the test set, the registry contents and the configuration.
#[derive(Debug)]
pub struct ModelEvaluation<'a> {
    registry: &'a ModelRegistry,
    config: EvaluationConfig,
    metric: Metric,
    target: String,
    positive_label: String,
}

impl<'a> ModelEvaluation<'a> {
    /// Creates an evaluation over the given registry.
    #[must_use]
    pub fn new(
        registry: &'a ModelRegistry,
        config: EvaluationConfig,
        metric: Metric,
        target: impl Into<String>,
        positive_label: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            config,
            metric,
            target: target.into(),
            positive_label: positive_label.into(),
        }
    }

    /// Runs the promotion decision for one candidate.
    ///
    /// With no deployed model the candidate wins by default. Otherwise both
    /// bundles are scored on the same test rows, each deriving encoded ground
    /// truth through its own fitted encoder — encodings are not comparable
    /// across versions, only scores are. The candidate replaces the deployed
    /// model iff its score exceeds the old one by strictly more than the
    /// configured minimum improvement; a tie, or an improvement landing
    /// exactly on the threshold, keeps the deployed model.
    pub fn evaluate(
        &self,
        candidate: &ArtifactBundle,
        test_set: &Table,
    ) -> Result<EvaluationArtifact, PipelineError> {
        let Some(deployed_version) = self.registry.latest_version()? else {
            info!("registry is empty, candidate becomes production by default");
            return Ok(EvaluationArtifact {
                is_model_replaced: true,
                improved_metric: None,
            });
        };

        let champion = self.registry.load_latest()?;
        let champion_score =
            champion.score(test_set, &self.target, &self.positive_label, self.metric)?;
        let challenger_score =
            candidate.score(test_set, &self.target, &self.positive_label, self.metric)?;
        info!(
            deployed_version,
            champion_score, challenger_score, "scored deployed model and candidate"
        );

        if challenger_score - champion_score > self.config.min_improvement {
            let improved = (challenger_score - champion_score).abs();
            info!(improved, "candidate beats the deployed model, replacing it");
            Ok(EvaluationArtifact {
                is_model_replaced: true,
                improved_metric: Some(improved),
            })
        } else {
            Err(ModelNotImprovedError {
                champion_score,
                challenger_score,
                min_improvement: self.config.min_improvement,
            }
            .into())
        }
    }
}
