//! Fitted model artifacts: feature transformer, target encoder and classifier.
//!
//! Everything here is a plain serde struct so the registry can persist and
//! reload a deployable bundle without knowing anything about its internals.

mod boosted;
mod combined;
mod encoder;
mod transformer;

pub use boosted::{BoosterParams, GradientBooster, Stump};
pub use combined::CombinedPipeline;
pub use encoder::TargetEncoder;
pub use transformer::FittedTransformer;
