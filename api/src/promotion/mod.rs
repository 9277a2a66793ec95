pub mod route;

use models::deployment::{Deployment, DeploymentStatus};
use models::promotion::EnvironmentPipeline;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromotionError {
    #[error(
        "'{environment}' is not the next pipeline stage (expected '{}')",
        .expected.as_deref().unwrap_or("none")
    )]
    OutOfOrder {
        environment: String,
        expected: Option<String>,
    },
}

/// Resolves the environment a deployment's version should be promoted to
/// next, or `None` when no promotion applies.
///
/// Only a deployment sitting at `completed` is eligible. The target is the
/// pipeline successor of the latest environment in the version's promotion
/// history; a version with no history, or whose latest entry is terminal or
/// unknown to the pipeline, has nowhere to go. Reads nothing but its
/// arguments and never fails.
pub fn promotion_target(
    deployment: &Deployment,
    history: &[String],
    pipeline: &EnvironmentPipeline,
) -> Option<String> {
    if deployment.status != DeploymentStatus::Completed {
        return None;
    }
    let last = history.last()?;
    pipeline.successor_of(last).map(str::to_string)
}
