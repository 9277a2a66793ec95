use serde::{Deserialize, Serialize};

/// Pipeline used when `PIPELINE_ENVIRONMENTS` is not configured.
pub const DEFAULT_PIPELINE: [&str; 4] = ["development", "staging", "production", "production-us"];

/// Environments a version has completed, oldest first.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VersionPromotionHistory {
    pub repo: String,
    pub version: String,
    pub history: Vec<String>,
}

/// The ordered sequence of environments a release version moves through.
/// Promotion only ever advances one stage at a time; the last stage has no
/// successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPipeline {
    stages: Vec<String>,
}

impl Default for EnvironmentPipeline {
    fn default() -> Self {
        EnvironmentPipeline {
            stages: DEFAULT_PIPELINE.iter().map(|stage| stage.to_string()).collect(),
        }
    }
}

impl EnvironmentPipeline {
    pub fn new(stages: Vec<String>) -> Self {
        EnvironmentPipeline { stages }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn first(&self) -> Option<&str> {
        self.stages.first().map(String::as_str)
    }

    pub fn position(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|known| known == stage)
    }

    /// The stage after `stage`, `None` for the terminal stage or for a stage
    /// that is not part of the pipeline at all.
    pub fn successor_of(&self, stage: &str) -> Option<&str> {
        let position = self.position(stage)?;
        self.stages.get(position + 1).map(String::as_str)
    }

    /// The stage a completion may be recorded for next: the first stage when
    /// the history is empty, otherwise the successor of the latest entry.
    pub fn expected_next(&self, history: &[String]) -> Option<&str> {
        match history.last() {
            None => self.first(),
            Some(last) => self.successor_of(last),
        }
    }
}
