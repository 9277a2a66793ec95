use crate::promotion::PromotionError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use models::promotion::EnvironmentPipeline;

/// Per `(repo, version)` record of the environments a version has completed,
/// in pipeline order.
#[derive(Debug, Default)]
pub struct PromotionHistory {
    versions: DashMap<(String, String), Vec<String>>,
}

#[derive(Debug, PartialEq)]
pub enum CompletionOutcome {
    Appended,
    /// The environment was already the latest entry; duplicate completion
    /// signals are absorbed without growing the history.
    AlreadyRecorded,
}

impl PromotionHistory {
    /// Records that `version` completed a deployment to `environment`.
    ///
    /// Accepts only the next stage the pipeline expects (the first stage for
    /// a version never seen before). Anything else is rejected and the
    /// history stays exactly as it was. The check and the append run under
    /// the same per-key lock, so two racing recorders cannot both extend the
    /// history with the same stage.
    pub fn record_completion(
        &self,
        repo: &str,
        version: &str,
        environment: &str,
        pipeline: &EnvironmentPipeline,
    ) -> Result<CompletionOutcome, PromotionError> {
        match self.versions.entry((repo.to_string(), version.to_string())) {
            Entry::Occupied(mut slot) => {
                let history = slot.get_mut();
                if history.last().is_some_and(|last| last == environment) {
                    return Ok(CompletionOutcome::AlreadyRecorded);
                }
                match pipeline.expected_next(history) {
                    Some(next) if next == environment => {
                        history.push(environment.to_string());
                        Ok(CompletionOutcome::Appended)
                    }
                    expected => Err(PromotionError::OutOfOrder {
                        environment: environment.to_string(),
                        expected: expected.map(str::to_string),
                    }),
                }
            }
            Entry::Vacant(slot) => match pipeline.first() {
                Some(first) if first == environment => {
                    slot.insert(vec![environment.to_string()]);
                    Ok(CompletionOutcome::Appended)
                }
                expected => Err(PromotionError::OutOfOrder {
                    environment: environment.to_string(),
                    expected: expected.map(str::to_string),
                }),
            },
        }
    }

    /// The completed environments for `(repo, version)`, oldest first. A
    /// version with no recorded completions yields an empty list.
    pub fn get(&self, repo: &str, version: &str) -> Vec<String> {
        self.versions
            .get(&(repo.to_string(), version.to_string()))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}
