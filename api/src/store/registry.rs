use dashmap::DashMap;
use models::deployment::{Deployment, DeploymentEvent, DeploymentStatus};

/// Current-state record for each `(repo, environment)` slot. Exactly one
/// deployment owns a slot at a time; initiating a new one supersedes the
/// previous record while its event timeline stays in the log.
#[derive(Debug, Default)]
pub struct DeploymentRegistry {
    slots: DashMap<(String, String), Deployment>,
}

/// What projecting an event onto a slot record produced.
pub struct Projection {
    pub deployment: Deployment,
    /// True when this event moved the record into `completed`.
    pub newly_completed: bool,
}

impl DeploymentRegistry {
    /// Installs `deployment` as the current record of its slot. Returns the
    /// superseded record when the slot was held by another deployment.
    pub fn upsert(&self, deployment: Deployment) -> Option<Deployment> {
        let key = (deployment.repo.clone(), deployment.environment.clone());
        let new_id = deployment.deployment_id.clone();
        self.slots
            .insert(key, deployment)
            .filter(|previous| previous.deployment_id != new_id)
    }

    /// Folds an event into its slot record, all under the slot's lock.
    ///
    /// The event is skipped (returning `None`) when the slot is vacant, when
    /// the slot is owned by a different deployment, or when the event is
    /// older than the latest one already folded in. An event carrying an
    /// `approval_url` replaces the stored one; an event without leaves it
    /// alone.
    pub fn project_event(&self, event: &DeploymentEvent) -> Option<Projection> {
        let key = (event.repo.clone(), event.environment.clone());
        let mut record = self.slots.get_mut(&key)?;
        if record.deployment_id != event.deployment_id {
            return None;
        }
        if event.timestamp < record.timestamp {
            return None;
        }

        let was_completed = record.status == DeploymentStatus::Completed;
        record.status = event.status.clone();
        record.timestamp = event.timestamp;
        if event.approval_url.is_some() {
            record.approval_url = event.approval_url.clone();
        }

        Some(Projection {
            newly_completed: !was_completed && record.status == DeploymentStatus::Completed,
            deployment: record.clone(),
        })
    }

    pub fn get(&self, repo: &str, environment: &str) -> Option<Deployment> {
        self.slots
            .get(&(repo.to_string(), environment.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Looks a deployment up by id across all slots. Only current records
    /// are found; superseded deployments live on in the event log alone.
    pub fn find_by_id(&self, deployment_id: &str) -> Option<Deployment> {
        self.slots
            .iter()
            .find(|entry| entry.value().deployment_id == deployment_id)
            .map(|entry| entry.value().clone())
    }

    /// Every current record, sorted by repo then environment so rows for the
    /// same repo come out grouped.
    pub fn list(&self) -> Vec<Deployment> {
        let mut deployments: Vec<Deployment> = self
            .slots
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        deployments.sort_by(|a, b| {
            a.repo
                .cmp(&b.repo)
                .then_with(|| a.environment.cmp(&b.environment))
        });
        deployments
    }
}
