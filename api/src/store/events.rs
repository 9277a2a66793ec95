use dashmap::DashMap;
use models::deployment::DeploymentEvent;

/// Append-only log of deployment events, keyed by deployment id.
///
/// Events are kept in arrival order; `query` sorts by event timestamp on the
/// way out, so late arrivals land in the right place without rewriting
/// anything already stored.
#[derive(Debug, Default)]
pub struct EventLog {
    events: DashMap<String, Vec<DeploymentEvent>>,
}

impl EventLog {
    pub fn append(&self, event: DeploymentEvent) {
        self.events
            .entry(event.deployment_id.clone())
            .or_default()
            .push(event);
    }

    /// Every event recorded for `deployment_id`, ascending by timestamp.
    /// Events sharing a timestamp keep their arrival order. Unknown ids
    /// yield an empty list, not an error.
    pub fn query(&self, deployment_id: &str) -> Vec<DeploymentEvent> {
        let mut events = self
            .events
            .get(deployment_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        events.sort_by_key(|event| event.timestamp);
        events
    }
}
