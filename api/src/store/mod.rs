pub mod events;
pub mod history;
pub mod registry;

use self::events::EventLog;
use self::history::PromotionHistory;
use self::registry::DeploymentRegistry;

/// The in-process stores backing the API. Created once at startup and shared
/// behind an `Arc`; every store does its own per-key locking.
#[derive(Debug, Default)]
pub struct Store {
    pub events: EventLog,
    pub registry: DeploymentRegistry,
    pub history: PromotionHistory,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }
}
