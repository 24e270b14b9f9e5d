//! Registry of the workflows a dev UI serves

use agent_workflow::Workflow;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Shared state of the dev UI
pub struct DevUiState {
    entities: BTreeMap<String, Arc<Workflow>>,
    tracing_enabled: bool,
}

impl DevUiState {
    /// Index workflows by id; a later workflow replaces an earlier one with the same id
    pub fn new(entities: Vec<Arc<Workflow>>, tracing_enabled: bool) -> Self {
        let mut indexed = BTreeMap::new();
        for workflow in entities {
            let id = workflow.id().to_string();
            if indexed.insert(id.clone(), workflow).is_some() {
                warn!(entity_id = %id, "Duplicate entity id, keeping the last one");
            }
        }
        Self {
            entities: indexed,
            tracing_enabled,
        }
    }

    /// Look up an entity
    pub fn get(&self, id: &str) -> Option<Arc<Workflow>> {
        self.entities.get(id).cloned()
    }

    /// Entities in id order
    pub fn entities(&self) -> impl Iterator<Item = &Arc<Workflow>> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn tracing_enabled(&self) -> bool {
        self.tracing_enabled
    }
}
