//! Edges connecting executors

use crate::error::{Result, WorkflowError};
use crate::message::WorkflowMessage;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Picks the targets of a multi-selection edge group for one message
///
/// Receives the message and the group's target ids in the order they were
/// declared, and returns the ids that should receive the message.
pub type SelectionFn = Arc<dyn Fn(&WorkflowMessage, &[String]) -> Vec<String> + Send + Sync>;

/// A group of edges sharing one source executor
#[derive(Clone)]
pub enum EdgeGroup {
    /// Always deliver to one target
    Single { source: String, target: String },
    /// Always deliver to every target
    FanOut { source: String, targets: Vec<String> },
    /// Deliver to the targets chosen per message
    MultiSelection {
        source: String,
        targets: Vec<String>,
        selector: SelectionFn,
    },
}

impl EdgeGroup {
    /// Source executor
    pub fn source(&self) -> &str {
        match self {
            Self::Single { source, .. }
            | Self::FanOut { source, .. }
            | Self::MultiSelection { source, .. } => source,
        }
    }

    /// Every possible target
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Single { target, .. } => vec![target.as_str()],
            Self::FanOut { targets, .. } | Self::MultiSelection { targets, .. } => {
                targets.iter().map(String::as_str).collect()
            }
        }
    }

    /// Edge kind shown by the dev UI
    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Single { .. } => EdgeKind::Single,
            Self::FanOut { .. } => EdgeKind::FanOut,
            Self::MultiSelection { .. } => EdgeKind::MultiSelection,
        }
    }

    /// Targets that receive `message`
    pub fn route(&self, message: &WorkflowMessage) -> Result<Vec<String>> {
        match self {
            Self::Single { target, .. } => Ok(vec![target.clone()]),
            Self::FanOut { targets, .. } => Ok(targets.clone()),
            Self::MultiSelection {
                source,
                targets,
                selector,
            } => {
                let selected = selector(message, targets);
                if let Some(unknown) = selected.iter().find(|id| !targets.contains(id)) {
                    return Err(WorkflowError::InvalidSelection {
                        source_id: source.clone(),
                        selected: unknown.clone(),
                    });
                }
                debug!(source = %source, selected = ?selected, "Selection edge routed message");
                Ok(selected)
            }
        }
    }
}

impl fmt::Debug for EdgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeGroup")
            .field("kind", &self.kind())
            .field("source", &self.source())
            .field("targets", &self.targets())
            .finish()
    }
}

/// Kind of edge group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Single,
    FanOut,
    MultiSelection,
}
