//! Compensation contract for multi-step route operations.
//!
//! Creating a route and attaching its plugins are separate gateway calls with
//! no transaction around them. Every step that creates gateway state records
//! how to undo it; the caller receives those records next to the outcome and
//! decides whether to replay them.

use std::fmt;

use tracing::warn;

use crate::errors::Result;

/// Undo action for one completed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Remove a route created by this operation
    DeleteRoute { name: String },

    /// Remove a plugin instance created by this operation
    DeletePlugin { route: String, plugin: String },
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::DeleteRoute { name } => write!(f, "delete route '{}'", name),
            Compensation::DeletePlugin { route, plugin } => {
                write!(f, "delete plugin '{}' from route '{}'", plugin, route)
            }
        }
    }
}

/// Outcome of a multi-step operation plus the undo actions for every step
/// that completed, in execution order
#[derive(Debug)]
#[must_use]
pub struct Compensated<T> {
    pub outcome: Result<T>,
    pub compensations: Vec<Compensation>,
}

impl<T> Compensated<T> {
    pub fn new(outcome: Result<T>, compensations: Vec<Compensation>) -> Self {
        Self { outcome, compensations }
    }

    /// True when the operation failed after changing gateway state
    pub fn is_partial_failure(&self) -> bool {
        self.outcome.is_err() && !self.compensations.is_empty()
    }

    /// Drop the compensations and keep the outcome.
    ///
    /// A partial failure is logged so the leftover gateway state is visible.
    pub fn into_result(self) -> Result<T> {
        if self.is_partial_failure() {
            let pending: Vec<String> = self.compensations.iter().map(ToString::to_string).collect();
            warn!(
                pending = ?pending,
                "Gateway operation failed after partial changes; compensations not applied"
            );
        }
        self.outcome
    }
}
