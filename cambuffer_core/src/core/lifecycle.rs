//! Lifecycle state machine for managed nodes
//!
//! ```text
//! unconfigured --configure--> inactive --activate--> active
//! active --deactivate--> inactive --cleanup--> unconfigured
//! unconfigured | inactive | active --shutdown--> finalized
//! any primary state --fault--> error_processing --shutdown--> finalized
//! ```
//!
//! The supervisor drives transitions; the machine only decides whether a
//! requested transition is legal and records where the node ended up.

use crate::error::{CambufferError, CambufferResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// States a lifecycle-managed node can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Unconfigured,
    Inactive,
    Active,
    Finalized,
    ErrorProcessing,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Finalized => "finalized",
            Self::ErrorProcessing => "error_processing",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transitions requested by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Configure,
    Activate,
    Deactivate,
    Cleanup,
    Shutdown,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::Configure,
        Transition::Activate,
        Transition::Deactivate,
        Transition::Cleanup,
        Transition::Shutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Cleanup => "cleanup",
            Self::Shutdown => "shutdown",
        }
    }

    /// Where `transition` leads from `from`, or `None` when it is not allowed
    pub fn target(self, from: LifecycleState) -> Option<LifecycleState> {
        use LifecycleState::*;
        match (from, self) {
            (Unconfigured, Transition::Configure) => Some(Inactive),
            (Inactive, Transition::Activate) => Some(Active),
            (Active, Transition::Deactivate) => Some(Inactive),
            (Inactive, Transition::Cleanup) => Some(Unconfigured),
            (Unconfigured | Inactive | Active | ErrorProcessing, Transition::Shutdown) => {
                Some(Finalized)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current lifecycle state of one node
#[derive(Debug, Clone)]
pub struct LifecycleStateMachine {
    node_name: String,
    state: LifecycleState,
    previous_state: LifecycleState,
    state_change_time: Instant,
    last_error: Option<String>,
}

impl LifecycleStateMachine {
    /// New machines start unconfigured
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            state: LifecycleState::Unconfigured,
            previous_state: LifecycleState::Unconfigured,
            state_change_time: Instant::now(),
            last_error: None,
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn previous_state(&self) -> LifecycleState {
        self.previous_state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn time_in_current_state(&self) -> Duration {
        self.state_change_time.elapsed()
    }

    /// Resolve the target of `transition` without changing state
    pub fn check(&self, transition: Transition) -> CambufferResult<LifecycleState> {
        transition
            .target(self.state)
            .ok_or(CambufferError::InvalidTransition {
                from: self.state,
                transition,
            })
    }

    /// Apply `transition`; on rejection the state is left untouched
    pub fn apply(&mut self, transition: Transition) -> CambufferResult<LifecycleState> {
        match self.check(transition) {
            Ok(target) => {
                log::info!(
                    "[{}] {} -> {} ({})",
                    self.node_name,
                    self.state,
                    target,
                    transition
                );
                self.set_state(target);
                Ok(target)
            }
            Err(e) => {
                log::warn!("[{}] {}", self.node_name, e);
                Err(e)
            }
        }
    }

    /// Move to `error_processing` after an internal fault.
    ///
    /// Returns false when the machine is already finalized.
    pub fn fault(&mut self, reason: impl Into<String>) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        let reason = reason.into();
        log::error!("[{}] fault in state {}: {}", self.node_name, self.state, reason);
        self.last_error = Some(reason);
        self.set_state(LifecycleState::ErrorProcessing);
        true
    }

    fn set_state(&mut self, new_state: LifecycleState) {
        if self.state != new_state {
            self.previous_state = self.state;
            self.state = new_state;
            self.state_change_time = Instant::now();
        }
    }
}
