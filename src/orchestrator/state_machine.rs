//! Finite state machine for the global database lifecycle
//!
//! A global database is declared in three steps: the primary regional
//! cluster, the task that promotes it to a global cluster, then any number of
//! attached secondaries. The machine only accepts events that are valid for
//! the current phase and records every transition it applies.

use std::fmt;

use crate::orchestrator::error::{Error, Result};

/// Phase of a global database's declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalClusterPhase {
    /// Nothing has been declared yet
    Unprovisioned,
    /// The primary regional cluster is declared but not promoted
    MasterOnly,
    /// The promotion is registered; `regions` counts member regions
    Global { regions: u32 },
}

impl fmt::Display for GlobalClusterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalClusterPhase::Unprovisioned => write!(f, "Unprovisioned"),
            GlobalClusterPhase::MasterOnly => write!(f, "MasterOnly"),
            GlobalClusterPhase::Global { regions } => write!(f, "Global({regions})"),
        }
    }
}

/// Events that drive the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalClusterEvent {
    /// The primary cluster and its instances were declared
    MasterDeclared,
    /// The "upgrade to global" task was registered
    UpgradeRegistered,
    /// An "add regional cluster" task was registered
    RegionalClusterAttached,
}

impl fmt::Display for GlobalClusterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalClusterEvent::MasterDeclared => write!(f, "MasterDeclared"),
            GlobalClusterEvent::UpgradeRegistered => write!(f, "UpgradeRegistered"),
            GlobalClusterEvent::RegionalClusterAttached => write!(f, "RegionalClusterAttached"),
        }
    }
}

/// An applied (or proposed) transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: GlobalClusterPhase,
    pub to: GlobalClusterPhase,
    pub event: GlobalClusterEvent,
    /// Human-readable description of this transition
    pub description: &'static str,
}

/// Result of attempting a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    Success(Transition),
    InvalidTransition {
        current: GlobalClusterPhase,
        event: GlobalClusterEvent,
    },
}

/// State machine for one global database
#[derive(Debug, Clone)]
pub struct GlobalClusterStateMachine {
    phase: GlobalClusterPhase,
    history: Vec<Transition>,
}

impl Default for GlobalClusterStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalClusterStateMachine {
    pub fn new() -> Self {
        Self {
            phase: GlobalClusterPhase::Unprovisioned,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> GlobalClusterPhase {
        self.phase
    }

    /// Transitions applied so far, oldest first
    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Number of member regions (0 until the promotion is registered)
    pub fn region_count(&self) -> u32 {
        match self.phase {
            GlobalClusterPhase::Global { regions } => regions,
            _ => 0,
        }
    }

    /// Compute the transition `event` would cause, without applying it
    pub fn transition(&self, event: GlobalClusterEvent) -> TransitionResult {
        let next = match (self.phase, event) {
            (GlobalClusterPhase::Unprovisioned, GlobalClusterEvent::MasterDeclared) => Some((
                GlobalClusterPhase::MasterOnly,
                "Primary regional cluster declared",
            )),
            (GlobalClusterPhase::MasterOnly, GlobalClusterEvent::UpgradeRegistered) => Some((
                GlobalClusterPhase::Global { regions: 1 },
                "Promotion to a global cluster registered",
            )),
            (
                GlobalClusterPhase::Global { regions },
                GlobalClusterEvent::RegionalClusterAttached,
            ) => regions.checked_add(1).map(|regions| {
                (
                    GlobalClusterPhase::Global { regions },
                    "Secondary regional cluster attached",
                )
            }),
            _ => None,
        };

        match next {
            Some((to, description)) => TransitionResult::Success(Transition {
                from: self.phase,
                to,
                event,
                description,
            }),
            None => TransitionResult::InvalidTransition {
                current: self.phase,
                event,
            },
        }
    }

    /// Apply `event`, returning the new phase
    pub fn apply(&mut self, event: GlobalClusterEvent) -> Result<GlobalClusterPhase> {
        match self.transition(event) {
            TransitionResult::Success(transition) => {
                tracing::debug!(
                    from = %transition.from,
                    to = %transition.to,
                    event = %transition.event,
                    "{}",
                    transition.description
                );
                self.phase = transition.to;
                self.history.push(transition);
                Ok(self.phase)
            }
            TransitionResult::InvalidTransition { current, event } => {
                Err(Error::InvalidTransition {
                    phase: current,
                    event,
                })
            }
        }
    }

    /// Check if `event` is valid in the current phase
    pub fn can_transition(&self, event: GlobalClusterEvent) -> bool {
        matches!(self.transition(event), TransitionResult::Success(_))
    }

    /// Every event valid in the current phase
    pub fn valid_events(&self) -> Vec<GlobalClusterEvent> {
        [
            GlobalClusterEvent::MasterDeclared,
            GlobalClusterEvent::UpgradeRegistered,
            GlobalClusterEvent::RegionalClusterAttached,
        ]
        .into_iter()
        .filter(|event| self.can_transition(*event))
        .collect()
    }
}
