use crate::{Error, Result};
use tracing::{debug, info, warn};

// Server lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Listening,
    ShuttingDown,
    Stopped,
}

// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Bound,
    ShutdownRequested,
    Drained,
    GraceElapsed,
    Failed,
}

/// How the shutdown phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished inside the grace period.
    Drained,
    /// The grace period ran out and remaining requests were abandoned.
    GraceElapsed,
}

pub struct LifecycleMachine {
    state: LifecycleState,
}

impl LifecycleMachine {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Starting,
        }
    }

    pub fn current_state(&self) -> LifecycleState {
        self.state
    }

    pub fn transition(&mut self, event: LifecycleEvent) -> Result<LifecycleState> {
        let old_state = self.state;
        debug!(
            "Lifecycle processing event {:?} in state {:?}",
            event, old_state
        );

        let new_state = match (old_state, event) {
            (LifecycleState::Starting, LifecycleEvent::Bound) => LifecycleState::Listening,
            (LifecycleState::Listening, LifecycleEvent::ShutdownRequested) => {
                LifecycleState::ShuttingDown
            }
            (
                LifecycleState::ShuttingDown,
                LifecycleEvent::Drained | LifecycleEvent::GraceElapsed,
            ) => LifecycleState::Stopped,
            (
                LifecycleState::Starting | LifecycleState::Listening | LifecycleState::ShuttingDown,
                LifecycleEvent::Failed,
            ) => LifecycleState::Stopped,
            _ => {
                warn!(
                    "Invalid lifecycle transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", old_state),
                    requested: format!("{:?}", event),
                });
            }
        };

        info!(
            "Server lifecycle: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        Ok(new_state)
    }

    pub fn is_terminal(&self) -> bool {
        self.state == LifecycleState::Stopped
    }
}

impl Default for LifecycleMachine {
    fn default() -> Self {
        Self::new()
    }
}
