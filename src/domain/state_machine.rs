use crate::domain::models::SpringError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Animating,
    Disposed,
}

/// Lifecycle of one animation controller. `Disposed` is terminal.
#[derive(Debug, Clone)]
pub struct ControllerMachine {
    state: ControllerState,
}

impl ControllerMachine {
    pub fn new() -> Self {
        Self {
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == ControllerState::Disposed
    }

    pub fn ensure_usable(&self, operation: &'static str) -> Result<(), SpringError> {
        if self.is_disposed() {
            return Err(SpringError::disposed(operation));
        }
        Ok(())
    }

    pub fn begin(&mut self, operation: &'static str) -> Result<(), SpringError> {
        self.ensure_usable(operation)?;
        self.state = ControllerState::Animating;
        Ok(())
    }

    pub fn rest(&mut self, operation: &'static str) -> Result<(), SpringError> {
        self.ensure_usable(operation)?;
        self.state = ControllerState::Idle;
        Ok(())
    }

    pub fn settle(&mut self) {
        if self.state == ControllerState::Animating {
            self.state = ControllerState::Idle;
        }
    }

    pub fn dispose(&mut self) {
        self.state = ControllerState::Disposed;
    }
}

impl Default for ControllerMachine {
    fn default() -> Self {
        Self::new()
    }
}
