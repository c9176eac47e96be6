//! Long/flat position state machine.
//!
//! | state | prediction | signal | next |
//! |-------|------------|--------|------|
//! | Flat  | > 0        | Long   | Long |
//! | Flat  | <= 0       | -      | Flat |
//! | Long  | < 0        | Exit   | Flat |
//! | Long  | >= 0       | -      | Long |
//!
//! A zero prediction neither enters nor exits.

use serde::{Deserialize, Serialize};

use crate::domain::SignalDirection;

/// Exposure currently held by the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

/// Result of feeding one prediction to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: PositionState,
    pub signal: Option<SignalDirection>,
}

impl PositionState {
    /// Pure transition on the sign of `prediction`.
    pub fn transition(self, prediction: i8) -> Transition {
        match (self, prediction.signum()) {
            (Self::Flat, 1) => Transition {
                next: Self::Long,
                signal: Some(SignalDirection::Long),
            },
            (Self::Long, -1) => Transition {
                next: Self::Flat,
                signal: Some(SignalDirection::Exit),
            },
            (state, _) => Transition {
                next: state,
                signal: None,
            },
        }
    }

    pub fn is_long(self) -> bool {
        self == Self::Long
    }
}
