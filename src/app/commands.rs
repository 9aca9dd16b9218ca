//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the web page
//! today) that the [`ArmService`](super::service::ArmService) interprets.

use super::state::JointId;

/// The two buttons shown for every joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Minus,
    Plus,
}

impl Button {
    pub const fn key_suffix(self) -> &'static str {
        match self {
            Self::Minus => "minus",
            Self::Plus => "plus",
        }
    }
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmCommand {
    /// A joint button was pressed: start moving in the button's direction.
    Press { joint: JointId, button: Button },

    /// A joint button was released: stop moving.
    Release { joint: JointId },

    /// Switch the audible indicator.
    Indicator(bool),
}
