//! Request routing.
//!
//! Maps a parsed request line onto at most one [`ArmCommand`].  Keys are
//! tried in a fixed order and the first one present decides the request:
//!
//! ```text
//! status_check ─▶ StatusCheck (no mutation)
//! a_minus, a_plus, b_minus, b_plus, c_minus, c_plus, d_minus, d_plus, buzzer
//!     └─ first present key ─▶ Command(Some(..))
//! nothing recognised ─▶ Command(None)
//! no query ─▶ StatusPage
//! ```

use crate::app::commands::{ArmCommand, Button};
use crate::app::state::JointId;

use super::request::{Query, RequestLine};

pub const STATUS_CHECK_KEY: &str = "status_check";
pub const BUZZER_KEY: &str = "buzzer";

/// Joint keys in dispatch order.
pub const JOINT_KEYS: [(&str, JointId, Button); 8] = [
    ("a_minus", JointId::A, Button::Minus),
    ("a_plus", JointId::A, Button::Plus),
    ("b_minus", JointId::B, Button::Minus),
    ("b_plus", JointId::B, Button::Plus),
    ("c_minus", JointId::C, Button::Minus),
    ("c_plus", JointId::C, Button::Plus),
    ("d_minus", JointId::D, Button::Minus),
    ("d_plus", JointId::D, Button::Plus),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// No query string: render the HTML status document.
    StatusPage,
    /// `status_check` present: plain `OK`, state untouched.
    StatusCheck,
    /// Acknowledge with an empty body, after applying the command if any.
    Command(Option<ArmCommand>),
}

pub fn route(req: &RequestLine<'_>) -> Route {
    match &req.query {
        None => Route::StatusPage,
        Some(q) if q.contains(STATUS_CHECK_KEY) => Route::StatusCheck,
        Some(q) => Route::Command(command_for(q)),
    }
}

fn command_for(q: &Query<'_>) -> Option<ArmCommand> {
    for (key, joint, button) in JOINT_KEYS {
        if let Some(value) = q.get(key) {
            return Some(if value == "1" {
                ArmCommand::Press { joint, button }
            } else {
                ArmCommand::Release { joint }
            });
        }
    }

    match q.get(BUZZER_KEY)? {
        "on" => Some(ArmCommand::Indicator(true)),
        "off" => Some(ArmCommand::Indicator(false)),
        _ => None,
    }
}
