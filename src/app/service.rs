//! Application service: the command side of the hexagonal core.
//!
//! [`ArmService`] turns [`ArmCommand`]s into [`CommandState`] writes and
//! indicator output.  It never touches the servos: the joint runners pick
//! up mode changes on their next tick.
//!
//! ```text
//!  ArmCommand ──▶ ┌────────────────────┐ ──▶ CommandState (modes, indicator)
//!                 │     ArmService     │
//!                 │ polarity · logging │ ──▶ IndicatorPort
//!                 └────────────────────┘ ──▶ EventSink
//! ```

use std::sync::Arc;

use log::debug;

use crate::config::Polarity;

use super::commands::{ArmCommand, Button};
use super::events::AppEvent;
use super::ports::{EventSink, IndicatorPort};
use super::state::{CommandState, JOINT_COUNT, JointId, MotionMode, StateSnapshot};

pub struct ArmService<I, S> {
    state: Arc<CommandState>,
    polarity: [Polarity; JOINT_COUNT],
    indicator: I,
    sink: S,
}

impl<I: IndicatorPort, S: EventSink> ArmService<I, S> {
    pub fn new(
        state: Arc<CommandState>,
        polarity: [Polarity; JOINT_COUNT],
        indicator: I,
        sink: S,
    ) -> Self {
        Self {
            state,
            polarity,
            indicator,
            sink,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply one command.  Total: every command maps to exactly one field
    /// write.
    pub fn handle_command(&mut self, cmd: ArmCommand) {
        match cmd {
            ArmCommand::Press { joint, button } => {
                let mode = self.mode_for(joint, button);
                self.set_mode(joint, mode);
            }
            ArmCommand::Release { joint } => {
                self.set_mode(joint, MotionMode::Idle);
            }
            ArmCommand::Indicator(on) => {
                self.indicator.set_indicator(on);
                self.state.set_indicator(on);
                self.sink.emit(&AppEvent::IndicatorChanged(on));
            }
        }
    }

    /// Mode a button engages on `joint`, honouring its wiring polarity.
    pub fn mode_for(&self, joint: JointId, button: Button) -> MotionMode {
        let polarity = self.polarity[joint.index()];
        match button {
            Button::Minus => polarity.minus(),
            Button::Plus => polarity.plus(),
        }
    }

    fn set_mode(&mut self, joint: JointId, mode: MotionMode) {
        let prev = self.state.mode(joint);
        self.state.set_mode(joint, mode);
        if prev == mode {
            debug!("Joint {}: mode {:?} unchanged", joint, mode);
        } else {
            self.sink.emit(&AppEvent::ModeChanged { joint, mode });
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Stop all motion and silence the indicator.
    pub fn halt(&mut self) {
        self.state.stop_all();
        if self.indicator.is_indicator_on() {
            self.handle_command(ArmCommand::Indicator(false));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &Arc<CommandState> {
        &self.state
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}
