//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::{AppEvent, ReleaseReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
///
/// Stateless, so every runner thread gets its own copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::JointHomed { joint, angle } => {
                info!("JOINT | {} homed to {:.0}\u{00b0}", joint, angle);
            }
            AppEvent::ModeChanged { joint, mode } => {
                info!("CMD | {} -> {}", joint, mode.as_str());
            }
            AppEvent::IndicatorChanged(on) => {
                info!("CMD | buzzer {}", if *on { "on" } else { "off" });
            }
            AppEvent::LimitReached { joint, angle } => {
                debug!("JOINT | {} at limit {:.0}\u{00b0}", joint, angle);
            }
            AppEvent::JointReleased {
                joint,
                angle,
                reason: ReleaseReason::PowerSave,
            } => {
                info!("JOINT | {} released at {:.0}\u{00b0} (power save)", joint, angle);
            }
            AppEvent::JointReleased {
                joint,
                angle,
                reason: ReleaseReason::Shutdown,
            } => {
                warn!("JOINT | {} released at {:.0}\u{00b0} (shutdown)", joint, angle);
            }
            AppEvent::JointReattached { joint, angle } => {
                info!("JOINT | {} reattached at {:.0}\u{00b0}", joint, angle);
            }
            AppEvent::Started { listen } => {
                info!("START | command server on {}", listen);
            }
            AppEvent::Stopped => {
                info!("STOP | all joints released");
            }
        }
    }
}
