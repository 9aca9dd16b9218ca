//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ArmService / JointRunner (domain)
//! ```
//!
//! Servos are driven through `embedded_hal::pwm::SetDutyCycle` directly;
//! the ports here cover the indicator output and the event stream.

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → buzzer)
// ───────────────────────────────────────────────────────────────

/// Audible indicator output.
pub trait IndicatorPort {
    fn set_indicator(&mut self, on: bool);

    fn is_indicator_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go.  Each runner thread owns its own sink, so
/// implementations are usually cheap to clone.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
