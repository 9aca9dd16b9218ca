//! One-shot PWM output bring-up.
//!
//! Configures two LEDC timers (servo refresh and buzzer tone) and one
//! channel per output pin.  Called once from `main()` before the
//! supervisor starts.  On host the same shape is produced from
//! [`SimPwm`] channels.
//!
//! | Output   | Timer | Frequency | Resolution |
//! |----------|-------|-----------|------------|
//! | servo ×4 | 0     | 50 Hz     | 14 bit     |
//! | buzzer   | 1     | 1 kHz     | 10 bit     |

use crate::app::state::JOINT_COUNT;
use crate::drivers::sim_pwm::SimPwm;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// An LEDC timer refused its frequency/resolution pair.
    LedcTimerFailed(i32),
    /// An LEDC channel could not be bound to its pin.
    LedcChannelFailed { gpio: i32, rc: i32 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed { gpio, rc } => {
                write!(f, "LEDC channel on GPIO{} failed (rc={})", gpio, rc)
            }
        }
    }
}

impl core::error::Error for HwInitError {}

/// Every PWM output the arm needs, indexed like `JointId::ALL`.
pub struct ArmOutputs<P> {
    pub servos: [P; JOINT_COUNT],
    pub buzzer: P,
}

/// Host outputs with the same duty resolution as the device.
pub fn sim_outputs() -> ArmOutputs<SimPwm> {
    ArmOutputs {
        servos: core::array::from_fn(|_| SimPwm::new(pins::SERVO_PWM_RESOLUTION_BITS)),
        buzzer: SimPwm::new(pins::BUZZER_PWM_RESOLUTION_BITS),
    }
}

#[cfg(target_os = "espidf")]
pub use esp::init_outputs;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::gpio::AnyOutputPin;
    use esp_idf_hal::ledc::config::TimerConfig;
    use esp_idf_hal::ledc::{LEDC, LedcDriver, LedcTimerDriver, Resolution};
    use esp_idf_hal::units::Hertz;
    use log::info;

    use super::{ArmOutputs, HwInitError};
    use crate::config::ArmConfig;
    use crate::pins;

    fn resolution(bits: u32) -> Resolution {
        match bits {
            10 => Resolution::Bits10,
            13 => Resolution::Bits13,
            _ => Resolution::Bits14,
        }
    }

    /// Bring up the LEDC outputs on the pins named in `config`.
    ///
    /// The timer drivers are leaked: the channels reference them for the
    /// life of the firmware.
    pub fn init_outputs(
        ledc: LEDC,
        config: &ArmConfig,
    ) -> Result<ArmOutputs<LedcDriver<'static>>, HwInitError> {
        let servo_timer = LedcTimerDriver::new(
            ledc.timer0,
            &TimerConfig::default()
                .frequency(Hertz(config.servo.freq_hz))
                .resolution(resolution(pins::SERVO_PWM_RESOLUTION_BITS)),
        )
        .map_err(|e| HwInitError::LedcTimerFailed(e.code()))?;
        let servo_timer = &*Box::leak(Box::new(servo_timer));

        let buzzer_timer = LedcTimerDriver::new(
            ledc.timer1,
            &TimerConfig::default()
                .frequency(Hertz(pins::BUZZER_PWM_FREQ_HZ))
                .resolution(resolution(pins::BUZZER_PWM_RESOLUTION_BITS)),
        )
        .map_err(|e| HwInitError::LedcTimerFailed(e.code()))?;
        let buzzer_timer = &*Box::leak(Box::new(buzzer_timer));

        let [a, b, c, d] = config.joints.map(|j| j.gpio);
        let channel_err = |gpio: i32| move |e: esp_idf_hal::sys::EspError| HwInitError::LedcChannelFailed {
            gpio,
            rc: e.code(),
        };

        // SAFETY: `ArmConfig::validate` guarantees the five GPIOs are
        // distinct, and nothing else in the firmware claims them.
        let servos = unsafe {
            [
                LedcDriver::new(ledc.channel0, servo_timer, AnyOutputPin::new(a)).map_err(channel_err(a))?,
                LedcDriver::new(ledc.channel1, servo_timer, AnyOutputPin::new(b)).map_err(channel_err(b))?,
                LedcDriver::new(ledc.channel2, servo_timer, AnyOutputPin::new(c)).map_err(channel_err(c))?,
                LedcDriver::new(ledc.channel3, servo_timer, AnyOutputPin::new(d)).map_err(channel_err(d))?,
            ]
        };
        let gpio = config.buzzer_gpio;
        // SAFETY: as above.
        let buzzer = unsafe { LedcDriver::new(ledc.channel4, buzzer_timer, AnyOutputPin::new(gpio)) }
            .map_err(channel_err(gpio))?;

        info!(
            "hw_init: LEDC ready (servos GPIO{}/{}/{}/{} @ {} Hz, buzzer GPIO{})",
            a, b, c, d, config.servo.freq_hz, gpio
        );
        Ok(ArmOutputs { servos, buzzer })
    }
}
