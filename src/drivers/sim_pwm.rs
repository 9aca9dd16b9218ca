//! In-memory PWM channel for host builds and tests.
//!
//! Implements [`SetDutyCycle`] by storing the duty in an atomic.  Clones
//! share the same channel, so a test can keep one handle while the driver
//! owns the other and observe every write from any thread.

use core::convert::Infallible;
use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};
use std::sync::Arc;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

#[derive(Debug)]
struct Channel {
    duty: AtomicU16,
    writes: AtomicU32,
}

/// Simulated LEDC channel.
#[derive(Debug, Clone)]
pub struct SimPwm {
    channel: Arc<Channel>,
    max_duty: u16,
}

impl SimPwm {
    /// A channel with `resolution_bits` of duty resolution (max 16).
    pub fn new(resolution_bits: u32) -> Self {
        let bits = resolution_bits.clamp(1, 16);
        Self::with_max_duty(((1u32 << bits) - 1) as u16)
    }

    pub fn with_max_duty(max_duty: u16) -> Self {
        Self {
            channel: Arc::new(Channel {
                duty: AtomicU16::new(0),
                writes: AtomicU32::new(0),
            }),
            max_duty,
        }
    }

    /// Last duty written.
    pub fn duty(&self) -> u16 {
        self.channel.duty.load(Ordering::Acquire)
    }

    /// Number of duty writes since creation.
    pub fn writes(&self) -> u32 {
        self.channel.writes.load(Ordering::Acquire)
    }
}

impl ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.channel.duty.store(duty.min(self.max_duty), Ordering::Release);
        self.channel.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
