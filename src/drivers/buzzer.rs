//! Passive buzzer driver.
//!
//! The LEDC timer behind the channel runs at the tone frequency
//! (`pins::BUZZER_PWM_FREQ_HZ`); switching the duty between 50 % and 0 %
//! turns the tone on and off.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::IndicatorPort;

pub struct Buzzer<P> {
    pwm: P,
    on: bool,
}

impl<P: SetDutyCycle> Buzzer<P> {
    /// Take the channel and make sure it starts silent.
    pub fn new(pwm: P) -> Self {
        let mut buzzer = Self { pwm, on: false };
        buzzer.off();
        buzzer
    }

    pub fn on(&mut self) {
        if let Err(e) = self.pwm.set_duty_cycle_percent(50) {
            warn!("Buzzer: PWM write failed: {:?}", e);
        }
        self.on = true;
    }

    pub fn off(&mut self) {
        if let Err(e) = self.pwm.set_duty_cycle_fully_off() {
            warn!("Buzzer: PWM write failed: {:?}", e);
        }
        self.on = false;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: SetDutyCycle> IndicatorPort for Buzzer<P> {
    fn set_indicator(&mut self, on: bool) {
        if on {
            self.on();
        } else {
            self.off();
        }
    }

    fn is_indicator_on(&self) -> bool {
        self.is_on()
    }
}
