//! Actuator drivers, PWM bring-up, and task spawning.

pub mod buzzer;
pub mod hw_init;
pub mod servo;
pub mod sim_pwm;
pub mod task_pin;
