//! GPIO / peripheral pin assignments for the eArm controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Joint servos (LEDC, one channel each)
// ---------------------------------------------------------------------------

/// Joint A: base rotation.
pub const SERVO_A_GPIO: i32 = 4;
/// Joint B: shoulder.
pub const SERVO_B_GPIO: i32 = 5;
/// Joint C: elbow.
pub const SERVO_C_GPIO: i32 = 6;
/// Joint D: gripper.
pub const SERVO_D_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Passive buzzer
// ---------------------------------------------------------------------------

/// Passive buzzer, driven by its own LEDC timer.
pub const BUZZER_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Standard hobby-servo refresh rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC resolution for the servo timer.  14 bits at 50 Hz gives ~1.2 µs steps.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Buzzer tone frequency when the indicator is on.
pub const BUZZER_PWM_FREQ_HZ: u32 = 1_000;
/// LEDC resolution for the buzzer timer.
pub const BUZZER_PWM_RESOLUTION_BITS: u32 = 10;

