//! Application core: arm domain logic.
//!
//! Command state shared between the web surface and the joint runners,
//! the per-joint automation loop, the command service and the supervisor
//! that owns their lifecycle.  Hardware is reached only through
//! `embedded_hal` PWM channels and the **port traits** in [`ports`], so
//! everything here runs on host against simulated outputs.

pub mod commands;
pub mod events;
pub mod ports;
pub mod runner;
pub mod service;
pub mod state;
pub mod supervisor;
