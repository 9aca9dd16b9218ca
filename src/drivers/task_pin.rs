//! Named thread spawning with explicit priority and stack.
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks.  `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.
//!
//! The ESP32-C3 has a single core; only priority and stack size are set.

use std::thread::JoinHandle;

use crate::error::Error;

/// Priority of the joint runner tasks.
pub const RUNNER_PRIORITY: u8 = 5;
/// Priority of the command server task.
pub const SERVER_PRIORITY: u8 = 4;
/// Stack for a joint runner.
pub const RUNNER_STACK_KB: usize = 4;
/// Stack for the command server (status page rendering lives here).
pub const SERVER_STACK_KB: usize = 8;

/// Spawn `f` as a named task.
///
/// `name` must be null-terminated (e.g. `"joint-a\0"`); the terminator is
/// stripped for the Rust-side thread name.
#[cfg(target_os = "espidf")]
pub fn spawn_task<T: Send + 'static>(
    name: &'static str,
    priority: u8,
    stack_kb: usize,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, Error> {
    // SAFETY: `name` is 'static and null-terminated; the config is consumed
    // by the spawn below on this same thread.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.prio = i32::from(priority);
        cfg.stack_size = (stack_kb * 1024) as _;
        cfg.thread_name = name.as_ptr() as *const _;
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        log::error!("esp_pthread_set_cfg failed for '{}': {}", name, ret);
        return Err(Error::Init("pthread config rejected"));
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' (pri={}, stack={}KB)",
        display_name,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}

/// Host fallback: priority is ignored.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task<T: Send + 'static>(
    name: &'static str,
    _priority: u8,
    stack_kb: usize,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, Error> {
    let display_name = name.trim_end_matches('\0');
    log::debug!("Spawning '{}' (sim, stack={}KB)", display_name, stack_kb);

    std::thread::Builder::new()
        .name(display_name.into())
        // Host test harness frames are larger than the device's.
        .stack_size(stack_kb.max(64) * 1024)
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}

/// Thread creation as a seam, so start-up can be driven with a spawner
/// that refuses some tasks.
pub trait TaskSpawner {
    fn spawn<T: Send + 'static>(
        &self,
        name: &'static str,
        priority: u8,
        stack_kb: usize,
        f: impl FnOnce() -> T + Send + 'static,
    ) -> Result<JoinHandle<T>, Error>;
}

/// Spawns through [`spawn_task`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PinnedSpawner;

impl TaskSpawner for PinnedSpawner {
    fn spawn<T: Send + 'static>(
        &self,
        name: &'static str,
        priority: u8,
        stack_kb: usize,
        f: impl FnOnce() -> T + Send + 'static,
    ) -> Result<JoinHandle<T>, Error> {
        spawn_task(name, priority, stack_kb, f)
    }
}
