//! Lifecycle owner for the runners and the command server.
//!
//! ```text
//! start():  validate ─▶ build servos ─▶ bind ─▶ home ─▶ spawn joint-a..d ─▶ spawn web
//!                   (any failure here: spawned tasks are joined, every servo released)
//!
//! shutdown(): raise stop ─▶ stop_all ─▶ grace ─▶ join runners ─▶ release all
//!                                                 ─▶ join web ─▶ silence buzzer
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use embedded_hal::pwm::SetDutyCycle;
use log::{error, info, warn};

use crate::config::ArmConfig;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::hw_init::ArmOutputs;
use crate::drivers::servo::Servo;
use crate::drivers::task_pin::{
    PinnedSpawner, RUNNER_PRIORITY, RUNNER_STACK_KB, SERVER_PRIORITY, SERVER_STACK_KB, TaskSpawner,
};
use crate::error::{CommsError, Result};
use crate::web::server::CommandServer;

use super::events::AppEvent;
use super::ports::EventSink;
use super::runner::JointRunner;
use super::service::ArmService;
use super::state::{CommandState, JOINT_COUNT, JointId, StopSignal};

/// Task names, null-terminated for the FreeRTOS side.
const RUNNER_TASK_NAMES: [&str; JOINT_COUNT] = ["joint-a\0", "joint-b\0", "joint-c\0", "joint-d\0"];
const SERVER_TASK_NAME: &str = "web\0";

type ServerHandle<P, S> = JoinHandle<ArmService<Buzzer<P>, S>>;
/// `None` only if the task was dropped before it could take its runner.
type RunnerHandle<P> = JoinHandle<Option<Servo<P>>>;

/// A runner on its way into its task.  Dropped untaken, it releases the
/// servo so a failed spawn leaves no joint driven.
struct PendingRunner<P: SetDutyCycle, S: EventSink>(Option<JointRunner<P, S>>);

impl<P: SetDutyCycle, S: EventSink> PendingRunner<P, S> {
    fn run(mut self, stop: &StopSignal) -> Option<Servo<P>> {
        self.0.take().map(|runner| runner.run(stop))
    }
}

impl<P: SetDutyCycle, S: EventSink> Drop for PendingRunner<P, S> {
    fn drop(&mut self) {
        if let Some(runner) = self.0.take() {
            let mut servo = runner.into_servo();
            servo.release();
        }
    }
}

/// Undo a partial start.
fn abort_start<P: SetDutyCycle>(
    stop: &StopSignal,
    runners: Vec<(JointId, RunnerHandle<P>)>,
    unspawned: impl IntoIterator<Item = Servo<P>>,
) {
    stop.raise();
    for mut servo in unspawned {
        servo.release();
    }
    for (joint, handle) in runners {
        match handle.join() {
            Ok(Some(mut servo)) => servo.release(),
            Ok(None) => {}
            Err(_) => warn!("Supervisor: joint {} runner panicked", joint),
        }
    }
}

pub struct Supervisor<P, S> {
    state: Arc<CommandState>,
    stop: StopSignal,
    runners: Vec<(JointId, RunnerHandle<P>)>,
    server: Option<ServerHandle<P, S>>,
    local_addr: SocketAddr,
    grace: Duration,
    sink: S,
}

impl<P, S> Supervisor<P, S>
where
    P: SetDutyCycle + Send + 'static,
    S: EventSink + Clone + Send + 'static,
{
    /// Start everything, listening on every interface at the configured port.
    pub fn start(config: &ArmConfig, outputs: ArmOutputs<P>, sink: S) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
        Self::start_on(addr, config, outputs, sink)
    }

    /// Start everything, listening on `addr`.
    pub fn start_on(
        addr: SocketAddr,
        config: &ArmConfig,
        outputs: ArmOutputs<P>,
        sink: S,
    ) -> Result<Self> {
        Self::start_with(addr, config, outputs, sink, &PinnedSpawner)
    }

    /// [`start_on`](Self::start_on) with tasks created by `spawner`.
    pub fn start_with<T: TaskSpawner>(
        addr: SocketAddr,
        config: &ArmConfig,
        outputs: ArmOutputs<P>,
        mut sink: S,
        spawner: &T,
    ) -> Result<Self> {
        config.validate()?;

        // Fail fast: every servo is constructed before anything moves.
        let mut servos = Vec::with_capacity(JOINT_COUNT);
        for (joint, pwm) in config.joints.iter().zip(outputs.servos) {
            servos.push(Servo::new(joint, &config.servo, pwm)?);
        }

        let state = Arc::new(CommandState::new());
        let stop = StopSignal::new();

        let service = ArmService::new(
            Arc::clone(&state),
            config.joints.map(|j| j.polarity),
            Buzzer::new(outputs.buzzer),
            sink.clone(),
        );
        let server = CommandServer::bind_addr(addr, &config.server, service)?;
        let local_addr = server
            .local_addr()
            .map_err(|_| CommsError::BindFailed(addr.port()))?;

        for (servo, joint) in servos.iter_mut().zip(config.joints.iter()) {
            let angle = servo.set_angle(f32::from(joint.initial_angle));
            sink.emit(&AppEvent::JointHomed {
                joint: joint.id,
                angle,
            });
        }

        let mut runners = Vec::with_capacity(JOINT_COUNT);
        let mut unspawned = servos.into_iter().zip(config.joints.iter());
        while let Some((servo, joint)) = unspawned.next() {
            let runner = PendingRunner(Some(JointRunner::new(
                servo,
                Arc::clone(&state),
                sink.clone(),
                config.motion,
                joint.power_save,
            )));
            let task_stop = stop.clone();
            let handle = spawner.spawn(
                RUNNER_TASK_NAMES[joint.id.index()],
                RUNNER_PRIORITY,
                RUNNER_STACK_KB,
                move || runner.run(&task_stop),
            );
            match handle {
                Ok(h) => runners.push((joint.id, h)),
                Err(e) => {
                    error!("Supervisor: joint {} runner failed to start: {}", joint.id, e);
                    abort_start(&stop, runners, unspawned.map(|(servo, _)| servo));
                    return Err(e);
                }
            }
        }

        let task_stop = stop.clone();
        let server = match spawner.spawn(SERVER_TASK_NAME, SERVER_PRIORITY, SERVER_STACK_KB, move || {
            server.run(&task_stop)
        }) {
            Ok(h) => h,
            Err(e) => {
                error!("Supervisor: command server failed to start: {}", e);
                abort_start(&stop, runners, core::iter::empty());
                return Err(e);
            }
        };

        sink.emit(&AppEvent::Started { listen: local_addr });

        Ok(Self {
            state,
            stop,
            runners,
            server: Some(server),
            local_addr,
            grace: Duration::from_millis(u64::from(config.motion.shutdown_grace_ms)),
            sink,
        })
    }

    pub fn state(&self) -> &Arc<CommandState> {
        &self.state
    }

    /// Clone of the stop flag; raising it makes
    /// [`run_until_stopped`](Self::run_until_stopped) return.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Park the caller until the stop flag is raised, then shut down.
    pub fn run_until_stopped(self) {
        while !self.stop.is_raised() {
            std::thread::sleep(self.grace);
        }
        self.shutdown();
    }

    /// Stop every task and leave every output released.
    pub fn shutdown(mut self) {
        info!("Supervisor: shutting down");
        self.stop.raise();
        self.state.stop_all();
        std::thread::sleep(self.grace);

        for (joint, handle) in self.runners.drain(..) {
            match handle.join() {
                Ok(Some(mut servo)) => servo.release(),
                Ok(None) => {}
                Err(_) => warn!("Supervisor: joint {} runner panicked", joint),
            }
        }

        if let Some(server) = self.server.take() {
            match server.join() {
                Ok(mut service) => service.halt(),
                Err(_) => warn!("Supervisor: command server panicked"),
            }
        }

        self.sink.emit(&AppEvent::Stopped);
    }
}
