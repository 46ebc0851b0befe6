//! Cancelable fixed-period task
//!
//! [`PeriodicTask`] is a handle/runner pair in one value. Control calls
//! ([`start`](PeriodicTask::start), [`stop`](PeriodicTask::stop)) come from
//! any context holding `&self`; [`run`](PeriodicTask::run) is a future that
//! never returns and must be polled by exactly one executor task for the
//! lifetime of the owner.
//!
//! # States
//!
//! ```text
//!           start(delay)              deadline reached
//!   Idle ───────────────► Scheduled ───────────────────► Running
//!    ▲                      │  ▲                            │
//!    │        stop()        │  └──── body finished ─────────┘
//!    └──────────────────────┘        (next = start + period)
//! ```
//!
//! `stop()` while `Running` waits for the body to finish. Once `stop()` has
//! returned no further firing begins until the next `start()`.

use core::cell::Cell;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

/// Lifecycle state of a [`PeriodicTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Not scheduled.
    Idle,
    /// Waiting for the next deadline.
    Scheduled,
    /// The body is executing.
    Running,
}

#[derive(Clone, Copy)]
enum Command {
    Start(Duration),
    Stop,
}

/// A recurring task that can be started with an initial delay and stopped
/// with a join on the in-flight firing.
pub struct PeriodicTask<M: RawMutex> {
    command: Signal<M, Command>,
    stopped: Signal<M, ()>,
    state: BlockingMutex<M, Cell<TaskState>>,
}

impl<M: RawMutex> PeriodicTask<M> {
    /// New, idle task.
    pub const fn new() -> Self {
        Self {
            command: Signal::new(),
            stopped: Signal::new(),
            state: BlockingMutex::new(Cell::new(TaskState::Idle)),
        }
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        self.state.lock(Cell::get)
    }

    /// `true` unless idle.
    pub fn is_active(&self) -> bool {
        self.state() != TaskState::Idle
    }

    /// Schedule the first firing `initial_delay` from now.
    ///
    /// Restarting an already scheduled task moves its next deadline.
    pub fn start(&self, initial_delay: Duration) {
        self.set_state(TaskState::Scheduled);
        self.command.signal(Command::Start(initial_delay));
    }

    /// Cancel the task, waiting for a firing in progress to complete.
    ///
    /// Returns immediately if the task is idle. Otherwise completes only once
    /// [`run`](Self::run) acknowledges, so the runner must be polled.
    pub async fn stop(&self) {
        if !self.is_active() {
            return;
        }
        self.stopped.reset();
        self.command.signal(Command::Stop);
        debug!("periodic task: waiting for runner to acknowledge stop");
        self.stopped.wait().await;
    }

    /// Drive the task: wait for `start`, then call `body` every `period`
    /// until `stop`.
    ///
    /// Deadlines are measured from the start of each firing, so a slow body
    /// does not stretch the period.
    pub async fn run<F, Fut>(&self, period: Duration, mut body: F) -> !
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            let mut next = match self.command.wait().await {
                Command::Start(delay) => deadline_after(Instant::now(), delay),
                Command::Stop => {
                    self.finish_stop();
                    continue;
                }
            };

            loop {
                // Commands are polled first so a stop wins over a due deadline.
                match select(self.command.wait(), Timer::at(next)).await {
                    Either::First(Command::Stop) => {
                        self.finish_stop();
                        break;
                    }
                    Either::First(Command::Start(delay)) => {
                        next = deadline_after(Instant::now(), delay);
                    }
                    Either::Second(()) => {
                        self.set_state(TaskState::Running);
                        let fired_at = Instant::now();
                        body().await;
                        next = deadline_after(fired_at, period);
                        self.set_state(TaskState::Scheduled);
                    }
                }
            }
        }
    }

    fn set_state(&self, state: TaskState) {
        self.state.lock(|s| s.set(state));
    }

    fn finish_stop(&self) {
        self.set_state(TaskState::Idle);
        self.stopped.signal(());
    }
}

impl<M: RawMutex> Default for PeriodicTask<M> {
    fn default() -> Self {
        Self::new()
    }
}

fn deadline_after(from: Instant, delay: Duration) -> Instant {
    from.checked_add(delay).unwrap_or(Instant::MAX)
}
