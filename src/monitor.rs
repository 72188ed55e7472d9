//! Run monitor
//!
//! Drives a single run from creation to a terminal or actionable state via
//! bounded polling. The loop is an explicit state machine over an injected
//! clock, so tests simulate time without real delays, and it honors a
//! caller-supplied cancellation flag at poll-interval granularity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::MonitorConfig;
use crate::error::{LiftgateError, LiftgateResult};
use crate::gateway::Gateway;
use crate::models::Run;

/// Clock abstraction so the poll loop can be tested without sleeping
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::time`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Bounds for one wait
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&MonitorConfig> for WaitOptions {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Poll a run until it reaches a terminal state or stops for confirmation.
///
/// Returns the run as soon as its state is no longer in-flight - the caller
/// inspects whether that state is FINISHED, a failure state, or UNCONFIRMED;
/// the monitor does not interpret it. Fails with `RunTimedOut` only when the
/// deadline lapses with the run still in-flight, and with `WaitInterrupted`
/// when `running` drops to false. Wall-clock time never exceeds the timeout
/// by more than one poll interval.
pub fn await_run(
    gateway: &dyn Gateway,
    clock: &dyn Clock,
    run_id: &str,
    options: WaitOptions,
    running: &AtomicBool,
) -> LiftgateResult<Run> {
    let deadline = clock.now() + options.timeout;

    loop {
        let run = gateway.run(run_id)?;

        if !run.state.is_in_flight() {
            // Terminal or UNCONFIRMED: a stopping point, never a sleep
            return Ok(run);
        }

        if !running.load(Ordering::SeqCst) {
            return Err(LiftgateError::WaitInterrupted {
                run_id: run_id.to_string(),
                last_state: run.state,
            });
        }

        if clock.now() >= deadline {
            return Err(LiftgateError::RunTimedOut {
                run_id: run_id.to_string(),
                last_state: run.state,
            });
        }

        clock.sleep(options.poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::gateway::testing::ScriptedGateway;
    use crate::models::RunState;

    /// Clock that only moves when slept on
    struct ManualClock {
        base: Instant,
        elapsed: Cell<Duration>,
        sleeps: Cell<usize>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                elapsed: Cell::new(Duration::ZERO),
                sleeps: Cell::new(0),
            }
        }

        fn elapsed(&self) -> Duration {
            self.elapsed.get()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + self.elapsed.get()
        }

        fn sleep(&self, duration: Duration) {
            self.elapsed.set(self.elapsed.get() + duration);
            self.sleeps.set(self.sleeps.get() + 1);
        }
    }

    fn options(timeout_secs: u64, poll_secs: u64) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_secs(poll_secs),
        }
    }

    #[test]
    fn test_await_run_returns_finished_without_extra_sleep() {
        let gateway = ScriptedGateway::with_run_script(&[
            RunState::Queued,
            RunState::Running,
            RunState::Finished,
        ]);
        let clock = ManualClock::new();
        let running = AtomicBool::new(true);

        let run = await_run(&gateway, &clock, "run-1", options(100, 10), &running).unwrap();

        assert_eq!(run.state, RunState::Finished);
        assert_eq!(gateway.run_fetches.get(), 3);
        // One sleep between each fetch, none after the terminal observation
        assert_eq!(clock.sleeps.get(), 2);
    }

    #[test]
    fn test_await_run_returns_failed_as_success_path() {
        let gateway = ScriptedGateway::with_run_script(&[RunState::Running, RunState::Failed]);
        let clock = ManualClock::new();
        let running = AtomicBool::new(true);

        // A failure state is still a terminal answer, not a monitor error
        let run = await_run(&gateway, &clock, "run-1", options(100, 10), &running).unwrap();
        assert_eq!(run.state, RunState::Failed);
    }

    #[test]
    fn test_await_run_times_out_within_one_extra_interval() {
        let gateway = ScriptedGateway::with_run_script(&[RunState::Running]);
        let clock = ManualClock::new();
        let running = AtomicBool::new(true);

        let err = await_run(&gateway, &clock, "run-1", options(60, 10), &running).unwrap_err();

        match err {
            LiftgateError::RunTimedOut { run_id, last_state } => {
                assert_eq!(run_id, "run-1");
                assert_eq!(last_state, RunState::Running);
            }
            other => panic!("expected RunTimedOut, got {other}"),
        }
        // Deadline 60s, interval 10s: last fetch happens at exactly 60s
        assert!(clock.elapsed() <= Duration::from_secs(70));
        assert_eq!(gateway.run_fetches.get(), 7);
    }

    #[test]
    fn test_await_run_unconfirmed_returns_immediately() {
        let gateway = ScriptedGateway::with_run_script(&[RunState::Unconfirmed]);
        let clock = ManualClock::new();
        let running = AtomicBool::new(true);

        let run = await_run(&gateway, &clock, "run-1", options(100, 10), &running).unwrap();

        assert_eq!(run.state, RunState::Unconfirmed);
        assert_eq!(gateway.run_fetches.get(), 1);
        assert_eq!(clock.sleeps.get(), 0);
    }

    #[test]
    fn test_await_run_interrupted_by_cancellation_flag() {
        let gateway = ScriptedGateway::with_run_script(&[RunState::Running]);
        let clock = ManualClock::new();
        let running = AtomicBool::new(false);

        let err = await_run(&gateway, &clock, "run-1", options(100, 10), &running).unwrap_err();

        assert!(matches!(err, LiftgateError::WaitInterrupted { .. }));
        // One fetch to learn the last known state, then out
        assert_eq!(gateway.run_fetches.get(), 1);
        assert_eq!(clock.sleeps.get(), 0);
    }

    #[test]
    fn test_await_run_propagates_gateway_failure() {
        let gateway = ScriptedGateway::default(); // empty script
        let clock = ManualClock::new();
        let running = AtomicBool::new(true);

        let err = await_run(&gateway, &clock, "run-1", options(100, 10), &running).unwrap_err();
        assert!(matches!(err, LiftgateError::RemoteOperationFailed { .. }));
    }
}
