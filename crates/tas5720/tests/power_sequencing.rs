//! Power sequencing and fault monitoring with the runner live.
//!
//! Each test drives the driver's background future next to a test script on
//! one current-thread runtime, with the embassy-time std driver supplying real
//! time. Waits poll the mock's journal instead of sleeping fixed amounts.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Instant, Timer};
use platform::mocks::{AccessKind, MockBusError, MockRegisterMap};
use platform::PipelinePower;
use tas5720::config::{FAULT_CHECK_INTERVAL, SETTLE_TIME};
use tas5720::registers::{REG_FAULT, REG_POWER_CTRL};
use tas5720::{Error, PowerState, Tas5720};

type Amp = Tas5720<NoopRawMutex, MockRegisterMap>;

async fn probed(regs: &MockRegisterMap) -> Amp {
    let amp = Amp::probe(regs.clone()).await.unwrap();
    regs.clear_journal();
    amp
}

async fn wait_for_polls(regs: &MockRegisterMap, count: usize) {
    while regs.reads_of(REG_FAULT) < count {
        Timer::after(Duration::from_millis(5)).await;
    }
}

fn power_writes(regs: &MockRegisterMap) -> Vec<u8> {
    regs.writes()
        .into_iter()
        .filter(|(reg, _)| *reg == REG_POWER_CTRL)
        .map(|(_, value)| value)
        .collect()
}

#[tokio::test]
async fn test_activate_wakes_then_settles_then_schedules_monitor() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        let before = Instant::now();
        amp.on_activate().await.unwrap();
        assert!(Instant::now() >= before + SETTLE_TIME);
        assert_eq!(amp.power_state(), PowerState::Active);
        assert!(amp.is_active());
        assert!(amp.is_monitoring());

        wait_for_polls(&regs, 1).await;
        let journal = regs.journal();
        let wake = journal
            .iter()
            .find(|a| a.kind == AccessKind::Write && a.reg == REG_POWER_CTRL)
            .unwrap();
        assert_eq!(wake.value & 0x01, 0x01);
        let first_poll = journal
            .iter()
            .find(|a| a.kind == AccessKind::Read && a.reg == REG_FAULT)
            .unwrap();
        assert!(first_poll.at >= wake.at + SETTLE_TIME + FAULT_CHECK_INTERVAL);

        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;
}

#[tokio::test]
async fn test_polls_at_fixed_interval() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 3).await;
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;

    let polls: Vec<Instant> = regs
        .journal()
        .into_iter()
        .filter(|a| a.kind == AccessKind::Read && a.reg == REG_FAULT)
        .map(|a| a.at)
        .collect();
    assert!(polls.len() >= 3);
    // Deadlines run from the start of each firing, a tick before its read.
    let slack = Duration::from_millis(1);
    for pair in polls.windows(2) {
        assert!(pair[1] + slack >= pair[0] + FAULT_CHECK_INTERVAL);
    }
}

#[tokio::test]
async fn test_deactivate_stops_monitor_then_shuts_down() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 1).await;

        amp.on_deactivate().await.unwrap();
        assert_eq!(amp.power_state(), PowerState::Shutdown);
        assert!(!amp.is_monitoring());

        let polls_at_stop = regs.reads_of(REG_FAULT);
        Timer::after(FAULT_CHECK_INTERVAL * 3).await;
        assert_eq!(regs.reads_of(REG_FAULT), polls_at_stop, "poll after deactivation");
    };
    select(amp.run(), script).await;

    let journal = regs.journal();
    let last = journal.last().unwrap();
    assert_eq!(last.kind, AccessKind::Write);
    assert_eq!(last.reg, REG_POWER_CTRL);
    assert_eq!(last.value & 0x01, 0x00);
}

#[tokio::test]
async fn test_deactivate_waits_for_in_flight_poll() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 1).await;
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;

    // Every fault read precedes the shutdown write.
    let journal = regs.journal();
    let shutdown_at = journal
        .iter()
        .rposition(|a| a.kind == AccessKind::Write && a.reg == REG_POWER_CTRL)
        .unwrap();
    assert!(journal
        .iter()
        .skip(shutdown_at)
        .all(|a| a.reg != REG_FAULT));
}

#[tokio::test]
async fn test_failed_wake_does_not_start_monitor() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;
    regs.fail_writes(REG_POWER_CTRL, 1);

    let script = async {
        assert_eq!(amp.on_activate().await, Err(Error::Bus(MockBusError)));
        assert_eq!(amp.power_state(), PowerState::Shutdown);
        assert!(!amp.is_monitoring());
        Timer::after(FAULT_CHECK_INTERVAL + SETTLE_TIME * 2).await;
        assert_eq!(regs.reads_of(REG_FAULT), 0);
    };
    select(amp.run(), script).await;
}

#[tokio::test]
async fn test_failed_shutdown_write_is_reported() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        regs.fail_writes(REG_POWER_CTRL, 1);
        assert_eq!(amp.on_deactivate().await, Err(Error::Bus(MockBusError)));
        assert_eq!(amp.power_state(), PowerState::Shutdown);
        assert!(!amp.is_monitoring());
    };
    select(amp.run(), script).await;
}

#[tokio::test]
async fn test_activate_twice_is_noop() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        let wakes = power_writes(&regs).len();
        amp.on_activate().await.unwrap();
        assert_eq!(power_writes(&regs).len(), wakes);
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;
}

#[tokio::test]
async fn test_fault_edges_reported_once_per_occurrence() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;
    regs.script_reads(REG_FAULT, [0x00, 0x04, 0x04, 0x00, 0x04].map(Ok));

    let script = async {
        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 5).await;
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;

    assert_eq!(amp.fault_reports(), 2);
    // Recovery pulse on each faulted poll (2, 3, 5): off then on.
    assert_eq!(
        power_writes(&regs),
        vec![0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00]
    );
}

#[tokio::test]
async fn test_recovery_pulse_survives_failed_off_write() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;
    regs.script_reads(REG_FAULT, [Ok(0x01)]);

    let script = async {
        amp.on_activate().await.unwrap();
        regs.fail_writes(REG_POWER_CTRL, 1);
        wait_for_polls(&regs, 2).await;
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;

    // wake, pulse off (failed), pulse on, shutdown
    assert_eq!(power_writes(&regs), vec![0x01, 0x00, 0x01, 0x00]);
    assert!(!regs.journal().iter().filter(|a| a.kind == AccessKind::Write).nth(1).unwrap().ok);
}

#[tokio::test]
async fn test_failed_poll_keeps_monitor_running() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;
    regs.script_reads(REG_FAULT, [Err(MockBusError), Ok(0x02)]);

    let script = async {
        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 2).await;
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;

    assert_eq!(amp.fault_reports(), 1);
}

#[tokio::test]
async fn test_reactivation_clears_fault_history() {
    let regs = MockRegisterMap::new().with_register(REG_FAULT, 0x04);
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 1).await;
        amp.on_deactivate().await.unwrap();
        assert_eq!(amp.fault_reports(), 1);

        amp.on_activate().await.unwrap();
        wait_for_polls(&regs, 2).await;
        amp.on_deactivate().await.unwrap();
    };
    select(amp.run(), script).await;

    // Same persistent fault, reported again after the fresh activation.
    assert_eq!(amp.fault_reports(), 2);
}

#[tokio::test]
async fn test_remove_while_active_shuts_down() {
    let regs = MockRegisterMap::new();
    let amp = probed(&regs).await;

    let script = async {
        amp.on_activate().await.unwrap();
        amp.remove().await.unwrap();
        assert!(!amp.is_monitoring());
        assert_eq!(amp.power_state(), PowerState::Shutdown);
    };
    select(amp.run(), script).await;

    assert_eq!(power_writes(&regs).last(), Some(&0x00));
}
