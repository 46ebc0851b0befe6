//! TAS5720 device driver
//!
//! One [`Tas5720`] owns one amplifier's register map. The audio framework
//! talks to it through [`CodecDai`] and [`PipelinePower`]; the fault monitor
//! runs inside [`Tas5720::run`], which the host spawns once after probing:
//!
//! ```rust,ignore
//! static AMP: StaticCell<Tas5720<CriticalSectionRawMutex, I2cRegmap<I2c, REG_COUNT>>> = StaticCell::new();
//!
//! let amp = AMP.init(Tas5720::probe_i2c(i2c, config::I2C_ADDRESS).await?);
//! spawner.spawn(amp_task(amp))?;   // amp_task: loop forever in amp.run()
//! ```
//!
//! # Power sequencing
//!
//! ```text
//! on_activate:    SDZ=1 ── 25 ms ── clear fault history, schedule monitor ── Active
//! on_deactivate:  stop monitor (joins firing) ── Shutdown ── SDZ=0
//! ```
//!
//! The monitor is scheduled exactly while the device is `Active`.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;
use platform::{
    CodecDai, DaiCapabilities, DaiFormat, I2cRegmap, PipelinePower, RegisterMap, SampleFormat,
    StreamParams,
};

use crate::config::{self, FAULT_CHECK_INTERVAL, SETTLE_TIME};
use crate::controls::{self, AnalogGain, StereoVolume};
use crate::error::{Error, Result};
use crate::fault::{FaultCheck, FaultMonitor};
use crate::format;
use crate::monitor::PeriodicTask;
use crate::power::{self, PowerState};
use crate::registers::{
    AnalogCtrl, FaultStatus, VolumeCtrlCfg, DEVICE_ID, REG_ANALOG_CTRL, REG_COUNT, REG_DEVICE_ID,
    REG_VOLUME_CTRL_CFG,
};

/// What the DAI advertises for stream negotiation.
///
/// Two channels are accepted for hosts whose serial port cannot produce a
/// mono frame; the device plays the selected channel.
pub const DAI_CAPS: DaiCapabilities = DaiCapabilities {
    stream_name: config::STREAM_NAME,
    rates: &format::SUPPORTED_RATES,
    formats: &[
        SampleFormat::S16Le,
        SampleFormat::S18_3Le,
        SampleFormat::S20_3Le,
        SampleFormat::S24Le,
    ],
    channels_min: 1,
    channels_max: 2,
};

/// TAS5720 driver over register map `R`.
///
/// `M` selects the mutex flavour: `CriticalSectionRawMutex` when the
/// framework and the monitor run in different executors or interrupt
/// priorities, `NoopRawMutex` when everything runs in one executor.
pub struct Tas5720<M: RawMutex, R> {
    regs: Mutex<M, R>,
    power: BlockingMutex<M, Cell<PowerState>>,
    faults: FaultMonitor<M>,
    monitor: PeriodicTask<M>,
}

impl<M: RawMutex, I: I2c> Tas5720<M, I2cRegmap<I, REG_COUNT>> {
    /// Probe a device on `i2c` at 7-bit `address`.
    pub async fn probe_i2c(
        i2c: I,
        address: u8,
    ) -> Result<Self, platform::RegmapError<I::Error>> {
        Self::probe(I2cRegmap::new(i2c, config::regmap_config(address))).await
    }
}

impl<M: RawMutex, R: RegisterMap> Tas5720<M, R> {
    /// Identify and initialise the device, leaving it muted and in shutdown.
    ///
    /// After a matching identity read exactly three writes are issued, in
    /// order: reserved analog bit, mute, shutdown. Any failure aborts.
    pub async fn probe(mut regs: R) -> Result<Self, R::Error> {
        let found = regs.read(REG_DEVICE_ID).await.map_err(|e| {
            error!("tas5720: failed to read device ID register");
            Error::Bus(e)
        })?;
        if found != DEVICE_ID {
            error!(
                "tas5720: wrong device ID. expected: {} read: {}",
                DEVICE_ID,
                found
            );
            return Err(Error::DeviceNotFound {
                expected: DEVICE_ID,
                found,
            });
        }
        info!("tas5720: device ID {:#x}", found);

        Self::init_registers(&mut regs).await.map_err(|e| {
            error!("tas5720: error configuring device registers");
            Error::Bus(e)
        })?;

        Ok(Self {
            regs: Mutex::new(regs),
            power: BlockingMutex::new(Cell::new(PowerState::Shutdown)),
            faults: FaultMonitor::new(),
            monitor: PeriodicTask::new(),
        })
    }

    async fn init_registers(regs: &mut R) -> core::result::Result<(), R::Error> {
        let reserved = AnalogCtrl::RESERVED7.bits();
        regs.write_bits(REG_ANALOG_CTRL, reserved, reserved).await?;
        let mute = VolumeCtrlCfg::MUTE.bits();
        regs.write_bits(REG_VOLUME_CTRL_CFG, mute, mute).await?;
        power::set_sdz(regs, false).await
    }

    /// Detach: stop fault monitoring and park the device in shutdown.
    ///
    /// After this returns the runner stays idle and [`release`](Self::release)
    /// may take the register map back once the runner is dropped.
    pub async fn remove(&self) -> Result<(), R::Error> {
        self.monitor.stop().await;
        if self.power_state() == PowerState::Active {
            self.on_deactivate().await?;
        }
        debug!("tas5720: removed");
        Ok(())
    }

    /// Hand back the register map.
    pub fn release(self) -> R {
        self.regs.into_inner()
    }

    /// Background work: the fault monitor. Never returns.
    ///
    /// Must be polled for the whole lifetime of the driver, otherwise
    /// deactivation waits forever for the monitor to acknowledge its stop.
    pub async fn run(&self) -> ! {
        self.monitor
            .run(FAULT_CHECK_INTERVAL, move || async move {
                self.check_faults().await;
            })
            .await
    }

    /// One monitor firing. Only reached from [`run`](Self::run), and skipped
    /// outside `Active` so the recovery pulse can never wake a device that is
    /// meant to be in shutdown.
    async fn check_faults(&self) {
        if self.power_state() != PowerState::Active {
            debug!("tas5720: fault check skipped, device in shutdown");
            return;
        }
        let mut regs = self.regs.lock().await;
        if let FaultCheck::Faulted { present, .. } = self.faults.check(&mut *regs).await {
            debug!("tas5720: fault bits {:#x} present", present.bits());
        }
    }

    /// Current power state.
    pub fn power_state(&self) -> PowerState {
        self.power.lock(Cell::get)
    }

    /// `true` while the fault monitor is scheduled or running.
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_active()
    }

    /// Alertable faults seen by the last fault check.
    pub fn last_faults(&self) -> FaultStatus {
        self.faults.last()
    }

    /// Number of fault reports raised so far.
    pub fn fault_reports(&self) -> u32 {
        self.faults.reports()
    }

    /// Set both channel volumes.
    pub async fn set_volume(&self, volume: StereoVolume) -> Result<(), R::Error> {
        controls::set_volume(&mut *self.regs.lock().await, volume).await
    }

    /// Read both channel volumes.
    pub async fn volume(&self) -> Result<StereoVolume, R::Error> {
        controls::volume(&mut *self.regs.lock().await).await
    }

    /// Select the analog gain.
    pub async fn set_analog_gain(&self, gain: AnalogGain) -> Result<(), R::Error> {
        controls::set_analog_gain(&mut *self.regs.lock().await, gain).await
    }

    /// Select the analog gain by raw mixer value.
    pub async fn set_analog_gain_code(&self, code: u8) -> Result<(), R::Error> {
        controls::set_analog_gain_code(&mut *self.regs.lock().await, code).await
    }

    /// Current analog gain.
    pub async fn analog_gain(&self) -> Result<AnalogGain, R::Error> {
        controls::analog_gain(&mut *self.regs.lock().await).await
    }

    fn set_power_state(&self, state: PowerState) {
        self.power.lock(|s| s.set(state));
    }
}

impl<M: RawMutex, R: RegisterMap> CodecDai for Tas5720<M, R> {
    type Error = Error<R::Error>;

    async fn hw_params(&self, params: StreamParams) -> Result<(), R::Error> {
        format::apply_rate(&mut *self.regs.lock().await, params.rate).await
    }

    async fn set_fmt(&self, fmt: DaiFormat) -> Result<(), R::Error> {
        format::apply_format(&mut *self.regs.lock().await, fmt).await
    }

    async fn mute_stream(&self, mute: bool) -> Result<(), R::Error> {
        let bits = VolumeCtrlCfg::MUTE.bits();
        let value = if mute { bits } else { 0 };
        let mut regs = self.regs.lock().await;
        regs.update_bits(REG_VOLUME_CTRL_CFG, bits, value)
            .await
            .map_err(|e| {
                error!("tas5720: error (un-)muting device");
                Error::Bus(e)
            })?;
        Ok(())
    }
}

impl<M: RawMutex, R: RegisterMap> PipelinePower for Tas5720<M, R> {
    type Error = Error<R::Error>;

    async fn on_activate(&self) -> Result<(), R::Error> {
        if self.power_state() == PowerState::Active {
            return Ok(());
        }

        {
            let mut regs = self.regs.lock().await;
            power::set_sdz(&mut *regs, true).await.map_err(|e| {
                error!("tas5720: error waking device");
                Error::Bus(e)
            })?;
        }

        Timer::after(SETTLE_TIME).await;

        self.faults.reset();
        self.set_power_state(PowerState::Active);
        self.monitor.start(FAULT_CHECK_INTERVAL);
        info!("tas5720: active");
        Ok(())
    }

    /// Stops the fault monitor, then shuts the device down.
    ///
    /// Waits for [`Tas5720::run`] to acknowledge the stop, so the host must
    /// keep the runner polled while the device is active.
    async fn on_deactivate(&self) -> Result<(), R::Error> {
        self.monitor.stop().await;
        self.set_power_state(PowerState::Shutdown);

        let mut regs = self.regs.lock().await;
        power::set_sdz(&mut *regs, false).await.map_err(|e| {
            error!("tas5720: error shutting down device");
            Error::Bus(e)
        })?;
        info!("tas5720: shutdown");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.power_state() == PowerState::Active
    }
}
