//! Accessory detection engine
//!
//! [`JackDetect`] owns every piece of mutable detection state behind a single
//! async mutex. Entry points (sense edges, button edges, override requests,
//! configuration) always take the power gate first and the lock second.
//!
//! # Pipeline
//!
//! ```text
//! tip sense edge ─► debounce (tip_sense_work) ─► type detect ─► load detect ─► report
//!                                                   │ open          │ mic
//!                                                   ▼               ▼
//!                                               MECHANICAL    HEADSET + buttons armed
//! ```
//!
//! Waits on hardware completions happen with the lock released; everything
//! before and after a wait happens with it held. Background jobs run through
//! [`JackDetect::run`], which the owner must poll for the engine's lifetime.

mod bias;
mod bias_sense;
mod button;
mod load_detect;
mod overrides;
mod sense;
mod type_detect;

pub use button::{comb_to_ohms, BUTTON_SETTLE};
pub use load_detect::{LoadResult, HP_TIMEOUT, LOAD_TIMEOUT};
pub use overrides::{JackOverride, RawCategory};
pub use type_detect::HsdetType;

use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use platform::{JackSink, JackStatus, PowerGate, RegisterPort};

use crate::completion::Completions;
use crate::config::{DetectionConfig, EncodedConfig};
use crate::error::DetectError;
use crate::registers as reg;
use crate::work::DelayedWork;

/// Outcome of an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqOutcome {
    /// The event matched the current state and was acted on
    Handled,
    /// No matching state; logged and discarded
    Spurious,
}

/// Accessory-detect interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqSource {
    /// Tip sense plug / unplug
    TipSense,
    /// Ring sense plug / unplug
    RingSense,
    /// Button comb detector asserted (`DC_DETECT1_TRUE`)
    ButtonPress,
    /// Button comb detector released (`DC_DETECT1_FALSE`)
    ButtonRelease,
    /// Auto-detect finished (`HSDET_DONE`)
    TypeDetectDone,
    /// Load detector finished (`HP_LOADDET_DONE`)
    LoadDetectDone,
    /// Headphone amplifier up (`HP_STARTUP_DONE`)
    HpStartupDone,
    /// Headphone amplifier down (`HP_SHUTDOWN_DONE`)
    HpShutdownDone,
    /// Headset bias clamp engaged (`HSBIAS_CLAMPED`)
    BiasClamped,
}

/// Mutable detection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectionState {
    /// Insertion seen and presence-linked power hold taken
    pub jack_present: bool,
    /// Button classification armed
    pub button_detect_running: bool,
    /// Output path is quiesced for a load measurement
    pub load_detect_running: bool,
    /// Forced category, `None` for automatic detection
    pub override_selection: Option<RawCategory>,
    /// Status as last reported to the sink
    pub reported: JackStatus,
}

struct Inner<R, S> {
    regs: R,
    sink: S,
    config: DetectionConfig,
    encoded: EncodedConfig,
    state: DetectionState,
}

impl<R: RegisterPort, S: JackSink> Inner<R, S> {
    fn report(&mut self, status: JackStatus, mask: JackStatus) {
        debug!("Jack report {:#x} mask {:#x}", status.bits(), mask.bits());
        self.state.reported = self.state.reported.apply(status, mask);
        self.sink.report(status, mask);
    }

    async fn write_config(&mut self, enc: &EncodedConfig) -> Result<(), DetectError> {
        if let Some(ring) = enc.ring_deb() {
            self.regs
                .update_bits(reg::RINGSENSE_DEB_CTRL, EncodedConfig::RING_DEB_MASK, ring)
                .await?;
        }
        self.regs
            .update_bits(reg::TIPSENSE_DEB_CTRL, EncodedConfig::TIP_DEB_MASK, enc.tip_deb())
            .await?;
        self.regs
            .update_bits(reg::HS2, EncodedConfig::HS2_MASK, enc.hs2())
            .await?;
        self.regs
            .update_bits(
                reg::HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL,
                EncodedConfig::AUTOCONTROL_MASK,
                enc.autocontrol(),
            )
            .await?;
        self.regs
            .update_bits(reg::PDNCNTL, reg::RING_SENSE_EN_MASK, enc.pdncntl())
            .await?;
        Ok(())
    }
}

/// Headset / headphone accessory detection engine.
///
/// - `M`: raw mutex flavour shared by the lock, completions and work items
/// - `R`: register transport
/// - `P`: runtime power gate
/// - `S`: jack status sink
pub struct JackDetect<'a, M: RawMutex, R, P, S> {
    inner: Mutex<M, Inner<R, S>>,
    power: P,
    completions: &'a Completions<M>,
    tip_sense_work: DelayedWork<M>,
    bias_sense_work: DelayedWork<M>,
}

impl<'a, M, R, P, S> JackDetect<'a, M, R, P, S>
where
    M: RawMutex,
    R: RegisterPort,
    P: PowerGate,
    S: JackSink,
{
    /// Create an engine with `config`.
    ///
    /// The configuration is validated but not written; call
    /// [`JackDetect::init`] once the device is reachable.
    pub fn new(
        regs: R,
        power: P,
        sink: S,
        completions: &'a Completions<M>,
        config: DetectionConfig,
    ) -> Result<Self, DetectError> {
        let encoded = config.validate()?;
        Ok(Self {
            inner: Mutex::new(Inner {
                regs,
                sink,
                config,
                encoded,
                state: DetectionState::default(),
            }),
            power,
            completions,
            tip_sense_work: DelayedWork::new(),
            bias_sense_work: DelayedWork::new(),
        })
    }

    /// Write the current configuration and pick up a jack already inserted.
    pub async fn init(&self) -> Result<(), DetectError> {
        {
            let _pm = self.power.acquire().await?;
            let mut inner = self.inner.lock().await;
            let enc = inner.encoded;
            inner.write_config(&enc).await?;
        }
        debug!("Accessory detect configured");
        self.tip_sense().await.map(|_| ())
    }

    /// Validate and install a new configuration.
    ///
    /// On error nothing is written and the previous configuration stays
    /// in force.
    pub async fn install_config(&self, config: DetectionConfig) -> Result<(), DetectError> {
        let encoded = match config.validate() {
            Ok(e) => e,
            Err(e) => {
                error!("Rejected accessory config: {:?}", e);
                return Err(e);
            }
        };

        let _pm = self.power.acquire().await?;
        let mut inner = self.inner.lock().await;
        inner.write_config(&encoded).await?;
        inner.config = config;
        inner.encoded = encoded;
        debug!("Accessory detect reconfigured");
        Ok(())
    }

    /// Installed configuration.
    pub async fn config(&self) -> DetectionConfig {
        self.inner.lock().await.config.clone()
    }

    /// Snapshot of the detection state.
    pub async fn state(&self) -> DetectionState {
        self.inner.lock().await.state
    }

    /// Completions this engine waits on.
    pub fn completions(&self) -> &'a Completions<M> {
        self.completions
    }

    /// Drive background jobs (debounced classification, bias-sense recovery).
    ///
    /// Never returns; poll it alongside the interrupt dispatch task.
    pub async fn run(&self) -> ! {
        let tip = self.tip_sense_work.run(|| self.classify_work());
        let bias = self.bias_sense_work.run(|| self.bias_sense_work_body());
        let (never, _) = join(tip, bias).await;
        never
    }

    /// Route a decoded interrupt to its handler.
    pub async fn handle_irq(&self, source: IrqSource) -> Result<IrqOutcome, DetectError> {
        trace!("Jack IRQ {:?}", source);
        match source {
            IrqSource::TipSense | IrqSource::RingSense => self.tip_sense().await,
            IrqSource::ButtonPress => self.button_press().await,
            IrqSource::ButtonRelease => self.button_release().await,
            IrqSource::TypeDetectDone => {
                self.completions.type_detect.complete();
                Ok(IrqOutcome::Handled)
            }
            IrqSource::LoadDetectDone => {
                self.completions.load_detect.complete();
                Ok(IrqOutcome::Handled)
            }
            IrqSource::HpStartupDone => {
                self.completions.hp_startup.complete();
                Ok(IrqOutcome::Handled)
            }
            IrqSource::HpShutdownDone => {
                self.completions.hp_shutdown.complete();
                Ok(IrqOutcome::Handled)
            }
            IrqSource::BiasClamped => {
                debug!("Headset bias clamped");
                Ok(IrqOutcome::Handled)
            }
        }
    }

    /// Stop background work, clear the jack and drop any power hold.
    pub async fn shutdown(&self) -> Result<(), DetectError> {
        self.bias_sense_work.cancel().await;
        self.tip_sense_work.cancel().await;

        let _pm = self.power.acquire().await?;
        let mut inner = self.inner.lock().await;
        let cleared = inner.clear_jack().await;
        if inner.state.jack_present {
            self.power.release();
        }
        inner.state = DetectionState::default();
        debug!("Accessory detect shut down");
        cleared
    }
}
