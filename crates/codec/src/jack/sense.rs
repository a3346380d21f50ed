//! Sense monitor: tip / ring edges, presence and jack clear

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use platform::{JackSink, JackStatus, PowerGate, RegisterPort};

use super::{Inner, IrqOutcome, JackDetect};
use crate::error::DetectError;
use crate::registers as reg;

/// Debounced tip / ring plug state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SenseStatus(u32);

impl SenseStatus {
    #[allow(clippy::arithmetic_side_effects)] // Safety: constant in-range shift
    fn field(self, shift: u32) -> u32 {
        (self.0 >> shift) & reg::PLUG_STS_MASK
    }

    pub(super) fn tip_present(self) -> bool {
        self.field(reg::TIPSENSE_PLUG_DB_STS_SHIFT) == reg::PLUG_PRESENT
    }

    pub(super) fn ring_absent(self) -> bool {
        self.field(reg::RINGSENSE_PLUG_DB_STS_SHIFT) == reg::PLUG_ABSENT
    }
}

impl<R: RegisterPort, S: JackSink> Inner<R, S> {
    pub(super) async fn read_sense(&mut self) -> Result<SenseStatus, DetectError> {
        let sts = self.regs.read(reg::TIP_RING_SENSE_INTERRUPT_STATUS).await?;
        trace!("Tip sense {:#x}", sts);
        Ok(SenseStatus(sts))
    }

    /// Physical presence according to the tip switch.
    pub(super) async fn jack_present(&mut self) -> Result<bool, DetectError> {
        Ok(self.read_sense().await?.tip_present())
    }

    /// `true` when ring sensing says the plug is an optical adapter.
    pub(super) fn is_optical(&self, sense: SenseStatus) -> bool {
        self.config.use_ring_sense && sense.ring_absent()
    }

    /// Tear down everything detection may have set up and report all-clear.
    pub(super) async fn clear_jack(&mut self) -> Result<(), DetectError> {
        self.stop_button_detect().await?;
        self.stop_hs_bias().await?;

        self.regs
            .update_bits(reg::ADC_B_CTRL1, reg::PGA_WIDESWING_MODE_EN_MASK, 0)
            .await?;
        self.regs
            .update_bits(reg::ADC_B_CTRL2, reg::PGA_WIDESWING_MODE_EN_MASK, 0)
            .await?;
        self.regs
            .update_bits(reg::STEREO_MIC_CTRL, reg::JACK_STEREO_CONFIG_MASK, 0)
            .await?;
        self.regs
            .update_bits(
                reg::HS2,
                reg::HSDET_MODE_MASK | reg::HSDET_MANUAL_MODE_MASK,
                reg::HSDET_MODE_STATIC,
            )
            .await?;

        self.report(JackStatus::NONE, JackStatus::ALL);
        Ok(())
    }
}

impl<M, R, P, S> JackDetect<'_, M, R, P, S>
where
    M: RawMutex,
    R: RegisterPort,
    P: PowerGate,
    S: JackSink,
{
    /// Tip (or ring) sense edge.
    ///
    /// Cancels any in-flight classification, then either arms a debounced
    /// classification (insertion) or clears the jack (removal).
    pub async fn tip_sense(&self) -> Result<IrqOutcome, DetectError> {
        self.bias_sense_work.cancel().await;
        self.tip_sense_work.cancel().await;

        let _pm = self.power.acquire().await?;
        let mut inner = self.inner.lock().await;

        let sense = inner.read_sense().await?;
        if sense.tip_present() {
            debug!("Jack insert");

            if !inner.state.jack_present {
                inner.state.jack_present = true;
                self.power.hold();
            }

            if inner.is_optical(sense) {
                debug!("Ring absent, optical adapter");
                let optical = JackStatus::MECHANICAL | JackStatus::AVOUT;
                inner.report(optical, optical);
            } else {
                let debounce = u64::from(inner.config.tip_debounce_ms);
                self.tip_sense_work.schedule(Duration::from_millis(debounce));
            }
        } else {
            debug!("Jack removal");

            inner.state.override_selection = None;
            let cleared = inner.clear_jack().await;

            if inner.state.jack_present {
                inner.state.jack_present = false;
                self.power.release();
            }
            cleared?;
        }

        Ok(IrqOutcome::Handled)
    }

    /// Debounced classification job.
    pub(super) async fn classify_work(&self) {
        if let Err(e) = self.classify().await {
            error!("Jack detect failed: {:?}", e);
        }
    }

    async fn classify(&self) -> Result<(), DetectError> {
        let _pm = self.power.acquire().await?;

        {
            let mut inner = self.inner.lock().await;
            let sense = inner.read_sense().await?;
            if !sense.tip_present() {
                debug!("Jack gone before classification");
                return Ok(());
            }
            if inner.is_optical(sense) {
                let optical = JackStatus::MECHANICAL | JackStatus::AVOUT;
                inner.report(optical, optical);
                return Ok(());
            }
            // A bounce without a removal edge can leave the last session armed.
            if inner.state.button_detect_running {
                inner.stop_button_detect().await?;
            }
        }

        let report = self.run_type_detect().await?;

        let mut inner = self.inner.lock().await;
        inner.report(report, report);
        Ok(())
    }
}
