//! Headset bias generator control

use embassy_time::Timer;
use platform::{JackSink, RegisterPort};

use super::Inner;
use crate::error::DetectError;
use crate::registers as reg;

impl<R: RegisterPort, S: JackSink> Inner<R, S> {
    /// Enable the headset bias and wait out the configured ramp.
    ///
    /// `force_high` ignores `bias_low`; type detection needs full drive.
    pub(super) async fn start_hs_bias(&mut self, force_high: bool) -> Result<(), DetectError> {
        debug!("Start headset bias");

        self.regs
            .update_bits(reg::HS2, reg::HS_CLAMP_DISABLE_MASK, reg::HS_CLAMP_DISABLE_MASK)
            .await?;

        let mode = if !force_high && self.config.bias_low {
            reg::HSBIAS_MODE_LOW
        } else {
            reg::HSBIAS_MODE_HIGH
        };
        self.regs
            .update_bits(reg::MIC_DETECT_CONTROL_1, reg::HSBIAS_MODE_MASK, mode)
            .await?;

        Timer::after(self.encoded.ramp.duration()).await;
        Ok(())
    }

    /// Return the bias to idle and re-enable the headset clamp.
    ///
    /// Both writes are attempted; the first failure is returned.
    pub(super) async fn stop_hs_bias(&mut self) -> Result<(), DetectError> {
        debug!("Stop headset bias");

        let idle = self
            .regs
            .update_bits(reg::MIC_DETECT_CONTROL_1, reg::HSBIAS_MODE_MASK, reg::HSBIAS_MODE_IDLE)
            .await;
        let clamp = self.regs.update_bits(reg::HS2, reg::HS_CLAMP_DISABLE_MASK, 0).await;
        idle.and(clamp)?;
        Ok(())
    }
}
