//! Recovery from false headset-bias clamp trips
//!
//! A bias-sense trip during a button press clamps the bias. Cycling the auto
//! clamp enable after a short delay re-arms the sensor.

use embassy_sync::blocking_mutex::raw::RawMutex;
use platform::{JackSink, PowerGate, RegisterPort};

use super::JackDetect;
use crate::error::DetectError;
use crate::registers as reg;

impl<M, R, P, S> JackDetect<'_, M, R, P, S>
where
    M: RawMutex,
    R: RegisterPort,
    P: PowerGate,
    S: JackSink,
{
    pub(super) async fn bias_sense_work_body(&self) {
        if let Err(e) = self.recover_bias_sense().await {
            error!("Bias sense recovery failed: {:?}", e);
        }
    }

    async fn recover_bias_sense(&self) -> Result<(), DetectError> {
        let _pm = self.power.acquire().await?;
        let mut inner = self.inner.lock().await;

        if !inner.jack_present().await? || !inner.state.button_detect_running {
            trace!("Bias sense recovery skipped");
            return Ok(());
        }

        debug!("Re-arming bias sense clamp");
        inner
            .regs
            .update_bits(
                reg::HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL,
                reg::AUTO_HSBIAS_CLAMP_EN_MASK,
                0,
            )
            .await?;
        inner
            .regs
            .update_bits(
                reg::HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL,
                reg::AUTO_HSBIAS_CLAMP_EN_MASK,
                reg::AUTO_HSBIAS_CLAMP_EN_MASK,
            )
            .await?;
        Ok(())
    }
}
