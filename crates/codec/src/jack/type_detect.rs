//! Type detection: classify plug wiring with the auto-detect circuit

use embassy_sync::blocking_mutex::raw::RawMutex;
use platform::{JackSink, JackStatus, PowerGate, RegisterPort};

use super::{Inner, JackDetect};
use crate::error::{DetectError, WaitStage};
use crate::registers as reg;

/// Auto-detect wiring result (`HS_STAT.HSDET_TYPE_STS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HsdetType {
    /// 4-pole, mic on sleeve (CTIA / AHJ)
    Ctia,
    /// 4-pole, mic on ring 2 (OMTP)
    Omtp,
    /// 3-pole, no microphone
    ThreePole,
    /// Nothing on the poles: passive extension cable
    Open,
}

impl HsdetType {
    /// Decode the status register.
    #[must_use]
    pub fn from_status(status: u32) -> Option<Self> {
        match status & reg::HSDET_TYPE_STS_MASK {
            0x0 => Some(Self::Ctia),
            0x1 => Some(Self::Omtp),
            0x2 => Some(Self::ThreePole),
            0x3 => Some(Self::Open),
            _ => None,
        }
    }
}

impl<R: RegisterPort, S: JackSink> Inner<R, S> {
    async fn start_type_detect(&mut self) -> Result<(), DetectError> {
        self.start_hs_bias(true).await?;
        self.regs
            .update_bits(reg::HS2, reg::HSDET_MODE_MASK, reg::HSDET_MODE_RUN)
            .await?;
        Ok(())
    }

    /// Back to static mode with the bias idle. Both steps always run.
    async fn stop_type_detect(&mut self) -> Result<(), DetectError> {
        let mode = self
            .regs
            .update_bits(reg::HS2, reg::HSDET_MODE_MASK, reg::HSDET_MODE_STATIC)
            .await
            .map_err(DetectError::from);
        let bias = self.stop_hs_bias().await;
        mode.and(bias)
    }
}

impl<M, R, P, S> JackDetect<'_, M, R, P, S>
where
    M: RawMutex,
    R: RegisterPort,
    P: PowerGate,
    S: JackSink,
{
    /// Run the auto-detect circuit and follow up with load detection.
    ///
    /// Returns the status to report. Bias is back at idle on every exit.
    pub(super) async fn run_type_detect(&self) -> Result<JackStatus, DetectError> {
        let timeout = {
            let mut inner = self.inner.lock().await;
            self.completions.type_detect.reinit();
            if let Err(e) = inner.start_type_detect().await {
                if let Err(stop) = inner.stop_type_detect().await {
                    warn!("Type detect cleanup failed: {:?}", stop);
                }
                return Err(e);
            }
            inner.encoded.detect.type_detect_timeout()
        };

        let done = self.completions.type_detect.wait_timeout(timeout).await;

        let mut inner = self.inner.lock().await;
        inner.stop_type_detect().await?;

        if !done {
            return Err(DetectError::Timeout(WaitStage::TypeDetect));
        }

        let status = inner.regs.read(reg::HS_STAT).await?;
        debug!("Type detect {:#x}", status);

        if !inner.jack_present().await? {
            return Err(DetectError::JackRemoved);
        }
        drop(inner);

        match HsdetType::from_status(status).ok_or(DetectError::UnknownStatus)? {
            HsdetType::Ctia | HsdetType::Omtp => self.run_load_detect(true).await,
            HsdetType::ThreePole => self.run_load_detect(false).await,
            HsdetType::Open => Ok(JackStatus::MECHANICAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decodes_low_two_bits() {
        assert_eq!(HsdetType::from_status(0x0), Some(HsdetType::Ctia));
        assert_eq!(HsdetType::from_status(0x1), Some(HsdetType::Omtp));
        assert_eq!(HsdetType::from_status(0x2), Some(HsdetType::ThreePole));
        assert_eq!(HsdetType::from_status(0xFFFF_FFF3), Some(HsdetType::Open));
    }
}
