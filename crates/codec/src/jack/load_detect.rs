//! Load detection: headphone vs. line-out on 3-pole plugs
//!
//! The measurement runs through the headphone amplifier, so the output path
//! is quiesced first and put back exactly as it was afterwards, whether or
//! not the measurement completed.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use platform::{JackSink, JackStatus, PortError, PowerGate, RegisterPort};

use super::JackDetect;
use crate::error::{DetectError, WaitStage};
use crate::registers as reg;

/// Bound on the load measurement.
pub const LOAD_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Bound on headphone amplifier power transitions.
pub const HP_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Load detector impedance class (`LOADDETRESULTS.AMP3_RES_DET`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadResult {
    /// Low impedance
    Low,
    /// High impedance
    High,
    /// Line-level load
    LineOut,
    /// Open circuit
    Open,
}

impl LoadResult {
    /// Decode the results register.
    #[must_use]
    pub fn from_status(status: u32) -> Option<Self> {
        match status & reg::AMP3_RES_DET_MASK {
            0x0 => Some(Self::Low),
            0x1 => Some(Self::High),
            0x2 => Some(Self::LineOut),
            0x3 => Some(Self::Open),
            _ => None,
        }
    }

    /// Category reported for a 3-pole plug with this load.
    #[must_use]
    pub fn category(self) -> JackStatus {
        match self {
            Self::Low | Self::High => JackStatus::MECHANICAL | JackStatus::HEADPHONE,
            Self::LineOut | Self::Open => JackStatus::MECHANICAL | JackStatus::LINEOUT,
        }
    }
}

/// Output-path enables captured before quiescing.
#[derive(Debug, Clone, Copy)]
struct OutputPath {
    hp_en: u32,
    adc_en: u32,
}

impl OutputPath {
    fn hp_on(self) -> bool {
        self.hp_en != 0
    }
}

impl<M, R, P, S> JackDetect<'_, M, R, P, S>
where
    M: RawMutex,
    R: RegisterPort,
    P: PowerGate,
    S: JackSink,
{
    /// Measure the load and classify the accessory.
    ///
    /// With `mic` the plug is already known to be a headset: the measurement
    /// still runs (it settles the amplifier) and on success the bias and
    /// button detection are started.
    pub(super) async fn run_load_detect(&self, mic: bool) -> Result<JackStatus, DetectError> {
        let path = match self.quiesce_output().await {
            Ok(path) => path,
            Err(e) => {
                self.inner.lock().await.state.load_detect_running = false;
                return Err(e);
            }
        };

        let measured = self.measure_load().await;
        let restored = self.restore_output(path).await;
        self.inner.lock().await.state.load_detect_running = false;

        if !measured? {
            return Err(DetectError::Timeout(WaitStage::LoadDetect));
        }
        restored?;

        let mut inner = self.inner.lock().await;
        let status = inner.regs.read(reg::LOADDETRESULTS).await?;
        debug!("Headphone load detect {:#x}", status);

        if !inner.jack_present().await? {
            return Err(DetectError::JackRemoved);
        }

        if mic {
            inner.start_hs_bias(false).await?;
            inner.start_button_detect().await?;
            return Ok(JackStatus::MECHANICAL | JackStatus::HEADSET);
        }

        LoadResult::from_status(status)
            .map(LoadResult::category)
            .ok_or(DetectError::UnknownStatus)
    }

    async fn quiesce_output(&self) -> Result<OutputPath, DetectError> {
        debug!("Start load detect");

        let path = {
            let mut inner = self.inner.lock().await;
            inner.state.load_detect_running = true;
            let path = OutputPath {
                hp_en: inner.regs.read(reg::BLOCK_EN8).await? & reg::HP_EN_MASK,
                adc_en: inner.regs.read(reg::BLOCK_EN3).await? & reg::ADC_EN_MASK,
            };
            if path.hp_on() {
                self.completions.hp_shutdown.reinit();
                inner.regs.update_bits(reg::BLOCK_EN8, reg::HP_EN_MASK, 0).await?;
            }
            path
        };

        if path.hp_on() && !self.completions.hp_shutdown.wait_timeout(HP_TIMEOUT).await {
            error!("Load detect: {:?}", DetectError::Timeout(WaitStage::HpShutdown));
        }
        Ok(path)
    }

    /// Reconfigure for the measurement and wait for it. `Ok(false)` on timeout.
    async fn measure_load(&self) -> Result<bool, DetectError> {
        {
            let mut inner = self.inner.lock().await;
            let regs = &mut inner.regs;
            regs.update_bits(reg::BLOCK_EN3, reg::ADC_EN_MASK, 0).await?;
            regs.update_bits(reg::DACCNFG2, reg::HP_HPF_EN_MASK, 0).await?;
            regs.update_bits(reg::MIC_DETECT_CONTROL_1, reg::HSBIAS_MODE_MASK, reg::HSBIAS_MODE_OFF)
                .await?;
            regs.update_bits(reg::CTRL, reg::ADPTPWR_MODE_MASK, reg::ADPTPWR_MODE_LOADDET)
                .await?;
            regs.update_bits(
                reg::PGAVOL,
                reg::HP_DIG_VOL_RAMP_MASK | reg::HP_ANA_VOL_RAMP_MASK,
                reg::VOL_RAMP_LOADDET,
            )
            .await?;
            regs.update_bits(reg::DACCNFG1, reg::HP_MSTR_VOL_CTRL_EN_MASK, 0).await?;
            regs.update_bits(reg::HS2, reg::HS_CLAMP_DISABLE_MASK, reg::HS_CLAMP_DISABLE_MASK)
                .await?;

            self.completions.load_detect.reinit();
            regs.update_bits(reg::LOADDETENA, reg::HPLOAD_DET_EN_MASK, reg::HPLOAD_DET_EN_MASK)
                .await?;
        }

        Ok(self.completions.load_detect.wait_timeout(LOAD_TIMEOUT).await)
    }

    /// Undo [`measure_load`](Self::measure_load) and power the amplifier
    /// back up. Every write is attempted; the first failure is returned.
    async fn restore_output(&self, path: OutputPath) -> Result<(), DetectError> {
        debug!("Stop load detect");

        let restore: [(u32, u32, u32); 8] = [
            (reg::LOADDETENA, reg::HPLOAD_DET_EN_MASK, 0),
            (reg::HS2, reg::HS_CLAMP_DISABLE_MASK, 0),
            (reg::DACCNFG1, reg::HP_MSTR_VOL_CTRL_EN_MASK, reg::HP_MSTR_VOL_CTRL_EN_MASK),
            (
                reg::PGAVOL,
                reg::HP_DIG_VOL_RAMP_MASK | reg::HP_ANA_VOL_RAMP_MASK,
                reg::VOL_RAMP_NORMAL,
            ),
            (reg::CTRL, reg::ADPTPWR_MODE_MASK, reg::ADPTPWR_MODE_NORMAL),
            (reg::MIC_DETECT_CONTROL_1, reg::HSBIAS_MODE_MASK, reg::HSBIAS_MODE_IDLE),
            (reg::DACCNFG2, reg::HP_HPF_EN_MASK, reg::HP_HPF_EN_MASK),
            (reg::BLOCK_EN3, reg::ADC_EN_MASK, path.adc_en),
        ];

        let mut result: Result<(), PortError> = Ok(());
        let hp_restarted = {
            let mut inner = self.inner.lock().await;
            for (addr, mask, value) in restore {
                if let Err(e) = inner.regs.update_bits(addr, mask, value).await {
                    warn!("Load detect restore of {:#x} failed: {:?}", addr, e);
                    result = result.and(Err(e));
                }
            }

            if path.hp_on() {
                self.completions.hp_startup.reinit();
                match inner.regs.update_bits(reg::BLOCK_EN8, reg::HP_EN_MASK, path.hp_en).await {
                    Ok(()) => true,
                    Err(e) => {
                        result = result.and(Err(e));
                        false
                    }
                }
            } else {
                false
            }
        };

        if hp_restarted && !self.completions.hp_startup.wait_timeout(HP_TIMEOUT).await {
            error!("Load detect: {:?}", DetectError::Timeout(WaitStage::HpStartup));
        }
        result.map_err(DetectError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_encodings_each_for_headphone_and_lineout() {
        let hp = JackStatus::MECHANICAL | JackStatus::HEADPHONE;
        let lo = JackStatus::MECHANICAL | JackStatus::LINEOUT;
        let got: [JackStatus; 4] = [0, 1, 2, 3].map(|v| {
            LoadResult::from_status(v).map(LoadResult::category).unwrap_or_default()
        });
        assert_eq!(got, [hp, hp, lo, lo]);
    }

    #[test]
    fn only_low_bits_are_decoded() {
        assert_eq!(LoadResult::from_status(0xF0), Some(LoadResult::Low));
    }
}
