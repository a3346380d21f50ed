//! Button classification by comb-filter impedance

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Timer};
use platform::{JackSink, JackStatus, Ohms, PowerGate, RegisterPort};

use super::{Inner, IrqOutcome, JackDetect};
use crate::error::DetectError;
use crate::registers as reg;

/// Comb filter period, µs.
const COMB_PERIOD_US: u64 = 11_000;

/// Full-scale comb reading.
const COMB_MAX: u64 = 512;

/// Reference output resistance, Ω.
const ROUT_OHMS: u64 = 2_210;

/// Two comb periods: the reading is stable after this.
#[allow(clippy::arithmetic_side_effects)] // Safety: constant product
pub const BUTTON_SETTLE: Duration = Duration::from_micros(2 * COMB_PERIOD_US);

/// Delay before cycling the bias clamp after a false bias-sense trip.
pub(super) const BIAS_SENSE_RECOVERY: Duration = Duration::from_millis(250);

/// Convert a raw `HSDET_DC_STS` comb reading to an impedance estimate.
///
/// Fixed-point (Q20) reciprocal: `ROUT / (COMB_MAX / (raw + 1) - 1)`.
/// A full-scale reading has no finite impedance and maps to [`Ohms::OPEN`].
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Safety: constant shifts well inside u64
pub fn comb_to_ohms(raw: u32) -> Ohms {
    let ratio = (COMB_MAX << 20)
        .checked_div(u64::from(raw).saturating_add(1))
        .unwrap_or(0)
        .saturating_sub(1 << 20);
    match (ROUT_OHMS << 20).checked_div(ratio) {
        Some(ohms) => Ohms::new(u32::try_from(ohms).unwrap_or(u32::MAX)),
        None => Ohms::OPEN,
    }
}

impl<R: RegisterPort, S: JackSink> Inner<R, S> {
    pub(super) async fn start_button_detect(&mut self) -> Result<(), DetectError> {
        debug!("Start button detect");

        self.state.button_detect_running = true;

        let mode = if self.config.bias_low {
            reg::BUTTON_DETECT_MODE_LOW
        } else {
            reg::BUTTON_DETECT_MODE_HIGH
        };
        self.regs
            .update_bits(
                reg::MIC_DETECT_CONTROL_1,
                reg::BUTTON_DETECT_MODE_MASK | reg::MIC_LVL_DET_DISABLE_MASK,
                mode,
            )
            .await?;

        if self.encoded.bias_sense.is_some() {
            let bits = reg::HSBIAS_SENSE_EN_MASK | reg::AUTO_HSBIAS_CLAMP_EN_MASK;
            self.regs
                .update_bits(reg::HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL, bits, bits)
                .await?;
        }
        Ok(())
    }

    pub(super) async fn stop_button_detect(&mut self) -> Result<(), DetectError> {
        debug!("Stop button detect");

        if self.encoded.bias_sense.is_some() {
            self.regs
                .update_bits(
                    reg::HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL,
                    reg::HSBIAS_SENSE_EN_MASK | reg::AUTO_HSBIAS_CLAMP_EN_MASK,
                    0,
                )
                .await?;
        }

        self.regs
            .update_bits(
                reg::MIC_DETECT_CONTROL_1,
                reg::BUTTON_DETECT_MODE_MASK | reg::MIC_LVL_DET_DISABLE_MASK,
                reg::MIC_LVL_DET_DISABLE_MASK,
            )
            .await?;

        self.state.button_detect_running = false;
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
    /// Button press interrupt.
    pub async fn button_press(&self) -> Result<IrqOutcome, DetectError> {
        let _pm = self.power.acquire().await?;
        let mut inner = self.inner.lock().await;

        if !inner.state.button_detect_running {
            debug!("Spurious button press IRQ");
            return Ok(IrqOutcome::Spurious);
        }

        Timer::after(BUTTON_SETTLE).await;

        let val = inner.regs.read(reg::DETECT_STATUS_1).await?;

        if !inner.jack_present().await? {
            debug!("Button ignored due to removal");
            return Ok(IrqOutcome::Spurious);
        }

        if val & reg::HSBIAS_CLAMP_STS_MASK != 0 {
            debug!("Button ignored due to bias sense");
            self.bias_sense_work.schedule(BIAS_SENSE_RECOVERY);
            return Ok(IrqOutcome::Spurious);
        }

        #[allow(clippy::arithmetic_side_effects)] // Safety: constant in-range shift
        let raw = (val & reg::HSDET_DC_STS_MASK) >> reg::HSDET_DC_STS_SHIFT;
        let ohms = comb_to_ohms(raw);
        let buttons = match inner.config.classify(ohms) {
            Some(button) => {
                debug!("Detected button {:?} at {} Ohms", button, ohms.get());
                button.status()
            }
            None => {
                debug!("Unrecognised button: {} Ohms", ohms.get());
                JackStatus::NONE
            }
        };
        inner.report(buttons, JackStatus::BUTTONS);

        Ok(IrqOutcome::Handled)
    }

    /// Button release interrupt.
    pub async fn button_release(&self) -> Result<IrqOutcome, DetectError> {
        let _pm = self.power.acquire().await?;
        let mut inner = self.inner.lock().await;

        if inner.state.button_detect_running {
            debug!("Button release IRQ");
            inner.report(JackStatus::NONE, JackStatus::BUTTONS);
            Ok(IrqOutcome::Handled)
        } else {
            debug!("Spurious button release IRQ");
            Ok(IrqOutcome::Spurious)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_scale_reading_is_about_147_ohms() {
        assert_eq!(comb_to_ohms(31), Ohms::new(147));
    }

    #[test]
    fn reading_135_is_about_799_ohms() {
        assert_eq!(comb_to_ohms(135), Ohms::new(799));
    }

    #[test]
    fn full_scale_is_open() {
        assert_eq!(comb_to_ohms(511), Ohms::OPEN);
    }

    #[test]
    fn zero_reading_is_smallest() {
        // 512/1 - 1 = 511 → 2210 / 511
        assert_eq!(comb_to_ohms(0), Ohms::new(4));
    }

    #[test]
    fn settle_is_two_comb_periods() {
        assert_eq!(BUTTON_SETTLE, Duration::from_micros(22_000));
    }
}
