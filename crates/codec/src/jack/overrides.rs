//! Forced accessory category
//!
//! Bypasses automatic detection and programs a fixed switch recipe for the
//! selected category. Selecting [`JackOverride::Auto`] hands control back to
//! the sense monitor.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use platform::{JackSink, JackStatus, PowerGate, RegisterPort};

use super::JackDetect;
use crate::error::DetectError;
use crate::registers as reg;

/// Accessory categories that can be forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawCategory {
    /// 4-pole headset, mic on sleeve
    Ctia,
    /// 4-pole headset, mic on ring 2
    Omtp,
    /// 3-pole headphone
    Headphone,
    /// 3-pole line-level output
    LineOut,
    /// Stereo line-level input
    LineIn,
    /// Stereo microphone, biased
    Microphone,
    /// Optical (S/PDIF) adapter
    Optical,
}

/// Register programming for a forced category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Recipe {
    /// `HS2` switch and manual-mode bits, under [`reg::HS2_SWITCH_MASK`]
    pub hsdet_mode: u32,
    /// `STEREO_MIC_CTRL` bits
    pub mic_ctrl: u32,
    /// `STEREO_MIC_CLAMP_CTRL` bits
    pub clamp_ctrl: u32,
    pub report: JackStatus,
}

#[allow(clippy::arithmetic_side_effects)] // Safety: constant in-range shift
const fn manual_mode(mode: u32) -> u32 {
    mode << reg::HSDET_MANUAL_MODE_SHIFT
}

#[allow(clippy::arithmetic_side_effects)] // Safety: constant in-range shift
const fn stereo_config(config: u32) -> u32 {
    config << reg::JACK_STEREO_CONFIG_SHIFT
}

/// Ground both sleeves, no bias output.
const THREE_POLE_SWITCHES: u32 = manual_mode(0x2)
    | reg::AMP3_4_GNDREF_HS3_SEL_MASK
    | reg::AMP3_4_GNDREF_HS4_SEL_MASK
    | reg::HSBIAS_GNDREF_HS3_SEL_MASK
    | reg::HSBIAS_GNDREF_HS4_SEL_MASK
    | reg::HSGND_HS3_SEL_MASK
    | reg::HSGND_HS4_SEL_MASK;

const MIC_CTRL_MASK: u32 =
    reg::HS2_BIAS_EN_MASK | reg::HS1_BIAS_EN_MASK | reg::JACK_STEREO_CONFIG_MASK;

impl RawCategory {
    /// Every category, in control-index order.
    pub const ALL: [Self; 7] = [
        Self::Ctia,
        Self::Omtp,
        Self::Headphone,
        Self::LineOut,
        Self::LineIn,
        Self::Microphone,
        Self::Optical,
    ];

    pub(super) const fn recipe(self) -> Recipe {
        let mech = JackStatus::MECHANICAL.bits();
        let (hsdet_mode, mic_ctrl, clamp_ctrl, report) = match self {
            Self::Ctia => (
                reg::AMP3_4_GNDREF_HS3_SEL_MASK
                    | reg::HSBIAS_GNDREF_HS3_SEL_MASK
                    | reg::HSBIAS_OUT_HS4_SEL_MASK
                    | reg::HSGND_HS3_SEL_MASK,
                0,
                reg::SMIC_HPAMP_CLAMP_DIS_FRC_MASK,
                JackStatus::HEADSET,
            ),
            Self::Omtp => (
                manual_mode(0x1)
                    | reg::AMP3_4_GNDREF_HS4_SEL_MASK
                    | reg::HSBIAS_GNDREF_HS4_SEL_MASK
                    | reg::HSBIAS_OUT_HS3_SEL_MASK
                    | reg::HSGND_HS4_SEL_MASK,
                0,
                reg::SMIC_HPAMP_CLAMP_DIS_FRC_MASK,
                JackStatus::HEADSET,
            ),
            Self::Headphone => (
                THREE_POLE_SWITCHES,
                0,
                reg::SMIC_HPAMP_CLAMP_DIS_FRC_MASK,
                JackStatus::HEADPHONE,
            ),
            Self::LineOut => (
                THREE_POLE_SWITCHES,
                0,
                reg::SMIC_HPAMP_CLAMP_DIS_FRC_MASK,
                JackStatus::LINEOUT,
            ),
            Self::LineIn => (THREE_POLE_SWITCHES, stereo_config(0x2), 0, JackStatus::LINEIN),
            Self::Microphone => (
                THREE_POLE_SWITCHES,
                stereo_config(0x3) | reg::HS1_BIAS_EN_MASK | reg::HS2_BIAS_EN_MASK,
                0,
                JackStatus::LINEIN,
            ),
            Self::Optical => (
                THREE_POLE_SWITCHES,
                0,
                reg::SMIC_HPAMP_CLAMP_DIS_FRC_MASK,
                JackStatus::AVOUT,
            ),
        };
        Recipe {
            hsdet_mode,
            mic_ctrl,
            clamp_ctrl,
            report: JackStatus::from_bits(report.bits() | mech),
        }
    }
}

/// User-facing override selection. Index 0 is automatic detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum JackOverride {
    /// Automatic detection
    #[default]
    Auto,
    Ctia,
    Omtp,
    Headphone,
    LineOut,
    LineIn,
    Microphone,
    Optical,
}

const LABELS: [&str; 8] = [
    "None",
    "CTIA",
    "OMTP",
    "Headphone",
    "Line-Out",
    "Line-In",
    "Microphone",
    "Optical",
];

const _: () = assert!(LABELS.len() == RawCategory::ALL.len() + 1);

impl JackOverride {
    /// Display name, as shown in a mixer-style control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => LABELS[0],
            Self::Ctia => LABELS[1],
            Self::Omtp => LABELS[2],
            Self::Headphone => LABELS[3],
            Self::LineOut => LABELS[4],
            Self::LineIn => LABELS[5],
            Self::Microphone => LABELS[6],
            Self::Optical => LABELS[7],
        }
    }

    /// All selectable labels, in index order.
    #[must_use]
    pub const fn labels() -> &'static [&'static str] {
        &LABELS
    }

    /// Forced category, `None` for [`JackOverride::Auto`].
    #[must_use]
    pub const fn category(self) -> Option<RawCategory> {
        match self {
            Self::Auto => None,
            Self::Ctia => Some(RawCategory::Ctia),
            Self::Omtp => Some(RawCategory::Omtp),
            Self::Headphone => Some(RawCategory::Headphone),
            Self::LineOut => Some(RawCategory::LineOut),
            Self::LineIn => Some(RawCategory::LineIn),
            Self::Microphone => Some(RawCategory::Microphone),
            Self::Optical => Some(RawCategory::Optical),
        }
    }

    /// Control index (`0 = Auto`).
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Auto => 0,
            Self::Ctia => 1,
            Self::Omtp => 2,
            Self::Headphone => 3,
            Self::LineOut => 4,
            Self::LineIn => 5,
            Self::Microphone => 6,
            Self::Optical => 7,
        }
    }
}

impl From<Option<RawCategory>> for JackOverride {
    fn from(category: Option<RawCategory>) -> Self {
        match category {
            None => Self::Auto,
            Some(RawCategory::Ctia) => Self::Ctia,
            Some(RawCategory::Omtp) => Self::Omtp,
            Some(RawCategory::Headphone) => Self::Headphone,
            Some(RawCategory::LineOut) => Self::LineOut,
            Some(RawCategory::LineIn) => Self::LineIn,
            Some(RawCategory::Microphone) => Self::Microphone,
            Some(RawCategory::Optical) => Self::Optical,
        }
    }
}

impl TryFrom<u32> for JackOverride {
    type Error = DetectError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Auto),
            1 => Ok(Self::Ctia),
            2 => Ok(Self::Omtp),
            3 => Ok(Self::Headphone),
            4 => Ok(Self::LineOut),
            5 => Ok(Self::LineIn),
            6 => Ok(Self::Microphone),
            7 => Ok(Self::Optical),
            other => Err(DetectError::InvalidOverride(other)),
        }
    }
}

impl<M, R, P, S> JackDetect<'_, M, R, P, S>
where
    M: RawMutex,
    R: RegisterPort,
    P: PowerGate,
    S: JackSink,
{
    /// Current override selection.
    pub async fn override_get(&self) -> JackOverride {
        self.inner.lock().await.state.override_selection.into()
    }

    /// Force a category, or hand back to automatic detection with `0`.
    ///
    /// Returns `Ok(false)` when `selection` is already in force, in which case
    /// nothing is written or reported.
    ///
    /// # Errors
    ///
    /// - [`DetectError::InvalidOverride`] if `selection` is out of range
    /// - [`DetectError::Busy`] if no jack is inserted
    pub async fn override_set(&self, selection: u32) -> Result<bool, DetectError> {
        let wanted = JackOverride::try_from(selection)?.category();

        let _pm = self.power.acquire().await?;

        {
            let mut inner = self.inner.lock().await;
            if !inner.jack_present().await? {
                return Err(DetectError::Busy);
            }
            if inner.state.override_selection == wanted {
                return Ok(false);
            }
        }

        // Background jobs take the lock; stop them before reprogramming.
        self.bias_sense_work.cancel().await;
        self.tip_sense_work.cancel().await;

        let mut inner = self.inner.lock().await;
        if !inner.jack_present().await? {
            return Err(DetectError::Busy);
        }
        if inner.state.override_selection == wanted {
            return Ok(false);
        }

        debug!("Jack override {}", JackOverride::from(wanted).label());
        inner.state.override_selection = wanted;
        inner.clear_jack().await?;

        let Some(category) = wanted else {
            self.tip_sense_work.schedule(Duration::from_millis(0));
            return Ok(true);
        };

        let recipe = category.recipe();
        inner
            .regs
            .update_bits(reg::HS2, reg::HS2_SWITCH_MASK, recipe.hsdet_mode)
            .await?;
        inner
            .regs
            .update_bits(reg::STEREO_MIC_CTRL, MIC_CTRL_MASK, recipe.mic_ctrl)
            .await?;
        inner
            .regs
            .update_bits(
                reg::STEREO_MIC_CLAMP_CTRL,
                reg::SMIC_HPAMP_CLAMP_DIS_FRC_MASK,
                recipe.clamp_ctrl,
            )
            .await?;

        match category {
            RawCategory::Ctia | RawCategory::Omtp => {
                inner.start_hs_bias(false).await?;
                inner.start_button_detect().await?;
            }
            RawCategory::LineIn => {
                for adc in [reg::ADC_B_CTRL1, reg::ADC_B_CTRL2] {
                    inner
                        .regs
                        .update_bits(
                            adc,
                            reg::PGA_WIDESWING_MODE_EN_MASK,
                            reg::PGA_WIDESWING_MODE_EN_MASK,
                        )
                        .await?;
                }
            }
            RawCategory::Microphone => inner.start_hs_bias(false).await?,
            RawCategory::Headphone | RawCategory::LineOut | RawCategory::Optical => {}
        }

        inner.report(recipe.report, recipe.report);
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_try_from() {
        for i in 0..8 {
            assert_eq!(JackOverride::try_from(i).unwrap().index(), i);
        }
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        assert_eq!(
            JackOverride::try_from(8),
            Err(DetectError::InvalidOverride(8))
        );
    }

    #[test]
    fn auto_label_is_none() {
        assert_eq!(JackOverride::Auto.label(), "None");
        assert_eq!(JackOverride::LineOut.label(), "Line-Out");
        assert_eq!(JackOverride::labels().len(), 8);
    }

    #[test]
    fn category_and_from_are_inverse() {
        for i in 0..8 {
            let o = JackOverride::try_from(i).unwrap();
            assert_eq!(JackOverride::from(o.category()), o);
        }
    }

    #[test]
    fn every_recipe_reports_mechanical() {
        for c in RawCategory::ALL {
            assert!(c.recipe().report.contains(JackStatus::MECHANICAL));
        }
    }

    #[test]
    fn recipes_stay_inside_switch_mask() {
        for c in RawCategory::ALL {
            let r = c.recipe();
            assert_eq!(r.hsdet_mode & !reg::HS2_SWITCH_MASK, 0);
            assert_eq!(r.mic_ctrl & !MIC_CTRL_MASK, 0);
        }
    }

    #[test]
    fn line_in_and_mic_keep_clamp() {
        assert_eq!(RawCategory::LineIn.recipe().clamp_ctrl, 0);
        assert_eq!(RawCategory::Microphone.recipe().clamp_ctrl, 0);
        assert_ne!(RawCategory::Headphone.recipe().clamp_ctrl, 0);
    }

    #[test]
    fn ctia_and_omtp_are_headsets() {
        assert!(RawCategory::Ctia.recipe().report.contains(JackStatus::HEADSET));
        assert!(RawCategory::Omtp.recipe().report.contains(JackStatus::HEADSET));
    }
}
