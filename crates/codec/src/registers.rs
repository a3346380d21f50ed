//! Accessory-detect register map
//!
//! 32-bit registers at 32-bit addresses. Only the fields the detection engine
//! touches are named here; everything else on the device belongs to the
//! audio path and is never written by this crate.
//!
//! # Sense status encoding
//!
//! `TIP_RING_SENSE_INTERRUPT_STATUS` carries a 2-bit debounced plug state per
//! sense line. `0b11` means plugged, `0b00` unplugged; intermediate values
//! are transient and treated as not present.
//!
//! # Headset bias modes (`MIC_DETECT_CONTROL_1.HSBIAS_MODE`)
//!
//! | Value | Meaning                              |
//! |-------|--------------------------------------|
//! | 0x0   | Off (load detection)                 |
//! | 0x1   | Idle / static compare                |
//! | 0x2   | Low drive                            |
//! | 0x3   | High drive (type detection default)  |

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Block enable 3: capture ADC enables
pub const BLOCK_EN3: u32 = 0x0000_6008;

/// Block enable 8: headphone amplifier enable
pub const BLOCK_EN8: u32 = 0x0000_601C;

/// Amplifier control: adaptive power mode
pub const CTRL: u32 = 0x0000_9000;

/// Input path B control 1 (PGA)
pub const ADC_B_CTRL1: u32 = 0x0000_A008;

/// Input path B control 2 (PGA)
pub const ADC_B_CTRL2: u32 = 0x0000_A00C;

/// Headphone DAC config 1: volume envelope
pub const DACCNFG1: u32 = 0x0001_1000;

/// Headphone DAC config 2: high-pass filter
pub const DACCNFG2: u32 = 0x0001_1004;

/// Headphone PGA volume ramp rates
pub const PGAVOL: u32 = 0x0001_100C;

/// Headphone load-detector enable
pub const LOADDETENA: u32 = 0x0001_1020;

/// Headphone load-detector results
pub const LOADDETRESULTS: u32 = 0x0001_1024;

/// Power-down control: ring sense enable
pub const PDNCNTL: u32 = 0x0002_0000;

/// Ring sense debounce / polarity
pub const RINGSENSE_DEB_CTRL: u32 = 0x0002_0004;

/// Tip sense debounce / polarity
pub const TIPSENSE_DEB_CTRL: u32 = 0x0002_0008;

/// Debounced tip / ring plug state
pub const TIP_RING_SENSE_INTERRUPT_STATUS: u32 = 0x0002_0010;

/// Headset switch matrix, auto-detect mode and bias ramp
pub const HS2: u32 = 0x0002_B004;

/// Auto-detect result
pub const HS_STAT: u32 = 0x0002_B008;

/// Headset bias mode and button detect mode
pub const MIC_DETECT_CONTROL_1: u32 = 0x0002_B00C;

/// Jack detect mode, bias-sense trip and clamp automation
pub const HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL: u32 = 0x0002_B010;

/// Button comb-filter reading and bias clamp status
pub const DETECT_STATUS_1: u32 = 0x0002_B014;

/// Stereo microphone configuration
pub const STEREO_MIC_CTRL: u32 = 0x0002_B020;

/// Stereo microphone clamp forcing
pub const STEREO_MIC_CLAMP_CTRL: u32 = 0x0002_B024;

// ---------------------------------------------------------------------------
// BLOCK_EN3 / BLOCK_EN8
// ---------------------------------------------------------------------------

/// ADC1 enable
pub const ADC1_EN_MASK: u32 = 1 << 0;
/// ADC2 enable
pub const ADC2_EN_MASK: u32 = 1 << 1;
/// Both capture ADCs
pub const ADC_EN_MASK: u32 = ADC1_EN_MASK | ADC2_EN_MASK;

/// Headphone amplifier enable
pub const HP_EN_MASK: u32 = 1 << 0;

// ---------------------------------------------------------------------------
// CTRL / DACCNFG / PGAVOL / LOADDET
// ---------------------------------------------------------------------------

/// Adaptive power mode field
pub const ADPTPWR_MODE_MASK: u32 = 0x7 << ADPTPWR_MODE_SHIFT;
/// Adaptive power mode shift
pub const ADPTPWR_MODE_SHIFT: u32 = 0;
/// Reduced power mode used during load detection
pub const ADPTPWR_MODE_LOADDET: u32 = 0x4 << ADPTPWR_MODE_SHIFT;
/// Normal adaptive power mode
pub const ADPTPWR_MODE_NORMAL: u32 = 0x7 << ADPTPWR_MODE_SHIFT;

/// Headphone master volume envelope enable
pub const HP_MSTR_VOL_CTRL_EN_MASK: u32 = 1 << 4;

/// Headphone high-pass filter enable
pub const HP_HPF_EN_MASK: u32 = 1 << 1;

/// Digital volume ramp rate
pub const HP_DIG_VOL_RAMP_MASK: u32 = 0x7 << HP_DIG_VOL_RAMP_SHIFT;
/// Digital volume ramp shift
pub const HP_DIG_VOL_RAMP_SHIFT: u32 = 0;
/// Analogue volume ramp rate
pub const HP_ANA_VOL_RAMP_MASK: u32 = 0x7 << 4;
/// Fast ramp written during load detection (digital 0x6, analogue 0)
pub const VOL_RAMP_LOADDET: u32 = 0x6;
/// Normal ramp (digital 0x4, analogue 0)
pub const VOL_RAMP_NORMAL: u32 = 0x4 << HP_DIG_VOL_RAMP_SHIFT;

/// Load detector enable
pub const HPLOAD_DET_EN_MASK: u32 = 1 << 0;

/// Load detector impedance class
pub const AMP3_RES_DET_MASK: u32 = 0x3;

// ---------------------------------------------------------------------------
// ADC_B_CTRL1 / ADC_B_CTRL2
// ---------------------------------------------------------------------------

/// PGA wide-swing (line level) input mode
pub const PGA_WIDESWING_MODE_EN_MASK: u32 = 1 << 7;

// ---------------------------------------------------------------------------
// PDNCNTL / sense debounce
// ---------------------------------------------------------------------------

/// Ring sense enable
pub const RING_SENSE_EN_MASK: u32 = 1 << 1;

/// Tip sense polarity invert (always set: the detector wants an inverted signal)
pub const TIPSENSE_INV_MASK: u32 = 1 << 7;
/// Tip falling-edge debounce index
pub const TIPSENSE_FALLING_DB_TIME_MASK: u32 = 0x7 << TIPSENSE_FALLING_DB_TIME_SHIFT;
/// Tip falling-edge debounce shift
pub const TIPSENSE_FALLING_DB_TIME_SHIFT: u32 = 0;
/// Tip rising-edge debounce index
pub const TIPSENSE_RISING_DB_TIME_MASK: u32 = 0x7 << TIPSENSE_RISING_DB_TIME_SHIFT;
/// Tip rising-edge debounce shift
pub const TIPSENSE_RISING_DB_TIME_SHIFT: u32 = 3;

/// Ring sense polarity invert
pub const RINGSENSE_INV_MASK: u32 = 1 << 7;
/// Ring sense pull-up (active high power-down-bar)
pub const RINGSENSE_PULLUP_PDNB_MASK: u32 = 1 << 6;
/// Ring falling-edge debounce index
pub const RINGSENSE_FALLING_DB_TIME_MASK: u32 = 0x7 << RINGSENSE_FALLING_DB_TIME_SHIFT;
/// Ring falling-edge debounce shift
pub const RINGSENSE_FALLING_DB_TIME_SHIFT: u32 = 0;
/// Ring rising-edge debounce index
pub const RINGSENSE_RISING_DB_TIME_MASK: u32 = 0x7 << RINGSENSE_RISING_DB_TIME_SHIFT;
/// Ring rising-edge debounce shift
pub const RINGSENSE_RISING_DB_TIME_SHIFT: u32 = 3;

/// Tip debounced plug state shift (2-bit field)
pub const TIPSENSE_PLUG_DB_STS_SHIFT: u32 = 0;
/// Ring debounced plug state shift (2-bit field)
pub const RINGSENSE_PLUG_DB_STS_SHIFT: u32 = 2;
/// Plug state field width mask
pub const PLUG_STS_MASK: u32 = 0x3;
/// Plug state: present
pub const PLUG_PRESENT: u32 = 0x3;
/// Plug state: absent
pub const PLUG_ABSENT: u32 = 0x0;

// ---------------------------------------------------------------------------
// HS2
// ---------------------------------------------------------------------------

/// Amp 3/4 ground reference on sleeve pole 3
pub const AMP3_4_GNDREF_HS3_SEL_MASK: u32 = 1 << 7;
/// Amp 3/4 ground reference on pole 4
pub const AMP3_4_GNDREF_HS4_SEL_MASK: u32 = 1 << 6;
/// Bias ground reference on pole 3
pub const HSBIAS_GNDREF_HS3_SEL_MASK: u32 = 1 << 5;
/// Bias ground reference on pole 4
pub const HSBIAS_GNDREF_HS4_SEL_MASK: u32 = 1 << 4;
/// Bias output on pole 3
pub const HSBIAS_OUT_HS3_SEL_MASK: u32 = 1 << 3;
/// Bias output on pole 4
pub const HSBIAS_OUT_HS4_SEL_MASK: u32 = 1 << 2;
/// Headset ground on pole 3
pub const HSGND_HS3_SEL_MASK: u32 = 1 << 1;
/// Headset ground on pole 4
pub const HSGND_HS4_SEL_MASK: u32 = 1 << 0;

/// Auto-detect window index
pub const AUTO_HSDET_TIME_MASK: u32 = 0x7 << AUTO_HSDET_TIME_SHIFT;
/// Auto-detect window shift
pub const AUTO_HSDET_TIME_SHIFT: u32 = 8;

/// Auto-detect circuit mode
pub const HSDET_MODE_MASK: u32 = 0x3 << HSDET_MODE_SHIFT;
/// Auto-detect circuit mode shift
pub const HSDET_MODE_SHIFT: u32 = 16;
/// Auto-detect mode: static compare
pub const HSDET_MODE_STATIC: u32 = 0x2 << HSDET_MODE_SHIFT;
/// Auto-detect mode: run continuously
pub const HSDET_MODE_RUN: u32 = 0x3 << HSDET_MODE_SHIFT;

/// Manual switch-matrix mode
pub const HSDET_MANUAL_MODE_MASK: u32 = 0x3 << HSDET_MANUAL_MODE_SHIFT;
/// Manual switch-matrix mode shift
pub const HSDET_MANUAL_MODE_SHIFT: u32 = 18;

/// Headset clamp disable
pub const HS_CLAMP_DISABLE_MASK: u32 = 1 << 24;

/// Bias ramp time index
pub const HSBIAS_RAMP_MASK: u32 = 0x3 << HSBIAS_RAMP_SHIFT;
/// Bias ramp time shift
pub const HSBIAS_RAMP_SHIFT: u32 = 28;

/// Every switch-matrix field an override rewrites
pub const HS2_SWITCH_MASK: u32 = HSDET_MODE_MASK
    | HSDET_MANUAL_MODE_MASK
    | AMP3_4_GNDREF_HS3_SEL_MASK
    | AMP3_4_GNDREF_HS4_SEL_MASK
    | HSBIAS_GNDREF_HS3_SEL_MASK
    | HSBIAS_GNDREF_HS4_SEL_MASK
    | HSBIAS_OUT_HS3_SEL_MASK
    | HSBIAS_OUT_HS4_SEL_MASK
    | HSGND_HS3_SEL_MASK
    | HSGND_HS4_SEL_MASK;

// ---------------------------------------------------------------------------
// HS_STAT / DETECT_STATUS_1
// ---------------------------------------------------------------------------

/// Auto-detect wiring result
pub const HSDET_TYPE_STS_MASK: u32 = 0x3;

/// Button comb-filter reading
pub const HSDET_DC_STS_MASK: u32 = 0x1FF << HSDET_DC_STS_SHIFT;
/// Button comb-filter reading shift
pub const HSDET_DC_STS_SHIFT: u32 = 0;

/// Bias-sense clamp tripped
pub const HSBIAS_CLAMP_STS_MASK: u32 = 1 << 16;

// ---------------------------------------------------------------------------
// MIC_DETECT_CONTROL_1
// ---------------------------------------------------------------------------

/// Headset bias mode
pub const HSBIAS_MODE_MASK: u32 = 0x3 << HSBIAS_MODE_SHIFT;
/// Headset bias mode shift
pub const HSBIAS_MODE_SHIFT: u32 = 0;
/// Bias off
pub const HSBIAS_MODE_OFF: u32 = 0x0;
/// Bias idle
pub const HSBIAS_MODE_IDLE: u32 = 0x1 << HSBIAS_MODE_SHIFT;
/// Bias low drive
pub const HSBIAS_MODE_LOW: u32 = 0x2 << HSBIAS_MODE_SHIFT;
/// Bias high drive
pub const HSBIAS_MODE_HIGH: u32 = 0x3 << HSBIAS_MODE_SHIFT;

/// Button detect mode
pub const BUTTON_DETECT_MODE_MASK: u32 = 0x3 << BUTTON_DETECT_MODE_SHIFT;
/// Button detect mode shift
pub const BUTTON_DETECT_MODE_SHIFT: u32 = 3;
/// Button detect at low bias
pub const BUTTON_DETECT_MODE_LOW: u32 = 0x1 << BUTTON_DETECT_MODE_SHIFT;
/// Button detect at high bias
pub const BUTTON_DETECT_MODE_HIGH: u32 = 0x3 << BUTTON_DETECT_MODE_SHIFT;

/// Microphone level detector disable
pub const MIC_LVL_DET_DISABLE_MASK: u32 = 1 << 7;

// ---------------------------------------------------------------------------
// HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL
// ---------------------------------------------------------------------------

/// Jack detect mode (0x1 = no pull-up, 0x3 = pull-up)
pub const JACKDET_MODE_MASK: u32 = 0x3 << JACKDET_MODE_SHIFT;
/// Jack detect mode shift
pub const JACKDET_MODE_SHIFT: u32 = 0;
/// Jack detect invert
pub const JACKDET_INV_MASK: u32 = 1 << JACKDET_INV_SHIFT;
/// Jack detect invert shift
pub const JACKDET_INV_SHIFT: u32 = 2;
/// Bias-sense enable
pub const HSBIAS_SENSE_EN_MASK: u32 = 1 << 4;
/// Automatic bias clamp enable
pub const AUTO_HSBIAS_CLAMP_EN_MASK: u32 = 1 << 5;
/// Disable automatic ADC mute on button press
pub const S0_AUTO_ADCMUTE_DISABLE_MASK: u32 = 1 << 9;
/// Bias-sense trip current index
pub const HSBIAS_SENSE_TRIP_MASK: u32 = 0x7 << HSBIAS_SENSE_TRIP_SHIFT;
/// Bias-sense trip current shift
pub const HSBIAS_SENSE_TRIP_SHIFT: u32 = 24;

// ---------------------------------------------------------------------------
// STEREO_MIC_CTRL / STEREO_MIC_CLAMP_CTRL
// ---------------------------------------------------------------------------

/// Jack stereo microphone configuration
pub const JACK_STEREO_CONFIG_MASK: u32 = 0x3 << JACK_STEREO_CONFIG_SHIFT;
/// Jack stereo microphone configuration shift
pub const JACK_STEREO_CONFIG_SHIFT: u32 = 0;
/// Bias on headset pole 1
pub const HS1_BIAS_EN_MASK: u32 = 1 << 4;
/// Bias on headset pole 2
pub const HS2_BIAS_EN_MASK: u32 = 1 << 5;

/// Force-disable the headphone amplifier clamp
pub const SMIC_HPAMP_CLAMP_DIS_FRC_MASK: u32 = 1 << 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hs2_fields_do_not_overlap() {
        let fields = [
            HS2_SWITCH_MASK,
            AUTO_HSDET_TIME_MASK,
            HS_CLAMP_DISABLE_MASK,
            HSBIAS_RAMP_MASK,
        ];
        for (i, a) in fields.iter().enumerate() {
            for b in fields.iter().skip(i + 1) {
                assert_eq!(a & b, 0, "{a:#x} overlaps {b:#x}");
            }
        }
    }

    #[test]
    fn autocontrol_fields_do_not_overlap() {
        let fields = [
            JACKDET_MODE_MASK,
            JACKDET_INV_MASK,
            HSBIAS_SENSE_EN_MASK,
            AUTO_HSBIAS_CLAMP_EN_MASK,
            S0_AUTO_ADCMUTE_DISABLE_MASK,
            HSBIAS_SENSE_TRIP_MASK,
        ];
        let mut seen = 0;
        for f in fields {
            assert_eq!(seen & f, 0);
            seen |= f;
        }
    }

    #[test]
    fn comb_reading_covers_full_range() {
        assert_eq!(HSDET_DC_STS_MASK >> HSDET_DC_STS_SHIFT, 511);
    }

    #[test]
    fn bias_modes_fit_field() {
        for m in [HSBIAS_MODE_OFF, HSBIAS_MODE_IDLE, HSBIAS_MODE_LOW, HSBIAS_MODE_HIGH] {
            assert_eq!(m & !HSBIAS_MODE_MASK, 0);
        }
    }
}
