//! Accessory detection configuration
//!
//! [`DetectionConfig`] is the caller-facing description in natural units
//! (microseconds, milliseconds, microamps, ohms). The hardware only supports a
//! handful of discrete values per timing field, so a configuration is checked
//! with [`DetectionConfig::validate`] before install, producing an
//! [`EncodedConfig`] holding the register-field encodings.
//!
//! # Supported values
//!
//! | Field              | Values                                               |
//! |--------------------|------------------------------------------------------|
//! | `detect_us`        | 20, 100, 1000, 10000, 50000, 75000, 100000, 200000   |
//! | sense debounce ms  | 0, 125, 250, 500, 750, 1000, 1250, 1500              |
//! | `bias_ramp_ms`     | 10, 40, 90, 170                                      |
//! | `bias_sense_ua`    | 0 (disabled), 14, 23, 41, 50, 60, 68, 86, 95         |
//!
//! `tip_debounce_ms` is a software delay and accepts any value.

use embassy_time::Duration;
use platform::{JackButton, Ohms};

use crate::error::DetectError;
use crate::registers as reg;

/// Maximum number of button thresholds.
pub const MAX_BUTTONS: usize = 6;

/// Slack added to the auto-detect window when waiting for its result.
const TYPE_DETECT_SLACK_MS: u64 = 200;

// ── Hardware encodings ───────────────────────────────────────────────────────

macro_rules! hw_encoding {
    (
        $(#[$meta:meta])*
        $name:ident, $unit:ident, $from:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[allow(missing_docs)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every supported value, in register-index order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Value in the field's natural unit.
            #[must_use]
            pub const fn $unit(self) -> u32 {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            /// Look up a supported value; `None` if the hardware cannot encode it.
            #[must_use]
            pub fn $from(value: u32) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.$unit() == value)
            }

            /// Register field encoding.
            #[must_use]
            pub const fn index(self) -> u32 {
                self as u32
            }

            /// Decode a register field.
            #[must_use]
            pub fn from_index(index: u32) -> Option<Self> {
                Self::ALL.get(usize::try_from(index).ok()?).copied()
            }
        }
    };
}

hw_encoding! {
    /// Auto-detect comparator window.
    DetectTime, us, from_us {
        Us20 = 20,
        Us100 = 100,
        Us1000 = 1_000,
        Us10000 = 10_000,
        Us50000 = 50_000,
        Us75000 = 75_000,
        Us100000 = 100_000,
        Us200000 = 200_000,
    }
}

hw_encoding! {
    /// Hardware sense-line debounce.
    Debounce, ms, from_ms {
        Ms0 = 0,
        Ms125 = 125,
        Ms250 = 250,
        Ms500 = 500,
        Ms750 = 750,
        Ms1000 = 1_000,
        Ms1250 = 1_250,
        Ms1500 = 1_500,
    }
}

hw_encoding! {
    /// Headset bias ramp time.
    BiasRamp, ms, from_ms {
        Ms10 = 10,
        Ms40 = 40,
        Ms90 = 90,
        Ms170 = 170,
    }
}

hw_encoding! {
    /// Bias-sense clamp trip current.
    BiasSenseTrip, ua, from_ua {
        Ua14 = 14,
        Ua23 = 23,
        Ua41 = 41,
        Ua50 = 50,
        Ua60 = 60,
        Ua68 = 68,
        Ua86 = 86,
        Ua95 = 95,
    }
}

impl DetectTime {
    /// Bound on the wait for an auto-detect result: two windows plus 200 ms.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: division by a non-zero constant
    pub fn type_detect_timeout(self) -> Duration {
        let window_ms = u64::from(self.us()).saturating_mul(2) / 1_000;
        Duration::from_millis(window_ms.saturating_add(TYPE_DETECT_SLACK_MS))
    }
}

impl BiasRamp {
    /// Ramp time as a wait duration.
    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::from_millis(u64::from(self.ms()))
    }
}

// ── Caller-facing configuration ──────────────────────────────────────────────

/// Mechanical sense line (tip or ring switch) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SenseLine {
    /// Enable the internal pull-up.
    pub pullup: bool,
    /// Invert the switch polarity.
    pub invert: bool,
    /// Hardware debounce on insertion, ms.
    pub rise_db_ms: u32,
    /// Hardware debounce on removal, ms.
    pub fall_db_ms: u32,
}

/// One button impedance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonThreshold {
    /// Readings strictly below this many ohms select `button`.
    pub threshold_ohms: u32,
    /// Button reported on a match.
    pub button: JackButton,
}

impl ButtonThreshold {
    /// Create a threshold entry.
    #[must_use]
    pub const fn new(threshold_ohms: u32, button: JackButton) -> Self {
        Self {
            threshold_ohms,
            button,
        }
    }
}

/// Button threshold table.
pub type ButtonTable = heapless::Vec<ButtonThreshold, MAX_BUTTONS>;

/// Accessory detection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionConfig {
    /// Auto-detect comparator window, µs.
    pub detect_us: u32,
    /// Headset bias ramp time, ms.
    pub bias_ramp_ms: u32,
    /// Bias-sense trip current, µA. 0 disables bias sensing.
    pub bias_sense_ua: u32,
    /// Run the headset bias at low drive once detection is done.
    pub bias_low: bool,
    /// Tip sense line.
    pub tip: SenseLine,
    /// Ring sense line; ignored unless `use_ring_sense`.
    pub ring: SenseLine,
    /// Use the ring switch to spot optical adapters.
    pub use_ring_sense: bool,
    /// Software debounce between an insertion edge and classification, ms.
    pub tip_debounce_ms: u32,
    /// Let the hardware mute capture while a button is held.
    pub enable_button_automute: bool,
    /// Button thresholds.
    ///
    /// Scanned in order and the first entry whose threshold exceeds the
    /// measured impedance wins, so the table must be sorted ascending by
    /// threshold. The order is not checked.
    pub buttons: ButtonTable,
}

/// Build a threshold table.
///
/// More than [`MAX_BUTTONS`] entries is rejected with
/// [`DetectError::InvalidConfig`] naming `buttons`.
pub fn button_table(entries: &[ButtonThreshold]) -> Result<ButtonTable, DetectError> {
    ButtonTable::from_slice(entries).map_err(|_| DetectError::InvalidConfig { field: "buttons" })
}

/// Built-in tables; never longer than [`MAX_BUTTONS`].
fn preset_table(entries: &[ButtonThreshold]) -> ButtonTable {
    entries.iter().take(MAX_BUTTONS).copied().collect()
}

impl Default for DetectionConfig {
    /// Generic headset defaults: 10 ms detect window, 170 ms bias ramp, tip
    /// pull-up with 500 ms hardware debounce and the common four-button table.
    fn default() -> Self {
        Self {
            detect_us: 10_000,
            bias_ramp_ms: 170,
            bias_sense_ua: 0,
            bias_low: false,
            tip: SenseLine {
                pullup: true,
                invert: false,
                rise_db_ms: 500,
                fall_db_ms: 500,
            },
            ring: SenseLine::default(),
            use_ring_sense: false,
            tip_debounce_ms: 0,
            enable_button_automute: false,
            buttons: preset_table(&[
                ButtonThreshold::new(70, JackButton::Btn0),
                ButtonThreshold::new(185, JackButton::Btn3),
                ButtonThreshold::new(355, JackButton::Btn1),
                ButtonThreshold::new(735, JackButton::Btn2),
            ]),
        }
    }
}

impl DetectionConfig {
    /// Board preset for sockets wired with a ring switch (optical capable).
    #[must_use]
    pub fn ring_sense_preset() -> Self {
        let line = SenseLine {
            pullup: true,
            invert: false,
            rise_db_ms: 500,
            fall_db_ms: 500,
        };
        Self {
            detect_us: 1_000,
            bias_ramp_ms: 10,
            tip: line,
            ring: line,
            use_ring_sense: true,
            buttons: preset_table(&[
                ButtonThreshold::new(10, JackButton::Btn0),
                ButtonThreshold::new(200, JackButton::Btn1),
            ]),
            ..Self::default()
        }
    }

    /// Check every enumerated field against the hardware-supported values.
    pub fn validate(&self) -> Result<EncodedConfig, DetectError> {
        fn field<T>(v: Option<T>, field: &'static str) -> Result<T, DetectError> {
            v.ok_or(DetectError::InvalidConfig { field })
        }

        let detect = field(DetectTime::from_us(self.detect_us), "detect_us")?;
        let ramp = field(BiasRamp::from_ms(self.bias_ramp_ms), "bias_ramp_ms")?;
        let bias_sense = match self.bias_sense_ua {
            0 => None,
            ua => Some(field(BiasSenseTrip::from_ua(ua), "bias_sense_ua")?),
        };
        let tip_fall = field(Debounce::from_ms(self.tip.fall_db_ms), "tip.fall_db_ms")?;
        let tip_rise = field(Debounce::from_ms(self.tip.rise_db_ms), "tip.rise_db_ms")?;
        let ring = if self.use_ring_sense {
            Some((
                field(Debounce::from_ms(self.ring.fall_db_ms), "ring.fall_db_ms")?,
                field(Debounce::from_ms(self.ring.rise_db_ms), "ring.rise_db_ms")?,
            ))
        } else {
            None
        };

        Ok(EncodedConfig {
            detect,
            ramp,
            bias_sense,
            tip_fall,
            tip_rise,
            ring,
            tip_pullup: self.tip.pullup,
            tip_invert: self.tip.invert,
            ring_pullup: self.ring.pullup,
            ring_invert: self.ring.invert,
            automute: self.enable_button_automute,
        })
    }

    /// First button whose threshold exceeds `ohms`.
    #[must_use]
    pub fn classify(&self, ohms: Ohms) -> Option<JackButton> {
        self.buttons
            .iter()
            .find(|b| ohms.get() < b.threshold_ohms)
            .map(|b| b.button)
    }
}

// ── Register image ───────────────────────────────────────────────────────────

/// A validated configuration in register-field form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodedConfig {
    /// Auto-detect window
    pub detect: DetectTime,
    /// Bias ramp
    pub ramp: BiasRamp,
    /// Bias-sense trip, if enabled
    pub bias_sense: Option<BiasSenseTrip>,
    /// Tip removal debounce
    pub tip_fall: Debounce,
    /// Tip insertion debounce
    pub tip_rise: Debounce,
    /// Ring (fall, rise) debounce when ring sense is in use
    pub ring: Option<(Debounce, Debounce)>,
    tip_pullup: bool,
    tip_invert: bool,
    ring_pullup: bool,
    ring_invert: bool,
    automute: bool,
}

impl EncodedConfig {
    /// `TIPSENSE_DEB_CTRL` value (mask [`EncodedConfig::TIP_DEB_MASK`]).
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: indices are < 8, shifts are constant field offsets
    pub fn tip_deb(&self) -> u32 {
        reg::TIPSENSE_INV_MASK
            | (self.tip_fall.index() << reg::TIPSENSE_FALLING_DB_TIME_SHIFT)
            | (self.tip_rise.index() << reg::TIPSENSE_RISING_DB_TIME_SHIFT)
    }

    /// Fields written in `TIPSENSE_DEB_CTRL`.
    pub const TIP_DEB_MASK: u32 = reg::TIPSENSE_INV_MASK
        | reg::TIPSENSE_FALLING_DB_TIME_MASK
        | reg::TIPSENSE_RISING_DB_TIME_MASK;

    /// `RINGSENSE_DEB_CTRL` value, or `None` without ring sensing.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: indices are < 8, shifts are constant field offsets
    pub fn ring_deb(&self) -> Option<u32> {
        let (fall, rise) = self.ring?;
        let mut v = (fall.index() << reg::RINGSENSE_FALLING_DB_TIME_SHIFT)
            | (rise.index() << reg::RINGSENSE_RISING_DB_TIME_SHIFT);
        // The detector wants an inverted signal, so the invert flag is inverted.
        if !self.ring_invert {
            v |= reg::RINGSENSE_INV_MASK;
        }
        if self.ring_pullup {
            v |= reg::RINGSENSE_PULLUP_PDNB_MASK;
        }
        Some(v)
    }

    /// Fields written in `RINGSENSE_DEB_CTRL`.
    pub const RING_DEB_MASK: u32 = reg::RINGSENSE_INV_MASK
        | reg::RINGSENSE_PULLUP_PDNB_MASK
        | reg::RINGSENSE_FALLING_DB_TIME_MASK
        | reg::RINGSENSE_RISING_DB_TIME_MASK;

    /// `HS2` value: static-compare detect mode, window and ramp.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: indices are < 8, shifts are constant field offsets
    pub fn hs2(&self) -> u32 {
        reg::HSDET_MODE_STATIC
            | (self.detect.index() << reg::AUTO_HSDET_TIME_SHIFT)
            | (self.ramp.index() << reg::HSBIAS_RAMP_SHIFT)
    }

    /// Fields written in `HS2`.
    pub const HS2_MASK: u32 =
        reg::HSBIAS_RAMP_MASK | reg::HSDET_MODE_MASK | reg::AUTO_HSDET_TIME_MASK;

    /// `HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL` value.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: indices are < 8, shifts are constant field offsets
    pub fn autocontrol(&self) -> u32 {
        let mode: u32 = if self.tip_pullup { 0x3 } else { 0x1 };
        let mut v = mode << reg::JACKDET_MODE_SHIFT;
        if self.tip_invert {
            v |= reg::JACKDET_INV_MASK;
        }
        if !self.automute {
            v |= reg::S0_AUTO_ADCMUTE_DISABLE_MASK;
        }
        if let Some(trip) = self.bias_sense {
            v |= trip.index() << reg::HSBIAS_SENSE_TRIP_SHIFT;
        }
        v
    }

    /// Fields written in `HS_BIAS_SENSE_AND_CLAMP_AUTOCONTROL`.
    pub const AUTOCONTROL_MASK: u32 = reg::JACKDET_MODE_MASK
        | reg::JACKDET_INV_MASK
        | reg::S0_AUTO_ADCMUTE_DISABLE_MASK
        | reg::HSBIAS_SENSE_TRIP_MASK;

    /// `PDNCNTL` value.
    #[must_use]
    pub fn pdncntl(&self) -> u32 {
        if self.ring.is_some() {
            reg::RING_SENSE_EN_MASK
        } else {
            0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_encoding_round_trips_through_its_index() {
        for &d in DetectTime::ALL {
            assert_eq!(DetectTime::from_index(d.index()), Some(d));
            assert_eq!(DetectTime::from_us(d.us()), Some(d));
        }
        for &d in Debounce::ALL {
            assert_eq!(Debounce::from_index(d.index()), Some(d));
            assert_eq!(Debounce::from_ms(d.ms()), Some(d));
        }
        for &r in BiasRamp::ALL {
            assert_eq!(BiasRamp::from_index(r.index()), Some(r));
            assert_eq!(BiasRamp::from_ms(r.ms()), Some(r));
        }
        for &t in BiasSenseTrip::ALL {
            assert_eq!(BiasSenseTrip::from_index(t.index()), Some(t));
            assert_eq!(BiasSenseTrip::from_ua(t.ua()), Some(t));
        }
    }

    #[test]
    fn indices_are_dense_from_zero() {
        assert_eq!(DetectTime::Us20.index(), 0);
        assert_eq!(DetectTime::Us200000.index(), 7);
        assert_eq!(BiasRamp::Ms170.index(), 3);
        assert_eq!(DetectTime::from_index(8), None);
        assert_eq!(BiasRamp::from_index(4), None);
    }

    #[test]
    fn type_detect_timeout_is_two_windows_plus_slack() {
        assert_eq!(DetectTime::Us10000.type_detect_timeout(), Duration::from_millis(220));
        assert_eq!(DetectTime::Us20.type_detect_timeout(), Duration::from_millis(200));
        assert_eq!(DetectTime::Us200000.type_detect_timeout(), Duration::from_millis(600));
    }

    #[test]
    fn default_config_validates() {
        let enc = DetectionConfig::default().validate().unwrap();
        assert_eq!(enc.detect, DetectTime::Us10000);
        assert_eq!(enc.ramp, BiasRamp::Ms170);
        assert_eq!(enc.ring, None);
        assert_eq!(enc.pdncntl(), 0);
    }

    #[test]
    fn ring_preset_enables_ring_sense() {
        let enc = DetectionConfig::ring_sense_preset().validate().unwrap();
        assert_eq!(enc.pdncntl(), reg::RING_SENSE_EN_MASK);
        let ring = enc.ring_deb().unwrap();
        assert_ne!(ring & reg::RINGSENSE_INV_MASK, 0);
        assert_ne!(ring & reg::RINGSENSE_PULLUP_PDNB_MASK, 0);
    }

    #[test]
    fn invalid_fields_are_named() {
        let mut cfg = DetectionConfig::default();
        cfg.bias_ramp_ms = 11;
        assert_eq!(
            cfg.validate(),
            Err(DetectError::InvalidConfig { field: "bias_ramp_ms" })
        );

        let mut cfg = DetectionConfig::default();
        cfg.bias_sense_ua = 15;
        assert_eq!(
            cfg.validate(),
            Err(DetectError::InvalidConfig { field: "bias_sense_ua" })
        );

        let mut cfg = DetectionConfig::default();
        cfg.tip.rise_db_ms = 100;
        assert_eq!(
            cfg.validate(),
            Err(DetectError::InvalidConfig { field: "tip.rise_db_ms" })
        );
    }

    #[test]
    fn ring_debounce_ignored_without_ring_sense() {
        let mut cfg = DetectionConfig::default();
        cfg.ring.fall_db_ms = 3;
        assert!(cfg.validate().is_ok());
        cfg.use_ring_sense = true;
        assert_eq!(
            cfg.validate(),
            Err(DetectError::InvalidConfig { field: "ring.fall_db_ms" })
        );
    }

    #[test]
    fn tip_deb_always_inverts() {
        let enc = DetectionConfig::default().validate().unwrap();
        let v = enc.tip_deb();
        assert_ne!(v & reg::TIPSENSE_INV_MASK, 0);
        assert_eq!(v & !EncodedConfig::TIP_DEB_MASK, 0);
        assert_eq!(
            (v & reg::TIPSENSE_RISING_DB_TIME_MASK) >> reg::TIPSENSE_RISING_DB_TIME_SHIFT,
            Debounce::Ms500.index()
        );
    }

    #[test]
    fn autocontrol_encodes_pullup_automute_and_trip() {
        let mut cfg = DetectionConfig::default();
        let v = cfg.validate().unwrap().autocontrol();
        assert_eq!(v & reg::JACKDET_MODE_MASK, 0x3);
        assert_ne!(v & reg::S0_AUTO_ADCMUTE_DISABLE_MASK, 0);
        assert_eq!(v & reg::HSBIAS_SENSE_TRIP_MASK, 0);

        cfg.tip.pullup = false;
        cfg.enable_button_automute = true;
        cfg.bias_sense_ua = 41;
        let v = cfg.validate().unwrap().autocontrol();
        assert_eq!(v & reg::JACKDET_MODE_MASK, 0x1);
        assert_eq!(v & reg::S0_AUTO_ADCMUTE_DISABLE_MASK, 0);
        assert_eq!(
            (v & reg::HSBIAS_SENSE_TRIP_MASK) >> reg::HSBIAS_SENSE_TRIP_SHIFT,
            BiasSenseTrip::Ua41.index()
        );
        assert_eq!(v & !EncodedConfig::AUTOCONTROL_MASK, 0);
    }

    #[test]
    fn hs2_stays_in_static_compare() {
        let v = DetectionConfig::default().validate().unwrap().hs2();
        assert_eq!(v & reg::HSDET_MODE_MASK, reg::HSDET_MODE_STATIC);
        assert_eq!(v & !EncodedConfig::HS2_MASK, 0);
    }

    #[test]
    fn classify_is_first_match_in_table_order() {
        let cfg = DetectionConfig::default();
        assert_eq!(cfg.classify(Ohms::new(10)), Some(JackButton::Btn0));
        assert_eq!(cfg.classify(Ohms::new(150)), Some(JackButton::Btn3));
        assert_eq!(cfg.classify(Ohms::new(735)), None);
        assert_eq!(cfg.classify(Ohms::OPEN), None);
    }

    #[test]
    fn unsorted_table_is_scanned_as_given() {
        let mut cfg = DetectionConfig::default();
        cfg.buttons = button_table(&[
            ButtonThreshold::new(735, JackButton::Btn2),
            ButtonThreshold::new(70, JackButton::Btn0),
        ])
        .unwrap();
        // 50 Ω is below both thresholds; the first entry wins.
        assert_eq!(cfg.classify(Ohms::new(50)), Some(JackButton::Btn2));
    }

    #[test]
    fn button_table_rejects_a_seventh_entry() {
        let six = [ButtonThreshold::new(100, JackButton::Btn0); MAX_BUTTONS];
        assert_eq!(button_table(&six).unwrap().len(), MAX_BUTTONS);

        let seven = [ButtonThreshold::new(100, JackButton::Btn0); MAX_BUTTONS + 1];
        assert_eq!(button_table(&seven), Err(DetectError::InvalidConfig { field: "buttons" }));
    }
}
