//! Jack domain newtypes.
//!
//! - `JackStatus`: capability bitmask handed to the jack sink (bit layout
//!   matches the ALSA `snd_jack_types` values so sinks can forward it as-is)
//! - `JackButton`: one of the six headset buttons a threshold table may name
//! - `Ohms`: impedance estimate produced by button classification

use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

// ── JackStatus ───────────────────────────────────────────────────────────────

/// Jack capability bitmask.
///
/// A report is always a `(status, mask)` pair: only bits set in the mask are
/// updated, the rest of the sink's latched state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct JackStatus(u16);

impl JackStatus {
    /// Nothing reported.
    pub const NONE: Self = Self(0);
    /// Headphone (stereo output) present.
    pub const HEADPHONE: Self = Self(0x0001);
    /// Microphone present.
    pub const MICROPHONE: Self = Self(0x0002);
    /// Headset: headphone + microphone.
    pub const HEADSET: Self = Self(0x0003);
    /// Line output present.
    pub const LINEOUT: Self = Self(0x0004);
    /// Mechanical switch reports a plug in the socket.
    pub const MECHANICAL: Self = Self(0x0008);
    /// Video output present.
    pub const VIDEOOUT: Self = Self(0x0010);
    /// Combined audio/video (optical adapter) output.
    pub const AVOUT: Self = Self(0x0014);
    /// Line input present.
    pub const LINEIN: Self = Self(0x0020);
    /// Button 0 asserted.
    pub const BTN_0: Self = Self(0x4000);
    /// Button 1 asserted.
    pub const BTN_1: Self = Self(0x2000);
    /// Button 2 asserted.
    pub const BTN_2: Self = Self(0x1000);
    /// Button 3 asserted.
    pub const BTN_3: Self = Self(0x0800);
    /// Button 4 asserted.
    pub const BTN_4: Self = Self(0x0400);
    /// Button 5 asserted.
    pub const BTN_5: Self = Self(0x0200);
    /// All six button bits.
    pub const BUTTONS: Self = Self(0x7E00);
    /// Every bit a report may clear.
    pub const ALL: Self = Self(0xFFFF);

    /// Build from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bitwise union, usable in `const` context.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Button bits only.
    #[must_use]
    pub const fn buttons(self) -> Self {
        Self(self.0 & Self::BUTTONS.0)
    }

    /// Apply a `(status, mask)` report to a latched state.
    #[must_use]
    pub const fn apply(self, status: Self, mask: Self) -> Self {
        Self((self.0 & !mask.0) | (status.0 & mask.0))
    }
}

impl BitOr for JackStatus {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for JackStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for JackStatus {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for JackStatus {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

// ── JackButton ───────────────────────────────────────────────────────────────

/// Headset button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JackButton {
    /// Button 0
    Btn0,
    /// Button 1
    Btn1,
    /// Button 2
    Btn2,
    /// Button 3
    Btn3,
    /// Button 4
    Btn4,
    /// Button 5
    Btn5,
}

impl JackButton {
    /// Status bit reported while this button is held.
    #[must_use]
    pub const fn status(self) -> JackStatus {
        match self {
            Self::Btn0 => JackStatus::BTN_0,
            Self::Btn1 => JackStatus::BTN_1,
            Self::Btn2 => JackStatus::BTN_2,
            Self::Btn3 => JackStatus::BTN_3,
            Self::Btn4 => JackStatus::BTN_4,
            Self::Btn5 => JackStatus::BTN_5,
        }
    }

    /// Conventional key binding for sinks that synthesise input events.
    #[must_use]
    pub const fn default_key(self) -> ButtonKey {
        match self {
            Self::Btn0 => ButtonKey::PlayPause,
            Self::Btn1 => ButtonKey::VolumeUp,
            Self::Btn2 => ButtonKey::VolumeDown,
            Self::Btn3 => ButtonKey::VoiceCommand,
            Self::Btn4 => ButtonKey::Next,
            Self::Btn5 => ButtonKey::Previous,
        }
    }
}

/// Media key a headset button maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonKey {
    /// Play / pause toggle
    PlayPause,
    /// Volume up
    VolumeUp,
    /// Volume down
    VolumeDown,
    /// Voice assistant
    VoiceCommand,
    /// Next track
    Next,
    /// Previous track
    Previous,
}

// ── Ohms ─────────────────────────────────────────────────────────────────────

/// Impedance in ohms.
///
/// `Ohms::OPEN` (`u32::MAX`) stands for a reading the comb filter could not
/// resolve (effectively open circuit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Ohms(u32);

impl Ohms {
    /// Unresolvable / open-circuit reading.
    pub const OPEN: Self = Self(u32::MAX);

    /// Wrap a raw ohm value.
    #[must_use]
    pub const fn new(ohms: u32) -> Self {
        Self(ohms)
    }

    /// Return the raw ohm value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headset_is_headphone_plus_microphone() {
        assert_eq!(
            JackStatus::HEADPHONE | JackStatus::MICROPHONE,
            JackStatus::HEADSET
        );
    }

    #[test]
    fn avout_is_lineout_plus_video() {
        assert_eq!(JackStatus::LINEOUT | JackStatus::VIDEOOUT, JackStatus::AVOUT);
    }

    #[test]
    fn button_bits_are_disjoint_from_categories() {
        let categories = JackStatus::HEADSET
            | JackStatus::LINEOUT
            | JackStatus::MECHANICAL
            | JackStatus::AVOUT
            | JackStatus::LINEIN;
        assert!((categories & JackStatus::BUTTONS).is_empty());
    }

    #[test]
    fn apply_only_touches_masked_bits() {
        let latched = JackStatus::MECHANICAL | JackStatus::HEADSET;
        let pressed = latched.apply(JackStatus::BTN_1, JackStatus::BUTTONS);
        assert_eq!(pressed, latched | JackStatus::BTN_1);
        let released = pressed.apply(JackStatus::NONE, JackStatus::BUTTONS);
        assert_eq!(released, latched);
    }

    #[test]
    fn every_button_has_a_distinct_bit() {
        let all = [
            JackButton::Btn0,
            JackButton::Btn1,
            JackButton::Btn2,
            JackButton::Btn3,
            JackButton::Btn4,
            JackButton::Btn5,
        ];
        let mut seen = JackStatus::NONE;
        for b in all {
            assert!((seen & b.status()).is_empty());
            seen |= b.status();
        }
        assert_eq!(seen, JackStatus::BUTTONS);
    }

    #[test]
    fn open_reading_is_largest() {
        assert!(Ohms::OPEN > Ohms::new(1_000_000));
    }
}
