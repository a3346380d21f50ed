//! Type system tests for the jack domain newtypes.
//! Sinks forward `JackStatus` bits untouched, so the layout is load-bearing.

// ── JackStatus ───────────────────────────────────────────────────────────────

#[test]
fn jack_status_bits_match_sink_layout() {
    use platform::JackStatus;
    assert_eq!(JackStatus::HEADPHONE.bits(), 0x0001);
    assert_eq!(JackStatus::MICROPHONE.bits(), 0x0002);
    assert_eq!(JackStatus::LINEOUT.bits(), 0x0004);
    assert_eq!(JackStatus::MECHANICAL.bits(), 0x0008);
    assert_eq!(JackStatus::VIDEOOUT.bits(), 0x0010);
    assert_eq!(JackStatus::LINEIN.bits(), 0x0020);
    assert_eq!(JackStatus::BTN_0.bits(), 0x4000);
    assert_eq!(JackStatus::BTN_5.bits(), 0x0200);
}

#[test]
fn jack_status_is_two_bytes() {
    use platform::JackStatus;
    assert_eq!(core::mem::size_of::<JackStatus>(), 2);
}

#[test]
fn jack_status_contains_subsets() {
    use platform::JackStatus;
    let plugged = JackStatus::MECHANICAL | JackStatus::HEADSET;
    assert!(plugged.contains(JackStatus::HEADPHONE));
    assert!(plugged.contains(JackStatus::MICROPHONE));
    assert!(!plugged.contains(JackStatus::LINEOUT));
}

#[test]
fn jack_status_buttons_strips_categories() {
    use platform::JackStatus;
    let s = JackStatus::HEADSET | JackStatus::BTN_2;
    assert_eq!(s.buttons(), JackStatus::BTN_2);
}

// ── JackButton ───────────────────────────────────────────────────────────────

#[test]
fn default_keys_follow_headset_convention() {
    use platform::{ButtonKey, JackButton};
    assert_eq!(JackButton::Btn0.default_key(), ButtonKey::PlayPause);
    assert_eq!(JackButton::Btn1.default_key(), ButtonKey::VolumeUp);
    assert_eq!(JackButton::Btn2.default_key(), ButtonKey::VolumeDown);
    assert_eq!(JackButton::Btn3.default_key(), ButtonKey::VoiceCommand);
}

#[test]
fn button_status_is_single_bit() {
    use platform::JackButton;
    for b in [
        JackButton::Btn0,
        JackButton::Btn1,
        JackButton::Btn2,
        JackButton::Btn3,
        JackButton::Btn4,
        JackButton::Btn5,
    ] {
        assert_eq!(b.status().bits().count_ones(), 1, "{b:?}");
    }
}

// ── Ohms ─────────────────────────────────────────────────────────────────────

#[test]
fn ohms_round_trips_value() {
    use platform::Ohms;
    assert_eq!(Ohms::new(147).get(), 147);
    assert_eq!(Ohms::OPEN.get(), u32::MAX);
}
