//! Detection engine errors

use platform::PortError;

/// Hardware wait that exceeded its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitStage {
    /// Auto-detect circuit never reported a wiring type
    TypeDetect,
    /// Load detector never completed
    LoadDetect,
    /// Headphone amplifier shutdown before load detection
    HpShutdown,
    /// Headphone amplifier restart after load detection
    HpStartup,
}

impl WaitStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::TypeDetect => "type detect",
            Self::LoadDetect => "load detect",
            Self::HpShutdown => "headphone shutdown",
            Self::HpStartup => "headphone startup",
        }
    }
}

/// Accessory detection errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetectError {
    /// Configuration value is not one the hardware supports
    InvalidConfig {
        /// Offending configuration field
        field: &'static str,
    },
    /// Override requested with no jack physically present
    Busy,
    /// Bounded hardware wait exceeded
    Timeout(WaitStage),
    /// Register access failed (device suspended, detached or bus error)
    DeviceUnavailable,
    /// Jack removed while a measurement was in flight
    JackRemoved,
    /// Override selection outside `0..=7`
    InvalidOverride(u32),
    /// Status field held an encoding with no known meaning
    UnknownStatus,
}

#[cfg(feature = "std")]
impl std::error::Error for DetectError {}

impl core::fmt::Display for DetectError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConfig { field } => write!(f, "Invalid accessory config: {field}"),
            Self::Busy => write!(f, "No jack present"),
            Self::Timeout(stage) => write!(f, "Timed out waiting for {}", stage.as_str()),
            Self::DeviceUnavailable => write!(f, "Codec unavailable"),
            Self::JackRemoved => write!(f, "Jack removed during detection"),
            Self::InvalidOverride(v) => write!(f, "Invalid jack override: {v}"),
            Self::UnknownStatus => write!(f, "Unknown detect status"),
        }
    }
}

impl From<PortError> for DetectError {
    fn from(_: PortError) -> Self {
        Self::DeviceUnavailable
    }
}
