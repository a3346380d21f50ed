//! Jack sink abstraction

use crate::jack_types::JackStatus;

/// Receives jack status reports for presentation to the rest of the audio stack.
///
/// Reports are `(status, mask)` pairs: only bits in `mask` change. A removal
/// is reported as `(JackStatus::NONE, JackStatus::ALL)`.
pub trait JackSink {
    /// Publish a status update.
    fn report(&mut self, status: JackStatus, mask: JackStatus);
}

/// Sink that discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl JackSink for NullSink {
    fn report(&mut self, _status: JackStatus, _mask: JackStatus) {}
}
