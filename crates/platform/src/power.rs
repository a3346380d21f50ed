//! Runtime power management abstraction
//!
//! Every register sequence runs inside a "resume and keep alive" scope. The
//! scope is represented by a guard; dropping the guard marks the device as
//! last used now and lets autosuspend run after its idle delay.

use crate::register::PortError;

/// Runtime power gate
pub trait PowerGate {
    /// Scope guard that keeps the device resumed while alive
    type Guard<'a>
    where
        Self: 'a;

    /// Resume the device (if needed) and keep it resumed until the guard drops.
    ///
    /// May block briefly while the device resumes.
    async fn acquire(&self) -> Result<Self::Guard<'_>, PortError>;

    /// Take a long-lived reference that keeps the device resumed while a jack is inserted.
    fn hold(&self) {}

    /// Drop the reference taken by [`PowerGate::hold`].
    fn release(&self) {}
}

/// Power gate for devices without runtime power management.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOn;

impl PowerGate for AlwaysOn {
    type Guard<'a> = ();

    async fn acquire(&self) -> Result<Self::Guard<'_>, PortError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_on_never_fails() {
        let gate = AlwaysOn;
        assert!(gate.acquire().await.is_ok());
        gate.hold();
        gate.release();
    }
}
