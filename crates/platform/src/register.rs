//! Register access port abstraction
//!
//! The codec exposes 32-bit registers at 32-bit addresses. The engine only
//! ever reads whole registers and read-modify-writes fields inside them, so
//! the port surface is deliberately small: [`RegisterPort::read`] and
//! [`RegisterPort::update_bits`].
//!
//! Any call may fail with [`PortError::NotReady`] while the device is
//! suspended or detached from its bus.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use embedded_hal_async::i2c::I2c;

/// Register access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError {
    /// Device is suspended, detached or still booting
    NotReady,
    /// Transport-level failure (NAK, arbitration loss, bus error)
    Bus,
}

#[cfg(feature = "std")]
impl std::error::Error for PortError {}

impl core::fmt::Display for PortError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "Device not ready"),
            Self::Bus => write!(f, "Register bus error"),
        }
    }
}

/// Register access trait
pub trait RegisterPort {
    /// Read a full 32-bit register.
    async fn read(&mut self, reg: u32) -> Result<u32, PortError>;

    /// Replace the bits selected by `mask` with the matching bits of `value`.
    ///
    /// Bits outside `mask` are preserved. `value` bits outside `mask` are ignored.
    async fn update_bits(&mut self, reg: u32, mask: u32, value: u32) -> Result<(), PortError>;

    /// Write a full 32-bit register.
    async fn write(&mut self, reg: u32, value: u32) -> Result<(), PortError> {
        self.update_bits(reg, u32::MAX, value).await
    }
}

/// An address NAK means the codec is not answering (held in reset or powered
/// down); anything else is a bus fault.
fn port_error<E: embedded_hal::i2c::Error>(e: E) -> PortError {
    match e.kind() {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => PortError::NotReady,
        _ => PortError::Bus,
    }
}

/// [`RegisterPort`] over an async I²C bus.
///
/// Wire format: 4-byte big-endian register address followed by a 4-byte
/// big-endian value. Reads are a single `write_read` transaction. Field
/// updates are uncached read-modify-write sequences and skip the write when
/// the register already holds the requested bits.
pub struct I2cRegisterPort<I> {
    i2c: I,
    addr: u8,
}

impl<I: I2c> I2cRegisterPort<I> {
    /// Create a port for the device at 7-bit address `addr`.
    pub fn new(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Release the underlying bus.
    pub fn release(self) -> I {
        self.i2c
    }

    async fn write_raw(&mut self, reg: u32, value: u32) -> Result<(), PortError> {
        let mut frame = [0u8; 8];
        let (addr, data) = frame.split_at_mut(4);
        addr.copy_from_slice(&reg.to_be_bytes());
        data.copy_from_slice(&value.to_be_bytes());
        self.i2c
            .write(self.addr, &frame)
            .await
            .map_err(port_error)
    }
}

impl<I: I2c> RegisterPort for I2cRegisterPort<I> {
    async fn read(&mut self, reg: u32) -> Result<u32, PortError> {
        let mut buf = [0u8; 4];
        self.i2c
            .write_read(self.addr, &reg.to_be_bytes(), &mut buf)
            .await
            .map_err(port_error)?;
        Ok(u32::from_be_bytes(buf))
    }

    async fn update_bits(&mut self, reg: u32, mask: u32, value: u32) -> Result<(), PortError> {
        let old = self.read(reg).await?;
        let new = (old & !mask) | (value & mask);
        if new == old {
            return Ok(());
        }
        self.write_raw(reg, new).await
    }

    async fn write(&mut self, reg: u32, value: u32) -> Result<(), PortError> {
        self.write_raw(reg, value).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = 0x1A;

    #[tokio::test]
    async fn read_is_single_write_read_big_endian() {
        let expectations = [Transaction::write_read(
            ADDR,
            vec![0x00, 0x02, 0xB0, 0x0C],
            vec![0x00, 0x00, 0x01, 0x23],
        )];
        let mut port = I2cRegisterPort::new(I2cMock::new(&expectations), ADDR);
        assert_eq!(port.read(0x0002_B00C).await.unwrap(), 0x123);
        port.release().done();
    }

    #[tokio::test]
    async fn update_bits_preserves_unmasked_bits() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0, 0, 0x10, 0], vec![0xF0, 0, 0, 0x0F]),
            Transaction::write(ADDR, vec![0, 0, 0x10, 0, 0xF0, 0, 0, 0x05]),
        ];
        let mut port = I2cRegisterPort::new(I2cMock::new(&expectations), ADDR);
        port.update_bits(0x1000, 0x0F, 0x05).await.unwrap();
        port.release().done();
    }

    #[tokio::test]
    async fn update_bits_skips_redundant_write() {
        let expectations = [Transaction::write_read(
            ADDR,
            vec![0, 0, 0x10, 0],
            vec![0, 0, 0, 0x05],
        )];
        let mut port = I2cRegisterPort::new(I2cMock::new(&expectations), ADDR);
        port.update_bits(0x1000, 0x0F, 0x05).await.unwrap();
        port.release().done();
    }

    #[tokio::test]
    async fn full_write_does_not_read_back() {
        let expectations = [Transaction::write(
            ADDR,
            vec![0, 0, 0x20, 0x04, 0xDE, 0xAD, 0xBE, 0xEF],
        )];
        let mut port = I2cRegisterPort::new(I2cMock::new(&expectations), ADDR);
        port.write(0x2004, 0xDEAD_BEEF).await.unwrap();
        port.release().done();
    }

    #[tokio::test]
    async fn address_nak_is_not_ready() {
        let expectations = [Transaction::write_read(ADDR, vec![0, 0, 0x10, 0], vec![0; 4])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))];
        let mut port = I2cRegisterPort::new(I2cMock::new(&expectations), ADDR);
        assert_eq!(port.read(0x1000).await, Err(PortError::NotReady));
        port.release().done();
    }

    #[tokio::test]
    async fn arbitration_loss_is_bus_error() {
        let expectations = [Transaction::write(ADDR, vec![0, 0, 0x20, 0x04, 0, 0, 0, 1])
            .with_error(ErrorKind::ArbitrationLoss)];
        let mut port = I2cRegisterPort::new(I2cMock::new(&expectations), ADDR);
        assert_eq!(port.write(0x2004, 1).await, Err(PortError::Bus));
        port.release().done();
    }

    #[test]
    fn port_error_display() {
        assert_eq!(format!("{}", PortError::NotReady), "Device not ready");
        assert_eq!(format!("{}", PortError::Bus), "Register bus error");
    }
}
