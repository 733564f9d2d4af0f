/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

#[cfg(test)]
pub(crate) mod mock_i2c_port;
#[cfg(test)]
pub(crate) mod mock_serial_port;

/// Byte-stream link to the scanner ASIC.
///
/// The scanner is strictly half-duplex: one command or one scan read
/// is in flight at a time, so implementations need no internal locking.
pub trait ScannerInterface {
    type InterfaceError;

    /// Configure the port (8-N-1 at the given baud rate)
    async fn setup(&mut self, baudrate: u32) -> Result<(), Self::InterfaceError>;

    /// Write the whole frame in one blocking write
    async fn write_frame(
        &mut self,
        frame: &[u8],
    ) -> Result<(), Self::InterfaceError>;

    /// Number of received bytes that can be read without blocking
    fn available(&mut self) -> Result<usize, Self::InterfaceError>;

    /// Read up to `recv_buf.len()` bytes, returning the number read
    async fn read(
        &mut self,
        recv_buf: &mut [u8],
    ) -> Result<usize, Self::InterfaceError>;

    /// Monotonic millisecond clock, free to wrap
    fn now_ms(&self) -> u32;
}
