extern crate std;

use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation, SevenBitAddress};
use std::vec::Vec;

use crate::constants::{EXPANDER_DEFAULT_ADDRESS, EXPANDER_REG_OUTPUT_HIGH_Z};

const NUM_FAKE_REGISTERS: usize = 0x20;

/// One bus write, as seen by the device
pub struct FakePacket {
    pub addr: u8,
    pub bytes: Vec<u8>,
}

/// Register-file model of an I2C GPIO expander
pub struct FakeI2cPort {
    pub address: u8,
    pub registers: [u8; NUM_FAKE_REGISTERS],
    pub sent_packets: Vec<FakePacket>,
    /// number of upcoming transfers that will be NAKed
    pub nak_count: usize,
}

impl FakeI2cPort {
    pub fn new() -> Self {
        let mut registers = [0; NUM_FAKE_REGISTERS];
        // outputs power up floating
        registers[EXPANDER_REG_OUTPUT_HIGH_Z as usize] = 0xFF;
        FakeI2cPort {
            address: EXPANDER_DEFAULT_ADDRESS,
            registers,
            sent_packets: Vec::new(),
            nak_count: 0,
        }
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.registers[reg as usize]
    }

    fn check_ack(&mut self, addr: SevenBitAddress) -> Result<(), FakeI2cError> {
        if addr != self.address {
            return Err(FakeI2cError);
        }
        if self.nak_count > 0 {
            self.nak_count -= 1;
            return Err(FakeI2cError);
        }
        Ok(())
    }

    // first byte selects the register, the rest auto-increment from it
    fn store(&mut self, bytes: &[u8]) -> usize {
        let reg = bytes.first().copied().unwrap_or(0) as usize;
        for (offset, val) in bytes.iter().skip(1).enumerate() {
            self.registers[(reg + offset) % NUM_FAKE_REGISTERS] = *val;
        }
        reg
    }

    fn load(&self, reg: usize, buffer: &mut [u8]) {
        for (offset, dest) in buffer.iter_mut().enumerate() {
            *dest = self.registers[(reg + offset) % NUM_FAKE_REGISTERS];
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct FakeI2cError;

impl embedded_hal_async::i2c::Error for FakeI2cError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for FakeI2cPort {
    type Error = FakeI2cError;
}

impl embedded_hal_async::i2c::I2c for FakeI2cPort {
    async fn read(
        &mut self,
        addr: SevenBitAddress,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_ack(addr)?;
        self.load(0, buffer);
        Ok(())
    }

    async fn write(
        &mut self,
        address: SevenBitAddress,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        self.check_ack(address)?;
        self.sent_packets.push(FakePacket {
            addr: address,
            bytes: bytes.to_vec(),
        });
        self.store(bytes);
        Ok(())
    }

    async fn write_read(
        &mut self,
        address: SevenBitAddress,
        send_buf: &[u8],
        recv_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_ack(address)?;
        let reg = self.store(send_buf);
        self.load(reg, recv_buf);
        Ok(())
    }

    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.check_ack(address)?;
        let mut reg = 0;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => reg = self.store(bytes),
                Operation::Read(buffer) => self.load(reg, buffer),
            }
        }
        Ok(())
    }
}
