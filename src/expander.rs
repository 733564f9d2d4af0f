/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Pin-level access to the PI4IOE5V6408 8-bit I2C GPIO expander that
//! switches the scanner's power and trigger lines.

use crate::constants::*;
#[cfg(feature = "defmt")]
use defmt::println;
use embedded_hal_async::i2c::I2c;

pub struct Pi4ioe5v6408<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Pi4ioe5v6408<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Returns previously consumed i2c bus instance.
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Pi4ioe5v6408<I2C>
where
    I2C: I2c<Error = E>,
{
    async fn read_register(&mut self, reg: u8) -> Result<u8, E> {
        let mut val = [0u8; 1];
        self.i2c.write_read(self.address, &[reg], &mut val).await?;
        Ok(val[0])
    }

    async fn write_register(&mut self, reg: u8, val: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[reg, val]).await
    }

    /// Read-modify-write a single pin bit.
    /// Pins beyond the eighth are ignored.
    async fn update_bit(
        &mut self,
        reg: u8,
        pin: u8,
        set: bool,
    ) -> Result<(), E> {
        if pin >= EXPANDER_NUM_PINS {
            return Ok(());
        }
        let old = self.read_register(reg).await?;
        let new = if set { old | (1 << pin) } else { old & !(1 << pin) };
        if new != old {
            self.write_register(reg, new).await?;
        }
        Ok(())
    }

    /// Check that something acknowledges at our address
    pub async fn probe(&mut self) -> Result<u8, E> {
        let id = self.read_register(EXPANDER_REG_DEVICE_ID_CTRL).await?;
        #[cfg(feature = "defmt")]
        println!("pi4ioe5v6408 id 0x{:X} at 0x{:X}", id, self.address);
        Ok(id)
    }

    /// `true` makes the pin an output
    pub async fn set_direction(&mut self, pin: u8, output: bool) -> Result<(), E> {
        self.update_bit(EXPANDER_REG_IO_DIRECTION, pin, output).await
    }

    /// `true` selects pull-up, `false` pull-down
    pub async fn set_pull_mode(&mut self, pin: u8, pull_up: bool) -> Result<(), E> {
        self.update_bit(EXPANDER_REG_PULL_SELECT, pin, pull_up).await
    }

    pub async fn enable_pull(&mut self, pin: u8, enable: bool) -> Result<(), E> {
        self.update_bit(EXPANDER_REG_PULL_ENABLE, pin, enable).await
    }

    /// A high-impedance output floats instead of driving its level
    pub async fn set_high_impedance(
        &mut self,
        pin: u8,
        enable: bool,
    ) -> Result<(), E> {
        self.update_bit(EXPANDER_REG_OUTPUT_HIGH_Z, pin, enable).await
    }

    pub async fn digital_write(&mut self, pin: u8, level: bool) -> Result<(), E> {
        self.update_bit(EXPANDER_REG_OUTPUT_STATE, pin, level).await
    }

    pub async fn digital_read(&mut self, pin: u8) -> Result<bool, E> {
        let state = self.read_register(EXPANDER_REG_INPUT_STATUS).await?;
        Ok(pin < EXPANDER_NUM_PINS && state & (1 << pin) != 0)
    }

    /// Pulled-up, actively driven output
    pub async fn configure_output(&mut self, pin: u8) -> Result<(), E> {
        self.set_direction(pin, true).await?;
        self.set_pull_mode(pin, true).await?;
        self.enable_pull(pin, true).await?;
        self.set_high_impedance(pin, false).await
    }
}
