/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! The assembled M5 QRCode module: an M14 scanner on a serial link, with
//! its power and trigger lines behind a PI4IOE5V6408 expander.

use crate::constants::*;
use crate::expander::Pi4ioe5v6408;
use crate::interface::ScannerInterface;
use crate::wrapper::{QrCodeM14, WrapperError};
use crate::Error;

use alloc::boxed::Box;
use alloc::string::String;
#[cfg(feature = "defmt")]
use defmt::println;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

/// Wiring and bring-up parameters
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleConfig {
    pub baudrate: u32,
    pub expander_address: u8,
    pub power_pin: u8,
    pub trigger_pin: u8,
    pub probe_attempts: u8,
    pub probe_retry_ms: u32,
    pub power_on_settle_ms: u32,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            expander_address: EXPANDER_DEFAULT_ADDRESS,
            power_pin: PIN_POWER_ENABLE,
            trigger_pin: PIN_TRIGGER,
            probe_attempts: EXPANDER_PROBE_ATTEMPTS,
            probe_retry_ms: EXPANDER_PROBE_RETRY_MS,
            power_on_settle_ms: POWER_ON_SETTLE_MS,
        }
    }
}

impl ModuleConfig {
    pub fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub fn with_expander_address(mut self, address: u8) -> Self {
        self.expander_address = address;
        self
    }

    pub fn with_pins(mut self, power_pin: u8, trigger_pin: u8) -> Self {
        self.power_pin = power_pin;
        self.trigger_pin = trigger_pin;
        self
    }

    pub fn with_probe_attempts(mut self, attempts: u8) -> Self {
        self.probe_attempts = attempts.max(1);
        self
    }

    pub fn with_probe_retry_ms(mut self, retry_ms: u32) -> Self {
        self.probe_retry_ms = retry_ms;
        self
    }

    pub fn with_power_on_settle_ms(mut self, settle_ms: u32) -> Self {
        self.power_on_settle_ms = settle_ms;
        self
    }
}

type ScanObserver = Box<dyn FnMut(&str)>;

pub struct M5ModuleQrCode<I2C, SI> {
    config: ModuleConfig,
    expander: Pi4ioe5v6408<I2C>,
    scanner: QrCodeM14<SI>,
    /// serial link waiting for `begin` to set it up
    serial: Option<SI>,
    on_scan_result: Option<ScanObserver>,
}

impl<I2C, SI> M5ModuleQrCode<I2C, SI> {
    pub fn new(i2c: I2C, serial: SI, config: ModuleConfig) -> Self {
        Self {
            expander: Pi4ioe5v6408::new(i2c, config.expander_address),
            config,
            scanner: QrCodeM14::new(),
            serial: Some(serial),
            on_scan_result: None,
        }
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Scanner command engine, bound once `begin` has succeeded
    pub fn scanner(&mut self) -> &mut QrCodeM14<SI> {
        &mut self.scanner
    }

    /// Register the single observer called from `update` with each result
    pub fn on_scan_result(&mut self, observer: impl FnMut(&str) + 'static) {
        self.on_scan_result = Some(Box::new(observer));
    }

    pub fn clear_scan_observer(&mut self) {
        self.on_scan_result = None;
    }

    /// Returns the consumed bus and serial instances.
    pub fn free(mut self) -> (I2C, Option<SI>) {
        let serial = self.serial.take().or_else(|| self.scanner.unbind());
        (self.expander.free(), serial)
    }
}

impl<I2C, BusE, SI, SE> M5ModuleQrCode<I2C, SI>
where
    I2C: I2c<Error = BusE>,
    SI: ScannerInterface<InterfaceError = SE>,
{
    /// Bring up the expander, power the scanner, and open its serial link
    pub async fn begin(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<SE, BusE>> {
        self.init_expander(delay).await?;

        self.set_enable(true).await?;
        delay.delay_ms(self.config.power_on_settle_ms).await;

        self.init_scanner().await
    }

    async fn init_expander(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<SE, BusE>> {
        #[cfg(feature = "defmt")]
        println!("init pi4ioe5v6408");

        let mut found = false;
        // the expander is always checked at least once
        for attempt in 0..self.config.probe_attempts.max(1) {
            if attempt > 0 {
                delay.delay_ms(self.config.probe_retry_ms).await;
            }
            if self.expander.probe().await.is_ok() {
                found = true;
                break;
            }
            #[cfg(feature = "defmt")]
            println!(
                "pi4ioe5v6408 not found at 0x{:X}, retry {}",
                self.config.expander_address, attempt
            );
        }
        if !found {
            return Err(Error::ExpanderNotFound(self.config.expander_address));
        }

        self.expander
            .configure_output(self.config.power_pin)
            .await
            .map_err(Error::Bus)?;
        self.expander
            .configure_output(self.config.trigger_pin)
            .await
            .map_err(Error::Bus)?;
        Ok(())
    }

    async fn init_scanner(&mut self) -> Result<(), Error<SE, BusE>> {
        #[cfg(feature = "defmt")]
        println!("init qrcode serial {}", self.config.baudrate);

        // a repeated begin re-opens the link that is already bound
        let mut serial = match self.serial.take().or_else(|| self.scanner.unbind())
        {
            Some(serial) => serial,
            None => return Ok(()),
        };
        if let Err(e) = serial.setup(self.config.baudrate).await {
            self.serial = Some(serial);
            return Err(Error::Comm(e));
        }
        self.scanner.bind(serial);
        Ok(())
    }

    /// Power the scanner on or off; the trigger line follows so it idles high
    pub async fn set_enable(&mut self, enable: bool) -> Result<(), Error<SE, BusE>> {
        self.expander
            .digital_write(self.config.power_pin, enable)
            .await
            .map_err(Error::Bus)?;
        self.set_trigger_level(enable).await
    }

    /// High is idle; low fires a decode in pulse trigger mode
    pub async fn set_trigger_level(
        &mut self,
        level: bool,
    ) -> Result<(), Error<SE, BusE>> {
        self.expander
            .digital_write(self.config.trigger_pin, level)
            .await
            .map_err(Error::Bus)
    }

    /// The module answers with a non-empty firmware version
    pub async fn check_connection(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<bool, Error<SE, BusE>> {
        let version = self
            .scanner
            .firmware_version(delay)
            .await
            .map_err(from_wrapper)?;
        Ok(!version.is_empty())
    }

    /// Read an info record, failing with `NoDataAvailable` when the module
    /// stays silent or answers with a malformed envelope
    pub async fn query_info(
        &mut self,
        delay: &mut impl DelayNs,
        info_id: u8,
    ) -> Result<String, Error<SE, BusE>> {
        self.scanner
            .try_get_infos(delay, info_id)
            .await
            .map_err(from_wrapper)
    }

    /// Poll once for a decoded result.
    ///
    /// Reads whatever burst is waiting, without blocking if nothing is.
    /// The observer, if any, sees a non-empty result before it is returned.
    pub async fn update(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<Option<String>, Error<SE, BusE>> {
        if self.scanner.available().map_err(from_wrapper)? == 0 {
            return Ok(None);
        }

        let result = self
            .scanner
            .wait_scan_result(delay, 0)
            .await
            .map_err(from_wrapper)?;
        if result.is_empty() {
            return Ok(None);
        }

        if let Some(observer) = self.on_scan_result.as_mut() {
            observer(result.as_str());
        }
        Ok(Some(result))
    }
}

fn from_wrapper<SE, BusE>(err: WrapperError<SE>) -> Error<SE, BusE> {
    match err {
        WrapperError::CommError(e) => Error::Comm(e),
        WrapperError::Envelope(_) | WrapperError::NoDataAvailable => {
            Error::NoDataAvailable
        }
    }
}
