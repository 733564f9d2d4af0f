/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

#![no_std]
#![allow(async_fn_in_trait)]
extern crate alloc;
extern crate embedded_hal_async;

#[allow(dead_code)]
pub mod constants;
pub mod command;
pub mod envelope;
pub mod expander;
pub mod interface;
pub mod module;
pub mod wrapper;

pub use command::{
    CmdResult, Command, FillLightMode, PosLightMode, TriggerMode, UsbMode,
};
pub use module::{M5ModuleQrCode, ModuleConfig};
pub use wrapper::{QrCodeM14, WrapperError};

/// Errors in this crate
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<CommE, BusE> {
    /// Scanner serial communication error
    Comm(CommE),
    /// GPIO expander bus error
    Bus(BusE),

    /// The GPIO expander did not answer at this address
    ExpanderNotFound(u8),
    /// The scanner did not answer with usable data
    NoDataAvailable,
}
