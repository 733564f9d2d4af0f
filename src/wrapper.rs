/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use crate::command::{
    CmdResult, Command, FillLightMode, PosLightMode, TriggerMode, UsbMode,
};
use crate::constants::*;
use crate::envelope::{Envelope, EnvelopeError};
use crate::interface::ScannerInterface;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
#[cfg(feature = "defmt")]
use defmt::println;
use embedded_hal_async::delay::DelayNs;

const DRAIN_CHUNK_LEN: usize = 32;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WrapperError<E> {
    ///Communications error
    CommError(E),
    /// Info response did not form a valid envelope
    Envelope(EnvelopeError),
    /// We expected some data but didn't receive any
    NoDataAvailable,
}

/// Command/response engine for the M14 scanner ASIC.
///
/// Holds the serial link once it is bound. Every exchange is a
/// busy-poll on the caller's delay source; there is no retry.
pub struct QrCodeM14<SI> {
    pub(crate) scanner_interface: Option<SI>,
}

impl<SI> Default for QrCodeM14<SI> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SI> QrCodeM14<SI> {
    /// An engine with no serial link yet: every command is `InvalidParam`
    pub fn new() -> Self {
        Self {
            scanner_interface: None,
        }
    }

    pub fn new_with_interface(scanner_interface: SI) -> Self {
        Self {
            scanner_interface: Some(scanner_interface),
        }
    }

    /// Attach a serial link, returning any previously bound one
    pub fn bind(&mut self, scanner_interface: SI) -> Option<SI> {
        self.scanner_interface.replace(scanner_interface)
    }

    pub fn is_bound(&self) -> bool {
        self.scanner_interface.is_some()
    }

    pub(crate) fn unbind(&mut self) -> Option<SI> {
        self.scanner_interface.take()
    }

    /// Returns previously consumed serial interface instance.
    pub fn free(self) -> Option<SI> {
        self.scanner_interface
    }
}

impl<SI, SE> QrCodeM14<SI>
where
    SI: ScannerInterface<InterfaceError = SE>,
{
    /// Number of received bytes waiting on the link
    pub fn available(&mut self) -> Result<usize, WrapperError<SE>> {
        match self.scanner_interface.as_mut() {
            Some(si) => si.available().map_err(WrapperError::CommError),
            None => Ok(0),
        }
    }

    /// Throw away whatever is sitting in the receive buffer
    async fn drain_rx(si: &mut SI) -> Result<(), WrapperError<SE>> {
        let mut scratch = [0u8; DRAIN_CHUNK_LEN];
        loop {
            let pending = si.available().map_err(WrapperError::CommError)?;
            if pending == 0 {
                break;
            }
            let chunk = pending.min(DRAIN_CHUNK_LEN);
            let read_len = si
                .read(&mut scratch[..chunk])
                .await
                .map_err(WrapperError::CommError)?;
            if read_len == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Send one frame and, if `expected_ack` is non-empty, wait up to
    /// `timeout_ms` (after the settle delay) for exactly those bytes.
    pub async fn execute(
        &mut self,
        delay: &mut impl DelayNs,
        frame: &[u8],
        expected_ack: &[u8],
        timeout_ms: u32,
    ) -> Result<CmdResult, WrapperError<SE>> {
        let si = match self.scanner_interface.as_mut() {
            Some(si) => si,
            None => return Ok(CmdResult::InvalidParam),
        };
        if frame.is_empty() {
            return Ok(CmdResult::InvalidParam);
        }

        // stale bytes from an unrelated exchange would corrupt the ack
        Self::drain_rx(si).await?;

        #[cfg(feature = "defmt")]
        println!("tx: {=[u8]:X}", frame);
        si.write_frame(frame)
            .await
            .map_err(WrapperError::CommError)?;

        if expected_ack.is_empty() {
            return Ok(CmdResult::Success);
        }

        delay.delay_ms(ACK_SETTLE_MS).await;

        let start = si.now_ms();
        while si.now_ms().wrapping_sub(start) < timeout_ms {
            let pending = si.available().map_err(WrapperError::CommError)?;
            if pending >= expected_ack.len() {
                let mut rx = vec![0u8; expected_ack.len()];
                let read_len = si
                    .read(&mut rx)
                    .await
                    .map_err(WrapperError::CommError)?;
                #[cfg(feature = "defmt")]
                println!("rx: {=[u8]:X}", &rx[..read_len]);

                return if rx[..read_len] == *expected_ack {
                    Ok(CmdResult::Success)
                } else {
                    Ok(CmdResult::AckMismatch)
                };
            }
            delay.delay_ms(ACK_POLL_INTERVAL_MS).await;
        }

        #[cfg(feature = "defmt")]
        println!("ack timeout {}ms", timeout_ms);
        Ok(CmdResult::Timeout)
    }

    /// Fire-and-forget: write the frame, expect nothing back
    pub async fn send(
        &mut self,
        delay: &mut impl DelayNs,
        frame: &[u8],
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.execute(delay, frame, &[], DEFAULT_CMD_TIMEOUT_MS).await
    }

    /// Run one entry of the command table
    pub async fn send_command(
        &mut self,
        delay: &mut impl DelayNs,
        command: Command,
    ) -> Result<CmdResult, WrapperError<SE>> {
        let frame = command.frame();
        let ack = command.expected_ack();
        let res = self
            .execute(delay, frame.as_slice(), ack.as_slice(), command.timeout_ms())
            .await?;
        #[cfg(feature = "defmt")]
        println!("{}: {}", command, res);
        Ok(res)
    }

    /// Poll every 20ms until something arrives or the timeout passes,
    /// then return everything that arrived in that one slot.
    ///
    /// A reply that arrives in two bursts may be split across calls.
    pub async fn wait_response(
        &mut self,
        delay: &mut impl DelayNs,
        timeout_ms: u32,
    ) -> Result<Vec<u8>, WrapperError<SE>> {
        let mut response = Vec::new();
        let si = match self.scanner_interface.as_mut() {
            Some(si) => si,
            None => return Ok(response),
        };

        let start = si.now_ms();
        loop {
            let pending = si.available().map_err(WrapperError::CommError)?;
            if pending > 0 {
                response.resize(pending, 0);
                let read_len = si
                    .read(&mut response)
                    .await
                    .map_err(WrapperError::CommError)?;
                response.truncate(read_len);
                break;
            }
            delay.delay_ms(RESPONSE_POLL_INTERVAL_MS).await;
            if si.now_ms().wrapping_sub(start) >= timeout_ms {
                break;
            }
        }
        Ok(response)
    }

    /// Read one unframed burst of decoded text
    pub async fn wait_scan_result(
        &mut self,
        delay: &mut impl DelayNs,
        timeout_ms: u32,
    ) -> Result<String, WrapperError<SE>> {
        let response = self.wait_response(delay, timeout_ms).await?;
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// Query an info record, keeping every failure distinct.
    /// `Ok` with an empty string means the module answered with no payload.
    pub async fn try_get_infos(
        &mut self,
        delay: &mut impl DelayNs,
        info_id: u8,
    ) -> Result<String, WrapperError<SE>> {
        let frame = [CMD_GET_INFO, GET_INFO_REQUEST, info_id];
        if !self.send(delay, &frame).await?.is_success() {
            return Err(WrapperError::NoDataAvailable);
        }
        delay.delay_ms(INFO_SETTLE_MS).await;

        let response = self.wait_response(delay, DEFAULT_CMD_TIMEOUT_MS).await?;
        if response.is_empty() {
            return Err(WrapperError::NoDataAvailable);
        }
        let envelope =
            Envelope::parse(&response).map_err(WrapperError::Envelope)?;
        Ok(String::from_utf8_lossy(envelope.payload).into_owned())
    }

    /// Query an info record; no answer, a bad envelope, and an empty
    /// payload all come back as an empty string.
    pub async fn get_infos(
        &mut self,
        delay: &mut impl DelayNs,
        info_id: u8,
    ) -> Result<String, WrapperError<SE>> {
        match self.try_get_infos(delay, info_id).await {
            Ok(info) => Ok(info),
            Err(WrapperError::CommError(e)) => Err(WrapperError::CommError(e)),
            Err(_) => Ok(String::new()),
        }
    }

    pub async fn firmware_version(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<String, WrapperError<SE>> {
        self.get_infos(delay, INFO_ID_FIRMWARE_VERSION).await
    }

    pub async fn software_version(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<String, WrapperError<SE>> {
        self.get_infos(delay, INFO_ID_SOFTWARE_VERSION).await
    }

    pub async fn start_decode(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::StartDecode).await
    }

    pub async fn stop_decode(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::StopDecode).await
    }

    pub async fn set_trigger_mode(
        &mut self,
        delay: &mut impl DelayNs,
        mode: TriggerMode,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetTriggerMode(mode)).await
    }

    pub async fn set_decode_delay(
        &mut self,
        delay: &mut impl DelayNs,
        delay_ms: u16,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetDecodeDelay(delay_ms))
            .await
    }

    pub async fn set_trigger_timeout(
        &mut self,
        delay: &mut impl DelayNs,
        timeout_ms: u16,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetTriggerTimeout(timeout_ms))
            .await
    }

    /// Level 1 to 5, out-of-range values are clamped
    pub async fn set_motion_sensitivity(
        &mut self,
        delay: &mut impl DelayNs,
        level: u8,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetMotionSensitivity(level))
            .await
    }

    pub async fn set_continuous_decode_delay(
        &mut self,
        delay: &mut impl DelayNs,
        delay_ms: u16,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetContinuousDecodeDelay(delay_ms))
            .await
    }

    pub async fn set_trigger_decode_delay(
        &mut self,
        delay: &mut impl DelayNs,
        delay_ms: u16,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetTriggerDecodeDelay(delay_ms))
            .await
    }

    pub async fn set_same_code_interval(
        &mut self,
        delay: &mut impl DelayNs,
        interval_ms: u16,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetSameCodeInterval(interval_ms))
            .await
    }

    pub async fn set_diff_code_interval(
        &mut self,
        delay: &mut impl DelayNs,
        interval_ms: u16,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetDiffCodeInterval(interval_ms))
            .await
    }

    pub async fn set_same_code_no_delay(
        &mut self,
        delay: &mut impl DelayNs,
        enable: bool,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetSameCodeNoDelay(enable))
            .await
    }

    pub async fn set_fill_light_mode(
        &mut self,
        delay: &mut impl DelayNs,
        mode: FillLightMode,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetFillLightMode(mode))
            .await
    }

    /// Percent; anything above 100 is sent as 100
    pub async fn set_fill_light_brightness(
        &mut self,
        delay: &mut impl DelayNs,
        brightness: u8,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetFillLightBrightness(brightness))
            .await
    }

    pub async fn set_pos_light_mode(
        &mut self,
        delay: &mut impl DelayNs,
        mode: PosLightMode,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetPosLightMode(mode))
            .await
    }

    pub async fn set_startup_tone(
        &mut self,
        delay: &mut impl DelayNs,
        mode: u8,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetStartupTone(mode)).await
    }

    pub async fn set_decode_success_beep(
        &mut self,
        delay: &mut impl DelayNs,
        count: u8,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetDecodeSuccessBeep(count))
            .await
    }

    pub async fn set_case_conversion(
        &mut self,
        delay: &mut impl DelayNs,
        mode: u8,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetCaseConversion(mode))
            .await
    }

    pub async fn set_protocol_format(
        &mut self,
        delay: &mut impl DelayNs,
        mode: u8,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetProtocolFormat(mode))
            .await
    }

    pub async fn set_usb_mode(
        &mut self,
        delay: &mut impl DelayNs,
        mode: UsbMode,
    ) -> Result<CmdResult, WrapperError<SE>> {
        self.send_command(delay, Command::SetUsbMode(mode)).await
    }
}
