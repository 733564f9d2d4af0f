/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Declarative table of scanner commands.
//!
//! Each [`Command`] knows its wire frame, the exact ack the module sends
//! back (possibly none), and how long to wait for it. The engine in
//! [`crate::wrapper`] never looks inside these bytes.

use core::fmt;

use crate::constants::*;

/// Outcome of exactly one command/ack exchange
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CmdResult {
    Success = 0,
    InvalidParam = 1,
    Timeout = 2,
    AckMismatch = 3,
}

impl CmdResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmdResult::Success => "success",
            CmdResult::InvalidParam => "invalid param",
            CmdResult::Timeout => "timeout",
            CmdResult::AckMismatch => "ack mismatch",
        }
    }

    pub fn is_success(&self) -> bool {
        *self == CmdResult::Success
    }
}

impl fmt::Display for CmdResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module-side decode triggering policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TriggerMode {
    /// One decode per key press, stops after a successful read
    Key = 0,
    /// First press starts decoding, the next press stops it
    Continuous = 1,
    /// Decodes from power-on and cannot be stopped
    Auto = 2,
    /// Holding TRIG low for more than 20ms triggers one decode
    Pulse = 4,
    /// Decodes when the scene changes
    MotionSensing = 5,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FillLightMode {
    Off = 0,
    #[default]
    OnDecode = 2,
    On = 3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PosLightMode {
    Off = 0,
    FlashOnDecode = 1,
    #[default]
    OnDecode = 2,
}

/// How the module presents itself on its USB port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum UsbMode {
    Keyboard = 1,
    Serial = 2,
    Pos = 3,
}

/// Fixed-capacity byte sequence used for both frames and ack patterns
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    buf: [u8; MAX_FRAME_LENGTH],
    len: usize,
}

impl Frame {
    pub const fn empty() -> Self {
        Self {
            buf: [0; MAX_FRAME_LENGTH],
            len: 0,
        }
    }

    /// `None` if the bytes do not fit in one frame
    pub fn new(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MAX_FRAME_LENGTH {
            return None;
        }
        Some(Self::from_slice(bytes))
    }

    // table entries are at most MAX_FRAME_LENGTH long
    pub(crate) fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_FRAME_LENGTH);
        let mut buf = [0; MAX_FRAME_LENGTH];
        buf[..len].copy_from_slice(&bytes[..len]);
        Self { buf, len }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:02X?})", self.as_slice())
    }
}

/// Every setting and control command the M14 accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    StartDecode,
    StopDecode,
    SetTriggerMode(TriggerMode),
    SetDecodeDelay(u16),
    SetTriggerTimeout(u16),
    /// 1 (least) to 5 (most sensitive)
    SetMotionSensitivity(u8),
    SetContinuousDecodeDelay(u16),
    SetTriggerDecodeDelay(u16),
    SetSameCodeInterval(u16),
    SetDiffCodeInterval(u16),
    SetSameCodeNoDelay(bool),
    SetFillLightMode(FillLightMode),
    /// Percent, 0 to 100
    SetFillLightBrightness(u8),
    SetPosLightMode(PosLightMode),
    SetStartupTone(u8),
    SetDecodeSuccessBeep(u8),
    SetCaseConversion(u8),
    SetProtocolFormat(u8),
    SetUsbMode(UsbMode),
}

// How a setting is acknowledged
enum AckShape {
    /// no ack, fire-and-forget
    None,
    /// opcode echo followed by two zero status bytes
    StatusWord,
    /// opcode echo followed by one zero status byte
    Status,
    /// opcode echo, parameter echo, zero status byte
    EchoStatus,
    /// opcode echo, parameter echo
    Echo,
}

impl Command {
    // (group, page, item)
    fn opcode(&self) -> [u8; 3] {
        match self {
            Command::StartDecode | Command::StopDecode => {
                [CMD_DECODE, DECODE_CTRL, 0]
            }
            Command::SetTriggerMode(_) => [CMD_SET, PAGE_TRIGGER, TRIGGER_MODE],
            Command::SetDecodeDelay(_) => {
                [CMD_SET, PAGE_TRIGGER, TRIGGER_DECODE_DELAY]
            }
            Command::SetTriggerTimeout(_) => {
                [CMD_SET, PAGE_TRIGGER, TRIGGER_TIMEOUT]
            }
            Command::SetMotionSensitivity(_) => {
                [CMD_SET, PAGE_TRIGGER, TRIGGER_MOTION_SENSITIVITY]
            }
            Command::SetContinuousDecodeDelay(_) => {
                [CMD_SET, PAGE_TRIGGER, TRIGGER_CONTINUOUS_DECODE_DELAY]
            }
            Command::SetTriggerDecodeDelay(_) => {
                [CMD_SET, PAGE_TRIGGER, TRIGGER_TRIGGER_DECODE_DELAY]
            }
            Command::SetSameCodeInterval(_) => {
                [CMD_SET, PAGE_CODE_INTERVAL, INTERVAL_SAME_CODE]
            }
            Command::SetDiffCodeInterval(_) => {
                [CMD_SET, PAGE_CODE_INTERVAL, INTERVAL_DIFF_CODE]
            }
            Command::SetSameCodeNoDelay(_) => {
                [CMD_SET, PAGE_CODE_INTERVAL, INTERVAL_SAME_CODE_NO_DELAY]
            }
            Command::SetFillLightMode(_) => {
                [CMD_SET, PAGE_LIGHT, LIGHT_FILL_MODE]
            }
            Command::SetFillLightBrightness(_) => {
                [CMD_SET, PAGE_LIGHT, LIGHT_FILL_BRIGHTNESS]
            }
            Command::SetPosLightMode(_) => [CMD_SET, PAGE_LIGHT, LIGHT_POS_MODE],
            Command::SetStartupTone(_) => {
                [CMD_SET, PAGE_SOUND, SOUND_STARTUP_TONE]
            }
            Command::SetDecodeSuccessBeep(_) => {
                [CMD_SET, PAGE_SOUND, SOUND_SUCCESS_BEEP]
            }
            Command::SetCaseConversion(_) => {
                [CMD_SET, PAGE_OUTPUT, OUTPUT_CASE_CONVERSION]
            }
            Command::SetProtocolFormat(_) => {
                [CMD_SET, PAGE_OUTPUT, OUTPUT_PROTOCOL_FORMAT]
            }
            Command::SetUsbMode(_) => {
                [CMD_SET, PAGE_INTERFACE, INTERFACE_USB_MODE]
            }
        }
    }

    /// Parameter bytes, multi-byte values big-endian
    fn params(&self) -> Frame {
        match *self {
            Command::StartDecode => Frame::from_slice(&[DECODE_START]),
            Command::StopDecode => Frame::from_slice(&[DECODE_STOP]),
            Command::SetTriggerMode(mode) => Frame::from_slice(&[mode as u8]),
            Command::SetDecodeDelay(val)
            | Command::SetTriggerTimeout(val)
            | Command::SetContinuousDecodeDelay(val)
            | Command::SetTriggerDecodeDelay(val)
            | Command::SetSameCodeInterval(val)
            | Command::SetDiffCodeInterval(val) => {
                Frame::from_slice(&val.to_be_bytes())
            }
            Command::SetMotionSensitivity(level) => Frame::from_slice(&[level
                .clamp(MIN_MOTION_SENSITIVITY, MAX_MOTION_SENSITIVITY)]),
            Command::SetSameCodeNoDelay(enable) => {
                Frame::from_slice(&[enable as u8])
            }
            Command::SetFillLightMode(mode) => Frame::from_slice(&[mode as u8]),
            Command::SetFillLightBrightness(brightness) => {
                Frame::from_slice(&[brightness.min(MAX_FILL_LIGHT_BRIGHTNESS)])
            }
            Command::SetPosLightMode(mode) => Frame::from_slice(&[mode as u8]),
            Command::SetStartupTone(val)
            | Command::SetDecodeSuccessBeep(val)
            | Command::SetCaseConversion(val)
            | Command::SetProtocolFormat(val) => Frame::from_slice(&[val]),
            Command::SetUsbMode(mode) => Frame::from_slice(&[mode as u8]),
        }
    }

    fn ack_shape(&self) -> AckShape {
        match self {
            Command::StartDecode | Command::SetUsbMode(_) => AckShape::None,
            Command::StopDecode => AckShape::StatusWord,
            Command::SetDecodeDelay(_)
            | Command::SetTriggerTimeout(_)
            | Command::SetContinuousDecodeDelay(_)
            | Command::SetTriggerDecodeDelay(_)
            | Command::SetSameCodeInterval(_)
            | Command::SetDiffCodeInterval(_) => AckShape::StatusWord,
            Command::SetMotionSensitivity(_)
            | Command::SetCaseConversion(_)
            | Command::SetProtocolFormat(_) => AckShape::Status,
            Command::SetTriggerMode(_)
            | Command::SetSameCodeNoDelay(_)
            | Command::SetFillLightMode(_)
            | Command::SetFillLightBrightness(_)
            | Command::SetPosLightMode(_) => AckShape::EchoStatus,
            Command::SetStartupTone(_) | Command::SetDecodeSuccessBeep(_) => {
                AckShape::Echo
            }
        }
    }

    /// The bytes written to the module
    pub fn frame(&self) -> Frame {
        let opcode = self.opcode();
        let params = self.params();
        let mut buf = [0u8; MAX_FRAME_LENGTH];
        let (head, tail) = match self {
            // decode control carries its sub-command in place of the item byte
            Command::StartDecode | Command::StopDecode => (2, 1),
            _ => (3, params.len()),
        };
        buf[..head].copy_from_slice(&opcode[..head]);
        buf[head..head + tail].copy_from_slice(params.as_slice());
        Frame::from_slice(&buf[..head + tail])
    }

    /// The exact bytes the module answers with, empty when it stays silent
    pub fn expected_ack(&self) -> Frame {
        let frame = self.frame();
        let sent = frame.as_slice();
        // ack opcode is the request group plus one
        let mut ack = [0u8; MAX_FRAME_LENGTH];
        ack[..3].copy_from_slice(&sent[..3]);
        ack[0] = match sent[0] {
            CMD_DECODE => CMD_DECODE_ACK,
            _ => CMD_SET_ACK,
        };
        let echo = self.params();
        let len = match self.ack_shape() {
            AckShape::None => return Frame::empty(),
            AckShape::StatusWord => {
                ack[3] = ACK_STATUS_OK;
                ack[4] = ACK_STATUS_OK;
                5
            }
            AckShape::Status => {
                ack[3] = ACK_STATUS_OK;
                4
            }
            AckShape::EchoStatus => {
                ack[3] = echo.as_slice()[0];
                ack[4] = ACK_STATUS_OK;
                5
            }
            AckShape::Echo => {
                ack[3] = echo.as_slice()[0];
                4
            }
        };
        Frame::from_slice(&ack[..len])
    }

    /// How long to wait for the ack once the settle delay has passed
    pub fn timeout_ms(&self) -> u32 {
        match self {
            Command::StartDecode | Command::SetUsbMode(_) => 0,
            Command::StopDecode
            | Command::SetStartupTone(_)
            | Command::SetDecodeSuccessBeep(_) => 150,
            Command::SetFillLightBrightness(_) | Command::SetPosLightMode(_) => {
                100
            }
            _ => 200,
        }
    }
}
