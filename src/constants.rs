// Scanner serial link, fixed by the M14 firmware: 8 data bits, no parity, 1 stop bit
pub const DEFAULT_BAUDRATE: u32 = 115_200;

// Command/response engine timing
pub const DEFAULT_CMD_TIMEOUT_MS: u32 = 1000;
// pause after writing a command before we look for its ack
pub const ACK_SETTLE_MS: u32 = 100;
pub const ACK_POLL_INTERVAL_MS: u32 = 5;
pub const RESPONSE_POLL_INTERVAL_MS: u32 = 20;
pub const INFO_SETTLE_MS: u32 = 10;

// Response envelope: 3 bytes echo/id, 2 bytes big-endian payload length
pub const ENVELOPE_HEADER_LENGTH: usize = 5;
pub const ENVELOPE_LENGTH_OFFSET: usize = 3;

// Commands are opcode-first, at most one opcode triple plus two parameter bytes
pub const MAX_FRAME_LENGTH: usize = 5;

// Command groups
pub const CMD_DECODE: u8 = 0x32;
pub const CMD_DECODE_ACK: u8 = 0x33;
pub const CMD_SET: u8 = 0x21;
pub const CMD_SET_ACK: u8 = 0x22;
pub const CMD_GET_INFO: u8 = 0x43;

// Decode control, group CMD_DECODE
pub const DECODE_CTRL: u8 = 0x75;
pub const DECODE_START: u8 = 0x01;
pub const DECODE_STOP: u8 = 0x02;

// Setting pages, group CMD_SET
pub const PAGE_INTERFACE: u8 = 0x42;
pub const PAGE_OUTPUT: u8 = 0x51;
pub const PAGE_TRIGGER: u8 = 0x61;
pub const PAGE_LIGHT: u8 = 0x62;
pub const PAGE_SOUND: u8 = 0x63;
pub const PAGE_CODE_INTERVAL: u8 = 0x64;

// PAGE_TRIGGER items
pub const TRIGGER_MODE: u8 = 0x41;
pub const TRIGGER_MOTION_SENSITIVITY: u8 = 0x44;
pub const TRIGGER_TIMEOUT: u8 = 0x82;
pub const TRIGGER_TRIGGER_DECODE_DELAY: u8 = 0x85;
pub const TRIGGER_DECODE_DELAY: u8 = 0x8A;
pub const TRIGGER_CONTINUOUS_DECODE_DELAY: u8 = 0x8C;

// PAGE_LIGHT items
pub const LIGHT_FILL_MODE: u8 = 0x41;
pub const LIGHT_POS_MODE: u8 = 0x42;
pub const LIGHT_FILL_BRIGHTNESS: u8 = 0x48;

// PAGE_SOUND items
pub const SOUND_SUCCESS_BEEP: u8 = 0x42;
pub const SOUND_STARTUP_TONE: u8 = 0x45;

// PAGE_CODE_INTERVAL items
pub const INTERVAL_SAME_CODE_NO_DELAY: u8 = 0x43;
pub const INTERVAL_DIFF_CODE: u8 = 0x81;
pub const INTERVAL_SAME_CODE: u8 = 0x82;

// PAGE_OUTPUT items
pub const OUTPUT_PROTOCOL_FORMAT: u8 = 0x43;
pub const OUTPUT_CASE_CONVERSION: u8 = 0x48;

// PAGE_INTERFACE items
pub const INTERFACE_USB_MODE: u8 = 0x40;

// Info query sub-command, group CMD_GET_INFO
pub const GET_INFO_REQUEST: u8 = 0x02;
pub const INFO_ID_FIRMWARE_VERSION: u8 = 0xC1;
pub const INFO_ID_SOFTWARE_VERSION: u8 = 0xC2;

// Ack status byte for an accepted setting
pub const ACK_STATUS_OK: u8 = 0x00;

pub const MAX_FILL_LIGHT_BRIGHTNESS: u8 = 100;
pub const MIN_MOTION_SENSITIVITY: u8 = 1;
pub const MAX_MOTION_SENSITIVITY: u8 = 5;

// PI4IOE5V6408 GPIO expander registers
pub const EXPANDER_DEFAULT_ADDRESS: u8 = 0x43;
pub const EXPANDER_REG_DEVICE_ID_CTRL: u8 = 0x01;
pub const EXPANDER_REG_IO_DIRECTION: u8 = 0x03;
pub const EXPANDER_REG_OUTPUT_STATE: u8 = 0x05;
pub const EXPANDER_REG_OUTPUT_HIGH_Z: u8 = 0x07;
pub const EXPANDER_REG_PULL_ENABLE: u8 = 0x0B;
pub const EXPANDER_REG_PULL_SELECT: u8 = 0x0D;
pub const EXPANDER_REG_INPUT_STATUS: u8 = 0x0F;
pub const EXPANDER_NUM_PINS: u8 = 8;

// Expander channels wired to the scanner
pub const PIN_POWER_ENABLE: u8 = 0;
pub const PIN_TRIGGER: u8 = 4;

// Module bring-up
pub const EXPANDER_PROBE_ATTEMPTS: u8 = 3;
pub const EXPANDER_PROBE_RETRY_MS: u32 = 500;
pub const POWER_ON_SETTLE_MS: u32 = 300;
