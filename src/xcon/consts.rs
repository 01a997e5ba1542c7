pub const PROTOCOL_MAJOR_VERSION: u16 = 11;
pub const PROTOCOL_MINOR_VERSION: u16 = 0;

pub const SETUP_FAILED: u8 = 0;
pub const SETUP_SUCCESS: u8 = 1;
pub const SETUP_AUTHENTICATE: u8 = 2;

pub const RESPONSE_ERROR: u8 = 0;
pub const RESPONSE_REPLY: u8 = 1;
pub const RESPONSE_SEND_EVENT_MASK: u8 = 0x80;

pub const KEYMAP_NOTIFY: u8 = 11;
pub const XGE_EVENT: u8 = 35;

pub const FIRST_EXTENSION_EVENT: u8 = 64;
pub const FIRST_EXTENSION_ERROR: u8 = 128;

pub const MIN_MSG_SIZE: usize = 32;
pub const MAX_LENGTH_UNITS: usize = 0x100000 / 4;
