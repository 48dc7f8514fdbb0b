//! Command codes and message parsing
//!
//! Wire format: `code ("," argument)* ";"` where `code` is base-10.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::ProtocolError;

/// Field separator inside a message
pub const SEPARATOR: char = ',';

/// Message terminator
pub const TERMINATOR: char = ';';

/// Closed set of MobiFlight command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    InitModule = 0,
    SetModule = 1,
    SetPin = 2,
    SetStepper = 3,
    SetServo = 4,
    Status = 5,
    EncoderChange = 6,
    ButtonChange = 7,
    StepperChange = 8,
    GetInfo = 9,
    Info = 10,
    SetConfig = 11,
    GetConfig = 12,
    ResetConfig = 13,
    SaveConfig = 14,
    ConfigSaved = 15,
    ActivateConfig = 16,
    ConfigActivated = 17,
    SetPowerSavingMode = 18,
    SetName = 19,
    GenNewSerial = 20,
    ResetStepper = 21,
    SetZeroStepper = 22,
    Trigger = 23,
    ResetBoard = 24,
    SetLcdDisplayI2C = 25,
    SetModuleBrightness = 26,
    SetShiftRegisterPins = 27,
    AnalogChange = 28,
    InputShifterChange = 29,
    DigInMuxChange = 30,
}

impl CommandCode {
    /// Number of codes; sizes the registry table
    pub const COUNT: usize = 31;

    const ALL: [CommandCode; Self::COUNT] = [
        CommandCode::InitModule,
        CommandCode::SetModule,
        CommandCode::SetPin,
        CommandCode::SetStepper,
        CommandCode::SetServo,
        CommandCode::Status,
        CommandCode::EncoderChange,
        CommandCode::ButtonChange,
        CommandCode::StepperChange,
        CommandCode::GetInfo,
        CommandCode::Info,
        CommandCode::SetConfig,
        CommandCode::GetConfig,
        CommandCode::ResetConfig,
        CommandCode::SaveConfig,
        CommandCode::ConfigSaved,
        CommandCode::ActivateConfig,
        CommandCode::ConfigActivated,
        CommandCode::SetPowerSavingMode,
        CommandCode::SetName,
        CommandCode::GenNewSerial,
        CommandCode::ResetStepper,
        CommandCode::SetZeroStepper,
        CommandCode::Trigger,
        CommandCode::ResetBoard,
        CommandCode::SetLcdDisplayI2C,
        CommandCode::SetModuleBrightness,
        CommandCode::SetShiftRegisterPins,
        CommandCode::AnalogChange,
        CommandCode::InputShifterChange,
        CommandCode::DigInMuxChange,
    ];

    /// Look up a wire code, `None` if out of range
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Wire value
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Position in the registry table
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A framed message split into its code and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub code: i32,
    pub args: Vec<String>,
}

impl CommandMessage {
    pub fn new(code: i32, args: Vec<String>) -> Self {
        Self { code, args }
    }
}

/// Parse a message body (terminator already stripped)
///
/// The first field must be an integer; surrounding whitespace is tolerated.
/// Encoded output from [`encode`](crate::encode) is accepted with or
/// without its trailing `;`.
///
/// # Returns
///
/// * `Ok(CommandMessage)` with the remaining fields as arguments
/// * `Err(ProtocolError::MalformedMessage)` if the code is not an integer
pub fn parse_message(text: &str) -> Result<CommandMessage, ProtocolError> {
    let body = text.strip_suffix(TERMINATOR).unwrap_or(text);
    let mut fields = body.split(SEPARATOR);

    let code = fields
        .next()
        .and_then(|field| field.trim().parse::<i32>().ok())
        .ok_or_else(|| ProtocolError::MalformedMessage(body.to_string()))?;

    Ok(CommandMessage {
        code,
        args: fields.map(|field| field.to_string()).collect(),
    })
}
