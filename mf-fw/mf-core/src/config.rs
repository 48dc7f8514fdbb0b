//! Device configuration, fixed at initialization

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::framer::DEFAULT_MAX_MESSAGE_LEN;
use crate::ring_buffer::DEFAULT_CAPACITY;

/// MobiFlight module type tag for a button
const MODULE_BUTTON: u8 = 1;
/// MobiFlight module type tag for an I2C LCD display
const MODULE_LCD_DISPLAY: u8 = 7;

/// How the consumer drains the ring buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    /// One byte per call, fed straight to the framer
    #[default]
    Byte,
    /// One complete LF-terminated line per call
    Line,
}

/// Answers to the `GetInfo` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceIdentity {
    pub board_type: String,
    pub name: String,
    pub serial: String,
    pub firmware_version: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            board_type: "MobiFlight Tufty2040".to_string(),
            name: "MobiFlight Tufty2040".to_string(),
            serial: "SN-752-f99".to_string(),
            firmware_version: "0.0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub name: String,
    pub pin: u8,
}

/// A display module; its position in the list is its variable index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub name: String,
    pub address: u8,
    pub cols: u8,
    pub lines: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceConfig {
    /// Usable ring buffer capacity in bytes
    pub buffer_capacity: usize,
    /// Echo every byte taken in byte mode back to the host
    pub echo: bool,
    pub input_mode: InputMode,
    /// Longest pending message before it is discarded as malformed
    pub max_message_len: usize,
    pub identity: DeviceIdentity,
    pub buttons: Vec<ButtonConfig>,
    pub displays: Vec<DisplayConfig>,
    /// Variable index carrying pitch degrees
    pub pitch_index: usize,
    /// Variable index carrying bank degrees
    pub bank_index: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            echo: true,
            input_mode: InputMode::Byte,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            identity: DeviceIdentity::default(),
            buttons: vec![ButtonConfig {
                name: "ButtonA".to_string(),
                pin: 7,
            }],
            displays: vec![
                DisplayConfig {
                    name: "Pitch".to_string(),
                    address: 32,
                    cols: 16,
                    lines: 1,
                },
                DisplayConfig {
                    name: "Bank".to_string(),
                    address: 33,
                    cols: 16,
                    lines: 1,
                },
            ],
            pitch_index: 0,
            bank_index: 1,
        }
    }
}

impl DeviceConfig {
    /// Module list reported in response to `GetConfig`
    ///
    /// `1.<pin>.<name>:` per button followed by
    /// `7.<address>.<cols>.<lines>.<name>:` per display.
    pub fn module_config(&self) -> String {
        let buttons = self
            .buttons
            .iter()
            .map(|b| format!("{MODULE_BUTTON}.{}.{}:", b.pin, b.name));
        let displays = self.displays.iter().map(|d| {
            format!(
                "{MODULE_LCD_DISPLAY}.{}.{}.{}.{}:",
                d.address, d.cols, d.lines, d.name
            )
        });
        buttons.chain(displays).collect()
    }
}
