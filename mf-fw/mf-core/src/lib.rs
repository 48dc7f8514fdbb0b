//! MobiFlight device core.
//!
//! This crate provides the transport and command-protocol layer shared between
//! firmware builds: the cross-context ring buffer fed by the serial reader, the
//! byte/line extractor, the `;`-terminated message framer, the command registry
//! and dispatcher, the variable store and the response encoder.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod attitude;
pub mod buttons;
pub mod command;
pub mod config;
pub mod device;
pub mod encoder;
pub mod error;
pub mod extractor;
pub mod framer;
pub mod handlers;
pub mod producer;
pub mod registry;
pub mod ring_buffer;
pub mod termination;
pub mod transport;
pub mod variables;

pub use attitude::Attitude;
pub use buttons::{ButtonInput, ButtonMonitor, SharedButton};
pub use command::{CommandCode, CommandMessage, parse_message};
pub use config::{DeviceConfig, InputMode};
pub use device::{Device, LoopControl, ProtocolStats};
pub use encoder::{ResponseEncoder, encode};
pub use error::{BufferOverflow, HandlerError, ProtocolError, TransportError};
pub use extractor::Extractor;
pub use framer::{FramerState, MessageFramer};
pub use producer::run_producer;
pub use registry::{CommandRegistry, Handler, HandlerContext};
pub use ring_buffer::{Consumer, Producer, RingBuffer};
pub use termination::Termination;
pub use transport::{ByteSource, Screen, SerialWrite};
pub use variables::VariableStore;
