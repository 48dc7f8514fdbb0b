//! Button polling and `ButtonChange` reporting

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::command::CommandCode;
use crate::encoder::ResponseEncoder;
use crate::error::TransportError;

/// MobiFlight button state sent when a button goes down
pub const STATE_PRESSED: &str = "0";
/// MobiFlight button state sent when a button comes back up
pub const STATE_RELEASED: &str = "1";

/// Hardware-input collaborator
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
}

/// Button whose state is set from elsewhere (another task, a test)
#[derive(Clone, Default)]
pub struct SharedButton {
    pressed: Arc<AtomicBool>,
}

impl SharedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Release);
    }
}

impl ButtonInput for SharedButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

/// Tracks one named button and reports edges
pub struct ButtonMonitor {
    name: String,
    input: Box<dyn ButtonInput>,
    pressed: bool,
}

impl ButtonMonitor {
    /// The button is assumed released at startup
    pub fn new(name: impl Into<String>, input: impl ButtonInput + 'static) -> Self {
        Self {
            name: name.into(),
            input: Box::new(input),
            pressed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample the input and send `ButtonChange,<name>,<state>` on a change
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if a change was reported
    /// * `Ok(false)` if the state is unchanged
    pub fn poll(&mut self, out: &mut ResponseEncoder<'_>) -> Result<bool, TransportError> {
        let pressed = self.input.is_pressed();
        if pressed == self.pressed {
            return Ok(false);
        }

        let state = if pressed { STATE_PRESSED } else { STATE_RELEASED };
        log::debug!("Button {} -> {state}", self.name);
        out.send(CommandCode::ButtonChange, &[self.name.as_str(), state])?;
        self.pressed = pressed;
        Ok(true)
    }
}
