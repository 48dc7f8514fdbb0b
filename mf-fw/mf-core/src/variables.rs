//! Instrument variables set over the wire
//!
//! Values stay as text; the reader decides how to parse them.

extern crate alloc;

use alloc::string::String;
use hashbrown::HashMap;

/// Index→text map written by handlers and read by the render step.
///
/// Single writer and single reader, both on the consumer context, so no
/// synchronization.
#[derive(Debug, Default, Clone)]
pub struct VariableStore {
    values: HashMap<usize, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        let value = value.into();
        log::trace!("var[{index}] = {value:?}");
        self.values.insert(index, value);
    }

    /// Last value set at `index`, `None` if never set
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
