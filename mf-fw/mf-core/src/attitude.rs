//! Pitch and bank read back from the variable store for the render step

use crate::variables::VariableStore;

/// Attitude in degrees, as handed to the screen each tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attitude {
    pub pitch: f32,
    pub bank: f32,
}

impl Attitude {
    /// Re-read both values from `store`.
    ///
    /// Each value is parsed on its own; text that is missing or not a number
    /// leaves that value at its last good reading.
    pub fn refresh(&mut self, store: &VariableStore, pitch_index: usize, bank_index: usize) {
        if let Some(pitch) = read_degrees(store, pitch_index) {
            self.pitch = pitch;
        }
        if let Some(bank) = read_degrees(store, bank_index) {
            self.bank = bank;
        }
    }
}

fn read_degrees(store: &VariableStore, index: usize) -> Option<f32> {
    store
        .get(index)?
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
}
