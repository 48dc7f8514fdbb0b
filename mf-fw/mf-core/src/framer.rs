//! `;`-terminated message framing
//!
//! Characters arrive one at a time. Line feeds are dropped, `;` completes the
//! pending message, anything else is appended.

extern crate alloc;

use alloc::string::String;

use crate::command::{CommandMessage, TERMINATOR, parse_message};
use crate::error::ProtocolError;

/// Default bound on the pending message length
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    /// Pending buffer empty
    Idle,
    /// Characters pending, waiting for the terminator
    Accumulating,
    /// An oversized message was reported; skipping to the next terminator
    Discarding,
}

pub struct MessageFramer {
    pending: String,
    last_command: String,
    max_len: usize,
    discarding: bool,
}

impl MessageFramer {
    pub fn new(max_len: usize) -> Self {
        Self {
            pending: String::new(),
            last_command: String::new(),
            max_len: max_len.max(1),
            discarding: false,
        }
    }

    /// Feed one character
    ///
    /// # Returns
    ///
    /// * `None` while the message is still accumulating
    /// * `Some(Ok(CommandMessage))` when a terminator completed a message with a
    ///   valid code
    /// * `Some(Err(ProtocolError::MalformedMessage))` when the completed message
    ///   has no integer code, or the pending buffer outgrew its bound (the rest
    ///   of that message, up to its terminator, is then skipped)
    pub fn push(&mut self, ch: char) -> Option<Result<CommandMessage, ProtocolError>> {
        match ch {
            TERMINATOR if self.discarding => {
                self.discarding = false;
                None
            }
            _ if self.discarding => None,
            TERMINATOR => {
                let result = parse_message(&self.pending);
                self.last_command = core::mem::take(&mut self.pending);
                Some(result)
            }
            '\n' => None,
            _ if self.pending.len() >= self.max_len => {
                let discarded = core::mem::take(&mut self.pending);
                self.discarding = true;
                Some(Err(ProtocolError::MalformedMessage(discarded)))
            }
            _ => {
                self.pending.push(ch);
                None
            }
        }
    }

    /// Drop any pending characters
    pub fn reset(&mut self) {
        self.pending.clear();
        self.discarding = false;
    }

    pub fn state(&self) -> FramerState {
        if self.discarding {
            FramerState::Discarding
        } else if self.pending.is_empty() {
            FramerState::Idle
        } else {
            FramerState::Accumulating
        }
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Text of the most recently terminated message, for on-screen diagnostics
    pub fn last_command(&self) -> &str {
        &self.last_command
    }
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn feed(framer: &mut MessageFramer, text: &str) -> Vec<Result<CommandMessage, ProtocolError>> {
        text.chars().filter_map(|c| framer.push(c)).collect()
    }

    #[test]
    fn test_frames_message() {
        let mut framer = MessageFramer::default();
        let results = feed(&mut framer, "12,ButtonA,1;");
        assert_eq!(
            results,
            vec![Ok(CommandMessage::new(
                12,
                vec!["ButtonA".to_string(), "1".to_string()]
            ))]
        );
        assert_eq!(framer.state(), FramerState::Idle);
        assert_eq!(framer.last_command(), "12,ButtonA,1");
    }

    #[test]
    fn test_state_transitions() {
        let mut framer = MessageFramer::default();
        assert_eq!(framer.state(), FramerState::Idle);
        framer.push('9');
        assert_eq!(framer.state(), FramerState::Accumulating);
        assert!(framer.push(';').is_some());
        assert_eq!(framer.state(), FramerState::Idle);
    }

    #[test]
    fn test_line_feeds_are_dropped() {
        let mut framer = MessageFramer::default();
        let results = feed(&mut framer, "2\n5,0,\n1.5;\n");
        assert_eq!(
            results,
            vec![Ok(CommandMessage::new(
                25,
                vec!["0".to_string(), "1.5".to_string()]
            ))]
        );
    }

    #[test]
    fn test_message_split_across_feeds() {
        let mut framer = MessageFramer::default();
        assert!(feed(&mut framer, "9").is_empty());
        assert_eq!(framer.pending(), "9");
        let results = feed(&mut framer, ";");
        assert_eq!(results, vec![Ok(CommandMessage::new(9, Vec::new()))]);
    }

    #[test]
    fn test_malformed_message_is_reported_and_cleared() {
        let mut framer = MessageFramer::default();
        let results = feed(&mut framer, "hello;9;");
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(ProtocolError::MalformedMessage(_))));
        assert_eq!(results[1], Ok(CommandMessage::new(9, Vec::new())));
        assert_eq!(framer.last_command(), "9");
    }

    #[test]
    fn test_last_command_kept_for_malformed() {
        let mut framer = MessageFramer::default();
        feed(&mut framer, "oops;");
        assert_eq!(framer.last_command(), "oops");
    }

    #[test]
    fn test_oversized_message_is_discarded() {
        let mut framer = MessageFramer::new(4);
        let results = feed(&mut framer, "123456");
        assert_eq!(
            results,
            vec![Err(ProtocolError::MalformedMessage("1234".to_string()))]
        );
        assert_eq!(framer.state(), FramerState::Discarding);

        // the tail of the oversized message never reaches the dispatcher
        assert!(feed(&mut framer, "7;").is_empty());
        assert_eq!(framer.state(), FramerState::Idle);

        let results = feed(&mut framer, "9;");
        assert_eq!(results, vec![Ok(CommandMessage::new(9, Vec::new()))]);
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut framer = MessageFramer::default();
        feed(&mut framer, "25,0");
        framer.reset();
        assert_eq!(framer.state(), FramerState::Idle);
    }
}
