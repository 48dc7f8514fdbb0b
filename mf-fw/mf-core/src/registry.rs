//! Command registry and dispatcher
//!
//! A fixed table with one slot per [`CommandCode`]. Handlers are installed
//! while the device is being built; once the registry is moved into the
//! [`Device`](crate::Device) nothing can register any more.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;

use crate::command::CommandCode;
use crate::encoder::ResponseEncoder;
use crate::error::{HandlerError, ProtocolError};
use crate::variables::VariableStore;

/// What a handler may touch while it runs
pub struct HandlerContext<'a> {
    pub vars: &'a mut VariableStore,
    pub out: ResponseEncoder<'a>,
}

/// Consumes a command's arguments, may update variables and emit responses.
///
/// Handlers must not block. Failures are returned, never panicked.
pub trait Handler {
    fn handle(&mut self, args: &[String], ctx: &mut HandlerContext<'_>) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: FnMut(&[String], &mut HandlerContext<'_>) -> Result<(), HandlerError>,
{
    fn handle(&mut self, args: &[String], ctx: &mut HandlerContext<'_>) -> Result<(), HandlerError> {
        self(args, ctx)
    }
}

pub struct CommandRegistry {
    slots: [Option<Box<dyn Handler>>; CommandCode::COUNT],
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Install `handler` for `code`, returning the handler it replaced
    pub fn register<H: Handler + 'static>(
        &mut self,
        code: CommandCode,
        handler: H,
    ) -> Option<Box<dyn Handler>> {
        log::debug!("Registering handler for {code:?}");
        self.slots[code.index()].replace(Box::new(handler))
    }

    /// Closure form of [`register`](Self::register)
    pub fn register_fn<F>(&mut self, code: CommandCode, handler: F) -> Option<Box<dyn Handler>>
    where
        F: FnMut(&[String], &mut HandlerContext<'_>) -> Result<(), HandlerError> + 'static,
    {
        self.register(code, handler)
    }

    pub fn is_registered(&self, code: CommandCode) -> bool {
        self.slots[code.index()].is_some()
    }

    /// Run the handler registered for `code`
    ///
    /// # Returns
    ///
    /// * `Ok(CommandCode)` if a handler ran to completion
    /// * `Err(ProtocolError::UnknownCommand)` if `code` is out of range or has no
    ///   handler (both cases are treated the same)
    /// * `Err(ProtocolError::HandlerFailure)` if the handler reported a failure
    /// * `Err(ProtocolError::TransportFailure)` if writing the handler's response
    ///   failed
    pub fn dispatch(
        &mut self,
        code: i32,
        args: &[String],
        ctx: &mut HandlerContext<'_>,
    ) -> Result<CommandCode, ProtocolError> {
        let command = CommandCode::from_code(code).ok_or(ProtocolError::UnknownCommand(code))?;
        let handler = self.slots[command.index()]
            .as_mut()
            .ok_or(ProtocolError::UnknownCommand(code))?;

        log::debug!("Dispatching {command:?} with {} argument(s)", args.len());
        match handler.handle(args, ctx) {
            Ok(()) => Ok(command),
            Err(HandlerError::Transport(err)) => Err(ProtocolError::TransportFailure(err)),
            Err(reason) => Err(ProtocolError::HandlerFailure {
                code: command,
                reason,
            }),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
