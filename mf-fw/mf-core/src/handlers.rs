//! Baseline MobiFlight command handlers

extern crate alloc;

use alloc::string::String;

use crate::command::CommandCode;
use crate::config::DeviceConfig;
use crate::error::HandlerError;
use crate::registry::CommandRegistry;

/// Install the handlers every device answers:
///
/// - `GetConfig` → `Info` carrying the module list
/// - `GetInfo` → `Info` carrying board type, name, serial and version
/// - `SetLcdDisplayI2C` → sets a variable (`index`, `text`); only indices of
///   configured displays are accepted
pub fn register_defaults(registry: &mut CommandRegistry, config: &DeviceConfig) {
    let module_config = config.module_config();
    registry.register_fn(CommandCode::GetConfig, move |_args, ctx| {
        ctx.out.send(CommandCode::Info, &[module_config.as_str()])?;
        Ok(())
    });

    let identity = config.identity.clone();
    registry.register_fn(CommandCode::GetInfo, move |_args, ctx| {
        ctx.out.send(
            CommandCode::Info,
            &[
                identity.board_type.as_str(),
                identity.name.as_str(),
                identity.serial.as_str(),
                identity.firmware_version.as_str(),
            ],
        )?;
        Ok(())
    });

    let display_count = config.displays.len();
    registry.register_fn(CommandCode::SetLcdDisplayI2C, move |args, ctx| {
        let index = parse_index(args, 0, display_count)?;
        let value = argument(args, 1)?;
        ctx.vars.set(index, value.as_str());
        Ok(())
    });
}

fn argument(args: &[String], index: usize) -> Result<&String, HandlerError> {
    args.get(index)
        .ok_or(HandlerError::MissingArgument { index })
}

/// Parse `args[index]` as a variable index below `count`
fn parse_index(args: &[String], index: usize, count: usize) -> Result<usize, HandlerError> {
    let raw = argument(args, index)?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value < count => Ok(value),
        _ => Err(HandlerError::InvalidArgument {
            index,
            value: raw.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ResponseEncoder;
    use crate::error::ProtocolError;
    use crate::registry::HandlerContext;
    use crate::transport::FakeSerial;
    use crate::variables::VariableStore;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    fn run(code: i32, args: &[&str]) -> (Result<CommandCode, ProtocolError>, VariableStore, String) {
        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry, &DeviceConfig::default());
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();

        let mut vars = VariableStore::new();
        let mut serial = FakeSerial::new();
        let result = {
            let mut ctx = HandlerContext {
                vars: &mut vars,
                out: ResponseEncoder::new(&mut serial),
            };
            registry.dispatch(code, &args, &mut ctx)
        };
        (result, vars, serial.output())
    }

    #[test]
    fn test_get_config_reports_modules() {
        let (result, _, out) = run(12, &[]);
        assert_eq!(result, Ok(CommandCode::GetConfig));
        assert_eq!(out, "10,1.7.ButtonA:7.32.16.1.Pitch:7.33.16.1.Bank:;\r\n");
    }

    #[test]
    fn test_get_info_reports_identity() {
        let (result, _, out) = run(9, &[]);
        assert_eq!(result, Ok(CommandCode::GetInfo));
        assert_eq!(
            out,
            "10,MobiFlight Tufty2040,MobiFlight Tufty2040,SN-752-f99,0.0.1;\r\n"
        );
    }

    #[test]
    fn test_set_variable() {
        let (result, vars, out) = run(25, &["1", "-12.5"]);
        assert_eq!(result, Ok(CommandCode::SetLcdDisplayI2C));
        assert_eq!(vars.get(1), Some("-12.5"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_set_variable_missing_value() {
        let (result, vars, _) = run(25, &["0"]);
        assert_eq!(
            result,
            Err(ProtocolError::HandlerFailure {
                code: CommandCode::SetLcdDisplayI2C,
                reason: HandlerError::MissingArgument { index: 1 },
            })
        );
        assert!(vars.is_empty());
    }

    #[test]
    fn test_set_variable_outside_displays_is_rejected() {
        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry, &DeviceConfig::default());
        let mut vars = VariableStore::new();
        let mut serial = FakeSerial::new();
        let mut ctx = HandlerContext {
            vars: &mut vars,
            out: ResponseEncoder::new(&mut serial),
        };

        for i in 0..100 {
            let args = [(1_000_000 + i).to_string(), "x".to_string()];
            assert!(matches!(
                registry.dispatch(25, &args, &mut ctx),
                Err(ProtocolError::HandlerFailure {
                    reason: HandlerError::InvalidArgument { index: 0, .. },
                    ..
                })
            ));
        }
        assert_eq!(
            registry.dispatch(25, &["2".to_string(), "x".to_string()], &mut ctx),
            Err(ProtocolError::HandlerFailure {
                code: CommandCode::SetLcdDisplayI2C,
                reason: HandlerError::InvalidArgument {
                    index: 0,
                    value: "2".to_string(),
                },
            })
        );
        assert!(ctx.vars.is_empty());
    }

    #[test]
    fn test_set_variable_bad_index() {
        let (result, _, _) = run(25, &["pitch", "3"]);
        assert!(matches!(
            result,
            Err(ProtocolError::HandlerFailure {
                reason: HandlerError::InvalidArgument { index: 0, .. },
                ..
            })
        ));
    }
}
