//! Buttons on the host
//!
//! A desktop has no GPIO, so every configured button is backed by a
//! [`SharedButton`] that starts released. The handles let an embedder press
//! them.

use mf_core::{ButtonMonitor, DeviceConfig, SharedButton};

/// One monitor per configured button, plus the handles driving them
pub fn configured_buttons(config: &DeviceConfig) -> (Vec<ButtonMonitor>, Vec<SharedButton>) {
    config
        .buttons
        .iter()
        .map(|button| {
            let handle = SharedButton::new();
            (ButtonMonitor::new(button.name.as_str(), handle.clone()), handle)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::ResponseEncoder;
    use mf_core::transport::FakeSerial;

    #[test]
    fn test_monitor_per_configured_button() {
        let config = DeviceConfig::default();
        let (mut monitors, handles) = configured_buttons(&config);

        let names: Vec<_> = monitors.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, ["ButtonA"]);
        assert_eq!(handles.len(), 1);

        let mut serial = FakeSerial::new();
        handles[0].set_pressed(true);
        assert!(monitors[0].poll(&mut ResponseEncoder::new(&mut serial)).unwrap());
        assert_eq!(serial.output(), "7,ButtonA,0;\r\n");
    }

    #[test]
    fn test_no_buttons_configured() {
        let config = DeviceConfig {
            buttons: Vec::new(),
            ..DeviceConfig::default()
        };
        let (monitors, handles) = configured_buttons(&config);
        assert!(monitors.is_empty());
        assert!(handles.is_empty());
    }
}
