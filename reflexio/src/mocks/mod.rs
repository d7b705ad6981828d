//! Test doubles for the IO layer: used by the crate tests and available to
//! downstream tests through the `mocks` feature.

pub mod io_protocol;
pub mod transport_layer;

use std::collections::HashMap;

pub use io_protocol::{IoCommand, MockIoProtocol};
pub use transport_layer::MockTransportLayer;

use crate::io::{IoData, Pin, PinMode, PinModeId};

pub fn create_digital_pin(id: u8) -> Pin {
    Pin {
        id,
        name: format!("D{}", id),
        mode: PinMode {
            id: PinModeId::OUTPUT,
            resolution: 1,
        },
        supported_modes: vec![
            PinMode {
                id: PinModeId::INPUT,
                resolution: 1,
            },
            PinMode {
                id: PinModeId::PULLUP,
                resolution: 1,
            },
            PinMode {
                id: PinModeId::OUTPUT,
                resolution: 1,
            },
        ],
        channel: None,
        value: 0,
    }
}

pub fn create_input_pin(id: u8) -> Pin {
    let mut pin = create_digital_pin(id);
    pin.mode = PinMode {
        id: PinModeId::INPUT,
        resolution: 1,
    };
    pin
}

pub fn create_pwm_pin(id: u8) -> Pin {
    Pin {
        id,
        name: format!("D{}", id),
        mode: PinMode {
            id: PinModeId::PWM,
            resolution: 8,
        },
        supported_modes: vec![
            PinMode {
                id: PinModeId::INPUT,
                resolution: 1,
            },
            PinMode {
                id: PinModeId::OUTPUT,
                resolution: 1,
            },
            PinMode {
                id: PinModeId::PWM,
                resolution: 8,
            },
        ],
        channel: None,
        value: 0,
    }
}

pub fn create_analog_pin(id: u8, channel: u8, value: u16) -> Pin {
    Pin {
        id,
        name: format!("A{}", channel),
        mode: PinMode {
            id: PinModeId::ANALOG,
            resolution: 10,
        },
        supported_modes: vec![
            PinMode {
                id: PinModeId::ANALOG,
                resolution: 10,
            },
            PinMode {
                id: PinModeId::INPUT,
                resolution: 1,
            },
            PinMode {
                id: PinModeId::OUTPUT,
                resolution: 1,
            },
        ],
        channel: Some(channel),
        value,
    }
}

pub fn create_unsupported_pin(id: u8) -> Pin {
    Pin {
        id,
        name: format!("D{}", id),
        mode: PinMode {
            id: PinModeId::UNSUPPORTED,
            resolution: 0,
        },
        supported_modes: vec![PinMode {
            id: PinModeId::ANALOG,
            resolution: 10,
        }],
        channel: None,
        value: 0,
    }
}

/// A plausible UNO-like pin table covering the wirings used throughout the tests:
/// buttons on 5/6/7, outputs on 2/3/4/8/9/10/12/13, PWM on 11, analog on 14/15/22.
pub fn create_test_io_data() -> IoData {
    IoData {
        pins: HashMap::from([
            (0, create_unsupported_pin(0)),
            (1, create_unsupported_pin(1)),
            (2, create_digital_pin(2)),
            (3, create_digital_pin(3)),
            (4, create_digital_pin(4)),
            (5, create_input_pin(5)),
            (6, create_input_pin(6)),
            (7, create_input_pin(7)),
            (8, create_digital_pin(8)),
            (9, create_digital_pin(9)),
            (10, create_digital_pin(10)),
            (11, create_pwm_pin(11)),
            (12, create_digital_pin(12)),
            (13, create_digital_pin(13)),
            (14, create_analog_pin(14, 0, 0)),
            (15, create_analog_pin(15, 1, 0)),
            (22, create_analog_pin(22, 8, 100)),
        ]),
        digital_reported_pins: vec![],
        analog_reported_channels: vec![],
        protocol_version: "fake.1.0".to_string(),
        firmware_name: "Fake board".to_string(),
        firmware_version: "fake.2.3".to_string(),
        connected: false,
    }
}
