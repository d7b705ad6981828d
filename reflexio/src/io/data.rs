use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use crate::errors::HardwareError::{IncompatibleMode, UnknownPin};
use crate::errors::*;

/// Represents the internal data that an [`IoProtocol`](crate::io::IoProtocol) handles.
///
/// This struct is hidden behind an `Arc<RwLock<IoData>>` to allow safe concurrent access:
/// the protocol polling task updates it while the reaction engine samples it.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IoData {
    /// All `Pin` instances, representing the hardware's pins.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub pins: HashMap<u8, Pin>,
    /// List pins with digital reporting activated.
    pub digital_reported_pins: Vec<u8>,
    /// List channels with analog reporting activated.
    pub analog_reported_channels: Vec<u8>,
    /// A string indicating the version of the protocol.
    pub protocol_version: String,
    /// A string representing the name of the firmware.
    pub firmware_name: String,
    /// A string representing the version of the firmware.
    pub firmware_version: String,
    /// A boolean indicating whether the protocol is connected.
    pub connected: bool,
}

impl IoData {
    /// Retrieves a reference to a pin by its id.
    ///
    /// # Errors
    /// * `UnknownPin` - An `Error` returned if the pin id is out of bounds.
    pub fn get_pin(&self, pin: u8) -> Result<&Pin, Error> {
        self.pins.get(&pin).ok_or(Error::from(UnknownPin { pin }))
    }

    /// Retrieves a mutable reference to a pin by its id.
    ///
    /// # Errors
    /// * `UnknownPin` - An `Error` returned if the pin id is out of bounds.
    pub fn get_pin_mut(&mut self, pin: u8) -> Result<&mut Pin, Error> {
        self.pins
            .get_mut(&pin)
            .ok_or(Error::from(UnknownPin { pin }))
    }
}

/// Represents the current state and configuration of a pin.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Default)]
pub struct Pin {
    /// The pin ID, which also corresponds to the index of the [`IoData::pins`] hashmap.
    pub id: u8,
    /// The pin name: an alternative String representation of the pin: 'D13', 'A0' for instance.
    pub name: String,
    /// Currently configured mode.
    pub mode: PinMode,
    /// All pin supported modes.
    pub supported_modes: Vec<PinMode>,
    /// For analog pin, this is the channel number ie "A0"=>0, "A1"=>1, etc...
    pub channel: Option<u8>,
    /// Pin value.
    pub value: u16,
}

impl Pin {
    /// Verifies if a pin supports the given mode and returns it if it does.
    ///
    /// # Returns
    /// * `None` if the mode is not supported.
    /// * `PinMode` the `PinMode` configuration if supported
    pub fn supports_mode(&self, mode: PinModeId) -> Option<PinMode> {
        self.supported_modes.iter().find(|m| m.id == mode).copied()
    }

    /// Validates that the pin is in the given mode.
    ///
    /// # Errors
    /// *`IncompatibleMode`: the pin's current mode does not match the expected mode.
    pub fn validate_current_mode(&self, mode: PinModeId) -> Result<(), Error> {
        match self.mode.id == mode {
            true => Ok(()),
            false => Err(IncompatibleMode {
                mode: self.mode.id,
                pin: self.id,
                context: "check_current_mode",
            }),
        }?;
        Ok(())
    }

    /// Get the max value this pin can reach.
    ///
    /// This is defined by the resolution of the current pin mode.
    pub fn get_max_possible_value(&self) -> u16 {
        self.mode.get_max_possible_value()
    }
}

impl Debug for Pin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mode_str = format!("{}", self.mode);

        let mut debug_struct = f.debug_struct("Pin");
        debug_struct
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mode", &mode_str)
            .field("supported modes", &self.supported_modes)
            .field("channel", &self.channel)
            .field("value", &self.value)
            .finish()
    }
}

// ########################################

/// Represents a mode configuration for a pin.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Default, Copy)]
pub struct PinMode {
    /// Currently configured mode.
    pub id: PinModeId,
    /// Resolution (number of bits) this mode uses.
    pub resolution: u8,
}

impl PinMode {
    /// Get the max value this pinMode can reach according to its resolution.
    pub fn get_max_possible_value(&self) -> u16 {
        (1 << self.resolution) - 1
    }
}

impl Display for PinMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Debug for PinMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            PinModeId::UNSUPPORTED => write!(f, "[{}]", self.id),
            _ => write!(f, "[id: {}, resolution: {}]", self.id, self.resolution),
        }
    }
}

// ########################################

/// Enumerates the possible modes for a pin.
///
/// The full set is kept since real boards announce any of these in their capability
/// response, even if this crate only ever configures a subset.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[repr(u8)]
pub enum PinModeId {
    /// Same as INPUT defined in Arduino.h
    INPUT = 0,
    /// Same as OUTPUT defined in Arduino.h
    OUTPUT = 1,
    /// Analog pin in analogInput mode
    ANALOG = 2,
    /// Digital pin in PWM output mode
    PWM = 3,
    /// Digital pin in Servo output mode
    SERVO = 4,
    /// shiftIn/shiftOut mode
    SHIFT = 5,
    /// Pin included in I2C setup
    I2C = 6,
    /// Pin configured for 1-wire
    ONEWIRE = 7,
    /// Pin configured for stepper motor
    STEPPER = 8,
    /// Pin configured for rotary encoders
    ENCODER = 9,
    /// Pin configured for serial communication
    SERIAL = 0x0A,
    /// Enable internal pull-up resistor for pin
    PULLUP = 0x0B,
    /// Pin configured for SPI
    SPI = 0x0C,
    /// Pin configured for proximity sensors
    SONAR = 0x0D,
    /// Pin configured for piezzo buzzer tone generation
    TONE = 0x0E,
    /// Pin configured for DHT humidity and temperature sensors
    DHT = 0x0F,
    /// Pin configured to be ignored by digitalWrite and capabilityResponse
    #[default]
    UNSUPPORTED = 0x7F,
}

impl PinModeId {
    /// Converts a `u8` byte value into a `PinModeId`.
    ///
    /// # Errors
    /// * `Unknown`: The value does not match any known pin mode.
    pub fn from_u8(value: u8) -> Result<PinModeId, Error> {
        match value {
            0 => Ok(PinModeId::INPUT),
            1 => Ok(PinModeId::OUTPUT),
            2 => Ok(PinModeId::ANALOG),
            3 => Ok(PinModeId::PWM),
            4 => Ok(PinModeId::SERVO),
            5 => Ok(PinModeId::SHIFT),
            6 => Ok(PinModeId::I2C),
            7 => Ok(PinModeId::ONEWIRE),
            8 => Ok(PinModeId::STEPPER),
            9 => Ok(PinModeId::ENCODER),
            0x0A => Ok(PinModeId::SERIAL),
            0x0B => Ok(PinModeId::PULLUP),
            0x0C => Ok(PinModeId::SPI),
            0x0D => Ok(PinModeId::SONAR),
            0x0E => Ok(PinModeId::TONE),
            0x0F => Ok(PinModeId::DHT),
            0x7F => Ok(PinModeId::UNSUPPORTED),
            x => Err(Unknown {
                info: format!("PinMode not found with value: {}", x),
            }),
        }
    }
}

impl From<PinModeId> for u8 {
    fn from(mode: PinModeId) -> u8 {
        mode as u8
    }
}

impl Display for PinModeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::io::{Pin, PinMode, PinModeId};
    use crate::mocks::create_test_io_data;

    #[test]
    fn test_get_pin_success() {
        assert_eq!(create_test_io_data().get_pin(13).unwrap().value, 0);
        assert_eq!(create_test_io_data().get_pin(22).unwrap().value, 100);
        assert_eq!(create_test_io_data().get_pin_mut(13).unwrap().value, 0);
        assert_eq!(create_test_io_data().get_pin_mut(22).unwrap().value, 100);
    }

    #[test]
    fn test_get_pin_error() {
        assert!(create_test_io_data().get_pin(66).is_err());
        assert!(create_test_io_data().get_pin_mut(66).is_err());
    }

    #[test]
    fn test_mutate_pin() {
        let mut data = create_test_io_data();
        assert_eq!(data.get_pin_mut(11).unwrap().value, 0);
        data.get_pin_mut(11).unwrap().value = 255;
        assert_eq!(data.get_pin_mut(11).unwrap().value, 255);
    }

    #[test]
    fn test_pin_supports_mode() {
        let pin = Pin {
            supported_modes: vec![
                PinMode {
                    id: PinModeId::INPUT,
                    resolution: 0,
                },
                PinMode {
                    id: PinModeId::OUTPUT,
                    resolution: 0,
                },
            ],
            ..Default::default()
        };

        assert!(pin.supports_mode(PinModeId::INPUT).is_some());
        assert!(pin.supports_mode(PinModeId::PWM).is_none());
    }

    #[test]
    fn test_pin_mode_max_value() {
        let pin_mode = PinMode {
            id: PinModeId::INPUT,
            resolution: 8,
        };

        assert_eq!(pin_mode.get_max_possible_value(), 255);
    }

    #[test]
    fn test_check_current_mode() {
        let pin = Pin {
            mode: PinMode {
                id: PinModeId::PWM,
                resolution: 10,
            },
            ..Default::default()
        };

        assert!(pin.validate_current_mode(PinModeId::PWM).is_ok());
        assert!(pin.validate_current_mode(PinModeId::SHIFT).is_err());
        assert_eq!(pin.get_max_possible_value(), 1023);
    }

    #[test]
    fn test_pin_mode_display() {
        let mode = PinMode {
            id: PinModeId::PWM,
            resolution: 8,
        };
        assert_eq!(format!("{}", mode), "PWM");
        assert_eq!(format!("{:?}", mode), "[id: PWM, resolution: 8]");
        let unsupported = PinMode {
            id: PinModeId::UNSUPPORTED,
            resolution: 0,
        };
        assert_eq!(format!("{:?}", unsupported), "[UNSUPPORTED]");
    }

    #[test]
    fn test_pin_mode_id_conversions() {
        assert_eq!(PinModeId::from_u8(0).unwrap(), PinModeId::INPUT);
        assert_eq!(PinModeId::from_u8(1).unwrap(), PinModeId::OUTPUT);
        assert_eq!(PinModeId::from_u8(2).unwrap(), PinModeId::ANALOG);
        assert_eq!(PinModeId::from_u8(3).unwrap(), PinModeId::PWM);
        assert_eq!(PinModeId::from_u8(4).unwrap(), PinModeId::SERVO);
        assert_eq!(PinModeId::from_u8(5).unwrap(), PinModeId::SHIFT);
        assert_eq!(PinModeId::from_u8(6).unwrap(), PinModeId::I2C);
        assert_eq!(PinModeId::from_u8(7).unwrap(), PinModeId::ONEWIRE);
        assert_eq!(PinModeId::from_u8(8).unwrap(), PinModeId::STEPPER);
        assert_eq!(PinModeId::from_u8(9).unwrap(), PinModeId::ENCODER);
        assert_eq!(PinModeId::from_u8(0x0A).unwrap(), PinModeId::SERIAL);
        assert_eq!(PinModeId::from_u8(0x0B).unwrap(), PinModeId::PULLUP);
        assert_eq!(PinModeId::from_u8(0x0C).unwrap(), PinModeId::SPI);
        assert_eq!(PinModeId::from_u8(0x0D).unwrap(), PinModeId::SONAR);
        assert_eq!(PinModeId::from_u8(0x0E).unwrap(), PinModeId::TONE);
        assert_eq!(PinModeId::from_u8(0x0F).unwrap(), PinModeId::DHT);
        assert_eq!(PinModeId::from_u8(0x7F).unwrap(), PinModeId::UNSUPPORTED);

        let error_mode = PinModeId::from_u8(100);
        assert!(error_mode.is_err());
        assert_eq!(
            error_mode.err().unwrap().to_string(),
            "Unknown error: PinMode not found with value: 100."
        );

        assert_eq!(u8::from(PinModeId::SHIFT), 5);
    }

    #[test]
    fn test_pin_debug() {
        let pin = Pin {
            id: 13,
            name: String::from("D13"),
            mode: PinMode {
                id: PinModeId::OUTPUT,
                resolution: 1,
            },
            supported_modes: vec![PinMode {
                id: PinModeId::OUTPUT,
                resolution: 1,
            }],
            channel: None,
            value: 1,
        };
        assert_eq!(
            format!("{:?}", pin),
            "Pin { id: 13, name: \"D13\", mode: \"OUTPUT\", supported modes: [[id: OUTPUT, resolution: 1]], channel: None, value: 1 }"
        );
    }
}
