//! Defines the protocol seam between the reaction engine and the hardware.

use std::any::type_name;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use dyn_clone::DynClone;
use parking_lot::RwLock;

use crate::errors::Error;
use crate::io::firmata::FirmataIo;
use crate::io::{IoData, PinModeId};

// Makes a Box<dyn IoProtocol> clone (used for Board cloning).
dyn_clone::clone_trait_object!(IoProtocol);

/// Defines the trait all protocols must implement.
#[cfg_attr(feature = "serde", typetag::serde(tag = "type"))]
pub trait IoProtocol: DynClone + Send + Sync + Debug + Display {
    // ########################################
    // Inner data related functions

    /// Returns a protected arc to the inner [`IoData`].
    fn get_io(&self) -> &Arc<RwLock<IoData>>;

    /// Returns the protocol name (used for Display only)
    fn get_name(&self) -> &str {
        type_name::<Self>().split("::").last().unwrap()
    }

    // ########################################
    // Functions specifically bound to the protocol.

    /// Opens the communication using the underlying protocol.
    fn open(&mut self) -> Result<(), Error>;
    /// Gracefully shuts down the communication.
    fn close(&mut self) -> Result<(), Error>;
    /// Checks if the communication is opened using the underlying protocol.
    fn is_connected(&self) -> bool;

    // ########################################
    // Read/Write on pins

    /// Sets the `mode` of the specified `pin`.
    ///
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#data-message-expansion>
    fn set_pin_mode(&mut self, pin: u8, mode: PinModeId) -> Result<(), Error>;

    /// Writes `level` to the digital `pin`.
    ///
    /// Send an DIGITAL_MESSAGE (0x90 - set digital value).
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#message-types>
    fn digital_write(&mut self, pin: u8, level: bool) -> Result<(), Error>;

    /// Writes `level` to the analog `pin`.
    ///
    /// Send an ANALOG_MESSAGE (0xE0 - set analog value).
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#message-types>
    fn analog_write(&mut self, pin: u8, level: u16) -> Result<(), Error>;

    /// Activates reporting `state` of the specified analog `channel`.
    ///
    /// When activated, the board sends the channel value periodically: the value is
    /// stored in the [`IoData`] pin table.
    fn report_analog(&mut self, channel: u8, state: bool) -> Result<(), Error>;

    /// Sets the digital reporting `state` of the specified digital `pin`.
    ///
    /// This activates the reporting of all pins in the port, hence the board sends
    /// us their values periodically.
    /// <https://github.com/firmata/protocol/blob/master/protocol.md>
    fn report_digital(&mut self, pin: u8, state: bool) -> Result<(), Error>;

    /// Sets the sampling interval (in ms).
    ///
    /// The sampling interval sets how often analog data is reported to the client.
    /// The default for the arduino implementation is 19ms.
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#sampling-interval>
    fn sampling_interval(&mut self, interval: u16) -> Result<(), Error>;

    /// Sends an arbitrary sysex `command` with a 7-bit clean `payload`.
    ///
    /// Used for firmware extensions such as tone generation which have no dedicated
    /// command byte in the core protocol.
    fn send_sysex(&mut self, command: u8, payload: &[u8]) -> Result<(), Error>;
}

#[cfg(not(tarpaulin_include))]
impl Default for Box<dyn IoProtocol> {
    fn default() -> Self {
        Box::new(FirmataIo::default())
    }
}
