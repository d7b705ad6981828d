//! Official Firmata documentation: <https://github.com/firmata/protocol>

pub(crate) mod constants;

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use parking_lot::RwLock;

use crate::errors::{Error, HardwareError, ProtocolError};
use crate::io::firmata::constants::*;
use crate::io::protocol::IoProtocol;
use crate::io::{IoData, IoTransport, Pin, PinMode, PinModeId, Serial};
use crate::pause;
use crate::utils::task;
use crate::utils::task::TaskHandler;

/// Implements the [Firmata protocol](https://github.com/firmata/protocol) within an [`IoProtocol`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct FirmataIo {
    /// Transport layer used to communicate with the device.
    transport: Box<dyn IoTransport>,

    // ########################################
    // # Volatile utility data.
    #[cfg_attr(feature = "serde", serde(skip))]
    data: Arc<RwLock<IoData>>,
    /// Inner handler to the polling task.
    #[cfg_attr(feature = "serde", serde(skip))]
    handler: Arc<RwLock<Option<TaskHandler>>>,
}

impl Default for FirmataIo {
    fn default() -> Self {
        Self {
            transport: Box::new(Serial::default()),
            data: Arc::new(Default::default()),
            handler: Arc::new(RwLock::new(None)),
        }
    }
}

impl FirmataIo {
    pub fn new<P: Into<String>>(port: P) -> Self {
        Self {
            transport: Box::new(Serial::new(port)),
            data: Arc::new(Default::default()),
            handler: Arc::new(RwLock::new(None)),
        }
    }
}

impl<T: IoTransport + 'static> From<T> for FirmataIo {
    fn from(transport: T) -> Self {
        Self {
            transport: Box::new(transport),
            data: Arc::new(Default::default()),
            handler: Arc::new(RwLock::new(None)),
        }
    }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl IoProtocol for FirmataIo {
    fn get_io(&self) -> &Arc<RwLock<IoData>> {
        &self.data
    }

    #[cfg(not(tarpaulin_include))]
    fn open(&mut self) -> Result<(), Error> {
        self.data.write().connected = false;

        self.transport.open()?;

        // Perform handshake.
        self.handshake()?;

        // Reduce timeout.
        self.transport.set_timeout(Duration::from_millis(500))?;

        self.data.write().connected = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.stop_polling();
        self.data.write().connected = false;
        self.transport.close()?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.data.read().connected
    }

    fn set_pin_mode(&mut self, pin: u8, mode: PinModeId) -> Result<(), Error> {
        {
            let mut lock = self.data.write();
            let pin_instance = lock.get_pin_mut(pin)?;
            let _mode =
                pin_instance
                    .supports_mode(mode)
                    .ok_or(HardwareError::IncompatibleMode {
                        pin,
                        mode,
                        context: "try to set pin mode",
                    })?;
            pin_instance.mode = _mode;
        }

        self.transport.write(&[SET_PIN_MODE, pin, mode as u8])
    }

    fn digital_write(&mut self, pin: u8, level: bool) -> Result<(), Error> {
        let port = pin / 8;
        let mut value: u16 = 0;
        let mut i = 0;

        {
            let mut lock = self.data.write();

            let pin_instance = lock.get_pin_mut(pin)?;
            pin_instance.validate_current_mode(PinModeId::OUTPUT)?;

            // Store the value we will write to the current pin.
            pin_instance.value = u16::from(level);

            // Loop through all 8 pins of the current "port" to concatenate their value.
            // For instance 01100000 will set to 1 the pin 1 and 2 of current port.
            while i < 8 {
                if lock.get_pin_mut(8 * port + i)?.value != 0 {
                    value |= 1 << i
                }
                i += 1;
            }
        }

        self.transport.write(&[
            DIGITAL_MESSAGE | port,
            value as u8 & SYSEX_REALTIME,
            (value >> 7) as u8 & SYSEX_REALTIME,
        ])
    }

    fn analog_write(&mut self, pin: u8, level: u16) -> Result<(), Error> {
        self.data.write().get_pin_mut(pin)?.value = level;

        let payload = if pin > 15 {
            // Extended analog message
            let mut payload = vec![
                START_SYSEX,
                EXTENDED_ANALOG,
                pin,
                level as u8 & SYSEX_REALTIME,
                (level >> 7) as u8 & SYSEX_REALTIME,
            ];
            if level > 0x00004000 {
                payload.push((level >> 14) as u8 & SYSEX_REALTIME);
            }
            payload.push(END_SYSEX);
            payload
        } else {
            // Standard analog message
            vec![
                ANALOG_MESSAGE | pin,
                level as u8 & SYSEX_REALTIME,
                (level >> 7) as u8 & SYSEX_REALTIME,
            ]
        };

        self.transport.write(&payload)
    }

    fn report_analog(&mut self, channel: u8, state: bool) -> Result<(), Error> {
        self.transport
            .write(&[REPORT_ANALOG | channel, u8::from(state)])?;
        match state {
            true => {
                self.data.write().analog_reported_channels.push(channel);
                self.start_polling();
            }
            false => {
                let mut lock = self.data.write();
                if let Some(pos) = lock
                    .analog_reported_channels
                    .iter()
                    .position(|&chan| chan == channel)
                {
                    lock.analog_reported_channels.remove(pos);
                    if lock.analog_reported_channels.is_empty()
                        && lock.digital_reported_pins.is_empty()
                    {
                        self.stop_polling();
                    }
                }
            }
        };
        Ok(())
    }

    fn report_digital(&mut self, pin: u8, state: bool) -> Result<(), Error> {
        let port = pin / 8;
        self.transport
            .write(&[REPORT_DIGITAL | port, u8::from(state)])?;
        match state {
            true => {
                self.data.write().digital_reported_pins.push(pin);
                self.start_polling();
            }
            false => {
                let mut lock = self.data.write();
                if let Some(pos) = lock.digital_reported_pins.iter().position(|&id| id == pin) {
                    lock.digital_reported_pins.remove(pos);
                    if lock.digital_reported_pins.is_empty()
                        && lock.analog_reported_channels.is_empty()
                    {
                        self.stop_polling();
                    }
                }
            }
        };
        Ok(())
    }

    fn sampling_interval(&mut self, interval: u16) -> Result<(), Error> {
        self.transport.write(&[
            START_SYSEX,
            SAMPLING_INTERVAL,
            interval as u8 & SYSEX_REALTIME,
            (interval >> 7) as u8 & SYSEX_REALTIME,
            END_SYSEX,
        ])
    }

    fn send_sysex(&mut self, command: u8, payload: &[u8]) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(payload.len() + 3);
        buf.push(START_SYSEX);
        buf.push(command & SYSEX_REALTIME);
        for &byte in payload {
            buf.push(byte & SYSEX_REALTIME);
        }
        buf.push(END_SYSEX);
        self.transport.write(&buf)
    }
}

impl FirmataIo {
    /// Sends a software reset request.
    /// <https://github.com/firmata/protocol/blob/master/protocol.md>
    fn software_reset(&mut self) -> Result<(), Error> {
        self.transport.write(&[SYSTEM_RESET])
    }

    /// Starts a conversation with the board: validates the firmware version and
    /// discovers the pin layout.
    fn handshake(&mut self) -> Result<(), Error> {
        // Forces a software reset: some boards do not restart automatically when the connexion
        // is opened. Running two different programs in a raw may otherwise leave unexpected
        // settings leftover, for instance report_analog / report_digital on some pins.
        self.software_reset()?;

        // The Firmata protocol is supposed to send the protocol and firmware version
        // automatically, but it doesn't always do so. The while-loop here ensures that we
        // are in sync with receiving the expected data, which prevents an initial
        // 'read_and_decode()' call resulting in a long timeout.
        self.query_firmware()?;
        while self.read_and_decode()? != Message::ReportFirmwareVersion {}

        self.query_capabilities()?;
        while self.read_and_decode()? != Message::CapabilityResponse {}
        self.query_analog_mapping()?;
        while self.read_and_decode()? != Message::AnalogMappingResponse {}

        Ok(())
    }

    /// Query the board for current firmware and protocol information.
    fn query_firmware(&mut self) -> Result<(), Error> {
        self.transport
            .write(&[START_SYSEX, REPORT_FIRMWARE, END_SYSEX])
    }

    /// Query the board for all available capabilities.
    fn query_capabilities(&mut self) -> Result<(), Error> {
        self.transport
            .write(&[START_SYSEX, CAPABILITY_QUERY, END_SYSEX])
    }

    /// Query the board for available analog pins.
    fn query_analog_mapping(&mut self) -> Result<(), Error> {
        self.transport
            .write(&[START_SYSEX, ANALOG_MAPPING_QUERY, END_SYSEX])
    }

    // ########################################
    // Firmata read & handle functions

    /// Read from the protocol, parse and return its type.
    /// The following method uses the Firmata protocol such as defined here:
    /// <https://github.com/firmata/protocol/blob/master/protocol.md>
    fn read_and_decode(&mut self) -> Result<Message, Error> {
        let mut buf = vec![0; 3];
        self.transport.read_exact(&mut buf)?;

        match buf[0] {
            REPORT_PROTOCOL_VERSION => self.handle_protocol_version(&buf),
            ANALOG_MESSAGE..=ANALOG_MESSAGE_BOUND => self.handle_analog_message(&buf),
            DIGITAL_MESSAGE..=DIGITAL_MESSAGE_BOUND => self.handle_digital_message(&buf),
            START_SYSEX => self.handle_sysex_message(&mut buf),
            _ => Ok(Message::EmptyResponse),
        }
    }

    /// Handle a REPORT_VERSION_RESPONSE message (0xF9 - return the firmware version).
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#message-types>
    fn handle_protocol_version(&mut self, buf: &[u8]) -> Result<Message, Error> {
        let mut lock = self.get_io().write();
        lock.protocol_version = format!("{}.{}", buf[1], buf[2]);
        Ok(Message::ReportProtocolVersion)
    }

    /// Handle an ANALOG_MESSAGE message (0xE0 - report state of an analog pin)
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#data-message-expansion>
    fn handle_analog_message(&mut self, buf: &[u8]) -> Result<Message, Error> {
        let pin = (buf[0] & 0x0F) + 14;
        let value = (buf[1] as u16) | ((buf[2] as u16) << 7);
        self.get_io().write().get_pin_mut(pin)?.value = value;
        Ok(Message::Analog)
    }

    /// Handle a DIGITAL_MESSAGE message (0x90 - report state of a digital pin/port)
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#data-message-expansion>
    fn handle_digital_message(&mut self, buf: &[u8]) -> Result<Message, Error> {
        let port = buf[0] & 0x0F;
        let value = (buf[1] as u16) | ((buf[2] as u16) << 7);

        for i in 0..8 {
            let pin = (8 * port) + i;
            let mode: PinModeId = self.get_io().read().get_pin(pin)?.mode.id;
            if mode == PinModeId::INPUT || mode == PinModeId::PULLUP {
                self.get_io().write().get_pin_mut(pin)?.value = (value >> (i & 0x07)) & 0x01;
            }
        }
        Ok(Message::Digital)
    }

    /// Handle a START_SYSEX message: dispatch to various message/command/response using the sysex format.
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#sysex-message-format>
    fn handle_sysex_message(&mut self, buf: &mut Vec<u8>) -> Result<Message, Error> {
        if buf[1] == END_SYSEX || buf[2] == END_SYSEX {
            return Ok(Message::EmptyResponse);
        }

        loop {
            // Read until END_SYSEX.
            let mut byte = [0];
            self.transport.read_exact(&mut byte)?;
            buf.push(byte[0]);
            if byte[0] == END_SYSEX {
                break;
            }
        }
        match buf[1] {
            ANALOG_MAPPING_RESPONSE => self.handle_analog_mapping_response(buf),
            CAPABILITY_RESPONSE => self.handle_capability_response(buf),
            REPORT_FIRMWARE => self.handle_firmware_report(buf),
            _ => Ok(Message::EmptyResponse),
        }
    }

    /// Handle an ANALOG_MAPPING_RESPONSE message (0x6A - reply with analog pins mapping info).
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#analog-mapping-query>
    fn handle_analog_mapping_response(&mut self, buf: &[u8]) -> Result<Message, Error> {
        let mut lock = self.get_io().write();
        let mut i = 2;
        while buf[i] != END_SYSEX {
            if buf[i] != SYSEX_REALTIME {
                let pin = &mut lock.get_pin_mut((i - 2) as u8)?;
                pin.mode = pin.supports_mode(PinModeId::ANALOG).ok_or(
                    HardwareError::IncompatibleMode {
                        pin: (i - 2) as u8,
                        mode: PinModeId::ANALOG,
                        context: "handle_analog_mapping_response",
                    },
                )?;
                pin.name = format!("A{}", buf[i]);
                pin.channel = Some(buf[i]);
            }
            i += 1;
        }
        Ok(Message::AnalogMappingResponse)
    }

    /// Handle a CAPABILITY_RESPONSE message (0x6C - reply with supported modes and resolution)
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#capability-query>
    fn handle_capability_response(&mut self, buf: &[u8]) -> Result<Message, Error> {
        let mut id = 0;
        let mut i = 2;
        let mut lock = self.get_io().write();
        lock.pins = HashMap::new();

        while buf[i] != END_SYSEX {
            let mut supported_modes: Vec<PinMode> = vec![];

            while buf[i] != SYSEX_REALTIME {
                supported_modes.push(PinMode {
                    id: PinModeId::from_u8(buf[i])?,
                    resolution: buf[i + 1],
                });
                i += 2;
            }

            let mut pin = Pin {
                id,
                name: format!("D{}", id),
                supported_modes,
                ..Default::default()
            };
            if let Some(first) = pin.supported_modes.first() {
                pin.mode = *first;
            }
            lock.pins.insert(pin.id, pin);

            i += 1;
            id += 1;
        }

        Ok(Message::CapabilityResponse)
    }

    /// Handle a REPORT_FIRMWARE message (0x79 - report name and version of the firmware).
    /// <https://github.com/firmata/protocol/blob/master/protocol.md#query-firmware-name-and-version>
    fn handle_firmware_report(&mut self, buf: &[u8]) -> Result<Message, Error> {
        if buf.len() < 5 {
            return Err(Error::from(ProtocolError::MessageTooShort {
                operation: "handle_firmware_report",
                expected: 5,
                received: buf.len(),
            }));
        }
        let major = buf[2];
        let minor = buf[3];
        let mut lock = self.get_io().write();
        lock.firmware_version = format!("{}.{}", major, minor);
        if buf.len() > 5 {
            lock.firmware_name = std::str::from_utf8(&buf[4..buf.len() - 1])?
                .to_string()
                .replace('\0', "");
        }
        Ok(Message::ReportFirmwareVersion)
    }

    /// Attaches the board value change listener. This is done automatically when the first
    /// pin reporting is activated.
    pub fn start_polling(&self) {
        if self.handler.read().is_none() {
            let mut self_clone = self.clone();
            let task = task::run(async move {
                // Infinite loop to listen for inputs from the board.
                loop {
                    let _ = self_clone.read_and_decode();
                    pause!(1);
                }

                #[allow(unreachable_code)]
                Ok(())
            });
            match task {
                Ok(handler) => *self.handler.write() = Some(handler),
                Err(err) => warn!("Board polling could not start: {}", err),
            }
        }
    }

    /// Detaches the board value change listener: reported values are no longer read.
    pub fn stop_polling(&self) {
        if let Some(handler) = self.handler.read().as_ref() {
            handler.abort();
        }
        *self.handler.write() = None;
    }
}

impl Display for FirmataIo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        write!(
            f,
            "{} [firmware={}, version={}, protocol={}, transport={}]",
            self.get_name(),
            data.firmware_name,
            data.firmware_version,
            data.protocol_version,
            self.transport
        )
    }
}
