use std::fmt::Display;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::errors::Error;
use crate::errors::HardwareError::IncompatibleMode;
use crate::io::{IoData, IoProtocol, PinModeId};
use crate::mocks::create_test_io_data;

/// A single command received by the [`MockIoProtocol`], in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IoCommand {
    PinMode(u8, PinModeId),
    Digital(u8, bool),
    Analog(u8, u16),
    ReportAnalog(u8, bool),
    ReportDigital(u8, bool),
    SamplingInterval(u16),
    Sysex(u8, Vec<u8>),
    Close,
}

/// Mock implementation for [`IoProtocol`].
///
/// Every write-side call is recorded into an ordered `journal` shared across clones,
/// so tests can assert the exact command sequence sent to the board.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct MockIoProtocol {
    #[cfg_attr(feature = "serde", serde(skip, default = "new_test_data"))]
    data: Arc<RwLock<IoData>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub journal: Arc<Mutex<Vec<IoCommand>>>,
}

#[cfg(feature = "serde")]
fn new_test_data() -> Arc<RwLock<IoData>> {
    Arc::new(RwLock::new(create_test_io_data()))
}

impl Default for MockIoProtocol {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(create_test_io_data())),
            journal: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl MockIoProtocol {
    /// Returns a copy of all commands received so far.
    pub fn commands(&self) -> Vec<IoCommand> {
        self.journal.lock().clone()
    }

    /// Forgets all commands received so far.
    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }
}

impl Display for MockIoProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        write!(
            f,
            "{} [firmware={}, version={}, protocol={}]",
            self.get_name(),
            data.firmware_name,
            data.firmware_version,
            data.protocol_version,
        )
    }
}

#[cfg_attr(feature = "serde", typetag::serde)]
impl IoProtocol for MockIoProtocol {
    fn get_io(&self) -> &Arc<RwLock<IoData>> {
        &self.data
    }

    fn open(&mut self) -> Result<(), Error> {
        self.data.write().connected = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.journal.lock().push(IoCommand::Close);
        self.data.write().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.data.read().connected
    }

    fn set_pin_mode(&mut self, pin: u8, mode: PinModeId) -> Result<(), Error> {
        {
            let mut lock = self.data.write();
            let pin_instance = lock.get_pin_mut(pin)?;
            let _mode = pin_instance.supports_mode(mode).ok_or(IncompatibleMode {
                pin,
                mode,
                context: "try to set pin mode",
            })?;
            pin_instance.mode = _mode;
        }
        self.journal.lock().push(IoCommand::PinMode(pin, mode));
        Ok(())
    }

    fn digital_write(&mut self, pin: u8, level: bool) -> Result<(), Error> {
        {
            let mut lock = self.data.write();
            let pin_instance = lock.get_pin_mut(pin)?;
            pin_instance.validate_current_mode(PinModeId::OUTPUT)?;
            pin_instance.value = u16::from(level);
        }
        self.journal.lock().push(IoCommand::Digital(pin, level));
        Ok(())
    }

    fn analog_write(&mut self, pin: u8, level: u16) -> Result<(), Error> {
        self.data.write().get_pin_mut(pin)?.value = level;
        self.journal.lock().push(IoCommand::Analog(pin, level));
        Ok(())
    }

    fn report_analog(&mut self, channel: u8, state: bool) -> Result<(), Error> {
        self.journal
            .lock()
            .push(IoCommand::ReportAnalog(channel, state));
        Ok(())
    }

    fn report_digital(&mut self, pin: u8, state: bool) -> Result<(), Error> {
        self.journal
            .lock()
            .push(IoCommand::ReportDigital(pin, state));
        Ok(())
    }

    fn sampling_interval(&mut self, interval: u16) -> Result<(), Error> {
        self.journal
            .lock()
            .push(IoCommand::SamplingInterval(interval));
        Ok(())
    }

    fn send_sysex(&mut self, command: u8, payload: &[u8]) -> Result<(), Error> {
        self.journal
            .lock()
            .push(IoCommand::Sysex(command, payload.to_vec()));
        Ok(())
    }
}
