use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use log::trace;
use parking_lot::RwLockReadGuard;

use crate::errors::Error;
use crate::io::{FirmataIo, IoData, IoProtocol, IoTransport, PinModeId};

/// Represents a physical board (Arduino most-likely) driven by a reaction
/// [`Session`](crate::engine::Session) through a communication [`IoProtocol`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Board {
    /// The inner protocol used by this Board.
    protocol: Box<dyn IoProtocol>,
}

impl Default for Board {
    /// Creates a board using the default [`FirmataIo`] protocol with
    /// [`Serial`](crate::io::Serial) transport layer: the port is auto-detected as the
    /// first available serial port.
    ///
    /// **_/!\ The board is NOT connected until the [`Board::open`] method is called._**
    fn default() -> Self {
        Self::new(FirmataIo::default())
    }
}

impl Board {
    /// Creates a board using a given protocol.
    ///
    /// # Example
    /// ```
    /// use reflexio::hardware::Board;
    /// use reflexio::io::FirmataIo;
    ///
    /// #[reflexio::runtime]
    /// async fn main() {
    ///     let board = Board::new(FirmataIo::new("/dev/ttyACM0"));
    /// }
    /// ```
    pub fn new<P: IoProtocol + 'static>(protocol: P) -> Self {
        Self {
            protocol: Box::new(protocol),
        }
    }

    /// Returns the protocol used.
    pub fn get_protocol(&self) -> Box<dyn IoProtocol> {
        self.protocol.clone()
    }

    /// Opens the board connexion: blocks until the handshake is done and the pin
    /// table is known.
    pub fn open(mut self) -> Result<Self, Error> {
        self.protocol.open()?;
        trace!("Board is ready: {:#?}", self.get_io());
        Ok(self)
    }

    /// Closes the board connexion gracefully.
    ///
    /// All pins are reverted to OUTPUT first, which stops any reporting leftover for
    /// the next program using the board.
    pub fn close(mut self) -> Result<Self, Error> {
        let pins: Vec<u8> = self.get_io().pins.keys().copied().collect();
        for id in pins {
            let _ = self.set_pin_mode(id, PinModeId::OUTPUT);
        }
        self.protocol.close()?;
        trace!("Board is closed");
        Ok(self)
    }

    /// Easy access to the pin table through the board.
    pub fn get_io(&self) -> RwLockReadGuard<IoData> {
        self.protocol.get_io().read()
    }
}

/// Creates a board using the given transport layer with the FirmataIo protocol.
///
/// # Example
/// ```
/// use reflexio::hardware::Board;
/// use reflexio::io::Serial;
///
/// #[reflexio::runtime]
/// async fn main() {
///     let board = Board::from(Serial::new("/dev/ttyUSB0"));
/// }
/// ```
impl<T: IoTransport> From<T> for Board {
    fn from(transport: T) -> Self {
        Self {
            protocol: Box::new(FirmataIo::from(transport)),
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board ({})", self.protocol)
    }
}

impl Deref for Board {
    type Target = Box<dyn IoProtocol>;

    fn deref(&self) -> &Self::Target {
        &self.protocol
    }
}

impl DerefMut for Board {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::FirmataIo;
    use crate::mocks::io_protocol::{IoCommand, MockIoProtocol};
    use crate::mocks::transport_layer::MockTransportLayer;

    #[test]
    fn test_board_creation() {
        let board = Board::new(MockIoProtocol::default());
        assert_eq!(
            board.protocol.get_name(),
            "MockIoProtocol",
            "Board can be created with a custom protocol"
        );

        let board = Board::from(MockTransportLayer::default());
        assert_eq!(
            board.protocol.get_name(),
            "FirmataIo",
            "Board can be created with a custom transport"
        );
    }

    #[test]
    fn test_board_open() {
        let mut transport = MockTransportLayer {
            read_index: 10,
            ..Default::default()
        };
        // Result for query firmware
        transport.read_buf[10..15].copy_from_slice(&[0xF0, 0x79, 0x01, 0x0C, 0xF7]);
        // Result for report capabilities
        transport.read_buf[15..26].copy_from_slice(&[
            0xF0, 0x6C, 0x00, 0x08, 0x7F, 0x00, 0x08, 0x01, 0x08, 0x7F, 0xF7,
        ]);
        // Result for analog mapping
        transport.read_buf[26..32].copy_from_slice(&[0xF0, 0x6A, 0x7F, 0x7F, 0x7F, 0xF7]);

        let protocol = FirmataIo::from(transport);
        let board = Board::new(protocol).open().unwrap();
        assert!(board.is_connected());
    }

    #[test]
    fn test_board_close() {
        let protocol = MockIoProtocol::default();
        let journal = protocol.journal.clone();

        let board = Board::new(protocol).open().unwrap();
        assert!(board.is_connected());

        let board = board.close().unwrap();
        assert!(!board.is_connected());

        // Pins have been reverted to OUTPUT, then the connexion closed.
        let commands = journal.lock().clone();
        assert_eq!(commands.last(), Some(&IoCommand::Close));
        assert!(commands
            .iter()
            .any(|command| *command == IoCommand::PinMode(13, crate::io::PinModeId::OUTPUT)));
    }

    #[test]
    fn test_board_get_io() {
        let board = Board::new(MockIoProtocol::default());
        assert_eq!(board.get_io().protocol_version, "fake.1.0");
    }

    #[test]
    fn test_board_display() {
        let board = Board::new(MockIoProtocol::default());
        assert_eq!(
            format!("{}", board),
            "Board (MockIoProtocol [firmware=Fake board, version=fake.2.3, protocol=fake.1.0])"
        );
    }

    #[test]
    fn test_board_deref() {
        let board = Board::new(MockIoProtocol::default());
        assert!(!board.get_protocol().is_connected());
        assert!(!board.is_connected());
    }
}

#[cfg(feature = "serde")]
#[cfg(test)]
mod serde_tests {
    use crate::hardware::Board;
    use crate::io::FirmataIo;

    #[test]
    fn test_board_serialize() {
        let board = Board::new(FirmataIo::new("mock"));
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(
            json,
            r#"{"protocol":{"type":"FirmataIo","transport":{"type":"Serial","port":"mock"}}}"#
        );
    }

    #[test]
    fn test_board_deserialize() {
        let json =
            r#"{"protocol":{"type":"FirmataIo","transport":{"type":"Serial","port":"mock"}}}"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.get_name(), "FirmataIo");
    }
}
