//! Defines the IO layer used to exchange messages with a board.

mod data;
pub mod firmata;
mod protocol;
mod transports;

pub use data::*;
pub use firmata::*;
pub use protocol::*;
pub use transports::*;
