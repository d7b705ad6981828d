//! Defines the physical board a reaction session drives.

mod board;

pub use board::Board;
