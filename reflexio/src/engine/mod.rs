//! The input-to-output reaction engine.
//!
//! Data flows one way: raw pin samples enter the [`EdgeDetector`], come out as
//! discrete [`Event`]s, get mapped by a [`Ruleset`] into a new state plus an
//! ordered list of [`Action`]s, which the [`Actuator`] applies to the board.
//! A [`Session`] wires these together, owns the board for its whole life and
//! guarantees the safe-shutdown sequence on every exit path.

pub mod actuator;
pub mod edge;
pub mod rules;
pub mod session;
pub mod state;

pub use actuator::{Action, Actuator, OutputKind};
pub use edge::{EdgeDetector, Event, EventKind, InputKind};
pub use rules::{Input, Output, Ruleset};
pub use session::Session;
pub use state::{BoundedBuffer, ScalarLevel, StateStore};
