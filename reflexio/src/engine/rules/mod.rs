//! Reaction rules: pure mappings from events to state transitions and actions.
//!
//! A [`Ruleset`] declares its pins, its initial state and a transition
//! function. It never touches the board: the [`Session`](crate::engine::Session)
//! feeds it events and hands the returned actions to the
//! [`Actuator`](crate::engine::Actuator). This keeps every rule deterministic
//! and testable without hardware.

mod cyclic;
mod dimmer;
mod exclusive;
mod follow;
mod sequence;
mod toggle;

pub use cyclic::CyclicAdvance;
pub use dimmer::HeldDimmer;
pub use exclusive::ExclusiveSelect;
pub use follow::{LevelCurve, LevelFollow};
pub use sequence::SequenceLock;
pub use toggle::IndependentToggle;

use std::time::Duration;

use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, InputKind};

/// An input pin a ruleset listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input {
    pub pin: u8,
    pub kind: InputKind,
}

/// An output pin a ruleset drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Output {
    pub pin: u8,
    pub kind: OutputKind,
}

/// A deterministic event-to-action mapping with bounded state.
///
/// `react` takes the previous state by reference and returns the next state
/// plus the actions to apply, in order. It must not block and must not write
/// outputs itself.
pub trait Ruleset: Send + 'static {
    type State: Clone + Send + 'static;

    /// The pins this ruleset listens to.
    fn inputs(&self) -> Vec<Input>;

    /// The pins this ruleset drives. These are de-asserted on shutdown.
    fn outputs(&self) -> Vec<Output>;

    fn initial_state(&self) -> Self::State;

    /// Actions rendering the initial state, applied once before any event.
    fn initial_actions(&self, _state: &Self::State) -> Vec<Action> {
        vec![]
    }

    /// Maps one event to the next state and the actions it triggers.
    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>);

    /// Periodic transition for rules that act while time passes.
    fn tick(&self, state: &Self::State) -> (Self::State, Vec<Action>) {
        (state.clone(), vec![])
    }

    /// How long until the next [`Ruleset::tick`], or `None` when idle.
    fn tick_interval(&self, _state: &Self::State) -> Option<Duration> {
        None
    }
}
