use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, EventKind, InputKind};
use crate::engine::rules::{Input, Output, Ruleset};
use crate::engine::state::BoundedBuffer;

/// A combination lock: buttons enter symbols, a full buffer is checked against
/// the secret and cleared.
///
/// Entering the correct sequence lights every LED for two seconds; a wrong
/// sequence blinks them twice. Either way the attempt buffer is emptied, so
/// each attempt needs the full sequence again.
#[derive(Clone, Debug)]
pub struct SequenceLock {
    /// Button for symbol `i + 1`.
    buttons: Vec<u8>,
    leds: Vec<u8>,
    secret: Vec<u8>,
}

impl SequenceLock {
    pub fn new(buttons: Vec<u8>, leds: Vec<u8>, secret: Vec<u8>) -> Self {
        Self {
            buttons,
            leds,
            secret,
        }
    }

    fn all(&self, level: bool) -> impl Iterator<Item = Action> + '_ {
        self.leds.iter().map(move |led| Action::Digital {
            pin: *led,
            level,
        })
    }

    fn success_feedback(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.all(true).collect();
        actions.push(Action::Pause { ms: 2000 });
        actions.extend(self.all(false));
        actions
    }

    fn error_feedback(&self) -> Vec<Action> {
        let mut actions = vec![];
        for _ in 0..2 {
            actions.extend(self.all(true));
            actions.push(Action::Pause { ms: 200 });
            actions.extend(self.all(false));
            actions.push(Action::Pause { ms: 200 });
        }
        actions
    }
}

impl Ruleset for SequenceLock {
    type State = BoundedBuffer<u8>;

    fn inputs(&self) -> Vec<Input> {
        self.buttons
            .iter()
            .map(|button| Input {
                pin: *button,
                kind: InputKind::Button,
            })
            .collect()
    }

    fn outputs(&self) -> Vec<Output> {
        self.leds
            .iter()
            .map(|led| Output {
                pin: *led,
                kind: OutputKind::Digital,
            })
            .collect()
    }

    fn initial_state(&self) -> Self::State {
        BoundedBuffer::new(self.secret.len())
    }

    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>) {
        if event.kind != EventKind::Edge(true) {
            return (state.clone(), vec![]);
        }
        let symbol = match self.buttons.iter().position(|button| *button == event.pin) {
            Some(index) => (index + 1) as u8,
            None => return (state.clone(), vec![]),
        };

        let mut next = state.clone();
        next.push(symbol);
        if !next.is_full() {
            return (next, vec![]);
        }

        // A full buffer is always consumed, right or wrong.
        let actions = if next.matches(&self.secret) {
            self.success_feedback()
        } else {
            self.error_feedback()
        };
        next.clear();
        (next, actions)
    }
}
