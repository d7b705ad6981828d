use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, EventKind, InputKind};
use crate::engine::rules::{Input, Output, Ruleset};

/// One button per LED, each press flipping its own LED and nothing else.
#[derive(Clone, Debug)]
pub struct IndependentToggle {
    /// `(button, led)` pairs.
    pairs: Vec<(u8, u8)>,
}

impl IndependentToggle {
    pub fn new(pairs: Vec<(u8, u8)>) -> Self {
        Self { pairs }
    }
}

impl Ruleset for IndependentToggle {
    type State = Vec<bool>;

    fn inputs(&self) -> Vec<Input> {
        self.pairs
            .iter()
            .map(|(button, _)| Input {
                pin: *button,
                kind: InputKind::Button,
            })
            .collect()
    }

    fn outputs(&self) -> Vec<Output> {
        self.pairs
            .iter()
            .map(|(_, led)| Output {
                pin: *led,
                kind: OutputKind::Digital,
            })
            .collect()
    }

    fn initial_state(&self) -> Self::State {
        vec![false; self.pairs.len()]
    }

    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>) {
        if event.kind != EventKind::Edge(true) {
            return (state.clone(), vec![]);
        }
        let position = self.pairs.iter().position(|(button, _)| *button == event.pin);
        match position {
            Some(index) => {
                let mut next = state.clone();
                next[index] = !next[index];
                // Only the flipped LED is written.
                let actions = vec![Action::Digital {
                    pin: self.pairs[index].1,
                    level: next[index],
                }];
                (next, actions)
            }
            None => (state.clone(), vec![]),
        }
    }
}
