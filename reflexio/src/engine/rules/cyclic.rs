use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, EventKind, InputKind};
use crate::engine::rules::{Input, Output, Ruleset};

/// A single button stepping one lit LED through a ring of N.
///
/// Each render switches every LED off first, then lights the current one, so
/// no transient frame ever shows two LEDs lit.
#[derive(Clone, Debug)]
pub struct CyclicAdvance {
    button: u8,
    leds: Vec<u8>,
}

impl CyclicAdvance {
    pub fn new(button: u8, leds: Vec<u8>) -> Self {
        Self { button, leds }
    }

    fn render(&self, index: usize) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .leds
            .iter()
            .map(|led| Action::Digital {
                pin: *led,
                level: false,
            })
            .collect();
        actions.push(Action::Digital {
            pin: self.leds[index],
            level: true,
        });
        actions
    }
}

impl Ruleset for CyclicAdvance {
    type State = usize;

    fn inputs(&self) -> Vec<Input> {
        vec![Input {
            pin: self.button,
            kind: InputKind::Button,
        }]
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
        0
    }

    fn initial_actions(&self, state: &Self::State) -> Vec<Action> {
        self.render(*state)
    }

    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>) {
        if event.pin != self.button || event.kind != EventKind::Edge(true) {
            return (*state, vec![]);
        }
        let next = (*state + 1) % self.leds.len();
        (next, self.render(next))
    }
}
