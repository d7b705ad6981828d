use std::time::Duration;

use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, EventKind, InputKind};
use crate::engine::rules::{Input, Output, Ruleset};
use crate::engine::state::ScalarLevel;

/// How often a held button repeats its step.
const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, PartialEq)]
pub struct DimmerState {
    level: ScalarLevel,
    increasing: bool,
    decreasing: bool,
}

/// A PWM output driven up and down by two buttons, with a kill button.
///
/// A press steps the level once; keeping the button down repeats the step at a
/// fixed rate until release. Steps saturate at the range bounds. The kill
/// button forces the level to zero without touching the held flags.
#[derive(Clone, Debug)]
pub struct HeldDimmer {
    increase: u8,
    decrease: u8,
    kill: u8,
    output: u8,
    step: f64,
    initial: f64,
}

impl HeldDimmer {
    pub fn new(increase: u8, decrease: u8, kill: u8, output: u8) -> Self {
        Self {
            increase,
            decrease,
            kill,
            output,
            step: 0.1,
            initial: 0.5,
        }
    }

    fn render(&self, level: ScalarLevel) -> Vec<Action> {
        vec![Action::Pwm {
            pin: self.output,
            level: level.value(),
        }]
    }
}

impl Ruleset for HeldDimmer {
    type State = DimmerState;

    fn inputs(&self) -> Vec<Input> {
        vec![
            Input {
                pin: self.increase,
                kind: InputKind::Hold,
            },
            Input {
                pin: self.decrease,
                kind: InputKind::Hold,
            },
            Input {
                pin: self.kill,
                kind: InputKind::Button,
            },
        ]
    }

    fn outputs(&self) -> Vec<Output> {
        vec![Output {
            pin: self.output,
            kind: OutputKind::Pwm,
        }]
    }

    fn initial_state(&self) -> Self::State {
        DimmerState {
            level: ScalarLevel::new(self.initial),
            increasing: false,
            decreasing: false,
        }
    }

    fn initial_actions(&self, state: &Self::State) -> Vec<Action> {
        self.render(state.level)
    }

    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>) {
        let mut next = state.clone();
        let pressed = match event.kind {
            EventKind::Edge(pressed) => pressed,
            EventKind::Level(_) => return (next, vec![]),
        };

        if event.pin == self.increase {
            next.increasing = pressed;
            if pressed {
                next.level = next.level.offset(self.step);
            }
        } else if event.pin == self.decrease {
            next.decreasing = pressed;
            if pressed {
                next.level = next.level.offset(-self.step);
            }
        } else if event.pin == self.kill && pressed {
            next.level = ScalarLevel::new(0.0);
        } else {
            return (next, vec![]);
        }

        // Releases only clear a flag: nothing to repaint.
        if pressed {
            let actions = self.render(next.level);
            (next, actions)
        } else {
            (next, vec![])
        }
    }

    fn tick(&self, state: &Self::State) -> (Self::State, Vec<Action>) {
        if !state.increasing && !state.decreasing {
            return (state.clone(), vec![]);
        }
        let mut next = state.clone();
        if next.increasing {
            next.level = next.level.offset(self.step);
        }
        if next.decreasing {
            next.level = next.level.offset(-self.step);
        }
        let actions = self.render(next.level);
        (next, actions)
    }

    fn tick_interval(&self, state: &Self::State) -> Option<Duration> {
        (state.increasing || state.decreasing).then_some(REPEAT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(pin: u8, pressed: bool) -> Event {
        Event {
            pin,
            kind: EventKind::Edge(pressed),
        }
    }

    fn rules() -> HeldDimmer {
        HeldDimmer::new(6, 7, 5, 11)
    }

    #[test]
    fn test_initial_level_is_half_brightness() {
        let rules = rules();
        let state = rules.initial_state();
        assert_eq!(state.level.value(), 0.5);
        assert_eq!(
            rules.initial_actions(&state),
            vec![Action::Pwm {
                pin: 11,
                level: 0.5,
            }]
        );
        assert_eq!(rules.tick_interval(&state), None);
    }

    #[test]
    fn test_presses_step_and_saturate() {
        let rules = rules();
        let mut state = rules.initial_state();
        // Three steps up and one down from 0.5.
        for (pin, pressed) in [(6, true), (6, false), (6, true), (6, false), (6, true)] {
            state = rules.react(&state, &edge(pin, pressed)).0;
        }
        let (state, actions) = rules.react(&state, &edge(7, true));
        assert!((state.level.value() - 0.7).abs() < 0.001);
        match actions.as_slice() {
            [Action::Pwm { pin: 11, level }] => assert!((level - 0.7).abs() < 0.001),
            other => panic!("unexpected actions: {:?}", other),
        }
    }

    #[test]
    fn test_steps_saturate_at_full_brightness() {
        let rules = rules();
        let mut state = rules.initial_state();
        for _ in 0..8 {
            state = rules.react(&state, &edge(6, true)).0;
            state = rules.react(&state, &edge(6, false)).0;
        }
        assert_eq!(state.level.value(), 1.0);
        // Saturated: another press repaints full brightness, no overshoot.
        let (state, actions) = rules.react(&state, &edge(6, true));
        assert_eq!(state.level.value(), 1.0);
        assert_eq!(
            actions,
            vec![Action::Pwm {
                pin: 11,
                level: 1.0,
            }]
        );
    }

    #[test]
    fn test_holding_repeats_through_ticks() {
        let rules = rules();
        let (state, _) = rules.react(&rules.initial_state(), &edge(6, true));
        assert_eq!(rules.tick_interval(&state), Some(REPEAT_INTERVAL));

        let (state, actions) = rules.tick(&state);
        assert!((state.level.value() - 0.7).abs() < 0.001);
        assert_eq!(actions.len(), 1);

        // Released: ticks stop stepping.
        let (state, _) = rules.react(&state, &edge(6, false));
        assert_eq!(rules.tick_interval(&state), None);
        let (state, actions) = rules.tick(&state);
        assert!((state.level.value() - 0.7).abs() < 0.001);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_opposite_holds_cancel_out() {
        let rules = rules();
        let (state, _) = rules.react(&rules.initial_state(), &edge(6, true));
        let (state, _) = rules.react(&state, &edge(7, true));
        // Both held: one tick steps up and down, landing where it started.
        let before = state.level.value();
        let (state, actions) = rules.tick(&state);
        assert!((state.level.value() - before).abs() < 0.001);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_kill_forces_zero() {
        let rules = rules();
        let (state, actions) = rules.react(&rules.initial_state(), &edge(5, true));
        assert_eq!(state.level.value(), 0.0);
        assert_eq!(
            actions,
            vec![Action::Pwm {
                pin: 11,
                level: 0.0,
            }]
        );
    }
}
