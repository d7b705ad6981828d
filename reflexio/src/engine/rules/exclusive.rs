use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, EventKind, InputKind};
use crate::engine::rules::{Input, Output, Ruleset};

/// One button per mode, exactly one LED lit at any time.
///
/// Pressing the button of the already-active mode is a no-op: no state change
/// and no writes, so the board is never asked to repaint an unchanged picture.
#[derive(Clone, Debug)]
pub struct ExclusiveSelect {
    /// `(button, led)` pairs, one per selectable mode.
    choices: Vec<(u8, u8)>,
    initial: usize,
}

impl ExclusiveSelect {
    pub fn new(choices: Vec<(u8, u8)>, initial: usize) -> Self {
        Self { choices, initial }
    }

    /// Renders the full output picture for a selected mode.
    fn render(&self, selected: usize) -> Vec<Action> {
        self.choices
            .iter()
            .enumerate()
            .map(|(index, (_, led))| Action::Digital {
                pin: *led,
                level: index == selected,
            })
            .collect()
    }
}

impl Ruleset for ExclusiveSelect {
    type State = usize;

    fn inputs(&self) -> Vec<Input> {
        self.choices
            .iter()
            .map(|(button, _)| Input {
                pin: *button,
                kind: InputKind::Button,
            })
            .collect()
    }

    fn outputs(&self) -> Vec<Output> {
        self.choices
            .iter()
            .map(|(_, led)| Output {
                pin: *led,
                kind: OutputKind::Digital,
            })
            .collect()
    }

    fn initial_state(&self) -> Self::State {
        self.initial
    }

    fn initial_actions(&self, state: &Self::State) -> Vec<Action> {
        self.render(*state)
    }

    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>) {
        if event.kind != EventKind::Edge(true) {
            return (*state, vec![]);
        }
        match self.choices.iter().position(|(button, _)| *button == event.pin) {
            Some(selected) if selected != *state => (selected, self.render(selected)),
            _ => (*state, vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(pin: u8) -> Event {
        Event {
            pin,
            kind: EventKind::Edge(true),
        }
    }

    fn rules() -> ExclusiveSelect {
        ExclusiveSelect::new(vec![(7, 13), (6, 12)], 0)
    }

    #[test]
    fn test_initial_render_lights_the_initial_mode() {
        let rules = rules();
        let state = rules.initial_state();
        assert_eq!(
            rules.initial_actions(&state),
            vec![
                Action::Digital {
                    pin: 13,
                    level: true,
                },
                Action::Digital {
                    pin: 12,
                    level: false,
                },
            ]
        );
    }

    #[test]
    fn test_selecting_the_other_mode_repaints_all_leds() {
        let rules = rules();
        let (state, actions) = rules.react(&rules.initial_state(), &press(6));
        assert_eq!(state, 1);
        assert_eq!(
            actions,
            vec![
                Action::Digital {
                    pin: 13,
                    level: false,
                },
                Action::Digital {
                    pin: 12,
                    level: true,
                },
            ]
        );
    }

    #[test]
    fn test_repressing_the_active_mode_is_a_noop() {
        let rules = rules();
        let (state, actions) = rules.react(&rules.initial_state(), &press(7));
        assert_eq!(state, 0);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_exactly_one_led_is_lit_after_any_sequence() {
        let rules = rules();
        let mut state = rules.initial_state();
        for pin in [6, 6, 7, 6, 7, 7] {
            let (next, actions) = rules.react(&state, &press(pin));
            state = next;
            let lit = actions
                .iter()
                .filter(|action| matches!(action, Action::Digital { level: true, .. }))
                .count();
            assert!(actions.is_empty() || lit == 1);
        }
        assert_eq!(state, 1);
    }

    #[test]
    fn test_unknown_buttons_are_ignored() {
        let rules = rules();
        let (state, actions) = rules.react(&rules.initial_state(), &press(3));
        assert_eq!(state, 0);
        assert!(actions.is_empty());
    }
}
