use crate::engine::actuator::{Action, OutputKind};
use crate::engine::edge::{Event, EventKind, InputKind};
use crate::engine::rules::{Input, Output, Ruleset};

/// How a sensor level maps to the output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LevelCurve {
    /// Digital output, on when the level is strictly above the cutoff.
    Threshold { cutoff: f64 },
    /// PWM output fading linearly from full brightness at `full_on` down to
    /// zero at `full_off`, saturating outside that band.
    Ramp { full_on: f64, full_off: f64 },
}

impl LevelCurve {
    fn apply(&self, level: f64, output: u8) -> Action {
        match *self {
            LevelCurve::Threshold { cutoff } => Action::Digital {
                pin: output,
                level: level > cutoff,
            },
            LevelCurve::Ramp { full_on, full_off } => {
                let value = if level <= full_on {
                    1.0
                } else if level >= full_off {
                    0.0
                } else {
                    1.0 - (level - full_on) / (full_off - full_on)
                };
                Action::Pwm { pin: output, level: value }
            }
        }
    }

    fn zero(&self, output: u8) -> Action {
        match self {
            LevelCurve::Threshold { .. } => Action::Digital {
                pin: output,
                level: false,
            },
            LevelCurve::Ramp { .. } => Action::Pwm {
                pin: output,
                level: 0.0,
            },
        }
    }
}

/// An output continuously following an analog sensor through a [`LevelCurve`].
///
/// An optional gate switch arms and disarms the whole rule: disarming forces
/// the output to zero and suppresses sensor updates until the next toggle. The
/// gate can carry an audible cue played on every toggle.
#[derive(Clone, Debug)]
pub struct LevelFollow {
    sensor: u8,
    output: u8,
    curve: LevelCurve,
    gate: Option<u8>,
    cue: Option<(u8, u16, u16)>,
}

impl LevelFollow {
    pub fn new(sensor: u8, output: u8, curve: LevelCurve) -> Self {
        Self {
            sensor,
            output,
            curve,
            gate: None,
            cue: None,
        }
    }

    /// Arms the rule behind a toggle switch. The rule starts disarmed.
    pub fn with_gate(mut self, switch: u8) -> Self {
        self.gate = Some(switch);
        self
    }

    /// Plays a note on `buzzer` every time the gate is toggled.
    pub fn with_cue(mut self, buzzer: u8, frequency: u16, duration_ms: u16) -> Self {
        self.cue = Some((buzzer, frequency, duration_ms));
        self
    }
}

impl Ruleset for LevelFollow {
    /// Whether sensor updates are currently applied.
    type State = bool;

    fn inputs(&self) -> Vec<Input> {
        let mut inputs = vec![Input {
            pin: self.sensor,
            kind: InputKind::Analog,
        }];
        if let Some(switch) = self.gate {
            inputs.push(Input {
                pin: switch,
                kind: InputKind::Switch,
            });
        }
        inputs
    }

    fn outputs(&self) -> Vec<Output> {
        let kind = match self.curve {
            LevelCurve::Threshold { .. } => OutputKind::Digital,
            LevelCurve::Ramp { .. } => OutputKind::Pwm,
        };
        let mut outputs = vec![Output {
            pin: self.output,
            kind,
        }];
        if let Some((buzzer, _, _)) = self.cue {
            outputs.push(Output {
                pin: buzzer,
                kind: OutputKind::Digital,
            });
        }
        outputs
    }

    fn initial_state(&self) -> Self::State {
        self.gate.is_none()
    }

    fn react(&self, state: &Self::State, event: &Event) -> (Self::State, Vec<Action>) {
        match event.kind {
            EventKind::Edge(true) if Some(event.pin) == self.gate => {
                let enabled = !*state;
                let mut actions = vec![];
                if let Some((buzzer, frequency, duration_ms)) = self.cue {
                    actions.push(Action::Tone {
                        pin: buzzer,
                        frequency,
                        duration_ms,
                    });
                }
                if !enabled {
                    actions.push(self.curve.zero(self.output));
                }
                (enabled, actions)
            }
            EventKind::Level(level) if event.pin == self.sensor && *state => {
                (*state, vec![self.curve.apply(level, self.output)])
            }
            _ => (*state, vec![]),
        }
    }
}
