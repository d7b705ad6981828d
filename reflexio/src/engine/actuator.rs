//! Applies ordered output actions to the board, best-effort.

use log::warn;

use crate::errors::Error;
use crate::io::firmata::constants::TONE_DATA;
use crate::io::IoProtocol;
use crate::pause;
use crate::utils::scale::Scalable;

/// One output change requested by a ruleset.
///
/// Actions produced by a single evaluation are applied in order, so feedback
/// patterns (all on, pause, all off) render as written.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Drive a digital output high or low.
    Digital { pin: u8, level: bool },
    /// Drive a PWM output at a duty cycle in `0.0..=1.0`.
    Pwm { pin: u8, level: f64 },
    /// Play a square wave on a buzzer pin, blocking further actions for the
    /// duration of the note.
    Tone {
        pin: u8,
        frequency: u16,
        duration_ms: u16,
    },
    /// Hold the current output picture for the given time.
    Pause { ms: u64 },
}

/// The only writer to the board's output pins during a session.
#[derive(Clone, Debug)]
pub struct Actuator {
    protocol: Box<dyn IoProtocol>,
    /// Digital and PWM pins to de-assert on shutdown.
    outputs: Vec<(u8, OutputKind)>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Digital,
    Pwm,
}

impl Actuator {
    pub fn new(protocol: Box<dyn IoProtocol>, outputs: Vec<(u8, OutputKind)>) -> Self {
        Self { protocol, outputs }
    }

    /// Applies a batch of actions in order.
    ///
    /// A failing write is logged and skipped: the remaining actions of the
    /// batch are still attempted so a single bad pin cannot wedge a feedback
    /// sequence halfway through.
    pub async fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            if let Err(err) = self.apply_one(&action).await {
                warn!("Action {:?} could not be applied: {}", action, err);
            }
        }
    }

    async fn apply_one(&mut self, action: &Action) -> Result<(), Error> {
        match *action {
            Action::Digital { pin, level } => self.protocol.digital_write(pin, level),
            Action::Pwm { pin, level } => {
                let max = self.protocol.get_io().read().get_pin(pin)?.get_max_possible_value();
                let value = level
                    .clamp(0.0, 1.0)
                    .scale(0.0, 1.0, 0.0, f64::from(max))
                    .round() as u16;
                self.protocol.analog_write(pin, value)
            }
            Action::Tone {
                pin,
                frequency,
                duration_ms,
            } => {
                self.protocol.send_sysex(
                    TONE_DATA,
                    &[
                        pin,
                        (frequency & 0x7F) as u8,
                        (frequency >> 7) as u8,
                        (duration_ms & 0x7F) as u8,
                        (duration_ms >> 7) as u8,
                    ],
                )?;
                // The firmware plays asynchronously: hold here so chained
                // actions start after the note ends.
                pause!(u64::from(duration_ms));
                Ok(())
            }
            Action::Pause { ms } => {
                pause!(ms);
                Ok(())
            }
        }
    }

    /// De-asserts every registered output: digital pins low, PWM pins at zero.
    ///
    /// Called on every session exit path. When the connection is already gone
    /// there is nothing left to write to, so the pass is skipped entirely;
    /// individual failures are logged and do not stop the remaining pins.
    pub fn shutdown(&mut self) {
        if !self.protocol.is_connected() {
            warn!("Board unreachable: outputs left as-is");
            return;
        }
        for (pin, kind) in self.outputs.clone() {
            let result = match kind {
                OutputKind::Digital => self.protocol.digital_write(pin, false),
                OutputKind::Pwm => self.protocol.analog_write(pin, 0),
            };
            if let Err(err) = result {
                warn!("Pin {} could not be de-asserted: {}", pin, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::io_protocol::{IoCommand, MockIoProtocol};

    fn actuator_with(outputs: Vec<(u8, OutputKind)>) -> (Actuator, MockIoProtocol) {
        let mut protocol = MockIoProtocol::default();
        protocol.open().unwrap();
        (Actuator::new(Box::new(protocol.clone()), outputs), protocol)
    }

    #[reflexio_macros::test]
    async fn test_actions_are_applied_in_order() {
        let (mut actuator, protocol) = actuator_with(vec![]);
        actuator
            .apply(vec![
                Action::Digital {
                    pin: 13,
                    level: true,
                },
                Action::Pwm { pin: 11, level: 0.5 },
                Action::Digital {
                    pin: 13,
                    level: false,
                },
            ])
            .await;
        assert_eq!(
            protocol.commands(),
            vec![
                IoCommand::Digital(13, true),
                // 50% of the 8bit PWM range.
                IoCommand::Analog(11, 128),
                IoCommand::Digital(13, false),
            ]
        );
    }

    #[reflexio_macros::test]
    async fn test_pwm_levels_are_clamped() {
        let (mut actuator, protocol) = actuator_with(vec![]);
        actuator
            .apply(vec![
                Action::Pwm { pin: 11, level: 1.8 },
                Action::Pwm {
                    pin: 11,
                    level: -0.3,
                },
            ])
            .await;
        assert_eq!(
            protocol.commands(),
            vec![IoCommand::Analog(11, 255), IoCommand::Analog(11, 0)]
        );
    }

    #[reflexio_macros::test]
    async fn test_tone_is_sent_as_sysex() {
        let (mut actuator, protocol) = actuator_with(vec![]);
        actuator
            .apply(vec![Action::Tone {
                pin: 8,
                frequency: 523,
                duration_ms: 100,
            }])
            .await;
        assert_eq!(
            protocol.commands(),
            vec![IoCommand::Sysex(TONE_DATA, vec![8, 0x0B, 0x04, 0x64, 0x00])]
        );
    }

    #[reflexio_macros::test]
    async fn test_failed_action_does_not_stop_the_batch() {
        let (mut actuator, protocol) = actuator_with(vec![]);
        actuator
            .apply(vec![
                // Pin 99 does not exist on the mock board.
                Action::Digital {
                    pin: 99,
                    level: true,
                },
                Action::Digital {
                    pin: 12,
                    level: true,
                },
            ])
            .await;
        assert_eq!(protocol.commands(), vec![IoCommand::Digital(12, true)]);
    }

    #[test]
    fn test_shutdown_deasserts_all_outputs() {
        let (mut actuator, protocol) =
            actuator_with(vec![(13, OutputKind::Digital), (11, OutputKind::Pwm)]);
        actuator.shutdown();
        assert_eq!(
            protocol.commands(),
            vec![IoCommand::Digital(13, false), IoCommand::Analog(11, 0)]
        );
    }

    #[test]
    fn test_shutdown_skips_unreachable_board() {
        let mut protocol = MockIoProtocol::default();
        let mut actuator =
            Actuator::new(Box::new(protocol.clone()), vec![(13, OutputKind::Digital)]);
        actuator.shutdown();
        assert_eq!(protocol.commands(), vec![]);
        let _ = protocol.close();
    }

    #[test]
    fn test_shutdown_survives_a_bad_pin() {
        let (mut actuator, protocol) =
            actuator_with(vec![(99, OutputKind::Digital), (13, OutputKind::Digital)]);
        actuator.shutdown();
        assert_eq!(protocol.commands(), vec![IoCommand::Digital(13, false)]);
    }

    #[reflexio_macros::test]
    async fn test_outputs_must_be_in_a_writable_mode() {
        let (mut actuator, protocol) = actuator_with(vec![]);
        // Pin 5 is an input on the mock board: the write is rejected.
        let result = actuator
            .apply_one(&Action::Digital {
                pin: 5,
                level: true,
            })
            .await;
        assert!(result.is_err());
        assert_eq!(protocol.commands(), vec![]);
    }
}
