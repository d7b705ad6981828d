//! Runs a ruleset against a board for the life of the program.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Notify;

use crate::engine::actuator::{Actuator, OutputKind};
use crate::engine::edge::{EdgeDetector, InputKind};
use crate::engine::rules::Ruleset;
use crate::engine::state::StateStore;
use crate::errors::Error;
use crate::errors::HardwareError::IncompatibleMode;
use crate::errors::SessionError::{ConnectionFailure, RuntimeFault};
use crate::hardware::Board;
use crate::io::{IoProtocol, PinModeId};
use crate::pause;
use crate::utils::task;

/// How often the pin table is sampled for changes, in milliseconds.
const WATCH_INTERVAL: u64 = 10;
/// Board-side sampling interval, in milliseconds.
const SAMPLING_INTERVAL: u16 = 100;

/// Owns the board and drives one [`Ruleset`] until stopped.
///
/// The session is the lifecycle guard: whatever way [`Session::run`] exits,
/// interruption, a programmatic halt or a board fault, every declared output
/// is de-asserted (best-effort) and the connection closed before it returns.
pub struct Session<R: Ruleset> {
    ruleset: R,
    board: Board,
    halt: Arc<Notify>,
}

impl<R: Ruleset> Session<R> {
    pub fn new(ruleset: R, board: Board) -> Self {
        Self {
            ruleset,
            board,
            halt: Arc::new(Notify::new()),
        }
    }

    /// Returns a handle that stops the session when notified.
    pub fn halt_handle(&self) -> Arc<Notify> {
        self.halt.clone()
    }

    /// Connects the board and reacts to its events until the process is
    /// interrupted, the halt handle is notified or the board faults.
    ///
    /// Outputs are de-asserted and the connection closed on all exit paths;
    /// when the board is already unreachable the de-assert pass is skipped.
    pub async fn run(self) -> Result<(), Error> {
        let Self {
            ruleset,
            board,
            halt,
        } = self;

        let board = board.open().map_err(|err| {
            Error::from(ConnectionFailure {
                info: err.to_string(),
            })
        })?;
        info!("Session started on {}", board);

        let outputs = ruleset
            .outputs()
            .iter()
            .map(|output| (output.pin, output.kind))
            .collect();
        let mut actuator = Actuator::new(board.get_protocol(), outputs);

        let result = Self::serve(&ruleset, &board, &mut actuator, halt).await;

        // All exit paths converge here.
        actuator.shutdown();
        if let Err(err) = board.close() {
            warn!("Board could not be closed cleanly: {}", err);
        }
        info!("Session ended");
        result
    }

    async fn serve(
        ruleset: &R,
        board: &Board,
        actuator: &mut Actuator,
        halt: Arc<Notify>,
    ) -> Result<(), Error> {
        Self::configure_pins(ruleset, board)?;

        let store = StateStore::new(ruleset.initial_state());
        actuator.apply(ruleset.initial_actions(&store.get())).await;

        let mut detector =
            EdgeDetector::new(ruleset.inputs().iter().map(|input| (input.pin, input.kind)));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let watched: Vec<u8> = ruleset.inputs().iter().map(|input| input.pin).collect();
        let watcher = task::run(Self::watch(board.get_protocol(), watched, tx))?;

        let result = loop {
            let interval = ruleset.tick_interval(&store.get());
            tokio::select! {
                sample = rx.recv() => match sample {
                    Some((pin, raw, max)) => {
                        if let Some(event) = detector.feed(pin, raw, max) {
                            debug!("Event: {:?}", event);
                            let (next, actions) = ruleset.react(&store.get(), &event);
                            store.set(next);
                            actuator.apply(actions).await;
                        }
                    }
                    None => break Err(Error::from(RuntimeFault {
                        info: String::from("connection to the board was lost"),
                    })),
                },
                _ = Self::tick_after(interval) => {
                    let (next, actions) = ruleset.tick(&store.get());
                    store.set(next);
                    actuator.apply(actions).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Session interrupted");
                    break Ok(());
                }
                _ = halt.notified() => {
                    info!("Session halted");
                    break Ok(());
                }
            }
        };

        watcher.abort();
        result
    }

    /// Puts every declared pin in the mode its role requires and turns the
    /// board-side reporting on.
    fn configure_pins(ruleset: &R, board: &Board) -> Result<(), Error> {
        let mut protocol = board.get_protocol();
        for input in ruleset.inputs() {
            match input.kind {
                InputKind::Button | InputKind::Hold => {
                    protocol.set_pin_mode(input.pin, PinModeId::INPUT)?;
                    protocol.report_digital(input.pin, true)?;
                }
                InputKind::Switch => {
                    protocol.set_pin_mode(input.pin, PinModeId::PULLUP)?;
                    protocol.report_digital(input.pin, true)?;
                }
                InputKind::Analog => {
                    protocol.set_pin_mode(input.pin, PinModeId::ANALOG)?;
                    let channel = board.get_io().get_pin(input.pin)?.channel;
                    match channel {
                        Some(channel) => protocol.report_analog(channel, true)?,
                        None => {
                            return Err(Error::from(IncompatibleMode {
                                pin: input.pin,
                                mode: PinModeId::ANALOG,
                                context: "pin has no analog channel",
                            }))
                        }
                    }
                }
            }
        }
        for output in ruleset.outputs() {
            let mode = match output.kind {
                OutputKind::Digital => PinModeId::OUTPUT,
                OutputKind::Pwm => PinModeId::PWM,
            };
            protocol.set_pin_mode(output.pin, mode)?;
        }
        protocol.sampling_interval(SAMPLING_INTERVAL)?;
        Ok(())
    }

    /// Forwards every watched pin change as a `(pin, raw, max)` sample.
    ///
    /// The first pass only snapshots the current values, so levels already
    /// present at startup never replay as events. Ends when the connection
    /// drops, which closes the channel and faults the session.
    async fn watch(
        protocol: Box<dyn IoProtocol>,
        pins: Vec<u8>,
        tx: UnboundedSender<(u8, u16, u16)>,
    ) {
        let mut snapshot: HashMap<u8, u16> = HashMap::new();
        {
            let data = protocol.get_io().read();
            for pin in &pins {
                if let Ok(current) = data.get_pin(*pin) {
                    snapshot.insert(*pin, current.value);
                }
            }
        }

        while protocol.is_connected() {
            {
                let data = protocol.get_io().read();
                for pin in &pins {
                    if let Ok(current) = data.get_pin(*pin) {
                        if snapshot.get(pin) != Some(&current.value) {
                            snapshot.insert(*pin, current.value);
                            let sample = (*pin, current.value, current.get_max_possible_value());
                            if tx.send(sample).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
            pause!(WATCH_INTERVAL);
        }
    }

    async fn tick_after(interval: Option<Duration>) {
        match interval {
            Some(duration) => crate::utils::sleep(duration).await,
            None => std::future::pending().await,
        }
    }
}
