#![doc(html_root_url = "https://docs.rs/reflexio/0.1.0")]

//! <h1 align="center">REFLEXIO - Event-driven pin reactions for Arduino boards</h1>
//! <div style="text-align:center;font-style:italic;">Reflexio turns a board wired over Firmata into a small, deterministic reaction machine - written in Rust.</div>
//! <br/>
//!
//! # Documentation
//!
//! This is the API documentation.<br/>
//! To see the code in action, visit the [demos](https://github.com/dclause/reflexio/tree/develop/reflexio/demos) directory.
//!
//! # Features
//!
//! **Reflexio** is a Rust library that "remotely" drives an Arduino (or compatible) board as one
//! event-driven reaction loop: inputs (buttons, switches, analog sensors) produce events, a
//! [`Ruleset`](engine::Ruleset) maps them to output actions (LEDs, PWM, tones), and a
//! [`Session`](engine::Session) guarantees every output is de-asserted when the program ends,
//! however it ends.
//!
//! - Connect to a [`Board`](hardware::Board) through an [`IoProtocol`](io::IoProtocol)
//!   connection ([`Serial`](io::Serial) for the moment)
//! - Describe the behavior with a ready-made [`Ruleset`](engine::Ruleset): independent toggles,
//!   exclusive selection, cyclic advance, sensor-following outputs, a held-button dimmer or a
//!   sequence lock
//! - Run it under a [`Session`](engine::Session): debounced edge detection, ordered output
//!   rendering and safe shutdown come built-in
//!
//! # Prerequisites
//!
//! - To run the demos provided, you will need at least an Arduino board attached via the serial
//!   port of your computer (or the machine running your code).<br/>
//! - [StandardFirmataPlus.ino](https://github.com/firmata/arduino/blob/main/examples/StandardFirmataPlus/StandardFirmataPlus.ino) Arduino sketch **MUST** be installed on the board.
//!   _This code is available by default in Arduino IDE under the Firmata samples sketch menu._
//!   _Uploading the sketch to the board needs to be done once only._
//!
//! # Getting Started
//!
//! - Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! reflexio = "0.1.0"
//! ```
//!
//! The following code demonstrates the simplest program we could imagine: one button on pin 7
//! toggling the Arduino embedded led on pin 13.
//! ```no_run
//! use reflexio::engine::rules::IndependentToggle;
//! use reflexio::engine::Session;
//! use reflexio::hardware::Board;
//!
//! #[reflexio::runtime]
//! async fn main() {
//!     // Board of type arduino + auto-detected serial port by default.
//!     let board = Board::default();
//!
//!     // Button on pin 7, LED on pin 13, each press flips the LED.
//!     let rules = IndependentToggle::new(vec![(7, 13)]);
//!
//!     if let Err(err) = Session::new(rules, board).run().await {
//!         eprintln!("Session failed: {}", err);
//!     }
//! }
//! ```
//!
//! # Feature flags
//!
//! - **libudev** -- (enabled by default) Activates `serialport` crate _libudev_ feature under-the-hood (required on Linux only for port listing).
//! - **serde** -- Enables serialize/deserialize capabilities for most entities.
//! - **mocks** -- Provides mocked entities of all kinds (useful for tests mostly).

#[cfg(test)]
extern crate self as reflexio;

pub mod engine;
pub mod errors;
pub mod hardware;
pub mod io;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod utils;

pub use reflexio_macros::runtime;
