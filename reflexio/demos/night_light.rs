use reflexio::engine::rules::{LevelCurve, LevelFollow};
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// A night light: the darker the room, the brighter the LED.
///
/// A switch arms and disarms the whole thing, with a short beep on every
/// toggle. Disarming forces the light off until the next toggle.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    // LDR on pin 14 (A0), PWM LED on pin 11: full brightness below 75% light,
    // fading down to zero at 95%.
    let rules = LevelFollow::new(
        14,
        11,
        LevelCurve::Ramp {
            full_on: 0.75,
            full_off: 0.95,
        },
    )
    // Gate switch on pin 7, C5 beep on the buzzer (pin 8) at every toggle.
    .with_gate(7)
    .with_cue(8, 523, 100);

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
