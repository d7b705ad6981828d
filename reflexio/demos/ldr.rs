use reflexio::engine::rules::{LevelCurve, LevelFollow};
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// A light sensor on A0 switching the embedded LED: dark enough, LED on.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    // LDR on pin 14 (A0), LED on pin 13, cutoff at 60% of the sensor range.
    let rules = LevelFollow::new(14, 13, LevelCurve::Threshold { cutoff: 0.6 });

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
