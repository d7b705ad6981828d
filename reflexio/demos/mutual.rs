use reflexio::engine::rules::ExclusiveSelect;
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// Two buttons, two LEDs, exactly one LED lit at any time.
///
/// Pressing a button selects its mode; pressing the button of the already
/// active mode does nothing.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    // (button, led) pairs; mode 0 (led 13) is active at startup.
    let rules = ExclusiveSelect::new(vec![(7, 13), (6, 12)], 0);

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
