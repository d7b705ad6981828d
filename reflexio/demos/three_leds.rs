use reflexio::engine::rules::IndependentToggle;
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// Three buttons, three LEDs: each button toggles its own LED and nothing else.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    // (button, led) pairs.
    let rules = IndependentToggle::new(vec![(7, 13), (6, 12), (5, 11)]);

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
