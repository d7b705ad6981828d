use reflexio::engine::rules::CyclicAdvance;
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// One button stepping a single lit LED through a ring of four.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    // Button on pin 7, LEDs on 13, 12, 11, 10; the first LED starts lit.
    let rules = CyclicAdvance::new(7, vec![13, 12, 11, 10]);

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
