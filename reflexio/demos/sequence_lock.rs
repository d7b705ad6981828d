use reflexio::engine::rules::SequenceLock;
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// A three-button combination lock.
///
/// Buttons 7, 6, 5 enter symbols 1, 2, 3. The right order (1, 3, 2) lights
/// every LED for two seconds; a wrong order blinks them twice. Either way the
/// next attempt starts from scratch.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    let rules = SequenceLock::new(vec![7, 6, 5], vec![13, 12, 11], vec![1, 3, 2]);

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
