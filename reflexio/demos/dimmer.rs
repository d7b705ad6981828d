use reflexio::engine::rules::HeldDimmer;
use reflexio::engine::Session;
use reflexio::hardware::Board;

/// A manual dimmer: one button brightens, one dims, one switches off.
///
/// A press steps the brightness by 10%; holding a button keeps stepping until
/// release. The LED starts at half brightness.
#[reflexio::runtime]
async fn main() {
    env_logger::init();

    let board = Board::default();

    // Increase on pin 6, decrease on pin 7, off on pin 5, PWM LED on pin 11.
    let rules = HeldDimmer::new(6, 7, 5, 11);

    if let Err(err) = Session::new(rules, board).run().await {
        eprintln!("Session failed: {}", err);
    }
}
