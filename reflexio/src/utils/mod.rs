#[cfg(test)]
pub use serial_test;
pub use tokio;
pub use tokio::time::sleep;

pub mod scale;
pub mod task;
