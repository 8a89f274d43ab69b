pub mod logging;
pub mod progress;

pub use progress::Progress;
