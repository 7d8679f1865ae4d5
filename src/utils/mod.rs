pub mod cancel;
pub mod progress;

pub use cancel::CancellationToken;
pub use progress::{ProgressObserver, ProgressUpdate};
