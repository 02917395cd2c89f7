//! Pacing Adapters
//!
//! - **TokioPacer** - real delays on the tokio timer
//! - **RecordingPacer** - returns at once and remembers what was asked (tests)

mod recording_pacer;
mod tokio_pacer;

pub use recording_pacer::RecordingPacer;
pub use tokio_pacer::TokioPacer;
