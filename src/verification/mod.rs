pub mod client;
pub mod fingerprint;
pub mod pipeline;
pub mod progress;

pub use client::{CorrectionClient, CorrectionRequest, CorrectionResponse, HttpCorrectionClient};
pub use fingerprint::{process_fingerprint, sha256_hex};
pub use pipeline::{CancelHandle, VerificationPipeline};
pub use progress::{progress_channel, ProgressEvent, ProgressKind, ProgressReceiver, ProgressSender};
