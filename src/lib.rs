pub mod diff;
pub mod sheet;
pub mod state;
pub mod utils;
pub mod verification;

pub use diff::{diff, weighted_length, DiffSpan, Side};
pub use sheet::{ColumnLayout, Row, RowStatus, RowStore};
pub use state::{RunCounts, RunReport, RunState};
pub use utils::{AppConfig, Result, VerifierError};
pub use verification::{
    CancelHandle, CorrectionClient, CorrectionRequest, CorrectionResponse, HttpCorrectionClient,
    ProgressEvent, ProgressKind, ProgressReceiver, VerificationPipeline,
};
