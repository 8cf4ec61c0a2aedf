pub mod run;

pub use run::{RunCounts, RunReport, RunState};
