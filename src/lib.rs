#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod gateway;
pub mod media;
pub mod palette;
pub mod vision;

pub use analysis::{AnalysisOutcome, AnalysisReport, AnalysisService};
pub use config::Config;
pub use error::{CheckerError, Result};
