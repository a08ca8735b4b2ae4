//! One consistency check, end to end.
//!
//! [`AnalysisService`] turns a set of uploads into an [`AnalysisReport`]:
//! every image is normalized and reduced to a palette, the vision model is
//! asked for its assessment, and [`aggregate`] merges the two.

pub mod aggregate;
pub mod report;
pub mod service;

pub use aggregate::{average_similarity, color_only, fuse};
pub use report::{AnalysisReport, AnalysisType, ColorAnalysis, ConsistencyResult};
pub use service::{AnalysisOutcome, AnalysisService};
