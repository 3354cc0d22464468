use thiserror::Error;

/// Failures of the curve engine's arclength mapping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("trim start {start} lies after trim stop {stop} on a curve of length {length}")]
    InvalidTrim { start: f64, stop: f64, length: f64 },

    #[error(
        "no segment covers arclength {requested}: cumulative distances span \
         {covered_from}..{covered_to} over {segments} segments"
    )]
    NoSegmentForTrim {
        requested: f64,
        covered_from: f64,
        covered_to: f64,
        segments: usize,
    },

    #[error("cumulative distance table is empty")]
    EmptyDistanceTable,
}
