use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("No requests were recorded; success criteria cannot be evaluated.")]
    NoData,
}
