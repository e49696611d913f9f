use crate::package::InvalidDependency;
use thiserror::Error;

/// Fatal criteria errors.
///
/// Either of these aborts the whole filter operation before any record
/// is matched; the engine never produces partial output.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    InvalidDependency(#[from] InvalidDependency),
}
