use thiserror::Error;

use crate::core::data::elements::ElementTableError;

/// Hard failures of an alignment call.
///
/// Geometric disagreement is never an error; it is reported through the
/// [`Verdict`](super::result::Verdict) of the result.
#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("Cannot align {molecule} molecule: {source}")]
    Element {
        molecule: &'static str,
        #[source]
        source: ElementTableError,
    },
}
