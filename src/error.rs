//! Pipeline error taxonomy.
//!
//! The tracking core itself is pure computation and never fails; errors
//! originate at the collaborator boundaries (models, frame source,
//! frame encoding) and terminate the current stream session.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// The object detector raised or returned a malformed result.
    #[error("detector failure: {0}")]
    Detector(#[source] BoxError),

    /// The pose estimator raised or returned a malformed result.
    #[error("pose estimator failure: {0}")]
    Pose(#[source] BoxError),

    /// The action classifier raised or returned a malformed result.
    #[error("action classifier failure: {0}")]
    Classifier(#[source] BoxError),

    /// The frame source failed to produce a frame.
    #[error("frame source failure: {0}")]
    Source(#[source] BoxError),

    /// Re-encoding a processed frame failed; fatal for the stream session.
    #[error("frame encoding failed: {0}")]
    Encode(#[source] BoxError),

    /// Writing an encoded chunk to the output stream failed.
    #[error("stream write failed")]
    Stream(#[from] std::io::Error),
}

impl Error {
    pub fn detector(err: impl Into<BoxError>) -> Self {
        Self::Detector(err.into())
    }

    pub fn pose(err: impl Into<BoxError>) -> Self {
        Self::Pose(err.into())
    }

    pub fn classifier(err: impl Into<BoxError>) -> Self {
        Self::Classifier(err.into())
    }

    pub fn source(err: impl Into<BoxError>) -> Self {
        Self::Source(err.into())
    }

    pub fn encode(err: impl Into<BoxError>) -> Self {
        Self::Encode(err.into())
    }
}
