use crate::derivation_path::ChildIndex;
use thiserror::Error;

/// Error types for HD key derivation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid derivation path at segment {segment_index}: {reason}")]
    Parse {
        segment_index: usize,
        reason: PathParseReason,
    },

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Scalar is zero or not below the curve order")]
    ScalarOutOfRange,

    #[error("Invalid seed length: {0} bytes")]
    InvalidSeedLength(usize),

    #[error("Child key derivation failed at index {0}")]
    DerivationFailure(ChildIndex),

    #[error("Child index {0} does not fit in 31 bits")]
    ChildIndexOutOfRange(u32),

    #[error("Derivation path has no segments")]
    EmptyDerivationPath,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Hardened derivation requires private key")]
    HardenedDerivationRequiresPrivateKey,
}

/// Why a derivation path string was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathParseReason {
    #[error("path is empty")]
    Empty,

    #[error("path must start with 'm'")]
    MissingRoot,

    #[error("segment is empty")]
    EmptySegment,

    #[error("segment {0:?} is not a number")]
    NotNumeric(String),

    #[error("index {0} does not fit in 31 bits")]
    IndexOutOfRange(String),
}
