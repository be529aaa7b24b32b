//! Decoder error types.
//!
//! Every [`DecodeError`] is recovered at the smallest enclosing scope: a failed
//! strategy falls through to the next one, a failed normalizer drops a single
//! message. Callers of [`crate::FrameDecoder::decode`] never see them.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Data errors raised while decoding a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended in the middle of a field.
    #[error("truncated input at offset {offset}")]
    Truncated { offset: usize },

    /// A varint ran past the 64-bit ceiling (more than 10 groups).
    #[error("varint at offset {offset} exceeds 64 bits")]
    Overlong { offset: usize },

    /// A field key carried a wire type this decoder cannot skip.
    #[error("unknown wire type {wire_type} at offset {offset}")]
    UnknownWireType { wire_type: u8, offset: usize },

    /// A gzip stream could not be inflated.
    #[error("inflate failed: {0}")]
    InflateFailed(String),

    /// The bytes do not fit the schema that was attempted.
    #[error("schema mismatch for {schema}: {reason}")]
    SchemaMismatch {
        schema: &'static str,
        reason: String,
    },

    /// A kind-specific required field is missing or zero.
    #[error("{kind}: required field `{field}` missing")]
    RequiredFieldMissing {
        kind: &'static str,
        field: &'static str,
    },
}

impl DecodeError {
    pub(crate) fn mismatch(schema: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            schema,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(kind: &'static str, field: &'static str) -> Self {
        Self::RequiredFieldMissing { kind, field }
    }

    /// Short label used in log fields and statistics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "truncated",
            Self::Overlong { .. } => "overlong",
            Self::UnknownWireType { .. } => "unknown_wire_type",
            Self::InflateFailed(_) => "inflate_failed",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::RequiredFieldMissing { .. } => "required_field_missing",
        }
    }
}

/// Errors at the async service boundary.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The event receiver was dropped while the service was still running.
    #[error("event channel closed")]
    ChannelClosed,

    /// A blocking decode task panicked or was cancelled by the runtime.
    #[error("decode worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
