//! Error types for chain-sync payload decoding.
//!
//! Every failure is a local, recoverable decode-time error. Each variant
//! carries `at`, the location of the offending value: a field path such as
//! `block.alonzo.body[0].witness.datums` for the CBOR and attribute codecs,
//! or `line L column C` for JSON input.

use std::fmt;

use thiserror::Error;

/// Errors produced while decoding (and, for identifiers, parsing) payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed point at {}: {detail}", display_at(.at))]
    MalformedPoint { at: String, detail: String },

    #[error("malformed number at {}: {detail}", display_at(.at))]
    MalformedNumber { at: String, detail: String },

    #[error("range error at {}: {detail}", display_at(.at))]
    RangeError { at: String, detail: String },

    #[error("malformed tx id at {}: {detail}", display_at(.at))]
    MalformedTxId { at: String, detail: String },

    #[error("unknown field `{detail}` at {}", display_at(.at))]
    UnknownField { at: String, detail: String },

    #[error("missing field `{detail}` at {}", display_at(.at))]
    MissingField { at: String, detail: String },

    #[error("unexpected type at {}: {detail}", display_at(.at))]
    UnexpectedType { at: String, detail: String },

    #[error("malformed hex at {}: {detail}", display_at(.at))]
    MalformedHex { at: String, detail: String },

    #[error("malformed base64 at {}: {detail}", display_at(.at))]
    MalformedBase64 { at: String, detail: String },

    #[error("format mismatch: {detail}")]
    FormatMismatch { at: String, detail: String },

    #[error("syntax error at {}: {detail}", display_at(.at))]
    Syntax { at: String, detail: String },
}

/// Discriminant of a [`CodecError`], convenient for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedPoint,
    MalformedNumber,
    RangeError,
    MalformedTxId,
    UnknownField,
    MissingField,
    UnexpectedType,
    MalformedHex,
    MalformedBase64,
    FormatMismatch,
    Syntax,
}

impl ErrorKind {
    const ALL: [ErrorKind; 11] = [
        ErrorKind::MalformedPoint,
        ErrorKind::MalformedNumber,
        ErrorKind::RangeError,
        ErrorKind::MalformedTxId,
        ErrorKind::UnknownField,
        ErrorKind::MissingField,
        ErrorKind::UnexpectedType,
        ErrorKind::MalformedHex,
        ErrorKind::MalformedBase64,
        ErrorKind::FormatMismatch,
        ErrorKind::Syntax,
    ];

    /// Stable tag for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedPoint => "malformed-point",
            ErrorKind::MalformedNumber => "malformed-number",
            ErrorKind::RangeError => "range-error",
            ErrorKind::MalformedTxId => "malformed-txid",
            ErrorKind::UnknownField => "unknown-field",
            ErrorKind::MissingField => "missing-field",
            ErrorKind::UnexpectedType => "unexpected-type",
            ErrorKind::MalformedHex => "malformed-hex",
            ErrorKind::MalformedBase64 => "malformed-base64",
            ErrorKind::FormatMismatch => "format-mismatch",
            ErrorKind::Syntax => "syntax",
        }
    }

    /// Inverse of [`ErrorKind::as_str`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CodecError {
    /// Build an error of the given kind at the root location.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        let at = String::new();
        let detail = detail.into();
        match kind {
            ErrorKind::MalformedPoint => CodecError::MalformedPoint { at, detail },
            ErrorKind::MalformedNumber => CodecError::MalformedNumber { at, detail },
            ErrorKind::RangeError => CodecError::RangeError { at, detail },
            ErrorKind::MalformedTxId => CodecError::MalformedTxId { at, detail },
            ErrorKind::UnknownField => CodecError::UnknownField { at, detail },
            ErrorKind::MissingField => CodecError::MissingField { at, detail },
            ErrorKind::UnexpectedType => CodecError::UnexpectedType { at, detail },
            ErrorKind::MalformedHex => CodecError::MalformedHex { at, detail },
            ErrorKind::MalformedBase64 => CodecError::MalformedBase64 { at, detail },
            ErrorKind::FormatMismatch => CodecError::FormatMismatch { at, detail },
            ErrorKind::Syntax => CodecError::Syntax { at, detail },
        }
    }

    pub fn malformed_point(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPoint, detail)
    }

    pub fn malformed_number(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedNumber, detail)
    }

    pub fn range(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, detail)
    }

    pub fn malformed_txid(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedTxId, detail)
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownField, field)
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField, field)
    }

    pub fn unexpected_type(expected: &str) -> Self {
        Self::new(ErrorKind::UnexpectedType, format!("expected {expected}"))
    }

    pub fn malformed_hex(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedHex, detail)
    }

    pub fn malformed_base64(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedBase64, detail)
    }

    pub fn format_mismatch(expected: &str, found: &str) -> Self {
        Self::new(
            ErrorKind::FormatMismatch,
            format!("expected {expected} input, found {found}"),
        )
    }

    pub fn syntax(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, detail)
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::MalformedPoint { .. } => ErrorKind::MalformedPoint,
            CodecError::MalformedNumber { .. } => ErrorKind::MalformedNumber,
            CodecError::RangeError { .. } => ErrorKind::RangeError,
            CodecError::MalformedTxId { .. } => ErrorKind::MalformedTxId,
            CodecError::UnknownField { .. } => ErrorKind::UnknownField,
            CodecError::MissingField { .. } => ErrorKind::MissingField,
            CodecError::UnexpectedType { .. } => ErrorKind::UnexpectedType,
            CodecError::MalformedHex { .. } => ErrorKind::MalformedHex,
            CodecError::MalformedBase64 { .. } => ErrorKind::MalformedBase64,
            CodecError::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            CodecError::Syntax { .. } => ErrorKind::Syntax,
        }
    }

    fn parts_mut(&mut self) -> (&mut String, &mut String) {
        match self {
            CodecError::MalformedPoint { at, detail }
            | CodecError::MalformedNumber { at, detail }
            | CodecError::RangeError { at, detail }
            | CodecError::MalformedTxId { at, detail }
            | CodecError::UnknownField { at, detail }
            | CodecError::MissingField { at, detail }
            | CodecError::UnexpectedType { at, detail }
            | CodecError::MalformedHex { at, detail }
            | CodecError::MalformedBase64 { at, detail }
            | CodecError::FormatMismatch { at, detail }
            | CodecError::Syntax { at, detail } => (at, detail),
        }
    }

    fn parts(&self) -> (&str, &str) {
        match self {
            CodecError::MalformedPoint { at, detail }
            | CodecError::MalformedNumber { at, detail }
            | CodecError::RangeError { at, detail }
            | CodecError::MalformedTxId { at, detail }
            | CodecError::UnknownField { at, detail }
            | CodecError::MissingField { at, detail }
            | CodecError::UnexpectedType { at, detail }
            | CodecError::MalformedHex { at, detail }
            | CodecError::MalformedBase64 { at, detail }
            | CodecError::FormatMismatch { at, detail }
            | CodecError::Syntax { at, detail } => (at, detail),
        }
    }

    /// Location of the offending value (empty for the root).
    pub fn location(&self) -> &str {
        self.parts().0
    }

    /// Human-readable detail: the offending token, field name, or reason.
    pub fn detail(&self) -> &str {
        self.parts().1
    }

    /// Prefix the location with a field name.
    pub fn at(mut self, field: &str) -> Self {
        let (at, _) = self.parts_mut();
        *at = if at.is_empty() {
            field.to_string()
        } else if at.starts_with('[') {
            format!("{field}{at}")
        } else {
            format!("{field}.{at}")
        };
        self
    }

    /// Prefix the location with a sequence index.
    pub fn at_index(self, index: usize) -> Self {
        self.at(&format!("[{index}]"))
    }

    /// Replace the location outright (used for line/column positions).
    pub fn located(mut self, location: impl Into<String>) -> Self {
        *self.parts_mut().0 = location.into();
        self
    }
}

fn display_at(at: &str) -> &str {
    if at.is_empty() {
        "<root>"
    } else {
        at
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
