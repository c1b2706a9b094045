//! Error taxonomy shared across the validation layers.
//!
//! Parsers return [`ParseError`]; the orchestration layers collect
//! [`ValidationError`] records (code, message, severity) instead of
//! short-circuiting, so a caller always receives the full picture.

use {std::fmt, thiserror::Error};

/// Structural decoding failure. No panic crosses a parser boundary; every
/// malformed input maps to one of these variants.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input does not start with a plausible DER TLV.
    #[error("input is not DER encoded")]
    NotDer,

    /// The buffer ends before the declared length.
    #[error("truncated input: declared {declared} bytes, buffer holds {actual}")]
    Truncated { declared: usize, actual: usize },

    /// A tag other than the expected one was encountered.
    #[error("unexpected tag {0}")]
    UnexpectedTag(String),

    /// Structurally valid DER using a feature this engine does not decode.
    #[error("unsupported structure: {0}")]
    Unsupported(String),

    /// Any other decoder failure, with the decoder's own message.
    #[error("malformed DER: {0}")]
    Malformed(String),
}

impl From<der::Error> for ParseError {
    fn from(err: der::Error) -> Self {
        use der::ErrorKind;
        match err.kind() {
            ErrorKind::Incomplete {
                expected_len,
                actual_len,
            } => Self::Truncated {
                declared: usize::try_from(expected_len).unwrap_or(usize::MAX),
                actual:   usize::try_from(actual_len).unwrap_or(0),
            },
            ErrorKind::TagUnexpected { actual, .. } => Self::UnexpectedTag(actual.to_string()),
            ErrorKind::TagUnknown { byte } => Self::UnexpectedTag(format!("{byte:#04x}")),
            ErrorKind::OidUnknown { oid } => Self::Unsupported(oid.to_string()),
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// How the orchestration treats an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        })
    }
}

/// Machine-readable error codes surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    DscExtractionFailed,
    CscaNotFound,
    ChainValidationFailed,
    ChainCycleDetected,
    ChainMaxDepthExceeded,
    CertificateRevoked,
    CrlUnavailable,
    CrlExpired,
    SodSignatureInvalid,
    SodParseError,
    DgHashMismatch,
    DgHashMissing,
    AlgorithmDeprecated,
    UnknownCriticalExtension,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DscExtractionFailed => "DSC_EXTRACTION_FAILED",
            Self::CscaNotFound => "CSCA_NOT_FOUND",
            Self::ChainValidationFailed => "CHAIN_VALIDATION_FAILED",
            Self::ChainCycleDetected => "CHAIN_CYCLE_DETECTED",
            Self::ChainMaxDepthExceeded => "CHAIN_MAX_DEPTH_EXCEEDED",
            Self::CertificateRevoked => "CERTIFICATE_REVOKED",
            Self::CrlUnavailable => "CRL_UNAVAILABLE",
            Self::CrlExpired => "CRL_EXPIRED",
            Self::SodSignatureInvalid => "SOD_SIGNATURE_INVALID",
            Self::SodParseError => "SOD_PARSE_ERROR",
            Self::DgHashMismatch => "DG_HASH_MISMATCH",
            Self::DgHashMissing => "DG_HASH_MISSING",
            Self::AlgorithmDeprecated => "ALGORITHM_DEPRECATED",
            Self::UnknownCriticalExtension => "UNKNOWN_CRITICAL_EXTENSION",
        }
    }

    /// The severity the orchestration assigns when it records this code.
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::CrlUnavailable
            | Self::CrlExpired
            | Self::DgHashMissing
            | Self::AlgorithmDeprecated
            | Self::UnknownCriticalExtension => Severity::Warning,
            _ => Severity::Critical,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured error in a validation report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub code:     ErrorCode,
    pub message:  String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.default_severity(),
        }
    }

    pub fn critical(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Critical,
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, Severity::Critical)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}
