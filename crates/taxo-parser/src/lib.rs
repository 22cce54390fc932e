//! Taxo Parser - Reading the externally produced input tables
//!
//! Supports parsing of:
//! - Term tables (`term \t score \t count`)
//! - Role tables (`term \t role`)
//! - Feature-vector tables (`document \t id \t year \t term \t feature=value...`)
//!
//! All tables are UTF-8, tab separated, one record per line, optionally
//! gzip-compressed. A malformed line fails the whole file; the engine assumes
//! well-formed input and does not attempt partial-line recovery.

pub mod feature;
pub mod tables;

pub use feature::{FeatureVector, SentenceLocation};
pub use tables::{
    parse_feature_table, parse_role_table, parse_term_table, read_feature_table,
    read_role_table, read_term_table, RoleRecord, TermRecord,
};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while reading input tables
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line does not have the expected layout
    #[error("Malformed line {line} in {path}: {reason}")]
    MalformedLine {
        path: String,
        line: usize,
        #[source]
        reason: RecordError,
    },
}

impl ParserError {
    pub(crate) fn malformed(path: &str, line: usize, reason: RecordError) -> Self {
        Self::MalformedLine {
            path: path.to_string(),
            line,
            reason,
        }
    }
}

/// Why a single record line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected at least {minimum} fields, found {found}")]
    TooFewFields { minimum: usize, found: usize },

    #[error("invalid {field} '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("empty document field with no preceding header")]
    MissingDocument,

    #[error("empty term field")]
    EmptyTerm,

    #[error("feature without '=': '{0}'")]
    BareFeature(String),
}

impl RecordError {
    pub(crate) fn invalid(field: &str, value: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<ParserError> for taxo_core::TaxoError {
    fn from(err: ParserError) -> Self {
        taxo_core::TaxoError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
