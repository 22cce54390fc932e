//! Tab-separated input tables
//!
//! Each `parse_*` function reads from any `BufRead` and takes a label used in
//! error messages; the `read_*` functions open a file and delegate. Files
//! starting with the gzip magic bytes are decompressed on the fly.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use taxo_core::FeatureConfig;
use tracing::debug;

use crate::{FeatureVector, ParserError, RecordError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ============================================================================
// Records
// ============================================================================

/// One row of the term table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub score: f32,
    pub count: u32,
}

impl TermRecord {
    fn parse(line: &str) -> std::result::Result<Self, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(RecordError::FieldCount {
                expected: 3,
                found: fields.len(),
            });
        }
        let score = fields[1]
            .trim()
            .parse::<f32>()
            .map_err(|_| RecordError::invalid("score", fields[1]))?;
        let count = fields[2]
            .trim()
            .parse::<u32>()
            .map_err(|_| RecordError::invalid("count", fields[2]))?;

        Ok(Self {
            term: fields[0].to_string(),
            score,
            count,
        })
    }
}

/// One row of the role table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Term name, with the table's underscores turned back into spaces
    pub term: String,
    pub role: String,
}

impl RoleRecord {
    fn parse(line: &str) -> std::result::Result<Self, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            return Err(RecordError::FieldCount {
                expected: 2,
                found: fields.len(),
            });
        }
        Ok(Self {
            term: fields[0].replace('_', " "),
            role: fields[1].trim().to_string(),
        })
    }
}

// ============================================================================
// Readers
// ============================================================================

/// Open a table, transparently decompressing gzip content
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let io_error = |e| ParserError::IoError {
        path: path.display().to_string(),
        source: e,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    if reader.fill_buf().map_err(io_error)?.starts_with(&GZIP_MAGIC) {
        debug!("Reading {} as gzip", path.display());
        return Ok(Box::new(BufReader::new(GzDecoder::new(reader))));
    }
    Ok(Box::new(reader))
}

/// Iterate over non-blank lines with their 1-based line numbers
fn lines<'a, R: BufRead + 'a>(
    reader: R,
    label: &'a str,
) -> impl Iterator<Item = Result<(usize, String)>> + 'a {
    reader
        .lines()
        .enumerate()
        .map(move |(i, line)| {
            line.map(|l| (i + 1, l.trim_end_matches('\r').to_string()))
                .map_err(|e| ParserError::IoError {
                    path: label.to_string(),
                    source: e,
                })
        })
        .filter(|item| !matches!(item, Ok((_, l)) if l.trim().is_empty()))
}

/// Parse a term table
pub fn parse_term_table<R: BufRead>(reader: R, label: &str) -> Result<Vec<TermRecord>> {
    let mut records = Vec::new();
    for item in lines(reader, label) {
        let (number, line) = item?;
        let record =
            TermRecord::parse(&line).map_err(|r| ParserError::malformed(label, number, r))?;
        records.push(record);
    }
    debug!("Parsed {} term records from {}", records.len(), label);
    Ok(records)
}

/// Parse a role table
pub fn parse_role_table<R: BufRead>(reader: R, label: &str) -> Result<Vec<RoleRecord>> {
    let mut records = Vec::new();
    for item in lines(reader, label) {
        let (number, line) = item?;
        let record =
            RoleRecord::parse(&line).map_err(|r| ParserError::malformed(label, number, r))?;
        records.push(record);
    }
    debug!("Parsed {} role records from {}", records.len(), label);
    Ok(records)
}

/// Parse a feature-vector table.
///
/// A line holding a single non-empty field is a document header; following
/// lines with an empty document field belong to that document.
pub fn parse_feature_table<R: BufRead>(
    reader: R,
    label: &str,
    config: &FeatureConfig,
) -> Result<Vec<FeatureVector>> {
    let mut vectors = Vec::new();
    let mut current_document: Option<String> = None;

    for item in lines(reader, label) {
        let (number, line) = item?;

        if !line.contains('\t') {
            current_document = Some(line.trim().to_string());
            continue;
        }

        let vector = FeatureVector::parse(&line, current_document.as_deref(), config)
            .map_err(|r| ParserError::malformed(label, number, r))?;
        current_document = Some(vector.document.clone());
        vectors.push(vector);
    }

    debug!("Parsed {} feature vectors from {}", vectors.len(), label);
    Ok(vectors)
}

pub fn read_term_table(path: impl AsRef<Path>) -> Result<Vec<TermRecord>> {
    let path = path.as_ref();
    parse_term_table(open(path)?, &path.display().to_string())
}

pub fn read_role_table(path: impl AsRef<Path>) -> Result<Vec<RoleRecord>> {
    let path = path.as_ref();
    parse_role_table(open(path)?, &path.display().to_string())
}

pub fn read_feature_table(
    path: impl AsRef<Path>,
    config: &FeatureConfig,
) -> Result<Vec<FeatureVector>> {
    let path = path.as_ref();
    parse_feature_table(open(path)?, &path.display().to_string(), config)
}
