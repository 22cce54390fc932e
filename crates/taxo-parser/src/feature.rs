//! Feature vectors
//!
//! One vector per term occurrence: where the term occurred and a keyed bag of
//! context features around it. Vectors are immutable once parsed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use taxo_core::FeatureConfig;

use crate::RecordError;

/// Token span of a term inside its sentence, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceLocation {
    pub start: usize,
    pub end: usize,
}

impl SentenceLocation {
    /// Parse a `start-end` value
    pub fn parse(value: &str) -> Option<Self> {
        let (start, end) = value.split_once('-')?;
        Some(Self {
            start: start.trim().parse().ok()?,
            end: end.trim().parse().ok()?,
        })
    }

    /// Number of token positions between the end of `self` and the start of
    /// `later`; negative when the spans overlap or are out of order
    pub fn gap_to(&self, later: &SentenceLocation) -> i64 {
        later.start as i64 - self.end as i64
    }
}

/// Context record of a single term occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Source document
    pub document: String,

    /// Occurrence identifier within the document
    pub occurrence_id: String,

    /// Publication year
    pub year: i32,

    /// Term surface form
    pub term: String,

    /// Context features (`name -> value`)
    pub features: HashMap<String, String>,

    /// Parsed sentence location, if the vector has one
    pub sentence_location: Option<SentenceLocation>,
}

impl FeatureVector {
    /// Parse one feature-table line.
    ///
    /// `fallback_document` is used when the document field is empty. Callers
    /// attach the file and line number to the returned error.
    pub fn parse(
        line: &str,
        fallback_document: Option<&str>,
        config: &FeatureConfig,
    ) -> std::result::Result<Self, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            return Err(RecordError::TooFewFields {
                minimum: 4,
                found: fields.len(),
            });
        }

        let document = match (fields[0], fallback_document) {
            ("", Some(doc)) => doc.to_string(),
            ("", None) => return Err(RecordError::MissingDocument),
            (doc, _) => doc.to_string(),
        };

        let year = fields[2]
            .trim()
            .parse::<i32>()
            .map_err(|_| RecordError::invalid("year", fields[2]))?;

        let term = fields[3].to_string();
        if term.is_empty() {
            return Err(RecordError::EmptyTerm);
        }

        let mut features = HashMap::new();
        for field in &fields[4..] {
            if field.is_empty() {
                continue;
            }
            let (name, value) = field
                .split_once('=')
                .ok_or_else(|| RecordError::BareFeature(field.to_string()))?;
            features.insert(name.to_string(), value.to_string());
        }

        let sentence_location = match features.get(&config.sentence_location) {
            Some(value) => Some(
                SentenceLocation::parse(value)
                    .ok_or_else(|| RecordError::invalid(&config.sentence_location, value))?,
            ),
            None => None,
        };

        Ok(Self {
            document,
            occurrence_id: fields[1].to_string(),
            year,
            term,
            features,
            sentence_location,
        })
    }

    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }

    /// Tokens preceding the term, boundary fillers included
    pub fn prev_tokens<'a>(&'a self, config: &FeatureConfig) -> Vec<&'a str> {
        self.tokens(&config.prev_tokens, config)
    }

    /// Tokens following the term, boundary fillers included
    pub fn next_tokens<'a>(&'a self, config: &FeatureConfig) -> Vec<&'a str> {
        self.tokens(&config.next_tokens, config)
    }

    fn tokens<'a>(&'a self, name: &str, config: &FeatureConfig) -> Vec<&'a str> {
        match self.feature(name) {
            Some(value) if !value.is_empty() => {
                value.split(config.token_separator.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Verb preceding the term, if any
    pub fn prev_verb(&self, config: &FeatureConfig) -> Option<&str> {
        self.feature(&config.prev_verb).filter(|v| !v.is_empty())
    }

    /// Containing sentence or unit
    pub fn unit_location(&self, config: &FeatureConfig) -> Option<&str> {
        self.feature(&config.unit_location)
    }

    /// Whether `later` may be linked to `self` by a predicate: same document,
    /// same containing unit, and `later` has a preceding verb.
    pub fn potentially_mergeable(&self, later: &FeatureVector, config: &FeatureConfig) -> bool {
        if self.document != later.document {
            return false;
        }
        match (self.unit_location(config), later.unit_location(config)) {
            (Some(a), Some(b)) if a == b => later.prev_verb(config).is_some(),
            _ => false,
        }
    }
}

impl std::fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<FeatureVector {} term='{}' features={}>",
            self.document,
            self.term,
            self.features.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "US123.xml\t0004\t2003\tkalman filter\tsent_loc=3-5\tdoc_loc=sent2\tprev_n3=^_we_use\tnext_n3=to_track_the\tprev_V=use";

    #[test]
    fn test_parse_line() {
        let config = FeatureConfig::default();
        let vector = FeatureVector::parse(LINE, None, &config).unwrap();

        assert_eq!(vector.document, "US123.xml");
        assert_eq!(vector.occurrence_id, "0004");
        assert_eq!(vector.year, 2003);
        assert_eq!(vector.term, "kalman filter");
        assert_eq!(
            vector.sentence_location,
            Some(SentenceLocation { start: 3, end: 5 })
        );
        assert_eq!(vector.prev_tokens(&config), vec!["^", "we", "use"]);
        assert_eq!(vector.next_tokens(&config), vec!["to", "track", "the"]);
        assert_eq!(vector.prev_verb(&config), Some("use"));
        assert_eq!(vector.unit_location(&config), Some("sent2"));
    }

    #[test]
    fn test_parse_inherits_document() {
        let config = FeatureConfig::default();
        let line = "\t0001\t1999\tdoor\tsent_loc=0-1";
        let vector = FeatureVector::parse(line, Some("doc9"), &config).unwrap();
        assert_eq!(vector.document, "doc9");

        assert!(FeatureVector::parse(line, None, &config).is_err());
    }

    #[test]
    fn test_parse_rejects_short_line() {
        let config = FeatureConfig::default();
        let err = FeatureVector::parse("doc\t1\t2000", None, &config).unwrap_err();
        assert_eq!(
            err,
            RecordError::TooFewFields {
                minimum: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_year_and_feature() {
        let config = FeatureConfig::default();
        assert_eq!(
            FeatureVector::parse("doc\t1\tyear\tdoor", None, &config),
            Err(RecordError::invalid("year", "year"))
        );
        assert_eq!(
            FeatureVector::parse("doc\t1\t2000\tdoor\tnoequals", None, &config),
            Err(RecordError::BareFeature("noequals".to_string()))
        );
        assert_eq!(
            FeatureVector::parse("doc\t1\t2000\tdoor\tsent_loc=x", None, &config),
            Err(RecordError::invalid("sent_loc", "x"))
        );
    }

    #[test]
    fn test_empty_prev_verb_is_absent() {
        let config = FeatureConfig::default();
        let vector = FeatureVector::parse("d\t1\t2000\tdoor\tprev_V=", None, &config).unwrap();
        assert_eq!(vector.prev_verb(&config), None);
    }

    #[test]
    fn test_gap() {
        let a = SentenceLocation { start: 0, end: 2 };
        let b = SentenceLocation { start: 3, end: 5 };
        assert_eq!(a.gap_to(&b), 1);
        assert_eq!(b.gap_to(&a), -5);
    }

    #[test]
    fn test_potentially_mergeable() {
        let config = FeatureConfig::default();
        let first =
            FeatureVector::parse("d\t1\t2000\ta\tdoc_loc=sent1\tsent_loc=0-1", None, &config)
                .unwrap();
        let second = FeatureVector::parse(
            "d\t2\t2000\tb\tdoc_loc=sent1\tsent_loc=3-4\tprev_V=use",
            None,
            &config,
        )
        .unwrap();
        let other_unit = FeatureVector::parse(
            "d\t3\t2000\tc\tdoc_loc=sent2\tsent_loc=0-1\tprev_V=use",
            None,
            &config,
        )
        .unwrap();
        let no_verb =
            FeatureVector::parse("d\t4\t2000\tc\tdoc_loc=sent1\tsent_loc=5-6", None, &config)
                .unwrap();

        assert!(first.potentially_mergeable(&second, &config));
        assert!(!first.potentially_mergeable(&other_unit, &config));
        assert!(!first.potentially_mergeable(&no_verb, &config));
    }
}
