//! Predicate and context extraction between two term occurrences
//!
//! The tokens separating two terms are rebuilt from the three tokens after
//! the first term and the three tokens before the second one. For gaps up to
//! six positions this covers the whole stretch; beyond that only a lossy
//! approximation is possible and no predicate is searched for.

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;
use taxo_core::config::MAX_PIVOT_GAP;
use taxo_core::{AppConfig, Context, FeatureConfig};
use taxo_parser::FeatureVector;
use tracing::debug;

use crate::{Extraction, RelationExtractor};

/// Which of the `next` (after the first term) and `prev` (before the second
/// term) tokens make up the stretch between the terms, indexed by gap.
const PIVOT_TABLE: [(&[usize], &[usize]); MAX_PIVOT_GAP + 1] = [
    (&[], &[]),
    (&[0], &[]),
    (&[0, 1], &[]),
    (&[0, 1, 2], &[]),
    (&[0, 1, 2], &[2]),
    (&[0, 1, 2], &[1, 2]),
    (&[0, 1, 2], &[0, 1, 2]),
];

/// Tokens between two terms `gap` positions apart, or `None` when the gap is
/// outside the table
pub fn pivot_tokens<'a>(gap: i64, next: &[&'a str], prev: &[&'a str]) -> Option<Vec<&'a str>> {
    let index = usize::try_from(gap).ok()?;
    let (from_next, from_prev) = PIVOT_TABLE.get(index)?;

    let tokens = from_next
        .iter()
        .filter_map(|i| next.get(*i))
        .chain(from_prev.iter().filter_map(|i| prev.get(*i)))
        .copied()
        .collect();
    Some(tokens)
}

/// Whole-word pattern for `candidate`
fn predicate_pattern(candidate: &str) -> Option<Regex> {
    if candidate.is_empty() {
        return None;
    }
    let pattern = format!(r"\b{}\b", regex::escape(candidate));
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            debug!("Invalid predicate pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// Whole-word search for `candidate` inside `span`; returns byte offsets
pub fn find_predicate(span: &str, candidate: &str) -> Option<(usize, usize)> {
    predicate_pattern(candidate)?
        .find(span)
        .map(|m| (m.start(), m.end()))
}

/// Builds contexts and recovers predicates from feature vectors
#[derive(Debug)]
pub struct ContextExtractor {
    features: FeatureConfig,
    max_gap: usize,
    /// Compiled whole-word patterns, keyed by candidate predicate
    patterns: Mutex<HashMap<String, Regex>>,
}

impl Clone for ContextExtractor {
    fn clone(&self) -> Self {
        Self::new(self.features.clone(), self.max_gap)
    }
}

impl ContextExtractor {
    /// `max_gap` is capped at the size of the pivot table
    pub fn new(features: FeatureConfig, max_gap: usize) -> Self {
        Self {
            features,
            max_gap: max_gap.min(MAX_PIVOT_GAP),
            patterns: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.features.clone(), config.relations.max_predicate_gap)
    }

    pub fn max_gap(&self) -> usize {
        self.max_gap
    }

    /// Number of predicate patterns compiled so far
    pub fn cached_patterns(&self) -> usize {
        self.patterns.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Like [`find_predicate`], compiling each candidate's pattern once
    fn locate_predicate(&self, span: &str, candidate: &str) -> Option<(usize, usize)> {
        let regex = match self.patterns.lock() {
            Ok(mut patterns) => match patterns.get(candidate).cloned() {
                Some(regex) => regex,
                None => {
                    let regex = predicate_pattern(candidate)?;
                    patterns.insert(candidate.to_string(), regex.clone());
                    regex
                }
            },
            Err(_) => predicate_pattern(candidate)?,
        };
        regex.find(span).map(|m| (m.start(), m.end()))
    }

    fn join(&self, tokens: &[&str]) -> String {
        tokens
            .iter()
            .filter(|t| **t != self.features.boundary_marker)
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fill in the stretch between the two terms and return the predicate
    /// found in it, if any
    fn push_pivot(
        &self,
        context: &mut Context,
        gap: i64,
        next: &[&str],
        prev: &[&str],
        candidate: &str,
    ) -> Option<String> {
        let tokens = pivot_tokens(gap, next, prev)?;
        let span = self.join(&tokens);

        if gap > self.max_gap as i64 {
            context.push_span(span);
            return None;
        }

        match self.locate_predicate(&span, candidate) {
            Some((start, end)) => {
                context.push_span(span[..start].trim());
                context.push_pred(&span[start..end]);
                context.push_span(span[end..].trim());
                Some(candidate.to_string())
            }
            None => {
                context.push_span(span);
                None
            }
        }
    }
}

impl RelationExtractor for ContextExtractor {
    fn extract(
        &self,
        earlier: &FeatureVector,
        later: &FeatureVector,
        source: &str,
        target: &str,
    ) -> Option<Extraction> {
        if !earlier.potentially_mergeable(later, &self.features) {
            return None;
        }
        let (first, second) = (earlier.sentence_location?, later.sentence_location?);
        let candidate = later
            .prev_verb(&self.features)?
            .replace(self.features.token_separator.as_str(), " ");

        let gap = first.gap_to(&second);
        let next = earlier.next_tokens(&self.features);
        let prev = later.prev_tokens(&self.features);

        let mut context = Context::new();
        context.push_span(self.join(&earlier.prev_tokens(&self.features)));
        context.push_term(source);

        let unexpected_gap = pivot_tokens(gap, &next, &prev).is_none();
        let predicate = if unexpected_gap {
            debug!(
                "unexpected distance {} between '{}' and '{}' in {}",
                gap, source, target, later.document
            );
            let approximation = format!("{} ... {}", self.join(&next), self.join(&prev));
            context.push_span(approximation.trim());
            None
        } else {
            self.push_pivot(&mut context, gap, &next, &prev, &candidate)
        };

        context.push_term(target);
        context.push_span(self.join(&later.next_tokens(&self.features)));

        Some(Extraction {
            gap,
            predicate,
            context,
            unexpected_gap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxo_core::ContextKind;

    fn vector(term: &str, features: &str) -> FeatureVector {
        let line = format!("doc1\t1\t2001\t{term}\tdoc_loc=s1\t{features}");
        FeatureVector::parse(&line, None, &FeatureConfig::default()).unwrap()
    }

    fn extractor() -> ContextExtractor {
        ContextExtractor::new(FeatureConfig::default(), 6)
    }

    #[test]
    fn test_pivot_table() {
        let next = ["n0", "n1", "n2"];
        let prev = ["p0", "p1", "p2"];
        let expect = [
            "",
            "n0",
            "n0 n1",
            "n0 n1 n2",
            "n0 n1 n2 p2",
            "n0 n1 n2 p1 p2",
            "n0 n1 n2 p0 p1 p2",
        ];
        for (gap, expected) in expect.iter().enumerate() {
            let tokens = pivot_tokens(gap as i64, &next, &prev).unwrap();
            assert_eq!(tokens.join(" "), *expected, "gap {gap}");
        }
        assert!(pivot_tokens(7, &next, &prev).is_none());
        assert!(pivot_tokens(-1, &next, &prev).is_none());
    }

    #[test]
    fn test_pivot_tolerates_short_token_lists() {
        let tokens = pivot_tokens(5, &["n0"], &[]).unwrap();
        assert_eq!(tokens, vec!["n0"]);
    }

    #[test]
    fn test_find_predicate_whole_words() {
        assert_eq!(find_predicate("which uses the", "uses"), Some((6, 10)));
        assert_eq!(find_predicate("reuses the", "uses"), None);
        assert_eq!(find_predicate("is part of", "part of"), Some((3, 10)));
        assert_eq!(find_predicate("a (b) c", "(b)"), None);
        assert_eq!(find_predicate("anything", ""), None);
    }

    #[test]
    fn test_extract_predicate_with_gap_three() {
        let first = vector(
            "kalman filter",
            "sent_loc=0-2\tprev_n3=^_^_^\tnext_n3=which_uses_the",
        );
        let second = vector(
            "noise model",
            "sent_loc=5-7\tprev_n3=which_uses_the\tnext_n3=of_the_sensor\tprev_V=uses",
        );

        let extraction = extractor()
            .extract(&first, &second, "kalman filter", "noise model")
            .unwrap();

        assert_eq!(extraction.gap, 3);
        assert_eq!(extraction.predicate.as_deref(), Some("uses"));
        assert!(!extraction.unexpected_gap);
        assert_eq!(
            extraction.context.serialize(),
            vec![
                "Span ",
                "Term ",
                "Span which",
                "Pred uses",
                "Span the",
                "Term ",
                "Span of the sensor",
            ]
        );
        assert_eq!(
            extraction.context.to_string(),
            "[kalman filter] which <uses> the [noise model] of the sensor"
        );
    }

    #[test]
    fn test_extract_multiword_verb() {
        let first = vector("wheel", "sent_loc=0-1\tprev_n3=^_the_front\tnext_n3=is_part_of");
        let second = vector(
            "axle",
            "sent_loc=5-6\tprev_n3=part_of_the\tnext_n3=^_^_^\tprev_V=is_part_of",
        );

        let extraction = extractor().extract(&first, &second, "wheel", "axle").unwrap();
        // gap 4: n0 n1 n2 p2
        assert_eq!(extraction.gap, 4);
        assert_eq!(extraction.predicate.as_deref(), Some("is part of"));
        assert_eq!(extraction.context.predicate(), Some("is part of"));
    }

    #[test]
    fn test_gap_one_without_predicate() {
        let first = vector("door", "sent_loc=0-1\tprev_n3=^_^_the\tnext_n3=and_the_frame");
        let second = vector(
            "frame",
            "sent_loc=2-3\tprev_n3=the_door_and\tnext_n3=^_^_^\tprev_V=open",
        );

        let extraction = extractor().extract(&first, &second, "door", "frame").unwrap();
        assert_eq!(extraction.gap, 1);
        assert_eq!(extraction.predicate, None);

        let kinds: Vec<ContextKind> = extraction.context.elements().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ContextKind::Span,
                ContextKind::Term,
                ContextKind::Span,
                ContextKind::Term,
                ContextKind::Span
            ]
        );
        assert_eq!(extraction.context.elements()[0].text, "the");
        assert_eq!(extraction.context.elements()[2].text, "and");
        assert_eq!(extraction.context.elements()[4].text, "");
    }

    #[test]
    fn test_gap_one_with_predicate() {
        let first = vector("sensor", "sent_loc=0-1\tprev_n3=^_^_^\tnext_n3=feeds_the_loop");
        let second = vector(
            "controller",
            "sent_loc=2-3\tprev_n3=^_sensor_feeds\tnext_n3=^_^_^\tprev_V=feeds",
        );

        let extraction = extractor()
            .extract(&first, &second, "sensor", "controller")
            .unwrap();
        assert_eq!(extraction.predicate.as_deref(), Some("feeds"));

        let pivot: Vec<String> = extraction.context.serialize()[2..5].to_vec();
        assert_eq!(pivot, vec!["Span ", "Pred feeds", "Span "]);
    }

    #[test]
    fn test_gap_seven_is_unexpected() {
        let first = vector("door", "sent_loc=0-1\tprev_n3=^_^_^\tnext_n3=a_b_c");
        let second = vector("frame", "sent_loc=8-9\tprev_n3=x_uses_z\tnext_n3=^_^_^\tprev_V=uses");

        let extraction = extractor().extract(&first, &second, "door", "frame").unwrap();
        assert_eq!(extraction.gap, 7);
        assert!(extraction.unexpected_gap);
        assert_eq!(extraction.predicate, None);
        assert_eq!(extraction.context.elements()[2].text, "a b c ... x uses z");
    }

    #[test]
    fn test_gap_above_configured_limit() {
        let first = vector("door", "sent_loc=0-1\tprev_n3=^_^_^\tnext_n3=a_uses_c");
        let second = vector("frame", "sent_loc=4-5\tprev_n3=a_uses_c\tnext_n3=^_^_^\tprev_V=uses");

        let limited = ContextExtractor::new(FeatureConfig::default(), 2);
        let extraction = limited.extract(&first, &second, "door", "frame").unwrap();
        assert_eq!(extraction.gap, 3);
        assert!(!extraction.unexpected_gap);
        assert_eq!(extraction.predicate, None);
        assert_eq!(extraction.context.elements()[2].text, "a uses c");
    }

    #[test]
    fn test_not_mergeable() {
        let first = vector("door", "sent_loc=0-1\tnext_n3=a_uses_c");
        let no_verb = vector("frame", "sent_loc=3-4\tprev_n3=a_uses_c");
        assert!(extractor().extract(&first, &no_verb, "door", "frame").is_none());

        let line = "doc1\t2\t2001\tframe\tdoc_loc=s2\tsent_loc=3-4\tprev_V=uses";
        let other_unit = FeatureVector::parse(line, None, &FeatureConfig::default()).unwrap();
        assert!(extractor().extract(&first, &other_unit, "door", "frame").is_none());
    }

    #[test]
    fn test_missing_location_yields_nothing() {
        let first = vector("door", "next_n3=a_uses_c");
        let second = vector("frame", "sent_loc=3-4\tprev_V=uses");
        assert!(extractor().extract(&first, &second, "door", "frame").is_none());
    }

    #[test]
    fn test_predicate_pattern_compiled_once() {
        let first = vector("sensor", "sent_loc=0-1\tprev_n3=^_^_^\tnext_n3=feeds_the_loop");
        let second = vector(
            "controller",
            "sent_loc=2-3\tprev_n3=^_sensor_feeds\tnext_n3=feeds_the_valve\tprev_V=feeds",
        );
        let third = vector(
            "valve",
            "sent_loc=4-5\tprev_n3=^_loop_feeds\tnext_n3=^_^_^\tprev_V=feeds",
        );

        let extractor = extractor();
        assert_eq!(extractor.cached_patterns(), 0);

        let a = extractor.extract(&first, &second, "sensor", "controller").unwrap();
        let b = extractor.extract(&second, &third, "controller", "valve").unwrap();
        assert_eq!(a.predicate.as_deref(), Some("feeds"));
        assert_eq!(b.predicate.as_deref(), Some("feeds"));
        assert_eq!(extractor.cached_patterns(), 1);

        assert_eq!(extractor.clone().cached_patterns(), 0);
    }

    #[test]
    fn test_max_gap_is_capped() {
        assert_eq!(ContextExtractor::new(FeatureConfig::default(), 40).max_gap(), 6);
    }
}
