//! Sliding co-occurrence window

use std::collections::VecDeque;
use std::fmt;

use taxo_parser::FeatureVector;

/// The smallest window that can still produce a pair
pub const MIN_WIDTH: usize = 2;

/// Keeps the most recent `width` feature vectors in arrival order
#[derive(Debug, Clone)]
pub struct CooccurrenceWindow<'a> {
    width: usize,
    vectors: VecDeque<&'a FeatureVector>,
}

impl<'a> CooccurrenceWindow<'a> {
    /// Create a window; widths below two are raised to two
    pub fn new(width: usize) -> Self {
        let width = width.max(MIN_WIDTH);
        Self {
            width,
            vectors: VecDeque::with_capacity(width),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a vector, evicting the oldest one when full
    pub fn update(&mut self, vector: &'a FeatureVector) {
        if self.vectors.len() == self.width {
            self.vectors.pop_front();
        }
        self.vectors.push_back(vector);
    }

    /// Forget everything, e.g. at a document boundary
    pub fn reset(&mut self) {
        self.vectors.clear();
    }

    pub fn newest(&self) -> Option<&'a FeatureVector> {
        self.vectors.back().copied()
    }

    /// Pairs `(earlier, newest)` for every earlier vector of another term.
    ///
    /// Only pairs involving the newest vector are produced, so each pair of
    /// occurrences is seen exactly once as the window slides.
    pub fn cooccurrence_pairs(&self) -> Vec<(&'a FeatureVector, &'a FeatureVector)> {
        let Some(newest) = self.newest() else {
            return Vec::new();
        };
        self.vectors
            .iter()
            .take(self.vectors.len() - 1)
            .filter(|earlier| earlier.term != newest.term)
            .map(|earlier| (*earlier, newest))
            .collect()
    }
}

impl fmt::Display for CooccurrenceWindow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<&str> = self.vectors.iter().map(|v| v.term.as_str()).collect();
        write!(f, "<< {} >>", terms.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxo_core::FeatureConfig;

    fn vector(term: &str) -> FeatureVector {
        let line = format!("doc\t1\t2000\t{term}");
        FeatureVector::parse(&line, None, &FeatureConfig::default()).unwrap()
    }

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(CooccurrenceWindow::new(0).width(), 2);
        assert_eq!(CooccurrenceWindow::new(5).width(), 5);
    }

    #[test]
    fn test_eviction() {
        let (a, b, c) = (vector("a"), vector("b"), vector("c"));
        let mut window = CooccurrenceWindow::new(2);
        window.update(&a);
        window.update(&b);
        window.update(&c);
        assert_eq!(window.len(), 2);
        assert_eq!(window.to_string(), "<< b, c >>");
    }

    #[test]
    fn test_pairs_with_newest_only() {
        let (a, b, c) = (vector("a"), vector("b"), vector("c"));
        let mut window = CooccurrenceWindow::new(3);

        window.update(&a);
        assert!(window.cooccurrence_pairs().is_empty());

        window.update(&b);
        window.update(&c);
        let pairs: Vec<(&str, &str)> = window
            .cooccurrence_pairs()
            .into_iter()
            .map(|(x, y)| (x.term.as_str(), y.term.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "c"), ("b", "c")]);
    }

    #[test]
    fn test_same_term_pairs_are_skipped() {
        let (a1, a2) = (vector("a"), vector("a"));
        let mut window = CooccurrenceWindow::new(2);
        window.update(&a1);
        window.update(&a2);
        assert!(window.cooccurrence_pairs().is_empty());
    }

    #[test]
    fn test_reset() {
        let (a, b) = (vector("a"), vector("b"));
        let mut window = CooccurrenceWindow::new(2);
        window.update(&a);
        window.reset();
        window.update(&b);
        assert!(window.cooccurrence_pairs().is_empty());
        assert_eq!(window.newest().map(|v| v.term.as_str()), Some("b"));
    }
}
