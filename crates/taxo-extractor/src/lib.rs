//! Taxo Extractor - Taxonomy construction pipeline
//!
//! Builds the term taxonomy from an imported term registry and an ordered
//! stream of feature vectors:
//! - isa relations from the right-hand-head rule over compound terms
//! - co-occurrence relations from a sliding window over the vectors
//! - predicate-linked relations recovered from the tokens between terms
//! - pointwise mutual information for every co-occurrence edge

use taxo_core::Context;
use taxo_parser::FeatureVector;

/// Result of looking for a predicate between two adjacent occurrences
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Token positions between the two terms (negative if they overlap)
    pub gap: i64,

    /// The recovered predicate, if one was found between the terms
    pub predicate: Option<String>,

    /// How the two terms appear together
    pub context: Context,

    /// The gap fell outside the supported pivot table
    pub unexpected_gap: bool,
}

/// Trait for predicate extractors
pub trait RelationExtractor: Send + Sync {
    /// Inspect two occurrences, `earlier` preceding `later` in the same
    /// document. Returns `None` when the pair cannot be linked at all.
    fn extract(
        &self,
        earlier: &FeatureVector,
        later: &FeatureVector,
        source: &str,
        target: &str,
    ) -> Option<Extraction>;
}

pub mod context;
pub mod fragment;
pub mod hierarchy;
pub mod loader;
pub mod mutual_info;
pub mod pipeline;
pub mod relation;
pub mod window;

pub use context::ContextExtractor;
pub use fragment::TermFragment;
pub use hierarchy::{build_hierarchy, HierarchyBuilder, HierarchyReport};
pub use mutual_info::{pointwise_mutual_information, score_mutual_information};
pub use pipeline::{BuildReport, TaxonomyBuilder};
pub use relation::{prune_cooccurrences, RelationBuilder, RelationStats};
pub use window::CooccurrenceWindow;
