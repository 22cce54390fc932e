//! Co-occurrence and term-relation construction
//!
//! Feature vectors are streamed through a sliding window. Every pair the
//! window produces strengthens the co-occurrence edge between the two terms,
//! and pairs with a recoverable predicate additionally become term relations.

use serde::{Deserialize, Serialize};
use taxo_core::{AppConfig, TermRegistry, TermRelation};
use taxo_parser::FeatureVector;
use tracing::{debug, info};

use crate::context::ContextExtractor;
use crate::window::CooccurrenceWindow;
use crate::RelationExtractor;

/// Counters collected while building relations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationStats {
    /// Documents seen
    pub documents: usize,

    /// Vectors whose term is not in the registry
    pub missing_terms: usize,

    /// Co-occurrence observations recorded
    pub observations: usize,

    /// Predicate-linked relations created
    pub term_relations: usize,

    /// Pairs whose token gap fell outside the pivot table
    pub unexpected_gaps: usize,
}

/// Streams feature vectors into a term registry
pub struct RelationBuilder {
    window_width: usize,
    extractor: Box<dyn RelationExtractor>,
}

impl RelationBuilder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            window_width: config.relations.window_width,
            extractor: Box::new(ContextExtractor::from_config(config)),
        }
    }

    /// Replace the predicate extractor
    pub fn with_extractor(mut self, extractor: impl RelationExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Record co-occurrences and term relations for `vectors`, which must be
    /// in corpus order. The window is cleared whenever the document changes.
    pub fn add_relations(
        &self,
        registry: &mut TermRegistry,
        vectors: &[FeatureVector],
    ) -> RelationStats {
        let mut stats = RelationStats::default();
        let mut window = CooccurrenceWindow::new(self.window_width);
        let mut current_document: Option<&str> = None;

        for vector in vectors {
            if !registry.contains(&vector.term) {
                debug!("Skipping unregistered term '{}'", vector.term);
                stats.missing_terms += 1;
                continue;
            }

            if current_document != Some(vector.document.as_str()) {
                window.reset();
                current_document = Some(vector.document.as_str());
                stats.documents += 1;
            }

            window.update(vector);
            for (earlier, later) in window.cooccurrence_pairs() {
                let (Some(source), Some(target)) =
                    (registry.id_of(&earlier.term), registry.id_of(&later.term))
                else {
                    continue;
                };

                registry.add_cooccurrence(source, target);
                stats.observations += 1;

                let Some(extraction) =
                    self.extractor
                        .extract(earlier, later, &earlier.term, &later.term)
                else {
                    continue;
                };
                if extraction.unexpected_gap {
                    stats.unexpected_gaps += 1;
                }
                if let Some(predicate) = extraction.predicate {
                    registry.add_term_relation(TermRelation::new(
                        &later.document,
                        predicate,
                        source,
                        target,
                        extraction.context,
                    ));
                    stats.term_relations += 1;
                }
            }
        }

        info!(
            "Recorded {} co-occurrences and {} term relations over {} documents",
            stats.observations, stats.term_relations, stats.documents
        );
        if stats.missing_terms > 0 {
            info!("{} feature vectors referenced unknown terms", stats.missing_terms);
        }
        stats
    }
}

impl std::fmt::Debug for RelationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationBuilder")
            .field("window_width", &self.window_width)
            .finish_non_exhaustive()
    }
}

/// Drop weak co-occurrence edges of well-connected terms.
///
/// For every term with at least `min_partners` partners, edges observed fewer
/// than `min_count` times are removed from both endpoints. Returns the number
/// of edges removed.
pub fn prune_cooccurrences(
    registry: &mut TermRegistry,
    min_partners: usize,
    min_count: u32,
) -> usize {
    let weak: Vec<_> = registry
        .iter()
        .filter(|(_, term)| term.cooccurrences.len() >= min_partners)
        .flat_map(|(_, term)| term.cooccurrences.values())
        .filter(|rel| rel.count < min_count)
        .map(|rel| (rel.source, rel.target))
        .collect();

    let removed = weak
        .into_iter()
        .filter(|(a, b)| registry.remove_cooccurrence(*a, *b))
        .count();
    info!("Pruned {} weak co-occurrence edges", removed);
    removed
}
