//! End-to-end taxonomy construction
//!
//! Phases, in order: hierarchy, co-occurrence and term relations, optional
//! pruning, mutual information.

use std::path::Path;

use serde::{Deserialize, Serialize};
use taxo_core::{AppConfig, Result, TermRegistry};
use taxo_parser::{read_feature_table, read_role_table, read_term_table, FeatureVector};
use tracing::info;

use crate::hierarchy::build_hierarchy;
use crate::loader::{import_roles, import_terms};
use crate::mutual_info::score_mutual_information;
use crate::relation::{prune_cooccurrences, RelationBuilder};

/// Summary of a build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub terms: usize,
    pub malformed_terms: usize,
    pub isa_relations: usize,
    pub documents: usize,
    pub observations: usize,
    pub cooccurrence_edges: usize,
    pub term_relations: usize,
    pub missing_terms: usize,
    pub unexpected_gaps: usize,
    pub pruned_edges: usize,
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = [
            ("terms", self.terms),
            ("malformed terms", self.malformed_terms),
            ("isa relations", self.isa_relations),
            ("documents", self.documents),
            ("observations", self.observations),
            ("co-occurrence edges", self.cooccurrence_edges),
            ("term relations", self.term_relations),
            ("missing terms", self.missing_terms),
            ("unexpected gaps", self.unexpected_gaps),
            ("pruned edges", self.pruned_edges),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<21}{}", format!("{label}:"), value)?;
        }
        Ok(())
    }
}

/// Runs every construction phase over a loaded registry
#[derive(Debug, Clone, Default)]
pub struct TaxonomyBuilder {
    config: AppConfig,
}

impl TaxonomyBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Like `new`, but rejects out-of-range settings
    pub fn try_new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read the term table (and optionally the role table) into a registry
    pub fn load_registry(&self, terms: &Path, roles: Option<&Path>) -> Result<TermRegistry> {
        let mut registry = TermRegistry::new();
        import_terms(&mut registry, read_term_table(terms)?, &self.config.import);
        if let Some(roles) = roles {
            import_roles(&mut registry, read_role_table(roles)?);
        }
        Ok(registry)
    }

    pub fn load_features(&self, path: &Path) -> Result<Vec<FeatureVector>> {
        Ok(read_feature_table(path, &self.config.features)?)
    }

    /// Build the hierarchy and all relations on `registry`
    pub fn build(&self, registry: &mut TermRegistry, vectors: &[FeatureVector]) -> BuildReport {
        let hierarchy = build_hierarchy(registry);

        let stats = RelationBuilder::new(&self.config).add_relations(registry, vectors);

        let relations = &self.config.relations;
        let pruned_edges = if relations.prune {
            prune_cooccurrences(
                registry,
                relations.prune_min_partners,
                relations.prune_min_count,
            )
        } else {
            0
        };

        score_mutual_information(registry);

        let report = BuildReport {
            terms: registry.len(),
            malformed_terms: hierarchy.malformed.len(),
            isa_relations: hierarchy.isa_relations,
            documents: stats.documents,
            observations: stats.observations,
            cooccurrence_edges: registry.cooccurrence_edge_count(),
            term_relations: stats.term_relations,
            missing_terms: stats.missing_terms,
            unexpected_gaps: stats.unexpected_gaps,
            pruned_edges,
        };
        info!(
            "Taxonomy built: {} terms, {} isa, {} co-occurrence edges, {} term relations",
            report.terms, report.isa_relations, report.cooccurrence_edges, report.term_relations
        );
        report
    }

    /// Load all inputs from disk and build
    pub fn build_from_files(
        &self,
        terms: &Path,
        features: &Path,
        roles: Option<&Path>,
    ) -> Result<(TermRegistry, BuildReport)> {
        let mut registry = self.load_registry(terms, roles)?;
        let vectors = self.load_features(features)?;
        let report = self.build(&mut registry, &vectors);
        Ok((registry, report))
    }
}
