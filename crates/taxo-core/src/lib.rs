//! Taxo Core - Domain models shared by the taxonomy engine
//!
//! This crate defines the data model the engine manipulates:
//! - Terms and the term registry (an arena indexed by `TermId`)
//! - Isa, co-occurrence and predicate-linked term relations
//! - Context sequences attached to term relations
//! - Common error types
//! - Configuration management

pub mod config;
pub mod context;
pub mod registry;

pub use config::{
    AppConfig, ConfigError, FeatureConfig, ImportConfig, LoggingConfig, RelationConfig,
};
pub use context::{Context, ContextElement, ContextKind};
pub use registry::TermRegistry;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for taxonomy operations
#[derive(Error, Debug)]
pub enum TaxoError {
    #[error("Term not found: {0}")]
    NotFound(String),

    #[error("Invalid context element: {0}")]
    InvalidContext(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, TaxoError>;

// ============================================================================
// Identifiers
// ============================================================================

/// Index of a term inside a [`TermRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermId(pub usize);

impl TermId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a term relation inside a [`TermRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermRelationId(pub usize);

impl TermRelationId {
    pub fn index(self) -> usize {
        self.0
    }
}

// ============================================================================
// Terms
// ============================================================================

/// A normalized technical phrase tracked by the taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    /// Normalized surface string (unique key)
    pub name: String,

    /// Technology score assigned by the upstream classifier
    pub score: f32,

    /// Number of occurrences in the corpus
    pub count: u32,

    /// Optional role label assigned by the upstream role classifier
    pub role: Option<String>,

    /// More general terms (filled in by the hierarchy builder)
    pub hypernyms: Vec<TermId>,

    /// More specific terms (filled in by the hierarchy builder)
    pub hyponyms: Vec<TermId>,

    /// Isa relations originating at this term
    pub isa_relations: Vec<IsaRelation>,

    /// Co-occurrence relations keyed by the partner's name
    pub cooccurrences: HashMap<String, CooccurrenceRelation>,

    /// Predicate-linked relations this term takes part in
    pub term_relations: Vec<TermRelationId>,
}

impl Term {
    /// Create a term with no relations
    pub fn new(name: impl Into<String>, score: f32, count: u32) -> Self {
        Self {
            name: name.into(),
            score,
            count,
            role: None,
            hypernyms: Vec::new(),
            hyponyms: Vec::new(),
            isa_relations: Vec::new(),
            cooccurrences: HashMap::new(),
            term_relations: Vec::new(),
        }
    }

    /// Set the role label
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Whitespace tokens of the term name
    pub fn tokens(&self) -> Vec<&str> {
        self.name.split_whitespace().collect()
    }

    /// Co-occurrence relations sorted by descending mutual information
    pub fn cooccurrences_by_mi(&self) -> Vec<&CooccurrenceRelation> {
        let mut relations: Vec<&CooccurrenceRelation> = self.cooccurrences.values().collect();
        relations.sort_by(|a, b| b.mi.total_cmp(&a.mi));
        relations
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<term='{}' count={} score={:.6}>",
            self.name, self.count, self.score
        )
    }
}

// ============================================================================
// Relations
// ============================================================================

/// How an isa relation was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsaType {
    /// Right-hand-head rule over compound terms
    Rhhr,
}

impl IsaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rhhr => "rhhr",
        }
    }
}

impl std::fmt::Display for IsaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directed hypernym link, stored on the source term only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsaRelation {
    pub rel_type: IsaType,
    pub source: TermId,
    pub target: TermId,
}

impl IsaRelation {
    pub fn new(rel_type: IsaType, source: TermId, target: TermId) -> Self {
        Self {
            rel_type,
            source,
            target,
        }
    }
}

/// Co-occurrence of two terms, held by both endpoints
///
/// `source` is always the term holding this copy and `target` the partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooccurrenceRelation {
    pub source: TermId,
    pub target: TermId,

    /// Number of times the pair was observed
    pub count: u32,

    /// Pointwise mutual information, 0 until scored
    pub mi: f64,
}

impl CooccurrenceRelation {
    pub fn new(source: TermId, target: TermId) -> Self {
        Self {
            source,
            target,
            count: 1,
            mi: 0.0,
        }
    }
}

/// Predicate-linked relation between two terms observed in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRelation {
    /// Document the relation was observed in
    pub document: String,

    /// Recovered predicate
    pub predicate: String,

    pub source: TermId,
    pub target: TermId,

    /// How the two terms appear together in the sentence
    pub context: Context,
}

impl TermRelation {
    pub fn new(
        document: impl Into<String>,
        predicate: impl Into<String>,
        source: TermId,
        target: TermId,
        context: Context,
    ) -> Self {
        Self {
            document: document.into(),
            predicate: predicate.into(),
            source,
            target,
            context,
        }
    }

    /// Presentation-time identity: predicate, source and target
    pub fn signature(&self) -> (&str, TermId, TermId) {
        (&self.predicate, self.source, self.target)
    }
}

// ============================================================================
// Tests
// ============================================================================
