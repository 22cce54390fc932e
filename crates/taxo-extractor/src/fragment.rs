//! Read-only views over a built taxonomy

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use taxo_core::{TermId, TermRegistry};

/// Default number of related terms shown in a fragment
pub const DEFAULT_RELATED_LIMIT: usize = 20;

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedTerm {
    pub name: String,
    pub count: u32,
    pub mi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationView {
    pub predicate: String,
    pub source: String,
    pub target: String,
    pub document: String,
    pub context: String,
}

fn names(registry: &TermRegistry, ids: &[TermId]) -> Vec<String> {
    ids.iter().map(|id| registry.name(*id).to_string()).collect()
}

/// The neighbourhood of one term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermFragment {
    pub name: String,
    pub count: u32,
    pub score: f32,
    pub role: Option<String>,
    pub hypernyms: Vec<String>,
    pub hyponyms: Vec<String>,

    /// Co-occurring terms, strongest mutual information first
    pub related: Vec<RelatedTerm>,

    /// Term relations, one per predicate/source/target
    pub relations: Vec<RelationView>,
}

impl TermFragment {
    pub fn new(registry: &TermRegistry, id: TermId, related_limit: usize) -> Self {
        let term = registry.get(id);

        let related = term
            .cooccurrences_by_mi()
            .into_iter()
            .take(related_limit)
            .map(|rel| RelatedTerm {
                name: registry.name(rel.target).to_string(),
                count: rel.count,
                mi: rel.mi,
            })
            .collect();

        let relations = registry
            .unique_term_relations(id)
            .into_iter()
            .map(|rel| RelationView {
                predicate: rel.predicate.clone(),
                source: registry.name(rel.source).to_string(),
                target: registry.name(rel.target).to_string(),
                document: rel.document.clone(),
                context: rel.context.to_string(),
            })
            .collect();

        Self {
            name: term.name.clone(),
            count: term.count,
            score: term.score,
            role: term.role.clone(),
            hypernyms: names(registry, &term.hypernyms),
            hyponyms: names(registry, &term.hyponyms),
            related,
            relations,
        }
    }
}

impl fmt::Display for TermFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name.to_uppercase())?;
        writeln!(f)?;
        write!(f, "Occurrences in dataset: {}", self.count)?;
        if let Some(role) = &self.role {
            write!(f, " (role {role})")?;
        }
        writeln!(f)?;
        writeln!(f)?;

        if self.hypernyms.is_empty() {
            writeln!(f, "Top")?;
        }
        for hypernym in &self.hypernyms {
            writeln!(f, "{hypernym}")?;
        }
        writeln!(f, "  {}", self.name)?;
        for hyponym in &self.hyponyms {
            writeln!(f, "{INDENT}{hyponym}")?;
        }

        if !self.related.is_empty() {
            writeln!(f, "\nRelated terms:\n")?;
            for rel in &self.related {
                writeln!(f, "{INDENT}{} (count={} mi={:.4})", rel.name, rel.count, rel.mi)?;
            }
        }

        if !self.relations.is_empty() {
            writeln!(f, "\nRelations:\n")?;
            for rel in &self.relations {
                writeln!(
                    f,
                    "{INDENT}{} : [{}] ==> [{}]",
                    rel.predicate, rel.source, rel.target
                )?;
                writeln!(f, "{INDENT}{INDENT}{}", rel.context)?;
            }
        }
        Ok(())
    }
}

/// A term and everything below it in the hierarchy
#[derive(Debug, Clone, Copy)]
pub struct Subtree<'a> {
    registry: &'a TermRegistry,
    root: TermId,
}

impl<'a> Subtree<'a> {
    pub fn new(registry: &'a TermRegistry, root: TermId) -> Self {
        Self { registry, root }
    }
}

impl fmt::Display for Subtree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtree(self.registry, self.root, 0, f)
    }
}

fn write_subtree<W: Write>(
    registry: &TermRegistry,
    id: TermId,
    depth: usize,
    out: &mut W,
) -> fmt::Result {
    writeln!(out, "{}{}", INDENT.repeat(depth), registry.name(id))?;
    for hyponym in &registry.get(id).hyponyms {
        write_subtree(registry, *hyponym, depth + 1, out)?;
    }
    Ok(())
}

/// The term followed by its hyponyms, indented one level per generation
pub fn render_hierarchy(registry: &TermRegistry, id: TermId) -> String {
    Subtree::new(registry, id).to_string()
}

/// Every tree rooted at a term without hypernyms, most frequent roots first.
/// Isolated terms are left out.
pub fn render_forest(registry: &TermRegistry) -> String {
    registry
        .ids_by_count()
        .into_iter()
        .filter(|id| {
            let term = registry.get(*id);
            term.hypernyms.is_empty() && !term.hyponyms.is_empty()
        })
        .map(|id| render_hierarchy(registry, id))
        .collect()
}
