//! Hierarchy induction with the right-hand-head rule
//!
//! Terms are inserted into a trie whose edges are keyed by right-aligned
//! token suffixes, so "door" is a child of Top, "iron door" a child of
//! "door" and "heavy iron door" a child of "iron door". Nodes that do not
//! correspond to a registered term are kept as plain path nodes. Walking the
//! trie then links every term to the nearest term above it.

use std::collections::HashMap;

use taxo_core::{IsaType, TermId, TermRegistry};
use tracing::{info, warn};

const TOP: &str = "Top";

#[derive(Debug)]
struct TrieNode {
    name: String,
    term: Option<TermId>,
    children: HashMap<String, TrieNode>,
}

impl TrieNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            term: None,
            children: HashMap::new(),
        }
    }

    /// Insert `term` following `tokens[idx - 1..]`, shortest suffix first.
    /// Returns false if the node reached does not carry the term's name.
    fn insert(&mut self, term: TermId, name: &str, tokens: &[&str], idx: usize) -> bool {
        if idx == 0 {
            if self.name == name {
                self.term = Some(term);
                return true;
            }
            return false;
        }

        let key = tokens[idx - 1..].join(" ");
        self.children
            .entry(key)
            .or_insert_with_key(|k| TrieNode::new(k.clone()))
            .insert(term, name, tokens, idx - 1)
    }

    fn collect_isa(&self, ancestor: Option<TermId>, pairs: &mut Vec<(TermId, TermId)>) {
        let mut nearest = ancestor;
        if let Some(term) = self.term {
            if let Some(hypernym) = ancestor {
                pairs.push((term, hypernym));
            }
            nearest = Some(term);
        }
        for child in self.children.values() {
            child.collect_isa(nearest, pairs);
        }
    }

    fn node_count(&self) -> usize {
        1 + self.children.values().map(TrieNode::node_count).sum::<usize>()
    }
}

/// Outcome of a hierarchy build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyReport {
    /// Terms placed in the trie
    pub inserted: usize,

    /// Terms whose name does not match their insertion path
    pub malformed: Vec<String>,

    /// Isa relations created
    pub isa_relations: usize,
}

/// Suffix trie over term tokens
#[derive(Debug)]
pub struct HierarchyBuilder {
    root: TrieNode,
    inserted: usize,
    malformed: Vec<String>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(TOP),
            inserted: 0,
            malformed: Vec::new(),
        }
    }

    /// Build the trie over every term of the registry
    pub fn from_registry(registry: &TermRegistry) -> Self {
        let mut builder = Self::new();
        for (id, term) in registry.iter() {
            builder.insert(id, &term.name);
        }
        builder
    }

    /// Insert one term. Malformed names (for instance with doubled or
    /// trailing whitespace) are skipped with a warning.
    pub fn insert(&mut self, id: TermId, name: &str) -> bool {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        if self.root.insert(id, name, &tokens, tokens.len()) {
            self.inserted += 1;
            true
        } else {
            warn!("term '{}' could not be inserted", name);
            self.malformed.push(name.to_string());
            false
        }
    }

    /// Terms rejected so far
    pub fn malformed(&self) -> &[String] {
        &self.malformed
    }

    /// Number of trie nodes, Top included
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// All `(hyponym, hypernym)` pairs implied by the trie
    pub fn isa_pairs(&self) -> Vec<(TermId, TermId)> {
        let mut pairs = Vec::new();
        self.root.collect_isa(None, &mut pairs);
        pairs
    }

    /// Record the isa relations on the registry; returns how many were added
    pub fn apply(&self, registry: &mut TermRegistry) -> usize {
        let pairs = self.isa_pairs();
        for (hyponym, hypernym) in &pairs {
            registry.add_isa(IsaType::Rhhr, *hyponym, *hypernym);
        }
        pairs.len()
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the right-hand-head rule over the whole registry
pub fn build_hierarchy(registry: &mut TermRegistry) -> HierarchyReport {
    let builder = HierarchyBuilder::from_registry(registry);
    let isa_relations = builder.apply(registry);
    info!(
        "Created {} isa relations over {} trie nodes",
        isa_relations,
        builder.node_count()
    );

    HierarchyReport {
        inserted: builder.inserted,
        malformed: builder.malformed,
        isa_relations,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use taxo_core::Term;

    fn registry(names: &[&str]) -> TermRegistry {
        let mut registry = TermRegistry::new();
        for name in names {
            registry.insert(Term::new(*name, 1.0, 3));
        }
        registry
    }

    fn hypernym_names(registry: &TermRegistry, name: &str) -> Vec<String> {
        let term = registry.by_name(name).unwrap();
        term.hypernyms
            .iter()
            .map(|id| registry.name(*id).to_string())
            .collect()
    }

    #[test]
    fn test_door_chain() {
        let mut registry = registry(&["heavy iron door", "door", "iron door"]);
        let report = build_hierarchy(&mut registry);

        assert_eq!(report.inserted, 3);
        assert_eq!(report.isa_relations, 2);
        assert_eq!(hypernym_names(&registry, "heavy iron door"), vec!["iron door"]);
        assert_eq!(hypernym_names(&registry, "iron door"), vec!["door"]);
        assert!(hypernym_names(&registry, "door").is_empty());

        let door = registry.by_name("door").unwrap();
        assert_eq!(door.hyponyms.len(), 1);
        assert_eq!(registry.name(door.hyponyms[0]), "iron door");
    }

    #[test]
    fn test_skips_missing_intermediate() {
        let mut registry = registry(&["door", "heavy iron door"]);
        build_hierarchy(&mut registry);
        assert_eq!(hypernym_names(&registry, "heavy iron door"), vec!["door"]);
    }

    #[test]
    fn test_siblings_share_head() {
        let mut registry = registry(&["filter", "kalman filter", "particle filter", "noise"]);
        build_hierarchy(&mut registry);

        let filter = registry.by_name("filter").unwrap();
        let hyponyms: HashSet<&str> = filter.hyponyms.iter().map(|id| registry.name(*id)).collect();
        assert_eq!(hyponyms, HashSet::from(["kalman filter", "particle filter"]));
        assert!(registry.by_name("noise").unwrap().hyponyms.is_empty());
    }

    #[test]
    fn test_isa_stored_on_source_only() {
        let mut registry = registry(&["door", "iron door"]);
        build_hierarchy(&mut registry);

        let iron = registry.by_name("iron door").unwrap();
        assert_eq!(iron.isa_relations.len(), 1);
        assert_eq!(iron.isa_relations[0].rel_type, IsaType::Rhhr);
        assert_eq!(registry.name(iron.isa_relations[0].target), "door");
        assert!(registry.by_name("door").unwrap().isa_relations.is_empty());
    }

    #[test]
    fn test_malformed_term_is_skipped() {
        let mut registry = registry(&["door", "iron  door", "steel door "]);
        let report = build_hierarchy(&mut registry);

        assert_eq!(report.inserted, 1);
        assert_eq!(report.malformed.len(), 2);
        assert!(registry.by_name("iron  door").unwrap().hypernyms.is_empty());
        assert!(registry.by_name("door").unwrap().hyponyms.is_empty());
    }

    #[test]
    fn test_empty_name_is_malformed() {
        let mut builder = HierarchyBuilder::new();
        assert!(!builder.insert(TermId(0), ""));
        assert_eq!(builder.malformed(), &["".to_string()]);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let names = ["signal", "digital signal", "noisy digital signal", "signal processing"];
        let mut forward = HierarchyBuilder::new();
        let mut backward = HierarchyBuilder::new();
        for (i, name) in names.iter().enumerate() {
            forward.insert(TermId(i), name);
        }
        for (i, name) in names.iter().enumerate().rev() {
            backward.insert(TermId(i), name);
        }

        let a: HashSet<_> = forward.isa_pairs().into_iter().collect();
        let b: HashSet<_> = backward.isa_pairs().into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_node_count_includes_path_nodes() {
        let mut builder = HierarchyBuilder::new();
        builder.insert(TermId(0), "heavy iron door");
        // Top, "door", "iron door", "heavy iron door"
        assert_eq!(builder.node_count(), 4);
        assert!(builder.isa_pairs().is_empty());
    }
}
