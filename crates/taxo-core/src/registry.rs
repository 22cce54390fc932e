//! Term registry
//!
//! Arena owning every `Term` and every `TermRelation` of a run. Terms refer
//! to each other through `TermId` indices, so hierarchy and co-occurrence
//! links never imply ownership.

use std::collections::{HashMap, HashSet};

use crate::{
    CooccurrenceRelation, IsaRelation, IsaType, Result, TaxoError, Term, TermId, TermRelation,
    TermRelationId,
};

/// Registry of terms keyed by surface string
#[derive(Debug, Clone, Default)]
pub struct TermRegistry {
    terms: Vec<Term>,
    index: HashMap<String, TermId>,
    relations: Vec<TermRelation>,
}

impl TermRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Register a term.
    ///
    /// Registering a name twice keeps the original identity and takes the
    /// score and count of the later record.
    pub fn insert(&mut self, term: Term) -> TermId {
        if let Some(&id) = self.index.get(&term.name) {
            let existing = &mut self.terms[id.0];
            existing.score = term.score;
            existing.count = term.count;
            if term.role.is_some() {
                existing.role = term.role;
            }
            return id;
        }

        let id = TermId(self.terms.len());
        self.index.insert(term.name.clone(), id);
        self.terms.push(term);
        id
    }

    /// Look up a term id by name
    pub fn id_of(&self, name: &str) -> Option<TermId> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get a term by id.
    ///
    /// Panics if `id` was not issued by this registry.
    pub fn get(&self, id: TermId) -> &Term {
        &self.terms[id.0]
    }

    pub fn get_mut(&mut self, id: TermId) -> &mut Term {
        &mut self.terms[id.0]
    }

    /// Get a term by name
    pub fn by_name(&self, name: &str) -> Result<&Term> {
        self.id_of(name)
            .map(|id| self.get(id))
            .ok_or_else(|| TaxoError::NotFound(name.to_string()))
    }

    pub fn name(&self, id: TermId) -> &str {
        &self.terms[id.0].name
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, &Term)> {
        self.terms.iter().enumerate().map(|(i, t)| (TermId(i), t))
    }

    pub fn ids(&self) -> impl Iterator<Item = TermId> {
        (0..self.terms.len()).map(TermId)
    }

    /// Every held co-occurrence copy, for in-place scoring passes
    pub fn cooccurrences_mut(&mut self) -> impl Iterator<Item = &mut CooccurrenceRelation> {
        self.terms
            .iter_mut()
            .flat_map(|t| t.cooccurrences.values_mut())
    }

    /// Term ids ordered by descending occurrence count, then by name
    pub fn ids_by_count(&self) -> Vec<TermId> {
        let mut ids: Vec<TermId> = self.ids().collect();
        ids.sort_by(|a, b| {
            let (ta, tb) = (self.get(*a), self.get(*b));
            tb.count.cmp(&ta.count).then_with(|| ta.name.cmp(&tb.name))
        });
        ids
    }

    // ------------------------------------------------------------------------
    // Isa relations
    // ------------------------------------------------------------------------

    /// Record `source` isa `target` and update both hierarchy lists
    pub fn add_isa(&mut self, rel_type: IsaType, source: TermId, target: TermId) {
        self.terms[source.0]
            .isa_relations
            .push(IsaRelation::new(rel_type, source, target));
        self.terms[source.0].hypernyms.push(target);
        self.terms[target.0].hyponyms.push(source);
    }

    pub fn isa_relation_count(&self) -> usize {
        self.terms.iter().map(|t| t.isa_relations.len()).sum()
    }

    // ------------------------------------------------------------------------
    // Co-occurrence relations
    // ------------------------------------------------------------------------

    /// Register one observation of `a` next to `b` on both endpoints.
    ///
    /// Returns false for self-pairs, which are never recorded.
    pub fn add_cooccurrence(&mut self, a: TermId, b: TermId) -> bool {
        if a == b {
            return false;
        }
        self.bump_cooccurrence(a, b);
        self.bump_cooccurrence(b, a);
        true
    }

    fn bump_cooccurrence(&mut self, holder: TermId, partner: TermId) {
        let partner_name = self.terms[partner.0].name.clone();
        self.terms[holder.0]
            .cooccurrences
            .entry(partner_name)
            .and_modify(|rel| rel.count += 1)
            .or_insert_with(|| CooccurrenceRelation::new(holder, partner));
    }

    /// The co-occurrence relation held by `holder` for `partner`
    pub fn cooccurrence(&self, holder: TermId, partner: TermId) -> Option<&CooccurrenceRelation> {
        self.terms[holder.0]
            .cooccurrences
            .get(&self.terms[partner.0].name)
    }

    /// Remove the edge between `a` and `b` from both endpoints
    pub fn remove_cooccurrence(&mut self, a: TermId, b: TermId) -> bool {
        let name_a = self.terms[a.0].name.clone();
        let name_b = self.terms[b.0].name.clone();
        let removed_a = self.terms[a.0].cooccurrences.remove(&name_b).is_some();
        let removed_b = self.terms[b.0].cooccurrences.remove(&name_a).is_some();
        removed_a || removed_b
    }

    /// Number of undirected co-occurrence edges
    pub fn cooccurrence_edge_count(&self) -> usize {
        let held: usize = self.terms.iter().map(|t| t.cooccurrences.len()).sum();
        held / 2
    }

    // ------------------------------------------------------------------------
    // Term relations
    // ------------------------------------------------------------------------

    /// Store a term relation and reference it from both endpoints
    pub fn add_term_relation(&mut self, relation: TermRelation) -> TermRelationId {
        let id = TermRelationId(self.relations.len());
        let (source, target) = (relation.source, relation.target);
        self.relations.push(relation);
        self.terms[source.0].term_relations.push(id);
        if target != source {
            self.terms[target.0].term_relations.push(id);
        }
        id
    }

    pub fn term_relation(&self, id: TermRelationId) -> &TermRelation {
        &self.relations[id.0]
    }

    pub fn term_relations(&self) -> &[TermRelation] {
        &self.relations
    }

    /// Relations of a term, deduplicated by signature and sorted by predicate
    pub fn unique_term_relations(&self, id: TermId) -> Vec<&TermRelation> {
        let mut relations: Vec<&TermRelation> = self.terms[id.0]
            .term_relations
            .iter()
            .map(|rid| self.term_relation(*rid))
            .collect();
        relations.sort_by(|a, b| a.predicate.cmp(&b.predicate));

        let mut seen = HashSet::new();
        relations.retain(|rel| seen.insert(rel.signature()));
        relations
    }
}
