//! Registry loader
//!
//! Turns parsed term and role records into registry entries.

use serde::{Deserialize, Serialize};
use taxo_core::{ImportConfig, Term, TermRegistry};
use taxo_parser::{RoleRecord, TermRecord};
use tracing::{debug, info};

/// Result of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    /// Records accepted
    pub imported: usize,

    /// Records rejected by a threshold, or roles for unknown terms
    pub skipped: usize,
}

impl LoadResult {
    pub fn is_empty(&self) -> bool {
        self.imported == 0
    }

    pub fn total(&self) -> usize {
        self.imported + self.skipped
    }
}

/// Whether a term record passes the import thresholds
pub fn accepts(record: &TermRecord, config: &ImportConfig) -> bool {
    record.score >= config.min_score && record.count >= config.min_count
}

/// Register every term record that passes the thresholds
pub fn import_terms<I>(registry: &mut TermRegistry, records: I, config: &ImportConfig) -> LoadResult
where
    I: IntoIterator<Item = TermRecord>,
{
    let mut result = LoadResult::default();
    for record in records {
        if accepts(&record, config) {
            registry.insert(Term::new(record.term, record.score, record.count));
            result.imported += 1;
        } else {
            result.skipped += 1;
        }
    }

    info!(
        "Imported {} terms (min_score={}, min_count={}), {} below threshold",
        result.imported, config.min_score, config.min_count, result.skipped
    );
    result
}

/// Attach roles to registered terms; roles for unknown terms are ignored
pub fn import_roles<I>(registry: &mut TermRegistry, records: I) -> LoadResult
where
    I: IntoIterator<Item = RoleRecord>,
{
    let mut result = LoadResult::default();
    for record in records {
        match registry.id_of(&record.term) {
            Some(id) => {
                registry.get_mut(id).role = Some(record.role);
                result.imported += 1;
            }
            None => {
                debug!("No term for role record '{}'", record.term);
                result.skipped += 1;
            }
        }
    }

    info!("Assigned {} roles", result.imported);
    result
}
