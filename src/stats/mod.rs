//! Statistical testing of candidate concept pairs
//!
//! Every surviving candidate pair is summarized as a 2×2
//! [`ContingencyTable`] over the shared gene universe of the two resources
//! and handed to an [`AssociationTest`]. The crate ships
//! [`FisherExact`](crate::stats::fisher::FisherExact); callers can inject
//! any other test through the trait.

use std::fmt::Display;

use crate::resource::Concept;

mod fisher;

pub use fisher::{Alternative, FisherExact};

/// A statistical test producing a p-value from a 2×2 contingency table
///
/// Implementations must be deterministic: the same table must always
/// produce the same p-value, independent of how the candidate pair was
/// generated.
pub trait AssociationTest: Sync {
    /// The probability of an overlap at least as extreme as the observed
    /// one under the null hypothesis of independence
    fn pvalue(&self, table: &ContingencyTable) -> f64;
}

/// Gene counts of a candidate pair over the shared gene universe
///
/// The universe is the union of the genes directly observed by the two
/// resources, not the whole genome, so the test is conditioned on what
/// the resources can actually annotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContingencyTable {
    both: u64,
    antecedent_only: u64,
    consequent_only: u64,
    neither: u64,
}

impl ContingencyTable {
    /// Builds the table from the set sizes candidate generation already
    /// knows: the overlap, both concepts' gene counts and the universe
    /// size
    pub(crate) fn from_sizes(
        co_annotated: usize,
        n_antecedent: usize,
        n_consequent: usize,
        universe: usize,
    ) -> Self {
        debug_assert!(co_annotated <= n_antecedent && co_annotated <= n_consequent);
        debug_assert!(n_antecedent + n_consequent - co_annotated <= universe);
        Self {
            both: co_annotated as u64,
            antecedent_only: (n_antecedent - co_annotated) as u64,
            consequent_only: (n_consequent - co_annotated) as u64,
            neither: (universe + co_annotated - n_antecedent - n_consequent) as u64,
        }
    }

    /// Genes annotated to both concepts
    pub fn both(&self) -> u64 {
        self.both
    }

    /// Genes annotated to the antecedent concept only
    pub fn antecedent_only(&self) -> u64 {
        self.antecedent_only
    }

    /// Genes annotated to the consequent concept only
    pub fn consequent_only(&self) -> u64 {
        self.consequent_only
    }

    /// Genes of the universe annotated to neither concept
    pub fn neither(&self) -> u64 {
        self.neither
    }

    /// The size of the shared gene universe
    pub fn population(&self) -> u64 {
        self.both + self.antecedent_only + self.consequent_only + self.neither
    }

    /// Genes annotated to the antecedent concept
    pub fn antecedent_total(&self) -> u64 {
        self.both + self.antecedent_only
    }

    /// Genes annotated to the consequent concept
    pub fn consequent_total(&self) -> u64 {
        self.both + self.consequent_only
    }
}

/// Identity of a concept, detached from its resource
///
/// Associations are handed to external reporting collaborators, so they
/// carry owned copies of the resource label, the concept id and its
/// human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConceptRef {
    resource: String,
    id: String,
    name: String,
}

impl ConceptRef {
    pub(crate) fn from_concept(concept: &Concept) -> Self {
        Self {
            resource: concept.resource().to_string(),
            id: concept.id().to_string(),
            name: concept.name().to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(resource: &str, id: &str, name: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// The label of the resource the concept belongs to
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The concept id within its resource
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human-readable label of the concept
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ConceptRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource, self.id)
    }
}

/// A tested association between an antecedent and a consequent concept
///
/// The statistical test itself is symmetric; the antecedent/consequent
/// roles record which resource was queried and which one explains it.
#[derive(Debug, Clone)]
pub struct Association {
    antecedent: ConceptRef,
    consequent: ConceptRef,
    table: ContingencyTable,
    pvalue: f64,
    significant: bool,
}

impl Association {
    pub(crate) fn new(
        antecedent: ConceptRef,
        consequent: ConceptRef,
        table: ContingencyTable,
        pvalue: f64,
        significant: bool,
    ) -> Self {
        Self {
            antecedent,
            consequent,
            table,
            pvalue,
            significant,
        }
    }

    /// The queried concept (e.g. a geneset)
    pub fn antecedent(&self) -> &ConceptRef {
        &self.antecedent
    }

    /// The concept associated with the antecedent
    pub fn consequent(&self) -> &ConceptRef {
        &self.consequent
    }

    /// The number of genes annotated to both concepts
    pub fn n_genes(&self) -> u64 {
        self.table.both()
    }

    /// The contingency table the p-value was computed from
    pub fn table(&self) -> &ContingencyTable {
        &self.table
    }

    /// The p-value of the association
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// Whether the association met both significance thresholds
    pub fn is_significant(&self) -> bool {
        self.significant
    }
}

/// Diagnostic trace of one antecedent → consequent testing step
///
/// Records how many pairs survived each stage of the pipeline. With
/// heuristic pruning enabled, `generated` counts only the pairs whose
/// co-annotation count was actually computed, so the difference to the
/// exhaustive cross product measures what the pruning saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationCounts {
    consequent: String,
    generated: usize,
    co_annotated: usize,
    significant: usize,
}

impl AssociationCounts {
    pub(crate) fn new(
        consequent: &str,
        generated: usize,
        co_annotated: usize,
        significant: usize,
    ) -> Self {
        Self {
            consequent: consequent.to_string(),
            generated,
            co_annotated,
            significant,
        }
    }

    pub(crate) fn empty(consequent: &str) -> Self {
        Self::new(consequent, 0, 0, 0)
    }

    /// The label of the consequent resource of this testing step
    pub fn consequent(&self) -> &str {
        &self.consequent
    }

    /// Pairs whose co-annotation count was computed
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// Pairs meeting the minimum co-annotation count
    pub fn co_annotated(&self) -> usize {
        self.co_annotated
    }

    /// Pairs also meeting the p-value threshold
    pub fn significant(&self) -> usize {
        self.significant
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_margins() {
        let table = ContingencyTable::from_sizes(6, 10, 10, 20);
        assert_eq!(table.both(), 6);
        assert_eq!(table.antecedent_only(), 4);
        assert_eq!(table.consequent_only(), 4);
        assert_eq!(table.neither(), 6);
        assert_eq!(table.population(), 20);
        assert_eq!(table.antecedent_total(), 10);
        assert_eq!(table.consequent_total(), 10);
    }

    #[test]
    fn table_without_overlap() {
        let table = ContingencyTable::from_sizes(0, 3, 4, 10);
        assert_eq!(table.both(), 0);
        assert_eq!(table.neither(), 3);
        assert_eq!(table.population(), 10);
    }
}
