//! Intrinsic and extrinsic information content of concepts
//!
//! Two independent specificity scores. [`IntrinsicIc`] is purely
//! structural: a concept deep in the hierarchy with few leaf descendants
//! is more specific than a shallow one subsuming half the resource.
//! [`ExtrinsicIc`] is empirical: a concept that turns up in the results of
//! most antecedent groups of an analysis carries little information, a
//! rare one carries a lot.

use std::collections::{HashMap, HashSet};

use crate::resource::{ConceptIdx, Resource, ResourceSet};
use crate::stats::Association;
use crate::{OntolinkError, OntolinkResult};

/// Structure-based information content of every concept of one resource
///
/// `IIC(t) = -log2(((leaves(t) / subsumers(t)) + 1) / (max_leaves + 1))`
/// where `leaves(t)` counts the terminal descendants of `t` (a childless
/// concept counts itself), `subsumers(t)` counts the ancestors of `t`
/// including `t`, and `max_leaves` counts the terminal concepts of the
/// whole resource (Sánchez et al., Knowledge-Based Systems 2011).
///
/// Scores grow with depth: a concept is expected to score at least as
/// high as any of its ancestors. With multiple parents this is a property
/// of well-formed hierarchies rather than a guarantee of the formula, so
/// it is not enforced.
#[derive(Debug)]
pub struct IntrinsicIc {
    scores: HashMap<String, f32>,
    max: f32,
}

impl IntrinsicIc {
    /// Computes the intrinsic information content of every concept
    pub fn for_resource(resource: &Resource) -> IntrinsicIc {
        let n = resource.len();

        // terminal descendants, collected leaves first so every concept
        // is final before its parents consume it
        let mut leaf_sets: Vec<HashSet<ConceptIdx>> = vec![HashSet::new(); n];
        for &idx in resource.topo() {
            let internal = resource.internal(idx);
            if internal.is_leaf() {
                leaf_sets[idx.to_usize()].insert(idx);
            } else {
                let mut leaves = HashSet::new();
                for child in internal.children() {
                    leaves.extend(leaf_sets[child.to_usize()].iter().copied());
                }
                leaf_sets[idx.to_usize()] = leaves;
            }
        }

        // subsumers, collected top-down so every parent is final first
        let mut subsumer_sets: Vec<HashSet<ConceptIdx>> = vec![HashSet::new(); n];
        for &idx in resource.topo().iter().rev() {
            let mut subsumers = HashSet::new();
            subsumers.insert(idx);
            for parent in resource.internal(idx).parents() {
                subsumers.extend(subsumer_sets[parent.to_usize()].iter().copied());
            }
            subsumer_sets[idx.to_usize()] = subsumers;
        }

        let max_leaves = resource.n_leaves() as f32;
        let mut scores = HashMap::with_capacity(n);
        let mut max = 0.0f32;
        for concept in resource.concepts() {
            let i = concept.idx().to_usize();
            let leaves = leaf_sets[i].len() as f32;
            let subsumers = subsumer_sets[i].len() as f32;
            let iic = -(((leaves / subsumers) + 1.0) / (max_leaves + 1.0)).log2();
            max = max.max(iic);
            scores.insert(concept.id().to_string(), iic);
        }

        IntrinsicIc { scores, max }
    }

    /// The intrinsic information content of a concept
    pub fn get(&self, concept: &str) -> Option<f32> {
        self.scores.get(concept).copied()
    }

    /// The information content scaled by the resource's maximum, `0..=1`
    pub fn normalized(&self, concept: &str) -> Option<f32> {
        if self.max == 0.0 {
            return self.get(concept);
        }
        self.get(concept).map(|iic| iic / self.max)
    }
}

/// Frequency-based information content over an association corpus
///
/// `EIC(t) = -log2(p(t))` where `p(t)` is the fraction of antecedent
/// groups whose significant consequents (extended to their full ancestor
/// lineage) contain `t` (Resnik, 1995). Built once from a slice of
/// discovered associations; querying a concept that never occurs in the
/// corpus is an error, since `-log2(0)` is undefined.
#[derive(Debug)]
pub struct ExtrinsicIc {
    scores: HashMap<String, HashMap<String, f32>>,
}

impl ExtrinsicIc {
    /// Tallies concept occurrences across the associations and derives
    /// the per-concept scores
    ///
    /// # Errors
    ///
    /// Returns [`OntolinkError::UnknownResource`]/[`OntolinkError::UnknownConcept`]
    /// if an association references a resource or concept not present in
    /// `resources`
    pub fn from_associations(
        associations: &[Association],
        resources: &ResourceSet,
    ) -> OntolinkResult<ExtrinsicIc> {
        // per consequent resource: antecedent group -> ancestor-closed
        // set of its significant consequents
        let mut corpora: HashMap<&str, HashMap<String, HashSet<ConceptIdx>>> = HashMap::new();
        for association in associations {
            let label = association.consequent().resource();
            let resource = resources
                .resource(label)
                .ok_or_else(|| OntolinkError::UnknownResource(label.to_string()))?;
            let concept = resource
                .concept(association.consequent().id())
                .ok_or_else(|| {
                    OntolinkError::UnknownConcept(association.consequent().to_string())
                })?;
            let mut lineage = resource.ancestors_of(concept.idx());
            lineage.insert(concept.idx());
            corpora
                .entry(label)
                .or_default()
                .entry(association.antecedent().to_string())
                .or_default()
                .extend(lineage);
        }

        let mut scores: HashMap<String, HashMap<String, f32>> = HashMap::new();
        for (label, groups) in corpora {
            let resource = resources
                .resource(label)
                .expect("resource presence was checked while tallying");
            let n_groups = groups.len() as f32;
            let mut counts: HashMap<ConceptIdx, usize> = HashMap::new();
            for lineage in groups.values() {
                for idx in lineage {
                    *counts.entry(*idx).or_default() += 1;
                }
            }
            let per_concept = scores.entry(label.to_string()).or_default();
            for (idx, count) in counts {
                let frequency = count as f32 / n_groups;
                per_concept.insert(
                    resource.concept_at(idx).id().to_string(),
                    -frequency.log2(),
                );
            }
        }

        Ok(ExtrinsicIc { scores })
    }

    /// The extrinsic information content of a concept
    ///
    /// # Errors
    ///
    /// Returns [`OntolinkError::UndefinedFrequency`] for a concept absent
    /// from the corpus
    pub fn get(&self, resource: &str, concept: &str) -> OntolinkResult<f32> {
        self.scores
            .get(resource)
            .and_then(|per_concept| per_concept.get(concept))
            .copied()
            .ok_or_else(|| OntolinkError::UndefinedFrequency(format!("{resource}:{concept}")))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet as StdHashSet;

    use super::*;
    use crate::params::Parameters;
    use crate::resource::{ResourceSet, ResourceTables};
    use crate::stats::{ConceptRef, ContingencyTable};

    fn set(items: &[&str]) -> StdHashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn chain_resource() -> ResourceSet {
        let params = Parameters::default();
        let mut resources = ResourceSet::new();
        let mut tables = ResourceTables::default();
        tables.hierarchy.insert("c2".into(), set(&["c1"]));
        tables.hierarchy.insert("c3".into(), set(&["c2"]));
        tables.annotations.insert("g1".into(), set(&["c3"]));
        resources.insert("KB", tables, &params).unwrap();
        resources
    }

    #[test]
    fn leaf_is_more_informative_than_root() {
        let resources = chain_resource();
        let resource = resources.resource("KB").unwrap();
        let iic = IntrinsicIc::for_resource(resource);

        // one leaf in total: leaves(c1) = 1, subsumers(c1) = 1 -> iic 0
        let root = iic.get("c1").unwrap();
        assert!(root.abs() < 1e-6);

        // leaves(c3) = 1, subsumers(c3) = 3:
        // -log2((1/3 + 1) / 2) = log2(3/2)
        let leaf = iic.get("c3").unwrap();
        assert!((leaf - 1.5f32.log2()).abs() < 1e-6);
        assert!(leaf > root);

        // monotone along the chain
        let mid = iic.get("c2").unwrap();
        assert!(root <= mid && mid <= leaf);

        // the deepest concept carries the maximum
        assert!((iic.normalized("c3").unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_concept_has_no_iic() {
        let resources = chain_resource();
        let iic = IntrinsicIc::for_resource(resources.resource("KB").unwrap());
        assert!(iic.get("c9").is_none());
    }

    fn association(antecedent: &str, consequent: &str) -> Association {
        Association::new(
            ConceptRef::for_tests("CLU", antecedent, antecedent),
            ConceptRef::for_tests("KB", consequent, consequent),
            ContingencyTable::from_sizes(5, 10, 10, 20),
            0.01,
            true,
        )
    }

    #[test]
    fn corpus_frequencies() {
        let resources = chain_resource();
        let associations = vec![association("a", "c3"), association("b", "c2")];
        let eic = ExtrinsicIc::from_associations(&associations, &resources).unwrap();

        // c3's lineage covers group a only: p = 1/2
        assert!((eic.get("KB", "c3").unwrap() - 1.0).abs() < 1e-6);
        // c2 and c1 are in both lineages: p = 1
        assert!(eic.get("KB", "c2").unwrap().abs() < 1e-6);
        assert!(eic.get("KB", "c1").unwrap().abs() < 1e-6);
    }

    #[test]
    fn absent_concept_is_an_error() {
        let resources = chain_resource();
        let associations = vec![association("a", "c2")];
        let eic = ExtrinsicIc::from_associations(&associations, &resources).unwrap();

        // c3 is below c2 and never occurs in any lineage
        assert_eq!(
            eic.get("KB", "c3").unwrap_err(),
            OntolinkError::UndefinedFrequency("KB:c3".to_string())
        );
        assert!(matches!(
            eic.get("OTHER", "c1").unwrap_err(),
            OntolinkError::UndefinedFrequency(_)
        ));
    }

    #[test]
    fn unknown_references_fail_the_setup() {
        let resources = chain_resource();
        let missing_resource = vec![Association::new(
            ConceptRef::for_tests("CLU", "a", "a"),
            ConceptRef::for_tests("NOPE", "c1", "c1"),
            ContingencyTable::from_sizes(5, 10, 10, 20),
            0.01,
            true,
        )];
        assert_eq!(
            ExtrinsicIc::from_associations(&missing_resource, &resources).unwrap_err(),
            OntolinkError::UnknownResource("NOPE".to_string())
        );
    }
}
