//! Candidate-pair generation
//!
//! Enumerates the (antecedent concept, consequent concept) pairs worth
//! testing. Exhaustive mode checks the full cross product. Heuristic mode
//! walks both hierarchies top-down and prunes a subtree the first time a
//! pair misses the minimum co-annotation count: propagated gene sets only
//! shrink towards the leaves, so no descendant of a failing pair can reach
//! the threshold. Both modes produce the same surviving pairs; heuristic
//! mode merely skips computing counts it can already bound.

use rayon::prelude::*;

use crate::resource::{ConceptIdx, Resource};
use crate::stats::ContingencyTable;

/// A concept pair meeting the minimum co-annotation count
pub(crate) struct Candidate {
    pub antecedent: ConceptIdx,
    pub consequent: ConceptIdx,
    pub table: ContingencyTable,
}

/// The surviving candidates plus how many pairs were checked to find them
pub(crate) struct CandidateSet {
    pub candidates: Vec<Candidate>,
    /// Number of pairs whose co-annotation count was computed
    pub generated: usize,
}

/// Checks every concept pair of the cross product
///
/// Pairs are independent, so the antecedent side is swept in parallel.
pub(crate) fn exhaustive(
    antecedent: &Resource,
    consequent: &Resource,
    threshold: usize,
) -> CandidateSet {
    let universe = (antecedent.genes() | consequent.genes()).len();
    let candidates: Vec<Candidate> = (0..antecedent.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let a_idx = antecedent.idx_at(i);
            let a_genes = antecedent.internal(a_idx).genes();
            (0..consequent.len()).filter_map(move |j| {
                let c_idx = consequent.idx_at(j);
                let c_genes = consequent.internal(c_idx).genes();
                let co_annotated = a_genes.count_common(c_genes);
                (co_annotated >= threshold).then(|| Candidate {
                    antecedent: a_idx,
                    consequent: c_idx,
                    table: ContingencyTable::from_sizes(
                        co_annotated,
                        a_genes.len(),
                        c_genes.len(),
                        universe,
                    ),
                })
            })
        })
        .collect();
    CandidateSet {
        candidates,
        generated: antecedent.len() * consequent.len(),
    }
}

/// Walks both hierarchies top-down, pruning subtrees that cannot reach the
/// threshold
///
/// The first check of every antecedent concept is against the consequent
/// root, whose propagated gene set is the consequent's entire gene
/// universe. If even that pair misses the threshold, no pair involving the
/// antecedent concept or any of its descendants can pass, and the whole
/// antecedent subtree is skipped. Concepts must be visited top-down within
/// a branch for the cutoff to be valid, so the traversal is sequential.
pub(crate) fn pruned(antecedent: &Resource, consequent: &Resource, threshold: usize) -> CandidateSet {
    let universe = (antecedent.genes() | consequent.genes()).len();
    let c_root = consequent.root_idx();
    let c_root_genes = consequent.internal(c_root).genes();

    let mut candidates = Vec::new();
    let mut generated = 0usize;

    let mut a_visited = vec![false; antecedent.len()];
    let mut a_stack = vec![antecedent.root_idx()];
    while let Some(a_idx) = a_stack.pop() {
        if std::mem::replace(&mut a_visited[a_idx.to_usize()], true) {
            continue;
        }
        let a_internal = antecedent.internal(a_idx);
        let a_genes = a_internal.genes();

        generated += 1;
        let co_root = a_genes.count_common(c_root_genes);
        if co_root < threshold {
            continue;
        }
        candidates.push(Candidate {
            antecedent: a_idx,
            consequent: c_root,
            table: ContingencyTable::from_sizes(
                co_root,
                a_genes.len(),
                c_root_genes.len(),
                universe,
            ),
        });

        let mut c_visited = vec![false; consequent.len()];
        c_visited[c_root.to_usize()] = true;
        let mut c_stack = consequent.internal(c_root).children().to_vec();
        while let Some(c_idx) = c_stack.pop() {
            if std::mem::replace(&mut c_visited[c_idx.to_usize()], true) {
                continue;
            }
            let c_internal = consequent.internal(c_idx);
            let c_genes = c_internal.genes();

            generated += 1;
            let co_annotated = a_genes.count_common(c_genes);
            if co_annotated < threshold {
                continue;
            }
            candidates.push(Candidate {
                antecedent: a_idx,
                consequent: c_idx,
                table: ContingencyTable::from_sizes(
                    co_annotated,
                    a_genes.len(),
                    c_genes.len(),
                    universe,
                ),
            });
            c_stack.extend(c_internal.children().iter().copied());
        }

        a_stack.extend(a_internal.children().iter().copied());
    }

    CandidateSet {
        candidates,
        generated,
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::params::Parameters;
    use crate::resource::{ResourceSet, ResourceTables};

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Two resources over 12 genes with three-level hierarchies
    fn fixtures() -> ResourceSet {
        let params = Parameters::default();
        let mut resources = ResourceSet::new();

        let mut a = ResourceTables::default();
        for (gene, concepts) in [
            ("g1", vec!["a2"]),
            ("g2", vec!["a2", "a4"]),
            ("g3", vec!["a4"]),
            ("g4", vec!["a3"]),
            ("g5", vec!["a3"]),
            ("g6", vec!["a1"]),
            ("g7", vec!["a3", "a4"]),
            ("g8", vec!["a2"]),
        ] {
            a.annotations
                .insert(gene.to_string(), concepts.iter().map(|c| c.to_string()).collect());
        }
        a.hierarchy.insert("a2".into(), set(&["a1"]));
        a.hierarchy.insert("a3".into(), set(&["a1"]));
        a.hierarchy.insert("a4".into(), set(&["a2", "a3"]));
        resources.insert("A", a, &params).unwrap();

        let mut c = ResourceTables::default();
        for (gene, concepts) in [
            ("g1", vec!["c2"]),
            ("g2", vec!["c3"]),
            ("g3", vec!["c3"]),
            ("g4", vec!["c4"]),
            ("g7", vec!["c2", "c4"]),
            ("g9", vec!["c1"]),
            ("g10", vec!["c4"]),
            ("g11", vec!["c2"]),
            ("g12", vec!["c3"]),
        ] {
            c.annotations
                .insert(gene.to_string(), concepts.iter().map(|c| c.to_string()).collect());
        }
        c.hierarchy.insert("c2".into(), set(&["c1"]));
        c.hierarchy.insert("c3".into(), set(&["c2"]));
        c.hierarchy.insert("c4".into(), set(&["c1"]));
        resources.insert("C", c, &params).unwrap();

        resources
    }

    fn pair_ids(resource_a: &Resource, resource_c: &Resource, set: &CandidateSet) -> Vec<(String, String, u64)> {
        let mut ids: Vec<(String, String, u64)> = set
            .candidates
            .iter()
            .map(|cand| {
                (
                    resource_a.concept_at(cand.antecedent).id().to_string(),
                    resource_c.concept_at(cand.consequent).id().to_string(),
                    cand.table.both(),
                )
            })
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn heuristic_equals_exhaustive() {
        let resources = fixtures();
        let a = resources.resource("A").unwrap();
        let c = resources.resource("C").unwrap();

        for threshold in 0..=5 {
            let full = exhaustive(a, c, threshold);
            let cut = pruned(a, c, threshold);
            assert_eq!(
                pair_ids(a, c, &full),
                pair_ids(a, c, &cut),
                "candidate sets diverge at threshold {threshold}"
            );
            assert!(cut.generated <= full.generated);
        }
    }

    #[test]
    fn pruning_skips_pair_checks() {
        let resources = fixtures();
        let a = resources.resource("A").unwrap();
        let c = resources.resource("C").unwrap();

        let full = exhaustive(a, c, 4);
        let cut = pruned(a, c, 4);
        assert_eq!(full.generated, a.len() * c.len());
        assert!(cut.generated < full.generated);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let resources = fixtures();
        let a = resources.resource("A").unwrap();
        let c = resources.resource("C").unwrap();

        // a4 and c3 share exactly {g2, g3}
        let at_boundary = pair_ids(a, c, &exhaustive(a, c, 2));
        assert!(at_boundary
            .iter()
            .any(|(a_id, c_id, n)| a_id == "a4" && c_id == "c3" && *n == 2));

        let above_boundary = pair_ids(a, c, &exhaustive(a, c, 3));
        assert!(!above_boundary
            .iter()
            .any(|(a_id, c_id, _)| a_id == "a4" && c_id == "c3"));
    }

    #[test]
    fn zero_threshold_yields_full_cross_product() {
        let resources = fixtures();
        let a = resources.resource("A").unwrap();
        let c = resources.resource("C").unwrap();

        let full = exhaustive(a, c, 0);
        let cut = pruned(a, c, 0);
        assert_eq!(full.candidates.len(), a.len() * c.len());
        assert_eq!(cut.candidates.len(), a.len() * c.len());
    }

    #[test]
    fn universe_is_the_union_of_observed_genes() {
        let resources = fixtures();
        let a = resources.resource("A").unwrap();
        let c = resources.resource("C").unwrap();

        let full = exhaustive(a, c, 0);
        // genes g1..g12 are observed across the two resources
        assert!(full
            .candidates
            .iter()
            .all(|cand| cand.table.population() == 12));
    }
}
