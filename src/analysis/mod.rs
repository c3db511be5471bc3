//! The enrichment analysis entry point
//!
//! An [`Analysis`] borrows a [`ResourceSet`] and a [`Parameters`] value
//! and runs the full pipeline for one antecedent resource against any
//! number of consequent resources: candidate generation (optionally
//! pruned), Fisher's exact testing, and word scoring over the retained
//! associations. The analysis is a single-shot batch transform; it holds
//! no state between runs.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::annotations::GeneId;
use crate::params::Parameters;
use crate::resource::{Resource, ResourceSet};
use crate::stats::{
    Association, AssociationCounts, AssociationTest, ConceptRef, FisherExact,
};
use crate::words::{self, WordScore};
use crate::{OntolinkError, OntolinkResult};

mod candidates;

/// Number of direct and inherited annotations of one gene in one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationCount {
    gene: String,
    resource: String,
    n_annotations: usize,
}

impl AnnotationCount {
    /// The gene identifier, in the namespace selected by the parameters
    pub fn gene(&self) -> &str {
        &self.gene
    }

    /// The label of the resource annotating the gene
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The number of concepts annotating the gene, directly or through
    /// a descendant
    pub fn n_annotations(&self) -> usize {
        self.n_annotations
    }
}

/// The four result relations of an analysis run
///
/// Handed to external reporting and export collaborators; the engine
/// keeps nothing.
#[derive(Debug)]
pub struct AnalysisResults {
    /// Direct+inherited annotation counts per gene per resource
    pub annotation_counts: Vec<AnnotationCount>,
    /// Diagnostic pipeline trace, one row per consequent resource
    pub association_counts: Vec<AssociationCounts>,
    /// The significant associations, ordered by ascending p-value
    pub associations: Vec<Association>,
    /// Word salience per antecedent concept
    pub word_scores: Vec<WordScore>,
}

/// A configured enrichment analysis over a pool of resources
///
/// The statistical test is a type parameter and defaults to
/// [`FisherExact`]; [`Analysis::with_test`] injects any other
/// [`AssociationTest`].
pub struct Analysis<'a, T = FisherExact> {
    resources: &'a ResourceSet,
    params: &'a Parameters,
    test: T,
}

impl<'a> Analysis<'a, FisherExact> {
    /// Configures an analysis with the default one-sided Fisher's exact
    /// test
    pub fn new(resources: &'a ResourceSet, params: &'a Parameters) -> Self {
        Self::with_test(resources, params, FisherExact::new())
    }
}

impl<'a, T: AssociationTest> Analysis<'a, T> {
    /// Configures an analysis with a custom statistical test
    pub fn with_test(resources: &'a ResourceSet, params: &'a Parameters, test: T) -> Self {
        Self {
            resources,
            params,
            test,
        }
    }

    /// Runs the analysis of one antecedent resource against the given
    /// consequent resources
    ///
    /// A consequent without any gene overlap yields zero associations and
    /// a zeroed counter row; it is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`OntolinkError::UnknownResource`] if `antecedent` or any
    /// consequent label is not part of the resource set
    pub fn run(&self, antecedent: &str, consequents: &[&str]) -> OntolinkResult<AnalysisResults> {
        let antecedent_resource = self.lookup(antecedent)?;
        let consequent_resources = consequents
            .iter()
            .map(|label| self.lookup(label))
            .collect::<OntolinkResult<Vec<_>>>()?;

        let mut counted: Vec<&Resource> = vec![antecedent_resource];
        counted.extend(consequent_resources.iter().copied());
        let annotation_counts = self.annotation_counts(&counted);

        let mut associations = Vec::new();
        let mut association_counts = Vec::new();
        for consequent_resource in consequent_resources {
            info!(
                "testing {} -> {}",
                antecedent_resource.label(),
                consequent_resource.label()
            );
            let overlap = antecedent_resource
                .genes()
                .count_common(consequent_resource.genes());
            if overlap == 0 {
                debug!(
                    "no shared genes between {} and {}",
                    antecedent_resource.label(),
                    consequent_resource.label()
                );
                association_counts
                    .push(AssociationCounts::empty(consequent_resource.label()));
                continue;
            }

            let candidates = if self.params.use_heuristic() {
                candidates::pruned(
                    antecedent_resource,
                    consequent_resource,
                    self.params.n_genes_threshold(),
                )
            } else {
                candidates::exhaustive(
                    antecedent_resource,
                    consequent_resource,
                    self.params.n_genes_threshold(),
                )
            };
            let co_annotated = candidates.candidates.len();

            let significant: Vec<Association> = candidates
                .candidates
                .par_iter()
                .filter_map(|candidate| {
                    let pvalue = self.test.pvalue(&candidate.table);
                    let significant = candidate.table.both()
                        >= self.params.n_genes_threshold() as u64
                        && pvalue <= self.params.pvalue_threshold();
                    significant.then(|| {
                        Association::new(
                            ConceptRef::from_concept(
                                &antecedent_resource.concept_at(candidate.antecedent),
                            ),
                            ConceptRef::from_concept(
                                &consequent_resource.concept_at(candidate.consequent),
                            ),
                            candidate.table,
                            pvalue,
                            true,
                        )
                    })
                })
                .collect();

            debug!(
                "{} -> {}: {} pairs checked, {} co-annotated, {} significant",
                antecedent_resource.label(),
                consequent_resource.label(),
                candidates.generated,
                co_annotated,
                significant.len()
            );
            association_counts.push(AssociationCounts::new(
                consequent_resource.label(),
                candidates.generated,
                co_annotated,
                significant.len(),
            ));
            associations.extend(significant);
        }

        associations.sort_by(|a, b| {
            a.pvalue()
                .total_cmp(&b.pvalue())
                .then_with(|| a.antecedent().id().cmp(b.antecedent().id()))
                .then_with(|| a.consequent().id().cmp(b.consequent().id()))
        });

        let word_scores = words::word_scores(&associations, self.resources, self.params);

        Ok(AnalysisResults {
            annotation_counts,
            association_counts,
            associations,
            word_scores,
        })
    }

    fn lookup(&self, label: &str) -> OntolinkResult<&'a Resource> {
        self.resources
            .resource(label)
            .ok_or_else(|| OntolinkError::UnknownResource(label.to_string()))
    }

    /// One row per annotated gene per resource, sorted by gene for
    /// stable output
    fn annotation_counts(&self, resources: &[&Resource]) -> Vec<AnnotationCount> {
        let index = self.resources.genes();
        let mut rows = Vec::new();
        for resource in resources {
            let mut counts: HashMap<GeneId, usize> = HashMap::new();
            for concept in resource.concepts() {
                for gene in concept.genes().iter() {
                    *counts.entry(gene).or_default() += 1;
                }
            }
            let mut per_gene: Vec<(GeneId, usize)> = counts.into_iter().collect();
            per_gene.sort_by(|a, b| index.name(a.0).cmp(index.name(b.0)));
            rows.extend(per_gene.into_iter().map(|(gene, n_annotations)| {
                AnnotationCount {
                    gene: index.name(gene).to_string(),
                    resource: resource.label().to_string(),
                    n_annotations,
                }
            }));
        }
        rows
    }
}

#[cfg(test)]
mod test {
    use std::collections::{HashMap as StdHashMap, HashSet};

    use super::*;
    use crate::resource::ResourceTables;
    use crate::stats::ContingencyTable;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn gene(i: usize) -> String {
        format!("g{i:02}")
    }

    /// The worked example: antecedent geneset {g1..g10}, consequent
    /// concept annotating {g5..g14}, 20 genes observed in total
    fn fixtures(params: &Parameters) -> ResourceSet {
        let mut resources = ResourceSet::new();

        let mut genesets = StdHashMap::new();
        genesets.insert(
            "all".to_string(),
            (1..=20).map(gene).collect::<HashSet<String>>(),
        );
        genesets.insert(
            "A".to_string(),
            (1..=10).map(gene).collect::<HashSet<String>>(),
        );
        let mut hierarchy = StdHashMap::new();
        hierarchy.insert("A".to_string(), set(&["all"]));
        resources
            .insert_genesets("CLU", genesets, hierarchy, params)
            .unwrap();

        let mut tables = ResourceTables::default();
        for i in 5..=14 {
            tables.annotations.insert(gene(i), set(&["KB:2"]));
        }
        tables.hierarchy.insert("KB:2".into(), set(&["KB:1"]));
        tables
            .translations
            .insert("KB:1".into(), "everything".into());
        tables
            .translations
            .insert("KB:2".into(), "immune response".into());
        resources.insert("KB", tables, params).unwrap();

        resources
    }

    #[test]
    fn worked_example_is_deterministic() {
        let params = Parameters::new(5, 0.4).unwrap();
        let resources = fixtures(&params);
        let analysis = Analysis::new(&resources, &params);
        let results = analysis.run("CLU", &["KB"]).unwrap();

        let association = results
            .associations
            .iter()
            .find(|a| a.antecedent().id() == "A" && a.consequent().id() == "KB:2")
            .expect("the worked example association must be significant");

        assert_eq!(association.n_genes(), 6);
        assert_eq!(
            *association.table(),
            ContingencyTable::from_sizes(6, 10, 10, 20)
        );
        assert!((association.pvalue() - 60626.0 / 184756.0).abs() < 1e-9);
        assert_eq!(association.consequent().name(), "immune response");
        assert!(association.is_significant());
    }

    #[test]
    fn heuristic_and_exhaustive_agree() {
        for (n_genes, pvalue) in [(1, 1.0), (5, 0.4), (6, 0.4), (7, 1.0)] {
            let exhaustive_params = Parameters::new(n_genes, pvalue)
                .unwrap()
                .with_heuristic(false);
            let heuristic_params = Parameters::new(n_genes, pvalue).unwrap();
            let resources = fixtures(&exhaustive_params);

            let full = Analysis::new(&resources, &exhaustive_params)
                .run("CLU", &["KB"])
                .unwrap();
            let cut = Analysis::new(&resources, &heuristic_params)
                .run("CLU", &["KB"])
                .unwrap();

            let keys = |results: &AnalysisResults| {
                results
                    .associations
                    .iter()
                    .map(|a| {
                        (
                            a.antecedent().to_string(),
                            a.consequent().to_string(),
                            a.pvalue(),
                        )
                    })
                    .collect::<Vec<_>>()
            };
            assert_eq!(keys(&full), keys(&cut));
        }
    }

    #[test]
    fn pvalue_threshold_is_inclusive() {
        let find = |results: &AnalysisResults| {
            results
                .associations
                .iter()
                .find(|a| a.antecedent().id() == "A" && a.consequent().id() == "KB:2")
                .map(Association::pvalue)
        };

        // fetch the exact p-value the test produces for (A, KB:2)
        let params = Parameters::new(5, 1.0).unwrap();
        let resources = fixtures(&params);
        let observed = find(
            &Analysis::new(&resources, &params)
                .run("CLU", &["KB"])
                .unwrap(),
        )
        .expect("retained at threshold 1.0");

        // with the threshold at exactly that value the pair is retained
        let params = Parameters::new(5, observed).unwrap();
        let resources = fixtures(&params);
        let results = Analysis::new(&resources, &params)
            .run("CLU", &["KB"])
            .unwrap();
        assert!(find(&results).is_some());

        // a hair below, it is not
        let params = Parameters::new(5, observed - 1e-12).unwrap();
        let resources = fixtures(&params);
        let results = Analysis::new(&resources, &params)
            .run("CLU", &["KB"])
            .unwrap();
        assert!(find(&results).is_none());
    }

    #[test]
    fn counters_trace_the_pipeline() {
        let params = Parameters::new(5, 0.4).unwrap().with_heuristic(false);
        let resources = fixtures(&params);
        let results = Analysis::new(&resources, &params)
            .run("CLU", &["KB"])
            .unwrap();

        assert_eq!(results.association_counts.len(), 1);
        let counts = &results.association_counts[0];
        assert_eq!(counts.consequent(), "KB");
        // 2 geneset concepts x 2 knowledge-base concepts
        assert_eq!(counts.generated(), 4);
        assert_eq!(counts.co_annotated(), 4);
        assert_eq!(counts.significant(), results.associations.len());
    }

    #[test]
    fn empty_overlap_yields_zero_counters() {
        let params = Parameters::default();
        let mut resources = fixtures(&params);
        let mut tables = ResourceTables::default();
        tables
            .annotations
            .insert("unrelated".into(), set(&["X:2"]));
        tables.hierarchy.insert("X:2".into(), set(&["X:1"]));
        resources.insert("X", tables, &params).unwrap();

        let results = Analysis::new(&resources, &params)
            .run("CLU", &["X"])
            .unwrap();
        assert!(results.associations.is_empty());
        assert_eq!(
            results.association_counts,
            vec![AssociationCounts::empty("X")]
        );
    }

    #[test]
    fn unknown_resources_are_rejected() {
        let params = Parameters::default();
        let resources = fixtures(&params);
        let analysis = Analysis::new(&resources, &params);
        assert_eq!(
            analysis.run("NOPE", &["KB"]).unwrap_err(),
            OntolinkError::UnknownResource("NOPE".to_string())
        );
        assert_eq!(
            analysis.run("CLU", &["NOPE"]).unwrap_err(),
            OntolinkError::UnknownResource("NOPE".to_string())
        );
    }

    #[test]
    fn annotation_counts_cover_both_namespaces() {
        let params = Parameters::new(5, 0.4).unwrap();
        let resources = fixtures(&params);
        let results = Analysis::new(&resources, &params)
            .run("CLU", &["KB"])
            .unwrap();

        // every gene of the pool is annotated by at least the root geneset
        let clu_rows: Vec<&AnnotationCount> = results
            .annotation_counts
            .iter()
            .filter(|row| row.resource() == "CLU")
            .collect();
        assert_eq!(clu_rows.len(), 20);
        // g5 sits in both the pool's sub-geneset and the knowledge base
        let g05 = results
            .annotation_counts
            .iter()
            .find(|row| row.resource() == "CLU" && row.gene() == "g05")
            .unwrap();
        assert_eq!(g05.n_annotations(), 2);
        let g05_kb = results
            .annotation_counts
            .iter()
            .find(|row| row.resource() == "KB" && row.gene() == "g05")
            .unwrap();
        assert_eq!(g05_kb.n_annotations(), 2);
    }

    #[test]
    fn word_scores_cover_retained_associations() {
        let params = Parameters::new(5, 0.4).unwrap();
        let resources = fixtures(&params);
        let results = Analysis::new(&resources, &params)
            .run("CLU", &["KB"])
            .unwrap();

        assert!(results
            .word_scores
            .iter()
            .any(|score| score.word() == "immune"));
        // "everything" is the root label of KB and is excluded
        assert!(!results
            .word_scores
            .iter()
            .any(|score| score.word() == "everything"));
    }
}
