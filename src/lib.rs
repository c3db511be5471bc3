//! `ontolink` discovers statistically significant associations between
//! genesets and the concepts of hierarchically organized knowledge
//! resources, and between concepts across resources.
//!
//! A [`Resource`] is a knowledge base given as three relations: gene →
//! concepts (annotations), concept → parents (hierarchy) and concept →
//! human-readable label (translations). The hierarchy must be a rooted DAG;
//! this is validated at construction and direct annotations are immediately
//! propagated upwards so every concept also carries the genes of its
//! descendants.
//!
//! An [`Analysis`] takes a pool of resources, one of which acts as the
//! antecedent (typically a geneset pool, e.g. clusters from a clustering
//! run), and tests concept pairs between the antecedent and each consequent
//! resource with Fisher's exact test. The hierarchy is exploited twice: once
//! for annotation propagation and once to prune the candidate search space
//! top-down (a pair that fails the minimum co-annotation count rules out
//! every descendant pair).
//!
//! # Examples
//!
//! ```
//! use std::collections::{HashMap, HashSet};
//! use ontolink::{Analysis, Parameters, ResourceSet, ResourceTables};
//!
//! fn set(items: &[&str]) -> HashSet<String> {
//!     items.iter().map(|s| s.to_string()).collect()
//! }
//!
//! let mut resources = ResourceSet::new();
//! let params = Parameters::default()
//!     .with_n_genes_threshold(2)
//!     .with_pvalue_threshold(1.0)
//!     .unwrap();
//!
//! // a pool of two nested genesets
//! let mut genesets = HashMap::new();
//! genesets.insert("all".to_string(), set(&["g1", "g2", "g3", "g4"]));
//! genesets.insert("cluster.1".to_string(), set(&["g1", "g2"]));
//! let mut hierarchy = HashMap::new();
//! hierarchy.insert("cluster.1".to_string(), set(&["all"]));
//! resources.insert_genesets("CLUSTERS", genesets, hierarchy, &params).unwrap();
//!
//! // a miniature knowledge base
//! let mut tables = ResourceTables::default();
//! tables.annotations.insert("g1".to_string(), set(&["KB:2"]));
//! tables.annotations.insert("g2".to_string(), set(&["KB:2"]));
//! tables.annotations.insert("g3".to_string(), set(&["KB:1"]));
//! tables.hierarchy.insert("KB:2".to_string(), set(&["KB:1"]));
//! tables.translations.insert("KB:1".to_string(), "root".to_string());
//! tables.translations.insert("KB:2".to_string(), "immune response".to_string());
//! resources.insert("KB", tables, &params).unwrap();
//!
//! let analysis = Analysis::new(&resources, &params);
//! let results = analysis.run("CLUSTERS", &["KB"]).unwrap();
//!
//! assert!(!results.associations.is_empty());
//! for association in &results.associations {
//!     println!(
//!         "{} -> {}: {} genes, p = {:.4}",
//!         association.antecedent(),
//!         association.consequent(),
//!         association.n_genes(),
//!         association.pvalue(),
//!     );
//! }
//! ```

use thiserror::Error;

pub mod analysis;
pub mod annotations;
pub mod ic;
pub mod params;
pub mod resource;
pub mod stats;
pub mod words;

pub use analysis::{Analysis, AnalysisResults, AnnotationCount};
pub use annotations::{GeneGroup, GeneId, GeneIndex, GeneResolver, SymbolTable, Verbatim};
pub use ic::{ExtrinsicIc, IntrinsicIc};
pub use params::Parameters;
pub use resource::{Concept, Resource, ResourceSet, ResourceTables};
pub use stats::{
    Alternative, Association, AssociationCounts, AssociationTest, ConceptRef, FisherExact,
};
pub use words::WordScore;

#[derive(Error, Debug, PartialEq)]
pub enum OntolinkError {
    /// The hierarchy of a resource contains a cycle, so no propagation
    /// order exists
    #[error("cycle detected in the hierarchy of `{0}`")]
    CycleDetected(String),
    /// The hierarchy of a resource does not have exactly one root
    #[error("hierarchy of `{resource}` has {found} roots, expected exactly one")]
    InvalidHierarchy { resource: String, found: usize },
    /// A resource with the same label is already part of the set
    #[error("resource `{0}` is already registered")]
    DuplicateResource(String),
    /// The requested resource label is not part of the set
    #[error("unknown resource `{0}`")]
    UnknownResource(String),
    /// The requested concept does not exist in its resource
    #[error("unknown concept `{0}`")]
    UnknownConcept(String),
    /// Extrinsic information content was requested for a concept that does
    /// not occur in the association corpus, where `-log(p)` is undefined
    #[error("concept `{0}` does not occur in the association corpus")]
    UndefinedFrequency(String),
    /// A configuration value is outside its valid range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Crate-wide `Result` alias
pub type OntolinkResult<T> = Result<T, OntolinkError>;
