//! Analysis configuration
//!
//! [`Parameters`] is constructed and validated once and then passed by
//! shared reference into every stage of the analysis. There is no mutable
//! or process-wide configuration state.

use std::collections::HashSet;

use crate::{OntolinkError, OntolinkResult};

/// Words excluded from word-importance scoring when the caller does not
/// supply their own exclusion set
const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "into", "is", "of", "on", "or", "the",
    "to", "via", "with",
];

/// Immutable configuration of an enrichment analysis
///
/// All thresholds are inclusive: a candidate pair with exactly
/// `n_genes_threshold` co-annotated genes and a p-value of exactly
/// `pvalue_threshold` is retained.
#[derive(Debug, Clone)]
pub struct Parameters {
    n_genes_threshold: usize,
    pvalue_threshold: f64,
    use_heuristic: bool,
    use_gene_symbol: bool,
    stopwords: HashSet<String>,
}

impl Default for Parameters {
    /// The conventional defaults: at least 5 co-annotated genes,
    /// p ≤ 0.05, heuristic pruning enabled, gene-symbol namespace enabled
    fn default() -> Self {
        Self {
            n_genes_threshold: 5,
            pvalue_threshold: 0.05,
            use_heuristic: true,
            use_gene_symbol: true,
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Parameters {
    /// Constructs `Parameters` with the given thresholds and the remaining
    /// fields at their defaults
    ///
    /// # Errors
    ///
    /// Returns [`OntolinkError::InvalidParameter`] if `pvalue_threshold` is
    /// not within `(0, 1]`
    pub fn new(n_genes_threshold: usize, pvalue_threshold: f64) -> OntolinkResult<Self> {
        Self::default()
            .with_n_genes_threshold(n_genes_threshold)
            .with_pvalue_threshold(pvalue_threshold)
    }

    /// Sets the minimum number of co-annotated genes for an association
    #[must_use]
    pub fn with_n_genes_threshold(mut self, n_genes_threshold: usize) -> Self {
        self.n_genes_threshold = n_genes_threshold;
        self
    }

    /// Sets the maximum p-value for a significant association
    ///
    /// # Errors
    ///
    /// Returns [`OntolinkError::InvalidParameter`] if `pvalue_threshold` is
    /// not within `(0, 1]`
    pub fn with_pvalue_threshold(mut self, pvalue_threshold: f64) -> OntolinkResult<Self> {
        if !(pvalue_threshold > 0.0 && pvalue_threshold <= 1.0) {
            return Err(OntolinkError::InvalidParameter(format!(
                "pvalue_threshold must be within (0, 1], got {pvalue_threshold}"
            )));
        }
        self.pvalue_threshold = pvalue_threshold;
        Ok(self)
    }

    /// Enables or disables the monotonicity-based candidate pruning
    #[must_use]
    pub fn with_heuristic(mut self, use_heuristic: bool) -> Self {
        self.use_heuristic = use_heuristic;
        self
    }

    /// Selects whether gene identifiers are resolved into the symbol
    /// namespace before interning
    #[must_use]
    pub fn with_gene_symbol(mut self, use_gene_symbol: bool) -> Self {
        self.use_gene_symbol = use_gene_symbol;
        self
    }

    /// Replaces the stopword exclusion set used for word scoring
    ///
    /// Matching is case-insensitive; the words are lowercased on the way in.
    #[must_use]
    pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords = stopwords
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    /// The minimum number of co-annotated genes (inclusive)
    pub fn n_genes_threshold(&self) -> usize {
        self.n_genes_threshold
    }

    /// The maximum p-value of a significant association (inclusive)
    pub fn pvalue_threshold(&self) -> f64 {
        self.pvalue_threshold
    }

    /// Whether candidate generation prunes the search space top-down
    pub fn use_heuristic(&self) -> bool {
        self.use_heuristic
    }

    /// Whether gene identifiers are resolved into the symbol namespace
    pub fn use_gene_symbol(&self) -> bool {
        self.use_gene_symbol
    }

    /// The stopword exclusion set, lowercased
    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_valid() {
        let params = Parameters::default();
        assert_eq!(params.n_genes_threshold(), 5);
        assert!(params.use_heuristic());
        assert!(params.stopwords().contains("of"));
    }

    #[test]
    fn pvalue_threshold_bounds() {
        assert!(Parameters::new(5, 0.0).is_err());
        assert!(Parameters::new(5, -0.1).is_err());
        assert!(Parameters::new(5, 1.1).is_err());
        assert!(Parameters::new(5, f64::NAN).is_err());
        assert!(Parameters::new(5, 1.0).is_ok());
        assert!(Parameters::new(0, 0.05).is_ok());
    }

    #[test]
    fn stopwords_are_lowercased() {
        let params = Parameters::default().with_stopwords(["The", "OF"]);
        assert!(params.stopwords().contains("the"));
        assert!(params.stopwords().contains("of"));
        assert_eq!(params.stopwords().len(), 2);
    }
}
