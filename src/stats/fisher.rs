//! Fisher's exact test on a 2×2 contingency table
//!
//! The p-value is computed from the hypergeometric distribution: under the
//! null hypothesis of independence, the number of co-annotated genes
//! follows `Hypergeometric(population, antecedent_total, consequent_total)`.

use statrs::distribution::{Discrete, DiscreteCDF, Hypergeometric};

use crate::stats::{AssociationTest, ContingencyTable};

/// The alternative hypothesis of the test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alternative {
    /// The concepts share more genes than expected (enrichment); the
    /// conventional choice for association discovery
    #[default]
    Greater,
    /// The concepts share fewer genes than expected (depletion)
    Less,
    /// Any deviation from independence
    TwoSided,
}

/// Fisher's exact test
///
/// # Examples
///
/// ```
/// use ontolink::stats::{Alternative, FisherExact};
///
/// let one_sided = FisherExact::new();
/// let two_sided = FisherExact::with_alternative(Alternative::TwoSided);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FisherExact {
    alternative: Alternative,
}

impl FisherExact {
    /// Constructs the test with the one-sided `Greater` alternative
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs the test with the given alternative hypothesis
    pub fn with_alternative(alternative: Alternative) -> Self {
        Self { alternative }
    }
}

impl AssociationTest for FisherExact {
    fn pvalue(&self, table: &ContingencyTable) -> f64 {
        let population = table.population();
        let successes = table.antecedent_total();
        let draws = table.consequent_total();
        let observed = table.both();

        if population == 0 || successes == 0 || draws == 0 {
            // a degenerate margin carries no evidence either way
            return 1.0;
        }

        let hyper = Hypergeometric::new(population, successes, draws)
            .expect("table margins cannot exceed the population");

        let pvalue = match self.alternative {
            Alternative::Greater => {
                if observed == 0 {
                    1.0
                } else {
                    // sf is exclusive, subtract 1 to include the observed count
                    hyper.sf(observed - 1)
                }
            }
            Alternative::Less => hyper.cdf(observed),
            Alternative::TwoSided => {
                // sum the point probabilities of all tables at most as
                // likely as the observed one
                let lowest = successes.saturating_sub(population - draws);
                let highest = successes.min(draws);
                let observed_pmf = hyper.pmf(observed);
                // tolerance against rounding in the pmf computation
                let cutoff = observed_pmf * (1.0 + 1e-7);
                (lowest..=highest)
                    .map(|k| hyper.pmf(k))
                    .filter(|p| *p <= cutoff)
                    .sum()
            }
        };
        pvalue.min(1.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// antecedent {g1..g10}, consequent {g5..g14}, universe of 20 genes:
    /// 6 genes in both, 4 in each margin, 6 in neither
    fn example_table() -> ContingencyTable {
        ContingencyTable::from_sizes(6, 10, 10, 20)
    }

    #[test]
    fn one_sided_greater() {
        let pvalue = FisherExact::new().pvalue(&example_table());
        // sum of the hypergeometric tail for k >= 6
        assert!((pvalue - 60626.0 / 184756.0).abs() < 1e-9);
    }

    #[test]
    fn one_sided_less() {
        let test = FisherExact::with_alternative(Alternative::Less);
        let pvalue = test.pvalue(&example_table());
        // P(X <= 6) = 1 - P(X >= 7)
        assert!((pvalue - 168230.0 / 184756.0).abs() < 1e-9);
    }

    #[test]
    fn two_sided() {
        let test = FisherExact::with_alternative(Alternative::TwoSided);
        let pvalue = test.pvalue(&example_table());
        // every table except k = 5 is at most as likely as the observed one
        assert!((pvalue - 121252.0 / 184756.0).abs() < 1e-9);
    }

    #[test]
    fn full_overlap_is_certain() {
        // the antecedent spans the whole universe, every draw is a success
        let table = ContingencyTable::from_sizes(10, 20, 10, 20);
        let pvalue = FisherExact::new().pvalue(&table);
        assert!((pvalue - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_margins() {
        let test = FisherExact::new();
        assert_eq!(test.pvalue(&ContingencyTable::from_sizes(0, 0, 5, 10)), 1.0);
        assert_eq!(test.pvalue(&ContingencyTable::from_sizes(0, 5, 0, 10)), 1.0);
        assert_eq!(test.pvalue(&ContingencyTable::from_sizes(0, 0, 0, 0)), 1.0);
    }

    #[test]
    fn strong_association_is_small() {
        // 10 of 10 genes shared out of 40
        let table = ContingencyTable::from_sizes(10, 10, 10, 40);
        let pvalue = FisherExact::new().pvalue(&table);
        assert!(pvalue < 1e-8);
    }
}
