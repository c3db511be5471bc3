//! Word-importance scoring over the labels of retained associations
//!
//! For every antecedent concept the labels of its significant consequents
//! form a small document collection; each word is scored by how frequent
//! it is within that collection relative to how frequent it is across the
//! collections of all antecedents (tf-idf). Words from the stopword
//! exclusion set and words appearing in the root labels of the involved
//! resources never enter the table.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::params::Parameters;
use crate::resource::ResourceSet;
use crate::stats::{Association, ConceptRef};

/// The salience of one word for one antecedent concept
#[derive(Debug, Clone, PartialEq)]
pub struct WordScore {
    concept: ConceptRef,
    word: String,
    score: f64,
}

impl WordScore {
    /// The antecedent concept the word was scored for
    pub fn concept(&self) -> &ConceptRef {
        &self.concept
    }

    /// The scored word, lowercased
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The tf-idf salience of the word within the concept's labels
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Splits a label into lowercase word tokens
///
/// Two normalization passes are combined: one treating `-` as a separator
/// and one keeping it, so both `t-cell` and its parts survive. Purely
/// numeric tokens and stopwords are dropped.
pub(crate) fn tokenize(label: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    let mut tokens = HashSet::new();
    for keep_hyphen in [false, true] {
        let normalized: String = label
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || (keep_hyphen && c == '-') {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        for token in normalized.split_whitespace() {
            let token = token.to_lowercase();
            if token.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if stopwords.contains(&token) {
                continue;
            }
            tokens.insert(token);
        }
    }
    tokens
}

/// Scores the label words of the consequents of every antecedent concept
pub(crate) fn word_scores(
    associations: &[Association],
    resources: &ResourceSet,
    params: &Parameters,
) -> Vec<WordScore> {
    if associations.is_empty() {
        return Vec::new();
    }

    // words of the involved resources' root labels carry no information
    let mut root_words: HashSet<String> = HashSet::new();
    let involved: HashSet<&str> = associations
        .iter()
        .flat_map(|a| [a.antecedent().resource(), a.consequent().resource()])
        .collect();
    for label in involved {
        if let Some(resource) = resources.resource(label) {
            root_words.extend(tokenize(resource.root().name(), params.stopwords()));
        }
    }

    // one document per (antecedent, consequent) pair: the consequent label
    let mut groups: BTreeMap<String, (ConceptRef, Vec<HashSet<String>>)> = BTreeMap::new();
    for association in associations {
        let key = association.antecedent().to_string();
        let tokens = tokenize(association.consequent().name(), params.stopwords());
        groups
            .entry(key)
            .or_insert_with(|| (association.antecedent().clone(), Vec::new()))
            .1
            .push(tokens);
    }

    let n_documents: usize = groups.values().map(|(_, docs)| docs.len()).sum();
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for (_, docs) in groups.values() {
        for doc in docs {
            for word in doc {
                *document_frequency.entry(word).or_default() += 1;
            }
        }
    }

    let mut scores = Vec::new();
    for (_, (concept, docs)) in &groups {
        let mut words: Vec<&str> = docs
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|w| !root_words.contains(*w))
            .collect();
        words.sort_unstable();
        words.dedup();

        for word in words {
            let in_group = docs.iter().filter(|doc| doc.contains(word)).count();
            let tf = in_group as f64 / docs.len() as f64;
            let idf = (n_documents as f64 / document_frequency[word] as f64).ln();
            scores.push(WordScore {
                concept: concept.clone(),
                word: word.to_string(),
                score: tf * idf,
            });
        }
    }
    scores
}
