//! Gene identifiers and gene sets
//!
//! Genes arrive as caller-supplied strings (symbols, UniProt accessions, …)
//! and are interned once per [`ResourceSet`](crate::ResourceSet) into dense
//! [`GeneId`]s. All per-concept gene sets are [`GeneGroup`]s over those ids,
//! so intersecting sets from different resources never touches a string.

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::{BitAnd, BitOr};

/// A unique identifier for a gene
///
/// Ids are assigned by the [`GeneIndex`] in insertion order and are only
/// meaningful within the index that created them.
#[derive(Clone, Copy, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: u32,
}

impl GeneId {
    pub(crate) fn to_usize(self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for GeneId {
    fn from(inner: u32) -> Self {
        GeneId { inner }
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gene:{}", self.inner)
    }
}

/// Maps raw gene identifiers into the namespace used for the analysis
///
/// The source data of different resources frequently identifies genes in
/// different namespaces (gene symbols, UniProt accessions, …). A
/// `GeneResolver` is applied to every identifier before interning so that
/// the same gene ends up with the same [`GeneId`] across resources.
pub trait GeneResolver {
    /// Returns the canonical identifier for `gene`
    fn resolve<'a>(&'a self, gene: &'a str) -> &'a str;
}

/// The identity resolver: identifiers are used verbatim
#[derive(Debug, Default)]
pub struct Verbatim;

impl GeneResolver for Verbatim {
    fn resolve<'a>(&'a self, gene: &'a str) -> &'a str {
        gene
    }
}

/// A resolver backed by a caller-supplied lookup table
///
/// Identifiers without an entry are used verbatim.
#[derive(Debug, Default)]
pub struct SymbolTable {
    map: HashMap<String, String>,
}

impl From<HashMap<String, String>> for SymbolTable {
    fn from(map: HashMap<String, String>) -> Self {
        Self { map }
    }
}

impl GeneResolver for SymbolTable {
    fn resolve<'a>(&'a self, gene: &'a str) -> &'a str {
        self.map.get(gene).map_or(gene, String::as_str)
    }
}

/// Interner assigning dense [`GeneId`]s to gene identifiers
#[derive(Debug, Default)]
pub struct GeneIndex {
    names: Vec<String>,
    lookup: HashMap<String, GeneId>,
}

impl GeneIndex {
    /// Constructs a new, empty `GeneIndex`
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `name`, assigning a new one on first sight
    pub fn intern(&mut self, name: &str) -> GeneId {
        if let Some(id) = self.lookup.get(name) {
            return *id;
        }
        let id = GeneId::from(
            u32::try_from(self.names.len()).expect("more than u32::MAX genes interned"),
        );
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    /// Returns the id of `name`, if it was interned before
    pub fn get(&self, name: &str) -> Option<GeneId> {
        self.lookup.get(name).copied()
    }

    /// Returns the identifier behind `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this index
    pub fn name(&self, id: GeneId) -> &str {
        &self.names[id.to_usize()]
    }

    /// Returns the number of interned genes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no gene was interned yet
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A sorted set of [`GeneId`]s
///
/// Each gene can occur only once in the group. The ids are kept sorted, so
/// union, intersection and overlap counting run as linear merges.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneGroup {
    ids: Vec<GeneId>,
}

impl GeneGroup {
    /// Constructs a new, empty `GeneGroup`
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty `GeneGroup` with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no genes
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of genes in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a gene to the group
    ///
    /// Returns whether the gene was newly inserted.
    pub fn insert(&mut self, id: GeneId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Adds a gene to the end of the group without keeping the sort order
    ///
    /// Only valid when the caller guarantees that `id` is larger than every
    /// gene already in the group.
    fn insert_unchecked(&mut self, id: GeneId) {
        self.ids.push(id);
    }

    /// Returns `true` if the group contains the gene
    pub fn contains(&self, id: &GeneId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an iterator of the genes in the group
    pub fn iter(&self) -> impl Iterator<Item = GeneId> + '_ {
        self.ids.iter().copied()
    }

    /// Returns the number of genes present in both groups
    ///
    /// Equivalent to `(self & other).len()` without building the
    /// intersection. This is the innermost operation of candidate
    /// generation.
    pub fn count_common(&self, other: &GeneGroup) -> usize {
        let mut n = 0;
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    n += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        n
    }

    /// Unions `other` into `self`
    pub(crate) fn extend_from(&mut self, other: &GeneGroup) {
        for id in other.iter() {
            self.insert(id);
        }
    }
}

impl FromIterator<GeneId> for GeneGroup {
    fn from_iter<I: IntoIterator<Item = GeneId>>(iter: I) -> Self {
        let mut group = GeneGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl BitOr for &GeneGroup {
    type Output = GeneGroup;

    fn bitor(self, rhs: &GeneGroup) -> GeneGroup {
        let mut group = GeneGroup::with_capacity(self.len() + rhs.len());
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < rhs.ids.len() {
            match self.ids[i].cmp(&rhs.ids[j]) {
                std::cmp::Ordering::Less => {
                    group.insert_unchecked(self.ids[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    group.insert_unchecked(rhs.ids[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    group.insert_unchecked(self.ids[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        group.ids.extend_from_slice(&self.ids[i..]);
        group.ids.extend_from_slice(&rhs.ids[j..]);
        group
    }
}

impl BitAnd for &GeneGroup {
    type Output = GeneGroup;

    fn bitand(self, rhs: &GeneGroup) -> GeneGroup {
        let mut group = GeneGroup::with_capacity(self.len().min(rhs.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < rhs.ids.len() {
            match self.ids[i].cmp(&rhs.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    group.insert_unchecked(self.ids[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        group
    }
}
