//! Knowledge resources and their construction
//!
//! A [`Resource`] is one knowledge base: gene → concept annotations, a
//! concept hierarchy and human-readable concept labels. The hierarchy must
//! be a rooted DAG with exactly one root. Both invariants are checked when
//! the resource is built; no `Resource` value with an invalid hierarchy
//! can exist.
//!
//! Construction immediately propagates direct annotations upwards through
//! the hierarchy (leaves first), so that every concept carries the genes of
//! all its descendants. A geneset pool (e.g. the clusters of a clustering
//! analysis, possibly nested) is inserted through
//! [`ResourceSet::insert_genesets`] and behaves like any other resource.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::annotations::{GeneGroup, GeneId, GeneIndex, GeneResolver, Verbatim};
use crate::params::Parameters;
use crate::{OntolinkError, OntolinkResult};

mod arena;
mod concept;
mod internal;

use arena::Arena;
pub(crate) use arena::ConceptIdx;
pub use concept::{Concept, ConceptIter};
use internal::ConceptInternal;

/// The three relations a knowledge base is loaded from
///
/// External loaders (spreadsheet/JSON parsers, database clients) produce
/// this structure; the crate never touches files or the network itself.
#[derive(Debug, Default, Clone)]
pub struct ResourceTables {
    /// gene identifier → ids of the concepts directly annotating it
    pub annotations: HashMap<String, HashSet<String>>,
    /// concept id → ids of its parent concepts
    pub hierarchy: HashMap<String, HashSet<String>>,
    /// concept id → human-readable label
    pub translations: HashMap<String, String>,
}

/// One knowledge base: a rooted DAG of concepts with propagated gene
/// annotations
///
/// Immutable after construction.
#[derive(Debug)]
pub struct Resource {
    label: String,
    arena: Arena,
    /// Leaves-first order of all concepts; every concept appears after
    /// all of its descendants
    topo: Vec<ConceptIdx>,
    root: ConceptIdx,
    /// Union of all directly annotated genes
    genes: GeneGroup,
    n_leaves: usize,
}

impl Resource {
    /// Builds and validates a resource from its three relations
    ///
    /// `intern` maps a raw gene identifier to its [`GeneId`]; it is
    /// supplied by the owning [`ResourceSet`] so that ids are shared
    /// across resources.
    fn from_tables(
        label: &str,
        tables: &ResourceTables,
        intern: &mut dyn FnMut(&str) -> GeneId,
    ) -> OntolinkResult<Resource> {
        let mut arena = Arena::default();

        for (child, parents) in &tables.hierarchy {
            let child_idx = arena.get_or_insert(child);
            for parent in parents {
                let parent_idx = arena.get_or_insert(parent);
                arena.get_mut(child_idx).add_parent(parent_idx);
                arena.get_mut(parent_idx).add_child(child_idx);
            }
        }
        for concepts in tables.annotations.values() {
            for concept in concepts {
                arena.get_or_insert(concept);
            }
        }
        for (concept, name) in &tables.translations {
            let idx = arena.get_or_insert(concept);
            arena.get_mut(idx).set_name(name);
        }

        let root = single_root(label, &arena)?;
        let topo = propagation_order(label, &arena)?;

        let mut genes = GeneGroup::new();
        for (gene, concepts) in &tables.annotations {
            let gene_id = intern(gene);
            genes.insert(gene_id);
            for concept in concepts {
                let idx = arena
                    .idx_of(concept)
                    .expect("all annotated concepts were inserted above");
                arena.get_mut(idx).add_gene(gene_id);
            }
        }

        let n_leaves = arena.values().filter(|c| c.is_leaf()).count();

        let mut resource = Resource {
            label: label.to_string(),
            arena,
            topo,
            root,
            genes,
            n_leaves,
        };
        resource.assign_depths();
        resource.propagate();
        debug!(
            "built resource {} with {} concepts, {} leaves and {} genes",
            resource.label,
            resource.len(),
            resource.n_leaves,
            resource.genes.len()
        );
        Ok(resource)
    }

    /// Propagates gene annotations upwards through the hierarchy
    ///
    /// After propagation every concept carries the union of its own direct
    /// genes and the genes of all its descendants. Concepts are processed
    /// leaves first, so each concept is final before its parents consume
    /// it. The operation is idempotent and introduces no genes that were
    /// not present in the direct annotations; it runs once during
    /// construction and re-running it is a no-op.
    pub fn propagate(&mut self) {
        let topo = std::mem::take(&mut self.topo);
        for &idx in &topo {
            let (concept_genes, parents) = {
                let concept = self.arena.get(idx);
                (concept.genes().clone(), concept.parents().clone())
            };
            if concept_genes.is_empty() {
                continue;
            }
            for parent in parents {
                self.arena.get_mut(parent).genes_mut().extend_from(&concept_genes);
            }
        }
        self.topo = topo;
    }

    /// BFS from the root; depth is the shortest distance
    fn assign_depths(&mut self) {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(self.root);
        queue.push_back((self.root, 0u32));
        while let Some((idx, depth)) = queue.pop_front() {
            self.arena.get_mut(idx).set_depth(depth);
            let children = self.arena.get(idx).children().clone();
            for child in children {
                if seen.insert(child) {
                    queue.push_back((child, depth + 1));
                }
            }
        }
    }

    /// The label identifying the resource
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The number of concepts in the resource
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the resource has no concepts
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// The number of terminal (childless) concepts
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// The union of all directly annotated genes
    pub fn genes(&self) -> &GeneGroup {
        &self.genes
    }

    /// The root concept of the hierarchy
    pub fn root(&self) -> Concept {
        Concept::new(self, self.root)
    }

    /// Returns the concept with the given id
    pub fn concept(&self, id: &str) -> Option<Concept> {
        self.arena.idx_of(id).map(|idx| Concept::new(self, idx))
    }

    /// Iterates all concepts of the resource
    pub fn concepts(&self) -> ConceptIter {
        ConceptIter::new(self)
    }

    pub(crate) fn internal(&self, idx: ConceptIdx) -> &ConceptInternal {
        self.arena.get(idx)
    }

    pub(crate) fn root_idx(&self) -> ConceptIdx {
        self.root
    }

    pub(crate) fn idx_at(&self, i: usize) -> ConceptIdx {
        self.arena.idx_at(i)
    }

    pub(crate) fn concept_at(&self, idx: ConceptIdx) -> Concept {
        Concept::new(self, idx)
    }

    /// Leaves-first order over all concepts
    pub(crate) fn topo(&self) -> &[ConceptIdx] {
        &self.topo
    }

    /// All ancestors of a concept, the concept itself excluded
    pub(crate) fn ancestors_of(&self, idx: ConceptIdx) -> HashSet<ConceptIdx> {
        let mut ancestors = HashSet::new();
        let mut stack: Vec<ConceptIdx> = self.arena.get(idx).parents().to_vec();
        while let Some(current) = stack.pop() {
            if ancestors.insert(current) {
                stack.extend(self.arena.get(current).parents().iter().copied());
            }
        }
        ancestors
    }
}

impl<'a> IntoIterator for &'a Resource {
    type Item = Concept<'a>;
    type IntoIter = ConceptIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.concepts()
    }
}

/// Returns the single parentless concept, or the error naming how many
/// there are
fn single_root(label: &str, arena: &Arena) -> OntolinkResult<ConceptIdx> {
    let roots: Vec<ConceptIdx> = arena
        .indices()
        .filter(|idx| arena.get(*idx).parents().is_empty())
        .collect();
    match roots[..] {
        [root] => Ok(root),
        _ => Err(OntolinkError::InvalidHierarchy {
            resource: label.to_string(),
            found: roots.len(),
        }),
    }
}

/// Kahn's algorithm on the child → parent relation: leaves first, every
/// concept before all of its ancestors
fn propagation_order(label: &str, arena: &Arena) -> OntolinkResult<Vec<ConceptIdx>> {
    let mut pending_children: Vec<usize> = arena
        .indices()
        .map(|idx| arena.get(idx).children().len())
        .collect();
    let mut queue: VecDeque<ConceptIdx> = arena
        .indices()
        .filter(|idx| pending_children[idx.to_usize()] == 0)
        .collect();
    let mut order = Vec::with_capacity(arena.len());

    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        for parent in arena.get(idx).parents() {
            let pending = &mut pending_children[parent.to_usize()];
            *pending -= 1;
            if *pending == 0 {
                queue.push_back(*parent);
            }
        }
    }

    if order.len() == arena.len() {
        Ok(order)
    } else {
        Err(OntolinkError::CycleDetected(label.to_string()))
    }
}

/// The pool of resources of one analysis, sharing a single gene index
pub struct ResourceSet {
    genes: GeneIndex,
    resolver: Box<dyn GeneResolver + Send + Sync>,
    resources: HashMap<String, Resource>,
}

impl Default for ResourceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ResourceSet with {} resources and {} genes",
            self.resources.len(),
            self.genes.len()
        )
    }
}

impl ResourceSet {
    /// Constructs an empty set resolving gene identifiers verbatim
    pub fn new() -> Self {
        Self::with_resolver(Verbatim)
    }

    /// Constructs an empty set with a custom gene-identifier resolver
    ///
    /// The resolver is consulted for every gene identifier of every
    /// inserted resource when
    /// [`Parameters::use_gene_symbol`](crate::Parameters::use_gene_symbol)
    /// is enabled.
    pub fn with_resolver<R>(resolver: R) -> Self
    where
        R: GeneResolver + Send + Sync + 'static,
    {
        Self {
            genes: GeneIndex::new(),
            resolver: Box::new(resolver),
            resources: HashMap::new(),
        }
    }

    /// Builds, validates and inserts a resource from its three relations
    ///
    /// # Errors
    ///
    /// - [`OntolinkError::DuplicateResource`] if `label` is already taken
    /// - [`OntolinkError::CycleDetected`] if the hierarchy is cyclic
    /// - [`OntolinkError::InvalidHierarchy`] if the hierarchy does not
    ///   have exactly one root
    pub fn insert(
        &mut self,
        label: &str,
        tables: ResourceTables,
        params: &Parameters,
    ) -> OntolinkResult<()> {
        if self.resources.contains_key(label) {
            return Err(OntolinkError::DuplicateResource(label.to_string()));
        }
        let resolver = &self.resolver;
        let genes = &mut self.genes;
        let use_symbol = params.use_gene_symbol();
        let mut intern = |raw: &str| {
            let name = if use_symbol { resolver.resolve(raw) } else { raw };
            genes.intern(name)
        };
        let resource = Resource::from_tables(label, &tables, &mut intern)?;
        self.resources.insert(label.to_string(), resource);
        Ok(())
    }

    /// Inserts a pool of (possibly nested) genesets as a resource
    ///
    /// `genesets` maps each geneset id to its genes, `hierarchy` maps a
    /// geneset to the genesets it is a sub-population of. The mapping is
    /// inverted into the annotation relation and each geneset id doubles
    /// as its own label. The rooted-DAG invariant applies unchanged: a
    /// flat pool of several genesets needs an umbrella geneset on top.
    pub fn insert_genesets(
        &mut self,
        label: &str,
        genesets: HashMap<String, HashSet<String>>,
        hierarchy: HashMap<String, HashSet<String>>,
        params: &Parameters,
    ) -> OntolinkResult<()> {
        let mut tables = ResourceTables {
            hierarchy,
            ..ResourceTables::default()
        };
        for (geneset, genes) in genesets {
            tables
                .translations
                .insert(geneset.clone(), geneset.clone());
            for gene in genes {
                tables
                    .annotations
                    .entry(gene)
                    .or_default()
                    .insert(geneset.clone());
            }
        }
        self.insert(label, tables, params)
    }

    /// Returns the resource with the given label
    pub fn resource(&self, label: &str) -> Option<&Resource> {
        self.resources.get(label)
    }

    /// The shared gene index of all inserted resources
    pub fn genes(&self) -> &GeneIndex {
        &self.genes
    }

    /// The labels of all inserted resources
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// The number of inserted resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if no resource was inserted yet
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
