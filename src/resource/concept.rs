use core::fmt::Debug;
use std::fmt::Display;

use crate::annotations::GeneGroup;
use crate::resource::arena::ConceptIdx;
use crate::resource::Resource;

/// A borrowed view of a single concept of a [`Resource`]
///
/// The identity of a concept is the pair of its resource's label and its
/// id; two concepts with the same id from different resources are
/// different concepts.
#[derive(Clone, Copy)]
pub struct Concept<'a> {
    resource: &'a Resource,
    idx: ConceptIdx,
}

impl<'a> Concept<'a> {
    pub(crate) fn new(resource: &'a Resource, idx: ConceptIdx) -> Concept<'a> {
        Concept { resource, idx }
    }

    pub(crate) fn idx(&self) -> ConceptIdx {
        self.idx
    }

    /// The concept id within its resource, e.g. `GO:0006915`
    pub fn id(&self) -> &'a str {
        self.resource.internal(self.idx).id()
    }

    /// The human-readable label; the id when no translation is known
    pub fn name(&self) -> &'a str {
        self.resource.internal(self.idx).name()
    }

    /// The label of the resource the concept belongs to
    pub fn resource(&self) -> &'a str {
        self.resource.label()
    }

    /// The genes annotated to the concept or any of its descendants
    pub fn genes(&self) -> &'a GeneGroup {
        self.resource.internal(self.idx).genes()
    }

    /// The number of genes annotated to the concept or any of its
    /// descendants
    pub fn n_genes(&self) -> usize {
        self.genes().len()
    }

    /// Distance from the root of the hierarchy (the root has depth `0`)
    ///
    /// For concepts with several paths to the root, the shortest one.
    pub fn depth(&self) -> usize {
        self.resource.internal(self.idx).depth() as usize
    }

    /// Returns `true` if the concept has no children
    pub fn is_leaf(&self) -> bool {
        self.resource.internal(self.idx).is_leaf()
    }

    /// Returns `true` if the concept is the root of its resource
    pub fn is_root(&self) -> bool {
        self.idx == self.resource.root_idx()
    }

    /// The direct parents of the concept
    pub fn parents(&self) -> impl Iterator<Item = Concept<'a>> + '_ {
        self.resource
            .internal(self.idx)
            .parents()
            .iter()
            .map(|idx| Concept::new(self.resource, *idx))
    }

    /// The direct children of the concept
    pub fn children(&self) -> impl Iterator<Item = Concept<'a>> + '_ {
        self.resource
            .internal(self.idx)
            .children()
            .iter()
            .map(|idx| Concept::new(self.resource, *idx))
    }
}

impl PartialEq for Concept<'_> {
    fn eq(&self, other: &Concept) -> bool {
        self.idx == other.idx && std::ptr::eq(self.resource, other.resource)
    }
}

impl Eq for Concept<'_> {}

impl Debug for Concept<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Concept({}:{})", self.resource(), self.id())
    }
}

impl Display for Concept<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource(), self.id())
    }
}

/// Iterator over all concepts of a [`Resource`]
pub struct ConceptIter<'a> {
    resource: &'a Resource,
    inner: std::ops::Range<usize>,
}

impl<'a> ConceptIter<'a> {
    pub(crate) fn new(resource: &'a Resource) -> Self {
        ConceptIter {
            resource,
            inner: 0..resource.len(),
        }
    }
}

impl<'a> Iterator for ConceptIter<'a> {
    type Item = Concept<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|i| Concept::new(self.resource, self.resource.idx_at(i)))
    }
}

impl Debug for ConceptIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConceptIter({})", self.resource.label())
    }
}
