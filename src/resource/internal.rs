use smallvec::SmallVec;

use crate::annotations::{GeneGroup, GeneId};
use crate::resource::arena::ConceptIdx;

/// Parent/child links of a concept; most concepts have only a handful
pub(crate) type ConceptLinks = SmallVec<[ConceptIdx; 8]>;

#[derive(Debug)]
pub(crate) struct ConceptInternal {
    id: String,
    name: Option<String>,
    parents: ConceptLinks,
    children: ConceptLinks,
    genes: GeneGroup,
    depth: u32,
}

impl ConceptInternal {
    pub fn new(id: &str) -> ConceptInternal {
        ConceptInternal {
            id: id.to_string(),
            name: None,
            parents: ConceptLinks::new(),
            children: ConceptLinks::new(),
            genes: GeneGroup::new(),
            depth: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human-readable label, falling back to the id for concepts
    /// without a translation
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn parents(&self) -> &ConceptLinks {
        &self.parents
    }

    pub fn children(&self) -> &ConceptLinks {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn genes(&self) -> &GeneGroup {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut GeneGroup {
        &mut self.genes
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    pub fn add_parent(&mut self, parent: ConceptIdx) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    pub fn add_child(&mut self, child: ConceptIdx) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn add_gene(&mut self, gene: GeneId) -> bool {
        self.genes.insert(gene)
    }
}
