use std::collections::HashMap;

use crate::resource::internal::ConceptInternal;

/// Dense index of a concept within its resource's arena
///
/// Only meaningful within the arena that created it.
#[derive(Clone, Copy, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub(crate) struct ConceptIdx(u32);

impl ConceptIdx {
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    concepts: Vec<ConceptInternal>,
    lookup: HashMap<String, ConceptIdx>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Returns the index of the concept with the given id, creating an
    /// empty node on first sight
    pub fn get_or_insert(&mut self, id: &str) -> ConceptIdx {
        if let Some(idx) = self.lookup.get(id) {
            return *idx;
        }
        let idx = ConceptIdx(
            u32::try_from(self.concepts.len()).expect("more than u32::MAX concepts in one arena"),
        );
        self.concepts.push(ConceptInternal::new(id));
        self.lookup.insert(id.to_string(), idx);
        idx
    }

    pub fn idx_of(&self, id: &str) -> Option<ConceptIdx> {
        self.lookup.get(id).copied()
    }

    pub fn get(&self, idx: ConceptIdx) -> &ConceptInternal {
        &self.concepts[idx.to_usize()]
    }

    pub fn get_mut(&mut self, idx: ConceptIdx) -> &mut ConceptInternal {
        &mut self.concepts[idx.to_usize()]
    }

    pub fn idx_at(&self, i: usize) -> ConceptIdx {
        debug_assert!(i < self.concepts.len());
        ConceptIdx(i as u32)
    }

    pub fn indices(&self) -> impl Iterator<Item = ConceptIdx> + '_ {
        (0..self.concepts.len()).map(|i| ConceptIdx(i as u32))
    }

    pub fn values(&self) -> std::slice::Iter<'_, ConceptInternal> {
        self.concepts.iter()
    }
}
