//! In-memory [`Repository`] with save/rollback snapshots.

use crate::error::{Result, VersedError};
use crate::model::Passage;
use crate::types::PassageId;

use super::{PassageQuery, Repository};

/// A `Vec`-backed store. Writes go to a working copy; `save` commits it and
/// `rollback` restores the last committed copy.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    working: Vec<Passage>,
    committed: Vec<Passage>,
    dirty: bool,
    saves: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves, for assertions in tests.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// Number of passages visible to queries (including unsaved ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.working.len()
    }

    /// Whether the store holds no passages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    fn position(&self, id: PassageId) -> Option<usize> {
        self.working.iter().position(|p| p.id == id)
    }

    fn index_taken(&self, passage: &Passage) -> bool {
        !passage.is_example
            && self
                .working
                .iter()
                .any(|p| !p.is_example && p.index == passage.index && p.id != passage.id)
    }
}

impl Repository for MemoryStore {
    fn insert(&mut self, passage: Passage) -> Result<()> {
        if self.index_taken(&passage) {
            return Err(VersedError::DuplicateIndex(passage.index));
        }
        self.working.push(passage);
        self.dirty = true;
        Ok(())
    }

    fn update(&mut self, passage: &Passage) -> Result<()> {
        let pos = self
            .position(passage.id)
            .ok_or(VersedError::PassageNotFound(passage.id))?;
        if self.index_taken(passage) {
            return Err(VersedError::DuplicateIndex(passage.index));
        }
        self.working[pos] = passage.clone();
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, id: PassageId) -> Result<bool> {
        let Some(pos) = self.position(id) else {
            return Ok(false);
        };
        self.working.remove(pos);
        self.dirty = true;
        Ok(true)
    }

    fn get(&self, id: PassageId) -> Result<Option<Passage>> {
        Ok(self.working.iter().find(|p| p.id == id).cloned())
    }

    fn query(&self, query: &PassageQuery) -> Result<Vec<Passage>> {
        let mut found: Vec<Passage> = self
            .working
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        query.sort(&mut found);
        Ok(found)
    }

    fn save(&mut self) -> Result<()> {
        if self.dirty {
            self.committed.clone_from(&self.working);
            self.dirty = false;
        }
        self.saves += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.working.clone_from(&self.committed);
        self.dirty = false;
        Ok(())
    }

    fn has_changes(&self) -> bool {
        self.dirty
    }
}
