//! Arena of live entities indexed by identifier
//!
//! Entities live in slots and are addressed by a [`Handle`]. Removing an
//! entity frees its slot for the next insert and bumps the slot's
//! generation, so handles of other entities stay valid and a stale handle
//! never resolves to the newcomer.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: usize,
    generation: u32,
}

struct Slot<E> {
    generation: u32,
    entity: Option<E>,
}

pub struct EntityArena<Id, E> {
    slots: Vec<Slot<E>>,
    free: Vec<usize>,
    /// Live slot indexes in insertion order
    order: Vec<usize>,
    index: HashMap<Id, Handle>,
}

impl<Id, E> EntityArena<Id, E>
where
    Id: Clone + Eq + Hash + fmt::Display,
{
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add an entity; fails if the id is already taken.
    pub fn insert(&mut self, id: Id, entity: E) -> DomainResult<Handle> {
        if self.index.contains_key(&id) {
            return Err(DomainError::AlreadyExists(id.to_string()));
        }
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entity = Some(entity);
                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entity: Some(entity),
                });
                Handle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.order.push(handle.index);
        self.index.insert(id, handle);
        Ok(handle)
    }

    pub fn handle_of(&self, id: &Id) -> Option<Handle> {
        self.index.get(id).copied()
    }

    pub fn get(&self, handle: Handle) -> Option<&E> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entity.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut E> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entity.as_mut())
    }

    pub fn by_id(&self, id: &Id) -> Option<&E> {
        self.handle_of(id).and_then(|handle| self.get(handle))
    }

    pub fn by_id_mut(&mut self, id: &Id) -> Option<&mut E> {
        let handle = self.handle_of(id)?;
        self.get_mut(handle)
    }

    pub fn remove(&mut self, id: &Id) -> Option<E> {
        let handle = self.index.remove(id)?;
        let slot = self.slots.get_mut(handle.index)?;
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.order.retain(|&index| index != handle.index);
        Some(entity)
    }

    /// Live entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &E)> + '_ {
        self.order.iter().filter_map(move |&index| {
            let slot = &self.slots[index];
            slot.entity.as_ref().map(|entity| {
                (
                    Handle {
                        index,
                        generation: slot.generation,
                    },
                    entity,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Allocated slots, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<Id, E> Default for EntityArena<Id, E>
where
    Id: Clone + Eq + Hash + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
