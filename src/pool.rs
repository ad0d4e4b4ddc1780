/// Fixed-capacity pool of recyclable entity slots.
///
/// Every slot is allocated up front.  `acquire` hands out the first inactive
/// slot and `release` parks it again; the pool never grows, so an exhausted
/// pool simply yields nothing and the caller drops whatever it wanted to do.

use crate::entities::{Entity, EntityKind};

#[derive(Clone, Debug)]
pub struct Pool {
    slots: Vec<Entity>,
    park: (f32, f32),
}

impl Pool {
    /// `capacity` inactive entities of `kind`, all waiting at `park`.
    pub fn new(kind: EntityKind, capacity: usize, park: (f32, f32)) -> Self {
        Pool {
            slots: vec![Entity::new(kind, park.0, park.1); capacity],
            park,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|e| e.active).count()
    }

    pub fn is_exhausted(&self) -> bool {
        self.slots.iter().all(|e| e.active)
    }

    /// Mark the first free slot active and return it, or `None` when every
    /// slot is in use.
    pub fn acquire(&mut self) -> Option<&mut Entity> {
        let slot = self.slots.iter_mut().find(|e| !e.active)?;
        slot.active = true;
        Some(slot)
    }

    /// Park the slot at `index`.  Out-of-range indices are ignored.
    pub fn release(&mut self, index: usize) {
        let (x, y) = self.park;
        if let Some(slot) = self.slots.get_mut(index) {
            slot.park(x, y);
        }
    }

    pub fn release_all(&mut self) {
        let (x, y) = self.park;
        for slot in &mut self.slots {
            slot.park(x, y);
        }
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[Entity] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|e| e.active)
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter(|e| e.active)
    }
}
