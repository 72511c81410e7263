//! Engine handles for the C boundary.
//!
//! A handle is a `u64` carrying a slot index in its upper half and the
//! slot's generation in its lower half. Generations start at 1, so a
//! zero-initialized handle on the C side never resolves, and each stop
//! bumps the generation so the old handle goes stale.

use std::mem;

/// Decoded form of an opaque handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self {
            slot: (raw >> 32) as u32,
            generation: raw as u32,
        }
    }
}

impl From<Handle> for u64 {
    fn from(h: Handle) -> Self {
        (u64::from(h.slot) << 32) | u64::from(h.generation)
    }
}

enum Slot<T> {
    Live { generation: u32, value: T },
    /// Vacant; `generation` is what the next occupant will get and `next`
    /// chains to the following vacant slot.
    Vacant { generation: u32, next: Option<u32> },
    /// Generation space exhausted; never handed out again.
    Retired,
}

/// Values owned on behalf of C callers, addressed by `u64` handles.
///
/// Vacant slots form an intrusive chain, so reuse needs no side list.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    vacant_head: Option<u32>,
}

impl<T> HandleTable<T> {
    /// An empty table, usable in a `static`.
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant_head: None,
        }
    }

    /// Store `value` and return its handle, or `None` once every `u32`
    /// slot index is in use.
    pub(crate) fn insert(&mut self, value: T) -> Option<u64> {
        let handle = match self.vacant_head {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                let Slot::Vacant { generation, next } = *entry else {
                    return None;
                };
                self.vacant_head = next;
                *entry = Slot::Live { generation, value };
                Handle { slot, generation }
            }
            None => {
                let slot = u32::try_from(self.slots.len()).ok()?;
                self.slots.push(Slot::Live {
                    generation: 1,
                    value,
                });
                Handle { slot, generation: 1 }
            }
        };
        Some(handle.into())
    }

    /// The value behind `handle`, if it is live.
    pub(crate) fn get(&self, handle: u64) -> Option<&T> {
        let h = Handle::from(handle);
        match self.slots.get(h.slot as usize)? {
            Slot::Live { generation, value } if *generation == h.generation => Some(value),
            _ => None,
        }
    }

    /// Take the value behind `handle` out of the table.
    ///
    /// A stale or unknown handle returns `None`, so removing twice is a
    /// no-op. A slot whose generation would wrap is retired.
    pub(crate) fn remove(&mut self, handle: u64) -> Option<T> {
        let h = Handle::from(handle);
        let entry = self.slots.get_mut(h.slot as usize)?;
        match entry {
            Slot::Live { generation, .. } if *generation == h.generation => {}
            _ => return None,
        }
        let replacement = match h.generation.checked_add(1) {
            Some(generation) => {
                let next = self.vacant_head.replace(h.slot);
                Slot::Vacant { generation, next }
            }
            None => Slot::Retired,
        };
        match mem::replace(entry, replacement) {
            Slot::Live { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Number of live values.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Live { .. }))
            .count()
    }
}
