//! Slot+generation handles for descriptors owned by a store.
//!
//! A removed descriptor's slot gets a new generation, so handles to it go
//! stale and resolve to `None` instead of reaching whatever reuses the slot.

use std::fmt;

/// Opaque handle to an array held by an [`ArrayStore`](crate::ArrayStore).
///
/// Upper 32 bits are the slot index, lower 32 bits the generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayHandle(u64);

impl ArrayHandle {
    fn new(slot: u32, generation: u32) -> Self {
        Self(((slot as u64) << 32) | (generation as u64))
    }

    fn slot(self) -> usize {
        (self.0 >> 32) as usize
    }

    fn generation(self) -> u32 {
        self.0 as u32
    }

    /// The raw encoded value.
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Rebuild a handle from [`to_raw`](Self::to_raw) output.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ArrayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot(), self.generation())
    }
}

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// Slot table mapping [`ArrayHandle`]s to owned values, reusing freed slots.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> HandleTable<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of live entries.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Store `value`, returning its handle, or give it back when every
    /// slot index is in use.
    pub(crate) fn insert(&mut self, value: T) -> Result<ArrayHandle, T> {
        let handle = if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            ArrayHandle::new(slot_idx, slot.generation)
        } else {
            let Ok(slot_idx) = u32::try_from(self.slots.len()) else {
                return Err(value);
            };
            self.slots.push(Slot {
                generation: 0,
                data: Some(value),
            });
            ArrayHandle::new(slot_idx, 0)
        };
        self.len += 1;
        Ok(handle)
    }

    pub(crate) fn get(&self, handle: ArrayHandle) -> Option<&T> {
        let slot = self.slots.get(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.data.as_ref()
    }

    pub(crate) fn get_mut(&mut self, handle: ArrayHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.data.as_mut()
    }

    /// Take the value out and bump the slot's generation.
    ///
    /// A slot whose generation wraps to 0 is retired rather than reused,
    /// so handles from its first epoch can never resolve again.
    pub(crate) fn remove(&mut self, handle: ArrayHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            // Slot indices fit u32: insert never creates more.
            self.free_list.push(handle.slot() as u32);
        }
        self.len -= 1;
        Some(value)
    }

    /// Live entries in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (ArrayHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let value = slot.data.as_ref()?;
            Some((ArrayHandle::new(idx as u32, slot.generation), value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut table = HandleTable::new();
        let h = table.insert(42i32).unwrap();
        assert_eq!(table.get(h), Some(&42));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn get_mut_modifies_value() {
        let mut table = HandleTable::new();
        let h = table.insert(10i32).unwrap();
        *table.get_mut(h).unwrap() = 20;
        assert_eq!(table.get(h), Some(&20));
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut table = HandleTable::new();
        let h = table.insert(99i32).unwrap();
        assert_eq!(table.remove(h), Some(99));
        assert_eq!(table.get(h), None);
        assert_eq!(table.get_mut(h), None);
        assert_eq!(table.remove(h), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut table = HandleTable::new();
        let old = table.insert(1i32).unwrap();
        table.remove(old);
        let new = table.insert(2i32).unwrap();
        assert_ne!(old, new);
        assert_eq!(old.slot(), new.slot());
        assert_eq!(table.get(old), None);
        assert_eq!(table.get(new), Some(&2));
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32).unwrap();
        table.slots[h.slot()].generation = u32::MAX;
        let last = ArrayHandle::new(h.slot() as u32, u32::MAX);
        assert_eq!(table.remove(last), Some(1));
        let fresh = table.insert(2i32).unwrap();
        assert_ne!(fresh.slot(), h.slot());
        assert_eq!(table.get(h), None);
    }

    #[test]
    fn unknown_handle_resolves_to_none() {
        let table: HandleTable<i32> = HandleTable::new();
        assert_eq!(table.get(ArrayHandle::from_raw(12345)), None);
    }

    #[test]
    fn iter_skips_removed_entries() {
        let mut table = HandleTable::new();
        let a = table.insert('a').unwrap();
        let b = table.insert('b').unwrap();
        let c = table.insert('c').unwrap();
        table.remove(b);
        let seen: Vec<_> = table.iter().collect();
        assert_eq!(seen, vec![(a, &'a'), (c, &'c')]);
    }

    #[test]
    fn raw_round_trip_and_display() {
        let h = ArrayHandle::new(3, 7);
        assert_eq!(ArrayHandle::from_raw(h.to_raw()), h);
        assert_eq!(h.to_string(), "#3v7");
    }
}
