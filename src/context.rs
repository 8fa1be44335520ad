//! Context links - weak references from engine resources back to proxies.
//!
//! Each engine resource has a `u64` user-data slot. A proxy stores a
//! [`ContextToken`] there, and the token resolves through a per-kind
//! [`ContextRegistry`] to a `Weak` reference to the proxy.
//!
//! Tokens are generational: a slot index plus the generation the slot had when
//! the link was made. Unlinking bumps the generation, so an old token copied
//! out of a user-data slot can never resolve to a newer proxy that reuses the
//! slot.

use std::rc::{Rc, Weak};

/// Token stored in an engine resource's user-data slot. `0` means no link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct ContextToken(u64);

impl ContextToken {
    pub const NONE: Self = Self(0);

    fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64 + 1))
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Slot index, or `None` for a malformed token with an empty index part.
    fn index(self) -> Option<usize> {
        (self.0 & 0xFFFF_FFFF).checked_sub(1).map(|index| index as usize)
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

/// A token that no longer resolves to a live proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StaleLink;

struct Slot<T> {
    generation: u32,
    target: Option<Weak<T>>,
}

/// Slot map of weak proxy references for one resource kind.
pub(crate) struct ContextRegistry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> ContextRegistry<T> {
    pub const fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new() }
    }

    /// Store `target` and return the token that resolves to it.
    pub fn link(&mut self, target: Weak<T>) -> ContextToken {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot { generation: 0, target: None });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.target = Some(target);
        ContextToken::new(index, slot.generation)
    }

    /// Resolve a token.
    ///
    /// `Ok(None)` for the empty token, `Err(StaleLink)` when the slot has been
    /// reclaimed or the proxy is gone.
    pub fn resolve(&self, token: ContextToken) -> Result<Option<Rc<T>>, StaleLink> {
        if token.is_none() {
            return Ok(None);
        }
        let slot = token.index().and_then(|index| self.slots.get(index)).ok_or(StaleLink)?;
        if slot.generation != token.generation() {
            return Err(StaleLink);
        }
        slot.target.as_ref().and_then(Weak::upgrade).map(Some).ok_or(StaleLink)
    }

    /// Drop the link behind `token`. Returns `false` if it was already gone.
    pub fn unlink(&mut self, token: ContextToken) -> bool {
        if token.is_none() {
            return false;
        }
        let Some(index) = token.index() else {
            return false;
        };
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.generation != token.generation() || slot.target.is_none() {
            return false;
        }
        slot.target = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index as u32);
        true
    }
}

impl<T> Default for ContextRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
