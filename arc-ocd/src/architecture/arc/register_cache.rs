//! Cache of the register values captured while the core is halted.

use std::collections::BTreeMap;

use crate::architecture::arc::registers::{RegisterDescription, RegisterId};

/// Cached register values of an ARC core.
///
/// The values are only trustworthy while the core is halted. Whenever the core
/// runs or is reset, the cache is invalidated and the values have to be
/// captured again on the next debug entry.
#[derive(Debug, Default)]
pub struct RegisterCache {
    entries: BTreeMap<RegisterId, CacheEntry>,
    generation: u64,
}

impl RegisterCache {
    /// Creates an empty cache. Call [`RegisterCache::build`] before storing values.
    pub fn new() -> Self {
        RegisterCache {
            entries: BTreeMap::new(),
            generation: 0,
        }
    }

    /// (Re)creates an entry for every register of `catalog`. All entries start out stale.
    pub fn build(&mut self, catalog: &[RegisterDescription]) {
        self.entries = catalog
            .iter()
            .map(|description| {
                (
                    description.id,
                    CacheEntry {
                        name: description.name,
                        value: None,
                    },
                )
            })
            .collect();
        self.generation += 1;

        tracing::debug!("Built register cache with {} registers", self.entries.len());
    }

    /// Returns `true` once [`RegisterCache::build`] was called.
    pub fn is_built(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Marks every entry as stale.
    pub fn invalidate(&mut self) {
        for entry in self.entries.values_mut() {
            entry.value = None;
        }
        self.generation += 1;
    }

    /// Number of times the cache was built or invalidated.
    ///
    /// A value captured before the generation changed must not be used anymore.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stores a register value which was read from the target.
    pub fn store(&mut self, id: RegisterId, value: u32) {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                tracing::trace!("{} <- {:#010x}", entry.name(), value);
                entry.value = Some(value);
            }
            None => tracing::warn!("Register {:?} is not in the cache, ignoring value", id),
        }
    }

    /// Returns the cached value of `id`, or `None` if it is stale or unknown.
    pub fn value_of(&self, id: RegisterId) -> Option<u32> {
        self.entries.get(&id).and_then(|entry| entry.value)
    }

    /// Returns `true` if a value for `id` was captured since the last invalidation.
    pub fn is_valid(&self, id: RegisterId) -> bool {
        self.value_of(id).is_some()
    }

    /// Iterates over all entries in the cache.
    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Number of registers in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache was not built yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single register in the [`RegisterCache`].
#[derive(Debug, PartialEq, Eq)]
pub struct CacheEntry {
    name: &'static str,

    /// The value of the register, `None` if it is stale.
    value: Option<u32>,
}

impl CacheEntry {
    /// Name of the register, taken from the register catalog.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The captured value, `None` if it is stale.
    pub fn value(&self) -> Option<u32> {
        self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::architecture::arc::registers::{ARC_REGISTERS, AUX_PC};

    #[test]
    fn build_creates_stale_entries() {
        let mut cache = RegisterCache::new();
        assert!(!cache.is_built());

        cache.build(ARC_REGISTERS);

        assert_eq!(cache.len(), ARC_REGISTERS.len());
        assert!(cache.iter().all(|(_, entry)| entry.value().is_none()));
    }

    #[test]
    fn invalidate_drops_values() {
        let mut cache = RegisterCache::new();
        cache.build(ARC_REGISTERS);
        cache.store(RegisterId::Aux(AUX_PC), 0x1000);

        let generation = cache.generation();
        cache.invalidate();

        assert!(!cache.is_valid(RegisterId::Aux(AUX_PC)));
        assert!(cache.iter().all(|(_, entry)| entry.value().is_none()));
        assert_eq!(cache.generation(), generation + 1);
    }

    #[test]
    fn unknown_registers_are_not_stored() {
        let mut cache = RegisterCache::new();
        cache.store(RegisterId::Aux(0x999), 1);

        assert_eq!(cache.value_of(RegisterId::Aux(0x999)), None);
    }
}
