//! Fixed-capacity cache of decompressed chunks.
//!
//! Lookups in a dictionary are strongly local (neighbouring words live in
//! neighbouring chunks), so a handful of slots is enough. Each slot counts its
//! hits and the least-hit slot is replaced on a miss.

use log::trace;

use crate::stardict::types::error::{Result, StardictError};

/// Number of decompressed chunks kept in memory per container.
pub const CHUNK_CACHE_SLOTS: usize = 3;

/// A decompressed chunk owned by one cache slot.
#[derive(Debug)]
pub struct CachedChunk {
    pub chunk_index: u16,
    /// Saturating hit counter, starts at 1 on insertion.
    pub hits: u16,
    pub data: Vec<u8>,
}

/// Bounded chunk cache. At most one slot holds a given chunk index.
#[derive(Debug, Default)]
pub struct ChunkCache {
    slots: [Option<CachedChunk>; CHUNK_CACHE_SLOTS],
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decompressed chunk, loading it with `load` on a miss.
    ///
    /// A failed load leaves every slot untouched.
    pub fn get_or_load<F>(&mut self, chunk_index: u16, load: F) -> Result<&[u8]>
    where
        F: FnOnce(u16) -> Result<Vec<u8>>,
    {
        let Some(slot) = self.find(chunk_index) else {
            let data = load(chunk_index)?;
            return Ok(self.insert(chunk_index, data));
        };

        let Some(cached) = self.slots[slot].as_mut() else {
            return Err(StardictError::Decompression {
                chunk: chunk_index,
                reason: format!("cache slot {} lost its chunk", slot),
            });
        };
        cached.hits = cached.hits.saturating_add(1);
        trace!(
            "Chunk cache hit: chunk {} in slot {} ({} hits)",
            chunk_index, slot, cached.hits
        );
        Ok(&cached.data)
    }

    /// Slot holding `chunk_index`, if cached.
    fn find(&self, chunk_index: u16) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|cached| cached.chunk_index == chunk_index)
        })
    }

    fn insert(&mut self, chunk_index: u16, data: Vec<u8>) -> &[u8] {
        let slot = select_victim(&self.slots);
        if let Some(evicted) = &self.slots[slot] {
            trace!(
                "Chunk cache evicting chunk {} from slot {} ({} hits)",
                evicted.chunk_index, slot, evicted.hits
            );
        }
        trace!("Chunk cache miss: chunk {} stored in slot {}", chunk_index, slot);
        let cached = self.slots[slot].insert(CachedChunk {
            chunk_index,
            hits: 1,
            data,
        });
        &cached.data
    }

    /// Number of chunks currently resident.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `chunk_index` is resident.
    pub fn contains(&self, chunk_index: u16) -> bool {
        self.find(chunk_index).is_some()
    }

    /// Chunk indices per slot, in slot order.
    pub fn resident(&self) -> [Option<u16>; CHUNK_CACHE_SLOTS] {
        self.slots
            .each_ref()
            .map(|slot| slot.as_ref().map(|cached| cached.chunk_index))
    }

    /// Drops every cached buffer.
    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

/// Picks the slot a new chunk goes into.
///
/// The first empty slot wins outright. Otherwise the slot with the fewest hits
/// is chosen, the lowest slot winning ties.
pub fn select_victim(slots: &[Option<CachedChunk>]) -> usize {
    let mut victim = 0;
    let mut min_hits = u16::MAX;
    for (i, slot) in slots.iter().enumerate() {
        match slot {
            None => return i,
            Some(cached) if cached.hits < min_hits => {
                min_hits = cached.hits;
                victim = i;
            }
            Some(_) => {}
        }
    }
    victim
}
