//! HashIndex: content-to-handle deduplication over an [`EntryStore`].
//!
//! The index is a prime-sized bucket table plus a chain array indexed by
//! handle. A bucket holds the handle of the first entry hashing there;
//! `chain_next[h]` holds the next handle in `h`'s bucket chain. Both use
//! `u32::MAX` as the end-of-chain sentinel, so chains are walked by
//! handle arithmetic with no pointers into entry storage. Entry bytes
//! stay owned by the store; the index only ever reads them through the
//! store's handle accessors.

use crate::entry_store::{EntryStore, Handle, Word};
use crate::error::{self, StoreError};
use crate::hashing::{next_prime, HashStrategy};

/// End-of-chain marker in both the bucket table and the chain array.
const NIL: u32 = u32::MAX;

/// Position of a chain cell: either a bucket head or the `chain_next`
/// cell of an entry already on the chain.
#[derive(Copy, Clone, Debug)]
enum ChainSlot {
    Bucket(usize),
    Chain(usize),
}

/// Bucket occupancy summary, see [`HashIndex::stats`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndexStats {
    /// Total bucket count (a prime).
    pub bucket_count: usize,
    /// Buckets with at least one entry.
    pub occupied_buckets: usize,
    /// Length of the most crowded chain.
    pub longest_chain: usize,
}

/// Deduplicating content index attached to an [`EntryStore`].
///
/// Holds handles by value only and never outlives the store it indexes;
/// dropping it (via [`EntryStore::detach_index`]) leaves all entries in
/// place.
#[derive(Clone)]
pub struct HashIndex {
    buckets: Vec<u32>,
    chain_next: Vec<u32>,
    strategy: HashStrategy,
}

impl HashIndex {
    fn with_capacity(capacity: usize, strategy: HashStrategy) -> Result<Self, StoreError> {
        let size = next_prime(capacity);
        let mut buckets = Vec::new();
        error::try_reserve(&mut buckets, size)?;
        buckets.resize(size, NIL);
        let mut chain_next = Vec::new();
        error::try_reserve(&mut chain_next, capacity)?;
        Ok(Self {
            buckets,
            chain_next,
            strategy,
        })
    }

    /// Number of buckets currently in the table.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The hash policy fixed at attach time.
    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    /// Index footprint in bytes (bucket table, chain array, header).
    pub fn memory_bytes(&self) -> usize {
        self.buckets.capacity() * std::mem::size_of::<u32>()
            + self.chain_next.capacity() * std::mem::size_of::<u32>()
            + std::mem::size_of::<Self>()
    }

    /// Walk every chain and summarize bucket occupancy.
    pub fn stats(&self) -> IndexStats {
        let mut occupied = 0;
        let mut longest = 0;
        for &head in &self.buckets {
            let mut n = 0;
            let mut h = head;
            while h != NIL {
                n += 1;
                h = self.chain_next[h as usize];
            }
            if n > 0 {
                occupied += 1;
            }
            longest = longest.max(n);
        }
        IndexStats {
            bucket_count: self.buckets.len(),
            occupied_buckets: occupied,
            longest_chain: longest,
        }
    }

    fn slot_value(&self, slot: ChainSlot) -> u32 {
        match slot {
            ChainSlot::Bucket(i) => self.buckets[i],
            ChainSlot::Chain(i) => self.chain_next[i],
        }
    }

    fn set_slot(&mut self, slot: ChainSlot, handle: u32) {
        match slot {
            ChainSlot::Bucket(i) => self.buckets[i] = handle,
            ChainSlot::Chain(i) => self.chain_next[i] = handle,
        }
    }

    /// Find `entry`'s chain position: the cell holding an equal entry's
    /// handle, or the end-of-chain cell a new handle would be linked
    /// into. Comparison is full word-for-word equality.
    fn lookup_slot(&self, store: &EntryStore, entry: &[Word]) -> ChainSlot {
        let bucket = self.strategy.hash(entry) as usize % self.buckets.len();
        let mut slot = ChainSlot::Bucket(bucket);
        loop {
            let h = self.slot_value(slot);
            if h == NIL || store.entry_slice(h as usize) == entry {
                return slot;
            }
            slot = ChainSlot::Chain(h as usize);
        }
    }

    fn lookup(&self, store: &EntryStore, entry: &[Word]) -> Option<Handle> {
        let h = self.slot_value(self.lookup_slot(store, entry));
        (h != NIL).then(|| Handle::from_raw(h))
    }

    fn insert(&mut self, store: &mut EntryStore, entry: &[Word]) -> Result<Handle, StoreError> {
        store.check_width(entry)?;
        // Load-factor bound: live entries never exceed bucket slots.
        if store.len() > self.buckets.len() {
            self.rehash(store)?;
        }
        let slot = self.lookup_slot(store, entry);
        let existing = self.slot_value(slot);
        if existing != NIL {
            return Ok(Handle::from_raw(existing));
        }
        // Reserve the chain slot first so a failed reservation cannot
        // leave a pushed entry unlinked.
        error::try_reserve(&mut self.chain_next, 1)?;
        let handle = store.push(entry)?;
        self.chain_next.push(NIL);
        self.set_slot(slot, handle.raw());
        debug_assert_eq!(self.chain_next.len(), store.len());
        Ok(handle)
    }

    /// Double the bucket table to the next prime and rebuild all chains.
    fn rehash(&mut self, store: &EntryStore) -> Result<(), StoreError> {
        let new_size = next_prime(2 * self.buckets.len());
        let grow = new_size.saturating_sub(self.buckets.len());
        error::try_reserve(&mut self.buckets, grow)?;
        self.buckets.resize(new_size, NIL);
        self.rebuild(store)
    }

    /// Clear and relink every chain from the store's current contents,
    /// in ascending handle order. Handles are never reassigned; only the
    /// index structures change.
    ///
    /// # Panics
    ///
    /// Panics when two handles hold equal content (the index invariant
    /// that equal content maps to one handle is already broken) or when
    /// the rebuild does not account for every entry.
    fn rebuild(&mut self, store: &EntryStore) -> Result<(), StoreError> {
        self.buckets.fill(NIL);
        self.chain_next.clear();
        error::try_reserve(&mut self.chain_next, store.len())?;
        for (handle, entry) in store.iter() {
            let slot = self.lookup_slot(store, entry);
            assert!(
                self.slot_value(slot) == NIL,
                "index rebuild found entry {handle} duplicating existing content"
            );
            self.chain_next.push(NIL);
            self.set_slot(slot, handle.raw());
        }
        assert_eq!(
            self.chain_next.len(),
            store.len(),
            "index rebuild did not account for every entry"
        );
        Ok(())
    }
}

impl EntryStore {
    /// Attach a deduplicating index sized for `capacity` entries (the
    /// bucket table rounds up to the next prime), using the default
    /// [`HashStrategy`]. Existing entries are indexed immediately.
    ///
    /// Fails with [`StoreError::AlreadyIndexed`] if an index is already
    /// attached.
    ///
    /// # Panics
    ///
    /// Panics if existing entries contain content-equal duplicates;
    /// such a store cannot satisfy the one-handle-per-content contract.
    pub fn attach_index(&mut self, capacity: usize) -> Result<(), StoreError> {
        self.attach_index_with(capacity, HashStrategy::default())
    }

    /// [`attach_index`](EntryStore::attach_index) with an explicit hash
    /// policy. The policy is fixed until the index is detached.
    pub fn attach_index_with(
        &mut self,
        capacity: usize,
        strategy: HashStrategy,
    ) -> Result<(), StoreError> {
        if self.index.is_some() {
            return Err(StoreError::AlreadyIndexed);
        }
        let mut index = HashIndex::with_capacity(capacity, strategy)?;
        index.rebuild(self)?;
        self.index = Some(index);
        Ok(())
    }

    /// Drop the attached index, leaving all entries in place. No-op when
    /// no index is attached.
    pub fn detach_index(&mut self) {
        self.index = None;
    }

    /// The attached index, if any.
    pub fn index(&self) -> Option<&HashIndex> {
        self.index.as_ref()
    }

    /// Deduplicating append: return the handle of an existing entry
    /// equal to `entry`, or append `entry` and return its fresh handle.
    /// Rehashes first when the entry count has outgrown the bucket
    /// table, preserving every existing handle.
    ///
    /// Fails with [`StoreError::NotIndexed`] when no index is attached
    /// and [`StoreError::EntryWidthMismatch`] on a wrong-width slice.
    pub fn insert(&mut self, entry: &[Word]) -> Result<Handle, StoreError> {
        let mut index = self.index.take().ok_or(StoreError::NotIndexed)?;
        let result = index.insert(self, entry);
        self.index = Some(index);
        result
    }

    /// Read-only content lookup through the attached index. `None` when
    /// no index is attached or no equal entry exists.
    pub fn lookup(&self, entry: &[Word]) -> Option<Handle> {
        let index = self.index.as_ref()?;
        if entry.len() != self.entry_words() {
            return None;
        }
        index.lookup(self, entry)
    }
}
