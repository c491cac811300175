//! BucketTable: chain heads over an entry arena.
//!
//! Entries live in a `SlotMap` and are addressed by generational keys; each
//! bucket stores the key of its chain head and each entry stores the key of
//! its successor. Relinking on resize therefore moves no entry and re-hashes
//! no key.

use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
pub(crate) struct HashEntry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u64,
    next: Option<DefaultKey>,
}

impl<K, V> HashEntry<K, V> {
    pub(crate) fn next(&self) -> Option<DefaultKey> {
        self.next
    }
}

#[inline]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    // Fold the high half in so 32-bit targets still see every hash bit.
    ((hash ^ (hash >> 32)) as usize) & (capacity - 1)
}

#[derive(Debug)]
pub(crate) struct BucketTable<K, V> {
    heads: Vec<Option<DefaultKey>>,
    entries: SlotMap<DefaultKey, HashEntry<K, V>>,
}

impl<K, V> BucketTable<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            heads: vec![None; capacity],
            entries: SlotMap::with_key(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, slot: DefaultKey) -> Option<&HashEntry<K, V>> {
        self.entries.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: DefaultKey) -> Option<&mut HashEntry<K, V>> {
        self.entries.get_mut(slot)
    }

    /// Walk the chain for `hash` and return the first entry accepted by `eq`.
    pub(crate) fn find(&self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Option<DefaultKey> {
        let mut cur = self.heads[bucket_index(hash, self.capacity())];
        while let Some(slot) = cur {
            let e = &self.entries[slot];
            if e.hash == hash && eq(&e.key) {
                return Some(slot);
            }
            cur = e.next;
        }
        None
    }

    pub(crate) fn find_mut(
        &mut self,
        hash: u64,
        eq: impl FnMut(&K) -> bool,
    ) -> Option<&mut HashEntry<K, V>> {
        let slot = self.find(hash, eq)?;
        self.entries.get_mut(slot)
    }

    /// Link a new entry at the head of its chain. The caller guarantees the
    /// key is not already present.
    pub(crate) fn push_front(&mut self, hash: u64, key: K, value: V) -> DefaultKey {
        let bucket = bucket_index(hash, self.capacity());
        let next = self.heads[bucket];
        let slot = self.entries.insert(HashEntry {
            key,
            value,
            hash,
            next,
        });
        self.heads[bucket] = Some(slot);
        slot
    }

    /// Unlink and return the first entry in the chain for `hash` accepted by `eq`.
    pub(crate) fn remove_where(
        &mut self,
        hash: u64,
        mut eq: impl FnMut(&K) -> bool,
    ) -> Option<HashEntry<K, V>> {
        let bucket = bucket_index(hash, self.capacity());
        let mut prev = None;
        let mut cur = self.heads[bucket];
        while let Some(slot) = cur {
            let e = &self.entries[slot];
            if e.hash == hash && eq(&e.key) {
                return self.unlink_after(bucket, prev, slot);
            }
            prev = Some(slot);
            cur = e.next;
        }
        None
    }

    /// Unlink and return the entry at `slot`, if it is live.
    pub(crate) fn remove_slot(&mut self, slot: DefaultKey) -> Option<HashEntry<K, V>> {
        let bucket = bucket_index(self.entries.get(slot)?.hash, self.capacity());
        let mut prev = None;
        let mut cur = self.heads[bucket];
        while let Some(c) = cur {
            if c == slot {
                return self.unlink_after(bucket, prev, slot);
            }
            prev = Some(c);
            cur = self.entries[c].next;
        }
        None
    }

    fn unlink_after(
        &mut self,
        bucket: usize,
        prev: Option<DefaultKey>,
        slot: DefaultKey,
    ) -> Option<HashEntry<K, V>> {
        let entry = self.entries.remove(slot)?;
        match prev {
            None => self.heads[bucket] = entry.next,
            Some(p) => self.entries[p].next = entry.next,
        }
        Some(entry)
    }

    /// Relink every entry into `new_capacity` buckets using cached hashes.
    pub(crate) fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two());
        let old = std::mem::replace(&mut self.heads, vec![None; new_capacity]);
        for head in old {
            let mut cur = head;
            while let Some(slot) = cur {
                let e = &mut self.entries[slot];
                cur = e.next;
                let bucket = bucket_index(e.hash, new_capacity);
                e.next = self.heads[bucket];
                self.heads[bucket] = Some(slot);
            }
        }
    }

    /// First chain head at or after `bucket`, with its bucket index.
    pub(crate) fn first_from(&self, bucket: usize) -> Option<(usize, DefaultKey)> {
        self.heads
            .get(bucket..)?
            .iter()
            .enumerate()
            .find_map(|(i, head)| head.map(|slot| (bucket + i, slot)))
    }

    /// Drop entries rejected by `keep`; returns how many were removed.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) -> usize {
        let mut removed = 0;
        for bucket in 0..self.heads.len() {
            let mut prev: Option<DefaultKey> = None;
            let mut cur = self.heads[bucket];
            while let Some(slot) = cur {
                let e = &mut self.entries[slot];
                cur = e.next;
                if keep(&e.key, &mut e.value) {
                    prev = Some(slot);
                    continue;
                }
                match prev {
                    None => self.heads[bucket] = cur,
                    Some(p) => self.entries[p].next = cur,
                }
                self.entries.remove(slot);
                removed += 1;
            }
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.heads.fill(None);
    }

    pub(crate) fn entries(&self) -> slotmap::basic::Iter<'_, DefaultKey, HashEntry<K, V>> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(
        &mut self,
    ) -> slotmap::basic::IterMut<'_, DefaultKey, HashEntry<K, V>> {
        self.entries.iter_mut()
    }

    #[cfg(test)]
    fn chain_len(&self, bucket: usize) -> usize {
        let mut n = 0;
        let mut cur = self.heads[bucket];
        while let Some(slot) = cur {
            n += 1;
            cur = self.entries[slot].next;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_in_table_order(t: &BucketTable<u32, u32>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut pos = t.first_from(0);
        while let Some((bucket, slot)) = pos {
            let e = t.get(slot).unwrap();
            out.push(e.key);
            pos = match e.next() {
                Some(n) => Some((bucket, n)),
                None => t.first_from(bucket + 1),
            };
        }
        out
    }

    /// Invariant: entries sharing a bucket chain are each reachable and
    /// removing the head, middle or tail keeps the rest of the chain intact.
    #[test]
    fn unlink_head_middle_and_tail() {
        let mut t: BucketTable<u32, u32> = BucketTable::with_capacity(4);
        // Same hash: one chain of three, head is the last pushed.
        for k in [1, 2, 3] {
            t.push_front(8, k, k * 10);
        }
        assert_eq!(t.chain_len(bucket_index(8, 4)), 3);

        let mid = t.remove_where(8, |k| *k == 2).unwrap();
        assert_eq!((mid.key, mid.value), (2, 20));
        assert_eq!(t.chain_len(bucket_index(8, 4)), 2);

        let head = t.remove_where(8, |k| *k == 3).unwrap();
        assert_eq!(head.key, 3);
        let tail = t.find(8, |k| *k == 1).unwrap();
        assert!(t.remove_slot(tail).is_some());
        assert_eq!(t.len(), 0);
        assert_eq!(t.chain_len(bucket_index(8, 4)), 0);
        assert!(t.remove_where(8, |_| true).is_none());
    }

    /// Invariant: `find` requires equal cached hashes, not just a shared bucket.
    #[test]
    fn find_compares_cached_hash_before_key() {
        let mut t: BucketTable<u32, u32> = BucketTable::with_capacity(2);
        t.push_front(0, 1, 1);
        // Hash 2 shares bucket 0 with hash 0 in a two-bucket table.
        t.push_front(2, 1, 2);
        let s = t.find(0, |k| *k == 1).unwrap();
        assert_eq!(t.get(s).unwrap().value, 1);
        let s = t.find(2, |k| *k == 1).unwrap();
        assert_eq!(t.get(s).unwrap().value, 2);
    }

    /// Invariant: resize keeps every entry and its arena slot; only links change.
    #[test]
    fn resize_relinks_without_moving_entries() {
        let mut t: BucketTable<u32, u32> = BucketTable::with_capacity(1);
        let slots: Vec<_> = (0..32u32)
            .map(|k| t.push_front(u64::from(k), k, k + 100))
            .collect();
        assert_eq!(t.chain_len(0), 32);

        t.resize(16);
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.len(), 32);
        for (k, slot) in (0..32u32).zip(slots) {
            assert_eq!(t.find(u64::from(k), |x| *x == k), Some(slot));
            assert_eq!(t.get(slot).unwrap().value, k + 100);
        }
        for b in 0..16 {
            assert_eq!(t.chain_len(b), 2);
        }

        let mut seen = keys_in_table_order(&t);
        seen.sort_unstable();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn retain_unlinks_rejected_entries() {
        let mut t: BucketTable<u32, u32> = BucketTable::with_capacity(2);
        for k in 0..10u32 {
            t.push_front(u64::from(k % 3), k, k);
        }
        let removed = t.retain(|k, v| {
            *v += 1;
            k % 2 == 0
        });
        assert_eq!(removed, 5);
        assert_eq!(t.len(), 5);
        let mut left = keys_in_table_order(&t);
        left.sort_unstable();
        assert_eq!(left, vec![0, 2, 4, 6, 8]);
        for k in left {
            let s = t.find(u64::from(k % 3), |x| *x == k).unwrap();
            assert_eq!(t.get(s).unwrap().value, k + 1);
        }
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut t: BucketTable<u32, u32> = BucketTable::with_capacity(8);
        for k in 0..5u32 {
            t.push_front(u64::from(k), k, k);
        }
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.capacity(), 8);
        assert!(t.first_from(0).is_none());
    }

    #[test]
    fn first_from_past_end_is_none() {
        let mut t: BucketTable<u32, u32> = BucketTable::with_capacity(4);
        t.push_front(3, 1, 1);
        assert_eq!(t.first_from(3).map(|(b, _)| b), Some(3));
        assert!(t.first_from(4).is_none());
        assert!(t.first_from(5).is_none());
    }
}
