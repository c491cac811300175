//! HashedMultiKeyMap: chained-bucket engine shared by every fixed-arity map.

use crate::bucket_table::{BucketTable, HashEntry};
use crate::composite_key::{CompositeKey, KeyQuery, KeyTuple};
use crate::config::{threshold_for, MapConfig, MAX_CAPACITY};
use crate::cursor::{Cursor, CursorMut};
use crate::error::Result;
use crate::generation::{Generation, MapId};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::DefaultKey;

/// Map from a composite key `K` (a tuple of 2 to 4 components) to `V`.
///
/// Lookups take a [`KeyQuery`], typically a tuple of borrowed components:
///
/// ```
/// use multikey_hashmap::HashedMultiKeyMap;
///
/// let mut m: HashedMultiKeyMap<(u32, String), f64> = HashedMultiKeyMap::new();
/// m.put((9606, "P69905".to_string()), 0.5);
/// assert_eq!(m.get(&(&9606, "P69905")), Some(&0.5));
/// ```
pub struct HashedMultiKeyMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    table: BucketTable<CompositeKey<K>, V>,
    load_factor: f64,
    threshold: usize,
    generation: Generation,
    id: MapId,
}

impl<K, V> HashedMultiKeyMap<K, V>
where
    K: KeyTuple,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Fails with `InvalidArgument` when `capacity` exceeds `MAX_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(MapConfig::new().with_initial_capacity(capacity))
    }

    pub fn with_config(config: MapConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for HashedMultiKeyMap<K, V>
where
    K: KeyTuple,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(&K, &V)`; order is unspecified.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, HashEntry<CompositeKey<K>, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key.parts(), &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(&K, &mut V)`; order is unspecified.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, HashEntry<CompositeKey<K>, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key.parts(), &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V, S> HashedMultiKeyMap<K, V, S>
where
    K: KeyTuple,
{
    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Current bucket count; only ever grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Number of structural changes so far. Replacing the value of an
    /// existing key does not count.
    pub fn modification_count(&self) -> u64 {
        self.generation.get()
    }

    /// Remove every entry; capacity is kept.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.table.clear();
            self.generation.bump();
        }
    }

    /// Keep only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let removed = self.table.retain(|k, v| f(k.parts(), v));
        if removed > 0 {
            self.generation.bump();
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.entries(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.entries_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Detached fail-fast cursor; every call takes this map as an argument.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.id, self.generation)
    }

    /// Cursor holding an exclusive borrow of this map.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, S> {
        CursorMut::new(self)
    }

    pub(crate) fn id(&self) -> MapId {
        self.id
    }

    pub(crate) fn generation(&self) -> Generation {
        self.generation
    }

    pub(crate) fn table(&self) -> &BucketTable<CompositeKey<K>, V> {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut BucketTable<CompositeKey<K>, V> {
        &mut self.table
    }

    /// Structural removal by arena slot, used by cursors.
    pub(crate) fn remove_slot(&mut self, slot: DefaultKey) -> Option<HashEntry<CompositeKey<K>, V>> {
        let entry = self.table.remove_slot(slot)?;
        self.generation.bump();
        Some(entry)
    }
}

impl<K, V, S> HashedMultiKeyMap<K, V, S>
where
    K: KeyTuple,
    S: BuildHasher,
{
    /// Default configuration with a custom hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_config(MapConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config, hasher))
    }

    fn from_config(config: MapConfig, hasher: S) -> Self {
        let capacity = config.bucket_count();
        Self {
            hasher,
            table: BucketTable::with_capacity(capacity),
            load_factor: config.load_factor(),
            threshold: threshold_for(capacity, config.load_factor()),
            generation: Generation::default(),
            id: MapId::fresh(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Insert `value` under `key`, returning the value it replaced.
    ///
    /// Replacing a value is not a structural change; inserting a new key is,
    /// and may double the bucket count.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put_key(CompositeKey::new(key), value)
    }

    pub fn put_key(&mut self, key: CompositeKey<K>, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        if let Some(entry) = self.table.find_mut(hash, |k| *k == key) {
            return Some(core::mem::replace(&mut entry.value, value));
        }
        self.table.push_front(hash, key, value);
        self.generation.bump();
        if self.table.len() > self.threshold {
            self.grow();
        }
        None
    }

    pub fn get<Q>(&self, query: &Q) -> Option<&V>
    where
        Q: ?Sized + KeyQuery<K>,
    {
        let hash = self.make_hash(query);
        let slot = self.table.find(hash, |k| query.matches(k.parts()))?;
        self.table.get(slot).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, query: &Q) -> Option<&mut V>
    where
        Q: ?Sized + KeyQuery<K>,
    {
        let hash = self.make_hash(query);
        self.table
            .find_mut(hash, |k| query.matches(k.parts()))
            .map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, query: &Q) -> bool
    where
        Q: ?Sized + KeyQuery<K>,
    {
        let hash = self.make_hash(query);
        self.table
            .find(hash, |k| query.matches(k.parts()))
            .is_some()
    }

    pub fn remove<Q>(&mut self, query: &Q) -> Option<V>
    where
        Q: ?Sized + KeyQuery<K>,
    {
        self.remove_entry(query).map(|(_, v)| v)
    }

    /// Unlink the entry for `query` and return its owned key and value.
    /// An absent key leaves the map, including its modification count, untouched.
    pub fn remove_entry<Q>(&mut self, query: &Q) -> Option<(K, V)>
    where
        Q: ?Sized + KeyQuery<K>,
    {
        let hash = self.make_hash(query);
        let entry = self
            .table
            .remove_where(hash, |k| query.matches(k.parts()))?;
        self.generation.bump();
        Some((entry.key.into_parts(), entry.value))
    }

    fn grow(&mut self) {
        let old = self.table.capacity();
        if old >= MAX_CAPACITY {
            self.threshold = usize::MAX;
            return;
        }
        let new = old * 2;
        self.table.resize(new);
        self.threshold = threshold_for(new, self.load_factor);
        tracing::trace!(
            old_capacity = old,
            new_capacity = new,
            len = self.table.len(),
            "rehashed bucket table"
        );
    }
}

impl<K, V, S> fmt::Debug for HashedMultiKeyMap<K, V, S>
where
    K: KeyTuple + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for HashedMultiKeyMap<K, V, S>
where
    K: KeyTuple,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashedMultiKeyMap<K, V, S>
where
    K: KeyTuple,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashedMultiKeyMap<K, V, S>
where
    K: KeyTuple,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
