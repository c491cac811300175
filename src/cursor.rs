//! Fail-fast cursors over a `HashedMultiKeyMap`.
//!
//! A `Cursor` holds no borrow: it remembers which map it came from, the
//! map's generation when it last synchronized, and its position in table
//! order (bucket ascending, then chain order). Every operation takes the map
//! explicitly, so the map can be mutated between calls; a structural change
//! made through anything but the cursor's own `remove_current` is reported
//! by the next `next` as `ConcurrentModification`.
//!
//! `CursorMut` pairs a `Cursor` with an exclusive borrow of its map, so no
//! outside mutation can happen while it lives.

use crate::bucket_table::HashEntry;
use crate::composite_key::{CompositeKey, KeyTuple};
use crate::error::{MapError, Result};
use crate::generation::{Generation, MapId};
use crate::multi_key_map::HashedMultiKeyMap;
use slotmap::DefaultKey;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Position {
    Unstarted,
    At { bucket: usize, slot: DefaultKey },
    /// Current entry was removed through this cursor; resume from `next`.
    Vacated {
        bucket: usize,
        next: Option<DefaultKey>,
    },
    Exhausted,
}

/// Detached fail-fast cursor.
///
/// ```
/// use multikey_hashmap::{HashedMultiKeyMap, MapError};
///
/// let mut m: HashedMultiKeyMap<(u8, char), u32> = HashedMultiKeyMap::new();
/// m.put((1, 'a'), 10);
/// m.put((2, 'b'), 20);
///
/// let mut c = m.cursor();
/// assert_eq!(c.value(&m), Err(MapError::InvalidIteratorState));
/// while c.next(&m)? {
///     if c.key(&m)?.0 == 1 {
///         c.remove_current(&mut m)?;
///     } else {
///         c.set_value(&mut m, 21)?;
///     }
/// }
/// assert_eq!(m.len(), 1);
/// assert_eq!(m.get(&(&2, &'b')), Some(&21));
/// # Ok::<(), MapError>(())
/// ```
#[derive(Debug)]
pub struct Cursor {
    owner: MapId,
    expected: Generation,
    position: Position,
}

impl Cursor {
    pub(crate) fn new(owner: MapId, expected: Generation) -> Self {
        Self {
            owner,
            expected,
            position: Position::Unstarted,
        }
    }

    /// True while positioned on an entry.
    pub fn is_positioned(&self) -> bool {
        matches!(self.position, Position::At { .. })
    }

    /// Advance to the next entry in table order.
    ///
    /// Returns `Ok(false)` once the traversal is exhausted; it stays exhausted.
    pub fn next<K, V, S>(&mut self, map: &HashedMultiKeyMap<K, V, S>) -> Result<bool>
    where
        K: KeyTuple,
    {
        self.check_owner(map)?;
        self.check_in_sync(map)?;
        let table = map.table();
        let found = match self.position {
            Position::Unstarted => table.first_from(0),
            Position::At { bucket, slot } => match table.get(slot).and_then(|e| e.next()) {
                Some(next) => Some((bucket, next)),
                None => table.first_from(bucket + 1),
            },
            Position::Vacated {
                bucket,
                next: Some(next),
            } => Some((bucket, next)),
            Position::Vacated { bucket, next: None } => table.first_from(bucket + 1),
            Position::Exhausted => None,
        };
        self.position = match found {
            Some((bucket, slot)) => Position::At { bucket, slot },
            None => Position::Exhausted,
        };
        Ok(found.is_some())
    }

    /// Key of the current entry.
    pub fn key<'m, K, V, S>(&self, map: &'m HashedMultiKeyMap<K, V, S>) -> Result<&'m K>
    where
        K: KeyTuple,
    {
        self.entry(map).map(|e| e.key.parts())
    }

    pub fn value<'m, K, V, S>(&self, map: &'m HashedMultiKeyMap<K, V, S>) -> Result<&'m V>
    where
        K: KeyTuple,
    {
        self.entry(map).map(|e| &e.value)
    }

    pub fn value_mut<'m, K, V, S>(
        &self,
        map: &'m mut HashedMultiKeyMap<K, V, S>,
    ) -> Result<&'m mut V>
    where
        K: KeyTuple,
    {
        self.check_owner(map)?;
        let (_, slot) = self.current()?;
        let found = map.generation();
        map.table_mut()
            .get_mut(slot)
            .map(|e| &mut e.value)
            .ok_or_else(|| self.concurrent_modification(found))
    }

    /// Replace the current value in place and return the old one. Not a
    /// structural change.
    pub fn set_value<K, V, S>(&self, map: &mut HashedMultiKeyMap<K, V, S>, value: V) -> Result<V>
    where
        K: KeyTuple,
    {
        self.value_mut(map)
            .map(|slot| core::mem::replace(slot, value))
    }

    /// Remove the current entry. The cursor resynchronizes with the map, so
    /// the following `next` continues with the entry after the removed one.
    pub fn remove_current<K, V, S>(&mut self, map: &mut HashedMultiKeyMap<K, V, S>) -> Result<(K, V)>
    where
        K: KeyTuple,
    {
        self.check_owner(map)?;
        let (bucket, slot) = self.current()?;
        self.check_in_sync(map)?;
        let found = map.generation();
        let entry = map
            .remove_slot(slot)
            .ok_or_else(|| self.concurrent_modification(found))?;
        self.position = Position::Vacated {
            bucket,
            next: entry.next(),
        };
        self.expected = map.generation();
        Ok((entry.key.into_parts(), entry.value))
    }

    fn entry<'m, K, V, S>(
        &self,
        map: &'m HashedMultiKeyMap<K, V, S>,
    ) -> Result<&'m HashEntry<CompositeKey<K>, V>>
    where
        K: KeyTuple,
    {
        self.check_owner(map)?;
        let (_, slot) = self.current()?;
        map.table()
            .get(slot)
            .ok_or_else(|| self.concurrent_modification(map.generation()))
    }

    fn current(&self) -> Result<(usize, DefaultKey)> {
        match self.position {
            Position::At { bucket, slot } => Ok((bucket, slot)),
            _ => Err(MapError::InvalidIteratorState),
        }
    }

    fn check_owner<K, V, S>(&self, map: &HashedMultiKeyMap<K, V, S>) -> Result<()>
    where
        K: KeyTuple,
    {
        if map.id() == self.owner {
            Ok(())
        } else {
            Err(MapError::WrongMap)
        }
    }

    fn check_in_sync<K, V, S>(&self, map: &HashedMultiKeyMap<K, V, S>) -> Result<()>
    where
        K: KeyTuple,
    {
        let found = map.generation();
        if found == self.expected {
            Ok(())
        } else {
            Err(self.concurrent_modification(found))
        }
    }

    fn concurrent_modification(&self, found: Generation) -> MapError {
        tracing::debug!(
            expected = self.expected.get(),
            found = found.get(),
            "cursor detected concurrent modification"
        );
        MapError::ConcurrentModification {
            expected: self.expected.get(),
            found: found.get(),
        }
    }
}

/// Cursor that exclusively borrows its map for its whole lifetime.
///
/// ```
/// use multikey_hashmap::HashedMultiKeyMap;
///
/// let mut m: HashedMultiKeyMap<(u8, u8), u8> = (0..6u8).map(|i| ((i, i), i)).collect();
/// let mut c = m.cursor_mut();
/// while c.next().unwrap() {
///     if c.value().unwrap() % 2 == 1 {
///         c.remove_current().unwrap();
///     }
/// }
/// assert_eq!(m.len(), 3);
/// ```
pub struct CursorMut<'a, K, V, S> {
    map: &'a mut HashedMultiKeyMap<K, V, S>,
    cursor: Cursor,
}

impl<'a, K, V, S> CursorMut<'a, K, V, S>
where
    K: KeyTuple,
{
    pub(crate) fn new(map: &'a mut HashedMultiKeyMap<K, V, S>) -> Self {
        let cursor = map.cursor();
        Self { map, cursor }
    }

    pub fn next(&mut self) -> Result<bool> {
        self.cursor.next(&*self.map)
    }

    pub fn is_positioned(&self) -> bool {
        self.cursor.is_positioned()
    }

    pub fn key(&self) -> Result<&K> {
        self.cursor.key(&*self.map)
    }

    pub fn value(&self) -> Result<&V> {
        self.cursor.value(&*self.map)
    }

    pub fn value_mut(&mut self) -> Result<&mut V> {
        self.cursor.value_mut(&mut *self.map)
    }

    pub fn set_value(&mut self, value: V) -> Result<V> {
        self.cursor.set_value(&mut *self.map, value)
    }

    pub fn remove_current(&mut self) -> Result<(K, V)> {
        self.cursor.remove_current(&mut *self.map)
    }
}
