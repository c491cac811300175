//! Binary, ternary and quaternary maps with positional key components.
//!
//! Each type wraps a `HashedMultiKeyMap` keyed by a tuple and adds a
//! component-per-argument API, `Option`-taking variants that reject absent
//! components with `InvalidKey`, and a typed cursor with one accessor per
//! component.

use crate::config::MapConfig;
use crate::cursor::Cursor;
use crate::error::{MapError, Result};
use crate::multi_key_map::{HashedMultiKeyMap, Iter};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

macro_rules! fixed_arity_map {
    (@component $map:ident [$($g:ident),+] $ty:ident $accessor:ident $idx:tt) => {
        #[doc = concat!("Key component ", stringify!($idx), " of the current entry.")]
        pub fn $accessor<'m, $($g,)+ V, S>(&self, map: &'m $map<$($g,)+ V, S>) -> Result<&'m $ty>
        where
            $($g: Eq + Hash,)+
        {
            self.raw.key(&map.inner).map(|k| &k.$idx)
        }
    };

    (@components $map:ident $cursor:ident $all:tt $(($ty:ident $accessor:ident $idx:tt))+) => {
        impl $cursor {
            $(fixed_arity_map!(@component $map $all $ty $accessor $idx);)+
        }
    };

    (
        $(#[$map_meta:meta])*
        map $map:ident;
        $(#[$cursor_meta:meta])*
        cursor $cursor:ident;
        $(#[$iter_meta:meta])*
        iter $iter:ident;
        components { $($ty:ident $q:ident $var:ident $accessor:ident $idx:tt),+ $(,)? }
    ) => {
        $(#[$map_meta])*
        pub struct $map<$($ty,)+ V, S = DefaultHashBuilder> {
            inner: HashedMultiKeyMap<($($ty,)+), V, S>,
        }

        impl<$($ty,)+ V> $map<$($ty,)+ V>
        where
            $($ty: Eq + Hash,)+
        {
            pub fn new() -> Self {
                Self {
                    inner: HashedMultiKeyMap::new(),
                }
            }

            /// Fails with `InvalidArgument` when `capacity` exceeds `MAX_CAPACITY`.
            pub fn with_capacity(capacity: usize) -> Result<Self> {
                HashedMultiKeyMap::with_capacity(capacity).map(|inner| Self { inner })
            }

            pub fn with_config(config: MapConfig) -> Result<Self> {
                HashedMultiKeyMap::with_config(config).map(|inner| Self { inner })
            }
        }

        impl<$($ty,)+ V> Default for $map<$($ty,)+ V>
        where
            $($ty: Eq + Hash,)+
        {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<$($ty,)+ V, S> $map<$($ty,)+ V, S>
        where
            $($ty: Eq + Hash,)+
        {
            pub fn len(&self) -> usize {
                self.inner.len()
            }
            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }
            pub fn capacity(&self) -> usize {
                self.inner.capacity()
            }
            pub fn load_factor(&self) -> f64 {
                self.inner.load_factor()
            }
            pub fn modification_count(&self) -> u64 {
                self.inner.modification_count()
            }

            pub fn clear(&mut self) {
                self.inner.clear()
            }

            pub fn retain<F>(&mut self, mut f: F)
            where
                F: FnMut($(&$ty,)+ &mut V) -> bool,
            {
                self.inner.retain(|k, v| f($(&k.$idx,)+ v))
            }

            pub fn iter(&self) -> $iter<'_, $($ty,)+ V> {
                $iter {
                    inner: self.inner.iter(),
                }
            }

            pub fn cursor(&self) -> $cursor {
                $cursor {
                    raw: self.inner.cursor(),
                }
            }

            pub fn as_multi_key_map(&self) -> &HashedMultiKeyMap<($($ty,)+), V, S> {
                &self.inner
            }

            pub fn into_multi_key_map(self) -> HashedMultiKeyMap<($($ty,)+), V, S> {
                self.inner
            }
        }

        impl<$($ty,)+ V, S> $map<$($ty,)+ V, S>
        where
            $($ty: Eq + Hash,)+
            S: BuildHasher,
        {
            pub fn with_hasher(hasher: S) -> Self {
                Self {
                    inner: HashedMultiKeyMap::with_hasher(hasher),
                }
            }

            pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self> {
                HashedMultiKeyMap::with_config_and_hasher(config, hasher).map(|inner| Self { inner })
            }

            /// Insert or replace; returns the value previously stored under this key.
            pub fn put(&mut self, $($var: $ty,)+ value: V) -> Option<V> {
                self.inner.put(($($var,)+), value)
            }

            /// Components may be passed in any borrowed form, e.g. `&str`
            /// for a `String` component.
            pub fn get<$($q),+>(&self, $($var: &$q),+) -> Option<&V>
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                self.inner.get(&($($var,)+))
            }

            pub fn get_mut<$($q),+>(&mut self, $($var: &$q),+) -> Option<&mut V>
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                self.inner.get_mut(&($($var,)+))
            }

            pub fn contains_key<$($q),+>(&self, $($var: &$q),+) -> bool
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                self.inner.contains_key(&($($var,)+))
            }

            pub fn remove<$($q),+>(&mut self, $($var: &$q),+) -> Option<V>
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                self.inner.remove(&($($var,)+))
            }

            /// `put` that fails with `InvalidKey` when a component is `None`.
            pub fn try_put(&mut self, $($var: Option<$ty>,)+ value: V) -> Result<Option<V>> {
                $(let $var = $var.ok_or(MapError::InvalidKey { position: $idx })?;)+
                Ok(self.put($($var,)+ value))
            }

            pub fn try_get<$($q),+>(&self, $($var: Option<&$q>),+) -> Result<Option<&V>>
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                $(let $var = $var.ok_or(MapError::InvalidKey { position: $idx })?;)+
                Ok(self.get($($var),+))
            }

            pub fn try_contains_key<$($q),+>(&self, $($var: Option<&$q>),+) -> Result<bool>
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                $(let $var = $var.ok_or(MapError::InvalidKey { position: $idx })?;)+
                Ok(self.contains_key($($var),+))
            }

            pub fn try_remove<$($q),+>(&mut self, $($var: Option<&$q>),+) -> Result<Option<V>>
            where
                $($ty: Borrow<$q>, $q: ?Sized + Eq + Hash,)+
            {
                $(let $var = $var.ok_or(MapError::InvalidKey { position: $idx })?;)+
                Ok(self.remove($($var),+))
            }
        }

        impl<$($ty,)+ V, S> fmt::Debug for $map<$($ty,)+ V, S>
        where
            $($ty: Eq + Hash + fmt::Debug,)+
            V: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&self.inner, f)
            }
        }

        impl<$($ty,)+ V, S> Extend<($($ty,)+ V)> for $map<$($ty,)+ V, S>
        where
            $($ty: Eq + Hash,)+
            S: BuildHasher,
        {
            fn extend<I: IntoIterator<Item = ($($ty,)+ V)>>(&mut self, iter: I) {
                for ($($var,)+ value) in iter {
                    self.put($($var,)+ value);
                }
            }
        }

        impl<$($ty,)+ V, S> FromIterator<($($ty,)+ V)> for $map<$($ty,)+ V, S>
        where
            $($ty: Eq + Hash,)+
            S: BuildHasher + Default,
        {
            fn from_iter<I: IntoIterator<Item = ($($ty,)+ V)>>(iter: I) -> Self {
                let mut map = Self::with_hasher(S::default());
                map.extend(iter);
                map
            }
        }

        $(#[$iter_meta])*
        pub struct $iter<'a, $($ty,)+ V> {
            inner: Iter<'a, ($($ty,)+), V>,
        }

        impl<'a, $($ty,)+ V> Iterator for $iter<'a, $($ty,)+ V> {
            type Item = ($(&'a $ty,)+ &'a V);

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.inner.next().map(|(k, v)| ($(&k.$idx,)+ v))
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<'a, $($ty,)+ V, S> IntoIterator for &'a $map<$($ty,)+ V, S>
        where
            $($ty: Eq + Hash,)+
        {
            type Item = ($(&'a $ty,)+ &'a V);
            type IntoIter = $iter<'a, $($ty,)+ V>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }

        $(#[$cursor_meta])*
        #[derive(Debug)]
        pub struct $cursor {
            raw: Cursor,
        }

        impl $cursor {
            /// Advance in table order; `Ok(false)` once exhausted.
            pub fn next<$($ty,)+ V, S>(&mut self, map: &$map<$($ty,)+ V, S>) -> Result<bool>
            where
                $($ty: Eq + Hash,)+
            {
                self.raw.next(&map.inner)
            }

            pub fn is_positioned(&self) -> bool {
                self.raw.is_positioned()
            }

            pub fn value<'m, $($ty,)+ V, S>(&self, map: &'m $map<$($ty,)+ V, S>) -> Result<&'m V>
            where
                $($ty: Eq + Hash,)+
            {
                self.raw.value(&map.inner)
            }

            pub fn value_mut<'m, $($ty,)+ V, S>(
                &self,
                map: &'m mut $map<$($ty,)+ V, S>,
            ) -> Result<&'m mut V>
            where
                $($ty: Eq + Hash,)+
            {
                self.raw.value_mut(&mut map.inner)
            }

            /// Replace the current value; returns the old one.
            pub fn set_value<$($ty,)+ V, S>(&self, map: &mut $map<$($ty,)+ V, S>, value: V) -> Result<V>
            where
                $($ty: Eq + Hash,)+
            {
                self.raw.set_value(&mut map.inner, value)
            }

            /// Remove the current entry; traversal continues with the next one.
            pub fn remove_current<$($ty,)+ V, S>(
                &mut self,
                map: &mut $map<$($ty,)+ V, S>,
            ) -> Result<(($($ty,)+), V)>
            where
                $($ty: Eq + Hash,)+
            {
                self.raw.remove_current(&mut map.inner)
            }
        }

        fixed_arity_map!(@components $map $cursor [$($ty),+] $(($ty $accessor $idx))+);
    };
}

fixed_arity_map! {
    /// Map keyed by an ordered pair of components.
    ///
    /// ```
    /// use multikey_hashmap::BinaryKeyMap;
    ///
    /// // Entities indexed by (species, reference).
    /// let mut m: BinaryKeyMap<&str, &str, u32> = BinaryKeyMap::new();
    /// m.put("human", "P69905", 1);
    /// m.put("mouse", "P01942", 2);
    /// assert_eq!(m.get(&"human", &"P69905"), Some(&1));
    /// assert_eq!(m.put("human", "P69905", 3), Some(1));
    /// assert_eq!(m.len(), 2);
    /// ```
    map BinaryKeyMap;
    /// Fail-fast cursor over a [`BinaryKeyMap`].
    cursor BinaryCursor;
    /// Iterator over `(&A, &B, &V)` of a [`BinaryKeyMap`].
    iter BinaryIter;
    components { A QA a first_key 0, B QB b second_key 1 }
}

fixed_arity_map! {
    /// Map keyed by an ordered triple of components.
    map TernaryKeyMap;
    /// Fail-fast cursor over a [`TernaryKeyMap`].
    cursor TernaryCursor;
    /// Iterator over `(&A, &B, &C, &V)` of a [`TernaryKeyMap`].
    iter TernaryIter;
    components { A QA a first_key 0, B QB b second_key 1, C QC c third_key 2 }
}

fixed_arity_map! {
    /// Map keyed by an ordered quadruple of components.
    map QuaternaryKeyMap;
    /// Fail-fast cursor over a [`QuaternaryKeyMap`].
    cursor QuaternaryCursor;
    /// Iterator over `(&A, &B, &C, &D, &V)` of a [`QuaternaryKeyMap`].
    iter QuaternaryIter;
    components { A QA a first_key 0, B QB b second_key 1, C QC c third_key 2, D QD d fourth_key 3 }
}
