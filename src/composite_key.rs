//! Composite keys: fixed-arity tuples hashed and compared component-wise.

use crate::error::{MapError, Result};
use core::borrow::Borrow;
use core::hash::Hash;

/// A tuple usable as the key of a multi-key map.
///
/// Implemented for `(A, B)`, `(A, B, C)` and `(A, B, C, D)`.
pub trait KeyTuple: Eq + Hash + Sized {
    /// Number of components.
    const ARITY: usize;

    /// The same tuple with every component optional.
    type Partial;

    /// Fail with `InvalidKey` naming the first absent component.
    fn complete(partial: Self::Partial) -> Result<Self>;
}

/// A lookup value that hashes identically to the stored key `K` and can
/// be compared against it without building an owned key.
///
/// Implemented for `CompositeKey<K>` and for tuples of component borrows
/// `(&QA, &QB, ..)` where each stored component `A: Borrow<QA>`, so a
/// `(String, u32)` key can be queried with `(&str, &u32)`.
pub trait KeyQuery<K>: Hash {
    fn matches(&self, key: &K) -> bool;
}

/// An immutable, complete key of `K::ARITY` components.
///
/// Its hash is the order-sensitive combination of each component's hash, fed
/// in order into the map's hasher; a borrowed query `(&1, &"a")` therefore
/// hashes like the owned key `(1, "a")`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey<K>(K);

impl<K: KeyTuple> CompositeKey<K> {
    pub fn new(parts: K) -> Self {
        CompositeKey(parts)
    }

    /// Build a key from optional components.
    ///
    /// ```
    /// use multikey_hashmap::{CompositeKey, MapError};
    ///
    /// let k = CompositeKey::<(u8, &str)>::try_new((Some(1), Some("x"))).unwrap();
    /// assert_eq!(k.parts(), &(1, "x"));
    ///
    /// let missing = CompositeKey::<(u8, &str)>::try_new((Some(1), None));
    /// assert_eq!(missing, Err(MapError::InvalidKey { position: 1 }));
    /// ```
    pub fn try_new(partial: K::Partial) -> Result<Self> {
        K::complete(partial).map(CompositeKey)
    }

    pub const fn arity() -> usize {
        K::ARITY
    }
}

impl<K> CompositeKey<K> {
    pub fn parts(&self) -> &K {
        &self.0
    }

    pub fn into_parts(self) -> K {
        self.0
    }
}

impl<K: KeyTuple> From<K> for CompositeKey<K> {
    fn from(parts: K) -> Self {
        CompositeKey(parts)
    }
}

impl<K: KeyTuple> KeyQuery<K> for CompositeKey<K> {
    #[inline]
    fn matches(&self, key: &K) -> bool {
        self.0 == *key
    }
}

macro_rules! impl_key_tuple {
    ($arity:expr; $($ty:ident $q:ident $idx:tt),+) => {
        impl<$($ty: Eq + Hash),+> KeyTuple for ($($ty,)+) {
            const ARITY: usize = $arity;
            type Partial = ($(Option<$ty>,)+);

            fn complete(partial: Self::Partial) -> Result<Self> {
                Ok(($(partial.$idx.ok_or(MapError::InvalidKey { position: $idx })?,)+))
            }
        }

        impl<'q, $($ty,)+ $($q,)+> KeyQuery<($($ty,)+)> for ($(&'q $q,)+)
        where
            $($ty: Eq + Hash + Borrow<$q>,)+
            $($q: ?Sized + Eq + Hash,)+
        {
            #[inline]
            fn matches(&self, key: &($($ty,)+)) -> bool {
                true $(&& *self.$idx == *key.$idx.borrow())+
            }
        }
    };
}

impl_key_tuple!(2; A QA 0, B QB 1);
impl_key_tuple!(3; A QA 0, B QB 1, C QC 2);
impl_key_tuple!(4; A QA 0, B QB 1, C QC 2, D QD 3);
