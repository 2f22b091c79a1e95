// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Strongly Typed Arena Indices
//!
//! Phantom-tagged wrappers around `usize` used to address elements stored in
//! flat arenas. The search tree keeps its nodes in a single `Vec` and links
//! parents and children through indices instead of pointers, so parent links
//! never own anything and the tree cannot form reference cycles.
//!
//! ## Highlights
//!
//! - `TypedIndexTag` gives each index space a human-readable `NAME` used for
//!   `Display`/`Debug`.
//! - `TypedIndex<T>` is `#[repr(transparent)]` over `usize`.
//! - `TypedArena<T, V>` is a push-only vector addressed by `TypedIndex<T>`.
//!
//! ## Usage
//!
//! ```rust
//! use canopy_core::utils::index::{TypedArena, TypedIndex, TypedIndexTag};
//!
//! #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
//! struct LeafTag;
//! impl TypedIndexTag for LeafTag { const NAME: &'static str = "LeafIndex"; }
//!
//! let mut arena = TypedArena::<LeafTag, &str>::new();
//! let a = arena.push("a");
//! let b = arena.push("b");
//! assert_eq!(arena[b], "b");
//! assert_eq!(format!("{}", a), "LeafIndex(0)");
//! ```

/// A trait to tag typed indices with a name for debugging and display purposes.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A strongly typed index that is associated with a specific tag type `T`.
///
/// The tag prevents indices of one arena from being used to address another.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedIndex<T> {
    /// Creates a new `TypedIndex` with the given `usize` index.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the underlying `usize` index.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.index
    }

    /// Checks if the index is zero, i.e. addresses the first arena slot.
    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.index == 0
    }
}

impl<T> std::fmt::Debug for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> std::fmt::Display for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> From<usize> for TypedIndex<T> {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    fn from(typed_index: TypedIndex<T>) -> Self {
        typed_index.index
    }
}

/// A push-only arena addressed by `TypedIndex<T>`.
///
/// Elements are never removed, so every index handed out by `push` stays
/// valid for the lifetime of the arena.
#[derive(Clone)]
pub struct TypedArena<T, V> {
    slots: Vec<V>,
    _marker: std::marker::PhantomData<T>,
}

impl<T, V> Default for TypedArena<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> TypedArena<T, V> {
    /// Creates a new, empty arena.
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Creates a new, empty arena with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            _marker: std::marker::PhantomData,
        }
    }

    /// Appends `value` and returns the index addressing it.
    #[inline]
    pub fn push(&mut self, value: V) -> TypedIndex<T> {
        let index = TypedIndex::new(self.slots.len());
        self.slots.push(value);
        index
    }

    /// Returns the element at `index`, or `None` if it is out of bounds.
    #[inline]
    pub fn get(&self, index: TypedIndex<T>) -> Option<&V> {
        self.slots.get(index.get())
    }

    /// Returns the element at `index` mutably, or `None` if it is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: TypedIndex<T>) -> Option<&mut V> {
        self.slots.get_mut(index.get())
    }

    /// Returns the number of elements in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the arena holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over `(index, element)` pairs in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (TypedIndex<T>, &V)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, v)| (TypedIndex::new(i), v))
    }
}

impl<T, V> std::ops::Index<TypedIndex<T>> for TypedArena<T, V> {
    type Output = V;

    #[inline]
    fn index(&self, index: TypedIndex<T>) -> &Self::Output {
        debug_assert!(
            index.get() < self.slots.len(),
            "called `TypedArena::index` with index out of bounds: the len is {} but the index is {}",
            self.slots.len(),
            index.get()
        );
        &self.slots[index.get()]
    }
}

impl<T, V> std::ops::IndexMut<TypedIndex<T>> for TypedArena<T, V> {
    #[inline]
    fn index_mut(&mut self, index: TypedIndex<T>) -> &mut Self::Output {
        debug_assert!(
            index.get() < self.slots.len(),
            "called `TypedArena::index_mut` with index out of bounds: the len is {} but the index is {}",
            self.slots.len(),
            index.get()
        );
        &mut self.slots[index.get()]
    }
}

impl<T, V> std::fmt::Debug for TypedArena<T, V>
where
    T: TypedIndexTag,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
