//! Scene object identifiers and their allocator.
//!
//! An [`ObjectId`] pairs a slot index with a [`Generation`]. When an object is destroyed its
//! index is recycled with the next generation, so any id still pointing at the old object no
//! longer matches and can be detected as stale:
//!
//! ```rust,ignore
//! let first = allocator.alloc(); // #0v0
//! allocator.free(first);
//! let reused = allocator.alloc(); // #0v1
//! assert!(!allocator.is_current(first));
//! ```

use std::{collections::VecDeque, fmt};

/// How many times an object index has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of an index.
    const FIRST: Self = Self(0);

    /// Get the next generation from the current.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// The slot index of an object within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(u32);

/// Identity of an object in a scene graph.
///
/// Two ids are equal only if they name the same index in the same generation, which is what
/// duplicate detection compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    index: Index,
    generation: Generation,
}

impl ObjectId {
    /// Construct an id for the first generation of an index.
    #[inline]
    pub(crate) fn new(index: u32) -> Self {
        Self::new_with_generation(Index(index), Generation::FIRST)
    }

    #[inline]
    pub(crate) const fn new_with_generation(index: Index, generation: Generation) -> Self {
        Self { index, generation }
    }

    /// Get the slot index of this object.
    #[inline]
    pub fn index(&self) -> usize {
        self.index.0 as usize
    }

    /// Get the generation of this object.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index.0, self.generation.0)
    }
}

/// Hands out object ids and recycles freed indices.
///
/// Freed indices are reused in the order they were freed, each with its generation bumped.
#[derive(Debug, Default)]
pub struct Allocator {
    /// Current generation for every index ever allocated.
    generations: Vec<Generation>,

    /// Indices available for reuse.
    dead_pool: VecDeque<Index>,
}

impl Allocator {
    pub const fn new() -> Self {
        Self {
            generations: Vec::new(),
            dead_pool: VecDeque::new(),
        }
    }

    /// Allocate an id, reusing a freed index when one is available.
    pub fn alloc(&mut self) -> ObjectId {
        if let Some(index) = self.dead_pool.pop_front() {
            return ObjectId::new_with_generation(index, self.generations[index.0 as usize]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(Generation::FIRST);
        ObjectId::new(index)
    }

    /// Free an id for reuse. Freeing a stale id does nothing.
    pub fn free(&mut self, id: ObjectId) -> bool {
        if !self.is_current(id) {
            return false;
        }
        let slot = &mut self.generations[id.index()];
        *slot = slot.next();
        self.dead_pool.push_back(id.index);
        true
    }

    /// Whether `id` carries the current generation of its index.
    #[inline]
    pub fn is_current(&self, id: ObjectId) -> bool {
        self.generations
            .get(id.index())
            .is_some_and(|generation| *generation == id.generation)
    }
}
