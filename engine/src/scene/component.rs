//! Components and the per-object storage that holds them.
//!
//! Every scene object owns a [`Components`] map keyed by [`TypeId`]. An object carries at most
//! one component of a given type, which is what lets an [`ObjectId`](super::ObjectId) stand in
//! for the identity of a component instance.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

/// A trait representing a component attachable to a scene object.
///
/// Use `#[derive(Component)]` to implement it.
pub trait Component: 'static + Sized + Send + Sync {}

/// Type-erased component storage for a single object.
#[derive(Default)]
pub struct Components {
    data: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Components {
    #[inline]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Insert a component, returning it back if one of the same type is already present.
    pub fn insert<C: Component>(&mut self, value: C) -> Result<(), C> {
        if self.contains::<C>() {
            return Err(value);
        }
        self.data.insert(TypeId::of::<C>(), Box::new(value));
        Ok(())
    }

    #[inline]
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.data
            .get(&TypeId::of::<C>())
            .and_then(|stored| stored.downcast_ref::<C>())
    }

    #[inline]
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.data
            .get_mut(&TypeId::of::<C>())
            .and_then(|stored| stored.downcast_mut::<C>())
    }

    #[inline]
    pub fn contains<C: Component>(&self) -> bool {
        self.data.contains_key(&TypeId::of::<C>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
