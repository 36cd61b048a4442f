//! Singleton components.
//!
//! A [`Singleton`] is a [`Component`] with at most one live instance per
//! [`Registry`]. The registry keeps one slot per concrete type and answers two questions:
//!
//! - **Access**: [`Registry::get_or_create`] returns the live instance, adopting one already in the
//!   scene or creating a new object for it when none exists. The answer is an [`Access`], which
//!   says whether the instance already existed, was just created, or is unavailable because the
//!   application is quitting.
//! - **Attachment**: [`Registry::on_attached`] is called by the host when a component of the
//!   type becomes active on an object. The first instance is adopted; a distinct second one is
//!   destroyed and reported as a [`DuplicateInstance`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rusty_singleton::{Component, Context, Scene, Singleton};
//!
//! #[derive(Component, Singleton, Default)]
//! #[singleton(persist)]
//! struct AudioManager {
//!     volume: f32,
//! }
//!
//! let context = Context::new();
//! let mut scene = Scene::new();
//!
//! let audio = AudioManager::instance(&context, &mut scene);
//! assert!(audio.is_created());
//!
//! // The same instance on every later access.
//! assert_eq!(AudioManager::instance(&context, &mut scene).handle(), audio.handle());
//! ```

mod error;
mod registry;

use std::{any, borrow::Cow, fmt, hash, marker::PhantomData};

use crate::{
    core::Context,
    scene::{Component, Host, ObjectId},
};

pub use error::DuplicateInstance;
pub use registry::Registry;

/// A component type with at most one live instance.
///
/// Use `#[derive(Singleton)]` to implement it. `#[singleton(persist)]` keeps the instance alive
/// across scene transitions and `#[singleton(name = "...")]` names the object created for it.
pub trait Singleton: Component + Default {
    /// Whether the instance is exempt from destruction when the active scene changes.
    const PERSIST_BETWEEN_SCENES: bool = false;

    /// Name given to the object created to hold an auto-created instance.
    fn name() -> Cow<'static, str> {
        Cow::Borrowed(any::type_name::<Self>())
    }

    /// Get the instance from the context's registry, creating it if needed.
    fn instance<H: Host>(context: &Context, host: &mut H) -> Access<Self> {
        context.singletons().get_or_create::<Self, H>(host)
    }
}

/// A typed reference to the object holding a singleton instance.
pub struct Handle<T> {
    object: ObjectId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    pub(crate) fn new(object: ObjectId) -> Self {
        Self {
            object,
            _marker: PhantomData,
        }
    }

    /// The object the instance is attached to.
    #[inline]
    pub fn object(&self) -> ObjectId {
        self.object
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl<T> Eq for Handle<T> {}

impl<T> hash::Hash for Handle<T> {
    fn hash<S: hash::Hasher>(&self, state: &mut S) {
        self.object.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", any::type_name::<T>(), self.object)
    }
}

/// The outcome of asking for a singleton instance.
pub enum Access<T> {
    /// The instance was already registered or was found in the scene and adopted.
    Existing(Handle<T>),
    /// A new object was created to hold the instance.
    Created(Handle<T>),
    /// No instance is registered and the application is quitting, so none was created.
    Unavailable,
}

impl<T> Access<T> {
    /// The instance handle, unless unavailable.
    #[inline]
    pub fn handle(&self) -> Option<Handle<T>> {
        match self {
            Access::Existing(handle) | Access::Created(handle) => Some(*handle),
            Access::Unavailable => None,
        }
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        matches!(self, Access::Created(_))
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        !matches!(self, Access::Unavailable)
    }
}

impl<T> Clone for Access<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Access<T> {}

impl<T> PartialEq for Access<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Access::Existing(a), Access::Existing(b)) | (Access::Created(a), Access::Created(b)) => {
                a == b
            }
            (Access::Unavailable, Access::Unavailable) => true,
            _ => false,
        }
    }
}

impl<T> Eq for Access<T> {}

impl<T> fmt::Debug for Access<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Existing(handle) => f.debug_tuple("Existing").field(handle).finish(),
            Access::Created(handle) => f.debug_tuple("Created").field(handle).finish(),
            Access::Unavailable => f.write_str("Unavailable"),
        }
    }
}
