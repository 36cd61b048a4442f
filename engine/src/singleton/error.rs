use std::fmt;

use crate::scene::ObjectId;

/// A second, distinct instance of a singleton type was attached while one was already live.
///
/// By the time this error is returned the rejected object has already been destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateInstance {
    /// Full type name of the singleton.
    type_name: &'static str,

    /// The instance that stays registered.
    existing: ObjectId,

    /// The object that was destroyed.
    rejected: ObjectId,

    /// Human-readable description of the rejected instance, `"<object name> (<type name>)"`.
    description: String,
}

impl DuplicateInstance {
    #[inline]
    pub fn new(
        type_name: &'static str,
        existing: ObjectId,
        rejected: ObjectId,
        description: String,
    ) -> Self {
        Self {
            type_name,
            existing,
            rejected,
            description,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn existing(&self) -> ObjectId {
        self.existing
    }

    #[inline]
    pub fn rejected(&self) -> ObjectId {
        self.rejected
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for DuplicateInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "instance of {} already exists, removing {}",
            self.type_name, self.description
        )
    }
}

impl std::error::Error for DuplicateInstance {}
