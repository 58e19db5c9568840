//! Errors shared by [`BiTree`][crate::bitree::BiTree] and [`Tree`][crate::avl::Tree].
//!
//! Every variant produced by an insertion carries the value that could not be
//! stored so the caller gets ownership back.

/// Errors returned by tree operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error<T> {
    /// Storage for a new node could not be obtained. The tree is unchanged.
    #[error("could not allocate storage for a new node")]
    AllocationFailed(T),
    /// A live entry with an equal key is already in the tree.
    #[error("an entry with an equal key is already present")]
    DuplicateKey(T),
    /// No visible entry matches the key.
    #[error("no visible entry matches the key")]
    NotFound,
    /// The requested position in a binary tree can't take a new node. This is a caller bug.
    #[error("invalid slot: {reason}")]
    InvalidSlot {
        /// Why the slot was rejected.
        reason: SlotError,
        /// The value that was being inserted.
        value: T,
    },
}

/// Why a [`Slot`][crate::bitree::Slot] rejected an insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// The child slot already holds a node.
    #[error("child slot is already occupied")]
    SlotOccupied,
    /// A root was requested but the tree already has one.
    #[error("tree already has a root")]
    NotEmpty,
    /// The parent handle refers to a node that has since been removed.
    #[error("parent node has been removed")]
    StaleHandle,
}

impl<T> Error<T> {
    /// Returns the value handed back by the failed operation, if there is one.
    pub fn into_inner(self) -> Option<T> {
        match self {
            Self::AllocationFailed(value)
            | Self::DuplicateKey(value)
            | Self::InvalidSlot { value, .. } => Some(value),
            Self::NotFound => None,
        }
    }

    /// Converts the carried value, keeping the kind of error.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Error<U> {
        match self {
            Self::AllocationFailed(value) => Error::AllocationFailed(f(value)),
            Self::DuplicateKey(value) => Error::DuplicateKey(f(value)),
            Self::NotFound => Error::NotFound,
            Self::InvalidSlot { reason, value } => Error::InvalidSlot {
                reason,
                value: f(value),
            },
        }
    }
}
