//! Descriptor lifecycle state and the copy-vs-reference flag.

use std::fmt;

/// Lifecycle state of an array descriptor.
///
/// `Unallocated → Allocated → Deallocated`. `Deallocated` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArrayState {
    /// Created, no storage yet.
    #[default]
    Unallocated,
    /// Owns exactly one live storage block.
    Allocated,
    /// Storage released; no further operations are accepted.
    Deallocated,
}

impl ArrayState {
    /// Whether the descriptor currently owns storage.
    pub const fn is_allocated(self) -> bool {
        matches!(self, Self::Allocated)
    }
}

impl fmt::Display for ArrayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unallocated => write!(f, "unallocated"),
            Self::Allocated => write!(f, "allocated"),
            Self::Deallocated => write!(f, "deallocated"),
        }
    }
}

/// Whether a view aliases the array's storage or snapshots it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CopyFlag {
    /// Non-owning view of the live storage. Writes are visible to every
    /// other reference view of the same array. This is the default.
    #[default]
    Reference,
    /// Owning view of an independent copy taken at call time.
    Copy,
}

impl fmt::Display for CopyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Copy => write!(f, "copy"),
        }
    }
}
