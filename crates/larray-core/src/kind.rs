//! Element kinds and the [`Element`] trait.
//!
//! An [`ElementKind`] is the runtime tag for an array's element type and
//! width. [`Element`] ties each supported Rust scalar to its tag so generic
//! code can recover the kind at compile time via `T::KIND`.

use std::fmt;

/// Element type and bit-width of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// 1-byte signed integer.
    Int8,
    /// 2-byte signed integer.
    Int16,
    /// 4-byte signed integer.
    Int32,
    /// 8-byte signed integer.
    Int64,
    /// 4-byte IEEE-754 real.
    Real32,
    /// 8-byte IEEE-754 real.
    Real64,
}

impl ElementKind {
    /// Every supported kind, integers first, in ascending width.
    pub const ALL: [ElementKind; 6] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Real32,
        Self::Real64,
    ];

    /// Size of one element in bytes.
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Real32 => 4,
            Self::Int64 | Self::Real64 => 8,
        }
    }

    /// Whether this is one of the integer kinds.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Whether this is one of the real kinds.
    pub const fn is_real(self) -> bool {
        !self.is_integer()
    }

    /// Short type/kind code, e.g. `I4` or `R8`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Int8 => "I1",
            Self::Int16 => "I2",
            Self::Int32 => "I4",
            Self::Int64 => "I8",
            Self::Real32 => "R4",
            Self::Real64 => "R8",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A scalar type that can be stored in a local array.
///
/// Sealed: implemented for `i8`, `i16`, `i32`, `i64`, `f32` and `f64` only,
/// so `T::KIND` always names exactly one [`ElementKind`].
pub trait Element: sealed::Sealed + Copy + Default + PartialEq + fmt::Debug + 'static {
    /// The runtime tag for this element type.
    const KIND: ElementKind;
}

macro_rules! impl_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;
            }
        )*
    };
}

impl_element! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Real32,
    f64 => Real64,
}
