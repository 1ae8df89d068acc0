//! Rank, extents and index bounds.
//!
//! Shapes are validated once at allocation time. After that the [`Bounds`]
//! of an array are the single source of truth for index arithmetic: every
//! dimension is addressed with inclusive 1-based indices and elements are
//! laid out in column-major order (first index varies fastest).

use smallvec::SmallVec;
use std::fmt;

use crate::error::ShapeError;

/// Highest supported rank.
pub const MAX_RANK: usize = 7;

/// Per-dimension values, stored inline for every supported rank.
pub type Dims<T> = SmallVec<[T; MAX_RANK]>;

/// Number of dimensions of an array, always in `1..=MAX_RANK`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    /// Rank 1.
    pub const MIN: Rank = Rank(1);
    /// Rank [`MAX_RANK`].
    pub const MAX: Rank = Rank(MAX_RANK as u8);

    /// Validate a rank value.
    pub fn new(rank: usize) -> Result<Self, ShapeError> {
        if (1..=MAX_RANK).contains(&rank) {
            Ok(Self(rank as u8))
        } else {
            Err(ShapeError::RankOutOfRange { rank })
        }
    }

    /// The rank as a plain count.
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Every valid rank in ascending order.
    pub fn all() -> impl Iterator<Item = Rank> {
        (1..=MAX_RANK as u8).map(Rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.0)
    }
}

impl TryFrom<usize> for Rank {
    type Error = ShapeError;

    fn try_from(rank: usize) -> Result<Self, Self::Error> {
        Self::new(rank)
    }
}

/// Product of `extents`, or `None` on overflow.
///
/// An extent of zero yields a count of zero; that is a valid, empty shape.
pub fn element_count(extents: &[usize]) -> Option<usize> {
    if extents.contains(&0) {
        return Some(0);
    }
    extents
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
}

/// A validated array shape: a rank and one non-negative extent per dimension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    extents: Dims<usize>,
}

impl Shape {
    /// Validate caller-supplied extents against a fixed rank.
    ///
    /// Fails if the number of extents differs from `rank`, if any extent is
    /// negative, or if the total element count overflows `usize`.
    pub fn new(rank: Rank, extents: &[i64]) -> Result<Self, ShapeError> {
        if extents.len() != rank.get() {
            return Err(ShapeError::RankMismatch {
                expected: rank.get(),
                found: extents.len(),
            });
        }
        let mut dims = Dims::with_capacity(extents.len());
        for (dim, &extent) in extents.iter().enumerate() {
            let extent =
                usize::try_from(extent).map_err(|_| ShapeError::NegativeExtent { dim, extent })?;
            dims.push(extent);
        }
        if element_count(&dims).is_none() {
            return Err(ShapeError::CountOverflow);
        }
        Ok(Self { extents: dims })
    }

    /// Validate extents, taking the rank from their number.
    pub fn from_extents(extents: &[i64]) -> Result<Self, ShapeError> {
        Self::new(Rank::new(extents.len())?, extents)
    }

    /// Rank of this shape.
    pub fn rank(&self) -> Rank {
        Rank(self.extents.len() as u8)
    }

    /// Element count per dimension.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        // Checked at construction.
        self.extents.iter().product()
    }

    /// Whether any dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// Default 1-based bounds for this shape.
    pub fn bounds(&self) -> Bounds {
        Bounds::one_based(&self.extents)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, extent) in self.extents.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{extent}")?;
        }
        write!(f, "]")
    }
}

/// Inclusive lower/upper index bounds per dimension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    lower: Dims<i64>,
    upper: Dims<i64>,
}

impl Bounds {
    /// `lower[i] = 1`, `upper[i] = extents[i]`.
    pub fn one_based(extents: &[usize]) -> Self {
        Self {
            lower: extents.iter().map(|_| 1).collect(),
            upper: extents.iter().map(|&e| e as i64).collect(),
        }
    }

    /// Bounds with no dimensions, used for descriptors that hold no storage.
    pub fn empty() -> Self {
        Self {
            lower: Dims::new(),
            upper: Dims::new(),
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.lower.len()
    }

    /// Inclusive lower bound per dimension.
    pub fn lower(&self) -> &[i64] {
        &self.lower
    }

    /// Inclusive upper bound per dimension.
    pub fn upper(&self) -> &[i64] {
        &self.upper
    }

    /// Extent of one dimension, derived as `upper - lower + 1`.
    pub fn extent(&self, dim: usize) -> usize {
        (self.upper[dim] - self.lower[dim] + 1).max(0) as usize
    }

    /// Extents of every dimension, derived from the bounds.
    pub fn extents(&self) -> Dims<usize> {
        (0..self.rank()).map(|dim| self.extent(dim)).collect()
    }

    /// Whether these bounds describe exactly `extents`.
    pub fn matches_extents(&self, extents: &[usize]) -> bool {
        self.rank() == extents.len()
            && (0..self.rank()).all(|dim| self.extent(dim) == extents[dim])
    }

    /// Whether `index` lies inside the bounds in every dimension.
    pub fn contains(&self, index: &[i64]) -> bool {
        index.len() == self.rank()
            && index
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(&i, (&lo, &hi))| lo <= i && i <= hi)
    }

    /// Column-major linear offset of a multi-index, or `None` if the index
    /// has the wrong rank or lies outside the bounds.
    pub fn linear_index(&self, index: &[i64]) -> Option<usize> {
        if !self.contains(index) {
            return None;
        }
        let mut offset = 0usize;
        let mut step = 1usize;
        for (dim, &i) in index.iter().enumerate() {
            offset += (i - self.lower[dim]) as usize * step;
            step *= self.extent(dim);
        }
        Some(offset)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for dim in 0..self.rank() {
            if dim > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", self.lower[dim], self.upper[dim])?;
        }
        write!(f, "]")
    }
}
