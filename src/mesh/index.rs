//! Index types for mesh cells and darts.
//!
//! Every cell container hands out dense integer indices. They are wrapped in
//! distinct types so a dart can never be passed where a vertex is expected.
//! The wrappers are generic over the underlying integer type (u16 for small
//! meshes, u32 by default, u64 for very large imports).

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as the raw value of a cell or dart index.
///
/// The largest value of each type is reserved as the null sentinel, so a
/// `u16` container holds at most `u16::MAX - 1` cells.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The largest index that may be handed out.
    const MAX: Self;

    /// Sentinel for "no cell".
    const INVALID: Self;

    /// Convert from usize. Values above [`MeshIndex::MAX`] are a logic error
    /// and trip a debug assertion; use [`MeshIndex::checked_from_usize`] when
    /// the value comes from user input.
    fn from_usize(v: usize) -> Self;

    /// Convert from usize, returning `None` when the value does not fit.
    fn checked_from_usize(v: usize) -> Option<Self>;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {
        $(
            impl MeshIndex for $ty {
                const MAX: Self = <$ty>::MAX - 1;
                const INVALID: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        Self::checked_from_usize(v).is_some(),
                        "index {} too large for {}",
                        v,
                        stringify!($ty)
                    );
                    v as $ty
                }

                #[inline]
                fn checked_from_usize(v: usize) -> Option<Self> {
                    <$ty>::try_from(v).ok().filter(|&raw| raw <= Self::MAX)
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe dart index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DartId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe edge index (incidence graph edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Get the raw value of the underlying type.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(DartId, "D");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());

        let invalid: VertexId = VertexId::invalid();
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        let a: DartId = DartId::new(3);
        let b: DartId = DartId::new(7);
        assert!(a < b);
        assert!(DartId::<u32>::invalid() > b);
        assert_eq!(DartId::<u32>::default(), DartId::invalid());
    }

    #[test]
    fn test_checked_conversion() {
        assert_eq!(u16::checked_from_usize(65_534), Some(65_534));
        assert_eq!(u16::checked_from_usize(65_535), None);
        assert_eq!(u32::checked_from_usize(12), Some(12));
    }

    #[test]
    fn test_small_indices() {
        let d: DartId<u16> = DartId::new(1000);
        assert_eq!(d.index(), 1000);
        assert_eq!(d.raw(), 1000u16);
    }

    #[test]
    fn test_debug_format() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(format!("{:?}", v), "V(42)");

        let d: DartId = DartId::new(7);
        assert_eq!(format!("{:?}", d), "D(7)");

        let invalid: FaceId = FaceId::invalid();
        assert_eq!(format!("{:?}", invalid), "F(INVALID)");
    }
}
