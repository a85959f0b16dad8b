//! Canonical type handle.
//!
//! `TypeId` is the only way types are referenced outside the pool. Every
//! structurally distinct type is interned once, so type equality is index
//! equality.
//!
//! Primitive types have fixed indices (0-7), pre-interned when a pool is
//! created.

use std::fmt;

/// A 32-bit index into a [`TypePool`](crate::TypePool).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Primitive Types (indices 0-7) ===

    /// `bool`
    pub const BOOL: Self = Self(0);
    /// `void`
    pub const VOID: Self = Self(1);
    /// `string`
    pub const STRING: Self = Self(2);
    /// Arbitrary-precision `int`.
    pub const INF_INT: Self = Self(3);
    /// `match_kind`
    pub const MATCH_KIND: Self = Self(4);
    /// Parser state.
    pub const STATE: Self = Self(5);
    /// `_`, matches anything.
    pub const DONT_CARE: Self = Self(6);
    /// Placeholder for ill-typed expressions; propagates silently.
    pub const ERROR: Self = Self(7);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 8;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a primitive type (pre-interned).
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    /// Human-readable name for primitive types.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("bool"),
            1 => Some("void"),
            2 => Some("string"),
            3 => Some("int"),
            4 => Some("match_kind"),
            5 => Some("state"),
            6 => Some("_"),
            7 => Some("<error>"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "TypeId({name})"),
            None => write!(f, "TypeId({})", self.0),
        }
    }
}

const _: () = assert!(std::mem::size_of::<TypeId>() == 4);
