//! The four ownership disciplines of a [`RawStorage`].
//!
//! [`RawStorage`]: crate::RawStorage

/// How a [`RawStorage`] holds on to its object.
///
/// The mode is chosen by the handle the storage was built from. It only
/// changes through the consuming conversions
/// [`RawStorage::into_shared`] and [`RawStorage::try_into_unique`].
///
/// [`RawStorage`]: crate::RawStorage
/// [`RawStorage::into_shared`]: crate::RawStorage::into_shared
/// [`RawStorage::try_into_unique`]: crate::RawStorage::try_into_unique
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum StorageMode {
    /// The object was moved into a fresh heap allocation owned by the
    /// storage.
    Value,
    /// The storage holds only an address. The referent is owned elsewhere
    /// and is never dropped by the storage.
    Reference,
    /// The storage adopted an existing `Box` allocation.
    Unique,
    /// The storage holds one strong count of a [`triomphe::Arc`].
    Shared,
}

impl StorageMode {
    /// Whether dropping the storage drops the object and frees its
    /// allocation.
    #[inline]
    pub const fn owns_allocation(self) -> bool {
        matches!(self, StorageMode::Value | StorageMode::Unique)
    }

    /// Whether the storage handle can be duplicated without duplicating the
    /// object.
    #[inline]
    pub const fn is_duplicable(self) -> bool {
        matches!(self, StorageMode::Reference | StorageMode::Shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_capabilities() {
        assert!(StorageMode::Value.owns_allocation());
        assert!(StorageMode::Unique.owns_allocation());
        assert!(!StorageMode::Reference.owns_allocation());
        assert!(!StorageMode::Shared.owns_allocation());

        assert!(!StorageMode::Value.is_duplicable());
        assert!(!StorageMode::Unique.is_duplicable());
        assert!(StorageMode::Reference.is_duplicable());
        assert!(StorageMode::Shared.is_duplicable());
    }
}
