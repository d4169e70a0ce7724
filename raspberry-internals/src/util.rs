//! Internal utility types.

/// Marker type used when type-erasing stored objects.
///
/// This zero-sized type serves as a placeholder in pointer types when the
/// actual concrete type has been erased. A `NonNull<Erased>` points to some
/// `T`, but the current scope does not know which one.
pub(crate) struct Erased;
