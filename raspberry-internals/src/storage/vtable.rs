//! Vtable for type-erased storage operations.
//!
//! This module contains the [`StorageVtable`] which lets a [`RawStorage`]
//! release, duplicate and re-home its object after the concrete type `T` has
//! been erased. The vtable stores function pointers that dispatch to the
//! correct typed implementations.
//!
//! The fields of [`StorageVtable`] are private to this module. This
//! guarantees the safety invariant: **the vtable's type parameter matches the
//! type of the object the storage points to**. Vtables are created as
//! `&'static` references via [`StorageVtable::new`], which pairs the function
//! pointers with a specific `T` at compile time.
//!
//! [`RawStorage`]: crate::RawStorage

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::util::Erased;

/// Vtable for type-erased storage operations.
///
/// # Safety Invariant
///
/// Every function pointer in this struct points to the function of the same
/// name below, instantiated with the type `T` that was used to create this
/// [`StorageVtable`].
pub(crate) struct StorageVtable {
    /// Gets the [`TypeId`] of the stored type.
    type_id: fn() -> TypeId,
    /// Drops a `Box<T>` created with [`Box::into_raw`].
    drop_box: unsafe fn(NonNull<Erased>),
    /// Releases one strong count of a `triomphe::Arc<T>`.
    drop_arc: unsafe fn(NonNull<Erased>),
    /// Adds one strong count to a `triomphe::Arc<T>` and returns the new
    /// handle.
    clone_arc: unsafe fn(NonNull<Erased>) -> NonNull<Erased>,
    /// Reads the strong count of a `triomphe::Arc<T>`.
    strong_count: unsafe fn(NonNull<Erased>) -> usize,
    /// Moves the object of a `Box<T>` into a new `triomphe::Arc<T>`.
    box_into_arc: unsafe fn(NonNull<Erased>) -> NonNull<Erased>,
    /// Moves the object of a uniquely owned `triomphe::Arc<T>` into a new
    /// `Box<T>`.
    arc_into_box: unsafe fn(NonNull<Erased>) -> NonNull<Erased>,
}

impl StorageVtable {
    /// Creates the [`StorageVtable`] for the type `T`.
    pub(super) const fn new<T: 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                drop_box: drop_box::<T>,
                drop_arc: drop_arc::<T>,
                clone_arc: clone_arc::<T>,
                strong_count: strong_count::<T>,
                box_into_arc: box_into_arc::<T>,
                arc_into_box: arc_into_box::<T>,
            }
        }
    }

    /// Gets the [`TypeId`] of the type that was used to create this
    /// [`StorageVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Drops the `Box<T>` pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from `Box<T>` via [`Box::into_raw`], where `T` is
    ///    the type of this vtable.
    /// 2. The pointer is not used after calling this method.
    #[inline]
    pub(super) unsafe fn drop_box(&self, ptr: NonNull<Erased>) {
        // SAFETY: `self.drop_box` points to `drop_box::<T>` below, whose
        // requirements are exactly the ones guaranteed by the caller.
        unsafe { (self.drop_box)(ptr) }
    }

    /// Releases one strong count of the `triomphe::Arc<T>` pointed to by
    /// `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from `triomphe::Arc<T>` via
    ///    [`triomphe::Arc::into_raw`], where `T` is the type of this vtable.
    /// 2. The caller owns the strong count being released and does not use
    ///    the pointer afterwards.
    #[inline]
    pub(super) unsafe fn drop_arc(&self, ptr: NonNull<Erased>) {
        // SAFETY: `self.drop_arc` points to `drop_arc::<T>` below, whose
        // requirements are exactly the ones guaranteed by the caller.
        unsafe { (self.drop_arc)(ptr) }
    }

    /// Adds one strong count to the `triomphe::Arc<T>` pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from `triomphe::Arc<T>` via
    ///    [`triomphe::Arc::into_raw`], where `T` is the type of this vtable,
    ///    and at least one strong count is alive for the duration of the
    ///    call.
    #[inline]
    pub(super) unsafe fn clone_arc(&self, ptr: NonNull<Erased>) -> NonNull<Erased> {
        // SAFETY: `self.clone_arc` points to `clone_arc::<T>` below, whose
        // requirements are exactly the ones guaranteed by the caller.
        unsafe { (self.clone_arc)(ptr) }
    }

    /// Reads the strong count of the `triomphe::Arc<T>` pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// Same requirements as [`StorageVtable::clone_arc`].
    #[inline]
    pub(super) unsafe fn strong_count(&self, ptr: NonNull<Erased>) -> usize {
        // SAFETY: `self.strong_count` points to `strong_count::<T>` below,
        // whose requirements are exactly the ones guaranteed by the caller.
        unsafe { (self.strong_count)(ptr) }
    }

    /// Moves the object out of the `Box<T>` at `ptr` and into a fresh
    /// `triomphe::Arc<T>`.
    ///
    /// # Safety
    ///
    /// Same requirements as [`StorageVtable::drop_box`]. The returned pointer
    /// comes from [`triomphe::Arc::into_raw`] and owns one strong count.
    #[inline]
    pub(super) unsafe fn box_into_arc(&self, ptr: NonNull<Erased>) -> NonNull<Erased> {
        // SAFETY: `self.box_into_arc` points to `box_into_arc::<T>` below,
        // whose requirements are exactly the ones guaranteed by the caller.
        unsafe { (self.box_into_arc)(ptr) }
    }

    /// Moves the object out of the `triomphe::Arc<T>` at `ptr` and into a
    /// fresh `Box<T>`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from `triomphe::Arc<T>` via
    ///    [`triomphe::Arc::into_raw`], where `T` is the type of this vtable.
    /// 2. The strong count is exactly `1` and the caller owns it.
    /// 3. The pointer is not used after calling this method.
    #[inline]
    pub(super) unsafe fn arc_into_box(&self, ptr: NonNull<Erased>) -> NonNull<Erased> {
        // SAFETY: `self.arc_into_box` points to `arc_into_box::<T>` below,
        // whose requirements are exactly the ones guaranteed by the caller.
        unsafe { (self.arc_into_box)(ptr) }
    }
}

/// Drops the `Box<T>` pointed to by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from `Box<T>` via [`Box::into_raw`].
/// 2. The pointer is not used after calling this function.
unsafe fn drop_box<T: 'static>(ptr: NonNull<Erased>) {
    let ptr: *mut T = ptr.cast::<T>().as_ptr();
    // SAFETY: The pointer has the correct type and came from `Box::into_raw`
    // (guaranteed by the caller).
    let boxed = unsafe { Box::from_raw(ptr) };
    core::mem::drop(boxed);
}

/// Releases one strong count of the `triomphe::Arc<T>` pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from `triomphe::Arc<T>` via
///    [`triomphe::Arc::into_raw`].
/// 2. The caller owns the released strong count and does not use the pointer
///    afterwards.
unsafe fn drop_arc<T: 'static>(ptr: NonNull<Erased>) {
    let ptr: *const T = ptr.cast::<T>().as_ptr();
    // SAFETY:
    // 1. The pointer has the correct type and came from `Arc::into_raw`
    // 2. After `from_raw`, the pointer is consumed and not accessed again
    let arc = unsafe { triomphe::Arc::from_raw(ptr) };
    core::mem::drop(arc);
}

/// Adds one strong count to the `triomphe::Arc<T>` pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from `triomphe::Arc<T>` via
///    [`triomphe::Arc::into_raw`] and the allocation is alive.
unsafe fn clone_arc<T: 'static>(ptr: NonNull<Erased>) -> NonNull<Erased> {
    let ptr: *const T = ptr.cast::<T>().as_ptr();
    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the
    // correct type (guaranteed by the caller), which fulfills the requirements
    // for `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };
    let arc: triomphe::Arc<T> = arc_borrow.clone_arc();
    let ptr: *const T = triomphe::Arc::into_raw(arc);
    // SAFETY: Triomphe guarantees that `Arc::into_raw` returns a non-null
    // pointer.
    unsafe { NonNull::new_unchecked(ptr.cast_mut()) }.cast::<Erased>()
}

/// Reads the strong count of the `triomphe::Arc<T>` pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from `triomphe::Arc<T>` via
///    [`triomphe::Arc::into_raw`] and the allocation is alive.
unsafe fn strong_count<T: 'static>(ptr: NonNull<Erased>) -> usize {
    let ptr: *const T = ptr.cast::<T>().as_ptr();
    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the
    // correct type (guaranteed by the caller).
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };
    triomphe::ArcBorrow::strong_count(&arc_borrow)
}

/// Moves the object of a `Box<T>` into a new `triomphe::Arc<T>`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from `Box<T>` via [`Box::into_raw`].
/// 2. The pointer is not used after calling this function.
unsafe fn box_into_arc<T: 'static>(ptr: NonNull<Erased>) -> NonNull<Erased> {
    let ptr: *mut T = ptr.cast::<T>().as_ptr();
    // SAFETY: The pointer has the correct type and came from `Box::into_raw`
    // (guaranteed by the caller).
    let boxed = unsafe { Box::from_raw(ptr) };
    let arc = triomphe::Arc::new(*boxed);
    let ptr: *const T = triomphe::Arc::into_raw(arc);
    // SAFETY: Triomphe guarantees that `Arc::into_raw` returns a non-null
    // pointer.
    unsafe { NonNull::new_unchecked(ptr.cast_mut()) }.cast::<Erased>()
}

/// Moves the object of a uniquely owned `triomphe::Arc<T>` into a new
/// `Box<T>`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from `triomphe::Arc<T>` via
///    [`triomphe::Arc::into_raw`].
/// 2. The strong count is exactly `1` and is owned by the caller.
/// 3. The pointer is not used after calling this function.
unsafe fn arc_into_box<T: 'static>(ptr: NonNull<Erased>) -> NonNull<Erased> {
    let ptr: *const T = ptr.cast::<T>().as_ptr();
    // SAFETY: The pointer has the correct type and came from `Arc::into_raw`
    // (guaranteed by the caller). It is not used after this call.
    let arc: triomphe::Arc<T> = unsafe { triomphe::Arc::from_raw(ptr) };

    let value = match triomphe::Arc::try_unique(arc) {
        Ok(unique) => triomphe::UniqueArc::into_inner(unique),
        Err(_) => {
            if cfg!(debug_assertions) {
                unreachable!("Caller did not fulfill the guarantee that the pointer is unique")
            } else {
                // SAFETY: This unsafe block *will* cause Undefined Behavior. However our
                // caller guarantees that the count is `1`. This branch can only be
                // reached when our caller has broken that requirement.
                unsafe { core::hint::unreachable_unchecked() }
            }
        }
    };

    let ptr: *mut T = Box::into_raw(Box::new(value));
    // SAFETY: `Box::into_raw` returns a non-null pointer.
    unsafe { NonNull::new_unchecked(ptr) }.cast::<Erased>()
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn test_storage_vtable_eq() {
        let vtable1 = StorageVtable::new::<i32>();
        let vtable2 = StorageVtable::new::<i32>();

        // Both should be the exact same static instance
        assert!(core::ptr::eq(vtable1, vtable2));
    }

    #[test]
    fn test_storage_vtable_type_id() {
        assert_eq!(StorageVtable::new::<i32>().type_id(), TypeId::of::<i32>());
        assert_eq!(
            StorageVtable::new::<String>().type_id(),
            TypeId::of::<String>()
        );
        assert!(!core::ptr::eq(
            StorageVtable::new::<i32>(),
            StorageVtable::new::<String>()
        ));
    }

    #[test]
    fn test_box_arc_round_trip() {
        let vtable = StorageVtable::new::<String>();
        let ptr = Box::into_raw(Box::new(String::from("moved")));
        // SAFETY: `Box::into_raw` returns a non-null pointer.
        let ptr = unsafe { NonNull::new_unchecked(ptr) }.cast::<Erased>();

        // SAFETY: The pointer came from `Box<String>` and is not reused.
        let arc_ptr = unsafe { vtable.box_into_arc(ptr) };
        // SAFETY: The pointer came from `Arc<String>` and is alive.
        assert_eq!(unsafe { vtable.strong_count(arc_ptr) }, 1);

        // SAFETY: The count is 1 and we own it.
        let box_ptr = unsafe { vtable.arc_into_box(arc_ptr) };
        // SAFETY: The pointer came from `Box<String>`.
        assert_eq!(unsafe { box_ptr.cast::<String>().as_ref() }, "moved");
        // SAFETY: The pointer came from `Box<String>` and is not reused.
        unsafe { vtable.drop_box(box_ptr) };
    }

    #[test]
    fn test_clone_and_drop_arc() {
        let vtable = StorageVtable::new::<i32>();
        let arc = triomphe::Arc::new(5);
        let observer = arc.clone();
        let ptr: *const i32 = triomphe::Arc::into_raw(arc);
        // SAFETY: `Arc::into_raw` returns a non-null pointer.
        let ptr = unsafe { NonNull::new_unchecked(ptr.cast_mut()) }.cast::<Erased>();

        // SAFETY: The pointer came from `Arc<i32>` and is alive.
        let cloned = unsafe { vtable.clone_arc(ptr) };
        assert_eq!(ptr, cloned);
        // SAFETY: The pointer came from `Arc<i32>` and is alive.
        assert_eq!(unsafe { vtable.strong_count(ptr) }, 3);

        // SAFETY: We own both strong counts and do not use them afterwards.
        unsafe {
            vtable.drop_arc(cloned);
        }
        // SAFETY: See above.
        unsafe {
            vtable.drop_arc(ptr);
        }
        assert!(triomphe::Arc::try_unique(observer).is_ok());
    }
}
