//! Type-erased storage pointer types.
//!
//! This module encapsulates the `ptr`, `vtable` and `mode` fields of
//! [`RawStorage`], [`RawStorageRef`] and [`RawStorageMut`], ensuring they are
//! only visible within this module. This visibility restriction guarantees the
//! safety invariant: **the vtable always matches the pointee, and the mode
//! always describes where the pointer came from**.
//!
//! # Safety Invariant
//!
//! The fields can only be set by the constructors of [`RawStorage`], which
//! derive all three from the same typed source value. The mode transitions
//! ([`RawStorage::into_shared`], [`RawStorage::try_into_unique`]) replace the
//! pointer and the mode together.
//!
//! # Allocation Strategy
//!
//! | Mode                      | Pointer origin               | Released on drop |
//! |---------------------------|------------------------------|------------------|
//! | [`StorageMode::Value`]    | [`Box::into_raw`]            | yes              |
//! | [`StorageMode::Unique`]   | [`Box::into_raw`]            | yes              |
//! | [`StorageMode::Shared`]   | [`triomphe::Arc::into_raw`]  | one strong count |
//! | [`StorageMode::Reference`]| a borrow held by the caller  | no               |

use alloc::boxed::Box;
use core::{any::TypeId, marker::PhantomData, mem::ManuallyDrop, ptr::NonNull};

use crate::{
    storage::{mode::StorageMode, vtable::StorageVtable},
    util::Erased,
};

/// An owned, type-erased handle to an object of some type `T`, though we do
/// not know which actual `T` it is.
///
/// Depending on its [`StorageMode`] the handle either owns the object, holds
/// one strong count of a shared allocation, or merely points at an object
/// owned by somebody else.
pub struct RawStorage {
    /// Pointer to the stored object
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer points to an initialized `T`, where `T` is the type
    ///    the `vtable` was created for.
    /// 2. If `mode` owns its allocation, the pointer was created using
    ///    [`Box::into_raw`] and is owned by this struct.
    /// 3. If `mode` is [`StorageMode::Shared`], the pointer was created using
    ///    [`triomphe::Arc::into_raw`] and this struct owns one strong count.
    /// 4. If `mode` is [`StorageMode::Reference`], validity of the pointee is
    ///    guaranteed by whoever created this struct.
    ptr: NonNull<Erased>,
    /// Vtable for the stored type
    vtable: &'static StorageVtable,
    /// How the object is held
    mode: StorageMode,
}

impl RawStorage {
    /// Creates a new [`RawStorage`] holding `value` in its own allocation.
    #[inline]
    pub fn new_value<T: 'static>(value: T) -> Self {
        let mut storage = Self::from_box(Box::new(value));
        storage.mode = StorageMode::Value;
        storage
    }

    /// Creates a new [`RawStorage`] taking over an existing [`Box`].
    #[inline]
    pub fn from_box<T: 'static>(value: Box<T>) -> Self {
        let ptr: *mut T = Box::into_raw(value);
        // SAFETY: `Box::into_raw` returns a non-null pointer.
        let ptr: NonNull<T> = unsafe { NonNull::new_unchecked(ptr) };

        Self {
            // SAFETY:
            // 1. The pointer points to the `T` we just moved into the box
            // 2. We created the pointer using `Box::into_raw` and own it
            // 3. Not applicable
            // 4. Not applicable
            ptr: ptr.cast::<Erased>(),
            vtable: StorageVtable::new::<T>(),
            mode: StorageMode::Unique,
        }
    }

    /// Creates a new [`RawStorage`] taking over one strong count of a
    /// [`triomphe::Arc`].
    #[inline]
    pub fn from_arc<T: 'static>(value: triomphe::Arc<T>) -> Self {
        let ptr: *const T = triomphe::Arc::into_raw(value);
        // SAFETY: Triomphe guarantees that `Arc::into_raw` returns a non-null
        // pointer.
        let ptr: NonNull<T> = unsafe { NonNull::new_unchecked(ptr.cast_mut()) };

        Self {
            // SAFETY:
            // 1. The pointer points to the `T` inside the `Arc`
            // 2. Not applicable
            // 3. We created the pointer using `Arc::into_raw` and own the
            //    strong count of the consumed `Arc`
            // 4. Not applicable
            ptr: ptr.cast::<Erased>(),
            vtable: StorageVtable::new::<T>(),
            mode: StorageMode::Shared,
        }
    }

    /// Creates a new [`RawStorage`] pointing at an object owned elsewhere.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer points to an initialized `T` for as long as the
    ///    returned [`RawStorage`] (or any handle cloned from it) is accessed.
    #[inline]
    pub unsafe fn from_ptr<T: 'static>(ptr: NonNull<T>) -> Self {
        Self {
            // SAFETY:
            // 1. Guaranteed by the caller
            // 2. Not applicable
            // 3. Not applicable
            // 4. Guaranteed by the caller
            ptr: ptr.cast::<Erased>(),
            vtable: StorageVtable::new::<T>(),
            mode: StorageMode::Reference,
        }
    }

    /// Returns how the object is held.
    #[inline]
    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Returns the [`TypeId`] of the stored object.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.vtable.type_id()
    }

    /// Returns the strong count of the shared allocation, or [`None`] if the
    /// object is not held in [`StorageMode::Shared`].
    #[inline]
    pub fn strong_count(&self) -> Option<usize> {
        match self.mode {
            StorageMode::Shared => {
                // SAFETY:
                // 1. In shared mode the pointer comes from `Arc::into_raw` and we own
                //    one strong count, so the allocation is alive
                let count = unsafe { self.vtable.strong_count(self.ptr) };
                Some(count)
            }
            StorageMode::Value | StorageMode::Reference | StorageMode::Unique => None,
        }
    }

    /// Returns a shared view of the stored object.
    #[inline]
    pub fn as_ref(&self) -> RawStorageRef<'_> {
        RawStorageRef {
            ptr: self.ptr,
            vtable: self.vtable,
            _marker: PhantomData,
        }
    }

    /// Returns a mutable view of the stored object.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. No other reference to the stored object is alive while the
    ///    returned [`RawStorageMut`] is used. For [`StorageMode::Shared`]
    ///    this means the strong count is `1`; for
    ///    [`StorageMode::Reference`] it means the storage was created from an
    ///    exclusive borrow.
    #[inline]
    pub unsafe fn as_mut(&mut self) -> RawStorageMut<'_> {
        RawStorageMut {
            // SAFETY: Exclusive access is guaranteed by the caller.
            ptr: self.ptr,
            vtable: self.vtable,
            _marker: PhantomData,
        }
    }

    /// Creates a second handle to the same object.
    ///
    /// For [`StorageMode::Shared`] this adds a strong count. For
    /// [`StorageMode::Reference`] the pointer is copied.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The mode is [`StorageMode::Shared`] or [`StorageMode::Reference`].
    /// 2. Neither handle is used to mutate the object while the other is
    ///    alive.
    #[inline]
    pub unsafe fn clone_handle(&self) -> Self {
        if !self.mode.is_duplicable() {
            if cfg!(debug_assertions) {
                unreachable!("Caller did not fulfill the guarantee that the mode is duplicable")
            } else {
                // SAFETY: This unsafe block *will* cause Undefined Behavior. However our
                // caller guarantees that the mode is duplicable. This branch can only be
                // reached when our caller has broken that requirement.
                unsafe { core::hint::unreachable_unchecked() }
            }
        }

        let ptr = if self.mode == StorageMode::Shared {
            // SAFETY:
            // 1. In shared mode the pointer comes from `Arc::into_raw` and we own one
            //    strong count, so the allocation is alive
            unsafe { self.vtable.clone_arc(self.ptr) }
        } else {
            self.ptr
        };

        Self {
            // SAFETY:
            // 1. Same pointee as `self`
            // 2. Not applicable, the mode is not owning
            // 3. We just acquired a strong count for the new handle
            // 4. The same guarantee that covers `self` covers the copy
            ptr,
            vtable: self.vtable,
            mode: self.mode,
        }
    }

    /// Converts the handle to [`StorageMode::Shared`].
    ///
    /// Owned objects are moved into a fresh shared allocation with a strong
    /// count of `1`. Handles that are already shared or borrowed are returned
    /// unchanged.
    #[inline]
    pub fn into_shared(self) -> Self {
        match self.mode {
            StorageMode::Value | StorageMode::Unique => {
                let this = ManuallyDrop::new(self);
                // SAFETY:
                // 1. In owning modes the pointer comes from `Box::into_raw` with the type
                //    of the vtable
                // 2. `this` is never dropped, so the pointer is not used again
                let ptr = unsafe { this.vtable.box_into_arc(this.ptr) };
                Self {
                    // SAFETY:
                    // 1. The object was moved into the new allocation
                    // 2. Not applicable
                    // 3. `box_into_arc` returned a pointer from `Arc::into_raw` that owns
                    //    its strong count
                    // 4. Not applicable
                    ptr,
                    vtable: this.vtable,
                    mode: StorageMode::Shared,
                }
            }
            StorageMode::Reference | StorageMode::Shared => self,
        }
    }

    /// Attempts to convert the handle into one that owns its object
    /// exclusively.
    ///
    /// Owned handles are returned as they are. A shared handle whose strong
    /// count is `1` is moved into a fresh [`Box`] and returned in
    /// [`StorageMode::Unique`]. Every other handle is returned in the `Err`
    /// variant.
    #[inline]
    pub fn try_into_unique(self) -> Result<Self, Self> {
        match self.mode {
            StorageMode::Value | StorageMode::Unique => Ok(self),
            StorageMode::Reference => Err(self),
            StorageMode::Shared => {
                if self.strong_count() != Some(1) {
                    return Err(self);
                }
                let this = ManuallyDrop::new(self);
                // SAFETY:
                // 1. In shared mode the pointer comes from `Arc::into_raw` with the type
                //    of the vtable
                // 2. We just checked that the count is `1`, and we own that count
                // 3. `this` is never dropped, so the pointer is not used again
                let ptr = unsafe { this.vtable.arc_into_box(this.ptr) };
                Ok(Self {
                    // SAFETY:
                    // 1. The object was moved into the new box
                    // 2. `arc_into_box` returned a pointer from `Box::into_raw`
                    // 3. Not applicable
                    // 4. Not applicable
                    ptr,
                    vtable: this.vtable,
                    mode: StorageMode::Unique,
                })
            }
        }
    }

    /// Moves the stored object out of the handle.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the type of the stored object.
    /// 2. The mode owns its allocation ([`StorageMode::Value`] or
    ///    [`StorageMode::Unique`]).
    #[inline]
    pub unsafe fn into_inner<T: 'static>(self) -> T {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<T>());

        if !self.mode.owns_allocation() {
            if cfg!(debug_assertions) {
                unreachable!("Caller did not fulfill the guarantee that the storage is owned")
            } else {
                // SAFETY: This unsafe block *will* cause Undefined Behavior. However our
                // caller guarantees that the mode owns its allocation. This branch can
                // only be reached when our caller has broken that requirement.
                unsafe { core::hint::unreachable_unchecked() }
            }
        }

        let this = ManuallyDrop::new(self);
        let ptr: *mut T = this.ptr.cast::<T>().as_ptr();
        // SAFETY:
        // 1. In owning modes the pointer comes from `Box::into_raw`, and the type is
        //    correct (guaranteed by the caller)
        // 2. `this` is never dropped, so the pointer is not used again
        let boxed: Box<T> = unsafe { Box::from_raw(ptr) };
        *boxed
    }
}

impl core::ops::Drop for RawStorage {
    #[inline]
    fn drop(&mut self) {
        match self.mode {
            StorageMode::Value | StorageMode::Unique => {
                // SAFETY:
                // 1. In owning modes the pointer comes from `Box::into_raw` with the type
                //    of the vtable
                // 2. The pointer is not used after this call (we're in the drop function)
                unsafe { self.vtable.drop_box(self.ptr) }
            }
            StorageMode::Shared => {
                // SAFETY:
                // 1. In shared mode the pointer comes from `Arc::into_raw` with the type
                //    of the vtable
                // 2. We own one strong count and do not use the pointer after this call
                unsafe { self.vtable.drop_arc(self.ptr) }
            }
            StorageMode::Reference => {}
        }
    }
}

impl core::fmt::Debug for RawStorage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawStorage")
            .field("ptr", &self.ptr)
            .field("mode", &self.mode)
            .finish()
    }
}

/// A lifetime-bound shared view of a type-erased object.
///
/// # Safety invariants
///
/// This view behaves like a `&'a T` for some unknown `T` and upholds the
/// usual safety invariants of shared references:
///
/// 1. The pointee is properly initialized for the entire lifetime `'a`.
/// 2. The pointee is not mutated for the entire lifetime `'a`.
/// 3. The vtable matches the type of the pointee.
#[derive(Clone, Copy)]
pub struct RawStorageRef<'a> {
    /// Pointer to the stored object
    ptr: NonNull<Erased>,
    /// Vtable for the stored type
    vtable: &'static StorageVtable,
    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a Erased`
    _marker: PhantomData<&'a Erased>,
}

impl<'a> RawStorageRef<'a> {
    /// Returns the [`TypeId`] of the viewed object.
    #[inline]
    pub fn type_id(self) -> TypeId {
        self.vtable.type_id()
    }

    /// Casts the view back to a typed reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the type of the viewed object.
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a T {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.type_id(), TypeId::of::<T>());

        let ptr: NonNull<T> = self.ptr.cast::<T>();
        // SAFETY:
        // 1. The pointee is initialized and not mutated for `'a` (guaranteed by
        //    the invariants of `RawStorageRef`)
        // 2. The type is correct (guaranteed by the caller)
        unsafe { ptr.as_ref() }
    }

    /// Creates a [`RawStorage`] in [`StorageMode::Reference`] pointing at the
    /// viewed object.
    ///
    /// The returned handle does not carry the lifetime `'a`. It is the
    /// caller's job to stop accessing it once `'a` has ended.
    #[inline]
    pub fn into_reference(self) -> RawStorage {
        RawStorage {
            // SAFETY:
            // 1. The pointee matches the vtable (invariant of `RawStorageRef`)
            // 2. Not applicable
            // 3. Not applicable
            // 4. Documented as the caller's responsibility
            ptr: self.ptr,
            vtable: self.vtable,
            mode: StorageMode::Reference,
        }
    }
}

impl core::fmt::Debug for RawStorageRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawStorageRef")
            .field("ptr", &self.ptr)
            .finish()
    }
}

/// A lifetime-bound mutable view of a type-erased object.
///
/// # Safety invariants
///
/// This view behaves like a `&'a mut T` for some unknown `T` and upholds the
/// usual safety invariants of mutable references:
///
/// 1. The pointee is properly initialized for the entire lifetime `'a`.
/// 2. The pointee is not aliased for the entire lifetime `'a`.
/// 3. The vtable matches the type of the pointee.
pub struct RawStorageMut<'a> {
    /// Pointer to the stored object
    ptr: NonNull<Erased>,
    /// Vtable for the stored type
    vtable: &'static StorageVtable,
    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut Erased`
    _marker: PhantomData<&'a mut Erased>,
}

impl<'a> RawStorageMut<'a> {
    /// Consumes the mutable view and returns a shared view with the same
    /// lifetime.
    #[inline]
    pub fn into_ref(self) -> RawStorageRef<'a> {
        RawStorageRef {
            ptr: self.ptr,
            vtable: self.vtable,
            _marker: PhantomData,
        }
    }

    /// Casts the view back to a typed mutable reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the type of the viewed object.
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a mut T {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<T>());

        let mut ptr: NonNull<T> = self.ptr.cast::<T>();
        // SAFETY:
        // 1. The pointee is initialized and unaliased for `'a` (guaranteed by
        //    the invariants of `RawStorageMut`)
        // 2. The type is correct (guaranteed by the caller)
        unsafe { ptr.as_mut() }
    }

    /// Creates a [`RawStorage`] in [`StorageMode::Reference`] pointing at the
    /// viewed object.
    ///
    /// The returned handle does not carry the lifetime `'a`. It is the
    /// caller's job to stop accessing it once `'a` has ended.
    #[inline]
    pub fn into_reference(self) -> RawStorage {
        self.into_ref().into_reference()
    }
}

impl core::fmt::Debug for RawStorageMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawStorageMut")
            .field("ptr", &self.ptr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String};
    use core::cell::Cell;

    use super::*;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_raw_storage_size() {
        assert_eq!(
            core::mem::size_of::<RawStorage>(),
            3 * core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<RawStorage>>(),
            core::mem::size_of::<RawStorage>()
        );
        assert_eq!(
            core::mem::size_of::<RawStorageRef<'_>>(),
            2 * core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<RawStorageMut<'_>>(),
            2 * core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_raw_storage_modes() {
        let mut local = 3_i32;

        let value = RawStorage::new_value(1_i32);
        let unique = RawStorage::from_box(Box::new(2_i32));
        let shared = RawStorage::from_arc(triomphe::Arc::new(String::from("shared")));
        // SAFETY: `local` outlives `reference`.
        let reference = unsafe { RawStorage::from_ptr(NonNull::from(&mut local)) };

        assert_eq!(value.mode(), StorageMode::Value);
        assert_eq!(unique.mode(), StorageMode::Unique);
        assert_eq!(shared.mode(), StorageMode::Shared);
        assert_eq!(reference.mode(), StorageMode::Reference);

        assert_eq!(value.type_id(), TypeId::of::<i32>());
        assert_eq!(shared.type_id(), TypeId::of::<String>());

        // SAFETY: The stored types are correct.
        unsafe {
            assert_eq!(*value.as_ref().downcast_unchecked::<i32>(), 1);
        }
        // SAFETY: The stored types are correct.
        unsafe {
            assert_eq!(*unique.as_ref().downcast_unchecked::<i32>(), 2);
        }
        // SAFETY: The stored types are correct.
        unsafe {
            assert_eq!(shared.as_ref().downcast_unchecked::<String>(), "shared");
        }
        // SAFETY: The stored types are correct.
        unsafe {
            assert_eq!(*reference.as_ref().downcast_unchecked::<i32>(), 3);
        }
    }

    #[test]
    fn test_raw_storage_value_does_not_alias() {
        let original = 0_i32;
        let mut storage = RawStorage::new_value(original);

        // SAFETY: The storage owns its object and we hold the only handle.
        let view = unsafe { storage.as_mut() };
        // SAFETY: The stored type is `i32`.
        let stored = unsafe { view.downcast_unchecked::<i32>() };
        *stored = 12;

        assert_eq!(original, 0);
        // SAFETY: The stored type is `i32`.
        assert_eq!(unsafe { storage.into_inner::<i32>() }, 12);
    }

    #[test]
    fn test_raw_storage_reference_writes_through() {
        let mut local = 0_i32;
        {
            // SAFETY: `local` outlives `storage`, and nothing else accesses it
            // while `storage` is alive.
            let mut storage = unsafe { RawStorage::from_ptr(NonNull::from(&mut local)) };
            // SAFETY: The storage was created from an exclusive borrow.
            let view = unsafe { storage.as_mut() };
            // SAFETY: The stored type is `i32`.
            let stored = unsafe { view.downcast_unchecked::<i32>() };
            *stored = 42;
        }
        assert_eq!(local, 42);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "mode is duplicable")]
    fn test_raw_storage_clone_handle_rejects_owning_modes() {
        let storage = RawStorage::from_box(Box::new(1_u8));
        // SAFETY: Deliberately broken; debug builds turn this into a panic.
        let _second = unsafe { storage.clone_handle() };
    }

    #[test]
    fn test_raw_storage_drop() {
        let drops = Rc::new(Cell::new(0));

        drop(RawStorage::new_value(DropCounter(drops.clone())));
        assert_eq!(drops.get(), 1);

        drop(RawStorage::from_box(Box::new(DropCounter(drops.clone()))));
        assert_eq!(drops.get(), 2);

        let shared = RawStorage::from_arc(triomphe::Arc::new(DropCounter(drops.clone())));
        // SAFETY: The mode is shared and nobody mutates the object.
        let second = unsafe { shared.clone_handle() };
        assert_eq!(shared.strong_count(), Some(2));
        drop(shared);
        assert_eq!(drops.get(), 2);
        assert_eq!(second.strong_count(), Some(1));
        drop(second);
        assert_eq!(drops.get(), 3);

        let mut local = DropCounter(drops.clone());
        // SAFETY: `local` outlives `reference`.
        let reference = unsafe { RawStorage::from_ptr(NonNull::from(&mut local)) };
        drop(reference);
        assert_eq!(drops.get(), 3);
        drop(local);
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn test_raw_storage_into_shared() {
        let drops = Rc::new(Cell::new(0));
        let storage = RawStorage::new_value(DropCounter(drops.clone()));

        let shared = storage.into_shared();
        assert_eq!(shared.mode(), StorageMode::Shared);
        assert_eq!(shared.strong_count(), Some(1));
        assert_eq!(drops.get(), 0);

        drop(shared);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_raw_storage_try_into_unique() {
        let shared = RawStorage::from_arc(triomphe::Arc::new(String::from("x")));
        // SAFETY: The mode is shared and nobody mutates the object.
        let second = unsafe { shared.clone_handle() };

        let shared = match shared.try_into_unique() {
            Ok(_) => panic!("two handles are alive"),
            Err(shared) => shared,
        };
        drop(second);

        let Ok(unique) = shared.try_into_unique() else {
            panic!("the last handle should convert");
        };
        assert_eq!(unique.mode(), StorageMode::Unique);
        assert_eq!(unique.strong_count(), None);
        // SAFETY: The stored type is `String` and the mode is owning.
        assert_eq!(unsafe { unique.into_inner::<String>() }, "x");

        let mut local = 1_u8;
        // SAFETY: `local` outlives `reference`.
        let reference = unsafe { RawStorage::from_ptr(NonNull::from(&mut local)) };
        assert!(reference.try_into_unique().is_err());
    }

    #[test]
    fn test_raw_storage_into_reference() {
        let storage = RawStorage::new_value(String::from("borrowed"));
        let alias = storage.as_ref().into_reference();
        assert_eq!(alias.mode(), StorageMode::Reference);
        // SAFETY: `storage` outlives `alias`, and the stored type is `String`.
        unsafe {
            assert_eq!(alias.as_ref().downcast_unchecked::<String>(), "borrowed");
        }
        drop(alias);
        // SAFETY: The stored type is `String`.
        unsafe {
            assert_eq!(storage.as_ref().downcast_unchecked::<String>(), "borrowed");
        }
    }

    static_assertions::assert_not_impl_any!(RawStorage: Send, Sync, Clone);
    static_assertions::assert_not_impl_any!(RawStorageRef<'static>: Send, Sync);
    static_assertions::assert_not_impl_any!(RawStorageMut<'static>: Send, Sync, Copy, Clone);
}
