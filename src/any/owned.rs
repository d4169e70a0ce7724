use alloc::boxed::Box;
use core::ptr::NonNull;

use raspberry_internals::{RawStorage, StorageMode};

use crate::{
    Implements, Interface, Narrow,
    markers::{Access, Exclusive, Owned, Shared, Writable},
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use raspberry_internals::{RawStorage, RawStorageMut, RawStorageRef};

    use crate::{
        Interface,
        markers::{Owned, Writable},
    };

    /// A type-erased object that can be called through the operations of an
    /// interface.
    ///
    /// [`Any`] holds an object of any type implementing every capability of
    /// the interface `I`, together with the dispatch table built for that
    /// type. Calls made through the `...Ext` traits generated by
    /// [`operation!`] are routed through the table to the concrete object.
    ///
    /// # Type Parameters
    ///
    /// - **Lifetime (`'a`)**: How long a borrowed object stays valid. Owned
    ///   and shared objects can use any lifetime, typically `'static`.
    /// - **Interface (`I`)**: The operations that can be called, declared with
    ///   [`interface!`].
    /// - **Ownership (`O`)**: Which receivers are available
    ///   - [`Owned`]: The object was moved in; all operations (default)
    ///   - [`Exclusive`]: The object is borrowed mutably; `&self` and `&mut
    ///     self` operations
    ///   - [`Shared`]: The object may be reachable elsewhere; `&self`
    ///     operations only, and the wrapper is [`Clone`]
    ///
    /// # Examples
    ///
    /// ```
    /// use raspberry::prelude::*;
    ///
    /// operation! {
    ///     pub trait Area {
    ///         fn area(&self) -> f64;
    ///     }
    /// }
    ///
    /// interface! {
    ///     pub struct Shape { Area }
    /// }
    ///
    /// struct Rect(f64, f64);
    ///
    /// impl Area for Rect {
    ///     fn area(&self) -> f64 {
    ///         self.0 * self.1
    ///     }
    /// }
    ///
    /// let shape: Any<'_, Shape> = Any::new(Rect(2.0, 3.0));
    /// assert_eq!(shape.area(), 6.0);
    /// ```
    ///
    /// # Choosing between `&self` and `&mut self` entries
    ///
    /// When two operations share a method name and differ only in receiver,
    /// `any.get()` picks the `&self` entry even on a `mut` binding, because
    /// method lookup tries `&any` before `&mut any`. Write `(&mut any).get()`
    /// to reach the `&mut self` entry.
    ///
    /// ```
    /// use raspberry::prelude::*;
    ///
    /// operation! {
    ///     pub trait Peek {
    ///         fn get(&self) -> &u32;
    ///     }
    /// }
    ///
    /// operation! {
    ///     pub trait Poke {
    ///         fn get(&mut self) -> &mut u32;
    ///     }
    /// }
    ///
    /// interface! {
    ///     pub struct Slot { Peek, Poke }
    /// }
    ///
    /// struct Counter(u32);
    ///
    /// impl Peek for Counter {
    ///     fn get(&self) -> &u32 {
    ///         &self.0
    ///     }
    /// }
    ///
    /// impl Poke for Counter {
    ///     fn get(&mut self) -> &mut u32 {
    ///         &mut self.0
    ///     }
    /// }
    ///
    /// let mut slot: Any<'_, Slot> = Any::new(Counter(1));
    /// let read: &u32 = slot.get();
    /// assert_eq!(*read, 1);
    ///
    /// *(&mut slot).get() += 1;
    /// assert_eq!(*slot.get(), 2);
    /// ```
    ///
    /// [`operation!`]: crate::operation!
    /// [`interface!`]: crate::interface!
    /// [`Exclusive`]: crate::markers::Exclusive
    /// [`Shared`]: crate::markers::Shared
    pub struct Any<'a, Iface: Interface, Ownership: 'static = Owned> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. `table` was produced by `Implements<T>::TABLE` for the type `T`
        ///    of the stored object, or narrowed from such a table.
        /// 2. `O` must either be `Owned`, `Exclusive` or `Shared`.
        /// 3. If `O = Owned`: The storage owns its object (`Value` or `Unique`
        ///    mode) and no other handle to the object exists.
        /// 4. If `O = Exclusive`: The storage is in `Reference` mode, and the
        ///    object is valid and not accessed through any other path for the
        ///    lifetime `'a`.
        /// 5. If `O = Shared`: The storage is in `Reference` or `Shared` mode,
        ///    and the object is valid and not mutated for the lifetime `'a`.
        raw: RawStorage,
        table: Iface::Table,
        _lifetime: PhantomData<&'a ()>,
        _ownership: PhantomData<Ownership>,
    }

    impl<'a, I: Interface, O: 'static> Any<'a, I, O> {
        /// Creates a new [`Any`] from a [`RawStorage`] and a dispatch table.
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `table` was produced by `Implements<T>::TABLE` for the type `T`
        ///    of the stored object, or narrowed from such a table.
        /// 2. `O` must either be `Owned`, `Exclusive` or `Shared`.
        /// 3. If `O = Owned`: The storage owns its object (`Value` or `Unique`
        ///    mode) and no other handle to the object exists.
        /// 4. If `O = Exclusive`: The storage is in `Reference` mode, and the
        ///    object is valid and not accessed through any other path for the
        ///    lifetime `'a`.
        /// 5. If `O = Shared`: The storage is in `Reference` or `Shared` mode,
        ///    and the object is valid and not mutated for the lifetime `'a`.
        #[must_use]
        pub(crate) unsafe fn from_raw(raw: RawStorage, table: I::Table) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by the caller
            // 2. Guaranteed by the caller
            // 3. Guaranteed by the caller
            // 4. Guaranteed by the caller
            // 5. Guaranteed by the caller
            Self {
                raw,
                table,
                _lifetime: PhantomData,
                _ownership: PhantomData,
            }
        }

        /// Consumes the [`Any`] and returns the inner [`RawStorage`] and
        /// dispatch table.
        #[must_use]
        pub(crate) fn into_raw(self) -> (RawStorage, I::Table) {
            // SAFETY: We are destroying `self`, so we no longer
            // need to uphold any safety invariants.
            let Self { raw, table, .. } = self;
            (raw, table)
        }

        /// Returns the inner [`RawStorage`].
        #[must_use]
        pub(crate) fn as_raw(&self) -> &RawStorage {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. The storage cannot be replaced through a shared reference.
            // 2. Upheld as the type parameters do not change.
            // 3. Duplicating the handle requires `RawStorage::clone_handle`, whose
            //    safety requirements exclude owning modes.
            // 4. Duplicating the handle requires `RawStorage::clone_handle`, whose
            //    safety requirements forbid mutation while both handles are alive.
            // 5. Trivially upheld, as no mutation occurs
            &self.raw
        }

        /// Creates a lifetime-bound [`RawStorageRef`] from the inner
        /// [`RawStorage`], together with the dispatch table.
        #[must_use]
        pub(crate) fn as_raw_ref(&self) -> (RawStorageRef<'_>, &I::Table) {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the storage and the table do not change.
            // 2. Upheld as the type parameters do not change.
            // 3. Trivially upheld, as no new owning handle is created
            // 4. Shared access is compatible with exclusive ownership for the
            //    duration of the borrow of `self`.
            // 5. Trivially upheld, as no mutation occurs
            (self.raw.as_ref(), &self.table)
        }
    }

    impl<'a, I: Interface, O: Writable> Any<'a, I, O> {
        /// Creates a lifetime-bound [`RawStorageMut`] from the inner
        /// [`RawStorage`], together with the dispatch table.
        #[must_use]
        pub(crate) fn as_raw_mut(&mut self) -> (RawStorageMut<'_>, &I::Table) {
            // SAFETY: We need to uphold the safety invariants of the raw field:
            // 1. While mutation of the object is possible through this reference, it
            //    is not possible to change the type of the object.
            // 2. Upheld as the type parameters do not change.
            // 3. Upheld, as this does not create any new handles.
            // 4. Upheld, as the returned view borrows `self` mutably.
            // 5. `O: Writable`, so this is trivially upheld.
            let raw = &mut self.raw;

            // SAFETY:
            // 1. `O: Writable` means `O` is `Owned` or `Exclusive`. By the invariants of
            //    `self` the storage then either owns its object uniquely, or borrows it
            //    without any other path accessing it. Borrowing `self` mutably makes us
            //    the only user of the storage.
            let raw = unsafe { raw.as_mut() };
            (raw, &self.table)
        }
    }
}

pub use limit_field_access::Any;

impl<'a, I: Interface> Any<'a, I, Owned> {
    /// Creates a new [`Any`] that owns `value`.
    ///
    /// The value is moved into a heap allocation owned by the wrapper
    /// ([`StorageMode::Value`]). Mutations made through the wrapper are not
    /// visible in any copy the caller kept.
    ///
    /// Fails to compile when `T` does not implement every capability of `I`.
    /// In particular an [`Any`] cannot be stored inside another [`Any`]; use
    /// [`Any::from_any`] instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use raspberry::prelude::*;
    ///
    /// operation! {
    ///     pub trait Get {
    ///         fn get(&self) -> i32;
    ///     }
    /// }
    ///
    /// interface! {
    ///     pub struct Getter { Get }
    /// }
    ///
    /// impl Get for i32 {
    ///     fn get(&self) -> i32 {
    ///         *self
    ///     }
    /// }
    ///
    /// let getter: Any<'_, Getter> = Any::new(5);
    /// assert_eq!(getter.get(), 5);
    /// assert_eq!(getter.storage_mode(), StorageMode::Value);
    /// ```
    ///
    /// Wrappers do not implement capabilities, so they cannot be stored:
    ///
    /// ```compile_fail
    /// # use raspberry::prelude::*;
    /// # operation! {
    /// #     pub trait Get {
    /// #         fn get(&self) -> i32;
    /// #     }
    /// # }
    /// # interface! {
    /// #     pub struct Getter { Get }
    /// # }
    /// # impl Get for i32 {
    /// #     fn get(&self) -> i32 {
    /// #         *self
    /// #     }
    /// # }
    /// let inner: Any<'_, Getter> = Any::new(5);
    /// let outer: Any<'_, Getter> = Any::new(inner);
    /// ```
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: 'static,
        I: Implements<T>,
    {
        let raw = RawStorage::new_value(value);

        // SAFETY:
        // 1. The table was produced by `Implements<T>::TABLE` for the stored `T`.
        // 2. `O=Owned`, so this is trivially true.
        // 3. `RawStorage::new_value` creates an owning storage, and we just created
        //    it, so there are no other handles.
        // 4. `O=Owned`, so this is trivially true.
        // 5. `O=Owned`, so this is trivially true.
        unsafe { Any::from_raw(raw, <I as Implements<T>>::TABLE) }
    }

    /// Creates a new [`Any`] that takes over an existing [`Box`].
    ///
    /// The allocation is adopted as it is ([`StorageMode::Unique`]), so the
    /// object keeps its address.
    #[must_use]
    pub fn from_box<T>(value: Box<T>) -> Self
    where
        T: 'static,
        I: Implements<T>,
    {
        let raw = RawStorage::from_box(value);

        // SAFETY:
        // 1. The table was produced by `Implements<T>::TABLE` for the stored `T`.
        // 2. `O=Owned`, so this is trivially true.
        // 3. `RawStorage::from_box` creates an owning storage, and the `Box` was
        //    consumed, so there are no other handles.
        // 4. `O=Owned`, so this is trivially true.
        // 5. `O=Owned`, so this is trivially true.
        unsafe { Any::from_raw(raw, <I as Implements<T>>::TABLE) }
    }
}

impl<'a, I: Interface> Any<'a, I, Exclusive> {
    /// Creates a new [`Any`] that borrows `value` mutably.
    ///
    /// Mutations made through the wrapper are visible in `value` once the
    /// wrapper is gone.
    #[must_use]
    pub fn from_mut<T>(value: &'a mut T) -> Self
    where
        T: 'static,
        I: Implements<T>,
    {
        // SAFETY:
        // 1. The pointer comes from a `&'a mut T`, so it stays valid for as long as
        //    the wrapper is accessed.
        let raw = unsafe { RawStorage::from_ptr(NonNull::from(value)) };

        // SAFETY:
        // 1. The table was produced by `Implements<T>::TABLE` for the stored `T`.
        // 2. `O=Exclusive`, so this is trivially true.
        // 3. `O=Exclusive`, so this is trivially true.
        // 4. `RawStorage::from_ptr` creates a `Reference` storage, and the exclusive
        //    borrow of `value` is held for `'a`.
        // 5. `O=Exclusive`, so this is trivially true.
        unsafe { Any::from_raw(raw, <I as Implements<T>>::TABLE) }
    }

    /// Creates a new [`Any`] from a raw pointer to an object owned elsewhere.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized `T` that stays valid for the
    ///    lifetime `'a`.
    /// 2. The object is not accessed through any other path for the lifetime
    ///    `'a`.
    #[must_use]
    pub unsafe fn from_ptr<T>(ptr: NonNull<T>) -> Self
    where
        T: 'static,
        I: Implements<T>,
    {
        // SAFETY:
        // 1. Guaranteed by the caller
        let raw = unsafe { RawStorage::from_ptr(ptr) };

        // SAFETY:
        // 1. The table was produced by `Implements<T>::TABLE` for the stored `T`.
        // 2. `O=Exclusive`, so this is trivially true.
        // 3. `O=Exclusive`, so this is trivially true.
        // 4. The storage is in `Reference` mode, and the rest is guaranteed by the
        //    caller.
        // 5. `O=Exclusive`, so this is trivially true.
        unsafe { Any::from_raw(raw, <I as Implements<T>>::TABLE) }
    }
}

impl<'a, I: Interface> Any<'a, I, Shared> {
    /// Creates a new [`Any`] that borrows `value`.
    #[must_use]
    pub fn from_ref<T>(value: &'a T) -> Self
    where
        T: 'static,
        I: Implements<T>,
    {
        // SAFETY:
        // 1. The pointer comes from a `&'a T`, so it stays valid for as long as the
        //    wrapper is accessed.
        let raw = unsafe { RawStorage::from_ptr(NonNull::from(value)) };

        // SAFETY:
        // 1. The table was produced by `Implements<T>::TABLE` for the stored `T`.
        // 2. `O=Shared`, so this is trivially true.
        // 3. `O=Shared`, so this is trivially true.
        // 4. `O=Shared`, so this is trivially true.
        // 5. The storage is in `Reference` mode, and the shared borrow of `value`
        //    is held for `'a`.
        unsafe { Any::from_raw(raw, <I as Implements<T>>::TABLE) }
    }

    /// Creates a new [`Any`] holding one strong count of `value`.
    ///
    /// The object is dropped when the last handle to it is gone, whether that
    /// handle is an [`Any`] or a [`triomphe::Arc`].
    #[must_use]
    pub fn from_arc<T>(value: triomphe::Arc<T>) -> Self
    where
        T: 'static,
        I: Implements<T>,
    {
        let raw = RawStorage::from_arc(value);

        // SAFETY:
        // 1. The table was produced by `Implements<T>::TABLE` for the stored `T`.
        // 2. `O=Shared`, so this is trivially true.
        // 3. `O=Shared`, so this is trivially true.
        // 4. `O=Shared`, so this is trivially true.
        // 5. The storage is in `Shared` mode, and `triomphe::Arc` hands out no
        //    mutable access while more than one count is alive.
        unsafe { Any::from_raw(raw, <I as Implements<T>>::TABLE) }
    }

    /// Returns the strong count of the shared allocation, or [`None`] when
    /// the object is borrowed.
    #[must_use]
    pub fn strong_count(&self) -> Option<usize> {
        self.as_raw().strong_count()
    }

    /// Checks if this is the only handle to an object it owns.
    ///
    /// If so, the object is moved into its own allocation and an [`Owned`]
    /// wrapper is returned in `Ok`. Otherwise the wrapper is returned
    /// unchanged in `Err`. Borrowed objects always return `Err`.
    ///
    /// # Examples
    ///
    /// ```
    /// use raspberry::prelude::*;
    ///
    /// operation! {
    ///     pub trait Get {
    ///         fn get(&self) -> i32;
    ///     }
    /// }
    ///
    /// interface! {
    ///     pub struct Getter { Get }
    /// }
    ///
    /// impl Get for i32 {
    ///     fn get(&self) -> i32 {
    ///         *self
    ///     }
    /// }
    ///
    /// let shared: Any<'_, Getter, Shared> = Any::<Getter>::new(5).into_shared();
    /// let second = shared.clone();
    ///
    /// let shared = shared.try_into_owned().unwrap_err();
    /// drop(second);
    /// let owned: Any<'_, Getter> = shared.try_into_owned().unwrap();
    /// assert_eq!(owned.get(), 5);
    /// ```
    pub fn try_into_owned(self) -> Result<Any<'a, I, Owned>, Self> {
        let (raw, table) = self.into_raw();

        match raw.try_into_unique() {
            Ok(raw) => {
                // SAFETY:
                // 1. The storage and the table are unchanged.
                // 2. `O=Owned`, so this is trivially true.
                // 3. `RawStorage::try_into_unique` only succeeds for an owning storage
                //    that is the last handle to its object.
                // 4. `O=Owned`, so this is trivially true.
                // 5. `O=Owned`, so this is trivially true.
                let any = unsafe { Any::from_raw(raw, table) };
                Ok(any)
            }
            Err(raw) => {
                // SAFETY: The storage and the table are unchanged, so the
                // invariants of `self` still hold.
                let any = unsafe { Any::from_raw(raw, table) };
                Err(any)
            }
        }
    }
}

impl<'a, I: Interface, O: Writable> Any<'a, I, O> {
    /// Converts the wrapper into a [`Shared`] one.
    ///
    /// An owned object is moved into a fresh [`triomphe::Arc`]. A borrowed
    /// object stays borrowed.
    #[must_use]
    pub fn into_shared(self) -> Any<'a, I, Shared> {
        let (raw, table) = self.into_raw();
        let raw = raw.into_shared();

        // SAFETY:
        // 1. The storage holds the same object and the table is unchanged.
        // 2. `O=Shared`, so this is trivially true.
        // 3. `O=Shared`, so this is trivially true.
        // 4. `O=Shared`, so this is trivially true.
        // 5. Owning storages were just moved into `Shared` mode with a count of
        //    `1`. A `Reference` storage came from an `Exclusive` wrapper whose
        //    borrow lasts for `'a`; giving up mutation keeps it valid.
        unsafe { Any::from_raw(raw, table) }
    }

    /// Borrows the wrapper as an [`Exclusive`] wrapper of the same object.
    #[must_use]
    pub fn as_mut(&mut self) -> Any<'_, I, Exclusive> {
        let (raw, table) = self.as_raw_mut();
        let table = *table;
        let raw = raw.into_reference();

        // SAFETY:
        // 1. The alias points to the same object and the table is copied.
        // 2. `O=Exclusive`, so this is trivially true.
        // 3. `O=Exclusive`, so this is trivially true.
        // 4. The storage is in `Reference` mode, and the mutable borrow of `self`
        //    is held for the lifetime of the returned wrapper.
        // 5. `O=Exclusive`, so this is trivially true.
        unsafe { Any::from_raw(raw, table) }
    }
}

impl<'a, I: Interface, O: Access> Any<'a, I, O> {
    /// Borrows the wrapper as a [`Shared`] wrapper of the same object.
    #[must_use]
    pub fn as_ref(&self) -> Any<'_, I, Shared> {
        let (raw, table) = self.as_raw_ref();
        let table = *table;
        let raw = raw.into_reference();

        // SAFETY:
        // 1. The alias points to the same object and the table is copied.
        // 2. `O=Shared`, so this is trivially true.
        // 3. `O=Shared`, so this is trivially true.
        // 4. `O=Shared`, so this is trivially true.
        // 5. The storage is in `Reference` mode, and the shared borrow of `self`
        //    is held for the lifetime of the returned wrapper.
        unsafe { Any::from_raw(raw, table) }
    }

    /// Converts the wrapper into one exposing fewer operations.
    ///
    /// The object, its storage mode and the ownership marker are kept. Fails
    /// to compile when `J` lists an operation `I` does not provide.
    ///
    /// # Examples
    ///
    /// ```
    /// use raspberry::prelude::*;
    ///
    /// operation! {
    ///     pub trait Name {
    ///         fn name(&self) -> &'static str;
    ///     }
    /// }
    ///
    /// operation! {
    ///     pub trait Legs {
    ///         fn legs(&self) -> u32;
    ///     }
    /// }
    ///
    /// interface! {
    ///     pub struct Named { Name }
    /// }
    ///
    /// interface! {
    ///     pub struct Animal { ..Named, Legs }
    /// }
    ///
    /// struct Cat;
    ///
    /// impl Name for Cat {
    ///     fn name(&self) -> &'static str {
    ///         "cat"
    ///     }
    /// }
    ///
    /// impl Legs for Cat {
    ///     fn legs(&self) -> u32 {
    ///         4
    ///     }
    /// }
    ///
    /// let animal: Any<'_, Animal> = Any::new(Cat);
    /// assert_eq!(animal.legs(), 4);
    ///
    /// let named: Any<'_, Named> = animal.narrow();
    /// assert_eq!(named.name(), "cat");
    /// ```
    ///
    /// Widening does not compile:
    ///
    /// ```compile_fail
    /// # use raspberry::prelude::*;
    /// # operation! {
    /// #     pub trait Name {
    /// #         fn name(&self) -> &'static str;
    /// #     }
    /// # }
    /// # operation! {
    /// #     pub trait Legs {
    /// #         fn legs(&self) -> u32;
    /// #     }
    /// # }
    /// # interface! {
    /// #     pub struct Named { Name }
    /// # }
    /// # interface! {
    /// #     pub struct Animal { ..Named, Legs }
    /// # }
    /// # struct Cat;
    /// # impl Name for Cat {
    /// #     fn name(&self) -> &'static str {
    /// #         "cat"
    /// #     }
    /// # }
    /// let named: Any<'_, Named> = Any::new(Cat);
    /// let animal: Any<'_, Animal> = named.narrow();
    /// ```
    #[must_use]
    pub fn narrow<J>(self) -> Any<'a, J, O>
    where
        J: Narrow<I>,
    {
        let (raw, table) = self.into_raw();
        let table = J::narrow(&table);

        // SAFETY:
        // 1. The narrowed table holds entries of the original table, which was
        //    built for the stored object.
        // 2. Upheld as the ownership marker does not change.
        // 3. Upheld as the storage does not change.
        // 4. Upheld as the storage does not change.
        // 5. Upheld as the storage does not change.
        unsafe { Any::from_raw(raw, table) }
    }

    /// Creates a wrapper from another wrapper whose interface provides every
    /// operation of `I`.
    ///
    /// This is [`Any::narrow`] expressed on the target type.
    #[must_use]
    pub fn from_any<S>(source: Any<'a, S, O>) -> Self
    where
        S: Interface,
        I: Narrow<S>,
    {
        source.narrow()
    }

    /// Returns how the object is held.
    #[must_use]
    pub fn storage_mode(&self) -> StorageMode {
        self.as_raw().mode()
    }
}

impl<'a, I: Interface> Clone for Any<'a, I, Shared> {
    fn clone(&self) -> Self {
        // SAFETY:
        // 1. `O=Shared`, so the storage is in `Reference` or `Shared` mode.
        // 2. `O=Shared`, so nothing mutates the object while the handles are alive.
        let raw = unsafe { self.as_raw().clone_handle() };
        let (_, table) = self.as_raw_ref();

        // SAFETY:
        // 1. The new handle points to the same object and the table is copied.
        // 2. `O=Shared`, so this is trivially true.
        // 3. `O=Shared`, so this is trivially true.
        // 4. `O=Shared`, so this is trivially true.
        // 5. Guaranteed by the invariants of `self`, which apply to the same
        //    object for the same lifetime.
        unsafe { Any::from_raw(raw, *table) }
    }
}

impl<'a, I: Interface, T> From<Box<T>> for Any<'a, I, Owned>
where
    T: 'static,
    I: Implements<T>,
{
    fn from(value: Box<T>) -> Self {
        Any::from_box(value)
    }
}

impl<'a, I: Interface, T> From<&'a mut T> for Any<'a, I, Exclusive>
where
    T: 'static,
    I: Implements<T>,
{
    fn from(value: &'a mut T) -> Self {
        Any::from_mut(value)
    }
}

impl<'a, I: Interface, T> From<&'a T> for Any<'a, I, Shared>
where
    T: 'static,
    I: Implements<T>,
{
    fn from(value: &'a T) -> Self {
        Any::from_ref(value)
    }
}

impl<'a, I: Interface, T> From<triomphe::Arc<T>> for Any<'a, I, Shared>
where
    T: 'static,
    I: Implements<T>,
{
    fn from(value: triomphe::Arc<T>) -> Self {
        Any::from_arc(value)
    }
}

impl<'a, I: Interface, O: 'static> core::fmt::Debug for Any<'a, I, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Any")
            .field("interface", &core::any::type_name::<I>())
            .field("ownership", &core::any::type_name::<O>())
            .field("mode", &self.as_raw().mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{boxed::Box, string::String};

    use super::*;

    crate::operation! {
        pub trait Describe {
            fn describe(&self) -> String;
        }
    }

    crate::interface! {
        struct Describable { Describe }
    }

    struct Label(&'static str);

    impl Describe for Label {
        fn describe(&self) -> String {
            String::from(self.0)
        }
    }

    static_assertions::assert_not_impl_any!(Any<'static, Describable, Owned>: Send, Sync, Clone);
    static_assertions::assert_not_impl_any!(Any<'static, Describable, Exclusive>: Send, Sync, Clone);
    static_assertions::assert_not_impl_any!(Any<'static, Describable, Shared>: Send, Sync);
    static_assertions::assert_impl_all!(Any<'static, Describable, Shared>: Clone);

    #[test]
    fn test_any_storage_modes() {
        let value: Any<'_, Describable> = Any::new(Label("value"));
        assert_eq!(value.storage_mode(), StorageMode::Value);

        let unique: Any<'_, Describable> = Any::from(Box::new(Label("unique")));
        assert_eq!(unique.storage_mode(), StorageMode::Unique);

        let shared: Any<'_, Describable, Shared> =
            Any::from(triomphe::Arc::new(Label("shared")));
        assert_eq!(shared.storage_mode(), StorageMode::Shared);

        let mut local = Label("local");
        let exclusive: Any<'_, Describable, Exclusive> = Any::from(&mut local);
        assert_eq!(exclusive.storage_mode(), StorageMode::Reference);
    }

    #[test]
    fn test_any_views_keep_the_object() {
        let mut any: Any<'_, Describable> = Any::new(Label("viewed"));
        {
            let view = any.as_ref();
            assert_eq!(view.storage_mode(), StorageMode::Reference);
            assert_eq!(view.clone().describe(), "viewed");
        }
        {
            let view = any.as_mut();
            assert_eq!(view.storage_mode(), StorageMode::Reference);
            assert_eq!(view.describe(), "viewed");
        }
        assert_eq!(any.storage_mode(), StorageMode::Value);
    }

    #[test]
    fn test_any_shared_round_trip() {
        let shared = Any::<Describable>::new(Label("round")).into_shared();
        assert_eq!(shared.strong_count(), Some(1));

        let second = shared.clone();
        assert_eq!(shared.strong_count(), Some(2));

        let shared = match shared.try_into_owned() {
            Ok(_) => panic!("two handles are alive"),
            Err(shared) => shared,
        };
        drop(second);

        let owned = match shared.try_into_owned() {
            Ok(owned) => owned,
            Err(_) => panic!("the last handle should convert"),
        };
        assert_eq!(owned.storage_mode(), StorageMode::Unique);
        assert_eq!(owned.describe(), "round");
    }

    #[test]
    fn test_any_borrowed_is_never_owned() {
        let label = Label("borrowed");
        let shared: Any<'_, Describable, Shared> = Any::from_ref(&label);
        assert_eq!(shared.strong_count(), None);
        assert!(shared.try_into_owned().is_err());
    }

    #[test]
    fn test_any_debug() {
        let any: Any<'_, Describable> = Any::new(Label("debug"));
        let formatted = alloc::format!("{any:?}");
        assert!(formatted.contains("Describable"));
        assert!(formatted.contains("Value"));
    }
}
