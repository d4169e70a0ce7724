//! Marker types and traits for defining how a wrapper may touch its object.
//!
//! This module provides type-level markers that control which operations an
//! [`Any<'a, I, O>`](crate::Any) exposes. They appear as the third generic
//! parameter `O` and encode compile-time guarantees about how the stored
//! object may be accessed.
//!
//! # Design Philosophy
//!
//! The constraints encoded by these markers are enforced at construction time.
//! It is impossible to construct an `Any<_, _, Exclusive>` from a shared
//! borrow, or an `Any<_, _, Owned>` around an object somebody else can still
//! reach. This means you can trust that an operation taking `&mut self` on
//! the wrapper truly has exclusive access to the object behind it.
//!
//! # Access Markers
//!
//! | Marker        | Built from                         | `&self` ops | `&mut self` ops | `self` ops |
//! |---------------|------------------------------------|-------------|-----------------|------------|
//! | [`Owned`]     | a value, or a [`Box`]              | yes         | yes             | yes        |
//! | [`Exclusive`] | a `&mut T` or a raw `*mut T`       | yes         | yes             | no         |
//! | [`Shared`]    | a `&T` or a [`triomphe::Arc`]      | yes         | no              | no         |
//!
//! Only [`Shared`] wrappers implement [`Clone`]; cloning one never copies the
//! object.
//!
//! [`Box`]: alloc::boxed::Box

/// Marker type for wrappers that own their object.
///
/// The object was moved into the wrapper, either by value or inside a
/// [`Box`](alloc::boxed::Box). Every operation is available, including those
/// that consume the object.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Owned;

/// Marker type for wrappers that borrow their object exclusively.
///
/// Operations may read and mutate the object, and the mutations are visible
/// to its owner once the wrapper is gone. Operations that consume the object
/// are unavailable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Exclusive;

/// Marker type for wrappers whose object may be reachable through other
/// handles.
///
/// Only operations taking `&self` are available. The wrapper implements
/// [`Clone`], which produces another handle to the same object.
///
/// ```compile_fail
/// use raspberry::prelude::*;
///
/// operation! {
///     pub trait Reset {
///         fn reset(&mut self);
///     }
/// }
///
/// interface! {
///     pub struct Resettable { Reset }
/// }
///
/// impl Reset for u32 {
///     fn reset(&mut self) {
///         *self = 0;
///     }
/// }
///
/// let value = 5_u32;
/// let mut shared: Any<'_, Resettable, Shared> = Any::from_ref(&value);
/// shared.reset();
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Shared;

mod sealed_access_marker {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for Owned {}
    impl Sealed for Exclusive {}
    impl Sealed for Shared {}
}

/// Marker trait for the access level of a wrapper.
///
/// This trait is implemented for [`Owned`], [`Exclusive`] and [`Shared`].
/// Operations declared with a `&self` receiver are available for every
/// implementor.
///
/// # Implementation
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait Access: sealed_access_marker::Sealed {}

impl Access for Owned {}
impl Access for Exclusive {}
impl Access for Shared {}

/// Marker trait for access levels that allow mutation.
///
/// This trait is implemented for [`Owned`] and [`Exclusive`]. Operations
/// declared with a `&mut self` receiver require it.
///
/// # Implementation
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait Writable: Access {}

impl Writable for Owned {}
impl Writable for Exclusive {}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(Owned: Access, Writable);
    static_assertions::assert_impl_all!(Exclusive: Access, Writable);
    static_assertions::assert_impl_all!(Shared: Access);
    static_assertions::assert_not_impl_any!(Shared: Writable);
}
