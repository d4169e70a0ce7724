#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Composable, capability-based type erasure.
//!
//! ## Overview
//!
//! This crate lets you describe a set of methods once and then hold *any*
//! value providing those methods behind a single wrapper type, [`Any`]. Calls
//! on the wrapper are dispatched to the concrete value through a table of
//! function pointers that is computed at compile time for every concrete
//! type.
//!
//! Unlike `dyn Trait`, the set of methods is built from independent pieces:
//! overloads of one method name can be declared separately, interfaces can
//! be combined and narrowed, and the wrapper can own, borrow or share the
//! object it holds.
//!
//! ## Quick Example
//!
//! ```
//! use raspberry::prelude::*;
//!
//! operation! {
//!     pub trait Func {
//!         fn func(&self) -> i32;
//!     }
//! }
//!
//! operation! {
//!     pub trait Square {
//!         fn square(&mut self, x: f32) -> f32;
//!     }
//! }
//!
//! interface! {
//!     pub struct FuncSquare { Func, Square }
//! }
//!
//! struct SomeFunc;
//!
//! impl Func for SomeFunc {
//!     fn func(&self) -> i32 {
//!         42
//!     }
//! }
//!
//! impl Square for SomeFunc {
//!     fn square(&mut self, x: f32) -> f32 {
//!         x * x
//!     }
//! }
//!
//! let mut f: Any<'_, FuncSquare> = Any::new(SomeFunc);
//! assert_eq!(f.func(), 42);
//! assert_eq!(f.square(12.0), 144.0);
//! ```
//!
//! ## Core Concepts
//!
//! - An **operation** is one method signature, declared with [`operation!`].
//!   It becomes a capability trait that concrete types implement, plus an
//!   `...Ext` trait that is the call surface on the wrapper.
//! - An **interface** is an ordered set of operations, declared with
//!   [`interface!`]. It can include other interfaces with `..Other`.
//! - A **dispatch table** holds one function pointer per operation of an
//!   interface, for one concrete type. It is a constant; building a wrapper
//!   only copies it.
//! - The **storage** of a wrapper holds the object in one of four
//!   [`StorageMode`]s, picked from what the wrapper was built from.
//!
//! ## Storage and Ownership
//!
//! | Built from               | Constructor                      | Mode                       | Marker                  |
//! |--------------------------|----------------------------------|----------------------------|-------------------------|
//! | `T`                      | [`Any::new`]                     | [`StorageMode::Value`]     | [`Owned`]               |
//! | `Box<T>`                 | [`Any::from_box`]                | [`StorageMode::Unique`]    | [`Owned`]               |
//! | `&mut T`                 | [`Any::from_mut`]                | [`StorageMode::Reference`] | [`Exclusive`]           |
//! | `NonNull<T>`             | [`Any::from_ptr`]                | [`StorageMode::Reference`] | [`Exclusive`]           |
//! | `&T`                     | [`Any::from_ref`]                | [`StorageMode::Reference`] | [`Shared`]              |
//! | `triomphe::Arc<T>`       | [`Any::from_arc`]                | [`StorageMode::Shared`]    | [`Shared`]              |
//!
//! The marker decides which operations can be called; see [`markers`].
//!
//! ## Conversions
//!
//! - [`Any::narrow`] and [`Any::from_any`] convert to an interface listing a
//!   subset of the operations. Converting to an interface with an operation
//!   the source lacks does not compile.
//! - [`Any::into_shared`] and [`Any::try_into_owned`] move between owned and
//!   shared storage.
//! - [`Any::as_ref`] and [`Any::as_mut`] borrow a wrapper as a wrapper.
//!
//! ## Compile-time Guarantees
//!
//! Every check is made by the type system:
//!
//! - Building an [`Any`] from a type that lacks a capability does not
//!   compile. This includes other wrappers: an [`Any`] never implements a
//!   capability trait, only the `...Ext` traits.
//! - Calling an operation whose receiver the marker does not allow does not
//!   compile.
//! - Two entries that are equally applicable for a call are reported as an
//!   ambiguity by the compiler.
//!
//! [`Owned`]: markers::Owned
//! [`Exclusive`]: markers::Exclusive
//! [`Shared`]: markers::Shared

extern crate alloc;

#[macro_use]
mod macros;

pub mod markers;
pub mod prelude;

mod any;
mod convert;
mod interface;

pub use raspberry_internals::StorageMode;

pub use self::{
    any::Any,
    convert::Convert,
    interface::{Implements, Interface, Narrow, Operation, OperationFor, Provides},
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    pub use core::marker::PhantomData;

    #[doc(hidden)]
    pub use paste::paste;
    #[doc(hidden)]
    pub use raspberry_internals::{RawStorage, RawStorageMut, RawStorageRef};

    use crate::{
        Any, Interface,
        markers::{Owned, Writable},
    };

    /// Names the operation at position `Index` of an interface table.
    #[doc(hidden)]
    pub trait Member<Index> {
        type Operation: crate::Operation;
    }

    #[doc(hidden)]
    #[allow(missing_copy_implementations)]
    pub struct First;

    #[doc(hidden)]
    pub struct Next<Index>(PhantomData<Index>);

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub fn split_ref<'b, I: Interface, O: 'static>(
        any: &'b Any<'_, I, O>,
    ) -> (RawStorageRef<'b>, &'b I::Table) {
        any.as_raw_ref()
    }

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub fn split_mut<'b, I: Interface, O: Writable>(
        any: &'b mut Any<'_, I, O>,
    ) -> (RawStorageMut<'b>, &'b I::Table) {
        any.as_raw_mut()
    }

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub fn into_parts<I: Interface>(any: Any<'_, I, Owned>) -> (RawStorage, I::Table) {
        any.into_raw()
    }
}
