#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`raspberry`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage handle and the
//! unsafe operations that power the [`raspberry`] capability wrapper. It owns
//! every raw pointer the wrapper ever holds.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`raspberry`] crate, not this one.
//!
//! # Architecture
//!
//! - [`RawStorage`]: Owned handle to an object of an erased type, in one of
//!   the four [`StorageMode`]s
//! - [`RawStorageRef`]/[`RawStorageMut`]: Borrowed views (shared/mutable)
//! - [`StorageVtable`]: Function pointers that release, duplicate and re-home
//!   the object without knowing its type
//!
//! # Safety Strategy
//!
//! The fields of [`RawStorage`] are private to a single module, so the
//! pairing of pointer, vtable and mode is locally verifiable. Typed access
//! goes through `downcast_unchecked`, whose only obligation is that the caller
//! names the correct type. The [`raspberry`] crate discharges that obligation
//! by building dispatch tables from the same type the storage was built from.
//!
//! [`raspberry`]: https://docs.rs/raspberry/latest/raspberry/
//! [`StorageVtable`]: storage::vtable::StorageVtable

extern crate alloc;

mod storage;
mod util;

pub use storage::{RawStorage, RawStorageMut, RawStorageRef, StorageMode};
