//! Traits describing operations, interfaces and their dispatch tables.
//!
//! These traits are implemented by the [`operation!`](crate::operation) and
//! [`interface!`](crate::interface) macros. Implementing them by hand is
//! possible but rarely useful.
//!
//! # Overview
//!
//! - An [`Operation`] is a zero-sized token standing for one declared method
//!   signature. Its [`Entry`](Operation::Entry) is the type of the function
//!   pointer that calls that method on an erased object.
//! - [`OperationFor<T>`] provides that function pointer for a concrete `T`.
//! - An [`Interface`] is an ordered set of operations. Its
//!   [`Table`](Interface::Table) holds one entry per operation.
//! - [`Implements<T>`] builds the table for a concrete `T` at compile time.
//! - [`Provides<Op>`] reads the entry of `Op` back out of a table.
//! - [`Narrow<S>`] rebuilds a table of this interface from a table of `S`.

/// A single declared method signature.
///
/// The implementing type is a zero-sized token generated by
/// [`operation!`](crate::operation); it never exists at runtime.
pub trait Operation: 'static {
    /// The function pointer type stored in a dispatch table for this
    /// operation.
    ///
    /// The first parameter is the erased receiver: a
    /// [`RawStorageRef`](raspberry_internals::RawStorageRef) for `&self`
    /// methods, a [`RawStorageMut`](raspberry_internals::RawStorageMut) for
    /// `&mut self` methods and a
    /// [`RawStorage`](raspberry_internals::RawStorage) for `self` methods.
    type Entry: Copy + 'static;
}

/// The entry of an [`Operation`] for the concrete type `T`.
///
/// # Safety
///
/// Calling [`ENTRY`](OperationFor::ENTRY) is only sound when the erased
/// receiver stores a `T`. Dispatch tables guarantee this by pairing the entry
/// with the storage built from the same `T`.
#[diagnostic::on_unimplemented(
    message = "capability not satisfied: `{T}` does not implement the operation `{Self}`",
    label = "missing capability",
    note = "implement the capability trait declared with `operation!` for `{T}`"
)]
pub trait OperationFor<T>: Operation {
    /// Function pointer calling the operation on a `T`.
    const ENTRY: Self::Entry;
}

/// An ordered set of operations that can be dispatched through an
/// [`Any`](crate::Any).
pub trait Interface: 'static {
    /// One entry per operation, stored as nested pairs ending in `()`.
    type Table: Copy + 'static;
}

/// Builds the dispatch table of an [`Interface`] for the concrete type `T`.
///
/// This is the bound every constructor of [`Any`](crate::Any) checks. It
/// holds when `T` implements every capability trait the interface lists.
#[diagnostic::on_unimplemented(
    message = "capability not satisfied: `{T}` does not provide every operation of `{Self}`",
    label = "this type cannot be stored in `Any<{Self}>`",
    note = "wrappers are not payloads; use `Any::from_any` or `Any::narrow` to convert between them"
)]
pub trait Implements<T>: Interface {
    /// The dispatch table for `T`, computed at compile time.
    const TABLE: Self::Table;
}

/// Reads the entry of one operation out of a dispatch table.
pub trait Provides<Op: Operation>: Interface {
    /// Returns the entry of `Op` stored in `table`.
    fn entry(table: &Self::Table) -> Op::Entry;
}

/// Rebuilds a dispatch table of this interface from a table of `Source`.
///
/// Holds when `Source` provides every operation of this interface. The
/// concrete type behind the table is never consulted.
#[diagnostic::on_unimplemented(
    message = "incompatible conversion: `{Source}` does not provide every operation of `{Self}`",
    label = "cannot convert from `Any<{Source}>`"
)]
pub trait Narrow<Source: Interface>: Interface {
    /// Projects the entries of this interface out of `table`.
    fn narrow(table: &Source::Table) -> Self::Table;
}
