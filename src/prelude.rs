//! Commonly used items, for glob imports.
//!
//! ```
//! use raspberry::prelude::*;
//! ```
//!
//! The `...Ext` traits generated by [`operation!`] are not part of the
//! prelude; they live next to the operations they belong to.

pub use crate::{
    Any, Convert, StorageMode, interface,
    markers::{self, Exclusive, Owned, Shared},
    operation,
};
