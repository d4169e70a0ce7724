//! The type-erased wrapper and its ownership conversions.

mod owned;

pub use self::owned::Any;
