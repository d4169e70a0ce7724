//! Module containing the erased storage of a wrapper

mod mode;
mod raw;
mod vtable;

pub use self::{
    mode::StorageMode,
    raw::{RawStorage, RawStorageMut, RawStorageRef},
};
