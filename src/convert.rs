//! Conversion of operation results to their declared return type.
//!
//! An operation declared as `fn test(&self, d: f64) -> impl Convert<i32>` may
//! be implemented by a method returning any type that converts to `i32`. The
//! wrapper call surface then returns a plain `i32`.
//!
//! Conversions are provided for:
//! - every type to itself
//! - every primitive numeric type to every other primitive numeric type,
//!   with the semantics of an `as` cast (truncating, saturating on float to
//!   integer)

/// Converts a value into `R`.
///
/// # Examples
///
/// ```
/// use raspberry::Convert;
///
/// let truncated: i32 = Convert::<i32>::convert(7.42_f64);
/// assert_eq!(truncated, 7);
///
/// let same: String = Convert::<String>::convert(String::from("same"));
/// assert_eq!(same, "same");
/// ```
pub trait Convert<R> {
    /// Performs the conversion.
    fn convert(self) -> R;
}

impl<T> Convert<T> for T {
    #[inline]
    fn convert(self) -> T {
        self
    }
}

macro_rules! impl_convert_as {
    ($($from:ty => [$($to:ty),*];)*) => {
        $($(
            impl Convert<$to> for $from {
                #[inline]
                #[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
                fn convert(self) -> $to {
                    self as $to
                }
            }
        )*)*
    };
}

impl_convert_as! {
    i8 => [i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64];
    i16 => [i8, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64];
    i32 => [i8, i16, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64];
    i64 => [i8, i16, i32, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64];
    i128 => [i8, i16, i32, i64, isize, u8, u16, u32, u64, u128, usize, f32, f64];
    isize => [i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, usize, f32, f64];
    u8 => [i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize, f32, f64];
    u16 => [i8, i16, i32, i64, i128, isize, u8, u32, u64, u128, usize, f32, f64];
    u32 => [i8, i16, i32, i64, i128, isize, u8, u16, u64, u128, usize, f32, f64];
    u64 => [i8, i16, i32, i64, i128, isize, u8, u16, u32, u128, usize, f32, f64];
    u128 => [i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize, f32, f64];
    usize => [i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, f32, f64];
    f32 => [i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f64];
    f64 => [i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32];
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    fn convert_to<R>(value: impl Convert<R>) -> R {
        value.convert()
    }

    #[test]
    fn test_identity() {
        assert_eq!(convert_to::<String>(String::from("x")), "x");
        assert_eq!(convert_to::<Option<u8>>(Some(3)), Some(3));
    }

    #[test]
    fn test_numeric_casts() {
        assert_eq!(convert_to::<i32>(7.42_f64), 7);
        assert_eq!(convert_to::<i32>(-7.9_f32), -7);
        assert_eq!(convert_to::<u8>(300_i32), 44);
        assert_eq!(convert_to::<u8>(-1.0_f64), 0);
        assert_eq!(convert_to::<f64>(3_u16), 3.0);
        assert_eq!(convert_to::<i64>(u64::MAX), -1);
    }
}
