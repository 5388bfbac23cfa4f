//! Element types accepted by grid uploads.
//!
//! The grid texture stores one 32-bit float per cell. 8/16/32-bit inputs and
//! `f32` are handed to the graphics API as-is. 64-bit inputs are narrowed first
//! (`i64 -> i32`, `u64 -> u32`, `f64 -> f32`, with `as` semantics) into a
//! buffer that lives only for the duration of the upload. The narrowing is
//! lossy: integers outside the 32-bit range wrap, doubles round to nearest.

use crate::gfx::GridTexels;

mod sealed {
    pub trait Sealed {}
}

/// Numeric types a heatmap grid can be built from.
pub trait GridValue: Copy + sealed::Sealed {
    /// Calls `upload` with texels in a 32-bit layout.
    fn with_texels<R>(values: &[Self], upload: impl FnOnce(GridTexels<'_>) -> R) -> R;
}

macro_rules! direct_grid_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl GridValue for $ty {
            #[inline]
            fn with_texels<R>(values: &[Self], upload: impl FnOnce(GridTexels<'_>) -> R) -> R {
                upload(GridTexels::$variant(values))
            }
        }
    )*};
}

macro_rules! narrowed_grid_value {
    ($($ty:ty => $narrow:ty, $variant:ident),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl GridValue for $ty {
            fn with_texels<R>(values: &[Self], upload: impl FnOnce(GridTexels<'_>) -> R) -> R {
                let narrowed: Vec<$narrow> = values.iter().map(|&v| v as $narrow).collect();
                upload(GridTexels::$variant(&narrowed))
            }
        }
    )*};
}

direct_grid_value! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    f32 => F32,
}

narrowed_grid_value! {
    i64 => i32, I32,
    u64 => u32, U32,
    f64 => f32, F32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texels<T: GridValue>(values: &[T]) -> Vec<f32> {
        T::with_texels(values, |t| t.to_f32())
    }

    #[test]
    fn narrow_types_pass_through_unchanged() {
        assert!(i8::with_texels(&[1i8, -2], |t| t == GridTexels::I8(&[1, -2])));
        assert_eq!(texels(&[250u8, 0]), vec![250.0, 0.0]);
        assert_eq!(texels(&[-300i16, 300]), vec![-300.0, 300.0]);
        assert_eq!(texels(&[65535u16]), vec![65535.0]);
        assert_eq!(texels(&[-7i32]), vec![-7.0]);
        assert_eq!(texels(&[7u32]), vec![7.0]);
        assert_eq!(texels(&[0.25f32]), vec![0.25]);
    }

    #[test]
    fn wide_types_are_narrowed_to_32_bits() {
        let narrowed = i64::with_texels(&[5i64, -5], |t| matches!(t, GridTexels::I32(&[5, -5])));
        assert!(narrowed);
        assert!(u64::with_texels(&[9u64], |t| matches!(t, GridTexels::U32(&[9]))));
        assert!(f64::with_texels(&[0.5f64], |t| t == GridTexels::F32(&[0.5])));
    }

    #[test]
    fn narrowing_wraps_out_of_range_integers() {
        assert_eq!(texels(&[(1i64 << 40) + 3]), vec![3.0]);
        assert_eq!(texels(&[(1u64 << 32) + 1]), vec![1.0]);
    }

    #[test]
    fn doubles_round_to_single_precision() {
        let v = 0.1f64;
        assert_eq!(texels(&[v]), vec![v as f32]);
        assert!((texels(&[v])[0] as f64 - v).abs() < 1e-7);
    }
}
