//! Values storable in per-element data arrays.
//!
//! New elements are either default-constructed or interpolated from weighted
//! ancestors. Floating-point scalars (and fixed arrays of them) interpolate
//! as a weighted sum; other types fall back to `Default`.

use num_traits::{Float, NumCast};

/// A value stored per element.
pub trait ElementValue: Clone + Default {
    /// Combine `(ancestor value, weight)` pairs into a new value.
    ///
    /// `None` means the type does not interpolate and the new element is
    /// default-constructed instead.
    fn interpolate(_terms: &[(&Self, f64)]) -> Option<Self> {
        None
    }
}

fn weighted_sum<T: Float>(terms: &[(&T, f64)]) -> T {
    terms.iter().fold(T::zero(), |acc, (v, w)| {
        acc + **v * <T as NumCast>::from(*w).unwrap_or_else(T::zero)
    })
}

macro_rules! float_values {
    ($($t:ty),*) => {
        $(
            impl ElementValue for $t {
                fn interpolate(terms: &[(&Self, f64)]) -> Option<Self> {
                    Some(weighted_sum(terms))
                }
            }
        )*
    };
}

macro_rules! plain_values {
    ($($t:ty),*) => {
        $(impl ElementValue for $t {})*
    };
}

float_values!(f32, f64);
plain_values!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, bool, (), String);

impl<T: ElementValue, const N: usize> ElementValue for [T; N]
where
    [T; N]: Default,
{
    fn interpolate(terms: &[(&Self, f64)]) -> Option<Self> {
        let mut out = Self::default();
        for (i, slot) in out.iter_mut().enumerate() {
            let column: Vec<(&T, f64)> = terms.iter().map(|(v, w)| (&v[i], *w)).collect();
            *slot = T::interpolate(&column)?;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_interpolate_as_weighted_sum() {
        let (a, b) = (2.0_f64, 4.0_f64);
        assert_eq!(f64::interpolate(&[(&a, 0.25), (&b, 0.75)]), Some(3.5));
        assert_eq!(f32::interpolate(&[]), Some(0.0));
    }

    #[test]
    fn arrays_interpolate_componentwise() {
        let p = [0.0_f64, 10.0, 2.0];
        let q = [1.0_f64, 20.0, 4.0];
        assert_eq!(
            <[f64; 3]>::interpolate(&[(&p, 0.5), (&q, 0.5)]),
            Some([0.5, 15.0, 3.0])
        );
    }

    #[test]
    fn integers_do_not_interpolate() {
        let x = 7_u32;
        assert_eq!(u32::interpolate(&[(&x, 1.0)]), None);
        let arr = [1_i32, 2];
        assert_eq!(<[i32; 2]>::interpolate(&[(&arr, 1.0)]), None);
    }
}
