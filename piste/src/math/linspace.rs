use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced values from `y_start` to `y_end`,
/// inclusive.
///
/// `n == 1` yields only `y_start`.
pub fn linspace<T>(y_start: T, y_end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    let dy = match n {
        0 | 1 => T::zero(),
        _ => (y_end - y_start) / T::from_usize(n - 1).unwrap_or_else(T::one),
    };
    (0..n).map(move |x| y_start + T::from_usize(x).unwrap_or_else(T::zero) * dy)
}
