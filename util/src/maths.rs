//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    value.max(min).min(max)
}

/// Limit the change from `previous` to `target` to at most `max_step`.
///
/// A `max_step` of zero or less disables limiting.
pub fn slew_limit<T>(previous: T, target: T, max_step: T) -> T
where
    T: Float
{
    if max_step <= T::zero() {
        return target
    }

    let delta = target - previous;

    if delta.abs() > max_step {
        previous + max_step * delta.signum()
    }
    else {
        target
    }
}

/// Convert an angle in degrees to radians.
pub fn deg_to_rad<T>(deg: T) -> T
where
    T: Float
{
    deg.to_radians()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 320f64), (-1f64, 1f64), 160f64), 0f64);
        assert_eq!(lin_map((0f64, 320f64), (-1f64, 1f64), 0f64), -1f64);
        assert_eq!(lin_map((0f64, 320f64), (-1f64, 1f64), 320f64), 1f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1f64, 1f64), 1f64);
        assert_eq!(clamp(-1.5f64, -1f64, 1f64), -1f64);
        assert_eq!(clamp(0.25f64, -1f64, 1f64), 0.25f64);
    }

    #[test]
    fn test_slew_limit() {
        assert_eq!(slew_limit(0f64, 1f64, 0.25f64), 0.25f64);
        assert_eq!(slew_limit(0.5f64, -1f64, 0.25f64), 0.25f64);
        assert_eq!(slew_limit(0.5f64, 0.6f64, 0.25f64), 0.6f64);

        // Disabled
        assert_eq!(slew_limit(-1f64, 1f64, 0f64), 1f64);
    }
}
