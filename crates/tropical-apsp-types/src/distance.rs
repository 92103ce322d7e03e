use std::fmt::{Debug, Display};

/// Value written in place of [`Distance::UNREACHABLE`] when a matrix is
/// rendered for external consumers (2^30 - 1).
pub const OUTPUT_UNREACHABLE: u64 = 1_073_741_823;

/// Scalar type usable as a path length in a distance matrix.
///
/// The domain is `{0..MAX_FINITE} ∪ {UNREACHABLE}`. `UNREACHABLE` is the
/// largest value of the domain and is absorbing under [`combine`]:
///
/// - `combine(a, UNREACHABLE) == UNREACHABLE`
/// - `combine(a, b) == UNREACHABLE` whenever `a + b` leaves the finite domain
///
/// Together with [`better`] (minimum) this forms a truncated min-plus
/// semiring, which is what Floyd-Warshall relaxes over.
///
/// [`combine`]: Distance::combine
/// [`better`]: Distance::better
pub trait Distance:
    Copy + Clone + Send + Sync + Debug + Display + Ord + Eq + Default + 'static + Sized
{
    /// Length of the empty path.
    const ZERO: Self;

    /// Sentinel for "no finite path known".
    const UNREACHABLE: Self;

    /// Largest finite path length (`UNREACHABLE - 1`).
    const MAX_FINITE: Self;

    /// Saturating path concatenation.
    fn combine(self, rhs: Self) -> Self;

    /// Minimum of two candidate lengths, with `UNREACHABLE` as the maximum.
    #[inline(always)]
    fn better(self, rhs: Self) -> Self {
        if rhs < self {
            rhs
        } else {
            self
        }
    }

    /// Whether this length is finite.
    #[inline(always)]
    fn is_reachable(self) -> bool {
        self < Self::UNREACHABLE
    }

    /// Whether this value lies below the domain (negative).
    fn is_negative(self) -> bool;

    /// Convert an input edge weight, clamping anything outside the finite
    /// domain to `UNREACHABLE`.
    fn from_weight(weight: u64) -> Self;

    /// Fold values above `UNREACHABLE` back onto the sentinel.
    #[inline(always)]
    fn clamp_to_domain(self) -> Self {
        if self > Self::UNREACHABLE {
            Self::UNREACHABLE
        } else {
            self
        }
    }
}

macro_rules! impl_distance_int {
    ($($t:ty => $unreachable:expr),* $(,)?) => {
        $(
            impl Distance for $t {
                const ZERO: Self = 0;
                const UNREACHABLE: Self = $unreachable;
                const MAX_FINITE: Self = $unreachable - 1;

                #[inline(always)]
                fn combine(self, rhs: Self) -> Self {
                    if self >= Self::UNREACHABLE || rhs >= Self::UNREACHABLE {
                        return Self::UNREACHABLE;
                    }
                    match self.checked_add(rhs) {
                        Some(sum) if sum < Self::UNREACHABLE => sum,
                        _ => Self::UNREACHABLE,
                    }
                }

                #[inline(always)]
                #[allow(unused_comparisons)]
                fn is_negative(self) -> bool {
                    self < 0
                }

                #[inline(always)]
                fn from_weight(weight: u64) -> Self {
                    if weight >= Self::UNREACHABLE as u64 {
                        Self::UNREACHABLE
                    } else {
                        weight as Self
                    }
                }
            }
        )*
    };
}

// 32-bit domains keep the 2^30 - 1 sentinel so rendered output matches
// consumers that expect bounded integers; 64-bit domains leave headroom.
impl_distance_int! {
    i32 => (1 << 30) - 1,
    u32 => (1 << 30) - 1,
    i64 => (1 << 62) - 1,
    u64 => (1 << 62) - 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_is_absorbing() {
        assert_eq!(i32::UNREACHABLE.combine(0), i32::UNREACHABLE);
        assert_eq!(5i32.combine(i32::UNREACHABLE), i32::UNREACHABLE);
        assert_eq!(u64::UNREACHABLE.combine(u64::UNREACHABLE), u64::UNREACHABLE);
    }

    #[test]
    fn test_combine_finite() {
        assert_eq!(3i32.combine(5), 8);
        assert_eq!(0u32.combine(0), 0);
        assert_eq!(7i64.combine(11), 18);
    }

    #[test]
    fn test_combine_saturates_at_sentinel() {
        // MAX_FINITE + 1 lands exactly on the sentinel
        assert_eq!(i32::MAX_FINITE.combine(1), i32::UNREACHABLE);
        assert_eq!(i32::MAX_FINITE.combine(i32::MAX_FINITE), i32::UNREACHABLE);
        assert_eq!(u64::MAX_FINITE.combine(u64::MAX_FINITE), u64::UNREACHABLE);
        assert_eq!((i32::MAX_FINITE - 1).combine(1), i32::MAX_FINITE);
    }

    #[test]
    fn test_combine_above_sentinel_treated_as_unreachable() {
        assert_eq!(i32::MAX.combine(1), i32::UNREACHABLE);
        assert_eq!(1u32.combine(u32::MAX), u32::UNREACHABLE);
    }

    #[test]
    fn test_better() {
        assert_eq!(3i32.better(5), 3);
        assert_eq!(5i32.better(3), 3);
        assert_eq!(i32::UNREACHABLE.better(7), 7);
        assert_eq!(9u64.better(u64::UNREACHABLE), 9);
        assert_eq!(i32::UNREACHABLE.better(i32::UNREACHABLE), i32::UNREACHABLE);
    }

    #[test]
    fn test_sentinel_matches_output_value() {
        assert_eq!(i32::UNREACHABLE as u64, OUTPUT_UNREACHABLE);
        assert_eq!(u32::UNREACHABLE as u64, OUTPUT_UNREACHABLE);
    }

    #[test]
    fn test_from_weight_clamps() {
        assert_eq!(i32::from_weight(12), 12);
        assert_eq!(i32::from_weight(OUTPUT_UNREACHABLE), i32::UNREACHABLE);
        assert_eq!(i32::from_weight(u64::MAX), i32::UNREACHABLE);
        assert_eq!(i64::from_weight(OUTPUT_UNREACHABLE), OUTPUT_UNREACHABLE as i64);
    }

    #[test]
    fn test_reachability_and_sign() {
        assert!(0i32.is_reachable());
        assert!(i32::MAX_FINITE.is_reachable());
        assert!(!i32::UNREACHABLE.is_reachable());
        assert!((-1i32).is_negative());
        assert!(!0u32.is_negative());
    }

    #[test]
    fn test_clamp_to_domain() {
        assert_eq!(i32::MAX.clamp_to_domain(), i32::UNREACHABLE);
        assert_eq!(42i32.clamp_to_domain(), 42);
    }
}
