//! Integer to Ulam spiral coordinate mapping.
//!
//! The spiral starts with 1 at the origin and 2 directly to its right, then
//! winds counter-clockwise (up, left, down, right) in square shells. Shell
//! `k` has side `t = 2k + 1` and ends with `m = t²` at its bottom-right
//! corner. Walking backward from `m`, the shell splits into four legs of
//! `t - 1` values each: bottom, left, top, and finally right.
//!
//! All arithmetic is exact integer arithmetic; no floating-point square
//! roots are involved, so the mapping is stable for the full `u64` range.

use ulam_types::Coordinate;

use crate::error::SpiralError;

/// Return the shell (ring) that contains `n`.
///
/// Shell 0 is the center cell alone. Shell `k >= 1` holds the `8k` values
/// in `((2k - 1)², (2k + 1)²]`. Equivalent to `ceil((sqrt(n) - 1) / 2)`.
pub fn shell_index(n: u64) -> u64 {
    if n <= 1 {
        return 0;
    }
    let root = n.isqrt();
    let ceil_root = if root.checked_mul(root) == Some(n) {
        root
    } else {
        root.saturating_add(1)
    };
    ceil_root.checked_div(2).unwrap_or(0)
}

/// Map a positive integer to its position on the spiral.
///
/// `1 -> (0, 0)`, `2 -> (1, 0)`, `3 -> (1, 1)`, `4 -> (0, 1)`,
/// `5 -> (-1, 1)`, and so on. The mapping is injective.
///
/// # Errors
///
/// Returns [`SpiralError::ZeroIndex`] for `n == 0`.
pub fn spiral_coordinate(n: u64) -> Result<Coordinate, SpiralError> {
    match n {
        0 => Err(SpiralError::ZeroIndex),
        1 => Ok(Coordinate::ORIGIN),
        _ => {
            let (x, y) = shell_position(n);
            let x = i64::try_from(x).map_err(|_e| SpiralError::OutOfRange { n })?;
            let y = i64::try_from(y).map_err(|_e| SpiralError::OutOfRange { n })?;
            Ok(Coordinate::new(x, y))
        }
    }
}

/// Locate `n > 1` within its shell.
///
/// Legs are checked in order (bottom, left, top, right), stepping the
/// running corner value `m` back by one leg after each miss.
// For n <= u64::MAX, k < 2^32 and m < 2^65, so i128 cannot overflow.
#[allow(clippy::arithmetic_side_effects)]
fn shell_position(n: u64) -> (i128, i128) {
    let k = i128::from(shell_index(n));
    let n = i128::from(n);
    let side = 2 * k + 1;
    let leg = side - 1;
    let mut m = side * side;

    if n >= m - leg {
        return (k - (m - n), -k);
    }
    m -= leg;

    if n >= m - leg {
        return (-k, -k + (m - n));
    }
    m -= leg;

    if n >= m - leg {
        return (-k + (m - n), k);
    }

    (k, k - (m - n - leg))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn coord(n: u64) -> (i64, i64) {
        let c = spiral_coordinate(n).unwrap();
        (c.x, c.y)
    }

    #[test]
    fn first_five_values() {
        assert_eq!(coord(1), (0, 0));
        assert_eq!(coord(2), (1, 0));
        assert_eq!(coord(3), (1, 1));
        assert_eq!(coord(4), (0, 1));
        assert_eq!(coord(5), (-1, 1));
    }

    #[test]
    fn first_shell_walks_counter_clockwise() {
        assert_eq!(coord(6), (-1, 0));
        assert_eq!(coord(7), (-1, -1));
        assert_eq!(coord(8), (0, -1));
        assert_eq!(coord(9), (1, -1));
    }

    #[test]
    fn second_shell_corners_and_legs() {
        // Right leg climbs from just above the previous corner.
        assert_eq!(coord(10), (2, -1));
        assert_eq!(coord(11), (2, 0));
        assert_eq!(coord(12), (2, 1));
        assert_eq!(coord(13), (2, 2));
        // Top leg runs left.
        assert_eq!(coord(17), (-2, 2));
        // Left leg runs down.
        assert_eq!(coord(21), (-2, -2));
        // Bottom leg runs right to the shell maximum.
        assert_eq!(coord(25), (2, -2));
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(spiral_coordinate(0), Err(SpiralError::ZeroIndex));
    }

    #[test]
    fn shell_index_boundaries() {
        assert_eq!(shell_index(0), 0);
        assert_eq!(shell_index(1), 0);
        assert_eq!(shell_index(2), 1);
        assert_eq!(shell_index(9), 1);
        assert_eq!(shell_index(10), 2);
        assert_eq!(shell_index(25), 2);
        assert_eq!(shell_index(26), 3);
    }

    #[test]
    fn shell_sizes_are_eight_k() {
        for k in 1..20_u64 {
            let count = (1..=(2 * k + 1) * (2 * k + 1))
                .filter(|&n| shell_index(n) == k)
                .count();
            assert_eq!(count, usize::try_from(8 * k).unwrap());
        }
    }

    #[test]
    fn squares_tile_exactly() {
        for k in 0..=15_i64 {
            let side = u64::try_from(2 * k + 1).unwrap();
            let cells: BTreeSet<(i64, i64)> = (1..=side * side).map(coord).collect();

            let mut expected = BTreeSet::new();
            for x in -k..=k {
                for y in -k..=k {
                    expected.insert((x, y));
                }
            }
            assert_eq!(cells, expected, "shell {k} does not tile its square");
        }
    }

    #[test]
    fn mapping_is_injective() {
        let mut seen = BTreeSet::new();
        for n in 1..=20_000 {
            assert!(seen.insert(coord(n)), "{n} collides with an earlier value");
        }
    }

    #[test]
    fn consecutive_values_are_neighbours() {
        for n in 1..5_000 {
            let (ax, ay) = coord(n);
            let (bx, by) = coord(n + 1);
            assert_eq!((ax - bx).abs() + (ay - by).abs(), 1, "step {n} -> {}", n + 1);
        }
    }

    #[test]
    fn deterministic() {
        for n in [2, 97, 1_009, 65_537] {
            assert_eq!(spiral_coordinate(n), spiral_coordinate(n));
        }
    }

    #[test]
    fn extreme_values_stay_in_range() {
        let c = spiral_coordinate(u64::MAX).unwrap();
        let k = i64::try_from(shell_index(u64::MAX)).unwrap();
        assert!(c.x.abs() <= k && c.y.abs() <= k);
        assert!(c.x.abs() == k || c.y.abs() == k);
    }
}
