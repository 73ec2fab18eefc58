//! Trial-division primality.

/// Return `true` if `n` is prime.
///
/// Tests every divisor in `2..=isqrt(n)`. Values below 2 are never prime.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    (2..=n.isqrt()).all(|divisor| n.checked_rem(divisor) != Some(0))
}
