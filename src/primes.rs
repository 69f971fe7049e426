//! Prime table sizes.
//!
//! Bucket counts are always prime so that `hash % capacity` spreads hashes
//! with regular strides across the whole table. Sizes come from a
//! precomputed list growing roughly 20% per step; past its end they are
//! found by trial division.

/// Precomputed table sizes.
pub const PRIMES: [usize; 72] = [
    3, 7, 11, 17, 23, 29, 37, 47, 59, 71, 89, 107, 131, 163, 197, 239, 293, 353, 431, 521, 631,
    761, 919, 1103, 1327, 1597, 1931, 2333, 2801, 3371, 4049, 4861, 5839, 7013, 8419, 10103,
    12143, 14591, 17519, 21023, 25229, 30293, 36353, 43627, 52361, 62851, 75431, 90523, 108631,
    130363, 156437, 187751, 225307, 270371, 324449, 389357, 467237, 560689, 672827, 807403,
    968897, 1162687, 1395263, 1674319, 2009191, 2411033, 2893249, 3471899, 4166287, 4999559,
    5999471, 7199369,
];

/// Smallest size a table is ever allocated with.
pub const MIN_PRIME: usize = PRIMES[0];

/// Largest table size; also the ceiling for [`expand`].
pub const MAX_PRIME_ARRAY_LENGTH: usize = 0x7FEF_FFFD;

// Computed primes `p` with `(p - 1) % SKIP_MODULUS == 0` are passed over.
const SKIP_MODULUS: usize = 12345;

/// Trial-division primality test.
pub fn is_prime(candidate: usize) -> bool {
    if candidate & 1 == 0 {
        return candidate == 2;
    }
    let mut divisor = 3;
    while divisor * divisor <= candidate {
        if candidate % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    candidate != 1
}

/// Returns the smallest table size that is at least `min`.
///
/// Requests beyond the precomputed list are answered with a computed prime,
/// and anything at or above [`MAX_PRIME_ARRAY_LENGTH`] is clamped to it.
pub fn next_size(min: usize) -> usize {
    if let Some(&p) = PRIMES.iter().find(|&&p| p >= min) {
        return p;
    }
    if min >= MAX_PRIME_ARRAY_LENGTH {
        return MAX_PRIME_ARRAY_LENGTH;
    }
    let mut candidate = min | 1;
    while candidate < MAX_PRIME_ARRAY_LENGTH {
        if is_prime(candidate) && (candidate - 1) % SKIP_MODULUS != 0 {
            return candidate;
        }
        candidate += 2;
    }
    MAX_PRIME_ARRAY_LENGTH
}

/// Size to grow to from a table currently holding `old_size` slots:
/// the next size at least twice as large, capped at the maximum.
pub fn expand(old_size: usize) -> usize {
    let doubled = old_size.saturating_mul(2);
    if doubled > MAX_PRIME_ARRAY_LENGTH && MAX_PRIME_ARRAY_LENGTH > old_size {
        return MAX_PRIME_ARRAY_LENGTH;
    }
    next_size(doubled)
}
