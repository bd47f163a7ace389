//! Key hashing.
//!
//! Bucket selection is `hash_key(hasher, key) % bucket_count`. Keys are fed
//! to the `Hasher` as raw bytes through a single `write`, never through
//! `Hash::hash`, so no length prefix or terminator enters the sum.
//!
//! The default hasher is a positional weighted byte sum: deterministic,
//! order sensitive, and cheap, but not collision resistant. Keys that are
//! permutations of each other with equal weighted sums land in the same
//! bucket and are resolved by the chain.

use core::hash::{BuildHasher, Hasher};

/// Hash `key` with a fresh hasher from `build`.
#[inline]
pub fn hash_key<S: BuildHasher>(build: &S, key: &str) -> u64 {
    let mut h = build.build_hasher();
    h.write(key.as_bytes());
    h.finish()
}

/// Builds `WeightedSumHasher`s. The map's default `BuildHasher`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct WeightedSum;

impl BuildHasher for WeightedSum {
    type Hasher = WeightedSumHasher;
    fn build_hasher(&self) -> Self::Hasher {
        WeightedSumHasher::default()
    }
}

/// Sum of `byte * position` over everything written, positions starting at
/// 1 and continuing across `write` calls.
#[derive(Clone, Debug)]
pub struct WeightedSumHasher {
    sum: u64,
    weight: u64,
}

impl Default for WeightedSumHasher {
    fn default() -> Self {
        Self { sum: 0, weight: 1 }
    }
}

impl Hasher for WeightedSumHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.sum = self.sum.wrapping_add(self.weight.wrapping_mul(u64::from(b)));
            self.weight = self.weight.wrapping_add(1);
        }
    }

    fn finish(&self) -> u64 {
        self.sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_hashes_to_zero() {
        assert_eq!(hash_key(&WeightedSum, ""), 0);
    }

    #[test]
    fn single_byte_is_its_code() {
        assert_eq!(hash_key(&WeightedSum, "a"), 97);
        assert_eq!(hash_key(&WeightedSum, "b"), 98);
    }

    #[test]
    fn positions_weight_each_byte() {
        // 'a'*1 + 'b'*2 vs 'b'*1 + 'a'*2
        assert_eq!(hash_key(&WeightedSum, "ab"), 97 + 2 * 98);
        assert_eq!(hash_key(&WeightedSum, "ba"), 98 + 2 * 97);
        assert_ne!(hash_key(&WeightedSum, "ab"), hash_key(&WeightedSum, "ba"));
    }

    #[test]
    fn hashing_is_stable_across_calls() {
        for k in ["", "x", "hello", "a much longer key with spaces"] {
            assert_eq!(hash_key(&WeightedSum, k), hash_key(&WeightedSum, k));
        }
    }

    #[test]
    fn non_ascii_bytes_count_unsigned() {
        // "é" is 0xC3 0xA9 in UTF-8.
        assert_eq!(hash_key(&WeightedSum, "é"), 0xC3 + 2 * 0xA9);
    }

    /// Invariant: weights keep counting across split writes.
    #[test]
    fn split_writes_match_single_write() {
        let mut h = WeightedSum.build_hasher();
        h.write(b"he");
        h.write(b"llo");
        assert_eq!(h.finish(), hash_key(&WeightedSum, "hello"));
    }
}
