use super::traits::layout_hasher::LayoutHasher;

const H1_INIT: u64 = 0xdeadbeef;
const H2_INIT: u64 = 0x41c6ce57;

const H1_MUL: u64 = 0x85ebca77;
const H2_MUL: u64 = 0xc2b2ae3d;
const H1_FINAL_MUL: u64 = 0x735a2d97;
const H2_FINAL_MUL: u64 = 0xcaf649a9;

/// cyrb53a style mixing hash over two 64-bit lanes.
///
/// Not cryptographic. It is only meant to tell two type-tag sequences apart
/// cheaply, so all arithmetic wraps at 64 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cyrb53a {
    seed: u64,
}

impl Cyrb53a {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutHasher for Cyrb53a {
    fn hash_tags(&self, tags: &[u8]) -> u64 {
        let mut h1 = H1_INIT ^ self.seed;
        let mut h2 = H2_INIT ^ self.seed;

        for tag in tags {
            let ch = u64::from(*tag);
            h1 = (h1 ^ ch).wrapping_mul(H1_MUL);
            h2 = (h2 ^ ch).wrapping_mul(H2_MUL);
        }

        h1 ^= (h1 ^ (h2 >> 15)).wrapping_mul(H1_FINAL_MUL);
        h2 ^= (h2 ^ (h1 >> 15)).wrapping_mul(H2_FINAL_MUL);
        h1 ^= h2 >> 16;
        h2 ^= h1 >> 16;

        h2.wrapping_mul(2097152).wrapping_add(h1 >> 11)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tags_same_hash() {
        let hasher = Cyrb53a::default();
        assert_eq!(hasher.hash_tags(&[0, 1, 5]), hasher.hash_tags(&[0, 1, 5]));
    }

    #[test]
    fn test_tag_changes_are_detected() {
        let hasher = Cyrb53a::default();
        let base = hasher.hash_tags(&[0, 1, 5]);
        assert_ne!(base, hasher.hash_tags(&[0, 2, 5]));
        assert_ne!(base, hasher.hash_tags(&[0, 5, 1]));
        assert_ne!(base, hasher.hash_tags(&[0, 1, 5, 0]));
    }

    #[test]
    fn test_seed_changes_hash() {
        let tags = [3, 3, 4];
        assert_ne!(
            Cyrb53a::default().hash_tags(&tags),
            Cyrb53a::with_seed(42).hash_tags(&tags)
        );
    }
}
