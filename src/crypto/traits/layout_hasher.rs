pub trait LayoutHasher: Send + Sync {
    // Folds a sequence of small type tags into a 64-bit layout signature
    fn hash_tags(&self, tags: &[u8]) -> u64;
}
