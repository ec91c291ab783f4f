//! Content fingerprinting for deduplication.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of raw upload bytes as 64 lowercase hex chars.
///
/// This digest is the sole deduplication key, so it must be collision
/// resistant; identical bytes always produce the identical digest.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let data = b"fenestra";
        assert_eq!(content_hash(data), content_hash(data));
    }

    #[test]
    fn test_hash_length_and_charset() {
        let digest = content_hash(b"anything");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, digest.to_lowercase());
    }

    #[test]
    fn test_known_vector_empty_input() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_known_vector_abc() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_different_bytes_differ() {
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }
}
