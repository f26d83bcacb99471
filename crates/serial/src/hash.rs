use sha2::{Digest, Sha256};

/// Compute SHA-256 of an in-memory byte slice.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode a raw 32-byte hash as a lowercase hex string (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Content-derived identifier of a framed scan. Identical frames share an id,
/// which is what duplicate suppression keys on.
pub fn frame_id(text: &str) -> String {
    to_hex(&sha256_bytes(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_bytes_known_vector() {
        // SHA-256 of empty bytes is a known constant.
        let hash = sha256_bytes(b"");
        assert_eq!(
            to_hex(&hash),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn frame_id_is_deterministic() {
        assert_eq!(frame_id("P<UTO"), frame_id("P<UTO"));
        assert_ne!(frame_id("P<UTO"), frame_id("P<UTA"));
        assert_eq!(frame_id("anything").len(), 64);
    }
}
