//! Avatar snapshot hashing.
//!
//! At submission time the live profile photo URL is hashed and stored with
//! the request; at approval time the hash is recomputed against the then-live
//! photo. Photo keys are uuid-named, so replacing the photo always changes
//! the URL and therefore the hash.

use sha2::{Digest, Sha256};

pub fn avatar_hash(photo_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(photo_url.trim().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hashes_match(stored: &str, live_photo_url: &str) -> bool {
    stored == avatar_hash(live_photo_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex_sha256() {
        let h = avatar_hash("https://cdn.test/media/profiles/a/b.jpg");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, avatar_hash("https://cdn.test/media/profiles/a/b.jpg"));
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert_eq!(avatar_hash(" x "), avatar_hash("x"));
    }

    #[test]
    fn changed_photo_changes_hash() {
        let stored = avatar_hash("https://cdn.test/media/profiles/a/old.jpg");
        assert!(hashes_match(&stored, "https://cdn.test/media/profiles/a/old.jpg"));
        assert!(!hashes_match(&stored, "https://cdn.test/media/profiles/a/new.jpg"));
    }
}
