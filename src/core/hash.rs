/// Service for computing whole-file content digests
pub struct HashService;

impl HashService {
    pub fn new() -> Self {
        Self
    }

    /// 128-bit MD5 digest of `data` as 32 lowercase hex characters.
    /// Used to tell files apart, not for integrity against tampering.
    pub fn digest(&self, data: &[u8]) -> String {
        format!("{:x}", md5::compute(data))
    }
}

impl Default for HashService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable() {
        let hash_service = HashService::new();
        let hash = hash_service.digest(b"Hello, World!");

        assert_eq!(hash, hash_service.digest(b"Hello, World!"));
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            HashService::new().digest(b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_one_byte_change_changes_digest() {
        let hash_service = HashService::new();
        let mut content = vec![0u8; 4096];
        let before = hash_service.digest(&content);
        content[2048] = 1;
        assert_ne!(before, hash_service.digest(&content));
    }
}
