use std::fmt;

/// Opaque, salted and iterated password verifier. Never reversed here; compared byte for byte.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecureHash {
    iterations: i32,
    hash: Vec<u8>,
    salt: Vec<u8>,
}

impl SecureHash {
    pub fn new(iterations: i32, hash: impl Into<Vec<u8>>, salt: impl Into<Vec<u8>>) -> Self {
        Self { iterations, hash: hash.into(), salt: salt.into() }
    }

    pub fn iterations(&self) -> i32 { self.iterations }
    pub fn hash(&self) -> &[u8] { &self.hash }
    pub fn salt(&self) -> &[u8] { &self.salt }
}

// Keep verifier bytes out of logs.
impl fmt::Debug for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureHash")
            .field("iterations", &self.iterations)
            .field("hash", &format_args!("<{} bytes>", self.hash.len()))
            .field("salt", &format_args!("<{} bytes>", self.salt.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_bytewise() {
        let a = SecureHash::new(10_000, vec![1, 2, 3], vec![9, 9]);
        assert_eq!(a, SecureHash::new(10_000, vec![1, 2, 3], vec![9, 9]));
        assert_ne!(a, SecureHash::new(10_000, vec![1, 2, 4], vec![9, 9]));
        assert_ne!(a, SecureHash::new(10_001, vec![1, 2, 3], vec![9, 9]));
    }

    #[test]
    fn debug_redacts_bytes() {
        let dbg = format!("{:?}", SecureHash::new(5, vec![0xAB; 32], vec![0xCD; 16]));
        assert!(dbg.contains("<32 bytes>"));
        assert!(!dbg.contains("171"));
    }
}
