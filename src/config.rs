//! Decode-side settings for the role codecs.
//! Declared lengths in a stream are checked against these bounds before anything is allocated.

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CodecSettings {
    /// Upper bound on privilege and granted-role counts in a single role.
    #[serde(default = "CodecSettings::default_max_collection_len")]
    pub max_collection_len: usize,
    /// Upper bound on any string or byte array (names, idents, hash, salt).
    #[serde(default = "CodecSettings::default_max_bytes_len")]
    pub max_bytes_len: usize,
}

impl CodecSettings {
    fn default_max_collection_len() -> usize { 1 << 20 }
    fn default_max_bytes_len() -> usize { 16 * 1024 * 1024 }

    /// Parse settings from a JSON document; missing fields take their defaults.
    pub fn from_json_slice(bytes: &[u8]) -> crate::error::AclResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self { max_collection_len: Self::default_max_collection_len(), max_bytes_len: Self::default_max_bytes_len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let s = CodecSettings::from_json_slice(br#"{"max_collection_len": 8}"#).unwrap();
        assert_eq!(s.max_collection_len, 8);
        assert_eq!(s.max_bytes_len, CodecSettings::default().max_bytes_len);

        let s = CodecSettings::from_json_slice(b"{}").unwrap();
        assert_eq!(s, CodecSettings::default());
    }

    #[test]
    fn rejects_non_json() {
        assert!(CodecSettings::from_json_slice(b"max_collection_len=1").is_err());
    }
}
