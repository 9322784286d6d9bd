//! Source fingerprinting for staleness detection.
//!
//! A fingerprint is the first 8 hex characters of a SHA-256 digest over the
//! exact bytes of every source file, concatenated in the scheme's fixed
//! order:
//!
//! ```text
//! methods.csv ‖ mapping.yaml ‖ custom_lists.yaml
//! ```
//!
//! Files the scheme does not read, and optional files that are absent,
//! contribute zero bytes. No paths, modification times or other metadata go
//! into the digest, so it survives `git checkout` and copies between
//! machines. Every generated document embeds the fingerprint in its header;
//! the freshness check recomputes it and compares.

use crate::source::SourceFile;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of the truncated hex digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Truncated SHA-256 digest of the source bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accept a previously recorded fingerprint if it has the right shape.
    pub fn parse(value: &str) -> Option<Self> {
        let valid = value.len() == FINGERPRINT_LEN
            && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(value.to_string()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint the given files in order.
pub fn fingerprint(files: &[SourceFile]) -> Fingerprint {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(&file.bytes);
    }
    let hex = format!("{:x}", hasher.finalize());
    Fingerprint(hex[..FINGERPRINT_LEN].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &[u8]) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn fingerprint_is_eight_hex_chars() {
        let fp = fingerprint(&[file("methods.csv", b"num\n1\n")]);
        assert_eq!(fp.as_str().len(), 8);
        assert!(Fingerprint::parse(fp.as_str()).is_some());
    }

    #[test]
    fn fingerprint_matches_sha256_prefix() {
        // sha256("abc") = ba7816bf...
        let fp = fingerprint(&[file("methods.csv", b"abc")]);
        assert_eq!(fp.as_str(), "ba7816bf");
    }

    #[test]
    fn fingerprint_is_concatenation() {
        let split = fingerprint(&[file("a", b"ab"), file("b", b"c")]);
        let joined = fingerprint(&[file("a", b"abc")]);
        assert_eq!(split, joined);
    }

    #[test]
    fn fingerprint_ignores_names() {
        let a = fingerprint(&[file("methods.csv", b"x")]);
        let b = fingerprint(&[file("other.csv", b"x")]);
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_changes_with_one_byte() {
        let a = fingerprint(&[file("methods.csv", b"1,core")]);
        let b = fingerprint(&[file("methods.csv", b"1,Core")]);
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_depends_on_order() {
        let a = fingerprint(&[file("a", b"x"), file("b", b"y")]);
        let b = fingerprint(&[file("b", b"y"), file("a", b"x")]);
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Fingerprint::parse("1a2b3c4d").is_some());
        assert!(Fingerprint::parse("1A2B3C4D").is_none());
        assert!(Fingerprint::parse("1a2b3c4").is_none());
        assert!(Fingerprint::parse("1a2b3c4g").is_none());
    }
}
