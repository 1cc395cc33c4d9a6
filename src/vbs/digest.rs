//! Content digests used for dedup and fixpoint detection

use md5::{Digest, Md5};
use std::fmt;

/// MD5 digest of a piece of source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    pub fn of_text(text: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(text.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hasher.finalize());
        ContentDigest(bytes)
    }

    /// Digest of several lines, hashed as if joined with `'\n'`.
    pub fn of_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut hasher = Md5::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                hasher.update(b"\n");
            }
            hasher.update(line.as_ref().as_bytes());
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hasher.finalize());
        ContentDigest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self)
    }
}
