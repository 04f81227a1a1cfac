//! Path-independent file identities.
//!
//! A [`FileIdentity`] is derived from a file's *name* and *byte size* only, so
//! moving a file between folders keeps its cached metadata while an edit that
//! changes the size naturally invalidates it. Renames are re-keyed explicitly
//! by the metadata store.

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use thiserror::Error;

const IDENTITY_LEN: usize = 16;
const SIZE_OFFSET: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("malformed file identity {input:?}: {reason}")]
    Malformed { input: String, reason: String },
}

/// Stable 128-bit key for a `(file name, file size)` pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentity([u8; IDENTITY_LEN]);

impl FileIdentity {
    /// MurmurHash3 x64/128 of the UTF-8 name with the last four bytes
    /// replaced by the little-endian low 32 bits of `size`.
    pub fn compute(name: &str, size: u64) -> Self {
        let digest = murmur3::murmur3_x64_128(&mut name.as_bytes(), 0)
            .expect("reading from an in-memory slice cannot fail");

        let mut bytes = digest.to_le_bytes();
        let truncated = (size & 0xFFFF_FFFF) as u32;
        bytes[SIZE_OFFSET..].copy_from_slice(&truncated.to_le_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// URL-safe, unpadded base64 of the raw bytes (22 characters).
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub fn decode(input: &str) -> Result<Self, IdentityError> {
        let malformed = |reason: String| IdentityError::Malformed {
            input: input.to_string(),
            reason,
        };

        let raw = URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|err| malformed(err.to_string()))?;

        let bytes: [u8; IDENTITY_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            malformed(format!(
                "expected {IDENTITY_LEN} bytes, got {}",
                raw.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileIdentity").field(&self.encode()).finish()
    }
}

impl FromStr for FileIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
