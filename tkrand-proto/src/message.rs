//! Typed response payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name and version reported by a running app.
///
/// Laid out on the wire as two 4-byte ASCII name parts followed by a
/// little-endian `u32` version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVersion {
    /// First name part.
    pub name0: String,
    /// Second name part.
    pub name1: String,
    /// App version.
    pub version: u32,
}

impl NameVersion {
    /// Bytes consumed by [`NameVersion::unpack`].
    pub const PACKED_LEN: usize = 12;

    /// Unpacks a name/version from the start of `raw`.
    ///
    /// Returns `None` if `raw` is shorter than [`Self::PACKED_LEN`].
    pub fn unpack(raw: &[u8]) -> Option<Self> {
        let raw = raw.get(..Self::PACKED_LEN)?;
        let (name0, rest) = raw.split_at(4);
        let (name1, version) = rest.split_at(4);
        Some(Self {
            name0: String::from_utf8_lossy(name0).into_owned(),
            name1: String::from_utf8_lossy(name1).into_owned(),
            version: u32::from_le_bytes(version.try_into().ok()?),
        })
    }
}

impl fmt::Display for NameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.name0, self.name1, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_names_and_le_version() {
        let mut raw = Vec::from(*b"tk1 rand");
        raw.extend_from_slice(&3u32.to_le_bytes());
        raw.extend_from_slice(&[0xff; 18]);

        let nv = NameVersion::unpack(&raw).unwrap();
        assert_eq!(nv.name0, "tk1 ");
        assert_eq!(nv.name1, "rand");
        assert_eq!(nv.version, 3);
        assert_eq!(nv.to_string(), "tk1 rand 3");
    }

    #[test]
    fn short_input_is_none() {
        assert_eq!(NameVersion::unpack(b"tk1 rand"), None);
    }
}
