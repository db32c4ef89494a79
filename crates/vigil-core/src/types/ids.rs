//! Identifier newtypes for runs, tags, snapshots, and bug identities.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Row id of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub i64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run/{}", self.0)
    }
}

/// Row id of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(pub i64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag/{}", self.0)
    }
}

/// A diffable/queryable snapshot: either the mutable head of a run or an
/// immutable tag. Both sides of a diff accept either form, including two
/// tags of the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotId {
    RunHead(RunId),
    Tag(TagId),
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotId::RunHead(id) => write!(f, "head:{}", id.0),
            SnapshotId::Tag(id) => write!(f, "tag:{}", id.0),
        }
    }
}

/// Content-derived stable identity of a defect: the 128-bit hash produced by
/// the identity module. Two reports with the same `BugId` are "the same
/// defect" for lifecycle tracking, diffing, and uniqueing.
///
/// Serialized (JSON and database) as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BugId(pub u128);

impl BugId {
    /// Render as 32 lowercase hex characters.
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.0)
    }

    /// Parse from hex; `None` when the string is not valid hex.
    pub fn from_hex(s: &str) -> Option<Self> {
        u128::from_str_radix(s, 16).ok().map(Self)
    }
}

impl fmt::Display for BugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for BugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BugId({:032x})", self.0)
    }
}

impl Serialize for BugId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BugId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BugId::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid bug id: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_id_hex_roundtrip() {
        let id = BugId(0x00ab_cdef_0123_4567_89ab_cdef_0123_4567);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 32);
        assert!(hex.starts_with("00")); // leading zeros preserved
        assert_eq!(BugId::from_hex(&hex), Some(id));
    }

    #[test]
    fn bug_id_rejects_garbage() {
        assert_eq!(BugId::from_hex("not-hex"), None);
    }

    #[test]
    fn bug_id_serializes_as_hex_string() {
        let id = BugId(0xdead_beef);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"000000000000000000000000deadbeef\"");
        assert_eq!(serde_json::from_str::<BugId>(&json).unwrap(), id);
        assert!(serde_json::from_str::<BugId>("\"zz\"").is_err());
    }

    #[test]
    fn snapshot_id_display() {
        assert_eq!(SnapshotId::RunHead(RunId(3)).to_string(), "head:3");
        assert_eq!(SnapshotId::Tag(TagId(7)).to_string(), "tag:7");
    }
}
