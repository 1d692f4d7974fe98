use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::domain::PhotoRecord;

/// Group identity shared by every revision of one photo list.
pub const PHOTO_SECTION_ID: &str = "photos";

/// How two revisions of the same group are compared before per-item diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionEquality {
    /// Every record compared in order.
    Exact,
    /// Only the number of records is compared, so same-length reorders look equal.
    #[default]
    LengthOnly,
}

impl FromStr for RevisionEquality {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "length" | "length_only" | "length-only" => Ok(Self::LengthOnly),
            other => Err(format!("unknown equality policy '{other}'")),
        }
    }
}

impl fmt::Display for RevisionEquality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::LengthOnly => f.write_str("length"),
        }
    }
}

/// Immutable snapshot of the photo ordering at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRevision {
    sequence: u64,
    photos: Arc<[PhotoRecord]>,
}

impl ListRevision {
    pub fn new(sequence: u64, photos: impl Into<Arc<[PhotoRecord]>>) -> Self {
        Self {
            sequence,
            photos: photos.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Constant for the lifetime of the list; never depends on contents.
    pub fn diff_identifier(&self) -> &'static str {
        PHOTO_SECTION_ID
    }

    pub fn is_equal_to(&self, other: &ListRevision, policy: RevisionEquality) -> bool {
        match policy {
            RevisionEquality::Exact => self.photos == other.photos,
            RevisionEquality::LengthOnly => self.photos.len() == other.photos.len(),
        }
    }
}
