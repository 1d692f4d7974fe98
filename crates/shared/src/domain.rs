use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(PhotoId);
id_newtype!(AlbumId);

/// One photo metadata entry as served by the `/photos` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub album_id: AlbumId,
    pub id: PhotoId,
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
}

impl PhotoRecord {
    pub fn new(
        album_id: i64,
        id: i64,
        title: impl Into<String>,
        url: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            album_id: AlbumId(album_id),
            id: PhotoId(id),
            title: title.into(),
            url: url.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}

/// Returns the first id that occurs more than once, if any.
pub fn first_duplicate_id(photos: &[PhotoRecord]) -> Option<PhotoId> {
    let mut seen = std::collections::HashSet::with_capacity(photos.len());
    photos.iter().map(|photo| photo.id).find(|id| !seen.insert(*id))
}
